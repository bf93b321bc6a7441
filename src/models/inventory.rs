// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub mant_item_id: Uuid,
    #[schema(example = "12.0")]
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

// Respuesta del chequeo de disponibilidad. En el alta de ítems es solo
// consultivo; al consumir sí es vinculante.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAvailability {
    pub available: bool,
    #[schema(example = "12.0")]
    pub current_stock: Decimal,
}
