// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "mant_item_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MantItemKind {
    Part,
    Service,
    Action,
}

// --- Catálogo ---

// Ítem de mantenimiento (repuesto, servicio o acción) del catálogo del tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MantItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Cambio de aceite")]
    pub name: String,
    pub kind: MantItemKind,
    #[schema(example = "Motor")]
    pub category: Option<String>,
    pub master_part_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterPart {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "FIL-0042")]
    pub part_code: String,
    pub description: Option<String>,
    #[schema(example = "35000.0")]
    pub reference_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
