// src/models/fleet.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Vehículo de la flota. El núcleo de órdenes solo LEE el kilometraje
// (es la fuente del snapshot creation_mileage); nunca lo escribe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "ABC-123")]
    pub license_plate: String,
    pub brand: Option<String>,
    pub line: Option<String>,
    pub vehicle_type: Option<String>,
    #[schema(example = "45200.0")]
    pub mileage: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
