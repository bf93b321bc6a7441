// src/models/procurement.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Orden de compra a un proveedor externo, agrupando ítems de una orden
// de trabajo. Su creación es lo que cierra los ítems como EXTERNAL_INVOICE.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    pub provider_id: Uuid,
    #[schema(example = 57)]
    pub display_id: i32,
    #[schema(example = "120000.0")]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Asignación de mano de obra interna a un técnico.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InternalTicket {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    pub technician_id: Uuid,
    #[schema(example = 12)]
    pub display_id: i32,
    #[schema(example = "80000.0")]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
