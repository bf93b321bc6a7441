// src/models/work_orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::catalog::MantItemKind;

// --- Enums ---

// Estados de la orden. PENDING -> IN_PROGRESS -> COMPLETED es el camino
// duro; los estados de aprobación son política intermedia configurable.
// COMPLETED y CANCELLED son terminales en una sola dirección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    Pending,
    PendingApproval,
    Approved,
    Rejected,
    InProgress,
    PendingInvoice,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "mant_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MantType {
    Preventive,
    Corrective,
    Predictive,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    External,
    Internal,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

// Cómo se cerró (o no) el costo de un ítem. Solo el puente de compras
// lo avanza más allá de PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "closure_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosureType {
    Pending,
    ExternalInvoice,
    InternalTicket,
    InternalStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSource {
    External,
    InternalStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_item_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderItemStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub vehicle_id: Uuid,
    #[schema(example = 1024)]
    pub display_id: i32,
    #[schema(example = "Mantenimiento 45.000 km")]
    pub title: String,
    pub description: Option<String>,
    pub status: WorkOrderStatus,
    pub mant_type: MantType,
    pub work_type: WorkType,
    pub priority: Priority,
    #[schema(example = "250000.0")]
    pub estimated_cost: Decimal,
    pub actual_cost: Option<Decimal>,
    #[schema(example = "45200.0")]
    pub creation_mileage: Decimal,
    pub completion_mileage: Option<Decimal>,
    pub is_package_work: bool,
    pub package_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub requested_by: Uuid,
    pub authorized_by: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    pub mant_item_id: Option<Uuid>,
    pub master_part_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    #[schema(example = "Filtro de aceite")]
    pub description: String,
    #[schema(example = "1.0")]
    pub quantity: Decimal,
    #[schema(example = "35000.0")]
    pub unit_price: Decimal,
    // Invariante: total_cost == quantity * unit_price
    #[schema(example = "35000.0")]
    pub total_cost: Decimal,
    pub item_source: ItemSource,
    pub closure_type: ClosureType,
    pub status: WorkOrderItemStatus,
    pub purchased_by: Option<Uuid>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub purchase_order_id: Option<Uuid>,
    pub internal_ticket_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Ítem con los campos del catálogo ya aplanados (lo que consume el frontend
// en el listado de la orden). Los campos de catálogo son opcionales: un
// ítem nacido de una alerta sin program item no referencia catálogo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: WorkOrderItem,
    #[schema(example = "Cambio de aceite")]
    pub item_name: Option<String>,
    pub item_kind: Option<MantItemKind>,
    pub item_category: Option<String>,
    pub part_code: Option<String>,
    pub part_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderExpense {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    #[schema(example = "Transporte del vehículo")]
    pub concept: String,
    #[schema(example = "20000.0")]
    pub amount: Decimal,
    pub incurred_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estados_terminales_no_avanzan() {
        assert!(WorkOrderStatus::Completed.is_terminal());
        assert!(WorkOrderStatus::Cancelled.is_terminal());
        assert!(!WorkOrderStatus::Pending.is_terminal());
        assert!(!WorkOrderStatus::InProgress.is_terminal());
        assert!(!WorkOrderStatus::PendingInvoice.is_terminal());
    }

    #[test]
    fn closure_type_serializa_en_screaming_snake() {
        let json = serde_json::to_string(&ClosureType::ExternalInvoice).unwrap();
        assert_eq!(json, "\"EXTERNAL_INVOICE\"");
        // Un valor desconocido se rechaza en el borde, no se coerce
        let parsed: Result<ClosureType, _> = serde_json::from_str("\"FACTURA\"");
        assert!(parsed.is_err());
    }
}
