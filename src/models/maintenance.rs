// src/models/maintenance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "alert_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Pending,
    Acknowledged,
    Snoozed,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "program_item_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramItemStatus {
    Pending,
    InProgress,
    Completed,
}

// --- Structs ---

// Tarea programada dentro de un paquete de mantenimiento del vehículo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProgramItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub vehicle_id: Uuid,
    pub mant_item_id: Uuid,
    pub package_name: Option<String>,
    #[schema(example = "100000.0")]
    pub estimated_cost: Option<Decimal>,
    pub due_mileage: Option<Decimal>,
    pub status: ProgramItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Alerta de mantenimiento vencido/próximo. La genera el programador (fuera
// de este backend); aquí solo la reclama la fábrica de órdenes de trabajo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAlert {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub vehicle_id: Uuid,
    pub program_item_id: Option<Uuid>,
    #[schema(example = "Cambio de aceite")]
    pub item_name: String,
    pub status: AlertStatus,
    #[schema(example = "150000.0")]
    pub estimated_cost: Option<Decimal>,
    pub work_order_id: Option<Uuid>,
    pub work_order_created_at: Option<DateTime<Utc>>,
    pub work_order_created_by: Option<Uuid>,
    pub response_time_minutes: Option<i32>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Vista de reclamo ---

// Referencia de repuesto usada por la cascada de costos (precio de lista
// del master part por la cantidad que usa el ítem de catálogo).
#[derive(Debug, Clone, PartialEq)]
pub struct PartReference {
    pub reference_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
}

// Snapshot de una alerta reclamable con todas sus fuentes de costo ya
// unidas (program item -> mant item -> parts). Es la entrada pura del
// resolutor de costos; el repo la arma, el servicio no vuelve al banco.
#[derive(Debug, Clone)]
pub struct ClaimableAlert {
    pub id: Uuid,
    pub program_item_id: Option<Uuid>,
    pub mant_item_id: Option<Uuid>,
    pub item_name: String,
    pub program_estimated_cost: Option<Decimal>,
    pub alert_estimated_cost: Option<Decimal>,
    pub parts: Vec<PartReference>,
    pub created_at: DateTime<Utc>,
}
