// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "financial_alert_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialAlertKind {
    PriceDeviation, // Precio observado lejos del de referencia
    BudgetOverrun,  // Costos acumulados por encima del estimado
}

// Hallazgo del vigilante financiero. Se registra fuera de la transacción
// principal; jamás bloquea la escritura que lo disparó.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAlert {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub kind: FinancialAlertKind,
    pub work_order_id: Option<Uuid>,
    pub master_part_id: Option<Uuid>,
    pub observed_value: Option<Decimal>,
    pub reference_value: Option<Decimal>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
