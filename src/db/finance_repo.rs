// src/db/finance_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{FinancialAlert, FinancialAlertKind},
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Los hallazgos del vigilante se escriben SIEMPRE contra el pool, fuera
    // de la transacción que los disparó: si esa transacción se revierte,
    // el hallazgo igual nos interesa.
    pub async fn insert_alert(
        &self,
        tenant_id: Uuid,
        kind: FinancialAlertKind,
        work_order_id: Option<Uuid>,
        master_part_id: Option<Uuid>,
        observed_value: Option<Decimal>,
        reference_value: Option<Decimal>,
        message: &str,
    ) -> Result<FinancialAlert, AppError> {
        let alert = sqlx::query_as::<_, FinancialAlert>(
            r#"
            INSERT INTO financial_alerts (
                tenant_id, kind, work_order_id, master_part_id,
                observed_value, reference_value, message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(work_order_id)
        .bind(master_part_id)
        .bind(observed_value)
        .bind(reference_value)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(alert)
    }
}
