// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::inventory::StockLevel};

#[derive(Clone)]
pub struct InventoryRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_level<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        mant_item_id: Uuid,
    ) -> Result<Option<StockLevel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT * FROM stock_levels
            WHERE tenant_id = $1 AND mant_item_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(mant_item_id)
        .fetch_optional(executor)
        .await?;

        Ok(level)
    }

    // Descuento condicionado: solo baja si hay saldo suficiente. Devuelve
    // false cuando la precondición no se cumple (el servicio decide qué hacer).
    pub async fn try_consume<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        mant_item_id: Uuid,
        quantity: Decimal,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE stock_levels
            SET quantity = quantity - $3, updated_at = NOW()
            WHERE tenant_id = $1 AND mant_item_id = $2 AND quantity >= $3
            "#,
        )
        .bind(tenant_id)
        .bind(mant_item_id)
        .bind(quantity)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // Registra el movimiento en el libro de consumos
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        mant_item_id: Uuid,
        delta: Decimal,
        reason: &str,
        work_order_item_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                tenant_id, mant_item_id, delta, reason, work_order_item_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant_id)
        .bind(mant_item_id)
        .bind(delta)
        .bind(reason)
        .bind(work_order_item_id)
        .bind(notes)
        .execute(executor)
        .await?;

        Ok(())
    }
}
