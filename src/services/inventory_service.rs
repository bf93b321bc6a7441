// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::StockAvailability,
};

pub const STOCK_CONSUMPTION_REASON: &str = "WORK_ORDER_CONSUMPTION";

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository) -> Self {
        Self { repo }
    }

    // Chequeo de disponibilidad. En el alta de ítems es solo consultivo
    // (se loguea el faltante, no se bloquea); al consumir sí es vinculante.
    pub async fn check_availability<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        mant_item_id: Uuid,
        quantity: Decimal,
    ) -> Result<StockAvailability, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = self.repo.get_level(executor, tenant_id, mant_item_id).await?;
        let current_stock = level.map(|l| l.quantity).unwrap_or(Decimal::ZERO);

        Ok(StockAvailability {
            available: current_stock >= quantity,
            current_stock,
        })
    }

    /// Consumo real contra el libro: descuenta con precondición de saldo y
    /// registra el movimiento. Sin saldo suficiente NO hay consumo parcial.
    pub async fn consume(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        mant_item_id: Uuid,
        quantity: Decimal,
        work_order_item_id: Uuid,
    ) -> Result<(), AppError> {
        let consumed = self
            .repo
            .try_consume(&mut *conn, tenant_id, mant_item_id, quantity)
            .await?;

        if !consumed {
            return Err(AppError::InvalidState(
                "stock insuficiente para consumir el ítem desde inventario".to_string(),
            ));
        }

        self.repo
            .record_movement(
                &mut *conn,
                tenant_id,
                mant_item_id,
                -quantity,
                STOCK_CONSUMPTION_REASON,
                Some(work_order_item_id),
                None,
            )
            .await?;

        Ok(())
    }
}
