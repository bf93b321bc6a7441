// src/db/procurement_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::procurement::{InternalTicket, PurchaseOrder},
    models::work_orders::WorkOrderItem,
};

#[derive(Clone)]
pub struct ProcurementRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl ProcurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Bloquea los ítems solicitados de la orden. El servicio valida que
    // todos sigan con cierre PENDING antes de enrutar.
    pub async fn lock_items(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<WorkOrderItem>, AppError> {
        let items = sqlx::query_as::<_, WorkOrderItem>(
            r#"
            SELECT * FROM work_order_items
            WHERE tenant_id = $1 AND work_order_id = $2 AND id = ANY($3)
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(item_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    pub async fn find_provider_name<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM providers WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(provider_id)
                .fetch_optional(executor)
                .await?;

        Ok(row.map(|(name,)| name))
    }

    pub async fn insert_purchase_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        provider_id: Uuid,
        total_amount: Decimal,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let po = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (
                tenant_id, work_order_id, provider_id, total_amount, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(provider_id)
        .bind(total_amount)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(po)
    }

    pub async fn insert_internal_ticket<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        technician_id: Uuid,
        total_amount: Decimal,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<InternalTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, InternalTicket>(
            r#"
            INSERT INTO internal_tickets (
                tenant_id, work_order_id, technician_id, total_amount, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(technician_id)
        .bind(total_amount)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(ticket)
    }

    // Ruta externa: los ítems quedan cerrados como EXTERNAL_INVOICE.
    // Este UPDATE (y sus dos hermanos) son el ÚNICO camino que avanza
    // closure_type más allá de PENDING.
    pub async fn route_items_to_purchase_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_order_id: Uuid,
        item_ids: &[Uuid],
        supplier: &str,
        purchased_by: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE work_order_items
            SET item_source = 'EXTERNAL',
                closure_type = 'EXTERNAL_INVOICE',
                purchase_order_id = $2,
                supplier = $3,
                purchased_by = $4,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = ANY($5)
            "#,
        )
        .bind(tenant_id)
        .bind(purchase_order_id)
        .bind(supplier)
        .bind(purchased_by)
        .bind(item_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn route_items_to_internal_ticket<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        internal_ticket_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE work_order_items
            SET closure_type = 'INTERNAL_TICKET',
                internal_ticket_id = $2,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = ANY($3)
            "#,
        )
        .bind(tenant_id)
        .bind(internal_ticket_id)
        .bind(item_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn close_item_from_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<WorkOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, WorkOrderItem>(
            r#"
            UPDATE work_order_items
            SET item_source = 'INTERNAL_STOCK',
                closure_type = 'INTERNAL_STOCK',
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(item_id)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }
}
