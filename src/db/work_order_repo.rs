// src/db/work_order_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::MantItemKind,
    models::work_orders::{
        ItemSource, MantType, Priority, WorkOrder, WorkOrderExpense, WorkOrderItem,
        WorkOrderItemDetail, WorkOrderStatus, WorkType,
    },
};

// Datos de inserción de la orden. El estado inicial siempre es PENDING;
// el snapshot de kilometraje viene del vehículo, nunca del payload.
#[derive(Debug)]
pub struct NewWorkOrder {
    pub tenant_id: Uuid,
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub mant_type: MantType,
    pub work_type: WorkType,
    pub priority: Priority,
    pub estimated_cost: Decimal,
    pub creation_mileage: Decimal,
    pub is_package_work: bool,
    pub package_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub requested_by: Uuid,
    pub technician_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct NewWorkOrderItem {
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    pub mant_item_id: Option<Uuid>,
    pub master_part_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_cost: Decimal,
    pub item_source: ItemSource,
    pub supplier: Option<String>,
    pub purchased_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct WorkOrderRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl WorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ÓRDENES
    // =========================================================================

    pub async fn insert<'e, E>(&self, executor: E, new: NewWorkOrder) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO work_orders (
                tenant_id, vehicle_id, title, description,
                mant_type, work_type, priority,
                estimated_cost, creation_mileage,
                is_package_work, package_name, start_date,
                requested_by, technician_id, provider_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(new.tenant_id)
        .bind(new.vehicle_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.mant_type)
        .bind(new.work_type)
        .bind(new.priority)
        .bind(new.estimated_cost)
        .bind(new.creation_mileage)
        .bind(new.is_package_work)
        .bind(&new.package_name)
        .bind(new.start_date)
        .bind(new.requested_by)
        .bind(new.technician_id)
        .bind(new.provider_id)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, WorkOrder>(
            "SELECT * FROM work_orders WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    // Variante con bloqueo de fila: toda transición parte de aquí para que
    // dos transiciones concurrentes sobre la misma orden se serialicen.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, WorkOrder>(
            "SELECT * FROM work_orders WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, WorkOrder>(
            "SELECT * FROM work_orders WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(orders)
    }

    // Transición simple (estados intermedios y cancelación): solo cambia el status.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        status: WorkOrderStatus,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders
            SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    // Arranque: fija start_date solo si aún no estaba puesto.
    pub async fn start<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders
            SET status = 'IN_PROGRESS',
                start_date = COALESCE(start_date, $3),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(started_at)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Cierre: una sola sentencia calcula el costo real (ítems + gastos)
    /// y sella end_date/kilometraje. Los ítems se completan aparte, en la
    /// misma transacción.
    pub async fn complete(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        completed_at: DateTime<Utc>,
        completion_mileage: Option<Decimal>,
    ) -> Result<WorkOrder, AppError> {
        let order = sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders
            SET status = 'COMPLETED',
                end_date = $3,
                completion_mileage = COALESCE($4, completion_mileage),
                actual_cost = (
                    COALESCE((SELECT SUM(total_cost) FROM work_order_items
                              WHERE work_order_id = work_orders.id), 0)
                  + COALESCE((SELECT SUM(amount) FROM work_order_expenses
                              WHERE work_order_id = work_orders.id), 0)
                ),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(completed_at)
        .bind(completion_mileage)
        .fetch_one(&mut *conn)
        .await?;

        // Los ítems se completan en bloque junto con la orden: no existe
        // un camino de completado individual por ítem.
        sqlx::query(
            r#"
            UPDATE work_order_items
            SET status = 'COMPLETED', updated_at = NOW()
            WHERE tenant_id = $1 AND work_order_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .execute(&mut *conn)
        .await?;

        Ok(order)
    }

    // =========================================================================
    //  ÍTEMS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        new: NewWorkOrderItem,
    ) -> Result<WorkOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, WorkOrderItem>(
            r#"
            INSERT INTO work_order_items (
                tenant_id, work_order_id, mant_item_id, master_part_id, alert_id,
                description, quantity, unit_price, total_cost,
                item_source, supplier, purchased_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(new.tenant_id)
        .bind(new.work_order_id)
        .bind(new.mant_item_id)
        .bind(new.master_part_id)
        .bind(new.alert_id)
        .bind(&new.description)
        .bind(new.quantity)
        .bind(new.unit_price)
        .bind(new.total_cost)
        .bind(new.item_source)
        .bind(&new.supplier)
        .bind(new.purchased_by)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<WorkOrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, WorkOrderItem>(
            r#"
            SELECT * FROM work_order_items
            WHERE tenant_id = $1 AND work_order_id = $2 AND id = $3
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    // Listado con el catálogo aplanado (nombre, tipo, categoría, repuesto).
    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        kinds: Option<&[MantItemKind]>,
    ) -> Result<Vec<WorkOrderItemDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let base = r#"
            SELECT i.*,
                   m.name AS item_name,
                   m.kind AS item_kind,
                   m.category AS item_category,
                   mp.part_code AS part_code,
                   mp.description AS part_description
            FROM work_order_items i
            LEFT JOIN mant_items m ON i.mant_item_id = m.id
            LEFT JOIN master_parts mp ON i.master_part_id = mp.id
            WHERE i.tenant_id = $1 AND i.work_order_id = $2
        "#;

        let items = match kinds {
            Some(kinds) if !kinds.is_empty() => {
                let sql = format!("{base} AND m.kind = ANY($3) ORDER BY i.created_at ASC");
                sqlx::query_as::<_, WorkOrderItemDetail>(&sql)
                    .bind(tenant_id)
                    .bind(work_order_id)
                    .bind(kinds)
                    .fetch_all(executor)
                    .await?
            }
            _ => {
                let sql = format!("{base} ORDER BY i.created_at ASC");
                sqlx::query_as::<_, WorkOrderItemDetail>(&sql)
                    .bind(tenant_id)
                    .bind(work_order_id)
                    .fetch_all(executor)
                    .await?
            }
        };

        Ok(items)
    }

    // La compuerta de completado: cuántos ítems siguen con cierre PENDING.
    pub async fn count_items_pending_closure<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM work_order_items
            WHERE tenant_id = $1 AND work_order_id = $2 AND closure_type = 'PENDING'
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    pub async fn sum_items_total<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (total,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cost), 0) FROM work_order_items
            WHERE tenant_id = $1 AND work_order_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  GASTOS
    // =========================================================================

    pub async fn insert_expense<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        concept: &str,
        amount: Decimal,
        created_by: Uuid,
    ) -> Result<WorkOrderExpense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, WorkOrderExpense>(
            r#"
            INSERT INTO work_order_expenses (tenant_id, work_order_id, concept, amount, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(concept)
        .bind(amount)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }
}
