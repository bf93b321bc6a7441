// src/db/alert_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::maintenance::{ClaimableAlert, MaintenanceAlert, PartReference},
};

// Fila cruda de la consulta de reclamo (alerta + program item unidos).
#[derive(Debug, sqlx::FromRow)]
struct ClaimableAlertRow {
    id: Uuid,
    program_item_id: Option<Uuid>,
    mant_item_id: Option<Uuid>,
    item_name: String,
    program_estimated_cost: Option<Decimal>,
    alert_estimated_cost: Option<Decimal>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PartReferenceRow {
    mant_item_id: Uuid,
    reference_price: Option<Decimal>,
    quantity: Option<Decimal>,
}

#[derive(Clone)]
pub struct AlertRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_vehicle<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Vec<MaintenanceAlert>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alerts = sqlx::query_as::<_, MaintenanceAlert>(
            r#"
            SELECT * FROM maintenance_alerts
            WHERE tenant_id = $1 AND vehicle_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(executor)
        .await?;

        Ok(alerts)
    }

    /// Carga las alertas todavía reclamables del vehículo, con todas sus
    /// fuentes de costo ya unidas. Bloquea las filas de alertas
    /// (`FOR UPDATE OF a`) para que dos fábricas concurrentes no evalúen
    /// el mismo reclamo a la vez.
    pub async fn load_claimable(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        vehicle_id: Uuid,
        alert_ids: &[Uuid],
    ) -> Result<Vec<ClaimableAlert>, AppError> {
        let rows = sqlx::query_as::<_, ClaimableAlertRow>(
            r#"
            SELECT
                a.id,
                a.program_item_id,
                p.mant_item_id,
                a.item_name,
                p.estimated_cost AS program_estimated_cost,
                a.estimated_cost AS alert_estimated_cost,
                a.created_at
            FROM maintenance_alerts a
            LEFT JOIN vehicle_program_items p ON a.program_item_id = p.id
            WHERE a.tenant_id = $1
              AND a.vehicle_id = $2
              AND a.id = ANY($3)
              AND a.status IN ('PENDING', 'ACKNOWLEDGED', 'SNOOZED')
            ORDER BY a.created_at ASC
            FOR UPDATE OF a
            "#,
        )
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(alert_ids)
        .fetch_all(&mut *conn)
        .await?;

        // Segundo viaje: repuestos de referencia de los ítems de catálogo
        // involucrados (para el fallback de costos por partes).
        let mant_item_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.mant_item_id).collect();

        let part_rows: Vec<PartReferenceRow> = if mant_item_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, PartReferenceRow>(
                r#"
                SELECT mip.mant_item_id, mp.reference_price, mip.quantity
                FROM mant_item_parts mip
                JOIN master_parts mp ON mip.master_part_id = mp.id
                WHERE mip.tenant_id = $1 AND mip.mant_item_id = ANY($2)
                "#,
            )
            .bind(tenant_id)
            .bind(&mant_item_ids)
            .fetch_all(&mut *conn)
            .await?
        };

        Ok(assemble_claimable(rows, part_rows))
    }

    /// El reclamo en sí: UPDATE con precondición de estado. Solo las filas
    /// que SIGUEN siendo reclamables se actualizan; el perdedor de una
    /// carrera reclama cero filas en lugar de corromper estado.
    pub async fn claim_alerts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        vehicle_id: Uuid,
        alert_ids: &[Uuid],
        work_order_id: Uuid,
        claimed_by: Uuid,
        claimed_at: DateTime<Utc>,
        response_time_minutes: i32,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claimed: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE maintenance_alerts
            SET status = 'IN_PROGRESS',
                work_order_id = $1,
                work_order_created_at = $2,
                work_order_created_by = $3,
                response_time_minutes = $4,
                updated_at = NOW()
            WHERE tenant_id = $5
              AND vehicle_id = $6
              AND id = ANY($7)
              AND status IN ('PENDING', 'ACKNOWLEDGED', 'SNOOZED')
            RETURNING id
            "#,
        )
        .bind(work_order_id)
        .bind(claimed_at)
        .bind(claimed_by)
        .bind(response_time_minutes)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(alert_ids)
        .fetch_all(executor)
        .await?;

        Ok(claimed.into_iter().map(|(id,)| id).collect())
    }

    pub async fn mark_program_items_in_progress<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        program_item_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if program_item_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE vehicle_program_items
            SET status = 'IN_PROGRESS', updated_at = NOW()
            WHERE tenant_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(tenant_id)
        .bind(program_item_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Al completar la orden: alertas vinculadas a COMPLETED (con closed_at)
    /// y sus program items también a COMPLETED.
    pub async fn complete_for_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        closed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE vehicle_program_items
            SET status = 'COMPLETED', updated_at = NOW()
            WHERE tenant_id = $1
              AND id IN (
                  SELECT program_item_id FROM maintenance_alerts
                  WHERE tenant_id = $1 AND work_order_id = $2
                    AND program_item_id IS NOT NULL
              )
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE maintenance_alerts
            SET status = 'COMPLETED', closed_at = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND work_order_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(closed_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Al cancelar la orden: las alertas vuelven a PENDING con el reclamo
    /// limpio, y los program items regresan a PENDING. El orden importa:
    /// el subquery de program items necesita el work_order_id todavía puesto.
    pub async fn revert_for_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE vehicle_program_items
            SET status = 'PENDING', updated_at = NOW()
            WHERE tenant_id = $1
              AND id IN (
                  SELECT program_item_id FROM maintenance_alerts
                  WHERE tenant_id = $1 AND work_order_id = $2
                    AND program_item_id IS NOT NULL
              )
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE maintenance_alerts
            SET status = 'PENDING',
                work_order_id = NULL,
                work_order_created_at = NULL,
                work_order_created_by = NULL,
                response_time_minutes = NULL,
                updated_at = NOW()
            WHERE tenant_id = $1 AND work_order_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// Une las filas de alertas con sus referencias de repuestos. Puro, sin banco.
fn assemble_claimable(
    rows: Vec<ClaimableAlertRow>,
    part_rows: Vec<PartReferenceRow>,
) -> Vec<ClaimableAlert> {
    let mut parts_by_item: HashMap<Uuid, Vec<PartReference>> = HashMap::new();
    for p in part_rows {
        parts_by_item
            .entry(p.mant_item_id)
            .or_default()
            .push(PartReference {
                reference_price: p.reference_price,
                quantity: p.quantity,
            });
    }

    rows.into_iter()
        .map(|r| {
            let parts = r
                .mant_item_id
                .and_then(|id| parts_by_item.get(&id).cloned())
                .unwrap_or_default();
            ClaimableAlert {
                id: r.id,
                program_item_id: r.program_item_id,
                mant_item_id: r.mant_item_id,
                item_name: r.item_name,
                program_estimated_cost: r.program_estimated_cost,
                alert_estimated_cost: r.alert_estimated_cost,
                parts,
                created_at: r.created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Uuid, mant_item_id: Option<Uuid>) -> ClaimableAlertRow {
        ClaimableAlertRow {
            id,
            program_item_id: mant_item_id.map(|_| Uuid::new_v4()),
            mant_item_id,
            item_name: "Cambio de aceite".to_string(),
            program_estimated_cost: None,
            alert_estimated_cost: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn arma_las_partes_por_item_de_catalogo() {
        let item_a = Uuid::new_v4();
        let item_b = Uuid::new_v4();
        let rows = vec![row(Uuid::new_v4(), Some(item_a)), row(Uuid::new_v4(), Some(item_b))];
        let parts = vec![
            PartReferenceRow {
                mant_item_id: item_a,
                reference_price: Some(Decimal::from(35000)),
                quantity: Some(Decimal::from(2)),
            },
            PartReferenceRow {
                mant_item_id: item_a,
                reference_price: Some(Decimal::from(12000)),
                quantity: None,
            },
        ];

        let alerts = assemble_claimable(rows, parts);
        assert_eq!(alerts[0].parts.len(), 2);
        assert!(alerts[1].parts.is_empty());
    }

    #[test]
    fn alerta_sin_program_item_queda_sin_partes() {
        let alerts = assemble_claimable(vec![row(Uuid::new_v4(), None)], vec![]);
        assert!(alerts[0].parts.is_empty());
        assert!(alerts[0].program_item_id.is_none());
    }
}
