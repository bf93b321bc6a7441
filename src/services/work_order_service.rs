// src/services/work_order_service.rs
//
// El motor de órdenes de trabajo: la fábrica (alertas -> orden + ítems),
// la máquina de estados con su compuerta de cierre, y el manejo de ítems
// ad hoc. Cada operación es una unidad de trabajo atómica: o se aplica
// completa o no se aplica nada.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::work_order_repo::{NewWorkOrder, NewWorkOrderItem},
    db::{AlertRepository, CatalogRepository, FleetRepository, WorkOrderRepository},
    models::auth::User,
    models::catalog::{MantItemKind, MasterPart},
    models::maintenance::{ClaimableAlert, MaintenanceAlert},
    models::work_orders::{
        ItemSource, MantType, Priority, WorkOrder, WorkOrderExpense, WorkOrderItemDetail,
        WorkOrderStatus, WorkType,
    },
    services::cost_resolver,
    services::inventory_service::InventoryService,
    services::state_machine,
    services::watchdog_service::WatchdogService,
};

// Marcadores de proveedor para los ítems creados desde alertas
const SUPPLIER_FROM_PROVIDER: &str = "from-provider";
const SUPPLIER_NOT_APPLICABLE: &str = "N/A";

// Entrada de la fábrica. Los enums ya llegan validados por serde; aquí solo
// se aplican los defaults.
#[derive(Debug)]
pub struct CreateWorkOrderInput {
    pub vehicle_id: Uuid,
    pub alert_ids: Vec<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub technician_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub mant_type: Option<MantType>,
    pub work_type: Option<WorkType>,
}

#[derive(Debug)]
pub struct AddItemInput {
    pub mant_item_id: Uuid,
    pub master_part_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub description: Option<String>,
    pub item_source: Option<ItemSource>,
}

// Minutos enteros (piso) entre la creación de la alerta y su reclamo.
fn response_time_minutes(alert_created_at: DateTime<Utc>, claimed_at: DateTime<Utc>) -> i32 {
    (claimed_at - alert_created_at).num_minutes() as i32
}

#[derive(Clone)]
pub struct WorkOrderService {
    work_order_repo: WorkOrderRepository,
    alert_repo: AlertRepository,
    fleet_repo: FleetRepository,
    catalog_repo: CatalogRepository,
    inventory_service: InventoryService,
    watchdog: WatchdogService,
}

impl WorkOrderService {
    pub fn new(
        work_order_repo: WorkOrderRepository,
        alert_repo: AlertRepository,
        fleet_repo: FleetRepository,
        catalog_repo: CatalogRepository,
        inventory_service: InventoryService,
        watchdog: WatchdogService,
    ) -> Self {
        Self {
            work_order_repo,
            alert_repo,
            fleet_repo,
            catalog_repo,
            inventory_service,
            watchdog,
        }
    }

    // =========================================================================
    //  FÁBRICA
    // =========================================================================

    /// Crea la orden a partir de sus alertas: reclamo con precondición de
    /// estado, program items a IN_PROGRESS y un ítem por alerta, todo en una
    /// sola transacción. El perdedor de una carrera por las mismas alertas
    /// reclama cero filas y la operación completa se revierte como NotFound.
    pub async fn create_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        requester: &User,
        input: CreateWorkOrderInput,
    ) -> Result<WorkOrder, AppError> {
        // 1. Validación de entrada
        if input.title.trim().is_empty() {
            return Err(AppError::InvalidInput("el título es obligatorio".to_string()));
        }

        let mant_type = input.mant_type.unwrap_or(MantType::Preventive);
        let priority = input.priority.unwrap_or(Priority::Medium);
        let work_type = input.work_type.unwrap_or(WorkType::External);

        // Solo las correctivas pueden nacer sin alertas (los ítems ad hoc
        // llegan después por el manejador de ítems)
        if mant_type != MantType::Corrective && input.alert_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "alertIds son requeridos para órdenes de trabajo no correctivas".to_string(),
            ));
        }

        let mut tx = Connection::begin(&mut *conn).await?;

        // 2. Vehículo del tenant (fuente del snapshot de kilometraje)
        let vehicle = self
            .fleet_repo
            .find_vehicle(&mut *tx, tenant_id, input.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("vehículo no encontrado".to_string()))?;

        // 3. Alertas todavía reclamables, con sus fuentes de costo
        let alerts: Vec<ClaimableAlert> = if input.alert_ids.is_empty() {
            Vec::new()
        } else {
            self.alert_repo
                .load_claimable(&mut tx, tenant_id, input.vehicle_id, &input.alert_ids)
                .await?
        };

        if (mant_type == MantType::Preventive || !input.alert_ids.is_empty()) && alerts.is_empty()
        {
            return Err(AppError::NotFound(
                "no se encontraron alertas válidas".to_string(),
            ));
        }

        // 4. Cascada de costos por alerta
        let resolved: Vec<(Decimal, &ClaimableAlert)> = alerts
            .iter()
            .map(|a| (cost_resolver::resolve_cost(a), a))
            .collect();
        let estimated_cost: Decimal = resolved.iter().map(|(c, _)| *c).sum();

        let is_package_work = alerts.len() > 1;

        // 5. La orden en sí
        let order = self
            .work_order_repo
            .insert(
                &mut *tx,
                NewWorkOrder {
                    tenant_id,
                    vehicle_id: input.vehicle_id,
                    title: input.title.clone(),
                    description: input.description.clone(),
                    mant_type,
                    work_type,
                    priority,
                    estimated_cost,
                    creation_mileage: vehicle.mileage,
                    is_package_work,
                    package_name: is_package_work.then(|| input.title.clone()),
                    start_date: input.scheduled_date,
                    requested_by: requester.id,
                    technician_id: input.technician_id,
                    provider_id: input.provider_id,
                },
            )
            .await?;

        if !alerts.is_empty() {
            // 6. Reclamo con precondición: el tiempo de respuesta se calcula
            // sobre la primera alerta reclamada y se aplica al lote completo
            let now = Utc::now();
            let response_minutes = response_time_minutes(alerts[0].created_at, now);
            let alert_ids: Vec<Uuid> = alerts.iter().map(|a| a.id).collect();

            let claimed = self
                .alert_repo
                .claim_alerts(
                    &mut *tx,
                    tenant_id,
                    input.vehicle_id,
                    &alert_ids,
                    order.id,
                    requester.id,
                    now,
                    response_minutes,
                )
                .await?;

            // Reclamo parcial == alguien más ganó la carrera. Se revierte
            // todo; para el llamador es lo mismo que "alertas ya tomadas".
            if claimed.len() != alerts.len() {
                return Err(AppError::NotFound(
                    "no se encontraron alertas válidas".to_string(),
                ));
            }

            // 7. Program items vinculados a IN_PROGRESS
            let program_item_ids: Vec<Uuid> =
                alerts.iter().filter_map(|a| a.program_item_id).collect();
            self.alert_repo
                .mark_program_items_in_progress(&mut *tx, tenant_id, &program_item_ids)
                .await?;

            // 8. Un ítem por alerta, al costo resuelto
            let supplier = if input.provider_id.is_some() {
                SUPPLIER_FROM_PROVIDER
            } else {
                SUPPLIER_NOT_APPLICABLE
            };

            for (cost, alert) in &resolved {
                self.work_order_repo
                    .insert_item(
                        &mut *tx,
                        NewWorkOrderItem {
                            tenant_id,
                            work_order_id: order.id,
                            mant_item_id: alert.mant_item_id,
                            master_part_id: None,
                            alert_id: Some(alert.id),
                            description: alert.item_name.clone(),
                            quantity: Decimal::ONE,
                            unit_price: *cost,
                            total_cost: *cost,
                            item_source: ItemSource::External,
                            supplier: Some(supplier.to_string()),
                            purchased_by: None,
                        },
                    )
                    .await?;
            }
        }

        tx.commit().await?;

        // Chequeo de presupuesto fuera de la transacción: best-effort
        self.watchdog
            .spawn_budget_check(tenant_id, order.id, estimated_cost);

        Ok(order)
    }

    // =========================================================================
    //  MÁQUINA DE ESTADOS
    // =========================================================================

    /// Aplica una transición de estado. Las guardas puras deciden la
    /// legalidad; entrar a COMPLETED además exige cero ítems con cierre
    /// pendiente, y CANCELLED devuelve las alertas a PENDING.
    pub async fn transition_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        new_status: WorkOrderStatus,
        completion_mileage: Option<Decimal>,
    ) -> Result<WorkOrder, AppError> {
        let mut tx = Connection::begin(&mut *conn).await?;

        let order = self
            .work_order_repo
            .find_for_update(&mut *tx, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))?;

        state_machine::ensure_transition(order.status, new_status)?;

        let updated = match new_status {
            WorkOrderStatus::InProgress => {
                self.work_order_repo
                    .start(&mut *tx, tenant_id, work_order_id, Utc::now())
                    .await?
            }
            WorkOrderStatus::Completed => {
                // La compuerta: todos los ítems deben tener cierre resuelto
                let pending = self
                    .work_order_repo
                    .count_items_pending_closure(&mut *tx, tenant_id, work_order_id)
                    .await?;
                if pending > 0 {
                    return Err(AppError::InvalidState(
                        "hay items pendientes de cierre".to_string(),
                    ));
                }

                let now = Utc::now();
                let order = self
                    .work_order_repo
                    .complete(&mut tx, tenant_id, work_order_id, now, completion_mileage)
                    .await?;

                // Alertas y program items vinculados se cierran con la orden
                self.alert_repo
                    .complete_for_work_order(&mut tx, tenant_id, work_order_id, now)
                    .await?;

                order
            }
            WorkOrderStatus::Cancelled => {
                // Las alertas vuelven al ruedo; los ítems quedan como están
                self.alert_repo
                    .revert_for_work_order(&mut tx, tenant_id, work_order_id)
                    .await?;

                self.work_order_repo
                    .set_status(&mut *tx, tenant_id, work_order_id, WorkOrderStatus::Cancelled)
                    .await?
            }
            // Estados intermedios de la cadena de aprobación
            other => {
                self.work_order_repo
                    .set_status(&mut *tx, tenant_id, work_order_id, other)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<WorkOrder, AppError> {
        self.transition_work_order(conn, tenant_id, work_order_id, WorkOrderStatus::Cancelled, None)
            .await
    }

    // =========================================================================
    //  ÍTEMS
    // =========================================================================

    pub async fn list_items(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        kinds: Option<&[MantItemKind]>,
    ) -> Result<Vec<WorkOrderItemDetail>, AppError> {
        // La orden tiene que ser del tenant; si no, "no existe"
        self.work_order_repo
            .find(&mut *conn, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))?;

        self.work_order_repo
            .list_items(&mut *conn, tenant_id, work_order_id, kinds)
            .await
    }

    /// Alta de un ítem ad hoc por fuera del conjunto original de alertas.
    /// Los chequeos de precio y presupuesto se disparan después, best-effort;
    /// el de stock solo advierte.
    pub async fn add_item(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        actor: &User,
        work_order_id: Uuid,
        input: AddItemInput,
    ) -> Result<WorkOrderItemDetail, AppError> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "la cantidad debe ser mayor que cero".to_string(),
            ));
        }

        let order = self
            .work_order_repo
            .find(&mut *conn, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "no se pueden agregar ítems a una orden {}",
                match order.status {
                    WorkOrderStatus::Completed => "completada",
                    _ => "cancelada",
                }
            )));
        }

        let mant_item = self
            .catalog_repo
            .find_mant_item(&mut *conn, tenant_id, input.mant_item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("ítem de catálogo no encontrado".to_string()))?;

        let item_source = input.item_source.unwrap_or(ItemSource::External);
        let total_cost = input.unit_price * input.quantity;
        let master_part_id = input.master_part_id.or(mant_item.master_part_id);

        // Sourcing desde stock: el faltante se advierte pero no bloquea
        if item_source == ItemSource::InternalStock {
            let availability = self
                .inventory_service
                .check_availability(&mut *conn, tenant_id, mant_item.id, input.quantity)
                .await?;
            if !availability.available {
                tracing::warn!(
                    %tenant_id, mant_item_id = %mant_item.id,
                    "stock insuficiente al agregar ítem: {} disponible, {} requerido",
                    availability.current_stock, input.quantity
                );
            }
        }

        let item = self
            .work_order_repo
            .insert_item(
                &mut *conn,
                NewWorkOrderItem {
                    tenant_id,
                    work_order_id,
                    mant_item_id: Some(mant_item.id),
                    master_part_id,
                    alert_id: None,
                    description: input
                        .description
                        .clone()
                        .unwrap_or_else(|| mant_item.name.clone()),
                    quantity: input.quantity,
                    unit_price: input.unit_price,
                    total_cost,
                    item_source,
                    supplier: None,
                    purchased_by: Some(actor.id),
                },
            )
            .await?;

        // Chequeos del vigilante, fuera del camino crítico
        if mant_item.kind == MantItemKind::Part {
            if let Some(master_part_id) = master_part_id {
                self.watchdog.spawn_price_deviation_check(
                    tenant_id,
                    master_part_id,
                    input.unit_price,
                    work_order_id,
                );
            }
        }
        self.watchdog
            .spawn_budget_check(tenant_id, work_order_id, total_cost);

        // Devuelve el ítem con el catálogo ya aplanado
        let master_part: Option<MasterPart> = match master_part_id {
            Some(id) => {
                self.catalog_repo
                    .find_master_part(&mut *conn, tenant_id, id)
                    .await?
            }
            None => None,
        };

        Ok(WorkOrderItemDetail {
            item,
            item_name: Some(mant_item.name),
            item_kind: Some(mant_item.kind),
            item_category: mant_item.category,
            part_code: master_part.as_ref().map(|p| p.part_code.clone()),
            part_description: master_part.and_then(|p| p.description),
        })
    }

    // =========================================================================
    //  GASTOS
    // =========================================================================

    pub async fn add_expense(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        actor: &User,
        work_order_id: Uuid,
        concept: &str,
        amount: Decimal,
    ) -> Result<WorkOrderExpense, AppError> {
        if concept.trim().is_empty() {
            return Err(AppError::InvalidInput("el concepto es obligatorio".to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "el monto debe ser mayor que cero".to_string(),
            ));
        }

        let order = self
            .work_order_repo
            .find(&mut *conn, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidState(
                "no se pueden registrar gastos sobre una orden terminada".to_string(),
            ));
        }

        let expense = self
            .work_order_repo
            .insert_expense(&mut *conn, tenant_id, work_order_id, concept, amount, actor.id)
            .await?;

        self.watchdog
            .spawn_budget_check(tenant_id, work_order_id, amount);

        Ok(expense)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    /// Alertas del vehículo: lo que el taller mira antes de convertirlas
    /// en una orden de trabajo.
    pub async fn list_vehicle_alerts(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Vec<MaintenanceAlert>, AppError> {
        self.fleet_repo
            .find_vehicle(&mut *conn, tenant_id, vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("vehículo no encontrado".to_string()))?;

        self.alert_repo
            .list_for_vehicle(&mut *conn, tenant_id, vehicle_id)
            .await
    }

    pub async fn get_work_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<WorkOrder, AppError> {
        self.work_order_repo
            .find(&mut *conn, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))
    }

    pub async fn list_work_orders(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<WorkOrder>, AppError> {
        self.work_order_repo.list(&mut *conn, tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tiempo_de_respuesta_en_minutos_piso() {
        let created = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let claimed = Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 59).unwrap();
        // 90 minutos y 59 segundos -> piso 90
        assert_eq!(response_time_minutes(created, claimed), 90);
    }

    #[test]
    fn tiempo_de_respuesta_inmediato_es_cero() {
        let t = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 30).unwrap();
        assert_eq!(response_time_minutes(t, t), 0);
    }

    #[test]
    fn total_del_item_respeta_el_producto() {
        // El invariante total = cantidad x precio unitario, en decimal exacto
        let quantity = Decimal::new(25, 1); // 2.5
        let unit_price = Decimal::new(10_990, 2); // 109.90
        assert_eq!(quantity * unit_price, Decimal::new(274_750, 3)); // 274.750
    }
}
