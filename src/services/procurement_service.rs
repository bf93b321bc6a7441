// src/services/procurement_service.rs
//
// El puente de compras: agrupa ítems con cierre pendiente en una orden de
// compra (por proveedor) o en un ticket interno (por técnico), o los cierra
// directo contra el stock. Es el ÚNICO camino legítimo por el que el
// closure_type de un ítem avanza más allá de PENDING; la compuerta de
// completado de la orden depende de eso.

use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProcurementRepository, UserRepository, WorkOrderRepository},
    models::procurement::{InternalTicket, PurchaseOrder},
    models::work_orders::{ClosureType, WorkOrderItem},
    services::inventory_service::InventoryService,
};

#[derive(Clone)]
pub struct ProcurementService {
    procurement_repo: ProcurementRepository,
    work_order_repo: WorkOrderRepository,
    user_repo: UserRepository,
    inventory_service: InventoryService,
}

impl ProcurementService {
    pub fn new(
        procurement_repo: ProcurementRepository,
        work_order_repo: WorkOrderRepository,
        user_repo: UserRepository,
        inventory_service: InventoryService,
    ) -> Self {
        Self {
            procurement_repo,
            work_order_repo,
            user_repo,
            inventory_service,
        }
    }

    // Validaciones comunes a las dos rutas de agrupado: orden viva del
    // tenant, ítems de esa orden, y todos con cierre todavía pendiente.
    async fn lock_pending_items(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<WorkOrderItem>, AppError> {
        if item_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "se requiere al menos un ítem para enrutar".to_string(),
            ));
        }

        let order = self
            .work_order_repo
            .find_for_update(&mut *conn, tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("orden de trabajo no encontrada".to_string()))?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidState(
                "la orden de trabajo ya está terminada".to_string(),
            ));
        }

        let items = self
            .procurement_repo
            .lock_items(conn, tenant_id, work_order_id, item_ids)
            .await?;

        if items.len() != item_ids.len() {
            return Err(AppError::NotFound(
                "algunos ítems no pertenecen a la orden de trabajo".to_string(),
            ));
        }

        if let Some(routed) = items.iter().find(|i| i.closure_type != ClosureType::Pending) {
            return Err(AppError::InvalidState(format!(
                "el ítem '{}' ya fue enrutado",
                routed.description
            )));
        }

        Ok(items)
    }

    /// Ruta externa: orden de compra al proveedor, ítems cerrados como
    /// EXTERNAL_INVOICE con origen EXTERNAL.
    pub async fn create_purchase_order(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        created_by: Uuid,
        work_order_id: Uuid,
        provider_id: Uuid,
        item_ids: &[Uuid],
        notes: Option<&str>,
    ) -> Result<PurchaseOrder, AppError> {
        let mut tx = Connection::begin(&mut *conn).await?;

        let provider_name = self
            .procurement_repo
            .find_provider_name(&mut *tx, tenant_id, provider_id)
            .await?
            .ok_or_else(|| AppError::NotFound("proveedor no encontrado".to_string()))?;

        let items = self
            .lock_pending_items(&mut tx, tenant_id, work_order_id, item_ids)
            .await?;

        let total_amount: Decimal = items.iter().map(|i| i.total_cost).sum();

        let po = self
            .procurement_repo
            .insert_purchase_order(
                &mut *tx,
                tenant_id,
                work_order_id,
                provider_id,
                total_amount,
                notes,
                created_by,
            )
            .await?;

        self.procurement_repo
            .route_items_to_purchase_order(
                &mut *tx,
                tenant_id,
                po.id,
                item_ids,
                &provider_name,
                created_by,
            )
            .await?;

        tx.commit().await?;
        Ok(po)
    }

    /// Ruta interna: ticket de mano de obra para el técnico, ítems cerrados
    /// como INTERNAL_TICKET.
    pub async fn create_internal_ticket(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        created_by: Uuid,
        work_order_id: Uuid,
        technician_id: Uuid,
        item_ids: &[Uuid],
        notes: Option<&str>,
    ) -> Result<InternalTicket, AppError> {
        let mut tx = Connection::begin(&mut *conn).await?;

        self.user_repo
            .find_by_id(technician_id)
            .await?
            .ok_or_else(|| AppError::NotFound("técnico no encontrado".to_string()))?;

        let items = self
            .lock_pending_items(&mut tx, tenant_id, work_order_id, item_ids)
            .await?;

        let total_amount: Decimal = items.iter().map(|i| i.total_cost).sum();

        let ticket = self
            .procurement_repo
            .insert_internal_ticket(
                &mut *tx,
                tenant_id,
                work_order_id,
                technician_id,
                total_amount,
                notes,
                created_by,
            )
            .await?;

        self.procurement_repo
            .route_items_to_internal_ticket(&mut *tx, tenant_id, ticket.id, item_ids)
            .await?;

        tx.commit().await?;
        Ok(ticket)
    }

    /// Cierre directo contra el stock interno: consume del libro (con
    /// precondición de saldo, aquí sí vinculante) y deja el ítem cerrado
    /// como INTERNAL_STOCK.
    pub async fn consume_stock_for_item(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_order_id: Uuid,
        item_id: Uuid,
    ) -> Result<WorkOrderItem, AppError> {
        let mut tx = Connection::begin(&mut *conn).await?;

        let items = self
            .lock_pending_items(&mut tx, tenant_id, work_order_id, &[item_id])
            .await?;
        let item = &items[0];

        let mant_item_id = item.mant_item_id.ok_or_else(|| {
            AppError::InvalidState(
                "el ítem no referencia un ítem de catálogo; no puede salir de stock".to_string(),
            )
        })?;

        self.inventory_service
            .consume(&mut tx, tenant_id, mant_item_id, item.quantity, item.id)
            .await?;

        let updated = self
            .procurement_repo
            .close_item_from_stock(&mut *tx, tenant_id, item_id)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
