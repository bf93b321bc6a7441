// src/services/watchdog_service.rs
//
// El vigilante financiero: desviación de precios contra el catálogo y
// sobrecostos contra el estimado de la orden. Los chequeos se disparan
// desde la ruta de escritura con tokio::spawn y son best-effort: si fallan
// se loguean y ya; nunca propagan error ni revierten la operación que los
// disparó.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, FinanceRepository, WorkOrderRepository},
    models::finance::FinancialAlertKind,
};

// 20% de desvío contra el precio de referencia dispara el hallazgo
const PRICE_DEVIATION_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Desvío relativo del precio observado contra el de referencia.
/// Sin referencia positiva no hay nada que comparar.
pub fn deviation_ratio(reference: Decimal, observed: Decimal) -> Option<Decimal> {
    if reference <= Decimal::ZERO {
        return None;
    }
    Some((observed - reference).abs() / reference)
}

#[derive(Clone)]
pub struct WatchdogService {
    finance_repo: FinanceRepository,
    catalog_repo: CatalogRepository,
    work_order_repo: WorkOrderRepository,
    pool: PgPool,
}

impl WatchdogService {
    pub fn new(
        finance_repo: FinanceRepository,
        catalog_repo: CatalogRepository,
        work_order_repo: WorkOrderRepository,
        pool: PgPool,
    ) -> Self {
        Self { finance_repo, catalog_repo, work_order_repo, pool }
    }

    // --- Disparadores fire-and-forget ---

    pub fn spawn_price_deviation_check(
        &self,
        tenant_id: Uuid,
        master_part_id: Uuid,
        observed_price: Decimal,
        work_order_id: Uuid,
    ) {
        let watchdog = self.clone();
        tokio::spawn(async move {
            if let Err(e) = watchdog
                .check_price_deviation(tenant_id, master_part_id, observed_price, work_order_id)
                .await
            {
                tracing::error!("falló el chequeo de desviación de precio: {e:?}");
            }
        });
    }

    pub fn spawn_budget_check(&self, tenant_id: Uuid, work_order_id: Uuid, added_cost: Decimal) {
        let watchdog = self.clone();
        tokio::spawn(async move {
            if let Err(e) = watchdog
                .check_budget_overrun(tenant_id, work_order_id, added_cost)
                .await
            {
                tracing::error!("falló el chequeo de sobrecosto: {e:?}");
            }
        });
    }

    // --- Chequeos en sí ---

    async fn check_price_deviation(
        &self,
        tenant_id: Uuid,
        master_part_id: Uuid,
        observed_price: Decimal,
        work_order_id: Uuid,
    ) -> Result<(), AppError> {
        let part = self
            .catalog_repo
            .find_master_part(&self.pool, tenant_id, master_part_id)
            .await?;

        let Some(part) = part else { return Ok(()) };
        let Some(reference) = part.reference_price else { return Ok(()) };

        let Some(ratio) = deviation_ratio(reference, observed_price) else {
            return Ok(());
        };

        if ratio > PRICE_DEVIATION_THRESHOLD {
            tracing::warn!(
                %tenant_id, %master_part_id,
                "precio observado {observed_price} se desvía {ratio} del de referencia {reference}"
            );
            self.finance_repo
                .insert_alert(
                    tenant_id,
                    FinancialAlertKind::PriceDeviation,
                    Some(work_order_id),
                    Some(master_part_id),
                    Some(observed_price),
                    Some(reference),
                    &format!(
                        "El repuesto {} se registró a {observed_price} con precio de referencia {reference}",
                        part.part_code
                    ),
                )
                .await?;
        }

        Ok(())
    }

    async fn check_budget_overrun(
        &self,
        tenant_id: Uuid,
        work_order_id: Uuid,
        added_cost: Decimal,
    ) -> Result<(), AppError> {
        let Some(order) = self
            .work_order_repo
            .find(&self.pool, tenant_id, work_order_id)
            .await?
        else {
            return Ok(());
        };

        let items_total = self
            .work_order_repo
            .sum_items_total(&self.pool, tenant_id, work_order_id)
            .await?;

        if order.estimated_cost > Decimal::ZERO && items_total > order.estimated_cost {
            tracing::warn!(
                %tenant_id, %work_order_id,
                "los ítems suman {items_total} sobre un estimado de {}", order.estimated_cost
            );
            self.finance_repo
                .insert_alert(
                    tenant_id,
                    FinancialAlertKind::BudgetOverrun,
                    Some(work_order_id),
                    None,
                    Some(items_total),
                    Some(order.estimated_cost),
                    &format!(
                        "La orden #{} superó su presupuesto: {items_total} frente a {} (último cargo: {added_cost})",
                        order.display_id, order.estimated_cost
                    ),
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desvio_relativo_simetrico() {
        let r = deviation_ratio(Decimal::from(100), Decimal::from(130)).unwrap();
        assert_eq!(r, Decimal::new(3, 1)); // 0.3
        let r = deviation_ratio(Decimal::from(100), Decimal::from(70)).unwrap();
        assert_eq!(r, Decimal::new(3, 1));
    }

    #[test]
    fn sin_referencia_no_hay_desvio() {
        assert!(deviation_ratio(Decimal::ZERO, Decimal::from(50)).is_none());
        assert!(deviation_ratio(Decimal::from(-10), Decimal::from(50)).is_none());
    }

    #[test]
    fn el_umbral_es_veinte_por_ciento() {
        assert_eq!(PRICE_DEVIATION_THRESHOLD, Decimal::new(20, 2));
        // 19% no dispara, 21% sí
        let bajo = deviation_ratio(Decimal::from(100), Decimal::from(119)).unwrap();
        let alto = deviation_ratio(Decimal::from(100), Decimal::from(121)).unwrap();
        assert!(bajo <= PRICE_DEVIATION_THRESHOLD);
        assert!(alto > PRICE_DEVIATION_THRESHOLD);
    }
}
