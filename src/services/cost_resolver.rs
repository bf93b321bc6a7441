// src/services/cost_resolver.rs
//
// Resolución del costo estimado de una alerta de mantenimiento. La calidad
// de los datos de costo varía: el program item trae la estimación más
// fresca, pero puede venir en blanco para tareas recién programadas; el
// catálogo de repuestos da un cálculo de respaldo; y el snapshot de la
// propia alerta es el último recurso antes de caer a cero.

use rust_decimal::Decimal;

use crate::models::maintenance::ClaimableAlert;

/// Cascada ordenada: devuelve el primer valor positivo que aparezca.
///
/// 1. `estimated_cost` del program item, si existe y es > 0
/// 2. Σ (precio de referencia × cantidad) de los repuestos del ítem de
///    catálogo (cantidad omitida cuenta como 1), si la suma es > 0
/// 3. `estimated_cost` de la propia alerta, si es > 0
/// 4. Cero: sin referencia de costo (se registra como hueco, no como error)
///
/// Una alerta sin program item salta directo al paso 3.
pub fn resolve_cost(alert: &ClaimableAlert) -> Decimal {
    if alert.program_item_id.is_some() {
        if let Some(cost) = alert.program_estimated_cost {
            if cost > Decimal::ZERO {
                return cost;
            }
        }

        let parts_total: Decimal = alert
            .parts
            .iter()
            .map(|p| {
                p.reference_price.unwrap_or(Decimal::ZERO) * p.quantity.unwrap_or(Decimal::ONE)
            })
            .sum();
        if parts_total > Decimal::ZERO {
            return parts_total;
        }
    }

    if let Some(cost) = alert.alert_estimated_cost {
        if cost > Decimal::ZERO {
            return cost;
        }
    }

    tracing::debug!(
        alert_id = %alert.id,
        "alerta sin ninguna referencia de costo; se estima en cero"
    );
    Decimal::ZERO
}

/// El costo estimado de la orden es la suma de los costos resueltos por alerta.
pub fn estimate_total(alerts: &[ClaimableAlert]) -> Decimal {
    alerts.iter().map(resolve_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::maintenance::PartReference;
    use chrono::Utc;
    use uuid::Uuid;

    fn alerta_base() -> ClaimableAlert {
        ClaimableAlert {
            id: Uuid::new_v4(),
            program_item_id: Some(Uuid::new_v4()),
            mant_item_id: Some(Uuid::new_v4()),
            item_name: "Cambio de aceite".to_string(),
            program_estimated_cost: None,
            alert_estimated_cost: None,
            parts: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn el_program_item_manda_cuando_es_positivo() {
        let mut alert = alerta_base();
        alert.program_estimated_cost = Some(Decimal::from(100_000));
        alert.alert_estimated_cost = Some(Decimal::from(999));
        alert.parts = vec![PartReference {
            reference_price: Some(Decimal::from(50_000)),
            quantity: Some(Decimal::from(2)),
        }];

        assert_eq!(resolve_cost(&alert), Decimal::from(100_000));
    }

    #[test]
    fn cae_a_la_suma_de_repuestos_con_cantidad_default_1() {
        let mut alert = alerta_base();
        alert.program_estimated_cost = Some(Decimal::ZERO);
        alert.parts = vec![
            PartReference {
                reference_price: Some(Decimal::from(35_000)),
                quantity: Some(Decimal::from(2)),
            },
            PartReference {
                reference_price: Some(Decimal::from(12_000)),
                quantity: None, // cantidad sin especificar cuenta como 1
            },
        ];

        assert_eq!(resolve_cost(&alert), Decimal::from(82_000));
    }

    #[test]
    fn cae_al_snapshot_de_la_alerta() {
        // program item en cero, sin repuestos vinculados
        let mut alert = alerta_base();
        alert.program_estimated_cost = Some(Decimal::ZERO);
        alert.alert_estimated_cost = Some(Decimal::from(150_000));

        assert_eq!(resolve_cost(&alert), Decimal::from(150_000));
    }

    #[test]
    fn sin_program_item_salta_directo_al_snapshot() {
        let mut alert = alerta_base();
        alert.program_item_id = None;
        alert.mant_item_id = None;
        // Aunque hubiera costo de programa residual en la fila, no aplica
        alert.program_estimated_cost = Some(Decimal::from(77_000));
        alert.alert_estimated_cost = Some(Decimal::from(40_000));

        assert_eq!(resolve_cost(&alert), Decimal::from(40_000));
    }

    #[test]
    fn todas_las_fuentes_en_cero_resuelve_cero() {
        let mut alert = alerta_base();
        alert.program_estimated_cost = Some(Decimal::ZERO);
        alert.alert_estimated_cost = Some(Decimal::ZERO);

        assert_eq!(resolve_cost(&alert), Decimal::ZERO);
    }

    #[test]
    fn la_resolucion_es_determinista() {
        let mut alert = alerta_base();
        alert.program_estimated_cost = Some(Decimal::ZERO);
        alert.parts = vec![PartReference {
            reference_price: Some(Decimal::from(10_000)),
            quantity: Some(Decimal::from(3)),
        }];

        assert_eq!(resolve_cost(&alert), resolve_cost(&alert));
    }

    #[test]
    fn el_total_de_la_orden_suma_por_alerta() {
        let mut a = alerta_base();
        a.program_estimated_cost = Some(Decimal::from(100_000));
        let mut b = alerta_base();
        b.program_item_id = None;
        b.alert_estimated_cost = Some(Decimal::from(50_000));

        assert_eq!(estimate_total(&[a, b]), Decimal::from(150_000));
    }
}
