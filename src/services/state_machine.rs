// src/services/state_machine.rs
//
// Guardas puras de la máquina de estados de la orden de trabajo. Solo
// avance hacia adelante, con la cancelación como única salida de escape;
// COMPLETED y CANCELLED no transicionan jamás. La compuerta de cierre de
// ítems se verifica aparte (necesita banco); aquí vive todo lo que se puede
// decidir con los dos estados en la mano.

use crate::common::error::AppError;
use crate::middleware::rbac::{
    PermWorkOrdersApprove, PermWorkOrdersClose, PermWorkOrdersExecute, PermissionDef,
};
use crate::models::work_orders::WorkOrderStatus;

use WorkOrderStatus::*;

fn status_label(status: WorkOrderStatus) -> &'static str {
    match status {
        Pending => "pendiente",
        PendingApproval => "pendiente de aprobación",
        Approved => "aprobada",
        Rejected => "rechazada",
        InProgress => "en progreso",
        PendingInvoice => "pendiente de factura",
        Completed => "completada",
        Cancelled => "cancelada",
    }
}

/// ¿Es legal pasar de `from` a `to`? No consulta la compuerta de ítems:
/// esa es responsabilidad del servicio al entrar a COMPLETED.
pub fn ensure_transition(from: WorkOrderStatus, to: WorkOrderStatus) -> Result<(), AppError> {
    // Los terminales no admiten NINGUNA transición posterior
    if from.is_terminal() {
        return Err(AppError::InvalidState(format!(
            "la orden de trabajo ya está {}",
            status_label(from)
        )));
    }

    let allowed = match to {
        // La cancelación es alcanzable desde cualquier estado no terminal
        Cancelled => true,
        // El cierre admite llegar desde cualquier punto del camino "feliz";
        // la compuerta de ítems pendientes se evalúa después
        Completed => matches!(from, Pending | Approved | InProgress | PendingInvoice),
        InProgress => matches!(from, Pending | Approved),
        // Cadena de aprobación: política intermedia configurable
        PendingApproval => matches!(from, Pending | Rejected),
        Approved | Rejected => matches!(from, PendingApproval),
        PendingInvoice => matches!(from, InProgress),
        // Nadie regresa a PENDING
        Pending => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::InvalidState(format!(
            "transición no permitida: {} -> {}",
            status_label(from),
            status_label(to)
        )))
    }
}

/// Capacidad requerida para entrar al estado destino.
pub fn required_capability(to: WorkOrderStatus) -> &'static str {
    match to {
        Completed => PermWorkOrdersClose::slug(),
        PendingApproval | Approved | Rejected => PermWorkOrdersApprove::slug(),
        _ => PermWorkOrdersExecute::slug(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camino_feliz_hacia_adelante() {
        assert!(ensure_transition(Pending, InProgress).is_ok());
        assert!(ensure_transition(InProgress, Completed).is_ok());
        // Completar sin haber arrancado también es legal (la compuerta de
        // ítems es la que protege el cierre)
        assert!(ensure_transition(Pending, Completed).is_ok());
    }

    #[test]
    fn cadena_de_aprobacion() {
        assert!(ensure_transition(Pending, PendingApproval).is_ok());
        assert!(ensure_transition(PendingApproval, Approved).is_ok());
        assert!(ensure_transition(PendingApproval, Rejected).is_ok());
        assert!(ensure_transition(Rejected, PendingApproval).is_ok());
        assert!(ensure_transition(Approved, InProgress).is_ok());
        assert!(ensure_transition(InProgress, PendingInvoice).is_ok());
        assert!(ensure_transition(PendingInvoice, Completed).is_ok());

        // Saltarse la aprobación hacia atrás no existe
        assert!(ensure_transition(Approved, PendingApproval).is_err());
        assert!(ensure_transition(Rejected, InProgress).is_err());
    }

    #[test]
    fn cancelacion_desde_cualquier_no_terminal() {
        for from in [Pending, PendingApproval, Approved, Rejected, InProgress, PendingInvoice] {
            assert!(ensure_transition(from, Cancelled).is_ok());
        }
    }

    #[test]
    fn una_orden_completada_no_se_cancela() {
        let err = ensure_transition(Completed, Cancelled).unwrap_err();
        match err {
            AppError::InvalidState(msg) => assert!(msg.contains("completada")),
            other => panic!("se esperaba InvalidState, llegó {other:?}"),
        }
    }

    #[test]
    fn los_terminales_son_de_una_sola_direccion() {
        for to in [Pending, PendingApproval, Approved, Rejected, InProgress, PendingInvoice, Completed, Cancelled] {
            assert!(ensure_transition(Completed, to).is_err());
            assert!(ensure_transition(Cancelled, to).is_err());
        }
    }

    #[test]
    fn no_hay_regresiones() {
        assert!(ensure_transition(InProgress, Pending).is_err());
        assert!(ensure_transition(Completed, InProgress).is_err());
        assert!(ensure_transition(InProgress, InProgress).is_err());
    }

    #[test]
    fn capacidad_por_estado_destino() {
        assert_eq!(required_capability(Completed), "workorders:close");
        assert_eq!(required_capability(Approved), "workorders:approve");
        assert_eq!(required_capability(Rejected), "workorders:approve");
        assert_eq!(required_capability(PendingApproval), "workorders:approve");
        assert_eq!(required_capability(InProgress), "workorders:execute");
        assert_eq!(required_capability(Cancelled), "workorders:execute");
    }
}
