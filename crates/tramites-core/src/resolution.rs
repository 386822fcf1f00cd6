//! Resolution state machine for the four request kinds.
//!
//! Every record starts in `Pendiente` and moves exactly once to a terminal
//! state. The human-facing decision label is never persisted as-is: it is
//! mapped through a closed per-kind table, and unknown labels are rejected.

use crate::error::{Error, Result};

/// The four structurally parallel record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Permission request (`solicitudes_permiso`).
    Solicitud,
    /// Absence justification (`justificaciones`).
    Justificacion,
    /// Attendance-omission justification (`omision_marca`).
    Omision,
    /// Infrastructure damage report (`reporte_infraestructura`).
    Reporte,
}

/// Initial state stamped on every new record.
pub const PENDING: &str = "Pendiente";

/// Whether a stored `estado` still admits a resolution.
///
/// NULL and empty are treated as pending (legacy rows predate the default);
/// otherwise the check is a case-insensitive substring match on `pend`.
pub fn is_pending(estado: Option<&str>) -> bool {
    match estado {
        None => true,
        Some(s) => s.is_empty() || s.to_lowercase().contains("pend"),
    }
}

/// Decision label to terminal state, per kind. The label spelling is the
/// wire contract and is matched exactly.
pub fn decision_map(kind: RequestKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        RequestKind::Solicitud | RequestKind::Omision => {
            &[("Aceptar", "Aceptado"), ("Denegar", "Denegado")]
        }
        RequestKind::Justificacion => &[
            (
                "Aceptar con rebajo salarial parcial",
                "Aceptado con rebajo parcial",
            ),
            (
                "Aceptar con rebajo salarial total",
                "Aceptado con rebajo total",
            ),
            ("Aceptar sin rebajo salarial", "Aceptado sin rebajo"),
            ("Denegar lo solicitado", "Denegado"),
            ("Acoger convocatioria", "Acoge convocatoria"),
        ],
        RequestKind::Reporte => &[
            ("Solucionado", "Solucionado"),
            ("No solucionado", "No solucionado"),
        ],
    }
}

/// Map a decision label to its terminal state.
pub fn map_decision(kind: RequestKind, label: &str) -> Result<&'static str> {
    decision_map(kind)
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, estado)| *estado)
        .ok_or_else(|| Error::InvalidDecision(label.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pending_predicate() {
        assert!(is_pending(None));
        assert!(is_pending(Some("")));
        assert!(is_pending(Some("Pendiente")));
        assert!(is_pending(Some("pendiente")));
        assert!(is_pending(Some("PENDIENTE DE REVISION")));
        assert!(!is_pending(Some("Aceptado")));
        assert!(!is_pending(Some("Denegado")));
        assert!(!is_pending(Some("Solucionado")));
    }

    #[test]
    fn justificacion_decisions_map_to_states() {
        assert_eq!(
            map_decision(RequestKind::Justificacion, "Aceptar con rebajo salarial total").unwrap(),
            "Aceptado con rebajo total"
        );
        assert_eq!(
            map_decision(RequestKind::Justificacion, "Denegar lo solicitado").unwrap(),
            "Denegado"
        );
    }

    #[test]
    fn reporte_decisions_are_the_domain_labels() {
        assert_eq!(
            map_decision(RequestKind::Reporte, "Solucionado").unwrap(),
            "Solucionado"
        );
        assert_eq!(
            map_decision(RequestKind::Reporte, "No solucionado").unwrap(),
            "No solucionado"
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(map_decision(RequestKind::Solicitud, "Aprobar").is_err());
        assert!(map_decision(RequestKind::Reporte, "Aceptar").is_err());
        // Labels never map across kinds
        assert!(map_decision(RequestKind::Omision, "Solucionado").is_err());
    }

    #[test]
    fn terminal_states_are_not_pending() {
        for kind in [
            RequestKind::Solicitud,
            RequestKind::Justificacion,
            RequestKind::Omision,
            RequestKind::Reporte,
        ] {
            for (_, estado) in decision_map(kind) {
                assert!(!is_pending(Some(estado)), "{estado} should be terminal");
            }
        }
    }
}
