use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// La taxonomía distingue "corrige tu entrada" (InvalidInput/InvalidState),
// "no puedes hacer esto" (Forbidden), "no existe" (NotFound) y
// "inténtalo más tarde" (errores internos).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    // Entidad inexistente DENTRO del tenant del llamador. También se usa
    // para referencias de otro tenant: nunca revelamos que el recurso
    // existe pero no es tuyo.
    #[error("{0}")]
    NotFound(String),

    // Transición de estado que viola las reglas de negocio
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("El correo ya está registrado")]
    EmailAlreadyExists,

    #[error("{0}")]
    UniqueConstraintViolation(String),

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` captura el contexto completo.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Correo o contraseña inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este correo ya está en uso.".to_string())
            }
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),

            // Todo lo demás (DatabaseError, InternalServerError, ...) es 500.
            // Se loguea el detalle completo y el cliente recibe un genérico:
            // nunca filtramos internals en la respuesta.
            ref e => {
                tracing::error!("Error interno del servidor: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn invalid_state_es_conflicto() {
        let resp = AppError::InvalidState("hay items pendientes de cierre".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_no_distingue_tenants() {
        // Un recurso ajeno y uno inexistente producen exactamente el mismo status
        let ajeno = AppError::NotFound("no se encontraron alertas válidas".into()).into_response();
        let inexistente =
            AppError::NotFound("no se encontraron alertas válidas".into()).into_response();
        assert_eq!(ajeno.status(), inexistente.status());
        assert_eq!(ajeno.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn errores_internos_no_filtran_detalles() {
        let resp = AppError::InternalServerError(anyhow::anyhow!("pool caído: secreto")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
