use http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::render;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity} {id} is still referenced by other records")]
    InUse { entity: &'static str, id: i64 },
    #[error("{entity} with key `{key}` already exists")]
    Duplicate { entity: &'static str, key: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Maps constraint violations raised by the store onto domain errors.
    pub fn from_write(e: sqlx::Error, entity: &'static str, id: i64, key: Option<&str>) -> Self {
        let code = e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some("23503") => AppError::InUse { entity, id },
            Some("23505") => AppError::Duplicate {
                entity,
                key: key.unwrap_or_default().to_owned(),
            },
            _ => AppError::Database(e),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InUse { .. } | AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound { entity, id } => {
                tracing::warn!(entity, id, "record not found");
                format!("No existe {entity} con id {id}.")
            }
            AppError::InUse { entity, id } => {
                tracing::warn!(entity, id, "delete refused, record in use");
                format!("No se puede eliminar {entity} {id}: otros registros dependen de él.")
            }
            AppError::Duplicate { entity, key } => {
                tracing::warn!(entity, key = %key, "duplicate key");
                format!("Ya existe {entity} con la clave {key}.")
            }
            AppError::Database(e) => {
                tracing::error!(error=%e, "internal error");
                "Error interno del servidor.".to_string()
            }
        };
        (status, Html(render::error_page(status, &message))).into_response()
    }
}
