//! Unified API error type.
//!
//! Every failure surfaced to a client is one of four kinds mapped to a fixed
//! status code; bodies are always `{"detail": "..."}` (validation failures
//! additionally carry an `errors` array). Store errors are logged and never
//! leak internal detail.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{detail}")]
    Validation {
        detail: String,
        errors: Vec<String>,
    },
    #[error("Erreur interne du serveur")]
    Internal(#[from] DbErr),
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict(detail.into())
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
            errors: Vec::new(),
        }
    }

    /// Map a store error from an insert. Two writers racing on the same key
    /// are arbitrated by the unique constraint; the loser gets a Conflict,
    /// anything else stays Internal.
    pub fn insertion(err: DbErr, conflict_detail: impl Into<String>) -> Self {
        let message = err.to_string();
        if message.contains("duplicate key") || message.contains("UNIQUE") {
            Self::Conflict(conflict_detail.into())
        } else {
            Self::Internal(err)
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| format!("{}: {}", field, e.code))
            })
            .collect();
        Self::Validation {
            detail: "Données invalides".to_string(),
            errors,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Internal(err) = self {
            log::error!("Erreur de base de données: {}", err);
        }
        let body = match self {
            Self::Validation { detail, errors } if !errors.is_empty() => {
                json!({ "detail": detail, "errors": errors })
            }
            other => json!({ "detail": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = ApiError::Internal(DbErr::Custom("secret dsn".into()));
        assert_eq!(err.to_string(), "Erreur interne du serveur");
    }
}
