//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A write operation had no allow-listed column to bind.
    #[error("{0}")]
    NoFields(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    /// Unique-constraint violation (SQLSTATE 23505).
    #[error("Conflicto: registro duplicado")]
    Conflict { detail: Option<String> },
    #[error("El email ya está registrado")]
    EmailTaken,
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
    #[error("{0}")]
    Db(sqlx::Error),
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("No encontrado")
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.code().as_deref() == Some("23505") {
                let detail = db
                    .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                    .and_then(|pg| pg.detail().map(str::to_string));
                return ApiError::Conflict { detail };
            }
        }
        ApiError::Db(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NoFields(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::Conflict { detail } => (StatusCode::CONFLICT, detail.clone()),
            ApiError::EmailTaken => (StatusCode::CONFLICT, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Internal { detail, .. } => (StatusCode::INTERNAL_SERVER_ERROR, detail.clone()),
            ApiError::Db(e) => {
                tracing::error!(error = %e, "database error");
                (StatusCode::BAD_REQUEST, None)
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError::not_found().into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let resp = ApiError::Conflict {
            detail: Some("Key (email)=(a@b.c) already exists.".into()),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn no_fields_maps_to_400() {
        let resp = ApiError::NoFields("Sin campos para insertar").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
