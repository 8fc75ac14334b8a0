use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Typed error kinds for the whole service. Storage and handler code maps
/// failures into these variants instead of matching on message text.
#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    Pool(r2d2::Error),
    Session(String),
    Hash(String),
    Export(String),
    /// Field validation failures, one message per field.
    Validation(Vec<String>),
    /// Unique-key or state-machine violation (duplicate student id,
    /// double attendance submission, deciding a non-pending record).
    Conflict(String),
    NotFound,
    /// No authenticated session.
    Unauthorized,
    /// Authenticated but the role predicates deny the action.
    Forbidden(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Pool(e) => write!(f, "Pool error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Export(e) => write!(f, "Export error: {e}"),
            AppError::Validation(errs) => write!(f, "Validation failed: {}", errs.join("; ")),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errs) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_failed",
                "details": errs,
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "conflict",
                "details": msg,
            })),
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
            })),
            AppError::Unauthorized => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "details": msg,
            })),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal",
                }))
            }
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Pool(e)
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(e: zip::result::ZipError) -> Self {
        AppError::Export(e.to_string())
    }
}
