//! Error types for the entitlement service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("identity endpoint error: {0}")]
  Identity(#[from] reqwest::Error),

  #[error("unrecognized license tier `{0}`")]
  InvalidTier(String),

  #[error("username not found")]
  AliasNotFound,

  #[error("license record not found")]
  RecordNotFound,

  #[error("invalid credentials")]
  Unauthorized,

  #[error("admin privileges required")]
  Forbidden,

  #[error("record was modified concurrently")]
  Conflict,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
      }
      Error::Identity(_) => {
        (StatusCode::BAD_GATEWAY, "Identity endpoint error")
      }
      Error::InvalidTier(_) => {
        (StatusCode::BAD_REQUEST, "Unrecognized license tier")
      }
      Error::AliasNotFound => (StatusCode::NOT_FOUND, "Username not found"),
      Error::RecordNotFound => {
        (StatusCode::NOT_FOUND, "License record not found")
      }
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
      Error::Forbidden => (StatusCode::FORBIDDEN, "Admin privileges required"),
      Error::Conflict => {
        (StatusCode::CONFLICT, "Record was modified concurrently")
      }
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
