use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Domain errors; every handler returns `Result<_, ApiError>` and the
/// translation to a status code happens in exactly one place.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found")]
  NotFound,

  #[error("forbidden")]
  Forbidden,

  #[error("unauthenticated")]
  Unauthenticated,

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("timed out waiting on a backing service")]
  Timeout,

  #[error("identity provider rejected the request with status {0}")]
  Upstream(u16),

  #[error("database error: {0}")]
  Database(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub const fn status_code(&self) -> StatusCode {
    match self {
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::Unauthenticated => StatusCode::UNAUTHORIZED,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
      Self::Upstream(_) => StatusCode::BAD_GATEWAY,
      Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status_code();

    match &self {
      // 403 carries no body so a denied request is indistinguishable from
      // one against content the caller must not learn about
      ApiError::Forbidden => status.into_response(),

      ApiError::Validation(detail) => {
        (status, Json(json!({ "detail": detail }))).into_response()
      }

      ApiError::Database(_) | ApiError::Internal(_) | ApiError::Upstream(_) => {
        error!("{self}");
        status.into_response()
      }

      _ => status.into_response(),
    }
  }
}

impl From<diesel::result::Error> for ApiError {
  /// A store-level "no row" is normalised to `NotFound` instead of leaking
  /// through as a raw database fault.
  fn from(e: diesel::result::Error) -> Self {
    match e {
      diesel::result::Error::NotFound => ApiError::NotFound,
      other => ApiError::Database(other.to_string()),
    }
  }
}

impl From<deadpool_diesel::InteractError> for ApiError {
  fn from(e: deadpool_diesel::InteractError) -> Self {
    ApiError::Database(e.to_string())
  }
}

impl From<deadpool::managed::PoolError<deadpool_diesel::Error>> for ApiError {
  fn from(e: deadpool::managed::PoolError<deadpool_diesel::Error>) -> Self {
    match e {
      deadpool::managed::PoolError::Timeout(_) => ApiError::Timeout,
      other => ApiError::Database(other.to_string()),
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      ApiError::Timeout
    } else {
      ApiError::Internal(e.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::ApiError;
  use axum::http::StatusCode;

  #[test]
  fn status_mapping() {
    assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
  }

  #[test]
  fn missing_row_becomes_not_found() {
    let mapped = ApiError::from(diesel::result::Error::NotFound);
    assert!(matches!(mapped, ApiError::NotFound));
  }
}
