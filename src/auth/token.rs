use crate::auth::secret::Secret;
use crate::db;
use crate::errors::ApiError;
use crate::AppState;
use anyhow::Context;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::sync::Arc;
use tracing::warn;

/// Token lifetime. There is no refresh flow; clients log in again.
const TOKEN_TTL_SECONDS: i64 = 86_400;

/// Bearer token contents. The token only carries the user ID; the staff
/// flag is looked up fresh on every request so a demotion takes effect
/// immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// expiration time
  exp: i64,
  /// issued at
  iat: i64,
  /// ID of a user
  pub user_id: i32,
}

/// Encoded bearer token as it travels in the Authorization header.
#[derive(Serialize, Deserialize, Clone)]
pub struct ClaimsEncoded {
  encoded_claims: String,
}

impl ClaimsEncoded {
  /// Returns the encoded token.
  pub fn encoded_claims(&self) -> String {
    self.encoded_claims.clone()
  }

  /// Decodes a bearer token. Expiration is validated as part of decoding.
  pub fn decode(self) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let secret = Secret::read_or_init()
      .context("Secret couldn't be read.")
      .unwrap();

    jsonwebtoken::decode::<Claims>(
      self.encoded_claims.as_str(),
      &DecodingKey::from_secret(secret.as_ref()),
      &Validation::new(Algorithm::HS512),
    )
  }
}

impl TryFrom<&str> for Claims {
  type Error = jsonwebtoken::errors::Error;

  fn try_from(token: &str) -> Result<Claims, Self::Error> {
    let encoded = ClaimsEncoded {
      encoded_claims: token.to_owned(),
    };

    Ok(encoded.decode()?.claims)
  }
}

impl Claims {
  /// Generates a new bearer token for a user.
  pub fn new(user_id: i32) -> Claims {
    let current_time = Utc::now().timestamp();

    Claims {
      exp: current_time + TOKEN_TTL_SECONDS,
      iat: current_time,
      user_id,
    }
  }

  /// Encodes a bearer token.
  pub fn encode(&self) -> anyhow::Result<ClaimsEncoded> {
    let header = Header::new(Algorithm::HS512);
    let secret = Secret::read_or_init()?;

    let encoded_claims =
      jsonwebtoken::encode(&header, &self, &EncodingKey::from_secret(secret.as_bytes()))
        .context("encoding bearer token")?;

    Ok(ClaimsEncoded { encoded_claims })
  }
}

/// Auth middleware for mutating routes: a missing, malformed, expired, or
/// orphaned token is rejected before the handler runs. On success the
/// resolved caller is inserted into a request extension so the handler can
/// extract it.
pub async fn auth(
  State(AppState { pool, .. }): State<AppState>,
  bearer: Option<TypedHeader<Authorization<authorization::Bearer>>>,
  mut req: Request<Body>,
  next: Next,
) -> Result<Response, ApiError> {
  let Some(TypedHeader(Authorization(bearer))) = bearer else {
    return Err(ApiError::Unauthenticated);
  };

  let claims = Claims::try_from(bearer.token()).map_err(|e| {
    warn!("rejecting bearer token: {e}");
    ApiError::Unauthenticated
  })?;

  let conn = pool.get().await?;
  let Some(identity) = db::users::get_identity(&conn, claims.user_id).await? else {
    return Err(ApiError::Unauthenticated);
  };

  req.extensions_mut().insert(Arc::new(identity));
  Ok(next.run(req).await)
}

/// Optional-identity middleware for public reads: a valid token attaches
/// the caller, anything else leaves the request anonymous instead of
/// failing it.
pub async fn identify(
  State(AppState { pool, .. }): State<AppState>,
  bearer: Option<TypedHeader<Authorization<authorization::Bearer>>>,
  mut req: Request<Body>,
  next: Next,
) -> Result<Response, ApiError> {
  if let Some(TypedHeader(Authorization(bearer))) = bearer {
    if let Ok(claims) = Claims::try_from(bearer.token()) {
      let conn = pool.get().await?;

      if let Some(identity) = db::users::get_identity(&conn, claims.user_id).await? {
        req.extensions_mut().insert(Arc::new(identity));
      }
    }
  }

  Ok(next.run(req).await)
}
