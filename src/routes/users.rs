use super::SeriesSummary;
use crate::access::{self, Identity};
use crate::auth::login::{LoginResponse, UserInfo, UserLogin};
use crate::db;
use crate::discovery;
use crate::errors::{ApiError, ApiResult};
use crate::models::NewUser;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::routing::TypedPath;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(TypedPath)]
#[typed_path("/user")]
pub struct UserRoute;

/// Creates a new user.
pub async fn create_user(
  _: UserRoute,
  State(AppState { pool, .. }): State<AppState>,
  Json(user): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
  if !user.check() {
    return Err(ApiError::Validation("username, email, or password is malformed".to_string()));
  }

  let conn = pool.get().await?;

  if !db::users::is_user_unique(&conn, user.clone()).await? {
    return Err(ApiError::Validation("username or email is already taken".to_string()));
  }

  let new_user = user.hash_password();
  let user_id = db::users::insert_user(&conn, new_user).await?;

  let created = db::users::select_user(&conn, user_id).await?;
  info!("a new user was created with name {}", created.username);

  Ok((StatusCode::CREATED, Json(UserInfo::from(created))))
}

#[derive(TypedPath)]
#[typed_path("/login")]
pub struct LoginRoute;

/// You must provide either a username or an email together with a password.
pub async fn login(
  _: LoginRoute,
  State(AppState { pool, .. }): State<AppState>,
  Json(user_login): Json<UserLogin>,
) -> ApiResult<Json<LoginResponse>> {
  let conn = pool.get().await?;

  let Some(claims) = user_login.hash_password().login(&conn).await? else {
    return Err(ApiError::Unauthenticated);
  };

  let user = db::users::select_user(&conn, claims.user_id).await?;

  let encoded = claims
    .encode()
    .map_err(|e| ApiError::Internal(format!("encoding bearer token: {e}")))?;

  Ok(Json(LoginResponse::new(encoded, UserInfo::from(user))))
}

#[derive(TypedPath)]
#[typed_path("/user/activation")]
pub struct ActivationRoute;

#[derive(Serialize, Deserialize)]
pub struct ActivationPayload {
  pub uid: String,
  pub token: String,
}

/// Relays an account-activation confirmation to the identity provider.
/// One outbound call, no retry; a timeout or an upstream rejection is
/// surfaced to the caller as-is.
pub async fn activate(
  _: ActivationRoute,
  State(AppState { config, http, .. }): State<AppState>,
  Json(payload): Json<ActivationPayload>,
) -> ApiResult<StatusCode> {
  let Some(provider) = config.identity_provider_url.as_ref() else {
    return Err(ApiError::Internal("IDENTITY_PROVIDER_URL is not configured".to_string()));
  };

  let target = provider
    .join("users/activation/")
    .map_err(|e| ApiError::Internal(format!("building activation URL: {e}")))?;

  let response = http.post(target).json(&payload).send().await?;

  if !response.status().is_success() {
    return Err(ApiError::Upstream(response.status().as_u16()));
  }

  Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct PageParams {
  pub page: Option<u32>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}/series")]
pub struct UserSeriesRoute {
  user_id: i32,
}

/// A user's series, newest first; secret ones appear only for the owner
/// and staff.
pub async fn user_series(
  UserSeriesRoute { user_id }: UserSeriesRoute,
  State(AppState { pool, .. }): State<AppState>,
  identity: Option<Extension<Arc<Identity>>>,
  Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<SeriesSummary>>> {
  let conn = pool.get().await?;

  if !db::users::user_exists(&conn, user_id).await? {
    return Err(ApiError::NotFound);
  }

  let viewer = identity.as_ref().map(|Extension(id)| id.as_ref());
  let include_secret = viewer.is_some_and(|v| access::can_modify(v, user_id));

  let all = db::series::series_by_owner(&conn, user_id, include_secret).await?;
  let page = discovery::page_slice(all, params.page.unwrap_or(1));

  Ok(Json(page.into_iter().map(SeriesSummary::from).collect()))
}

#[derive(Serialize)]
pub struct CollectionSummary {
  pub id: i32,
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub cover: String,
  pub is_secret: bool,
  pub created_at: NaiveDateTime,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}/collections")]
pub struct UserCollectionsRoute {
  user_id: i32,
}

/// A user's collections, newest first, with the same secrecy filtering as
/// the series listing.
pub async fn user_collections(
  UserCollectionsRoute { user_id }: UserCollectionsRoute,
  State(AppState { pool, .. }): State<AppState>,
  identity: Option<Extension<Arc<Identity>>>,
  Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<CollectionSummary>>> {
  let conn = pool.get().await?;

  if !db::users::user_exists(&conn, user_id).await? {
    return Err(ApiError::NotFound);
  }

  let viewer = identity.as_ref().map(|Extension(id)| id.as_ref());
  let include_secret = viewer.is_some_and(|v| access::can_modify(v, user_id));

  let all = db::collections::collections_by_owner(&conn, user_id, include_secret).await?;
  let page = discovery::page_slice(all, params.page.unwrap_or(1));

  let summaries = page
    .into_iter()
    .map(|collection| CollectionSummary {
      id: collection.id,
      owner_id: collection.owner_id,
      name: collection.name,
      description: collection.description,
      cover: collection.cover,
      is_secret: collection.is_secret,
      created_at: collection.created_at,
    })
    .collect();

  Ok(Json(summaries))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}/subscribe")]
pub struct SubscribeRoute {
  user_id: i32,
}

/// Subscribes the caller to the target user. Subscribing twice is a
/// no-op; subscribing to yourself is rejected.
pub async fn subscribe(
  SubscribeRoute { user_id }: SubscribeRoute,
  State(AppState { pool, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
) -> ApiResult<StatusCode> {
  if identity.user_id == user_id {
    return Err(ApiError::Forbidden);
  }

  let conn = pool.get().await?;

  if !db::users::user_exists(&conn, user_id).await? {
    return Err(ApiError::NotFound);
  }

  db::subscriptions::subscribe(&conn, identity.user_id, user_id).await?;

  Ok(StatusCode::NO_CONTENT)
}

/// Removes the caller's subscription; unsubscribing from someone never
/// subscribed to is a no-op.
pub async fn unsubscribe(
  SubscribeRoute { user_id }: SubscribeRoute,
  State(AppState { pool, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
) -> ApiResult<StatusCode> {
  if identity.user_id == user_id {
    return Err(ApiError::Forbidden);
  }

  let conn = pool.get().await?;

  if !db::users::user_exists(&conn, user_id).await? {
    return Err(ApiError::NotFound);
  }

  db::subscriptions::unsubscribe(&conn, identity.user_id, user_id).await?;

  Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user/{user_id}/subscriptions")]
pub struct SubscriptionCountsRoute {
  user_id: i32,
}

/// Incoming and outgoing subscription counts for a user.
pub async fn subscription_counts(
  SubscriptionCountsRoute { user_id }: SubscriptionCountsRoute,
  State(AppState { pool, .. }): State<AppState>,
) -> ApiResult<Json<db::subscriptions::SubscriptionCounts>> {
  let conn = pool.get().await?;

  if !db::users::user_exists(&conn, user_id).await? {
    return Err(ApiError::NotFound);
  }

  Ok(Json(db::subscriptions::counts(&conn, user_id).await?))
}
