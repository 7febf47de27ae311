use crate::access::{self, Identity};
use crate::db;
use crate::errors::{ApiError, ApiResult};
use crate::visibility;
use crate::AppState;
use axum::Extension;
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::routing::TypedPath;
use serde::Deserialize;
use std::sync::Arc;

#[derive(TypedPath, Deserialize)]
#[typed_path("/media/{*path}")]
pub struct MediaPathRoute {
  path: String,
}

/// Gatekeeper in front of blob delivery: the raw path is matched against
/// photos first, then collection covers, and the matched entity's owner
/// and secrecy decide. A path matching nothing is allowed through;
/// unknown paths are not protected.
pub async fn media_redirect(
  MediaPathRoute { path }: MediaPathRoute,
  State(AppState { pool, config, .. }): State<AppState>,
  identity: Option<Extension<Arc<Identity>>>,
) -> ApiResult<Redirect> {
  let viewer = identity.as_ref().map(|Extension(id)| id.as_ref());
  let conn = pool.get().await?;

  if let Some(photo) = db::media::select_photo_by_path(&conn, path.clone()).await? {
    let secret = visibility::photo_is_secret(&conn, &photo).await?;

    if !access::can_view(viewer, photo.owner_id, secret) {
      return Err(ApiError::Forbidden);
    }
  } else if let Some(collection) = db::collections::select_collection_by_cover(&conn, path.clone()).await? {
    if !access::can_view(viewer, collection.owner_id, visibility::collection_is_secret(&collection)) {
      return Err(ApiError::Forbidden);
    }
  }

  let target = config
    .media_base_url
    .join(&path)
    .map_err(|e| ApiError::Internal(format!("building media redirect: {e}")))?;

  Ok(Redirect::to(target.as_str()))
}
