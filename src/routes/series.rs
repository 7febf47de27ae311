use super::SeriesSummary;
use crate::access::{self, Identity};
use crate::db;
use crate::errors::{ApiError, ApiResult};
use crate::models::{NewPhotoSeries, PhotoSeries};
use crate::storage;
use crate::visibility;
use crate::{AppState, DbConn};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const NAME_MAX_CHARS: usize = 40;
const DESCRIPTION_MAX_CHARS: usize = 150;

#[derive(Serialize)]
pub struct PhotoResponse {
  pub file_path: String,
  pub position: i32,
}

#[derive(Serialize)]
pub struct SeriesDetail {
  #[serde(flatten)]
  pub summary: SeriesSummary,
  pub tags: Vec<String>,
  pub photos: Vec<PhotoResponse>,
}

async fn series_detail(conn: &DbConn, series: PhotoSeries) -> ApiResult<SeriesDetail> {
  let tags = db::tags::names_for_series(conn, series.id).await?;
  let photos = db::series::photos_for_series(conn, series.id)
    .await?
    .into_iter()
    .map(|photo| PhotoResponse {
      file_path: photo.file_path,
      position: photo.position,
    })
    .collect();

  Ok(SeriesDetail {
    summary: SeriesSummary::from(series),
    tags,
    photos,
  })
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/series/{series_id}")]
pub struct SeriesIdRoute {
  series_id: i32,
}

/// Returns the full series representation, photos in their stored order.
pub async fn get_series(
  SeriesIdRoute { series_id }: SeriesIdRoute,
  State(AppState { pool, .. }): State<AppState>,
  identity: Option<Extension<Arc<Identity>>>,
) -> ApiResult<Json<SeriesDetail>> {
  let conn = pool.get().await?;

  let series = db::series::select_series(&conn, series_id).await?;
  let secret = visibility::series_is_secret(&conn, series.id).await?;

  let viewer = identity.as_ref().map(|Extension(id)| id.as_ref());
  if !access::can_view(viewer, series.owner_id, secret) {
    return Err(ApiError::Forbidden);
  }

  Ok(Json(series_detail(&conn, series).await?))
}

#[derive(TypedPath)]
#[typed_path("/series")]
pub struct SeriesRoute;

/// Creates a series from a multipart payload: `name`, optional
/// `description` and `price_cents`, repeatable `tag_id` fields, and the
/// photo files in the order they should keep. Blobs are written first,
/// then the series, its tag links, and its photos land in one store
/// transaction.
pub async fn create_series(
  _: SeriesRoute,
  State(AppState { pool, config, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
  mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SeriesDetail>)> {
  let mut name: Option<String> = None;
  let mut description = String::new();
  let mut price_cents = 0i64;
  let mut tag_ids: Vec<i32> = Vec::new();
  let mut uploads: Vec<Vec<u8>> = Vec::new();

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Validation(format!("malformed multipart payload: {e}")))?
  {
    let field_name = field.name().map(str::to_string);

    match field_name.as_deref() {
      Some("name") => name = Some(read_text(field).await?),
      Some("description") => description = read_text(field).await?,
      Some("price_cents") => {
        price_cents = read_text(field)
          .await?
          .parse()
          .map_err(|_| ApiError::Validation("price_cents must be an integer".to_string()))?;
      }
      Some("tag_id") => {
        let id = read_text(field)
          .await?
          .parse()
          .map_err(|_| ApiError::Validation("tag_id must be an integer".to_string()))?;
        tag_ids.push(id);
      }
      Some("photo") => {
        let bytes = field
          .bytes()
          .await
          .map_err(|e| ApiError::Validation(format!("unreadable photo upload: {e}")))?;
        uploads.push(bytes.to_vec());
      }
      _ => {}
    }
  }

  let name = name
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .ok_or_else(|| ApiError::Validation("name is required".to_string()))?;

  if name.chars().count() > NAME_MAX_CHARS {
    return Err(ApiError::Validation(format!("name is limited to {NAME_MAX_CHARS} characters")));
  }

  if description.chars().count() > DESCRIPTION_MAX_CHARS {
    return Err(ApiError::Validation(format!(
      "description is limited to {DESCRIPTION_MAX_CHARS} characters"
    )));
  }

  if uploads.is_empty() {
    return Err(ApiError::Validation("a series needs at least one photo".to_string()));
  }

  let conn = pool.get().await?;

  if !db::tags::all_exist(&conn, tag_ids.clone()).await? {
    return Err(ApiError::Validation("unknown tag id".to_string()));
  }

  let mut photo_paths = Vec::with_capacity(uploads.len());
  for upload in &uploads {
    photo_paths.push(storage::store_blob(&config.media_root, storage::PHOTO_DIR, upload).await?);
  }

  let new_series = NewPhotoSeries {
    owner_id: identity.user_id,
    name,
    description,
    price_cents,
  };

  let series_id =
    db::series::insert_series_with_photos(&conn, new_series, tag_ids, photo_paths).await?;

  info!("user {} created series {series_id}", identity.user_id);

  let created = db::series::select_series(&conn, series_id).await?;
  Ok((StatusCode::CREATED, Json(series_detail(&conn, created).await?)))
}

/// Deletes a series; the store cascades to its photos, tag links, and
/// collection memberships.
pub async fn delete_series(
  SeriesIdRoute { series_id }: SeriesIdRoute,
  State(AppState { pool, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
) -> ApiResult<StatusCode> {
  let conn = pool.get().await?;

  let series = db::series::select_series(&conn, series_id).await?;

  if !access::can_modify(&identity, series.owner_id) {
    return Err(ApiError::Forbidden);
  }

  db::series::delete_series(&conn, series_id).await?;
  info!("user {} deleted series {series_id}", identity.user_id);

  Ok(StatusCode::NO_CONTENT)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
  field
    .text()
    .await
    .map_err(|e| ApiError::Validation(format!("unreadable multipart field: {e}")))
}
