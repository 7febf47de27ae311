use super::SeriesSummary;
use crate::access::{self, Identity};
use crate::db;
use crate::errors::{ApiError, ApiResult};
use crate::models::NewCollection;
use crate::storage;
use crate::visibility;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::routing::TypedPath;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Serialize)]
pub struct CollectionDetail {
  pub id: i32,
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub cover: String,
  pub is_secret: bool,
  pub created_at: NaiveDateTime,
  pub series: Vec<SeriesSummary>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/collection/{collection_id}")]
pub struct CollectionIdRoute {
  collection_id: i32,
}

/// Returns a collection with its member series. Members the viewer may
/// not see (secret through some other collection they are also in) are
/// dropped from the listing rather than leaked.
pub async fn get_collection(
  CollectionIdRoute { collection_id }: CollectionIdRoute,
  State(AppState { pool, .. }): State<AppState>,
  identity: Option<Extension<Arc<Identity>>>,
) -> ApiResult<Json<CollectionDetail>> {
  let conn = pool.get().await?;

  let collection = db::collections::select_collection(&conn, collection_id).await?;

  let viewer = identity.as_ref().map(|Extension(id)| id.as_ref());
  if !access::can_view(viewer, collection.owner_id, visibility::collection_is_secret(&collection)) {
    return Err(ApiError::Forbidden);
  }

  let members = db::collections::series_in_collection(&conn, collection_id).await?;
  let member_ids = members.iter().map(|s| s.id).collect::<Vec<_>>();
  let secret_ids = db::collections::secret_ids_among(&conn, member_ids).await?;

  let series = members
    .into_iter()
    .filter(|member| {
      access::can_view(viewer, member.owner_id, secret_ids.contains(&member.id))
    })
    .map(SeriesSummary::from)
    .collect();

  Ok(Json(CollectionDetail {
    id: collection.id,
    owner_id: collection.owner_id,
    name: collection.name,
    description: collection.description,
    cover: collection.cover,
    is_secret: collection.is_secret,
    created_at: collection.created_at,
    series,
  }))
}

#[derive(TypedPath)]
#[typed_path("/collection")]
pub struct CollectionRoute;

/// Creates a collection from a multipart payload: `name`, optional
/// `description`, `is_secret`, and the cover file.
pub async fn create_collection(
  _: CollectionRoute,
  State(AppState { pool, config, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
  mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CollectionDetail>)> {
  let mut name: Option<String> = None;
  let mut description = String::new();
  let mut is_secret = false;
  let mut cover_upload: Option<Vec<u8>> = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Validation(format!("malformed multipart payload: {e}")))?
  {
    let field_name = field.name().map(str::to_string);

    match field_name.as_deref() {
      Some("name") => {
        name = Some(
          field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("unreadable multipart field: {e}")))?,
        )
      }
      Some("description") => {
        description = field
          .text()
          .await
          .map_err(|e| ApiError::Validation(format!("unreadable multipart field: {e}")))?
      }
      Some("is_secret") => {
        let raw = field
          .text()
          .await
          .map_err(|e| ApiError::Validation(format!("unreadable multipart field: {e}")))?;
        is_secret = matches!(raw.trim(), "true" | "1");
      }
      Some("cover") => {
        let bytes = field
          .bytes()
          .await
          .map_err(|e| ApiError::Validation(format!("unreadable cover upload: {e}")))?;
        cover_upload = Some(bytes.to_vec());
      }
      _ => {}
    }
  }

  let name = name
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .ok_or_else(|| ApiError::Validation("name is required".to_string()))?;

  if name.chars().count() > 40 {
    return Err(ApiError::Validation("name is limited to 40 characters".to_string()));
  }

  if description.chars().count() > 150 {
    return Err(ApiError::Validation("description is limited to 150 characters".to_string()));
  }

  let cover_upload =
    cover_upload.ok_or_else(|| ApiError::Validation("a cover image is required".to_string()))?;

  let cover = storage::store_blob(&config.media_root, storage::COVER_DIR, &cover_upload).await?;

  let conn = pool.get().await?;
  let collection_id = db::collections::insert_collection(
    &conn,
    NewCollection {
      owner_id: identity.user_id,
      name,
      description,
      cover,
      is_secret,
    },
  )
  .await?;

  info!("user {} created collection {collection_id}", identity.user_id);

  let created = db::collections::select_collection(&conn, collection_id).await?;
  Ok((
    StatusCode::CREATED,
    Json(CollectionDetail {
      id: created.id,
      owner_id: created.owner_id,
      name: created.name,
      description: created.description,
      cover: created.cover,
      is_secret: created.is_secret,
      created_at: created.created_at,
      series: Vec::new(),
    }),
  ))
}

#[derive(Deserialize)]
pub struct AttachSeries {
  pub series_ids: Vec<i32>,
}

/// Attaches existing series to a collection. Attaching to a secret
/// collection is how a series becomes hidden, so only the collection's
/// owner or staff may do it.
pub async fn attach_series(
  CollectionIdRoute { collection_id }: CollectionIdRoute,
  State(AppState { pool, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
  Json(payload): Json<AttachSeries>,
) -> ApiResult<StatusCode> {
  let conn = pool.get().await?;

  let collection = db::collections::select_collection(&conn, collection_id).await?;

  if !access::can_modify(&identity, collection.owner_id) {
    return Err(ApiError::Forbidden);
  }

  if !db::series::all_exist(&conn, payload.series_ids.clone()).await? {
    return Err(ApiError::NotFound);
  }

  db::collections::attach_series(&conn, collection_id, payload.series_ids).await?;

  Ok(StatusCode::NO_CONTENT)
}

/// Deletes a collection; memberships cascade away, the member series
/// themselves survive (and may become public again).
pub async fn delete_collection(
  CollectionIdRoute { collection_id }: CollectionIdRoute,
  State(AppState { pool, .. }): State<AppState>,
  Extension(identity): Extension<Arc<Identity>>,
) -> ApiResult<StatusCode> {
  let conn = pool.get().await?;

  let collection = db::collections::select_collection(&conn, collection_id).await?;

  if !access::can_modify(&identity, collection.owner_id) {
    return Err(ApiError::Forbidden);
  }

  db::collections::delete_collection(&conn, collection_id).await?;
  info!("user {} deleted collection {collection_id}", identity.user_id);

  Ok(StatusCode::NO_CONTENT)
}
