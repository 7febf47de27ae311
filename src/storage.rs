use crate::errors::{ApiError, ApiResult};
use std::path::Path;
use uuid::Uuid;

pub const PHOTO_DIR: &str = "pictures/photos";
pub const COVER_DIR: &str = "pictures/covers";

/// Writes an uploaded blob below the media root and returns the relative
/// path that gets stored on the entity. The file name is a fresh UUID; the
/// extension is sniffed from the content rather than taken from the
/// client-supplied file name.
pub async fn store_blob(media_root: &Path, subdir: &str, bytes: &[u8]) -> ApiResult<String> {
  let extension = infer::get(bytes).map_or("bin", |kind| kind.extension());
  let relative = format!("{}/{}.{}", subdir, Uuid::new_v4(), extension);
  let target = media_root.join(&relative);

  if let Some(parent) = target.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|e| ApiError::Internal(format!("creating media directory: {e}")))?;
  }

  tokio::fs::write(&target, bytes)
    .await
    .map_err(|e| ApiError::Internal(format!("writing blob: {e}")))?;

  Ok(relative)
}
