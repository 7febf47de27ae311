use crate::DbConn;
use crate::db;
use crate::errors::ApiResult;
use crate::models::{Collection, SinglePhoto};

/// A series inherits secrecy from every collection it is a member of: one
/// secret collection is enough to hide it, zero memberships leave it public.
pub fn secret_from_memberships(flags: &[bool]) -> bool {
  flags.iter().any(|is_secret| *is_secret)
}

/// Effective secrecy of a collection is just its stored flag.
pub fn collection_is_secret(collection: &Collection) -> bool {
  collection.is_secret
}

/// Effective secrecy of a series, recomputed from its current collection
/// memberships on every call. Membership and the collection flags are both
/// mutable, so nothing here may be cached.
pub async fn series_is_secret(conn: &DbConn, series_id: i32) -> ApiResult<bool> {
  let flags = db::collections::membership_secret_flags(conn, series_id).await?;
  Ok(secret_from_memberships(&flags))
}

/// A photo is never secret on its own; it always mirrors its parent series.
pub async fn photo_is_secret(conn: &DbConn, photo: &SinglePhoto) -> ApiResult<bool> {
  series_is_secret(conn, photo.series_id).await
}

#[cfg(test)]
mod tests {
  use super::secret_from_memberships;

  #[test]
  fn no_memberships_is_public() {
    assert!(!secret_from_memberships(&[]));
  }

  #[test]
  fn all_public_collections_is_public() {
    assert!(!secret_from_memberships(&[false, false, false]));
  }

  #[test]
  fn one_secret_collection_wins() {
    assert!(secret_from_memberships(&[false, true, false]));
    assert!(secret_from_memberships(&[true]));
  }

  #[test]
  fn single_membership_mirrors_the_flag() {
    assert!(secret_from_memberships(&[true]));
    assert!(!secret_from_memberships(&[false]));
  }
}
