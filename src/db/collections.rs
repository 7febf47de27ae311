use crate::DbConn;
use crate::errors::ApiResult;
use crate::models::{Collection, NewCollection, NewCollectionSeries, PhotoSeries};
use crate::schema::{collection, collection_series, series};
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::Table;

pub async fn select_collection(conn: &DbConn, collection_id: i32) -> ApiResult<Collection> {
  let found = conn
    .interact(move |c| {
      collection::table
        .select(collection::table::all_columns())
        .filter(collection::id.eq(collection_id))
        .first::<Collection>(c)
    })
    .await??;

  Ok(found)
}

pub async fn insert_collection(conn: &DbConn, new_collection: NewCollection) -> ApiResult<i32> {
  let id = conn
    .interact(move |c| {
      diesel::insert_into(collection::table).values(new_collection).execute(c)?;
      super::generated_id(c)
    })
    .await??;

  Ok(id)
}

pub async fn delete_collection(conn: &DbConn, collection_id: i32) -> ApiResult<usize> {
  let deleted = conn
    .interact(move |c| {
      diesel::delete(collection::table.filter(collection::id.eq(collection_id))).execute(c)
    })
    .await??;

  Ok(deleted)
}

/// The `is_secret` flags of every collection one series belongs to; the
/// visibility resolver OR-reduces these.
pub async fn membership_secret_flags(conn: &DbConn, series_id: i32) -> ApiResult<Vec<bool>> {
  let flags = conn
    .interact(move |c| {
      collection_series::table
        .inner_join(collection::table)
        .filter(collection_series::series_id.eq(series_id))
        .select(collection::is_secret)
        .get_results::<bool>(c)
    })
    .await??;

  Ok(flags)
}

/// Attaches existing series to a collection; pairs that are already
/// present are skipped by the unique key, so retries are harmless.
pub async fn attach_series(conn: &DbConn, collection_id: i32, series_ids: Vec<i32>) -> ApiResult<()> {
  let links = series_ids
    .into_iter()
    .map(|series_id| NewCollectionSeries { collection_id, series_id })
    .collect::<Vec<_>>();

  conn
    .interact(move |c| {
      diesel::insert_or_ignore_into(collection_series::table)
        .values(links)
        .execute(c)
    })
    .await??;

  Ok(())
}

pub async fn series_in_collection(conn: &DbConn, collection_id: i32) -> ApiResult<Vec<PhotoSeries>> {
  let found = conn
    .interact(move |c| {
      series::table
        .select(series::table::all_columns())
        .filter(series::id.eq_any(
          collection_series::table
            .select(collection_series::series_id)
            .filter(collection_series::collection_id.eq(collection_id)),
        ))
        .load::<PhotoSeries>(c)
    })
    .await??;

  Ok(found)
}

/// Of the given series IDs, the ones that sit in at least one secret
/// collection. Lets list endpoints drop hidden members with one query
/// instead of resolving each series separately.
pub async fn secret_ids_among(conn: &DbConn, series_ids: Vec<i32>) -> ApiResult<Vec<i32>> {
  let mut ids = conn
    .interact(move |c| {
      collection_series::table
        .inner_join(collection::table)
        .filter(collection::is_secret.eq(true))
        .filter(collection_series::series_id.eq_any(series_ids))
        .select(collection_series::series_id)
        .get_results::<i32>(c)
    })
    .await??;

  ids.sort_unstable();
  ids.dedup();
  Ok(ids)
}

/// A user's collections, newest first; secret ones only for owner/staff.
pub async fn collections_by_owner(conn: &DbConn, owner_id: i32, include_secret: bool) -> ApiResult<Vec<Collection>> {
  let found = conn
    .interact(move |c| {
      let mut query = collection::table
        .filter(collection::owner_id.eq(owner_id))
        .into_boxed();

      if !include_secret {
        query = query.filter(collection::is_secret.eq(false));
      }

      query.order(collection::created_at.desc()).load::<Collection>(c)
    })
    .await??;

  Ok(found)
}

pub async fn select_collection_by_cover(conn: &DbConn, cover_path: String) -> ApiResult<Option<Collection>> {
  let found = conn
    .interact(move |c| {
      collection::table
        .select(collection::table::all_columns())
        .filter(collection::cover.eq(cover_path))
        .first::<Collection>(c)
        .optional()
    })
    .await??;

  Ok(found)
}
