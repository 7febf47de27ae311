use crate::DbConn;
use crate::errors::ApiResult;
use crate::models::{NewPhotoSeries, NewSeriesTag, NewSinglePhoto, PhotoSeries, SinglePhoto};
use crate::schema::{collection, collection_series, photo, series, series_tag};
use diesel::Connection;
use diesel::ExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::Table;
use diesel::dsl::not;

/// Creates a series together with its tag links and its ordered photos in
/// one transaction; a failure on any row leaves nothing behind. Photos get
/// sequential positions 0..n in the submitted order.
pub async fn insert_series_with_photos(
  conn: &DbConn,
  new_series: NewPhotoSeries,
  tag_ids: Vec<i32>,
  photo_paths: Vec<String>,
) -> ApiResult<i32> {
  let series_id = conn
    .interact(move |c| {
      c.transaction::<_, diesel::result::Error, _>(|c| {
        let owner_id = new_series.owner_id;

        diesel::insert_into(series::table).values(new_series).execute(c)?;
        let series_id = super::generated_id(c)?;

        if !tag_ids.is_empty() {
          let links = tag_ids
            .iter()
            .map(|&tag_id| NewSeriesTag { series_id, tag_id })
            .collect::<Vec<_>>();

          diesel::insert_into(series_tag::table).values(links).execute(c)?;
        }

        let photos = ordered_photo_rows(series_id, owner_id, photo_paths);
        diesel::insert_into(photo::table).values(photos).execute(c)?;

        Ok(series_id)
      })
    })
    .await??;

  Ok(series_id)
}

/// Photos keep the submitted order: positions are assigned 0..n.
fn ordered_photo_rows(series_id: i32, owner_id: i32, photo_paths: Vec<String>) -> Vec<NewSinglePhoto> {
  photo_paths
    .into_iter()
    .enumerate()
    .map(|(position, file_path)| NewSinglePhoto {
      series_id,
      owner_id,
      file_path,
      position: position as i32,
    })
    .collect()
}

/// Checks that every referenced series exists, for collection attachment.
pub async fn all_exist(conn: &DbConn, mut series_ids: Vec<i32>) -> ApiResult<bool> {
  series_ids.sort_unstable();
  series_ids.dedup();
  let expected = series_ids.len() as i64;

  let found = conn
    .interact(move |c| {
      series::table
        .filter(series::id.eq_any(series_ids))
        .count()
        .get_result::<i64>(c)
    })
    .await??;

  Ok(found == expected)
}

pub async fn select_series(conn: &DbConn, series_id: i32) -> ApiResult<PhotoSeries> {
  let found = conn
    .interact(move |c| {
      series::table
        .select(series::table::all_columns())
        .filter(series::id.eq(series_id))
        .first::<PhotoSeries>(c)
    })
    .await??;

  Ok(found)
}

pub async fn delete_series(conn: &DbConn, series_id: i32) -> ApiResult<usize> {
  let deleted = conn
    .interact(move |c| diesel::delete(series::table.filter(series::id.eq(series_id))).execute(c))
    .await??;

  Ok(deleted)
}

/// The discovery base set: every series that is in no secret collection.
/// Tag filters are ANDed on top, one membership subquery per tag, so a
/// series must carry all of them to survive.
pub async fn public_series(conn: &DbConn, tag_filters: Vec<i32>) -> ApiResult<Vec<PhotoSeries>> {
  let found = conn
    .interact(move |c| {
      let mut query = series::table
        .filter(not(series::id.eq_any(
          collection_series::table
            .inner_join(collection::table)
            .filter(collection::is_secret.eq(true))
            .select(collection_series::series_id),
        )))
        .into_boxed();

      for tag_id in tag_filters {
        query = query.filter(series::id.eq_any(
          series_tag::table
            .select(series_tag::series_id)
            .filter(series_tag::tag_id.eq(tag_id)),
        ));
      }

      query.order(series::created_at.desc()).load::<PhotoSeries>(c)
    })
    .await??;

  Ok(found)
}

/// A user's series, newest first. Secret ones are included only for the
/// owner and staff; everyone else gets the public subset.
pub async fn series_by_owner(conn: &DbConn, owner_id: i32, include_secret: bool) -> ApiResult<Vec<PhotoSeries>> {
  let found = conn
    .interact(move |c| {
      let mut query = series::table
        .filter(series::owner_id.eq(owner_id))
        .into_boxed();

      if !include_secret {
        query = query.filter(not(series::id.eq_any(
          collection_series::table
            .inner_join(collection::table)
            .filter(collection::is_secret.eq(true))
            .select(collection_series::series_id),
        )));
      }

      query.order(series::created_at.desc()).load::<PhotoSeries>(c)
    })
    .await??;

  Ok(found)
}

pub async fn photos_for_series(conn: &DbConn, series_id: i32) -> ApiResult<Vec<SinglePhoto>> {
  let found = conn
    .interact(move |c| {
      photo::table
        .select(photo::table::all_columns())
        .filter(photo::series_id.eq(series_id))
        .order(photo::position.asc())
        .load::<SinglePhoto>(c)
    })
    .await??;

  Ok(found)
}

#[cfg(test)]
mod tests {
  use super::ordered_photo_rows;

  #[test]
  fn photos_get_sequential_positions_in_submitted_order() {
    let rows = ordered_photo_rows(
      7,
      2,
      vec!["a.jpg".to_string(), "b.jpg".to_string(), "c.jpg".to_string()],
    );

    let positions = rows.iter().map(|r| r.position).collect::<Vec<_>>();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(rows[1].file_path, "b.jpg");
    assert!(rows.iter().all(|r| r.series_id == 7 && r.owner_id == 2));
  }
}
