use crate::DbConn;
use crate::errors::ApiResult;
use crate::schema::{series_tag, tag};
use diesel::ExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;

/// Checks that every referenced tag exists; creation payloads with unknown
/// tag IDs are rejected as validation failures.
pub async fn all_exist(conn: &DbConn, mut tag_ids: Vec<i32>) -> ApiResult<bool> {
  tag_ids.sort_unstable();
  tag_ids.dedup();
  let expected = tag_ids.len() as i64;

  let found = conn
    .interact(move |c| {
      tag::table
        .filter(tag::id.eq_any(tag_ids))
        .count()
        .get_result::<i64>(c)
    })
    .await??;

  Ok(found == expected)
}

pub async fn ids_for_series(conn: &DbConn, series_id: i32) -> ApiResult<Vec<i32>> {
  let ids = conn
    .interact(move |c| {
      series_tag::table
        .select(series_tag::tag_id)
        .filter(series_tag::series_id.eq(series_id))
        .get_results::<i32>(c)
    })
    .await??;

  Ok(ids)
}

pub async fn names_for_series(conn: &DbConn, series_id: i32) -> ApiResult<Vec<String>> {
  let names = conn
    .interact(move |c| {
      series_tag::table
        .inner_join(tag::table)
        .select(tag::name)
        .filter(series_tag::series_id.eq(series_id))
        .get_results::<String>(c)
    })
    .await??;

  Ok(names)
}
