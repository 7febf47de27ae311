use super::SeriesSummary;
use crate::AppState;
use crate::db;
use crate::discovery;
use crate::errors::{ApiError, ApiResult};
use axum::Json;
use axum::extract::{Query, State};
use axum_extra::routing::TypedPath;
use metrics::counter;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

#[derive(TypedPath)]
#[typed_path("/feed")]
pub struct FeedRoute;

#[derive(Deserialize)]
pub struct FeedParams {
  /// Comma-separated tag IDs; a series must carry all of them.
  pub tag_id: Option<String>,
  pub search_query: Option<String>,
  pub page: Option<u32>,
}

fn parse_tag_ids(raw: Option<&str>) -> ApiResult<Vec<i32>> {
  let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(Vec::new());
  };

  raw
    .split(',')
    .map(|part| {
      part
        .trim()
        .parse::<i32>()
        .map_err(|_| ApiError::Validation("tag_id must be a comma-separated list of tag IDs".to_string()))
    })
    .collect()
}

/// The discovery feed: every public series, AND-filtered by tags and
/// search terms, shuffled whole, and sliced into fixed-size pages. Each
/// request shuffles anew, so two requests for the same page usually
/// disagree while pages of a single request chain stay duplicate-free
/// only within one shuffle.
pub async fn feed(
  _: FeedRoute,
  State(AppState { pool, .. }): State<AppState>,
  Query(params): Query<FeedParams>,
) -> ApiResult<Json<Vec<SeriesSummary>>> {
  counter!("velvia_feed_requests_total").increment(1);

  let tag_filters = parse_tag_ids(params.tag_id.as_deref())?;

  let conn = pool.get().await?;
  let mut candidates = db::series::public_series(&conn, tag_filters).await?;

  if let Some(query) = params.search_query.as_deref().filter(|q| !q.trim().is_empty()) {
    candidates.retain(|series| discovery::matches_search(&series.name, query));
  }

  let mut rng = StdRng::from_os_rng();
  let page = discovery::shuffled_page(candidates, params.page.unwrap_or(1), &mut rng);

  Ok(Json(page.into_iter().map(SeriesSummary::from).collect()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/series/{series_id}/recommendations")]
pub struct SeriesRecommendationsRoute {
  series_id: i32,
}

/// Up to five public series related to the target: one of the target's
/// tags is picked at random and the sample is drawn from series carrying
/// it; an untagged target samples from the whole public set.
pub async fn recommendations(
  SeriesRecommendationsRoute { series_id }: SeriesRecommendationsRoute,
  State(AppState { pool, .. }): State<AppState>,
) -> ApiResult<Json<Vec<SeriesSummary>>> {
  let conn = pool.get().await?;

  // 404 before anything else so recommendations for a missing series do
  // not read as an empty result
  db::series::select_series(&conn, series_id).await?;

  let tag_ids = db::tags::ids_for_series(&conn, series_id).await?;

  let mut rng = StdRng::from_os_rng();
  let tag_filter = discovery::pick_tag(&tag_ids, &mut rng);

  let candidates = db::series::public_series(&conn, tag_filter.into_iter().collect()).await?;
  let picks = discovery::sample(candidates, &mut rng);

  counter!("velvia_recommendations_served_total").increment(picks.len() as u64);

  Ok(Json(picks.into_iter().map(SeriesSummary::from).collect()))
}

#[cfg(test)]
mod tests {
  use super::parse_tag_ids;

  #[test]
  fn missing_and_empty_filters_parse_to_nothing() {
    assert!(parse_tag_ids(None).unwrap().is_empty());
    assert!(parse_tag_ids(Some("  ")).unwrap().is_empty());
  }

  #[test]
  fn csv_filters_parse() {
    assert_eq!(parse_tag_ids(Some("1,2, 3")).unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn junk_filters_are_rejected() {
    assert!(parse_tag_ids(Some("1,landscape")).is_err());
  }
}
