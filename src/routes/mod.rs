pub mod collections;
pub mod feed;
pub mod media;
pub mod series;
pub mod users;

use crate::AppState;
use crate::models::PhotoSeries;
use axum::Json;
use axum::extract::State;
use axum_extra::routing::TypedPath;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Series representation used by the feed, recommendations, collection
/// members, and the per-user listings.
#[derive(Serialize)]
pub struct SeriesSummary {
  pub id: i32,
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub created_at: NaiveDateTime,
}

impl From<PhotoSeries> for SeriesSummary {
  fn from(series: PhotoSeries) -> Self {
    SeriesSummary {
      id: series.id,
      owner_id: series.owner_id,
      name: series.name,
      description: series.description,
      price_cents: series.price_cents,
      created_at: series.created_at,
    }
  }
}

impl From<&PhotoSeries> for SeriesSummary {
  fn from(series: &PhotoSeries) -> Self {
    SeriesSummary {
      id: series.id,
      owner_id: series.owner_id,
      name: series.name.clone(),
      description: series.description.clone(),
      price_cents: series.price_cents,
      created_at: series.created_at,
    }
  }
}

#[derive(Serialize)]
pub struct SystemHealth {
  status: &'static str,
  server_version: String,
}

#[derive(TypedPath)]
#[typed_path("/system/health")]
pub struct SystemHealthRoute;

/// Liveness probe.
pub async fn system_health(_: SystemHealthRoute) -> Json<SystemHealth> {
  Json(SystemHealth {
    status: "ok",
    server_version: env!("CARGO_PKG_VERSION").to_string(),
  })
}

#[derive(TypedPath)]
#[typed_path("/metrics")]
pub struct MetricsRoute;

/// Renders the Prometheus scrape output.
pub async fn metrics_render(_: MetricsRoute, State(AppState { metrics, .. }): State<AppState>) -> String {
  metrics.render()
}
