mod access;
mod auth;
mod config;
mod db;
mod discovery;
mod errors;
mod models;
mod routes;
mod schema;
mod storage;
mod visibility;

use crate::config::Config;
use axum::Router;
use axum::middleware;
use axum_extra::routing::RouterExt;
use deadpool_diesel::Runtime;
use deadpool_diesel::mysql::{Manager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub type ConnectionPool = deadpool_diesel::mysql::Pool;
pub type DbConn = deadpool_diesel::mysql::Connection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// How long one request may wait for a pooled store connection before the
/// caller gets a timeout error instead.
const STORE_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the single outbound activation-relay call.
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
  pub pool: ConnectionPool,
  pub config: Arc<Config>,
  pub http: reqwest::Client,
  pub metrics: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Arc::new(Config::from_env()?);

  // create db connection pool
  let manager = Manager::new(config.database_url.clone(), Runtime::Tokio1);
  let pool: ConnectionPool = Pool::builder(manager)
    .max_size(8)
    .runtime(Runtime::Tokio1)
    .wait_timeout(Some(STORE_WAIT_TIMEOUT))
    .build()?;

  run_migrations(&pool).await?;

  let metrics = PrometheusBuilder::new().install_recorder()?;

  let http = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;

  let state = AppState {
    pool,
    config: config.clone(),
    http,
    metrics,
  };

  // reads open to anonymous viewers; a valid bearer still attaches the
  // caller so owners and staff see their secret content
  let public = Router::new()
    .typed_get(routes::feed::feed)
    .typed_get(routes::feed::recommendations)
    .typed_get(routes::series::get_series)
    .typed_get(routes::collections::get_collection)
    .typed_get(routes::users::user_series)
    .typed_get(routes::users::user_collections)
    .typed_get(routes::users::subscription_counts)
    .typed_get(routes::media::media_redirect)
    .layer(middleware::from_fn_with_state(state.clone(), auth::token::identify));

  let protected = Router::new()
    .typed_post(routes::series::create_series)
    .typed_delete(routes::series::delete_series)
    .typed_post(routes::collections::create_collection)
    .typed_patch(routes::collections::attach_series)
    .typed_delete(routes::collections::delete_collection)
    .typed_post(routes::users::subscribe)
    .typed_delete(routes::users::unsubscribe)
    .layer(middleware::from_fn_with_state(state.clone(), auth::token::auth));

  let open = Router::new()
    .typed_post(routes::users::create_user)
    .typed_post(routes::users::login)
    .typed_post(routes::users::activate)
    .typed_get(routes::system_health)
    .typed_get(routes::metrics_render);

  let app = Router::new()
    .merge(public)
    .merge(protected)
    .merge(open)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state);

  info!("listening on {}", config.bind_addr);
  let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn run_migrations(pool: &ConnectionPool) -> anyhow::Result<()> {
  let conn = pool.get().await?;

  let migration = conn
    .interact(|c| {
      c.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|e| e.to_string())
    })
    .await;

  match migration {
    Ok(Ok(applied)) => info!("migrations up to date ({applied} applied)"),
    Ok(Err(e)) => warn!("failed to migrate: {e}"),
    Err(e) => warn!("failed to migrate: {e}"),
  }

  Ok(())
}
