//! Eulen Entitlement Service - license lifecycle and access evaluation
//!
//! Architecture:
//! - Pure entitlement engine (tiers, expiry, bans) in `engine`
//! - SeaORM for license-record storage (SQLite) with versioned writes
//! - Axum for the HTTP API with rate limiting
//! - reqwest for the hosted identity endpoint
//! - Tokio for async runtime

mod engine;
mod entity;
mod error;
mod handlers;
mod migration;
mod prelude;
mod state;
mod sv;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::prelude::*;
use crate::state::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "eulen_entitlement=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  let port = config.port;

  info!("Starting Entitlement Service v{}", env!("CARGO_PKG_VERSION"));

  let app_state = Arc::new(AppState::new(config).await);

  // Configure rate limiting (100 requests per minute per IP)
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .context("Failed to build rate limiter config")?,
  );

  let governor_limiter = governor_conf.limiter().clone();

  // Spawn rate limiter cleanup task
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  // Build router with middleware
  let app = Router::new()
    .route("/api/login", post(handlers::login))
    .route("/api/access", post(handlers::access))
    .route("/api/remaining/{uid}", get(handlers::remaining))
    .route(
      "/api/admin/records",
      get(handlers::list_records).post(handlers::create_record),
    )
    .route("/api/admin/tier", post(handlers::modify_tier))
    .route("/api/admin/ban", post(handlers::toggle_ban))
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state)
    .into_make_service_with_connect_info::<SocketAddr>();

  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  let listener =
    tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;

  info!("HTTP server listening on {addr}");

  axum::serve(listener, app).await.context("Axum server error")
}
