//! # Habit Tracker Backend
//!
//! REST service for daily habit trackers: owners create trackers, mark the
//! current day as done, and read back streaks and period progress.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum handlers, bearer-token auth)
//!     ↓
//! Domain Layer (tracker aggregate, streak and period rules, services)
//!     ↓
//! Storage Layer (SQLite via sqlx)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domain::calendar::SystemClock;
use crate::domain::TrackerService;
use crate::io::auth::{require_auth, AuthKeys};
use crate::storage::{DbConnection, TrackerRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub tracker_service: TrackerService,
    pub auth: AuthKeys,
}

impl AppState {
    pub fn new(tracker_service: TrackerService, auth: AuthKeys) -> Self {
        Self {
            tracker_service,
            auth,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database.url);
    let db_conn = DbConnection::new(&config.database.url).await?;

    info!("Setting up domain model");
    let tracker_service = TrackerService::new(
        Arc::new(TrackerRepository::new(db_conn)),
        Arc::new(SystemClock),
    );

    Ok(AppState::new(
        tracker_service,
        AuthKeys::from_secret(&config.auth.jwt_secret),
    ))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let api_routes = io::rest::tracker_apis::router().route_layer(
        middleware::from_fn_with_state(app_state.clone(), require_auth),
    );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
