use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::process::ProcessRegistry;
use crate::scheduler::Scheduler;
use crate::store::{LogStore, ProcessStore};

/// Maximum accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub processes: Arc<dyn ProcessStore>,
    pub logs: Arc<dyn LogStore>,
    pub registry: ProcessRegistry,
}

impl AppState {
    /// Wire stores to a fresh registry whose tasks tick every `tick_interval`.
    pub fn new(
        processes: Arc<dyn ProcessStore>,
        logs: Arc<dyn LogStore>,
        tick_interval: Duration,
    ) -> Self {
        let scheduler = Scheduler::new(logs.clone());
        Self {
            processes,
            logs,
            registry: ProcessRegistry::new(scheduler, tick_interval),
        }
    }
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/create-process", post(handlers::create_process))
        .route("/get-all", get(handlers::get_all))
        .route("/get-single", get(handlers::get_single))
        .route("/delete-process", delete(handlers::delete_process))
        .with_state(state);

    Router::new()
        .route("/", get(handlers::root))
        .route("/livez", get(handlers::livez))
        .route("/version", get(handlers::version))
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}
