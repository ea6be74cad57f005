//! HTTP surface for site performance samples.
//!
//! Every handler receives the store handle through [`AppState`]; nothing is
//! held between requests apart from that immutable state.

pub mod error;
pub mod performance;
pub mod status;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{clock::Clock, config::AppConfig, store::SampleStore};

pub use error::ApiError;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub service_name: String,
    pub default_site: String,
}

impl From<&AppConfig> for ApiSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            service_name: cfg.server.service_name.clone(),
            default_site: cfg.api.default_site.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SampleStore>,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn SampleStore>, clock: Arc<dyn Clock>, settings: ApiSettings) -> Self {
        Self {
            store,
            clock,
            settings: Arc::new(settings),
        }
    }
}

/// Build the service router.
///
/// CORS is wide open (any origin, credentials, methods and headers): there is
/// no authentication behind it.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .route("/docs", get(status::docs))
        .route("/api/performance/add", post(performance::add_sample))
        .route("/api/performance/latest", get(performance::latest_sample))
        .route("/api/performance/today", get(performance::today_samples))
        .route("/live-data", get(performance::live_data))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
