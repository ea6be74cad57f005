pub mod api;
pub mod clock;
pub mod config;
pub mod metrics_server;
pub mod observability;
pub mod store;

pub use api::{router, AppState};
pub use store::{MetricStore, SampleStore};
