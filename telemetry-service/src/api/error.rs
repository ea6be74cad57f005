use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("metric store unavailable")]
    Unavailable,
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        metrics::counter!("store_errors_total", "kind" => e.kind()).increment(1);
        tracing::error!(error = %e, "metric store call failed");
        match e {
            StoreError::Unavailable(_) => Self::Unavailable,
            StoreError::Query(_) => Self::Internal,
        }
    }
}

impl From<time::error::Format> for ApiError {
    fn from(e: time::error::Format) -> Self {
        tracing::error!(error = %e, "failed to format timestamp");
        Self::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "detail": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
