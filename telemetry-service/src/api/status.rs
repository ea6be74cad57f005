use axum::{extract::State, Json};
use perf_client::domain::format_timestamp;
use serde::Serialize;

use super::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub service: String,
    pub status: &'static str,
    pub docs: &'static str,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DocsResponse {
    pub service: String,
    pub routes: &'static [RouteDoc],
}

const ROUTES: &[RouteDoc] = &[
    RouteDoc {
        method: "GET",
        path: "/",
        description: "service name and pointers to docs and health",
    },
    RouteDoc {
        method: "GET",
        path: "/health",
        description: "liveness flag and current UTC time",
    },
    RouteDoc {
        method: "POST",
        path: "/api/performance/add?site=&pac_kw=&eday_kwh=",
        description: "append a sample stamped with the server clock",
    },
    RouteDoc {
        method: "GET",
        path: "/api/performance/latest?site=",
        description: "most recently inserted sample for a site",
    },
    RouteDoc {
        method: "GET",
        path: "/api/performance/today?site=",
        description: "samples on the current UTC date, oldest first",
    },
    RouteDoc {
        method: "GET",
        path: "/live-data?site=",
        description: "latest sample in the legacy mobile shape",
    },
];

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        service: state.settings.service_name.clone(),
        status: "ok",
        docs: "/docs",
        health: "/health",
    })
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        ok: true,
        service: state.settings.service_name.clone(),
        time: format_timestamp(state.clock.now_utc())?,
    }))
}

pub async fn docs(State(state): State<AppState>) -> Json<DocsResponse> {
    Json(DocsResponse {
        service: state.settings.service_name.clone(),
        routes: ROUTES,
    })
}
