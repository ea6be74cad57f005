use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use perf_client::domain::{format_timestamp, PerformanceSample};
use serde::{Deserialize, Serialize};
use time::macros::format_description;

use super::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AppendParams {
    pub site: String,
    pub pac_kw: f64,
    pub eday_kwh: f64,
}

#[derive(Debug, Deserialize)]
pub struct SiteParams {
    pub site: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusAck {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LatestSample {
    pub site: String,
    pub pac_kw: f64,
    pub eday_kwh: f64,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TodaySample {
    pub pac_kw: f64,
    pub eday_kwh: f64,
    pub timestamp: String,
}

/// Shape served to the original mobile client.
#[derive(Debug, Serialize)]
pub struct LiveData {
    pub ok: bool,
    pub site: String,
    pub pac: f64,
    pub eday: f64,
    pub time: Option<String>,
}

impl SiteParams {
    fn site_or(self, state: &AppState) -> String {
        self.site.unwrap_or_else(|| state.settings.default_site.clone())
    }
}

impl TryFrom<PerformanceSample> for TodaySample {
    type Error = ApiError;

    fn try_from(s: PerformanceSample) -> Result<Self, Self::Error> {
        Ok(Self {
            pac_kw: s.pac_kw,
            eday_kwh: s.eday_kwh,
            timestamp: format_timestamp(s.timestamp)?,
        })
    }
}

pub async fn add_sample(
    State(state): State<AppState>,
    params: Result<Query<AppendParams>, QueryRejection>,
) -> Result<Json<StatusAck>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        metrics::counter!("performance_append_rejected_total").increment(1);
        tracing::debug!(error = %rejection, "rejected append request");
        ApiError::from(rejection)
    })?;

    // NaN binds as NULL in SQLite and infinities serialize as JSON null.
    for (name, value) in [("pac_kw", params.pac_kw), ("eday_kwh", params.eday_kwh)] {
        if !value.is_finite() {
            metrics::counter!("performance_append_rejected_total").increment(1);
            return Err(ApiError::BadRequest(format!("{name} must be a finite number")));
        }
    }

    let stamped_at = state.clock.now_utc();
    let id = state
        .store
        .append(&params.site, params.pac_kw, params.eday_kwh, stamped_at)
        .await?;

    metrics::counter!("performance_append_total").increment(1);
    tracing::debug!(site = %params.site, id, "performance sample appended");

    Ok(Json(StatusAck { status: "ok" }))
}

pub async fn latest_sample(
    State(state): State<AppState>,
    params: Result<Query<SiteParams>, QueryRejection>,
) -> Result<Json<LatestSample>, ApiError> {
    let site = params?.0.site_or(&state);
    metrics::counter!("performance_query_total", "op" => "latest").increment(1);

    let body = match state.store.latest_for(&site).await? {
        Some(sample) => LatestSample {
            timestamp: Some(format_timestamp(sample.timestamp)?),
            site,
            pac_kw: sample.pac_kw,
            eday_kwh: sample.eday_kwh,
        },
        None => LatestSample {
            site,
            pac_kw: 0.0,
            eday_kwh: 0.0,
            timestamp: None,
        },
    };

    Ok(Json(body))
}

pub async fn today_samples(
    State(state): State<AppState>,
    params: Result<Query<SiteParams>, QueryRejection>,
) -> Result<Json<Vec<TodaySample>>, ApiError> {
    let site = params?.0.site_or(&state);
    metrics::counter!("performance_query_total", "op" => "today").increment(1);

    let today = state.clock.today_utc();
    let samples = state.store.today_for(&site, today).await?;
    tracing::debug!(site = %site, %today, count = samples.len(), "served today window");

    let body = samples
        .into_iter()
        .map(TodaySample::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(body))
}

pub async fn live_data(
    State(state): State<AppState>,
    params: Result<Query<SiteParams>, QueryRejection>,
) -> Result<Json<LiveData>, ApiError> {
    let site = params?.0.site_or(&state);
    metrics::counter!("performance_query_total", "op" => "live_data").increment(1);

    let hour_minute = format_description!("[hour]:[minute]");
    let body = match state.store.latest_for(&site).await? {
        Some(sample) => LiveData {
            ok: true,
            time: Some(sample.timestamp.format(&hour_minute)?),
            site,
            pac: sample.pac_kw,
            eday: sample.eday_kwh,
        },
        None => LiveData {
            ok: true,
            site,
            pac: 0.0,
            eday: 0.0,
            time: None,
        },
    };

    Ok(Json(body))
}
