use anyhow::{bail, Result};
use perf_client::domain::format_timestamp;
use serde::Serialize;
use std::{env, fs::File, io};
use telemetry_service::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    observability,
    store::{MetricStore, SampleStore},
};

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    site: &'a str,
    pac_kw: f64,
    eday_kwh: f64,
    timestamp: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: export_today <site> [output_csv_path]");
    }
    let site = &args[1];

    // Load configuration (can point TELEMETRY_CONFIG at the service's file).
    let cfg = AppConfig::load()?;

    let store = MetricStore::new(&cfg.store);
    store.initialize().await?;

    let today = SystemClock.today_utc();
    let samples = store.today_for(site, today).await?;

    let out: Box<dyn io::Write> = match args.get(2) {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(out);

    for s in &samples {
        writer.serialize(ExportRow {
            id: s.id,
            site: &s.site,
            pac_kw: s.pac_kw,
            eday_kwh: s.eday_kwh,
            timestamp: format_timestamp(s.timestamp)?,
        })?;
    }
    writer.flush()?;

    tracing::info!(site = %site, %today, exported_rows = samples.len(), "today window exported");

    Ok(())
}
