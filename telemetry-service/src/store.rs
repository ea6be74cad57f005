use std::time::Duration;

use perf_client::{db, domain::PerformanceSample};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    ConnectOptions, Connection,
};
use time::{Date, OffsetDateTime};

use crate::config::StoreConfig;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The database file could not be opened, was locked, full or unwritable.
    #[error("metric store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("metric store query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl StoreError {
    fn from_statement(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Database(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed => Self::Unavailable(e),
            other => Self::Query(other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Query(_) => "query",
        }
    }
}

/// Storage operations the HTTP layer depends on.
#[async_trait::async_trait]
pub trait SampleStore: Send + Sync {
    async fn append(
        &self,
        site: &str,
        pac_kw: f64,
        eday_kwh: f64,
        timestamp: OffsetDateTime,
    ) -> Result<i64, StoreError>;

    async fn latest_for(&self, site: &str) -> Result<Option<PerformanceSample>, StoreError>;

    async fn today_for(&self, site: &str, today: Date) -> Result<Vec<PerformanceSample>, StoreError>;
}

/// SQLite-backed store that opens a fresh connection for every call.
#[derive(Debug, Clone)]
pub struct MetricStore {
    options: SqliteConnectOptions,
}

impl MetricStore {
    pub fn new(cfg: &StoreConfig) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(&cfg.path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_millis(cfg.busy_timeout_ms));

        Self { options }
    }

    /// Create the database file, its directory and the schema if absent.
    ///
    /// Safe to call on every startup.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let path = self.options.get_filename();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(sqlx::Error::Io(e)))?;
        }

        let mut conn = self.connect().await?;
        let res = db::ensure_schema(&mut conn).await;
        release(conn).await;
        res.map_err(StoreError::from_statement)
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        self.options.connect().await.map_err(|e| {
            tracing::error!(error = %e, "failed to open metric store");
            StoreError::Unavailable(e)
        })
    }
}

/// Close a per-call connection. Dropping it on an early return also closes it.
async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "failed to close metric store connection");
    }
}

#[async_trait::async_trait]
impl SampleStore for MetricStore {
    async fn append(
        &self,
        site: &str,
        pac_kw: f64,
        eday_kwh: f64,
        timestamp: OffsetDateTime,
    ) -> Result<i64, StoreError> {
        let mut conn = self.connect().await?;
        let res = db::insert_sample(&mut conn, site, pac_kw, eday_kwh, timestamp).await;
        release(conn).await;
        res.map_err(StoreError::from_statement)
    }

    async fn latest_for(&self, site: &str) -> Result<Option<PerformanceSample>, StoreError> {
        let mut conn = self.connect().await?;
        let res = db::latest_for_site(&mut conn, site).await;
        release(conn).await;
        res.map_err(StoreError::from_statement)
    }

    async fn today_for(&self, site: &str, today: Date) -> Result<Vec<PerformanceSample>, StoreError> {
        let mut conn = self.connect().await?;
        let res = db::samples_on_date(&mut conn, site, today).await;
        release(conn).await;
        res.map_err(StoreError::from_statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use time::macros::{date, datetime};

    fn store_in(dir: &TempDir) -> MetricStore {
        MetricStore::new(&StoreConfig {
            path: dir.path().join("nested").join("performance.db"),
            busy_timeout_ms: 1_000,
        })
    }

    #[tokio::test]
    async fn initialize_creates_file_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        assert!(dir.path().join("nested").join("performance.db").exists());
    }

    #[tokio::test]
    async fn rows_survive_across_connections() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.initialize().await.unwrap();

        store.append("Site A", 5.2, 12.3, datetime!(2024-06-01 09:00 UTC)).await.unwrap();
        store.append("Site A", 5.5, 12.8, datetime!(2024-06-01 09:05 UTC)).await.unwrap();

        let reopened = store_in(&dir);
        let latest = reopened.latest_for("Site A").await.unwrap().unwrap();
        assert_eq!((latest.pac_kw, latest.eday_kwh), (5.5, 12.8));
    }

    #[tokio::test]
    async fn today_excludes_previous_utc_day() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.initialize().await.unwrap();

        store.append("Site A", 1.0, 40.0, datetime!(2024-06-01 22:00 UTC)).await.unwrap();
        store.append("Site A", 2.0, 0.5, datetime!(2024-06-02 00:10 UTC)).await.unwrap();

        let today = store.today_for("Site A", date!(2024-06-02)).await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].pac_kw, 2.0);
    }

    #[tokio::test]
    async fn missing_directory_without_initialize_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = MetricStore::new(&StoreConfig {
            path: PathBuf::from(dir.path()).join("absent").join("performance.db"),
            busy_timeout_ms: 1_000,
        });

        let err = store
            .append("Site A", 1.0, 1.0, datetime!(2024-06-01 09:00 UTC))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn initialize_fails_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = MetricStore::new(&StoreConfig {
            path: blocker.join("performance.db"),
            busy_timeout_ms: 1_000,
        });

        assert!(matches!(store.initialize().await, Err(StoreError::Unavailable(_))));
    }
}
