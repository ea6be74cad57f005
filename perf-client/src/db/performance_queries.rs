use sqlx::SqliteConnection;
use time::{macros::format_description, Date, OffsetDateTime};

use crate::domain::{format_timestamp, PerformanceSample};

/// Create the `performance` table and its site index if they are missing.
///
/// `timestamp` deliberately has no column default: rows are always stamped by
/// the caller.
pub async fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS performance (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            site      TEXT    NOT NULL,
            pac_kw    REAL    NOT NULL,
            eday_kwh  REAL    NOT NULL,
            timestamp TEXT    NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS performance_site_idx ON performance (site)")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Append one sample and return the id the store assigned to it.
pub async fn insert_sample(
    conn: &mut SqliteConnection,
    site: &str,
    pac_kw: f64,
    eday_kwh: f64,
    timestamp: OffsetDateTime,
) -> Result<i64, sqlx::Error> {
    let stamped = format_timestamp(timestamp).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let result = sqlx::query(
        r#"
        INSERT INTO performance (site, pac_kw, eday_kwh, timestamp)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(site)
    .bind(pac_kw)
    .bind(eday_kwh)
    .bind(stamped)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recently inserted sample for `site`, by id rather than timestamp.
pub async fn latest_for_site(
    conn: &mut SqliteConnection,
    site: &str,
) -> Result<Option<PerformanceSample>, sqlx::Error> {
    sqlx::query_as::<_, PerformanceSample>(
        r#"
        SELECT id, site, pac_kw, eday_kwh, timestamp
        FROM performance
        WHERE site = ?1
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(site)
    .fetch_optional(&mut *conn)
    .await
}

/// All samples for `site` whose UTC calendar date is `date`, oldest first.
///
/// SQLite's `date()` normalises RFC 3339 offsets to UTC, so only that day's
/// rows are read and decoded; rows it cannot interpret never leave the
/// store. The parsed timestamps are checked again before sorting. Equal
/// timestamps fall back to insertion order.
pub async fn samples_on_date(
    conn: &mut SqliteConnection,
    site: &str,
    date: Date,
) -> Result<Vec<PerformanceSample>, sqlx::Error> {
    let day = date
        .format(&format_description!("[year]-[month]-[day]"))
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let rows = sqlx::query_as::<_, PerformanceSample>(
        r#"
        SELECT id, site, pac_kw, eday_kwh, timestamp
        FROM performance
        WHERE site = ?1
          AND date(timestamp) = ?2
        ORDER BY id
        "#,
    )
    .bind(site)
    .bind(day)
    .fetch_all(&mut *conn)
    .await?;

    let mut samples: Vec<PerformanceSample> =
        rows.into_iter().filter(|s| s.timestamp.date() == date).collect();
    samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    Ok(samples)
}
