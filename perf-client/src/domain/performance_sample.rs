use sqlx::{sqlite::SqliteRow, FromRow, Row};
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime, UtcOffset};

/// A single power/energy reading reported for a site.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSample {
    pub id: i64,
    pub site: String,
    pub pac_kw: f64,
    pub eday_kwh: f64,
    pub timestamp: OffsetDateTime,
}

/// Render a timestamp in the stored encoding, normalised to UTC.
///
/// Fixed-width with microsecond precision, so stored values sort the same
/// lexically and chronologically.
pub fn format_timestamp(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    let stored = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");
    ts.to_offset(UtcOffset::UTC).format(&stored)
}

/// Parse any RFC 3339 timestamp and normalise it to UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).map(|ts| ts.to_offset(UtcOffset::UTC))
}

impl<'r> FromRow<'r, SqliteRow> for PerformanceSample {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let raw: String = row.try_get("timestamp")?;
        let timestamp = parse_timestamp(&raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "timestamp".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            site: row.try_get("site")?,
            pac_kw: row.try_get("pac_kw")?,
            eday_kwh: row.try_get("eday_kwh")?,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stored_timestamps_are_fixed_width_utc() {
        let ts = datetime!(2024-06-01 08:05:03 UTC);
        assert_eq!(format_timestamp(ts).unwrap(), "2024-06-01T08:05:03.000000Z");

        let later = datetime!(2024-06-01 08:05:03.25 UTC);
        assert_eq!(format_timestamp(later).unwrap(), "2024-06-01T08:05:03.250000Z");
    }

    #[test]
    fn offsets_are_normalised_before_formatting() {
        let ts = datetime!(2024-06-01 01:30:00 +08:00);
        assert_eq!(format_timestamp(ts).unwrap(), "2024-05-31T17:30:00.000000Z");
    }

    #[test]
    fn parse_accepts_other_rfc3339_shapes() {
        let a = parse_timestamp("2024-06-01T08:05:03Z").unwrap();
        let b = parse_timestamp("2024-06-01T16:05:03+08:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.offset(), UtcOffset::UTC);
    }

    #[test]
    fn parse_rejects_non_timestamps() {
        assert!(parse_timestamp("2024-06-01").is_err());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
