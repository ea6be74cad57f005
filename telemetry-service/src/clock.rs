//! Wall-clock source used to stamp samples and to resolve "today".

use std::sync::Mutex;

use time::{Date, Duration, OffsetDateTime, UtcOffset};

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> OffsetDateTime;

    /// Current UTC calendar date, evaluated on every call.
    fn today_utc(&self) -> Date {
        self.now_utc().to_offset(UtcOffset::UTC).date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock; lets tests pin "now" and step across midnight.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn fixed_clock_rolls_over_midnight() {
        let clock = FixedClock::new(datetime!(2024-06-01 23:59:59 UTC));
        assert_eq!(clock.today_utc(), date!(2024-06-01));

        clock.advance(Duration::seconds(1));
        assert_eq!(clock.today_utc(), date!(2024-06-02));
    }

    #[test]
    fn today_uses_utc_date_not_local_offset() {
        let clock = FixedClock::new(datetime!(2024-06-02 01:00 +08:00));
        assert_eq!(clock.today_utc(), date!(2024-06-01));

        clock.set(datetime!(2024-06-02 09:00 +08:00));
        assert_eq!(clock.today_utc(), date!(2024-06-02));
    }
}
