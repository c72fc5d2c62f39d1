//! Time sources and instant formatting

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Source of "now" for the event store
///
/// Production wiring uses [`SystemClock`]; tests inject a deterministic clock.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that starts at a given instant and advances one second per call
///
/// The sub-second part of the starting instant is kept on every tick.
#[derive(Debug)]
pub struct IncrementingClock {
    epoch_second: AtomicI64,
    nanos: u32,
}

impl IncrementingClock {
    pub fn new(from: DateTime<Utc>) -> Self {
        Self {
            epoch_second: AtomicI64::new(from.timestamp()),
            nanos: from.timestamp_subsec_nanos(),
        }
    }
}

impl Clock for IncrementingClock {
    fn now(&self) -> DateTime<Utc> {
        let second = self.epoch_second.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(second, self.nanos)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format an instant as ISO-8601 in UTC (`2024-03-01T10:00:00.123Z`)
///
/// Fractional seconds are omitted when zero, otherwise printed with 3, 6 or 9
/// digits.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 instant, normalizing any offset to UTC
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
