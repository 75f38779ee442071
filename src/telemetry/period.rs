use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::error::{CoreError, Result};

/// Inclusive `[start, end]` window, normalised to UTC and snapped inward to
/// whole microseconds, the precision readings are stored at.
///
/// Construction rejects inverted bounds. A window narrower than one
/// microsecond that holds no whole microsecond snaps to an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(CoreError::validation(format!(
                "start ({}) must not be after end ({})",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            start: ceil_micros(start),
            end: end.trunc_subsecs(6),
        })
    }

    /// Parse two RFC 3339 timestamps (any offset) into a UTC range.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_bound("start", start)?;
        let end = parse_bound("end", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

fn ceil_micros(t: DateTime<Utc>) -> DateTime<Utc> {
    let floor = t.trunc_subsecs(6);
    if floor < t {
        floor + Duration::microseconds(1)
    } else {
        floor
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::validation(format!("invalid {name} date format {raw:?}: {e}")))
}
