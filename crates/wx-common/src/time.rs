//! Time selection for remote data requests.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WxError, WxResult};

/// Which valid time(s) a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSelector {
    /// Most recent time the server has.
    Latest,
    /// A single valid time.
    At(DateTime<Utc>),
    /// An inclusive interval.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TimeSelector {
    /// Parse `latest`, an ISO 8601 instant, or `start/end`.
    pub fn parse(s: &str) -> WxResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") || s.eq_ignore_ascii_case("present") {
            return Ok(TimeSelector::Latest);
        }

        if let Some((start, end)) = s.split_once('/') {
            return TimeSelector::range(parse_iso8601(start)?, parse_iso8601(end)?);
        }

        Ok(TimeSelector::At(parse_iso8601(s)?))
    }

    /// Build a range, rejecting `end < start`.
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> WxResult<Self> {
        if end < start {
            return Err(WxError::InvalidTime(format!(
                "range end {} precedes start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(TimeSelector::Range { start, end })
    }

    /// Representative instant used for naming outputs and granule paths.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeSelector::Latest => None,
            TimeSelector::At(t) => Some(*t),
            TimeSelector::Range { start, .. } => Some(*start),
        }
    }

    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        match self {
            TimeSelector::Latest => true,
            TimeSelector::At(at) => at == t,
            TimeSelector::Range { start, end } => t >= start && t <= end,
        }
    }
}

/// Format an instant the way data services expect it.
pub fn format_iso8601(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 instant, with or without a zone (UTC assumed).
pub fn parse_iso8601(s: &str) -> WxResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y%m%dT%H%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{}T00:00:00", s), "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(WxError::InvalidTime(s.to_string()))
}
