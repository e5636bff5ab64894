//! Time window predicate used by every statistic.
//!
//! Timestamps are compared as instants, never as strings: GitLab returns
//! `2024-06-15T10:00:00.000+02:00` for some resources and `...Z` for others.

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::{GitlabStatsError, Result};

/// Non-RFC 3339 layouts accepted in addition to RFC 3339.
const EXTRA_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parse a timestamp carrying a UTC offset.
///
/// # Errors
/// Returns [`GitlabStatsError::MalformedTimestamp`] if the value matches none of
/// the accepted layouts or has no offset.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    let rfc_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(ts) => return Ok(ts),
        Err(e) => e,
    };

    EXTRA_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| GitlabStatsError::MalformedTimestamp {
            value: value.to_string(),
            reason: rfc_err.to_string(),
        })
}

/// Returns true iff `from <= timestamp <= to`. Inverted bounds are an
/// empty interval.
///
/// # Errors
/// Fails if any of the three timestamps cannot be parsed.
pub fn within(timestamp: &str, from: &str, to: &str) -> Result<bool> {
    let ts = parse_timestamp(timestamp)?;
    let (from, to) = (parse_timestamp(from)?, parse_timestamp(to)?);
    Ok(from <= ts && ts <= to)
}

/// Inclusive `[from, to]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// # Errors
    /// Returns a configuration error when `from` is after `to`.
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Result<Self> {
        if from > to {
            return Err(GitlabStatsError::Config(format!(
                "stats_from ({}) must not be after stats_to ({})",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<FixedOffset> {
        self.from
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<FixedOffset> {
        self.to
    }

    #[must_use]
    pub fn contains_instant(&self, ts: DateTime<FixedOffset>) -> bool {
        self.from <= ts && ts <= self.to
    }

    /// # Errors
    /// Fails with `MalformedTimestamp` instead of treating the value as outside.
    pub fn contains(&self, timestamp: &str) -> Result<bool> {
        parse_timestamp(timestamp).map(|ts| self.contains_instant(ts))
    }

    /// Lower bound in the form sent as the `since` query parameter.
    #[must_use]
    pub fn since_param(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `YYYY-MM-DD` rendering of both bounds, in their own offsets.
    #[must_use]
    pub fn report_dates(&self) -> (String, String) {
        (
            self.from.format("%Y-%m-%d").to_string(),
            self.to.format("%Y-%m-%d").to_string(),
        )
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
