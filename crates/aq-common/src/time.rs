//! Date handling for station days, raster days and chart windows.

use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AqError, AqResult};

/// Calendar date format used in routes, request bodies and the provider API.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
///
/// A full RFC 3339 timestamp is also accepted and truncated to its date, since
/// some clients send `Date.toISOString()` values.
pub fn parse_api_date(s: &str) -> AqResult<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, API_DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(AqError::InvalidDate(s.to_string()))
}

/// Format a date the way routes and the provider expect it.
pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Short `dd/mm` label used on chart axes.
pub fn chart_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// `YYYY-MM-DD HH:00` stamp of a projected hour.
pub fn hour_stamp(date: NaiveDate, hour: usize) -> String {
    format!("{} {:02}:00", format_api_date(date), hour)
}

/// A window of consecutive days centered on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartWindow {
    pub center: NaiveDate,
    /// Days on each side of the center.
    pub radius: u32,
}

impl ChartWindow {
    /// Days on each side of the center for the 7-day chart.
    pub const DEFAULT_RADIUS: u32 = 3;

    pub fn new(center: NaiveDate, radius: u32) -> Self {
        Self { center, radius }
    }

    /// The standard 7-day window.
    pub fn week(center: NaiveDate) -> Self {
        Self::new(center, Self::DEFAULT_RADIUS)
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        2 * self.radius as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered dates `center - radius ..= center + radius`.
    ///
    /// Fails with [`AqError::InvalidDate`] when the window leaves the
    /// representable calendar range.
    pub fn dates(&self) -> AqResult<Vec<NaiveDate>> {
        let radius = i64::from(self.radius);
        (-radius..=radius)
            .map(|offset| {
                self.center
                    .checked_add_signed(Duration::days(offset))
                    .ok_or_else(|| AqError::InvalidDate(format_api_date(self.center)))
            })
            .collect()
    }
}
