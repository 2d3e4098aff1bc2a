//! Shared traits and small value types used across the finance records.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies records that expose a stable opaque identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly record name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Generates a fresh opaque record identifier.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Calendar month bucket, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The month immediately before this one, wrapping January into the previous year.
    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Short chart label such as `Jan 25`.
    pub fn label(self) -> String {
        self.first_day()
            .map(|date| date.format("%b %y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_month_wraps_year_boundary() {
        assert_eq!(YearMonth::new(2025, 1).previous(), YearMonth::new(2024, 12));
        assert_eq!(YearMonth::new(2025, 7).previous(), YearMonth::new(2025, 6));
    }

    #[test]
    fn key_and_label_formats() {
        let month = YearMonth::new(2025, 3);
        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(month.label(), "Mar 25");
    }
}
