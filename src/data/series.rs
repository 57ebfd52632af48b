use std::fmt;

use serde::Serialize;

use super::model::{Dataset, MetricRecord};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// YearRange
// ---------------------------------------------------------------------------

/// Inclusive year window applied to every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidYearRange { min, max });
        }
        Ok(YearRange { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    /// The window the published index covers reliably.
    fn default() -> Self {
        YearRange { min: 2000, max: 2023 }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A company as shown in headers: canonical code plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub code: String,
    pub name: String,
}

/// Display identity of a code.
///
/// The name comes from the company's earliest-year row; rows without a
/// readable year sort last.
pub fn entity(dataset: &Dataset, code: &str) -> Option<Entity> {
    let first = dataset
        .rows_for_code(code)
        .min_by_key(|r| (r.year.is_none(), r.year))?;
    Some(Entity {
        code: first.code.clone(),
        name: first.name.clone(),
    })
}

// ---------------------------------------------------------------------------
// CompanySeries
// ---------------------------------------------------------------------------

/// One company's records inside a year window, ascending by year.
///
/// Never empty: [`extract`] returns `None` instead of an empty series.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySeries {
    records: Vec<MetricRecord>,
}

impl CompanySeries {
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Most recent record.
    pub fn latest(&self) -> &MetricRecord {
        &self.records[self.records.len() - 1]
    }

    /// Record before the most recent one, if the series has two or more.
    pub fn previous(&self) -> Option<&MetricRecord> {
        self.records.len().checked_sub(2).map(|i| &self.records[i])
    }
}

/// Collect a company's records within `range`, sorted ascending by year.
///
/// Duplicate years are kept in source order (the sort is stable).
/// Returns `None` when nothing falls in the window.
pub fn extract(dataset: &Dataset, code: &str, range: YearRange) -> Option<CompanySeries> {
    let mut records: Vec<MetricRecord> = dataset
        .rows_for_code(code)
        .filter(|r| r.year.is_some_and(|y| range.contains(y)))
        .cloned()
        .collect();

    if records.is_empty() {
        return None;
    }
    records.sort_by_key(|r| r.year);
    Some(CompanySeries { records })
}
