use std::fmt;

use serde::{Serialize, Serializer};

use crate::data::model::{TechCategory, TechCounts};
use crate::data::series::CompanySeries;

// ---------------------------------------------------------------------------
// DominantCategory
// ---------------------------------------------------------------------------

/// The most-mentioned category of the latest year, or none when every count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantCategory {
    Category(TechCategory),
    NoClearPreference,
}

impl DominantCategory {
    /// Pick the largest count, scanning in [`TechCategory::ALL`] order.
    ///
    /// Only a strictly greater count replaces the current pick, so ties go
    /// to the category declared first.
    pub fn of(counts: &TechCounts) -> Self {
        let mut best: Option<(TechCategory, u64)> = None;
        for (category, n) in counts.iter() {
            if best.map_or(true, |(_, max)| n > max) {
                best = Some((category, n));
            }
        }
        match best {
            Some((category, n)) if n > 0 => DominantCategory::Category(category),
            _ => DominantCategory::NoClearPreference,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DominantCategory::Category(c) => c.label(),
            DominantCategory::NoClearPreference => "No clear preference",
        }
    }
}

impl fmt::Display for DominantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DominantCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DominantCategory::Category(c) => serializer.serialize_str(c.key()),
            DominantCategory::NoClearPreference => serializer.serialize_str("none"),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Headline figures for one company's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub latest_year: i32,
    pub latest_index: f64,
    /// Change against the previous record, 0 for single-record series.
    pub delta: f64,
    pub mean_index: f64,
    pub dominant: DominantCategory,
    /// Sum of the four category counts in the latest year.
    pub total_tech_mentions: u64,
}

/// Compute headline figures from a non-empty series.
pub fn aggregate(series: &CompanySeries) -> Statistics {
    let latest = series.latest();
    let records = series.records();

    let delta = series
        .previous()
        .map(|prev| round2(latest.index - prev.index))
        .unwrap_or(0.0);
    let mean_index = round2(records.iter().map(|r| r.index).sum::<f64>() / records.len() as f64);

    Statistics {
        // extract() only keeps dated rows
        latest_year: latest.year.unwrap_or_default(),
        latest_index: latest.index,
        delta,
        mean_index,
        dominant: DominantCategory::of(&latest.tech),
        total_tech_mentions: latest.tech.total(),
    }
}

/// Round to two decimals, ties to even. Never returns `-0.0`.
pub fn round2(v: f64) -> f64 {
    let rounded = (v * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
