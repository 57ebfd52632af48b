use serde::Serialize;

use crate::data::model::{TechCategory, TechCounts};
use crate::data::series::CompanySeries;

use super::stats::Statistics;

/// Per-category count arrays, aligned with [`ViewModel::years`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub ai: Vec<u64>,
    #[serde(rename = "bigdata")]
    pub big_data: Vec<u64>,
    pub cloud: Vec<u64>,
    pub blockchain: Vec<u64>,
}

impl CategoryBreakdown {
    pub fn get(&self, category: TechCategory) -> &[u64] {
        match category {
            TechCategory::Ai => &self.ai,
            TechCategory::BigData => &self.big_data,
            TechCategory::Cloud => &self.cloud,
            TechCategory::Blockchain => &self.blockchain,
        }
    }

    fn push(&mut self, counts: &TechCounts) {
        self.ai.push(counts.ai);
        self.big_data.push(counts.big_data);
        self.cloud.push(counts.cloud);
        self.blockchain.push(counts.blockchain);
    }
}

/// Chart-ready arrays. Every array has one entry per series record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub years: Vec<i32>,
    pub indices: Vec<f64>,
    pub breakdown: CategoryBreakdown,
    /// Year of [`ViewModel::latest_breakdown`].
    pub latest_year: i32,
    pub latest_breakdown: TechCounts,
}

impl ViewModel {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.years.len()
    }
}

/// Reshape a series into column arrays. No resampling, no gap filling.
pub fn build(series: &CompanySeries, stats: &Statistics) -> ViewModel {
    let records = series.records();
    let mut years = Vec::with_capacity(records.len());
    let mut indices = Vec::with_capacity(records.len());
    let mut breakdown = CategoryBreakdown::default();

    for rec in records {
        years.push(rec.year.unwrap_or_default());
        indices.push(rec.index);
        breakdown.push(&rec.tech);
    }

    ViewModel {
        years,
        indices,
        breakdown,
        latest_year: stats.latest_year,
        latest_breakdown: series.latest().tech,
    }
}
