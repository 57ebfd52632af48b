use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

/// Header names of the published index table.
pub mod columns {
    pub const CODE: &str = "股票代码";
    pub const NAME: &str = "企业名称";
    pub const YEAR: &str = "年份";
    pub const INDEX: &str = "数字化转型指数(0-100分)";
    pub const AI: &str = "人工智能词频数";
    pub const BIG_DATA: &str = "大数据词频数";
    pub const CLOUD: &str = "云计算词频数";
    pub const BLOCKCHAIN: &str = "区块链词频数";
    pub const DIGITAL_TECH: &str = "数字技术运用词频数";
}

// ---------------------------------------------------------------------------
// TechCategory – the four keyword families
// ---------------------------------------------------------------------------

/// A technology keyword category.
///
/// Declaration order is the precedence order used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    Ai,
    BigData,
    Cloud,
    Blockchain,
}

impl TechCategory {
    /// All categories in precedence order.
    pub const ALL: [TechCategory; 4] = [
        TechCategory::Ai,
        TechCategory::BigData,
        TechCategory::Cloud,
        TechCategory::Blockchain,
    ];

    /// Short machine key, as used in the chart payload.
    pub fn key(self) -> &'static str {
        match self {
            TechCategory::Ai => "ai",
            TechCategory::BigData => "bigdata",
            TechCategory::Cloud => "cloud",
            TechCategory::Blockchain => "blockchain",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TechCategory::Ai => "Artificial intelligence",
            TechCategory::BigData => "Big data",
            TechCategory::Cloud => "Cloud computing",
            TechCategory::Blockchain => "Blockchain",
        }
    }

    /// Source column holding this category's counts.
    pub fn column(self) -> &'static str {
        match self {
            TechCategory::Ai => columns::AI,
            TechCategory::BigData => columns::BIG_DATA,
            TechCategory::Cloud => columns::CLOUD,
            TechCategory::Blockchain => columns::BLOCKCHAIN,
        }
    }
}

impl fmt::Display for TechCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// TechCounts – one year's keyword frequencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TechCounts {
    pub ai: u64,
    #[serde(rename = "bigdata")]
    pub big_data: u64,
    pub cloud: u64,
    pub blockchain: u64,
}

impl TechCounts {
    pub fn get(&self, category: TechCategory) -> u64 {
        match category {
            TechCategory::Ai => self.ai,
            TechCategory::BigData => self.big_data,
            TechCategory::Cloud => self.cloud,
            TechCategory::Blockchain => self.blockchain,
        }
    }

    pub fn set(&mut self, category: TechCategory, value: u64) {
        match category {
            TechCategory::Ai => self.ai = value,
            TechCategory::BigData => self.big_data = value,
            TechCategory::Cloud => self.cloud = value,
            TechCategory::Blockchain => self.blockchain = value,
        }
    }

    /// `(category, count)` pairs in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = (TechCategory, u64)> + '_ {
        TechCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Sum of the four named categories, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.iter().fold(0, |acc, (_, n)| acc.saturating_add(n))
    }
}

// ---------------------------------------------------------------------------
// MetricRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One (company, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Stock code, kept as text so leading zeros survive.
    pub code: String,
    pub name: String,
    /// `None` when the source year could not be read as a number.
    pub year: Option<i32>,
    /// Transformation index, 0–100.
    pub index: f64,
    pub tech: TechCounts,
    /// The table's own aggregate digital-technology count. Display only.
    pub digital_tech: u64,
}

// ---------------------------------------------------------------------------
// Coercion bookkeeping
// ---------------------------------------------------------------------------

/// A cell that could not be coerced and was replaced by a default.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionIssue {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub column: &'static str,
    pub raw: String,
}

/// Coercion failures collected while loading a table.
#[derive(Debug, Clone, Default)]
pub struct CoercionReport {
    per_column: BTreeMap<&'static str, usize>,
    samples: Vec<CoercionIssue>,
}

impl CoercionReport {
    const MAX_SAMPLES: usize = 20;

    pub fn record(&mut self, issue: CoercionIssue) {
        *self.per_column.entry(issue.column).or_default() += 1;
        if self.samples.len() < Self::MAX_SAMPLES {
            self.samples.push(issue);
        }
    }

    /// Total number of defaulted cells.
    pub fn total(&self) -> usize {
        self.per_column.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.per_column.is_empty()
    }

    #[cfg(test)]
    pub fn count_for(&self, column: &str) -> usize {
        self.per_column.get(column).copied().unwrap_or(0)
    }

    pub fn per_column(&self) -> &BTreeMap<&'static str, usize> {
        &self.per_column
    }

    /// The first few issues, in load order.
    pub fn samples(&self) -> &[CoercionIssue] {
        &self.samples
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded table with lookup indices. Never mutated after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<MetricRecord>,
    /// code → row positions in source order.
    by_code: HashMap<String, Vec<usize>>,
    /// display name → first row position.
    by_name: HashMap<String, usize>,
    coercion: CoercionReport,
}

impl Dataset {
    /// Build indices over the loaded records.
    pub fn from_records(records: Vec<MetricRecord>, coercion: CoercionReport) -> Self {
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (i, rec) in records.iter().enumerate() {
            by_code.entry(rec.code.clone()).or_default().push(i);
            by_name.entry(rec.name.clone()).or_insert(i);
        }

        Dataset {
            records,
            by_code,
            by_name,
            coercion,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows in source order.
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Rows of one company, in source order. Empty for unknown codes.
    pub fn rows_for_code<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a MetricRecord> + 'a {
        self.by_code
            .get(code)
            .map(|rows| rows.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.records[i])
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// First row whose display name equals `name` exactly.
    pub fn first_with_name(&self, name: &str) -> Option<&MetricRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Number of distinct stock codes.
    pub fn company_count(&self) -> usize {
        self.by_code.len()
    }

    /// Smallest and largest readable year, if any.
    pub fn year_coverage(&self) -> Option<(i32, i32)> {
        let years: BTreeSet<i32> = self.records.iter().filter_map(|r| r.year).collect();
        Some((*years.first()?, *years.last()?))
    }

    pub fn coercion(&self) -> &CoercionReport {
        &self.coercion
    }
}

// ---------------------------------------------------------------------------
// DataSource – loaded dataset or the reason there is none
// ---------------------------------------------------------------------------

/// What lookups run against: a shared dataset, or an explicit unavailable state.
#[derive(Debug, Clone)]
pub enum DataSource {
    Ready(Arc<Dataset>),
    Unavailable(String),
}

impl DataSource {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            DataSource::Ready(ds) => Some(ds),
            DataSource::Unavailable(_) => None,
        }
    }
}

impl From<anyhow::Result<Dataset>> for DataSource {
    fn from(result: anyhow::Result<Dataset>) -> Self {
        match result {
            Ok(ds) => DataSource::Ready(Arc::new(ds)),
            Err(e) => DataSource::Unavailable(format!("{e:#}")),
        }
    }
}
