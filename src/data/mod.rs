/// Data layer: core types, loading, resolution, and series extraction.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + coerce → Dataset (+ CoercionReport)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<MetricRecord>, code index, name index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  resolve  │  query + mode → stock code
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  series   │  code + year window → CompanySeries
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod resolve;
pub mod series;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::model::{CoercionReport, Dataset, MetricRecord, TechCounts};

    pub fn record(code: &str, name: &str, year: i32, index: f64) -> MetricRecord {
        MetricRecord {
            code: code.to_string(),
            name: name.to_string(),
            year: Some(year),
            index,
            tech: TechCounts::default(),
            digital_tech: 0,
        }
    }

    pub fn with_counts(mut rec: MetricRecord, ai: u64, big_data: u64, cloud: u64, blockchain: u64) -> MetricRecord {
        rec.tech = TechCounts {
            ai,
            big_data,
            cloud,
            blockchain,
        };
        rec.digital_tech = ai + big_data + cloud + blockchain;
        rec
    }

    /// Small table covering the lookup scenarios:
    /// * 600000 浦发银行 – 2000/2001, listed out of order
    /// * 000001 平安银行 – 2022/2023 with keyword counts
    /// * 000002 万科A – 1999 only
    /// * 600519 贵州茅台 – 2023 with an AI/Big-data tie
    pub fn sample_dataset() -> Dataset {
        let records = vec![
            record("600000", "浦发银行", 2001, 12.5),
            record("000001", "平安银行", 2022, 40.0),
            record("600000", "浦发银行", 2000, 10.0),
            with_counts(record("000001", "平安银行", 2023, 45.5), 12, 30, 7, 1),
            record("000002", "万科A", 1999, 5.0),
            with_counts(record("600519", "贵州茅台", 2023, 20.0), 5, 5, 0, 0),
        ];
        Dataset::from_records(records, CoercionReport::default())
    }
}
