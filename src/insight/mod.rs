//! Lookup pipeline: resolve → extract → aggregate → build.
//!
//! Every stage reports failure as a [`LookupError`]; [`lookup`] folds those
//! into a [`LookupOutcome`] so presenters only ever see one of five states.

pub mod stats;
pub mod view;

use serde::Serialize;

use crate::data::model::DataSource;
use crate::data::resolve::{resolve, SearchMode};
use crate::data::series::{self, CompanySeries, Entity, YearRange};
use crate::error::LookupError;

use stats::Statistics;
use view::ViewModel;

/// A query as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub query: String,
    pub mode: SearchMode,
}

impl LookupRequest {
    pub fn new(query: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            query: query.into(),
            mode,
        }
    }
}

/// Everything presenters need for a company with data in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyReport {
    pub entity: Entity,
    pub range: YearRange,
    #[serde(skip)]
    pub series: CompanySeries,
    pub statistics: Statistics,
    #[serde(rename = "chart_data")]
    pub view: ViewModel,
}

/// Result of one lookup, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LookupOutcome {
    NoQuery,
    Unavailable {
        reason: String,
    },
    NotFound {
        query: String,
        mode: SearchMode,
    },
    FoundEmpty {
        entity: Entity,
        range: YearRange,
    },
    #[serde(rename = "foundWithData")]
    Found(Box<CompanyReport>),
}

/// Flat discriminant of [`LookupOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    NoQuery,
    Unavailable,
    NotFound,
    FoundEmpty,
    FoundWithData,
}

impl LookupOutcome {
    pub fn state(&self) -> ResultState {
        match self {
            LookupOutcome::NoQuery => ResultState::NoQuery,
            LookupOutcome::Unavailable { .. } => ResultState::Unavailable,
            LookupOutcome::NotFound { .. } => ResultState::NotFound,
            LookupOutcome::FoundEmpty { .. } => ResultState::FoundEmpty,
            LookupOutcome::Found(_) => ResultState::FoundWithData,
        }
    }

    pub fn report(&self) -> Option<&CompanyReport> {
        match self {
            LookupOutcome::Found(report) => Some(report),
            _ => None,
        }
    }
}

impl From<LookupError> for LookupOutcome {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidQuery => LookupOutcome::NoQuery,
            LookupError::EntityNotFound { query, mode } => LookupOutcome::NotFound { query, mode },
            LookupError::NoDataInRange { code, name, range } => LookupOutcome::FoundEmpty {
                entity: Entity { code, name },
                range,
            },
            LookupError::DatasetUnavailable(reason) => LookupOutcome::Unavailable { reason },
        }
    }
}

/// Run one lookup against the current data source.
pub fn lookup(source: &DataSource, request: &LookupRequest, range: YearRange) -> LookupOutcome {
    match run(source, request, range) {
        Ok(report) => {
            log::debug!(
                "{} ({}): {} records, latest {} = {}",
                report.entity.name,
                report.entity.code,
                report.series.len(),
                report.statistics.latest_year,
                report.statistics.latest_index
            );
            LookupOutcome::Found(Box::new(report))
        }
        Err(LookupError::InvalidQuery) => LookupOutcome::NoQuery,
        Err(err) => {
            log::info!("lookup {:?} ({}): {err}", request.query.trim(), request.mode);
            err.into()
        }
    }
}

fn run(source: &DataSource, request: &LookupRequest, range: YearRange) -> Result<CompanyReport, LookupError> {
    if request.query.trim().is_empty() {
        return Err(LookupError::InvalidQuery);
    }
    let dataset = match source {
        DataSource::Ready(ds) => ds,
        DataSource::Unavailable(reason) => return Err(LookupError::DatasetUnavailable(reason.clone())),
    };

    let code = resolve(dataset, &request.query, request.mode)?;
    let entity = series::entity(dataset, &code).ok_or_else(|| LookupError::EntityNotFound {
        query: request.query.trim().to_string(),
        mode: request.mode,
    })?;

    let series = series::extract(dataset, &code, range).ok_or_else(|| LookupError::NoDataInRange {
        code: entity.code.clone(),
        name: entity.name.clone(),
        range,
    })?;

    let statistics = stats::aggregate(&series);
    let view = view::build(&series, &statistics);

    Ok(CompanyReport {
        entity,
        range,
        series,
        statistics,
        view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::data::fixtures::sample_dataset;
    use crate::data::model::TechCategory;
    use stats::DominantCategory;

    fn source() -> DataSource {
        DataSource::Ready(Arc::new(sample_dataset()))
    }

    fn run_query(query: &str, mode: SearchMode) -> LookupOutcome {
        lookup(&source(), &LookupRequest::new(query, mode), YearRange::default())
    }

    #[test]
    fn code_lookup_finds_data() {
        let outcome = run_query("600000", SearchMode::Code);
        assert_eq!(outcome.state(), ResultState::FoundWithData);

        let report = outcome.report().expect("report");
        assert_eq!(report.entity.name, "浦发银行");
        assert_eq!(report.statistics.delta, 2.5);
        assert_eq!(report.statistics.mean_index, 11.25);
        assert_eq!(report.statistics.latest_year, 2001);
        assert_eq!(report.view.years, vec![2000, 2001]);
    }

    #[test]
    fn substring_lookup_matches_code_lookup() {
        let by_name = run_query("浦发", SearchMode::Name);
        let by_code = run_query("600000", SearchMode::Code);
        assert_eq!(by_name, by_code);
    }

    #[test]
    fn entity_outside_window_is_found_empty() {
        match run_query("000002", SearchMode::Code) {
            LookupOutcome::FoundEmpty { entity, range } => {
                assert_eq!(entity.name, "万科A");
                assert_eq!(range, YearRange::default());
            }
            other => panic!("expected foundEmpty, got {other:?}"),
        }
    }

    #[test]
    fn zero_counts_report_no_preference() {
        let report = run_query("600000", SearchMode::Code);
        let stats = &report.report().expect("report").statistics;
        assert_eq!(stats.dominant, DominantCategory::NoClearPreference);
        assert_eq!(stats.total_tech_mentions, 0);
    }

    #[test]
    fn empty_query_is_no_query() {
        assert_eq!(run_query("", SearchMode::Name), LookupOutcome::NoQuery);
        assert_eq!(run_query("  ", SearchMode::Code), LookupOutcome::NoQuery);
    }

    #[test]
    fn empty_query_is_checked_before_dataset() {
        let source = DataSource::Unavailable("missing".into());
        let outcome = lookup(&source, &LookupRequest::new(" ", SearchMode::Name), YearRange::default());
        assert_eq!(outcome.state(), ResultState::NoQuery);
    }

    #[test]
    fn tie_resolves_to_first_category() {
        for _ in 0..5 {
            let outcome = run_query("贵州茅台", SearchMode::Name);
            let stats = &outcome.report().expect("report").statistics;
            assert_eq!(stats.dominant, DominantCategory::Category(TechCategory::Ai));
            assert_eq!(stats.total_tech_mentions, 10);
        }
    }

    #[test]
    fn unknown_company_is_not_found() {
        assert_eq!(
            run_query("不存在", SearchMode::Name),
            LookupOutcome::NotFound {
                query: "不存在".into(),
                mode: SearchMode::Name
            }
        );
    }

    #[test]
    fn unavailable_dataset_is_reported() {
        let source = DataSource::Unavailable("file not found".into());
        let outcome = lookup(&source, &LookupRequest::new("600000", SearchMode::Code), YearRange::default());
        assert_eq!(
            outcome,
            LookupOutcome::Unavailable {
                reason: "file not found".into()
            }
        );
    }

    #[test]
    fn narrower_window_changes_statistics() {
        let range = YearRange::new(2023, 2023).expect("range");
        let outcome = lookup(&source(), &LookupRequest::new("平安银行", SearchMode::Name), range);
        let report = outcome.report().expect("report");
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.statistics.delta, 0.0);
        assert_eq!(report.statistics.mean_index, 45.5);
        assert_eq!(
            report.statistics.dominant,
            DominantCategory::Category(TechCategory::BigData)
        );
    }

    #[test]
    fn outcome_serializes_with_state_tag() {
        let json = serde_json::to_value(run_query("600000", SearchMode::Code)).expect("serialize");
        assert_eq!(json["state"], "foundWithData");
        assert_eq!(json["entity"]["code"], "600000");
        assert_eq!(json["chart_data"]["indices"][1], 12.5);

        let json = serde_json::to_value(run_query("000002", SearchMode::Code)).expect("serialize");
        assert_eq!(json["state"], "foundEmpty");
    }
}
