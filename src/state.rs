use std::path::Path;
use std::sync::Arc;

use crate::color::CategoryPalette;
use crate::data::loader::load_file;
use crate::data::model::DataSource;
use crate::data::resolve::SearchMode;
use crate::data::series::YearRange;
use crate::insight::{lookup, LookupOutcome, LookupRequest};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shortcuts offered under the search box.
pub const QUICK_SEARCHES: [(&str, SearchMode, &str); 3] = [
    ("平安银行", SearchMode::Name, "Ping An Bank"),
    ("600519", SearchMode::Code, "Kweichow Moutai"),
    ("美的集团", SearchMode::Name, "Midea Group"),
];

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset, or why there is none.
    pub source: DataSource,

    /// Year window applied to every lookup.
    pub range: YearRange,

    /// Search box contents.
    pub request: LookupRequest,

    /// Result of the last submitted search.
    pub outcome: LookupOutcome,

    /// Colours of the four technology categories.
    pub palette: CategoryPalette,

    /// Whether the detail table is expanded.
    pub show_table: bool,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: DataSource, range: YearRange) -> Self {
        let outcome = initial_outcome(&source);
        Self {
            source,
            range,
            request: LookupRequest::default(),
            outcome,
            palette: CategoryPalette::default(),
            show_table: true,
            status_message: None,
        }
    }

    /// Run the search currently in the search box.
    pub fn submit(&mut self) {
        self.outcome = lookup(&self.source, &self.request, self.range);
    }

    /// Fill the search box and run it.
    pub fn quick_search(&mut self, query: &str, mode: SearchMode) {
        self.request = LookupRequest::new(query, mode);
        self.submit();
    }

    /// Replace the dataset with the contents of `path`.
    ///
    /// On failure the previous dataset is kept and the error is shown.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                self.source = DataSource::Ready(Arc::new(dataset));
                self.status_message = None;
                // Re-run the current search against the new table.
                self.submit();
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn initial_outcome(source: &DataSource) -> LookupOutcome {
    match source {
        DataSource::Ready(_) => LookupOutcome::NoQuery,
        DataSource::Unavailable(reason) => LookupOutcome::Unavailable {
            reason: reason.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::fixtures::sample_dataset;
    use crate::insight::ResultState;

    fn state() -> AppState {
        AppState::new(DataSource::Ready(Arc::new(sample_dataset())), YearRange::default())
    }

    #[test]
    fn starts_without_query() {
        assert_eq!(state().outcome.state(), ResultState::NoQuery);
    }

    #[test]
    fn unavailable_dataset_shows_immediately() {
        let state = AppState::new(DataSource::Unavailable("gone".into()), YearRange::default());
        assert_eq!(state.outcome.state(), ResultState::Unavailable);
    }

    #[test]
    fn quick_search_runs_lookup() {
        let mut state = state();
        state.quick_search("平安银行", SearchMode::Name);
        assert_eq!(state.request.mode, SearchMode::Name);
        assert_eq!(state.outcome.state(), ResultState::FoundWithData);

        state.quick_search("600519", SearchMode::Code);
        assert_eq!(
            state.outcome.report().map(|r| r.entity.name.as_str()),
            Some("贵州茅台")
        );
    }

    #[test]
    fn clearing_query_returns_to_start() {
        let mut state = state();
        state.quick_search("浦发", SearchMode::Name);
        state.request.query.clear();
        state.submit();
        assert_eq!(state.outcome, LookupOutcome::NoQuery);
    }

    #[test]
    fn failed_open_keeps_dataset() {
        let mut state = state();
        state.open(Path::new("/nonexistent/table.csv"));
        assert!(state.source.dataset().is_some());
        assert!(state.status_message.is_some());
    }
}
