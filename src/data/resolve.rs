use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::Dataset;
use crate::error::LookupError;

// ---------------------------------------------------------------------------
// Search mode
// ---------------------------------------------------------------------------

/// How a free-text query is matched against the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Exact display name, falling back to substring.
    #[default]
    Name,
    /// Exact stock code.
    Code,
}

impl SearchMode {
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Name => "Company name",
            SearchMode::Code => "Stock code",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Name => f.write_str("name"),
            SearchMode::Code => f.write_str("code"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SearchMode::Name),
            "code" => Ok(SearchMode::Code),
            other => Err(format!("unknown search mode '{other}' (expected 'name' or 'code')")),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a user query to a stock code.
///
/// * [`SearchMode::Code`] – exact, case-sensitive comparison as text, so
///   `"000001"` and `"1"` are different companies.
/// * [`SearchMode::Name`] – exact display name first; otherwise the first row
///   in source order whose name contains the query.
///
/// The query is trimmed; a blank query is rejected before any lookup.
pub fn resolve(dataset: &Dataset, query: &str, mode: SearchMode) -> Result<String, LookupError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(LookupError::InvalidQuery);
    }

    let found = match mode {
        SearchMode::Code => dataset.contains_code(query).then(|| query.to_string()),
        SearchMode::Name => dataset
            .first_with_name(query)
            .or_else(|| {
                // Several companies may share the substring; source order decides.
                dataset
                    .records()
                    .iter()
                    .find(|r| !r.name.is_empty() && r.name.contains(query))
            })
            .map(|r| r.code.clone()),
    };

    found.ok_or_else(|| LookupError::EntityNotFound {
        query: query.to_string(),
        mode,
    })
}
