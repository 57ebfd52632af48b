use std::path::PathBuf;

use clap::Parser;

use crate::data::resolve::SearchMode;
use crate::data::series::YearRange;
use crate::error::ConfigError;
use crate::insight::LookupRequest;

/// File name of the published index table.
pub const DEFAULT_DATA_FILE: &str = "1999-2023年数字化转型指数结果表.csv";

#[derive(Parser, Debug, Clone)]
#[command(name = "dt-insight")]
#[command(about = "Digital-transformation index dashboard for listed companies")]
pub struct Args {
    /// Index table to load (.csv, .json or .parquet)
    #[arg(short, long, env = "DT_INSIGHT_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// First year shown (inclusive)
    #[arg(long, default_value_t = 2000)]
    pub year_min: i32,

    /// Last year shown (inclusive)
    #[arg(long, default_value_t = 2023)]
    pub year_max: i32,

    /// Font file with CJK glyphs, used so Chinese company names render
    #[arg(long, env = "DT_INSIGHT_FONT")]
    pub font: Option<PathBuf>,

    /// Look up a company and print the result instead of opening the dashboard
    #[arg(short, long)]
    pub query: Option<String>,

    /// How --query is matched: "name" or "code"
    #[arg(long = "by", default_value = "name")]
    pub mode: SearchMode,

    /// Print the --query result as JSON
    #[arg(long, requires = "query")]
    pub json: bool,
}

impl Args {
    pub fn year_range(&self) -> Result<YearRange, ConfigError> {
        YearRange::new(self.year_min, self.year_max)
    }

    /// The headless request, if one was given.
    pub fn request(&self) -> Option<LookupRequest> {
        self.query
            .as_ref()
            .map(|q| LookupRequest::new(q.clone(), self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_published_table() {
        let args = Args::try_parse_from(["dt-insight"]).expect("parse");
        assert_eq!(args.year_range(), Ok(YearRange::default()));
        assert_eq!(args.mode, SearchMode::Name);
        assert!(args.request().is_none());
        assert!(!args.json);
    }

    #[test]
    fn parses_headless_code_query() {
        let args = Args::try_parse_from([
            "dt-insight",
            "--data",
            "table.parquet",
            "--query",
            "000001",
            "--by",
            "code",
            "--json",
        ])
        .expect("parse");
        assert_eq!(args.data, PathBuf::from("table.parquet"));
        assert_eq!(
            args.request(),
            Some(LookupRequest::new("000001", SearchMode::Code))
        );
        assert!(args.json);
    }

    #[test]
    fn inverted_year_window_is_a_config_error() {
        let args = Args::try_parse_from(["dt-insight", "--year-min", "2023", "--year-max", "2000"])
            .expect("parse");
        let err = args.year_range().expect_err("inverted");
        assert_eq!(err, ConfigError::InvalidYearRange { min: 2023, max: 2000 });
        assert!(err.to_string().contains("2023 is after 2000"));
    }

    #[test]
    fn json_requires_query() {
        assert!(Args::try_parse_from(["dt-insight", "--json"]).is_err());
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["dt-insight", "--by", "ticker"]).is_err());
    }

    #[test]
    fn inverted_years_fail_validation() {
        let args = Args::try_parse_from(["dt-insight", "--year-min", "2020", "--year-max", "2010"])
            .expect("parse");
        assert!(args.year_range().is_err());
    }
}
