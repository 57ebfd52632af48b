use std::fmt::{self, Write as _};

use serde_json::Value as JsonValue;

use crate::data::model::TechCategory;
use crate::insight::{CompanyReport, LookupOutcome};

// ---------------------------------------------------------------------------
// Presenter seam
// ---------------------------------------------------------------------------

/// Renders a lookup outcome for one front end.
pub trait LookupPresenter {
    type Output;

    fn render_lookup_result(&mut self, outcome: &LookupOutcome) -> Self::Output;
}

/// User-facing message for every outcome without data.
pub fn status_message(outcome: &LookupOutcome) -> Option<String> {
    match outcome {
        LookupOutcome::NoQuery => Some("Enter a company name or stock code to begin.".to_string()),
        LookupOutcome::Unavailable { reason } => {
            Some(format!("Dataset not loaded, lookups are disabled: {reason}"))
        }
        LookupOutcome::NotFound { query, mode } => Some(format!(
            "No company found for {} '{query}'.",
            mode.label().to_lowercase()
        )),
        LookupOutcome::FoundEmpty { entity, range } => Some(format!(
            "Found {} ({}), but it has no data between {} and {}.",
            entity.name,
            entity.code,
            range.min(),
            range.max()
        )),
        LookupOutcome::Found(_) => None,
    }
}

/// "▲ 2.5" / "▼ 1.2"; zero counts as a rise.
pub fn format_delta(delta: f64) -> String {
    if delta == 0.0 {
        "▲ 0".to_string()
    } else if delta > 0.0 {
        format!("▲ {delta}")
    } else {
        format!("▼ {}", delta.abs())
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Plain-text summary for the terminal.
#[derive(Debug, Default)]
pub struct TextPresenter;

impl LookupPresenter for TextPresenter {
    type Output = String;

    fn render_lookup_result(&mut self, outcome: &LookupOutcome) -> String {
        match outcome {
            LookupOutcome::Found(report) => render_report(report),
            other => status_message(other).unwrap_or_default(),
        }
    }
}

fn render_report(report: &CompanyReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &CompanyReport) -> fmt::Result {
    let stats = &report.statistics;

    writeln!(out, "{} ({})", report.entity.name, report.entity.code)?;
    writeln!(out, "Data range: {}    latest update: {}", report.range, stats.latest_year)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<22}{} / 100  {} vs previous year",
        "Latest index",
        stats.latest_index,
        format_delta(stats.delta)
    )?;
    writeln!(out, "{:<22}{}", "Average index", stats.mean_index)?;
    writeln!(out, "{:<22}{}", "Leading technology", stats.dominant)?;
    writeln!(
        out,
        "{:<22}{} ({})",
        "Technology mentions", stats.total_tech_mentions, stats.latest_year
    )?;
    writeln!(out)?;

    write!(out, "{:<6}{:>8}", "Year", "Index")?;
    for category in TechCategory::ALL {
        write!(out, "{:>12}", category.key())?;
    }
    writeln!(out, "{:>12}", "digital")?;

    // Newest first, as in the detail table of the dashboard.
    for rec in report.series.records().iter().rev() {
        write!(out, "{:<6}{:>8.2}", rec.year.unwrap_or_default(), rec.index)?;
        for (_, n) in rec.tech.iter() {
            write!(out, "{n:>12}")?;
        }
        writeln!(out, "{:>12}", rec.digital_tech)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// JSON document with a `state` tag; found companies carry `chart_data`.
#[derive(Debug, Default)]
pub struct JsonPresenter;

impl LookupPresenter for JsonPresenter {
    type Output = serde_json::Result<JsonValue>;

    fn render_lookup_result(&mut self, outcome: &LookupOutcome) -> Self::Output {
        let mut value = serde_json::to_value(outcome)?;
        if let (Some(message), Some(obj)) = (status_message(outcome), value.as_object_mut()) {
            obj.insert("message".to_string(), JsonValue::String(message));
        }
        Ok(value)
    }
}
