use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot;
use crate::color::{CategoryPalette, ERROR_TEXT};
use crate::data::model::TechCategory;
use crate::insight::stats::DominantCategory;
use crate::insight::{CompanyReport, LookupOutcome, ResultState};
use crate::present::{format_delta, status_message, LookupPresenter};

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Renders a lookup outcome into the central panel.
pub struct Dashboard<'a> {
    ui: &'a mut Ui,
    palette: &'a CategoryPalette,
    show_table: &'a mut bool,
}

impl<'a> Dashboard<'a> {
    pub fn new(ui: &'a mut Ui, palette: &'a CategoryPalette, show_table: &'a mut bool) -> Self {
        Self {
            ui,
            palette,
            show_table,
        }
    }
}

impl LookupPresenter for Dashboard<'_> {
    type Output = ();

    fn render_lookup_result(&mut self, outcome: &LookupOutcome) {
        if let Some(report) = outcome.report() {
            self.report(report);
            return;
        }

        let message = status_message(outcome).unwrap_or_default();
        let color = match outcome.state() {
            ResultState::Unavailable | ResultState::NotFound => Some(ERROR_TEXT),
            _ => None,
        };
        self.ui.vertical_centered(|ui: &mut Ui| {
            ui.add_space(80.0);
            let mut text = RichText::new(message).heading();
            if let Some(c) = color {
                text = text.color(c);
            }
            ui.label(text);
        });
    }
}

impl Dashboard<'_> {
    fn report(&mut self, report: &CompanyReport) {
        let ui = &mut *self.ui;
        let stats = &report.statistics;
        let view = &report.view;

        // ---- Header ----
        ui.horizontal(|ui: &mut Ui| {
            ui.heading(RichText::new(&report.entity.name).strong());
            ui.label(RichText::new(format!("({})", report.entity.code)).weak());
        });
        ui.label(format!(
            "Data range: {}    latest update: {}",
            report.range, stats.latest_year
        ));
        ui.separator();

        // ---- Stat cards ----
        ui.columns(4, |cols: &mut [Ui]| {
            stat_card(&mut cols[0], "Latest index", |ui| {
                ui.label(RichText::new(format!("{}", stats.latest_index)).size(28.0).strong());
                ui.label(
                    RichText::new(format!("{} vs previous year", format_delta(stats.delta)))
                        .color(CategoryPalette::delta_color(stats.delta)),
                );
            });
            stat_card(&mut cols[1], "Average index", |ui| {
                ui.label(RichText::new(format!("{}", stats.mean_index)).size(28.0).strong());
                ui.label(RichText::new("long-run level").weak());
            });
            stat_card(&mut cols[2], "Leading technology", |ui| {
                let color = match stats.dominant {
                    DominantCategory::Category(c) => self.palette.color_for(c),
                    DominantCategory::NoClearPreference => Color32::GRAY,
                };
                ui.label(RichText::new(stats.dominant.label()).size(20.0).strong().color(color));
                ui.label(RichText::new("most mentioned").weak());
            });
            stat_card(&mut cols[3], "Technology mentions", |ui| {
                ui.label(
                    RichText::new(stats.total_tech_mentions.to_string())
                        .size(28.0)
                        .strong(),
                );
                ui.label(RichText::new(format!("in {}", stats.latest_year)).weak());
            });
        });
        ui.add_space(8.0);

        // ---- Charts ----
        ui.columns(2, |cols: &mut [Ui]| {
            cols[0].strong(format!("Transformation index trend ({})", report.range));
            plot::trend_plot(&mut cols[0], view);
            cols[1].strong(format!("Technology focus ({})", view.latest_year));
            plot::composition_plot(&mut cols[1], view, self.palette);
        });
        ui.add_space(8.0);
        ui.strong("Keyword mentions by year");
        plot::keyword_plot(ui, view, self.palette);
        ui.add_space(8.0);

        // ---- Detail table ----
        ui.horizontal(|ui: &mut Ui| {
            ui.strong("Detail");
            let label = if *self.show_table { "Collapse" } else { "Expand" };
            if ui.small_button(label).clicked() {
                *self.show_table = !*self.show_table;
            }
        });
        if *self.show_table {
            detail_table(ui, report);
        }
    }
}

fn stat_card(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(title).small().weak());
        body(ui);
    });
}

/// Newest year first.
fn detail_table(ui: &mut Ui, report: &CompanyReport) {
    let mut headers = vec!["Year", "Index"];
    headers.extend(TechCategory::ALL.iter().map(|c| c.label()));
    headers.push("Digital tech");

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(90.0), headers.len() - 1)
        .header(22.0, |mut header| {
            for title in &headers {
                header.col(|ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|mut body| {
            for rec in report.series.records().iter().rev() {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(rec.year.map(|y| y.to_string()).unwrap_or_default());
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(format!("{:.2}", rec.index)).strong());
                    });
                    for (_, n) in rec.tech.iter() {
                        row.col(|ui| {
                            ui.label(n.to_string());
                        });
                    }
                    row.col(|ui| {
                        ui.label(rec.digital_tech.to_string());
                    });
                });
            }
        });
}
