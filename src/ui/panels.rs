use eframe::egui::{self, RichText, Ui};

use crate::color::ERROR_TEXT;
use crate::data::resolve::SearchMode;
use crate::state::{AppState, QUICK_SEARCHES};

// ---------------------------------------------------------------------------
// Left side panel – search widgets
// ---------------------------------------------------------------------------

/// Render the left search panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search");
    ui.separator();

    ui.strong("Search by");
    egui::ComboBox::from_id_salt("search_mode")
        .selected_text(state.request.mode.label())
        .show_ui(ui, |ui: &mut Ui| {
            for mode in [SearchMode::Name, SearchMode::Code] {
                ui.selectable_value(&mut state.request.mode, mode, mode.label());
            }
        });
    ui.add_space(4.0);

    let response = ui.add(
        egui::TextEdit::singleline(&mut state.request.query)
            .hint_text("600000 or 浦发银行")
            .desired_width(f32::INFINITY),
    );
    let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    if ui.button("Search").clicked() || entered {
        state.submit();
    }

    ui.add_space(8.0);
    ui.label(RichText::new("Popular").weak());
    let mut picked = None;
    for (query, mode, hint) in QUICK_SEARCHES {
        if ui.link(query).on_hover_text(hint).clicked() {
            picked = Some((query, mode));
        }
    }
    if let Some((query, mode)) = picked {
        state.quick_search(query, mode);
    }

    ui.separator();
    ui.label(format!("Years shown: {}", state.range));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        match state.source.dataset() {
            Some(ds) => {
                let coverage = ds
                    .year_coverage()
                    .map(|(lo, hi)| format!(", {lo}–{hi}"))
                    .unwrap_or_default();
                ui.label(format!(
                    "{} records, {} companies{coverage}",
                    ds.len(),
                    ds.company_count()
                ));

                let report = ds.coercion();
                if !report.is_clean() {
                    let detail = report
                        .per_column()
                        .iter()
                        .map(|(col, n)| format!("{col}: {n}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    ui.separator();
                    ui.label(RichText::new(format!("{} cells defaulted", report.total())).weak())
                        .on_hover_text(detail);
                }
            }
            None => {
                ui.label(RichText::new("No dataset loaded").color(ERROR_TEXT));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(ERROR_TEXT));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open index table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
