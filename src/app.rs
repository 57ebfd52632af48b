use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use crate::state::AppState;
use crate::ui::{dashboard::Dashboard, panels};
use crate::present::LookupPresenter;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DtInsightApp {
    pub state: AppState,
}

impl DtInsightApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DtInsightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: search ----
        egui::SidePanel::left("search_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: lookup result ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let state = &mut self.state;
                    Dashboard::new(ui, &state.palette, &mut state.show_table)
                        .render_lookup_result(&state.outcome);
                });
        });
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Add a font file as fallback for both families, so CJK names render.
pub fn install_font(ctx: &egui::Context, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Installed font {}", path.display());
    Ok(())
}
