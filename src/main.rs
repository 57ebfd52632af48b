mod app;
mod color;
mod config;
mod data;
mod error;
mod insight;
mod present;
mod state;
mod ui;

use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;
use eframe::egui;

use app::DtInsightApp;
use config::Args;
use data::loader::load_file;
use data::model::DataSource;
use insight::{lookup, ResultState};
use present::{JsonPresenter, LookupPresenter, TextPresenter};
use state::AppState;

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let range = args.year_range()?;

    // A missing or broken table is not fatal: lookups report it instead.
    let source = DataSource::from(load_file(&args.data));
    if let DataSource::Unavailable(reason) = &source {
        log::error!("Dataset unavailable: {reason}");
    }

    match args.request() {
        Some(request) => {
            let outcome = lookup(&source, &request, range);
            if args.json {
                let value = JsonPresenter.render_lookup_result(&outcome)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", TextPresenter.render_lookup_result(&outcome));
            }
            Ok(if outcome.state() == ResultState::FoundWithData {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        None => {
            run_dashboard(&args, AppState::new(source, range))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_dashboard(args: &Args, state: AppState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    let font = args.font.clone();

    eframe::run_native(
        "DT-Insight – Digital Transformation Index",
        options,
        Box::new(move |cc| {
            if let Some(path) = &font {
                if let Err(e) = app::install_font(&cc.egui_ctx, path) {
                    log::warn!("{e:#}");
                }
            }
            Ok(Box::new(DtInsightApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}
