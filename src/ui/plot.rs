use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{CategoryPalette, INDEX_LINE};
use crate::data::model::TechCategory;
use crate::insight::view::ViewModel;

// ---------------------------------------------------------------------------
// Index trend (line)
// ---------------------------------------------------------------------------

/// Transformation index per year.
pub fn trend_plot(ui: &mut Ui, view: &ViewModel) {
    let points: Vec<[f64; 2]> = view
        .years
        .iter()
        .zip(&view.indices)
        .map(|(&year, &index)| [year as f64, index])
        .collect();

    Plot::new("trend_plot")
        .height(320.0)
        .x_axis_label("Year")
        .y_axis_label("Index (0-100)")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Transformation index")
                    .color(INDEX_LINE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(3.5)
                    .color(INDEX_LINE),
            );
        });
}

// ---------------------------------------------------------------------------
// Latest-year composition (horizontal bars)
// ---------------------------------------------------------------------------

/// One bar per category for the latest year.
pub fn composition_plot(ui: &mut Ui, view: &ViewModel, palette: &CategoryPalette) {
    let bars: Vec<Bar> = TechCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, &category)| {
            Bar::new(i as f64, view.latest_breakdown.get(category) as f64)
                .name(category.label())
                .fill(palette.color_for(category))
                .width(0.7)
        })
        .collect();

    Plot::new("composition_plot")
        .height(320.0)
        .include_x(0.0)
        .allow_scroll(false)
        .allow_drag(false)
        .y_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            TechCategory::ALL
                .get(i as usize)
                .map(|c| c.label().to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Keyword evolution (stacked bars)
// ---------------------------------------------------------------------------

/// Category counts per year, stacked in precedence order.
pub fn keyword_plot(ui: &mut Ui, view: &ViewModel, palette: &CategoryPalette) {
    let mut charts: Vec<BarChart> = Vec::with_capacity(TechCategory::ALL.len());
    for category in TechCategory::ALL {
        let bars: Vec<Bar> = view
            .years
            .iter()
            .zip(view.breakdown.get(category))
            .map(|(&year, &n)| Bar::new(year as f64, n as f64).width(0.6))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(category.label())
            .color(palette.color_for(category))
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("keyword_plot")
        .height(280.0)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Mentions")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
