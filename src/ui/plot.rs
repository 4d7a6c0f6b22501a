use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Plot, PlotPoints, Polygon};

use crate::analysis::{AnalysisOutcome, AnalysisReport, OverallStats};
use crate::color::{generate_palette, ScoreScale};
use crate::state::AppState;
use crate::ui::tables;

// ---------------------------------------------------------------------------
// Charts view (central panel)
// ---------------------------------------------------------------------------

/// Render the bar and box charts for the last analysis run.
pub fn charts_view(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        tables::empty_hint(ui);
        return;
    };

    match outcome {
        AnalysisOutcome::NoMatchingRows { filter, .. } => tables::no_rows_banner(ui, filter),
        AnalysisOutcome::Report(report) => {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    subject_means_chart(ui, report);
                    ui.add_space(16.0);
                    match &report.overall {
                        Some(stats) => {
                            overall_box_chart(ui, stats);
                            ui.add_space(16.0);
                            age_group_chart(ui, stats);
                        }
                        None => tables::no_complete_rows_banner(ui),
                    }
                });
        }
    }
}

fn subject_means_chart(ui: &mut Ui, report: &AnalysisReport) {
    ui.strong("Média por prova (participantes presentes)");
    let palette = generate_palette(report.subject_means.len());
    let bars: Vec<Bar> = report
        .subject_means
        .iter()
        .enumerate()
        .filter_map(|(i, subject_mean)| {
            subject_mean.mean.map(|mean| {
                Bar::new(i as f64, mean)
                    .name(subject_mean.subject.label())
                    .fill(palette[i])
                    .width(0.6)
            })
        })
        .collect();

    Plot::new("subject_means_chart")
        .height(240.0)
        .y_axis_label("Média")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn overall_box_chart(ui: &mut Ui, stats: &OverallStats) {
    ui.strong("Distribuição da nota geral");
    let mut sorted = stats.scores.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let spread = BoxSpread::new(
        sorted[0],
        percentile(&sorted, 0.25),
        percentile(&sorted, 0.5),
        percentile(&sorted, 0.75),
        sorted[sorted.len() - 1],
    );
    let elem = BoxElem::new(0.5, spread)
        .name("Nota geral")
        .fill(Color32::LIGHT_BLUE);

    Plot::new("overall_box_chart")
        .height(200.0)
        .y_axis_label("Nota")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]));
        });
}

fn age_group_chart(ui: &mut Ui, stats: &OverallStats) {
    ui.strong("Nota geral média por faixa etária");
    let palette = generate_palette(stats.by_age_group.len());
    let bars: Vec<Bar> = stats
        .by_age_group
        .iter()
        .enumerate()
        .map(|(i, group)| {
            Bar::new(i as f64, group.mean)
                .name(group.label)
                .fill(palette[i])
                .width(0.6)
        })
        .collect();

    Plot::new("age_group_chart")
        .height(240.0)
        .y_axis_label("Média")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Linear-interpolated percentile over a sorted, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

// ---------------------------------------------------------------------------
// Choropleth map view (central panel)
// ---------------------------------------------------------------------------

/// Render mean overall score by municipality over the boundary polygons.
pub fn map_view(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        tables::empty_hint(ui);
        return;
    };
    let report = match outcome {
        AnalysisOutcome::NoMatchingRows { filter, .. } => {
            tables::no_rows_banner(ui, filter);
            return;
        }
        AnalysisOutcome::Report(report) => report,
    };
    let Some(stats) = &report.overall else {
        tables::no_complete_rows_banner(ui);
        return;
    };
    let Some(boundaries) = &state.boundaries else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Coloque municipios.geojson na pasta de dados para ver o mapa");
        });
        return;
    };
    if boundaries.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("O documento de limites não contém municípios");
        });
        return;
    }

    let Some(scale) = ScoreScale::from_values(stats.by_municipality.values().map(|g| &g.mean))
    else {
        tables::no_complete_rows_banner(ui);
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Nota geral média:");
        ui.colored_label(scale.color_for(scale.min()), format!("{:.0}", scale.min()));
        ui.label("→");
        ui.colored_label(scale.color_for(scale.max()), format!("{:.0}", scale.max()));
    });

    let no_data_fill = Color32::from_gray(70);
    let outline = Stroke::new(0.5, Color32::from_gray(120));

    Plot::new("choropleth_map")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for shape in &boundaries.shapes {
                let group = stats.by_municipality.get(&shape.code);
                let fill = group
                    .map(|g| scale.color_for(g.mean))
                    .unwrap_or(no_data_fill);
                let hover = match (group, &shape.name) {
                    (Some(g), Some(name)) => format!("{name}: {:.1}", g.mean),
                    (Some(g), None) => format!("{}: {:.1}", shape.code, g.mean),
                    (None, Some(name)) => format!("{name}: sem dados"),
                    (None, None) => format!("{}: sem dados", shape.code),
                };

                for ring in &shape.rings {
                    let points: PlotPoints =
                        ring.iter().map(|&[lon, lat]| [lon, lat]).collect();
                    plot_ui.polygon(
                        Polygon::new(points)
                            .fill_color(fill)
                            .stroke(outline)
                            .name(&hover),
                    );
                }
            }
        });
}
