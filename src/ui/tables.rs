use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::{AnalysisOutcome, AnalysisReport};
use crate::data::filter::FilterChoice;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary view (central panel)
// ---------------------------------------------------------------------------

/// Render the summary tables for the last analysis run.
pub fn summary_view(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        empty_hint(ui);
        return;
    };

    match outcome {
        AnalysisOutcome::NoMatchingRows { filter, .. } => no_rows_banner(ui, filter),
        AnalysisOutcome::Report(report) => {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    presence_table(ui, report);
                    ui.add_space(16.0);
                    means_table(ui, report);
                    ui.add_space(16.0);
                    municipality_table(ui, state, report);
                });
        }
    }
}

pub fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Gere uma análise para ver os resultados");
    });
}

pub fn no_rows_banner(ui: &mut Ui, filter: &FilterChoice) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Nenhum dado disponível").color(Color32::YELLOW));
        ui.label(format!("Nenhum participante corresponde a {filter}."));
    });
}

pub fn no_complete_rows_banner(ui: &mut Ui) {
    ui.label(
        RichText::new("Nenhum participante possui as cinco notas; sem nota geral.")
            .color(Color32::YELLOW),
    );
}

// ---------------------------------------------------------------------------
// Individual tables
// ---------------------------------------------------------------------------

fn presence_table(ui: &mut Ui, report: &AnalysisReport) {
    ui.strong("Presença por prova");
    ui.push_id("presence_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(180.0))
            .columns(Column::auto().at_least(90.0), 5)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Prova");
                });
                header.col(|ui| {
                    ui.strong("Presentes");
                });
                header.col(|ui| {
                    ui.strong("Ausentes");
                });
                header.col(|ui| {
                    ui.strong("Eliminados");
                });
                header.col(|ui| {
                    ui.strong("Não informado");
                });
                header.col(|ui| {
                    ui.strong("Total");
                });
            })
            .body(|mut body| {
                for count in &report.presence {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(count.subject.label());
                        });
                        row.col(|ui| {
                            ui.label(count.present.to_string());
                        });
                        row.col(|ui| {
                            ui.label(count.absent.to_string());
                        });
                        row.col(|ui| {
                            ui.label(count.eliminated.to_string());
                        });
                        row.col(|ui| {
                            ui.label(count.unknown.to_string());
                        });
                        row.col(|ui| {
                            ui.label(count.total().to_string());
                        });
                    });
                }
            });
    });
}

fn means_table(ui: &mut Ui, report: &AnalysisReport) {
    ui.strong("Média por prova (participantes presentes)");
    ui.push_id("means_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(180.0))
            .columns(Column::auto().at_least(110.0), 2)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Prova");
                });
                header.col(|ui| {
                    ui.strong("Média");
                });
                header.col(|ui| {
                    ui.strong("Participantes");
                });
            })
            .body(|mut body| {
                for subject_mean in &report.subject_means {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(subject_mean.subject.label());
                        });
                        row.col(|ui| match subject_mean.mean {
                            Some(mean) => {
                                ui.label(format!("{mean:.1}"));
                            }
                            None => {
                                ui.label("—");
                            }
                        });
                        row.col(|ui| {
                            ui.label(subject_mean.takers.to_string());
                        });
                    });
                }
            });
    });
}

/// Top municipalities by mean overall score. Names come from the boundary
/// document when it is loaded; otherwise the normalized code is shown.
fn municipality_table(ui: &mut Ui, state: &AppState, report: &AnalysisReport) {
    ui.strong("Nota geral média por município");
    let Some(stats) = &report.overall else {
        no_complete_rows_banner(ui);
        return;
    };

    let mut ranked: Vec<(&String, f64, usize)> = stats
        .by_municipality
        .iter()
        .map(|(code, group)| (code, group.mean, group.count))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(20);

    ui.push_id("municipality_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(220.0))
            .columns(Column::auto().at_least(110.0), 2)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Município");
                });
                header.col(|ui| {
                    ui.strong("Média");
                });
                header.col(|ui| {
                    ui.strong("Participantes");
                });
            })
            .body(|mut body| {
                for (code, mean, count) in ranked {
                    let display = state
                        .boundaries
                        .as_ref()
                        .and_then(|doc| doc.shape(code))
                        .and_then(|shape| shape.name.clone())
                        .unwrap_or_else(|| code.clone());
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(display.clone());
                        });
                        row.col(|ui| {
                            ui.label(format!("{mean:.1}"));
                        });
                        row.col(|ui| {
                            ui.label(count.to_string());
                        });
                    });
                }
            });
    });
}
