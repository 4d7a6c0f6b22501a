use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::AnalysisOutcome;
use crate::data::categories::{self, Dimension};
use crate::data::loader::EXAM_YEARS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – analysis controls
// ---------------------------------------------------------------------------

/// Render the control panel: year, filter dimension, filter value, trigger.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Análise");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Ano da prova");
            for year in EXAM_YEARS {
                ui.radio_value(&mut state.year, year, year.to_string());
            }
            ui.separator();

            ui.strong("Variável de análise");
            let selected_text = state.dimension.map(Dimension::label).unwrap_or("Nenhum");
            egui::ComboBox::from_id_salt("dimension")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.dimension.is_none(), "Nenhum")
                        .clicked()
                    {
                        state.set_dimension(None);
                    }
                    for dimension in Dimension::ALL {
                        if ui
                            .selectable_label(state.dimension == Some(dimension), dimension.label())
                            .clicked()
                        {
                            state.set_dimension(Some(dimension));
                        }
                    }
                });

            if let Some(dimension) = state.dimension {
                ui.add_space(4.0);
                ui.strong("Valor");
                let current = state.value.clone().unwrap_or_default();
                egui::ComboBox::from_id_salt("dimension_value")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for label in categories::labels(dimension) {
                            if ui.selectable_label(current == label, label).clicked() {
                                state.value = Some(label.to_string());
                            }
                        }
                    });
            }

            ui.add_space(8.0);
            if ui.button("Gerar análise").clicked() {
                state.generate();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Dados: {}", state.data_dir.display()));
        ui.separator();

        match &state.outcome {
            Some(AnalysisOutcome::Report(report)) => {
                ui.label(format!(
                    "{} – {} participantes ({})",
                    report.year, report.total_rows, report.filter
                ));
            }
            Some(AnalysisOutcome::NoMatchingRows { year, filter }) => {
                ui.label(
                    RichText::new(format!("{year}: nenhum participante para {filter}"))
                        .color(Color32::YELLOW),
                );
            }
            None => {
                ui.label("Escolha ano e filtro, depois \"Gerar análise\"");
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Choose the ENEM data folder")
        .pick_folder();

    if let Some(dir) = folder {
        log::info!("selected data folder {}", dir.display());
        state.set_data_dir(dir);
    }
}
