use eframe::egui;

use crate::state::{AppState, ViewTab};
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EnemDashApp {
    pub state: AppState,
}

impl Default for EnemDashApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl eframe::App for EnemDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu / status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: analysis controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: summary / charts / map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.state.view, ViewTab::Summary, "Resumo");
                ui.selectable_value(&mut self.state.view, ViewTab::Charts, "Gráficos");
                ui.selectable_value(&mut self.state.view, ViewTab::Map, "Mapa");
            });
            ui.separator();
            match self.state.view {
                ViewTab::Summary => tables::summary_view(ui, &self.state),
                ViewTab::Charts => plot::charts_view(ui, &self.state),
                ViewTab::Map => plot::map_view(ui, &self.state),
            }
        });
    }
}
