use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HydroChemApp {
    pub state: AppState,
}

impl HydroChemApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for HydroChemApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: site legend and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: variance and loadings ----
        egui::SidePanel::right("results_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::results_panel(ui, &self.state);
            });

        // ---- Central panel: score plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::score_plot(ui, &self.state);
        });
    }
}
