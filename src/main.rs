mod app;
mod state;
mod ui;

use std::path::Path;

use app::HydroChemApp;
use eframe::egui;
use hydrochem_pca::config::{AnalysisConfig, CONFIG_FILE};
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
        log::error!("{e:#}; using default configuration");
        AnalysisConfig::default()
    });

    let mut state = AppState::new(config);
    let input = state.config.input_file.clone();
    if input.exists() {
        state.run(&input);
    } else {
        log::info!("{} not found; waiting for File → Open…", input.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Water Chemistry PCA",
        options,
        Box::new(|_cc| Ok(Box::new(HydroChemApp::new(state)))),
    )
}
