use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use hydrochem_pca::data::model::CellValue;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – site legend and filters
// ---------------------------------------------------------------------------

/// Render the left panel: one toggle per configured site in legend order,
/// then the season filter.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sites");
    ui.separator();

    let Some(outcome) = &state.outcome else {
        ui.label("No dataset loaded.");
        return;
    };

    let site_col = state.config.site_column.clone();
    let season_col = state.config.season_column.clone();
    let present_sites = outcome.table.unique_values.get(&site_col).cloned().unwrap_or_default();
    let seasons = outcome.table.unique_values.get(&season_col).cloned().unwrap_or_default();
    let styles = state.styles.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(&site_col);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(&site_col);
                }
            });

            for style in &styles {
                let value = CellValue::from(style.label.as_str());
                if !present_sites.contains(&value) {
                    ui.label(RichText::new(&style.label).weak());
                    continue;
                }
                let marker = if style.filled { "●" } else { "○" };
                let text = RichText::new(format!("{marker} {}", style.label)).color(style.edge);
                let mut checked = state.is_selected(&site_col, &value);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(&site_col, &value);
                }
            }

            ui.separator();

            let header_text = format!("{season_col}  ({})", seasons.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("season_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for season in &seasons {
                        let mut checked = state.is_selected(&season_col, season);
                        if ui.checkbox(&mut checked, season.to_string()).changed() {
                            state.toggle_filter_value(&season_col, season);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Right side panel – explained variance and factor loadings
// ---------------------------------------------------------------------------

pub fn results_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Components");
    ui.separator();

    let Some(outcome) = &state.outcome else {
        return;
    };

    for (k, ratio) in outcome.pca.explained_variance_ratio.iter().enumerate() {
        ui.label(format!("PC{}: {:.1}% of variance", k + 1, ratio * 100.0));
    }
    if !outcome.impute.unfilled.is_empty() {
        ui.label(
            RichText::new(format!(
                "{} site/analyte groups had no values to average",
                outcome.impute.unfilled.len()
            ))
            .color(Color32::YELLOW),
        );
    }

    ui.add_space(8.0);
    ui.strong("Factor loadings");

    let loadings = &outcome.factors.components;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .columns(Column::auto(), loadings.nrows())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Analyte");
            });
            for k in 0..loadings.nrows() {
                header.col(|ui| {
                    ui.strong(format!("F{}", k + 1));
                });
            }
        })
        .body(|mut body| {
            for (j, analyte) in state.config.analytes.iter().enumerate() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(analyte);
                    });
                    for k in 0..loadings.nrows() {
                        row.col(|ui| {
                            ui.label(format!("{:+.3}", loadings[[k, j]]));
                        });
                    }
                });
            }
        });
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
            if ui
                .add_enabled(state.outcome.is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(outcome), Some(source)) = (&state.outcome, &state.source) {
            ui.label(format!(
                "{}: {} samples, {} visible",
                source.display(),
                outcome.rows.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sampling data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.run(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export results")
        .set_file_name(state.config.output_file.to_string_lossy())
        .add_filter("Excel workbook", &["xlsx"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
