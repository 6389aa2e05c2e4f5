use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use hydrochem_pca::color::PointStyle;
use hydrochem_pca::report::ScoreRow;
use hydrochem_pca::sites::Marker;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Score plot (central panel)
// ---------------------------------------------------------------------------

const MARKER_RADIUS: f32 = 5.0;

fn marker_shape(marker: Marker) -> MarkerShape {
    match marker {
        Marker::Circle => MarkerShape::Circle,
        Marker::Star => MarkerShape::Asterisk,
        Marker::Plus => MarkerShape::Plus,
        Marker::Triangle => MarkerShape::Up,
        Marker::Square => MarkerShape::Square,
    }
}

/// Points of the visible rows grouped by site, in `styles` order. Sites
/// with no visible rows are skipped.
fn site_series<'a>(
    styles: &'a [PointStyle],
    rows: &[ScoreRow],
    visible: &[usize],
) -> Vec<(&'a PointStyle, Vec<[f64; 2]>)> {
    styles
        .iter()
        .filter_map(|style| {
            let coords: Vec<[f64; 2]> = visible
                .iter()
                .map(|&idx| &rows[idx])
                .filter(|row| row.site.as_label().as_deref() == Some(style.label.as_str()))
                .map(|row| row.point())
                .collect();
            (!coords.is_empty()).then_some((style, coords))
        })
        .collect()
}

/// Render PC1 against PC2, one point series per site. Series are drawn in
/// site order so later sites sit on top, and the legend keeps that order.
pub fn score_plot(ui: &mut Ui, state: &AppState) {
    let outcome = match &state.outcome {
        Some(o) => o,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a sampling table to compute components  (File → Open…)");
            });
            return;
        }
    };

    let series = site_series(&state.styles, &outcome.rows, &state.visible_indices);

    Plot::new("score_plot")
        .legend(Legend::default().follow_insertion_order(true))
        .x_axis_label("Principal Component 1")
        .y_axis_label("Principal Component 2")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (style, coords) in series {
                let points = Points::new(PlotPoints::from(coords))
                    .name(&style.label)
                    .color(style.edge)
                    .filled(style.filled)
                    .shape(marker_shape(style.marker))
                    .radius(MARKER_RADIUS);

                plot_ui.points(points);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrochem_pca::color::site_styles;
    use hydrochem_pca::data::model::CellValue;

    fn row(index: usize, site: &str) -> ScoreRow {
        ScoreRow {
            index,
            scores: vec![index as f64, -(index as f64)],
            site: site.into(),
            season: CellValue::Null,
        }
    }

    #[test]
    fn series_follow_site_order_not_alphabetical() {
        let sites: Vec<String> = ["WShed1_SW", "StreamSite_1", "Precipitation"]
            .map(String::from)
            .to_vec();
        let styles = site_styles(&sites);
        let rows = vec![
            row(0, "Precipitation"),
            row(1, "WShed1_SW"),
            row(2, "StreamSite_1"),
            row(3, "Precipitation"),
        ];

        let series = site_series(&styles, &rows, &[0, 1, 2, 3]);
        let labels: Vec<&str> = series.iter().map(|(s, _)| s.label.as_str()).collect();
        assert_eq!(labels, vec!["WShed1_SW", "StreamSite_1", "Precipitation"]);
        assert_eq!(series[2].1, vec![[0.0, -0.0], [3.0, -3.0]]);
    }

    #[test]
    fn hidden_and_unlisted_sites_are_skipped() {
        let sites: Vec<String> = ["WShed1_SW", "Precipitation"].map(String::from).to_vec();
        let styles = site_styles(&sites);
        let rows = vec![row(0, "WShed1_SW"), row(1, "Precipitation"), row(2, "Elsewhere")];

        let series = site_series(&styles, &rows, &[1, 2]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].0.label, "Precipitation");
    }
}
