use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hydrochem_pca::analysis::{self, AnalysisOutcome};
use hydrochem_pca::color::{PointStyle, site_styles};
use hydrochem_pca::config::AnalysisConfig;
use hydrochem_pca::data::filter::{FilterState, filtered_indices, init_filter_state};
use hydrochem_pca::data::model::CellValue;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,

    /// File the current results were computed from.
    pub source: Option<PathBuf>,

    /// Results of the last successful run.
    pub outcome: Option<AnalysisOutcome>,

    /// Site / Season selections.
    pub filters: FilterState,

    /// Indices of samples passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Plot style per configured site, in draw order.
    pub styles: Vec<PointStyle>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        let styles = site_styles(&config.sites);
        Self {
            config,
            source: None,
            outcome: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            styles,
            status_message: None,
        }
    }

    /// Run the full pipeline on `path` and export the workbook.
    pub fn run(&mut self, path: &Path) {
        match analysis::run_file(path, &self.config) {
            Ok(outcome) => {
                self.source = Some(path.to_path_buf());
                self.set_outcome(outcome);
                self.status_message = Some(format!(
                    "Results written to {}",
                    self.config.output_file.display()
                ));
            }
            Err(e) => {
                log::error!("Analysis failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Write the current results to another workbook.
    pub fn export_to(&mut self, path: &Path) {
        let Some(outcome) = &self.outcome else {
            return;
        };
        self.status_message = Some(match analysis::export(outcome, path, &self.config) {
            Ok(()) => format!("Results written to {}", path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }

    /// Ingest new results and reset filters to show everything.
    pub fn set_outcome(&mut self, outcome: AnalysisOutcome) {
        self.filters = init_filter_state(
            &outcome.table,
            &[
                self.config.site_column.as_str(),
                self.config.season_column.as_str(),
            ],
        );
        self.visible_indices = (0..outcome.rows.len()).collect();
        self.outcome = Some(outcome);
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(outcome) = &self.outcome {
            self.visible_indices = filtered_indices(&outcome.table, &self.filters);
        }
    }

    /// Toggle a single label in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select every label of a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(all) = self
            .outcome
            .as_ref()
            .and_then(|o| o.table.unique_values.get(column))
        {
            self.filters.insert(column.to_string(), all.clone());
            self.refilter();
        }
    }

    /// Deselect every label of a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }

    pub fn is_selected(&self, column: &str, value: &CellValue) -> bool {
        self.filters
            .get(column)
            .map_or(true, |selected| selected.contains(value))
    }
}
