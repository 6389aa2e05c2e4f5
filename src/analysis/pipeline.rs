use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;

use super::factor::{FactorAnalysis, FactorModel};
use super::pca::Pca;
use super::scaling::{StandardScaler, analyte_matrix};
use crate::config::AnalysisConfig;
use crate::data::impute::{ImputeReport, fill_site_means};
use crate::data::loader;
use crate::data::model::ChemistryTable;
use crate::error::AnalysisError;
use crate::report::{self, ScoreRow};

// ---------------------------------------------------------------------------
// End-to-end analysis
// ---------------------------------------------------------------------------

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The input table after imputation, in input row order.
    pub table: ChemistryTable,
    pub impute: ImputeReport,
    pub scaler: StandardScaler,
    pub pca: Pca,
    /// PCA scores (samples × components).
    pub scores: Array2<f64>,
    pub factors: FactorModel,
    /// Scores joined with Site / Season.
    pub rows: Vec<ScoreRow>,
}

/// Impute, standardize, decompose and label `table`.
pub fn analyze(
    mut table: ChemistryTable,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalysisError> {
    let impute = fill_site_means(&mut table, &config.site_column, &config.analytes, &config.sites)?;
    log::info!(
        "Imputed {} missing values from site means ({} groups without data)",
        impute.filled,
        impute.unfilled.len()
    );

    let x = analyte_matrix(&table, &config.analytes)?;
    let (scaler, z) = StandardScaler::fit_transform(&x);

    let pca = Pca::fit(&z, config.n_components)?;
    let scores = pca.transform(&z);
    log::info!(
        "PCA explained variance ratio: {:?}",
        pca.explained_variance_ratio.to_vec()
    );

    let factors =
        FactorAnalysis::with_settings(config.n_components, &config.factor_analysis).fit(&z)?;
    log::info!(
        "Factor analysis finished after {} iterations (log-likelihood {:.3})",
        factors.n_iter,
        factors.final_loglike().unwrap_or(f64::NAN)
    );

    let rows = report::merge_scores(&table, &scores, &config.site_column, &config.season_column)?;

    let unplotted = rows
        .iter()
        .filter(|r| {
            r.site
                .as_label()
                .map_or(true, |site| !config.sites.contains(&site))
        })
        .count();
    if unplotted > 0 {
        log::warn!("{unplotted} samples have a site outside the site list and are not plotted");
    }

    Ok(AnalysisOutcome {
        table,
        impute,
        scaler,
        pca,
        scores,
        factors,
        rows,
    })
}

/// Load `input`, analyze it and write the workbook to `config.output_file`.
pub fn run_file(input: &Path, config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    let table = loader::load_file(input, config.sheet.as_deref())
        .with_context(|| format!("loading {}", input.display()))?;
    let outcome = analyze(table, config).with_context(|| format!("analyzing {}", input.display()))?;
    export(&outcome, &config.output_file, config)?;
    Ok(outcome)
}

/// Write the scores and loadings of `outcome` to `path`.
pub fn export(outcome: &AnalysisOutcome, path: &Path, config: &AnalysisConfig) -> Result<()> {
    report::write_workbook(path, &outcome.rows, &outcome.factors, &config.analytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Sample;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            analytes: vec!["Analyte 1".into(), "Analyte 2".into()],
            sites: vec!["A".into(), "B".into()],
            ..AnalysisConfig::default()
        }
    }

    fn table(rows: &[(&str, Option<f64>, Option<f64>)]) -> ChemistryTable {
        let samples = rows
            .iter()
            .map(|(site, a, b)| {
                let mut s = Sample::default();
                s.set("Site", (*site).into());
                s.set("Season", "Summer".into());
                s.set("Analyte 1", (*a).into());
                s.set("Analyte 2", (*b).into());
                s
            })
            .collect();
        ChemistryTable::from_samples(
            vec!["Site".into(), "Season".into(), "Analyte 1".into(), "Analyte 2".into()],
            samples,
        )
    }

    #[test]
    fn scores_line_up_with_samples() {
        let t = table(&[
            ("A", Some(1.0), Some(4.0)),
            ("A", None, Some(3.0)),
            ("A", Some(3.0), None),
            ("B", Some(8.0), Some(1.0)),
            ("B", Some(9.0), Some(0.5)),
        ]);
        let outcome = analyze(t, &config()).unwrap();
        assert_eq!(outcome.scores.dim(), (5, 2));
        assert_eq!(outcome.rows.len(), 5);
        assert_eq!(outcome.rows[3].site.as_label().as_deref(), Some("B"));
        assert_eq!(outcome.impute.filled, 2);
        assert_eq!(outcome.factors.components.dim(), (2, 2));
    }

    #[test]
    fn all_missing_group_stops_the_run() {
        let t = table(&[
            ("A", None, Some(1.0)),
            ("A", None, Some(2.0)),
            ("B", Some(1.0), Some(3.0)),
            ("B", Some(2.0), Some(4.0)),
        ]);
        let err = analyze(t, &config()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingValue {
                row: 0,
                column: "Analyte 1".into()
            }
        );
    }

    #[test]
    fn singleton_with_missing_value_stops_the_run() {
        let t = table(&[("A", Some(1.0), Some(1.0)), ("B", None, Some(2.0))]);
        assert!(matches!(
            analyze(t, &config()),
            Err(AnalysisError::MissingValue { row: 1, .. })
        ));
    }
}
