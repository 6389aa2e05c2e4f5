use crate::error::AnalysisError;

use super::model::{CellValue, ChemistryTable};

// ---------------------------------------------------------------------------
// Per-site mean imputation
// ---------------------------------------------------------------------------

/// An (analyte, site) group that had rows to fill but no value to average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfilledGroup {
    pub analyte: String,
    pub site: String,
    pub rows: usize,
}

/// Summary of one imputation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImputeReport {
    /// Number of cells that received a site mean.
    pub filled: usize,
    /// Groups left with missing values because every value was missing.
    pub unfilled: Vec<UnfilledGroup>,
}

/// Replace missing analyte values with the mean of the same analyte at the
/// same site.
///
/// For every `(analyte, site)` pair the rows whose `site_column` equals the
/// site are selected. A group is filled only when it has more than one row
/// and at least one missing value; the fill value is the arithmetic mean of
/// the values present in that group. Present values are never touched and
/// sites absent from the table are skipped. A group whose values are all
/// missing stays missing and is listed in the returned report.
pub fn fill_site_means(
    table: &mut ChemistryTable,
    site_column: &str,
    analytes: &[String],
    sites: &[String],
) -> Result<ImputeReport, AnalysisError> {
    for column in std::iter::once(site_column).chain(analytes.iter().map(String::as_str)) {
        if !table.has_column(column) {
            return Err(AnalysisError::MissingColumn(column.to_string()));
        }
    }

    check_numeric(table, analytes)?;

    let mut report = ImputeReport::default();

    for analyte in analytes {
        for site in sites {
            let rows = table.rows_with_label(site_column, site);
            if rows.len() <= 1 {
                continue;
            }

            let mut present = Vec::with_capacity(rows.len());
            let mut missing = Vec::new();
            for &row in &rows {
                match table.samples[row].get(analyte).as_f64() {
                    Some(v) if !v.is_nan() => present.push(v),
                    _ => missing.push(row),
                }
            }

            if missing.is_empty() {
                continue;
            }

            if present.is_empty() {
                log::warn!(
                    "'{analyte}' has no values at site '{site}'; {} rows left missing",
                    missing.len()
                );
                report.unfilled.push(UnfilledGroup {
                    analyte: analyte.clone(),
                    site: site.clone(),
                    rows: missing.len(),
                });
                continue;
            }

            let mean = present.iter().sum::<f64>() / present.len() as f64;
            log::debug!(
                "'{analyte}' at '{site}': filling {} of {} rows with {mean:.4}",
                missing.len(),
                rows.len()
            );
            for row in missing {
                table.samples[row].set(analyte, CellValue::Float(mean));
                report.filled += 1;
            }
        }
    }

    if report.filled > 0 {
        table.reindex();
    }

    Ok(report)
}

/// Fail on the first analyte cell that is neither a number nor missing,
/// before any cell is rewritten.
fn check_numeric(table: &ChemistryTable, analytes: &[String]) -> Result<(), AnalysisError> {
    for (row, sample) in table.samples.iter().enumerate() {
        for analyte in analytes {
            let cell = sample.get(analyte);
            if !cell.is_null() && cell.as_f64().is_none() {
                return Err(AnalysisError::NonNumeric {
                    row,
                    column: analyte.clone(),
                    value: cell.to_string(),
                });
            }
        }
    }
    Ok(())
}
