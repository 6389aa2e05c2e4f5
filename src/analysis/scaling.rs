//! Analyte matrix extraction and standardization

use ndarray::{Array1, Array2, Axis};

use crate::data::model::{CellValue, ChemistryTable};
use crate::error::AnalysisError;

/// Columns whose standard deviation is below this are only centered.
const MIN_SCALE: f64 = 1e-12;

/// Select `analytes` as a numeric matrix (rows = samples, columns = analytes).
///
/// Every cell must hold a number; a missing value left over from imputation
/// is reported with its row and column.
pub fn analyte_matrix(
    table: &ChemistryTable,
    analytes: &[String],
) -> Result<Array2<f64>, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::EmptyTable);
    }
    if let Some(missing) = analytes.iter().find(|a| !table.has_column(a)) {
        return Err(AnalysisError::MissingColumn(missing.clone()));
    }

    let mut x = Array2::zeros((table.len(), analytes.len()));
    for (row, sample) in table.samples.iter().enumerate() {
        for (col, analyte) in analytes.iter().enumerate() {
            x[[row, col]] = match sample.get(analyte) {
                CellValue::Null => {
                    return Err(AnalysisError::MissingValue {
                        row,
                        column: analyte.clone(),
                    })
                }
                cell => match cell.as_f64() {
                    Some(v) if v.is_nan() => {
                        return Err(AnalysisError::MissingValue {
                            row,
                            column: analyte.clone(),
                        })
                    }
                    Some(v) => v,
                    None => {
                        return Err(AnalysisError::NonNumeric {
                            row,
                            column: analyte.clone(),
                            value: cell.to_string(),
                        })
                    }
                },
            };
        }
    }
    Ok(x)
}

/// Per-column standardization to zero mean and unit (population) variance.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    /// Population standard deviation, or 1 for constant columns.
    pub scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Self {
        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > MIN_SCALE { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.scale
    }

    pub fn fit_transform(x: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(x);
        let z = scaler.transform(x);
        (scaler, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Sample;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn standardized_columns_have_zero_mean_unit_std() {
        let x = array![[1.0, 10.0], [2.0, 30.0], [3.0, 20.0], [5.0, 60.0], [5.0, 15.0]];
        let (_, z) = StandardScaler::fit_transform(&x);
        for col in z.columns() {
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_column_is_centered_only() {
        let x = array![[4.0, 1.0], [4.0, 2.0], [4.0, 3.0]];
        let (scaler, z) = StandardScaler::fit_transform(&x);
        assert_eq!(scaler.scale[0], 1.0);
        assert!(z.column(0).iter().all(|&v| v == 0.0));
    }

    fn table(values: &[Option<f64>]) -> ChemistryTable {
        let samples = values
            .iter()
            .map(|v| {
                let mut s = Sample::default();
                s.set("Analyte 1", (*v).into());
                s
            })
            .collect();
        ChemistryTable::from_samples(vec!["Analyte 1".into()], samples)
    }

    #[test]
    fn matrix_rejects_missing_values() {
        let err = analyte_matrix(&table(&[Some(1.0), None]), &["Analyte 1".into()]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingValue {
                row: 1,
                column: "Analyte 1".into()
            }
        );
    }

    #[test]
    fn matrix_shape_follows_rows_and_analytes() {
        let x = analyte_matrix(&table(&[Some(1.0), Some(2.0), Some(3.0)]), &["Analyte 1".into()])
            .unwrap();
        assert_eq!(x.dim(), (3, 1));
        assert_eq!(x[[2, 0]], 3.0);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(
            analyte_matrix(&table(&[]), &["Analyte 1".into()]).unwrap_err(),
            AnalysisError::EmptyTable
        );
    }
}
