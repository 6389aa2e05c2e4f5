/// Reporting: component scores joined back to their sample labels, and the
/// spreadsheet export.

pub mod workbook;

use ndarray::Array2;

use crate::data::model::{CellValue, ChemistryTable};
use crate::error::AnalysisError;

pub use workbook::{FACTOR_SHEET, SCORES_SHEET, write_workbook};

/// Component scores of one sample with its Site and Season labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    /// Row position in the input table.
    pub index: usize,
    pub scores: Vec<f64>,
    pub site: CellValue,
    pub season: CellValue,
}

impl ScoreRow {
    /// Scatter coordinates (first two components).
    pub fn point(&self) -> [f64; 2] {
        [
            self.scores.first().copied().unwrap_or(0.0),
            self.scores.get(1).copied().unwrap_or(0.0),
        ]
    }
}

/// Join each score row with the labels of the sample at the same position.
pub fn merge_scores(
    table: &ChemistryTable,
    scores: &Array2<f64>,
    site_column: &str,
    season_column: &str,
) -> Result<Vec<ScoreRow>, AnalysisError> {
    if scores.nrows() != table.len() {
        return Err(AnalysisError::ShapeMismatch {
            what: "component scores",
            expected: table.len(),
            actual: scores.nrows(),
        });
    }

    Ok(table
        .samples
        .iter()
        .zip(scores.rows())
        .enumerate()
        .map(|(index, (sample, row))| ScoreRow {
            index,
            scores: row.to_vec(),
            site: sample.get(site_column).clone(),
            season: sample.get(season_column).clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Sample;
    use ndarray::array;

    fn table() -> ChemistryTable {
        let samples = [("A", "Spring"), ("B", "Fall")]
            .iter()
            .map(|(site, season)| {
                let mut s = Sample::default();
                s.set("Site", (*site).into());
                s.set("Season", (*season).into());
                s
            })
            .collect();
        ChemistryTable::from_samples(vec!["Site".into(), "Season".into()], samples)
    }

    #[test]
    fn labels_follow_row_order() {
        let rows = merge_scores(&table(), &array![[1.0, 2.0], [3.0, 4.0]], "Site", "Season").unwrap();
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].site, CellValue::from("B"));
        assert_eq!(rows[1].season, CellValue::from("Fall"));
        assert_eq!(rows[1].point(), [3.0, 4.0]);
    }

    #[test]
    fn row_count_must_match() {
        let err = merge_scores(&table(), &array![[1.0, 2.0]], "Site", "Season").unwrap_err();
        assert!(matches!(err, AnalysisError::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn missing_season_column_gives_nulls() {
        let rows = merge_scores(&table(), &array![[0.0, 0.0], [0.0, 0.0]], "Site", "Month").unwrap();
        assert!(rows.iter().all(|r| r.season.is_null()));
    }
}
