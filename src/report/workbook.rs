use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use super::ScoreRow;
use crate::analysis::factor::FactorModel;
use crate::data::model::CellValue;

pub const SCORES_SHEET: &str = "PCA Values";
pub const FACTOR_SHEET: &str = "Factor Analysis";

// ---------------------------------------------------------------------------
// Workbook export
// ---------------------------------------------------------------------------

/// Write the score table and the factor loadings to an xlsx workbook.
///
/// Both sheets start with an unnamed index column. Missing and non-finite
/// values are left as empty cells.
pub fn write_workbook(
    path: &Path,
    rows: &[ScoreRow],
    factors: &FactorModel,
    analytes: &[String],
) -> Result<()> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(scores_sheet(rows).context("building score sheet")?);
    workbook.push_worksheet(factor_sheet(factors, analytes).context("building factor sheet")?);
    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!(
        "Wrote {} score rows and {} loading rows to {}",
        rows.len(),
        factors.components.nrows(),
        path.display()
    );
    Ok(())
}

fn scores_sheet(rows: &[ScoreRow]) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(SCORES_SHEET)?;

    let n_components = rows.first().map_or(2, |r| r.scores.len());
    let mut col = 1;
    for k in 1..=n_components {
        sheet.write_string(0, col, format!("principal component {k}"))?;
        col += 1;
    }
    sheet.write_string(0, col, "Site")?;
    sheet.write_string(0, col + 1, "Season")?;

    for row in rows {
        let r = row_num(row.index + 1);
        sheet.write_number(r, 0, row.index as f64)?;
        for (k, score) in row.scores.iter().enumerate() {
            write_number(&mut sheet, r, col_num(k + 1), *score)?;
        }
        write_cell(&mut sheet, r, col, &row.site)?;
        write_cell(&mut sheet, r, col + 1, &row.season)?;
    }
    Ok(sheet)
}

fn factor_sheet(factors: &FactorModel, analytes: &[String]) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(FACTOR_SHEET)?;

    sheet.write_string(0, 1, "Principal Components")?;
    for (j, analyte) in analytes.iter().enumerate() {
        sheet.write_string(0, col_num(j + 2), analyte)?;
    }

    for (k, loadings) in factors.components.rows().into_iter().enumerate() {
        let r = row_num(k + 1);
        sheet.write_number(r, 0, k as f64)?;
        sheet.write_number(r, 1, (k + 1) as f64)?;
        for (j, w) in loadings.iter().enumerate() {
            write_number(&mut sheet, r, col_num(j + 2), *w)?;
        }
    }
    Ok(sheet)
}

fn write_number(sheet: &mut Worksheet, row: u32, col: u16, value: f64) -> Result<(), XlsxError> {
    if value.is_finite() {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<(), XlsxError> {
    match value {
        CellValue::String(s) | CellValue::Date(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => write_number(sheet, row, col, *f)?,
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Null => {}
    }
    Ok(())
}

// Out-of-range positions saturate and are rejected by the writer.
fn row_num(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

fn col_num(i: usize) -> u16 {
    u16::try_from(i).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use ndarray::{Array1, array};

    fn model() -> FactorModel {
        FactorModel {
            components: array![[0.9, -0.2], [0.1, f64::NAN]],
            noise_variance: Array1::ones(2),
            mean: Array1::zeros(2),
            loglike: vec![-10.0],
            n_iter: 1,
            converged: true,
        }
    }

    #[test]
    fn workbook_has_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let rows = vec![
            ScoreRow {
                index: 0,
                scores: vec![1.5, -0.5],
                site: "WShed1_SW".into(),
                season: "Summer".into(),
            },
            ScoreRow {
                index: 1,
                scores: vec![-1.5, 0.5],
                site: "Precipitation".into(),
                season: CellValue::Null,
            },
        ];
        let analytes = vec!["Ca".to_string(), "Mg".to_string()];
        write_workbook(&path, &rows, &model(), &analytes).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), vec![SCORES_SHEET, FACTOR_SHEET]);

        let scores = book.worksheet_range(SCORES_SHEET).unwrap();
        assert_eq!(scores.height(), 3);
        assert_eq!(scores.get((0, 1)), Some(&Data::String("principal component 1".into())));
        assert_eq!(scores.get((1, 3)), Some(&Data::String("WShed1_SW".into())));
        assert_eq!(scores.get((2, 1)), Some(&Data::Float(-1.5)));

        let factors = book.worksheet_range(FACTOR_SHEET).unwrap();
        assert_eq!(factors.height(), 3);
        assert_eq!(factors.get((0, 3)), Some(&Data::String("Mg".into())));
        assert_eq!(factors.get((2, 1)), Some(&Data::Float(2.0)));
        assert!(matches!(factors.get((2, 3)), None | Some(Data::Empty)));
    }
}
