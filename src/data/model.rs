use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the sampling table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as it comes out of a spreadsheet.
/// Label columns are collected into `BTreeSet`s for the filters, hence `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

impl CellValue {
    /// Sort group: missing cells first, then flags, numbers and text.
    fn group(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) | CellValue::Float(_) => 2,
            CellValue::String(_) | CellValue::Date(_) => 3,
        }
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numbers compare by value across `Integer` and `Float`, so a site coded
/// `3` sorts between `2.5` and `4`. Dates sort with the other labels.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        self.group().cmp(&other.group()).then_with(|| match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a) | Date(a), String(b) | Date(b)) => a
                .cmp(b)
                .then_with(|| matches!(self, Date(_)).cmp(&matches!(other, Date(_)))),
            (Integer(_) | Float(_), Integer(_) | Float(_)) => {
                let (a, b) = (self.as_f64().unwrap_or(0.0), other.as_f64().unwrap_or(0.0));
                a.total_cmp(&b)
                    .then_with(|| matches!(self, Float(_)).cmp(&matches!(other, Float(_))))
            }
            _ => Ordering::Equal,
        })
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Date(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => f.write_str("(missing)"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(v)
        }
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(CellValue::Null, CellValue::from)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    /// Interpret the value as an `f64` measurement.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form of a label cell; `None` for nulls.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample – one row of the sampling table
// ---------------------------------------------------------------------------

/// A single water sample: one site on one date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    /// column_name → value, including Site, Season and every analyte.
    pub cells: BTreeMap<String, CellValue>,
}

impl Sample {
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Null)
    }

    pub fn set(&mut self, column: &str, value: CellValue) {
        self.cells.insert(column.to_string(), value);
    }

    /// Whether this sample's `column` holds the label `label`.
    pub fn has_label(&self, column: &str, label: &str) -> bool {
        match self.cells.get(column) {
            Some(CellValue::String(s)) => s == label,
            Some(v @ (CellValue::Integer(_) | CellValue::Float(_) | CellValue::Bool(_))) => {
                v.to_string() == label
            }
            Some(CellValue::Date(d)) => d == label,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ChemistryTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. Row order is the file order and every pipeline
/// stage preserves it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChemistryTable {
    pub samples: Vec<Sample>,
    /// Column names in header order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl ChemistryTable {
    /// Build the column index from loaded samples. `header` fixes the column
    /// order; columns that only appear in the samples are appended.
    pub fn from_samples(header: Vec<String>, samples: Vec<Sample>) -> Self {
        let mut column_names = header;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for sample in &samples {
            for (col, val) in &sample.cells {
                if !column_names.iter().any(|c| c == col) {
                    column_names.push(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }

        ChemistryTable {
            samples,
            column_names,
            unique_values,
        }
    }

    /// Recompute `unique_values` after cells were rewritten in place.
    pub fn reindex(&mut self) {
        let samples = std::mem::take(&mut self.samples);
        let header = std::mem::take(&mut self.column_names);
        *self = ChemistryTable::from_samples(header, samples);
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Row indices whose `column` equals `label`, in row order.
    pub fn rows_with_label(&self, column: &str, label: &str) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_label(column, label))
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(site: &str, value: Option<f64>) -> Sample {
        let mut s = Sample::default();
        s.set("Site", site.into());
        s.set("Analyte 1", value.into());
        s
    }

    #[test]
    fn header_order_is_kept() {
        let header = vec!["Site".to_string(), "Analyte 1".to_string()];
        let table = ChemistryTable::from_samples(header, vec![sample("A", Some(1.0))]);
        assert_eq!(table.column_names, vec!["Site", "Analyte 1"]);
        assert_eq!(table.unique_values["Site"].len(), 1);
    }

    #[test]
    fn nan_becomes_null() {
        assert_eq!(CellValue::from(f64::NAN), CellValue::Null);
        assert_eq!(CellValue::from(None), CellValue::Null);
        assert_eq!(CellValue::from(2.5).as_f64(), Some(2.5));
    }

    #[test]
    fn rows_with_label_preserves_order() {
        let table = ChemistryTable::from_samples(
            vec![],
            vec![
                sample("A", Some(1.0)),
                sample("B", None),
                sample("A", None),
            ],
        );
        assert_eq!(table.rows_with_label("Site", "A"), vec![0, 2]);
        assert!(table.rows_with_label("Site", "Z").is_empty());
    }

    #[test]
    fn missing_sorts_first_and_numbers_by_value() {
        let mut values = vec![
            CellValue::from("Summer"),
            CellValue::Float(2.5),
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::Integer(2),
            CellValue::Date("2018-01-10".into()),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Integer(2),
                CellValue::Float(2.5),
                CellValue::Integer(3),
                CellValue::Date("2018-01-10".into()),
                CellValue::from("Summer"),
            ]
        );
        assert_ne!(CellValue::from("x").cmp(&CellValue::Date("x".into())), Ordering::Equal);
        assert_eq!(CellValue::Null.to_string(), "(missing)");
    }

    #[test]
    fn integer_labels_match_their_text() {
        let mut s = Sample::default();
        s.set("Site", CellValue::Integer(7));
        assert!(s.has_label("Site", "7"));
        assert!(!s.has_label("Season", "7"));
    }
}
