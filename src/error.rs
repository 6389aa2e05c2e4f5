use thiserror::Error;

/// Failures of the analysis pipeline itself.
///
/// File and format problems are reported through `anyhow` at the loader and
/// exporter boundaries; this enum covers violated preconditions on the data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("row {row}: value '{value}' in column '{column}' is not numeric")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: missing value in column '{column}' could not be imputed")]
    MissingValue { row: usize, column: String },

    #[error("dataset contains no rows")]
    EmptyTable,

    #[error("{what}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid number of components: {0}")]
    InvalidComponents(usize),
}
