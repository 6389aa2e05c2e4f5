/// Analysis layer: standardization, PCA, factor analysis, and the pipeline
/// that chains them after imputation.

pub mod factor;
pub mod pca;
pub mod pipeline;
pub mod scaling;

pub use pipeline::{AnalysisOutcome, analyze, export, run_file};
