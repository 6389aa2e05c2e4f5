//! Principal component and factor analysis of water-chemistry samples.
//!
//! The pipeline loads a sampling table, fills missing analyte values with
//! per-site means, standardizes the analytes, computes PCA scores and factor
//! loadings, and exports both to a workbook. The `hydrochem-pca` binary wraps
//! it in a viewer that plots the scores by site.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod sites;

pub use error::AnalysisError;
