/// Data layer: core types, loading, imputation and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ChemistryTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ChemistryTable│  Vec<Sample>, column index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  impute   │  per (analyte, site) mean fill
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  site / season predicates → visible rows
///   └──────────┘
/// ```

pub mod filter;
pub mod impute;
pub mod loader;
pub mod model;
