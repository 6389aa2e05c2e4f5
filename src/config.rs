use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::sites::SITE_STYLES;

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "hydrochem_pca.toml";

/// Number of analytes measured per sample.
pub const ANALYTE_COUNT: usize = 10;

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Which orthogonal rotation to apply to the factor loadings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    Varimax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorSettings {
    pub max_iter: usize,
    /// Stop once the log-likelihood gains less than this per iteration.
    pub tol: f64,
    pub rotation: Rotation,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-2,
            rotation: Rotation::None,
        }
    }
}

/// Everything a run needs: where the data lives, which columns to use and
/// how many components to extract. Every field has a default, so a config
/// file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    /// Worksheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    pub site_column: String,
    pub season_column: String,
    /// Analyte columns fed to the decomposition, in output order.
    pub analytes: Vec<String>,
    /// Sampling sites, in imputation, legend and draw order.
    pub sites: Vec<String>,
    pub n_components: usize,
    pub factor_analysis: FactorSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("PCA_Data.xlsx"),
            output_file: PathBuf::from("PCA_FA_Output_Data.xlsx"),
            sheet: None,
            site_column: "Site".to_string(),
            season_column: "Season".to_string(),
            analytes: (1..=ANALYTE_COUNT).map(|i| format!("Analyte {i}")).collect(),
            sites: SITE_STYLES.iter().map(|s| s.site.to_string()).collect(),
            n_components: 2,
            factor_analysis: FactorSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(text).context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, falling back to the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.analytes.is_empty(), "at least one analyte is required");
        ensure!(self.n_components >= 1, "n_components must be at least 1");
        ensure!(
            self.factor_analysis.tol > 0.0,
            "factor_analysis.tol must be positive"
        );
        Ok(())
    }
}
