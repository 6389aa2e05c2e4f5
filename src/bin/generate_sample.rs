use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use hydrochem_pca::config::AnalysisConfig;

const SEASONS: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];
const YEARS: [u32; 2] = [2017, 2018];
const MISSING_RATE: f64 = 0.06;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated sample.
struct Row {
    site: String,
    season: &'static str,
    date: String,
    analytes: Vec<Option<f64>>,
}

/// Typical concentration profile (mg/L) of a site, by water type.
fn site_profile(site: &str, n_analytes: usize) -> Vec<f64> {
    let base: f64 = if site == "Precipitation" {
        0.2
    } else if site.contains("GW") {
        12.0
    } else {
        6.0
    };
    // Each catchment gets its own geology offset so sites separate in PC space.
    let shift = site.bytes().map(|b| b as f64).sum::<f64>() % 7.0 / 7.0;
    (0..n_analytes)
        .map(|j| base * (1.0 + 0.3 * j as f64) * (0.6 + shift * (j % 3) as f64))
        .collect()
}

fn seasonal_factor(season_idx: usize, groundwater: bool) -> f64 {
    let swing = if groundwater { 0.05 } else { 0.35 };
    1.0 + swing * (season_idx as f64 * std::f64::consts::FRAC_PI_2).cos()
}

fn generate(config: &AnalysisConfig, rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for site in &config.sites {
        let profile = site_profile(site, config.analytes.len());
        let groundwater = site.contains("GW");
        for year in YEARS {
            for month in 1..=12u32 {
                let season_idx = (month as usize % 12) / 3;
                let factor = seasonal_factor(season_idx, groundwater);
                let analytes = profile
                    .iter()
                    .map(|&mu| {
                        if rng.next_f64() < MISSING_RATE {
                            None
                        } else {
                            Some((mu * factor * rng.gauss(1.0, 0.08)).max(0.0))
                        }
                    })
                    .collect();
                rows.push(Row {
                    site: site.clone(),
                    season: SEASONS[season_idx],
                    date: format!("{year}-{month:02}-15"),
                    analytes,
                });
            }
        }
    }
    rows
}

fn write_xlsx(path: &Path, config: &AnalysisConfig, rows: &[Row]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, &config.site_column)?;
    sheet.write_string(0, 1, &config.season_column)?;
    sheet.write_string(0, 2, "Date")?;
    for (j, analyte) in config.analytes.iter().enumerate() {
        sheet.write_string(0, 3 + j as u16, analyte)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.site)?;
        sheet.write_string(r, 1, row.season)?;
        sheet.write_string(r, 2, &row.date)?;
        for (j, value) in row.analytes.iter().enumerate() {
            if let Some(v) = value {
                sheet.write_number(r, 3 + j as u16, *v)?;
            }
        }
    }

    workbook.save(path).context("saving workbook")?;
    Ok(())
}

fn write_parquet(path: &Path, config: &AnalysisConfig, rows: &[Row]) -> Result<()> {
    let mut fields = vec![
        Field::new(config.site_column.as_str(), DataType::Utf8, false),
        Field::new(config.season_column.as_str(), DataType::Utf8, false),
        Field::new("Date", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.site.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.season))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.date.as_str()))),
    ];
    for (j, analyte) in config.analytes.iter().enumerate() {
        fields.push(Field::new(analyte.as_str(), DataType::Float64, true));
        let values: Float64Array = rows.iter().map(|r| r.analytes[j]).collect();
        columns.push(Arc::new(values));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = AnalysisConfig::default();
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.input_file.clone());

    let mut rng = SimpleRng::new(42);
    let rows = generate(&config, &mut rng);

    match output_path.extension().and_then(|e| e.to_str()) {
        Some("xlsx") => write_xlsx(&output_path, &config, &rows)?,
        Some("parquet") => write_parquet(&output_path, &config, &rows)?,
        _ => bail!("output must end in .xlsx or .parquet"),
    }

    println!(
        "Wrote {} samples from {} sites to {}",
        rows.len(),
        config.sites.len(),
        output_path.display()
    );
    Ok(())
}
