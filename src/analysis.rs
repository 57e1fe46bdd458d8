use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cosmology::{absolute_magnitude, FlatLambdaCdm};
use crate::data::loader::load_file;
use crate::data::model::{Catalog, CatalogRecord};
use crate::error::AnalysisError;
use crate::report::{render, OutputFormat};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime parameters of one analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub cosmology: FlatLambdaCdm,
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// AnalyzedRecord – an input record plus its derived columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedRecord {
    pub record: CatalogRecord,
    /// Luminosity distance in Mpc.
    pub distance_mpc: f64,
    /// Absolute magnitude in the `u` band; NaN when `u` is missing.
    pub absolute_u: f64,
}

/// Compute distance and absolute magnitude for every record, in order.
///
/// Stops at the first record whose redshift is missing, NaN, infinite or
/// negative, or whose distance does not fit in an `f64`.
pub fn analyze(
    catalog: &Catalog,
    cosmology: &FlatLambdaCdm,
) -> Result<Vec<AnalyzedRecord>, AnalysisError> {
    log::info!(
        "analyzing {} records with H0={} Om0={}",
        catalog.len(),
        cosmology.h0(),
        cosmology.om0()
    );

    catalog
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| analyze_record(row, record, cosmology))
        .collect()
}

fn analyze_record(
    row: usize,
    record: &CatalogRecord,
    cosmology: &FlatLambdaCdm,
) -> Result<AnalyzedRecord, AnalysisError> {
    let invalid = |value: String| AnalysisError::InvalidRedshift { row, value };

    let z = match record.z {
        Some(z) if z.is_finite() && z >= 0.0 => z,
        Some(z) => return Err(invalid(z.to_string())),
        None => return Err(invalid("<null>".to_string())),
    };
    let distance_mpc = cosmology
        .luminosity_distance(z)
        .map_err(|source| AnalysisError::Distance { row, source })?;
    let absolute_u = absolute_magnitude(record.u.unwrap_or(f64::NAN), distance_mpc);

    log::debug!("row {row}: z={z} D_L={distance_mpc} Mpc M_u={absolute_u}");
    if !absolute_u.is_finite() {
        log::warn!(
            "row {row} ({}): absolute u magnitude is undefined",
            record.obj_id.as_deref().unwrap_or("<null>")
        );
    }

    Ok(AnalyzedRecord {
        record: record.clone(),
        distance_mpc,
        absolute_u,
    })
}

/// Load, validate and analyze a catalog file.
pub fn analyze_path(
    path: &Path,
    cosmology: &FlatLambdaCdm,
) -> Result<Vec<AnalyzedRecord>, AnalysisError> {
    let table = load_file(path)?;
    let catalog = Catalog::from_table(&table)?;
    analyze(&catalog, cosmology)
}

/// Analyze a catalog file and write the augmented table to `out`.
///
/// Anticipated failures are written to `out` as a single diagnostic line
/// and reported as `Ok(false)`. The table is rendered completely before
/// anything is written, so a failure never leaves partial output behind.
pub fn run<W: Write>(path: &Path, options: &AnalysisOptions, out: &mut W) -> Result<bool> {
    match analyze_path(path, &options.cosmology) {
        Ok(rows) => {
            let text = render(&rows, options.format).context("rendering results")?;
            out.write_all(text.as_bytes()).context("writing results")?;
            Ok(true)
        }
        Err(err) => {
            log::debug!("analysis of {} failed: {err:?}", path.display());
            writeln!(out, "{err}").context("writing diagnostic")?;
            Ok(false)
        }
    }
}
