use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::REQUIRED_COLUMNS;

// ---------------------------------------------------------------------------
// Analysis errors – every failure the analyzer reports as a diagnostic line
// ---------------------------------------------------------------------------

/// Anticipated failures of a catalog analysis.
///
/// Each variant renders as a single human-readable line. `analysis::run`
/// prints it instead of the table and returns normally.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Error: catalog file '{}' not found.", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Error: catalog file '{}' is empty.", path.display())]
    SourceEmpty { path: PathBuf },

    #[error("Error: could not parse catalog file '{}'. Check the format ({reason}).", path.display())]
    SourceMalformed { path: PathBuf, reason: String },

    #[error("Error: could not read catalog file '{}': {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No data to process.")]
    EmptyAfterParse,

    #[error(
        "Error: catalog must contain the following columns: {} (missing: {})",
        REQUIRED_COLUMNS.join(", "),
        missing.join(", ")
    )]
    MissingRequiredColumns { missing: Vec<String> },

    #[error("Error: row {row}, column '{column}': '{value}' is not a number.")]
    NonNumericValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Error: row {row}: redshift {value} is not a valid non-negative number.")]
    InvalidRedshift { row: usize, value: String },

    #[error("Error: row {row}: {source}.")]
    Distance {
        row: usize,
        #[source]
        source: CosmologyError,
    },
}

// ---------------------------------------------------------------------------
// Cosmology errors – parameter and domain checks of the distance functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CosmologyError {
    #[error("Hubble constant must be finite and positive, got {0}")]
    InvalidHubbleConstant(f64),

    #[error("matter density fraction must lie in [0, 1], got {0}")]
    InvalidMatterDensity(f64),

    #[error("redshift must be finite and non-negative, got {0}")]
    InvalidRedshift(f64),

    #[error("luminosity distance at redshift {0} exceeds the floating-point range")]
    DistanceOverflow(f64),
}
