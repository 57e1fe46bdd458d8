//! sdss-cosmo: luminosity distances and absolute magnitudes for
//! photometric survey catalogs under a flat ΛCDM cosmology.

pub mod analysis;
pub mod cosmology;
pub mod data;
pub mod error;
pub mod report;

pub use analysis::{analyze, analyze_path, run, AnalysisOptions, AnalyzedRecord};
pub use cosmology::{absolute_magnitude, luminosity_distance, FlatLambdaCdm};
pub use error::{AnalysisError, CosmologyError};
pub use report::OutputFormat;
