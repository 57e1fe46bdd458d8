//! sdss-cosmo: survey catalog distance and absolute magnitude CLI

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sdss_cosmo::cosmology::{DEFAULT_H0, DEFAULT_OM0};
use sdss_cosmo::{run, AnalysisOptions, FlatLambdaCdm, OutputFormat};

/// Compute luminosity distances and absolute u magnitudes for a survey catalog
#[derive(Parser, Debug)]
#[command(name = "sdss-cosmo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog file (.csv, .json or .parquet); prompts for it when omitted
    path: Option<PathBuf>,

    /// Hubble constant in km/s/Mpc
    #[arg(long, default_value_t = DEFAULT_H0)]
    h0: f64,

    /// Matter density fraction
    #[arg(long, default_value_t = DEFAULT_OM0)]
    om0: f64,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    env_logger::init();

    match try_main(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: Args) -> Result<bool> {
    let cosmology = FlatLambdaCdm::new(args.h0, args.om0).context("invalid cosmology")?;
    let options = AnalysisOptions {
        cosmology,
        format: args.format,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let path = match args.path {
        Some(path) => path,
        None => prompt_for_path(&mut out, &mut io::stdin().lock())?,
    };

    let ok = run(&path, &options, &mut out)?;
    out.flush().context("flushing stdout")?;
    Ok(ok)
}

/// Ask for the catalog file name and read one line as the path.
fn prompt_for_path<W: Write, R: BufRead>(out: &mut W, input: &mut R) -> Result<PathBuf> {
    writeln!(out, "What is the name of the CSV file?")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("reading file name")?;
    Ok(PathBuf::from(line.trim()))
}
