use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic SDSS-style photometric catalog as CSV
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of objects to generate
    #[arg(long, default_value_t = 100)]
    rows: usize,

    /// Output CSV path
    #[arg(long, short, default_value = "sample_catalog.csv")]
    output: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "objID")]
    obj_id: u64,
    ra: f64,
    dec: f64,
    u: f64,
    dered_u: f64,
    z: f64,
}

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Round to a fixed number of decimals, as catalog exports do.
fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    // SDSS DR-style 64-bit object identifiers
    let base_id: u64 = 1_237_645_876_861_272_000;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    for i in 0..args.rows {
        // Galaxy redshifts cluster around 0.1, clamped away from zero.
        let z = rng.gauss(0.1, 0.05).abs().max(0.005);
        let u = rng.uniform(17.0, 22.5);
        let extinction = rng.uniform(0.02, 0.4);

        writer.serialize(SampleRow {
            obj_id: base_id + i as u64,
            ra: round_to(rng.uniform(0.0, 360.0), 6),
            dec: round_to(rng.uniform(-10.0, 70.0), 6),
            u: round_to(u, 5),
            dered_u: round_to(u - extinction, 5),
            z: round_to(z, 6),
        })?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {} objects to {}", args.rows, args.output.display());
    Ok(())
}
