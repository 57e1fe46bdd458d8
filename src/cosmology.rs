//! Flat ΛCDM distances and the distance-modulus magnitude conversion.
//!
//! The model has zero curvature and no radiation term, so the expansion
//! rate is
//!
//! ```text
//! E(z) = sqrt(Om0 · (1 + z)³ + (1 − Om0))
//! ```
//!
//! and the luminosity distance is `(1 + z) · (c / H0) · ∫₀^z dz' / E(z')`.
//!
//! Beyond `z = 1` the integral continues over `s = 1 / sqrt(1 + z)`, which
//! maps any redshift onto the bounded interval `[1 / sqrt(1 + z), 1 / sqrt(2)]`
//! with the smooth integrand `2 / sqrt(Om0 + (1 − Om0) · s⁶)`.

use crate::error::CosmologyError;

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Default Hubble constant in km/s/Mpc.
pub const DEFAULT_H0: f64 = 70.0;

/// Default present-day matter density fraction.
pub const DEFAULT_OM0: f64 = 0.3;

/// `log10` of the parsecs in one megaparsec.
const MPC_DECADES: f64 = 6.0;

/// Absolute tolerance for the dimensionless comoving-distance integral.
const INTEGRAL_TOLERANCE: f64 = 1e-12;

const MAX_SUBDIVISION_DEPTH: u32 = 48;

// ---------------------------------------------------------------------------
// FlatLambdaCdm
// ---------------------------------------------------------------------------

/// A flat universe made of matter and a cosmological constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatLambdaCdm {
    h0: f64,
    om0: f64,
}

impl Default for FlatLambdaCdm {
    fn default() -> Self {
        Self {
            h0: DEFAULT_H0,
            om0: DEFAULT_OM0,
        }
    }
}

impl FlatLambdaCdm {
    /// Build a cosmology from the Hubble constant (km/s/Mpc) and the matter
    /// density fraction.
    pub fn new(h0: f64, om0: f64) -> Result<Self, CosmologyError> {
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(CosmologyError::InvalidHubbleConstant(h0));
        }
        if !om0.is_finite() || !(0.0..=1.0).contains(&om0) {
            return Err(CosmologyError::InvalidMatterDensity(om0));
        }
        Ok(Self { h0, om0 })
    }

    pub fn h0(&self) -> f64 {
        self.h0
    }

    pub fn om0(&self) -> f64 {
        self.om0
    }

    /// Dark-energy density fraction, `1 − Om0` for a flat universe.
    pub fn ode0(&self) -> f64 {
        1.0 - self.om0
    }

    /// Hubble distance `c / H0` in Mpc.
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.h0
    }

    /// Dimensionless Hubble parameter `E(z) = H(z) / H0`.
    pub fn efunc(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        (self.om0 * zp1 * zp1 * zp1 + self.ode0()).sqrt()
    }

    /// Line-of-sight comoving distance in Mpc.
    pub fn comoving_distance(&self, z: f64) -> Result<f64, CosmologyError> {
        check_redshift(z)?;
        if z == 0.0 {
            return Ok(0.0);
        }
        let integral = if self.om0 == 0.0 {
            // Pure Λ: E(z) = 1.
            z
        } else if z <= 1.0 {
            adaptive_simpson(&|x| 1.0 / self.efunc(x), 0.0, z)
        } else {
            // ∫₀¹ in z, then the remainder over s ∈ [1/sqrt(1+z), 1/sqrt(2)].
            let (om0, ode0) = (self.om0, self.ode0());
            let head = adaptive_simpson(&|x| 1.0 / self.efunc(x), 0.0, 1.0);
            let s_min = 1.0 / (1.0 + z).sqrt();
            let tail = adaptive_simpson(
                &|s| 2.0 / (om0 + ode0 * s.powi(6)).sqrt(),
                s_min,
                std::f64::consts::FRAC_1_SQRT_2,
            );
            head + tail
        };
        finite_distance(z, self.hubble_distance() * integral)
    }

    /// Luminosity distance in Mpc.
    pub fn luminosity_distance(&self, z: f64) -> Result<f64, CosmologyError> {
        let dc = self.comoving_distance(z)?;
        finite_distance(z, (1.0 + z) * dc)
    }

    /// Distance modulus `5 · log10(D_L / 10 pc)`. Infinite at `z = 0`.
    pub fn distance_modulus(&self, z: f64) -> Result<f64, CosmologyError> {
        let dl = self.luminosity_distance(z)?;
        Ok(5.0 * (dl.log10() + MPC_DECADES) - 5.0)
    }
}

/// Luminosity distance in Mpc for a flat ΛCDM universe.
pub fn luminosity_distance(z: f64, h0: f64, om0: f64) -> Result<f64, CosmologyError> {
    FlatLambdaCdm::new(h0, om0)?.luminosity_distance(z)
}

/// Absolute magnitude from an apparent magnitude and a distance in Mpc.
///
/// Returns NaN when the distance is not strictly positive.
pub fn absolute_magnitude(apparent: f64, distance_mpc: f64) -> f64 {
    if distance_mpc.is_nan() || distance_mpc <= 0.0 {
        return f64::NAN;
    }
    // log10(d · 1e6) without overflowing d · 1e6 for huge distances.
    apparent - 5.0 * (distance_mpc.log10() + MPC_DECADES) + 5.0
}

fn finite_distance(z: f64, distance: f64) -> Result<f64, CosmologyError> {
    if distance.is_finite() {
        Ok(distance)
    } else {
        Err(CosmologyError::DistanceOverflow(z))
    }
}

fn check_redshift(z: f64) -> Result<(), CosmologyError> {
    if z.is_finite() && z >= 0.0 {
        Ok(())
    } else {
        Err(CosmologyError::InvalidRedshift(z))
    }
}

// ---------------------------------------------------------------------------
// Adaptive Simpson quadrature
// ---------------------------------------------------------------------------

fn adaptive_simpson<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> f64 {
    let fa = f(a);
    let fb = f(b);
    let m = a + 0.5 * (b - a);
    let fm = f(m);
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    simpson_step(f, a, b, fa, fm, fb, whole, INTEGRAL_TOLERANCE, MAX_SUBDIVISION_DEPTH)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    eps: f64,
    depth: u32,
) -> f64 {
    let m = a + 0.5 * (b - a);
    let lm = a + 0.5 * (m - a);
    let rm = m + 0.5 * (b - m);
    let flm = f(lm);
    let frm = f(rm);
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;

    if depth == 0 || !delta.is_finite() || delta.abs() <= 15.0 * eps {
        // Richardson extrapolation of the two-panel estimate.
        return left + right + delta / 15.0;
    }
    simpson_step(f, a, m, fa, flm, fm, left, 0.5 * eps, depth - 1)
        + simpson_step(f, m, b, fm, frm, fb, right, 0.5 * eps, depth - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rel_close(actual: f64, expected: f64, rel: f64) {
        let err = ((actual - expected) / expected).abs();
        assert!(
            err <= rel,
            "expected {expected}, got {actual} (relative error {err:e})"
        );
    }

    #[test]
    fn default_cosmology_is_h70_om03() {
        let cosmo = FlatLambdaCdm::default();
        assert_eq!(cosmo.h0(), 70.0);
        assert_eq!(cosmo.om0(), 0.3);
        assert_rel_close(cosmo.hubble_distance(), 4282.749_4, 1e-7);
    }

    #[test]
    fn efunc_is_one_today() {
        let cosmo = FlatLambdaCdm::default();
        assert!((cosmo.efunc(0.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn zero_redshift_has_zero_distance() {
        let cosmo = FlatLambdaCdm::default();
        assert_eq!(cosmo.luminosity_distance(0.0).unwrap(), 0.0);
    }

    #[test]
    fn matter_only_universe_matches_closed_form() {
        // Einstein–de Sitter: D_C = 2 D_H (1 − 1/sqrt(1+z)).
        let cosmo = FlatLambdaCdm::new(70.0, 1.0).unwrap();
        for z in [0.01_f64, 0.5, 2.0, 10.0] {
            let expected = 2.0 * cosmo.hubble_distance() * (1.0 - 1.0 / (1.0 + z).sqrt());
            assert_rel_close(cosmo.comoving_distance(z).unwrap(), expected, 1e-9);
        }
    }

    #[test]
    fn empty_universe_is_linear_in_redshift() {
        let cosmo = FlatLambdaCdm::new(70.0, 0.0).unwrap();
        let z = 0.8;
        let expected = (1.0 + z) * cosmo.hubble_distance() * z;
        assert_rel_close(cosmo.luminosity_distance(z).unwrap(), expected, 1e-12);
    }

    #[test]
    fn low_redshift_reference_value() {
        // Third-order series of the integral gives 222.29 Mpc at z = 0.05.
        let dl = luminosity_distance(0.05, 70.0, 0.3).unwrap();
        assert!(dl > 220.0 && dl < 225.0);
        assert_rel_close(dl, 222.29, 1e-3);
    }

    #[test]
    fn unit_redshift_reference_value() {
        let cosmo = FlatLambdaCdm::default();
        assert_rel_close(cosmo.comoving_distance(1.0).unwrap(), 3303.83, 1e-3);
        assert_rel_close(cosmo.luminosity_distance(1.0).unwrap(), 6607.66, 1e-3);
    }

    #[test]
    fn distance_increases_with_redshift() {
        let cosmo = FlatLambdaCdm::default();
        let mut previous = 0.0;
        for step in 1..=60 {
            let z = step as f64 * 0.05;
            let dl = cosmo.luminosity_distance(z).unwrap();
            assert!(dl > previous, "D_L({z}) = {dl} not above {previous}");
            previous = dl;
        }
    }

    #[test]
    fn negative_and_nan_redshift_are_rejected() {
        let cosmo = FlatLambdaCdm::default();
        assert_eq!(
            cosmo.luminosity_distance(-0.1),
            Err(CosmologyError::InvalidRedshift(-0.1))
        );
        assert!(cosmo.luminosity_distance(f64::NAN).is_err());
        assert!(cosmo.luminosity_distance(f64::INFINITY).is_err());
    }

    #[test]
    fn huge_redshift_completes_with_an_error() {
        let cosmo = FlatLambdaCdm::default();
        for z in [1.7e308, f64::MAX] {
            assert_eq!(
                cosmo.luminosity_distance(z),
                Err(CosmologyError::DistanceOverflow(z))
            );
        }
    }

    #[test]
    fn large_finite_redshift_stays_finite() {
        let cosmo = FlatLambdaCdm::default();
        // The comoving distance converges to 2 D_H ∫₀¹ ds / sqrt(Om0 + Ode0 s⁶).
        let far = cosmo.comoving_distance(1e12).unwrap();
        let farther = cosmo.comoving_distance(1e15).unwrap();
        assert!(far.is_finite() && farther >= far);
        assert!(farther < 2.0 * cosmo.hubble_distance() / cosmo.om0().sqrt());
        assert!(cosmo.luminosity_distance(1e15).unwrap().is_finite());

        let dl = cosmo.luminosity_distance(1e300).unwrap();
        assert!(dl.is_finite() && dl > 1e300);
        assert!(absolute_magnitude(19.5, dl).is_finite());
    }

    #[test]
    fn pure_lambda_overflow_is_reported() {
        let cosmo = FlatLambdaCdm::new(70.0, 0.0).unwrap();
        assert_eq!(
            cosmo.comoving_distance(1e307),
            Err(CosmologyError::DistanceOverflow(1e307))
        );
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            FlatLambdaCdm::new(0.0, 0.3),
            Err(CosmologyError::InvalidHubbleConstant(0.0))
        );
        assert_eq!(
            FlatLambdaCdm::new(70.0, 1.5),
            Err(CosmologyError::InvalidMatterDensity(1.5))
        );
        assert!(FlatLambdaCdm::new(f64::NAN, 0.3).is_err());
    }

    #[test]
    fn absolute_magnitude_at_ten_parsecs_equals_apparent() {
        assert!((absolute_magnitude(12.0, 1e-5) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn absolute_magnitude_follows_distance_modulus() {
        let cosmo = FlatLambdaCdm::default();
        let dl = cosmo.luminosity_distance(0.05).unwrap();
        let mu = cosmo.distance_modulus(0.05).unwrap();
        let abs_u = absolute_magnitude(19.5, dl);
        assert!((abs_u - (19.5 - mu)).abs() < 1e-12);
        assert!((abs_u - (19.5 - 5.0 * (dl * 1e6).log10() + 5.0)).abs() < 1e-12);
    }

    #[test]
    fn absolute_magnitude_undefined_without_distance() {
        assert!(absolute_magnitude(19.5, 0.0).is_nan());
        assert!(absolute_magnitude(19.5, -3.0).is_nan());
    }
}
