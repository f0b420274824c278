//! Conversions between true, eccentric/hyperbolic/parabolic, and mean anomalies.
//!
//! Elliptic mean anomaly is `M = n t`, hyperbolic `M = sqrt(k / (-a)³) t`, and the
//! parabolic (Barker) form is `M = 2 sqrt(k / p³) t = D + D³/3` with `D = tan(ν/2)`.

use astro_core::angle::wrap_pi;
use astro_core::{OrbitError, Result};

const KEPLER_TOL: f64 = 1e-14;
const KEPLER_MAX_ITER: usize = 50;

pub fn nu_to_eccentric(nu: f64, ecc: f64) -> f64 {
    2.0 * (((1.0 - ecc) / (1.0 + ecc)).sqrt() * (0.5 * nu).tan()).atan()
}

pub fn eccentric_to_nu(ea: f64, ecc: f64) -> f64 {
    2.0 * (((1.0 + ecc) / (1.0 - ecc)).sqrt() * (0.5 * ea).tan()).atan()
}

pub fn eccentric_to_mean(ea: f64, ecc: f64) -> f64 {
    ea - ecc * ea.sin()
}

/// Solve Kepler's equation `M = E - e sin E` for `E` in `(-π, π]`.
pub fn mean_to_eccentric(mean: f64, ecc: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&ecc) {
        return Err(OrbitError::domain(format!(
            "elliptic Kepler equation needs 0 <= e < 1, got {ecc}"
        )));
    }
    let m = wrap_pi(mean);
    let mut ea = if ecc > 0.8 {
        m.signum() * std::f64::consts::PI
    } else {
        m + ecc * m.sin()
    };
    for _ in 0..KEPLER_MAX_ITER {
        let f = ea - ecc * ea.sin() - m;
        let step = f / (1.0 - ecc * ea.cos());
        ea -= step;
        if step.abs() <= KEPLER_TOL * (1.0 + ea.abs()) {
            return Ok(ea);
        }
    }
    Err(OrbitError::convergence(
        "mean_to_eccentric",
        format!("M = {mean}, e = {ecc}"),
    ))
}

pub fn nu_to_hyperbolic(nu: f64, ecc: f64) -> f64 {
    2.0 * (((ecc - 1.0) / (ecc + 1.0)).sqrt() * (0.5 * nu).tan()).atanh()
}

pub fn hyperbolic_to_nu(fa: f64, ecc: f64) -> f64 {
    2.0 * (((ecc + 1.0) / (ecc - 1.0)).sqrt() * (0.5 * fa).tanh()).atan()
}

pub fn hyperbolic_to_mean(fa: f64, ecc: f64) -> f64 {
    ecc * fa.sinh() - fa
}

/// Solve the hyperbolic Kepler equation `M = e sinh F - F`.
pub fn mean_to_hyperbolic(mean: f64, ecc: f64) -> Result<f64> {
    if ecc <= 1.0 {
        return Err(OrbitError::domain(format!(
            "hyperbolic Kepler equation needs e > 1, got {ecc}"
        )));
    }
    let mut fa = (mean / ecc).asinh();
    for _ in 0..KEPLER_MAX_ITER {
        let f = ecc * fa.sinh() - fa - mean;
        let step = f / (ecc * fa.cosh() - 1.0);
        fa -= step;
        if step.abs() <= KEPLER_TOL * (1.0 + fa.abs()) {
            return Ok(fa);
        }
    }
    Err(OrbitError::convergence(
        "mean_to_hyperbolic",
        format!("M = {mean}, e = {ecc}"),
    ))
}

pub fn nu_to_parabolic(nu: f64) -> f64 {
    (0.5 * nu).tan()
}

pub fn parabolic_to_nu(d: f64) -> f64 {
    2.0 * d.atan()
}

pub fn parabolic_to_mean(d: f64) -> f64 {
    d + d * d * d / 3.0
}

/// Barker's equation solved in closed form.
pub fn mean_to_parabolic(mean: f64) -> f64 {
    let w = 1.5 * mean;
    let root = (w * w + 1.0).sqrt();
    (w + root).cbrt() + (w - root).cbrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn elliptic_conversions_invert() {
        let ecc = 0.7;
        for nu in [-3.0, -1.2, 0.0, 0.4, 2.9] {
            let ea = nu_to_eccentric(nu, ecc);
            let m = eccentric_to_mean(ea, ecc);
            let back = eccentric_to_nu(mean_to_eccentric(m, ecc).unwrap(), ecc);
            assert_relative_eq!(back, nu, epsilon = 1e-12);
        }
    }

    #[test]
    fn vallado_kepler_example() {
        // Vallado example 2-1: M = 235.4 deg, e = 0.4 -> E = 220.512074767522 deg
        let m = 235.4_f64.to_radians();
        let ea = mean_to_eccentric(m, 0.4).unwrap();
        assert_relative_eq!(
            astro_core::angle::wrap_two_pi(ea).to_degrees(),
            220.512_074_767_522,
            epsilon = 1e-9
        );
    }

    #[test]
    fn hyperbolic_conversions_invert() {
        let ecc = 2.3;
        for nu in [-1.5, -0.2, 0.0, 1.0, 1.6] {
            let fa = nu_to_hyperbolic(nu, ecc);
            let m = hyperbolic_to_mean(fa, ecc);
            let back = hyperbolic_to_nu(mean_to_hyperbolic(m, ecc).unwrap(), ecc);
            assert_relative_eq!(back, nu, epsilon = 1e-12);
        }
    }

    #[test]
    fn barker_solution_satisfies_equation() {
        for m in [-20.0, -0.3, 0.0, 1.7, 150.0] {
            let d = mean_to_parabolic(m);
            assert_relative_eq!(parabolic_to_mean(d), m, epsilon = 1e-9, max_relative = 1e-12);
        }
        assert_relative_eq!(parabolic_to_nu(nu_to_parabolic(2.0)), 2.0, epsilon = 1e-14);
    }

    #[test]
    fn kepler_rejects_open_orbits() {
        assert!(mean_to_eccentric(1.0, 1.2).unwrap_err().is_domain());
        assert!(mean_to_hyperbolic(1.0, 0.5).unwrap_err().is_domain());
    }
}
