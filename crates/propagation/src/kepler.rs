//! Universal-variable Kepler propagator (two-body, analytic).
//!
//! Solves the universal Kepler equation for χ with Newton's method, falling back
//! to bisection whenever a Newton step leaves the current bracket. The time
//! function is monotone in χ because its derivative is the radius, so the
//! bracket always contains exactly one root. The state is then advanced with the
//! Lagrange coefficients f, g, ḟ, ġ, which handles elliptic, parabolic and
//! hyperbolic motion (and even rectilinear motion) uniformly.

use std::f64::consts::TAU;

use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};
use log::{debug, trace};

use crate::propagator::Propagator;
use crate::stumpff::{c2, c3};

/// Analytic two-body propagator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kepler {
    /// Relative tolerance on the time residual of the universal Kepler equation.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for Kepler {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl Kepler {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

impl Propagator for Kepler {
    fn propagate_state(
        &self,
        k: f64,
        r0: &Vector3,
        v0: &Vector3,
        tof: f64,
    ) -> Result<(Vector3, Vector3)> {
        kepler(k, r0, v0, tof, self)
    }

    fn name(&self) -> &'static str {
        "kepler"
    }
}

/// Propagate `(r0, v0)` by `tof` under pure two-body motion.
///
/// `tof == 0` returns the input unchanged and negative values propagate
/// backwards. Elliptic flights longer than a period are reduced modulo the
/// period before solving.
pub fn kepler(
    k: f64,
    r0: &Vector3,
    v0: &Vector3,
    tof: f64,
    settings: &Kepler,
) -> Result<(Vector3, Vector3)> {
    if !(k.is_finite() && k > 0.0) {
        return Err(OrbitError::domain(format!(
            "gravitational parameter must be positive, got {k}"
        )));
    }
    if !tof.is_finite() {
        return Err(OrbitError::domain(format!("time of flight must be finite, got {tof}")));
    }
    if !vector::is_finite(r0) || !vector::is_finite(v0) {
        return Err(OrbitError::domain("initial state contains non-finite components"));
    }
    let r0_norm = vector::norm(r0);
    if r0_norm == 0.0 {
        return Err(OrbitError::domain("initial position has zero magnitude"));
    }
    if tof == 0.0 {
        return Ok((*r0, *v0));
    }

    let sqrt_k = k.sqrt();
    let v0_sq = vector::dot(v0, v0);
    let rv = vector::dot(r0, v0);
    let rv_sqrt_k = rv / sqrt_k;
    // reciprocal of the semi-major axis
    let alpha = 2.0 / r0_norm - v0_sq / k;
    let elliptic = alpha * r0_norm > 1e-12;

    let mut tof = tof;
    if elliptic {
        let period = TAU / (alpha.powi(3) * k).sqrt();
        if tof.abs() >= period {
            tof %= period;
            if tof == 0.0 {
                return Ok((*r0, *v0));
            }
        }
    }

    let target = sqrt_k * tof;
    let mut chi = initial_guess(k, r0, v0, r0_norm, alpha, tof);

    // χ is monotone in time, so the root lies on the same side of zero as tof
    let (mut lo, mut hi) = if tof > 0.0 {
        (0.0, f64::INFINITY)
    } else {
        (f64::NEG_INFINITY, 0.0)
    };
    if elliptic {
        // one full revolution spans Δχ = 2π / √α
        let chi_period = TAU / alpha.sqrt();
        lo = lo.max(-chi_period);
        hi = hi.min(chi_period);
    }
    if !(chi > lo && chi < hi) {
        chi = if lo.is_finite() && hi.is_finite() {
            0.5 * (lo + hi)
        } else {
            target / r0_norm
        };
    }

    // (time * √k, radius) at a given χ
    let evaluate = |chi: f64| {
        let chi_sq = chi * chi;
        let psi = alpha * chi_sq;
        let c2_psi = c2(psi);
        let c3_psi = c3(psi);
        let t_chi = rv_sqrt_k * chi_sq * c2_psi
            + (1.0 - alpha * r0_norm) * chi_sq * chi * c3_psi
            + r0_norm * chi;
        let r_chi = chi_sq * c2_psi
            + rv_sqrt_k * chi * (1.0 - psi * c3_psi)
            + r0_norm * (1.0 - psi * c2_psi);
        (t_chi, r_chi)
    };

    for iteration in 0..settings.max_iterations {
        let (t_chi, r_chi) = evaluate(chi);
        let residual = target - t_chi;

        if residual.abs() <= settings.tolerance * target.abs() {
            // polish with one more Newton step
            let polished = chi + residual / r_chi;
            let (chi, r_chi) = if polished > lo && polished < hi {
                (polished, evaluate(polished).1)
            } else {
                (chi, r_chi)
            };
            debug!("kepler converged in {} iterations (chi = {chi})", iteration + 1);
            return Ok(lagrange_update(
                r0, v0, r0_norm, sqrt_k, alpha, tof, chi, r_chi,
            ));
        }

        if residual > 0.0 {
            lo = chi;
        } else {
            hi = chi;
        }

        let mut next = chi + residual / r_chi;
        if !(next.is_finite() && next > lo && next < hi) {
            next = match (lo.is_finite(), hi.is_finite()) {
                (true, true) => 0.5 * (lo + hi),
                // unbounded side: expand away from zero
                _ => 2.0 * chi,
            };
            trace!("kepler newton step left bracket [{lo}, {hi}], using {next}");
        }
        if (hi - lo).abs() <= 4.0 * f64::EPSILON * chi.abs().max(1.0) {
            return Err(OrbitError::convergence(
                "kepler",
                format!("bracket collapsed at chi = {chi} with residual {residual:e}"),
            ));
        }
        chi = next;
    }

    Err(OrbitError::convergence(
        "kepler",
        format!(
            "no convergence after {} iterations (tof = {tof}, last chi = {chi})",
            settings.max_iterations
        ),
    ))
}

fn initial_guess(k: f64, r0: &Vector3, v0: &Vector3, r0_norm: f64, alpha: f64, tof: f64) -> f64 {
    let sqrt_k = k.sqrt();
    let fallback = sqrt_k * tof / r0_norm;

    let guess = if alpha * r0_norm > 1e-12 {
        sqrt_k * tof * alpha
    } else if alpha * r0_norm < -1e-12 {
        let a = 1.0 / alpha;
        let rv = vector::dot(r0, v0);
        let sign = tof.signum();
        let denom = rv + sign * (-k * a).sqrt() * (1.0 - r0_norm * alpha);
        let arg = -2.0 * k * alpha * tof / denom;
        if arg > 0.0 {
            sign * (-a).sqrt() * arg.ln()
        } else {
            fallback
        }
    } else {
        let h = vector::norm(&vector::cross(r0, v0));
        let p = h * h / k;
        if p > 0.0 {
            let s = 0.5 * (1.0 / (3.0 * (k / (p * p * p)).sqrt() * tof)).atan();
            let w = s.tan().cbrt().atan();
            p.sqrt() * 2.0 / (2.0 * w).tan()
        } else {
            fallback
        }
    };

    if guess.is_finite() && guess != 0.0 {
        guess
    } else {
        fallback
    }
}

#[allow(clippy::too_many_arguments)]
fn lagrange_update(
    r0: &Vector3,
    v0: &Vector3,
    r0_norm: f64,
    sqrt_k: f64,
    alpha: f64,
    tof: f64,
    chi: f64,
    r_norm: f64,
) -> (Vector3, Vector3) {
    let chi_sq = chi * chi;
    let psi = alpha * chi_sq;
    let c2_psi = c2(psi);
    let c3_psi = c3(psi);
    let f = 1.0 - chi_sq * c2_psi / r0_norm;
    let g = tof - chi_sq * chi * c3_psi / sqrt_k;
    let r = vector::lin_comb(r0, f, v0, g);

    let fdot = sqrt_k * chi * (psi * c3_psi - 1.0) / (r_norm * r0_norm);
    let gdot = 1.0 - chi_sq * c2_psi / r_norm;
    let v = vector::lin_comb(r0, fdot, v0, gdot);
    (r, v)
}
