//! Simultaneous eccentricity and inclination change (Pollard).

use std::f64::consts::PI;

use astro_core::vector::{self, State6, Vector3};
use astro_core::{OrbitError, Result};
use astro_orbits::Orbit;
use astro_propagation::AccelerationModel;

use crate::estimate::{ThrustPlan, TimeOfFlightEstimate};
use crate::{check_thrust, eccentricity_vector};

/// Below this eccentricity the initial radius direction replaces the
/// eccentricity vector as the reference axis.
const REFERENCE_ECC: f64 = 1e-3;

/// Feedback law with a fixed in-plane thrust direction and an out-of-plane
/// angle `±beta_0` whose sign flips at minor-axis crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EccIncGuidance {
    pub f: f64,
    pub beta_0: f64,
    thrust_unit: Vector3,
    reference: Vector3,
}

impl AccelerationModel for EccIncGuidance {
    fn acceleration(&self, _t: f64, state: &State6, k: f64) -> Vector3 {
        let (r, v) = vector::split(state);
        let Some(w) = vector::unit(&vector::cross(&r, &v)) else {
            return [0.0; 3];
        };
        let e_vec = eccentricity_vector(k, &r, &v);
        // sign of cos(nu)
        let along = if vector::norm(&e_vec) > astro_orbits::GEOMETRY_TOL {
            vector::dot(&e_vec, &r)
        } else {
            vector::dot(&self.reference, &r)
        };
        let beta = if along < 0.0 { -self.beta_0 } else { self.beta_0 };
        vector::lin_comb(
            &self.thrust_unit,
            self.f * beta.cos(),
            &w,
            self.f * beta.sin(),
        )
    }

    fn name(&self) -> &'static str {
        "ecc_inc"
    }
}

/// Out-of-plane thrust angle for a combined change.
fn pollard_beta(ecc_0: f64, ecc_f: f64, inc_0: f64, inc_f: f64, argp: f64) -> f64 {
    let log_term = ((1.0 + ecc_f) * (ecc_0 - 1.0) / ((1.0 + ecc_0) * (ecc_f - 1.0))).ln();
    (3.0 * PI * (inc_f - inc_0) / (4.0 * argp.cos() * (ecc_0 - ecc_f + log_term)))
        .abs()
        .atan()
}

/// Drive eccentricity and inclination toward `(ecc_f, inc_f)` under constant
/// thrust acceleration `f`.
///
/// A pure inclination change (equal eccentricities) or an argument of periapsis
/// of ±90° makes the estimate divergent.
pub fn change_ecc_inc(
    orbit: &Orbit,
    ecc_f: f64,
    inc_f: f64,
    f: f64,
) -> Result<ThrustPlan<EccIncGuidance>> {
    check_thrust(f)?;
    if !(0.0..1.0).contains(&ecc_f) || !inc_f.is_finite() {
        return Err(OrbitError::domain(format!(
            "target must be a closed orbit with finite inclination (ecc = {ecc_f}, inc = {inc_f})"
        )));
    }
    let elements = orbit.elements()?;
    let (ecc_0, inc_0) = (elements.ecc, elements.inc);
    if ecc_0 >= 1.0 {
        return Err(OrbitError::domain(format!(
            "eccentricity guidance needs a closed orbit, got ecc = {ecc_0}"
        )));
    }

    let r = orbit.r();
    let w = vector::unit(&orbit.h_vec())
        .ok_or_else(|| OrbitError::domain("rectilinear orbit has no orbital plane"))?;
    let reference = if ecc_0 > REFERENCE_ECC {
        vector::scale(&orbit.e_vec(), 1.0 / ecc_0)
    } else {
        vector::scale(&r, 1.0 / vector::norm(&r))
    };
    let sign = if ecc_f < ecc_0 { -1.0 } else { 1.0 };
    let thrust_unit = vector::scale(&vector::cross(&w, &reference), sign);

    let no_change = ecc_f == ecc_0 && inc_f == inc_0;
    let beta_0 = if no_change {
        0.0
    } else {
        pollard_beta(ecc_0, ecc_f, inc_0, inc_f, elements.argp())
    };
    let cos_beta = beta_0.cos();
    let delta_v = if no_change {
        0.0
    } else if cos_beta > 1e-12 {
        let v_0 = (orbit.k() / elements.a).sqrt();
        2.0 * v_0 * (ecc_0.asin() - ecc_f.asin()).abs() / (3.0 * cos_beta)
    } else {
        f64::INFINITY
    };

    Ok(ThrustPlan::new(
        EccIncGuidance {
            f,
            beta_0,
            thrust_unit,
            reference,
        },
        TimeOfFlightEstimate::from_delta_v(delta_v, f, "eccentricity/inclination"),
    ))
}
