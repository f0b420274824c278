//! Argument of periapsis rotation with in-plane thrust.

use astro_core::angle::wrap_pi;
use astro_core::vector::{self, State6, Vector3};
use astro_core::{OrbitError, Result};
use astro_orbits::{Orbit, OrbitKind};
use astro_propagation::AccelerationModel;

use crate::estimate::{ThrustPlan, TimeOfFlightEstimate};
use crate::{check_thrust, eccentricity_vector};

/// In-plane thrust at angle `nu - π/2` from the local horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgpGuidance {
    pub f: f64,
    /// +1 rotates the periapsis prograde, -1 retrograde.
    pub direction: f64,
}

impl AccelerationModel for ArgpGuidance {
    fn acceleration(&self, _t: f64, state: &State6, k: f64) -> Vector3 {
        let (r, v) = vector::split(state);
        let e_vec = eccentricity_vector(k, &r, &v);
        let (Some(e_hat), Some(r_hat), Some(w_hat)) = (
            vector::unit(&e_vec),
            vector::unit(&r),
            vector::unit(&vector::cross(&r, &v)),
        ) else {
            return [0.0; 3];
        };
        let cos_nu = vector::dot(&e_hat, &r_hat);
        let sin_nu = vector::dot(&w_hat, &vector::cross(&e_hat, &r_hat));
        let s_hat = vector::cross(&w_hat, &r_hat);
        let scale = self.f * self.direction;
        vector::lin_comb(&s_hat, scale * sin_nu, &r_hat, -scale * cos_nu)
    }

    fn name(&self) -> &'static str {
        "argp"
    }
}

/// Rotate the argument of periapsis to `argp_f` (shortest way round) under
/// constant thrust acceleration `f`.
pub fn change_argp(orbit: &Orbit, argp_f: f64, f: f64) -> Result<ThrustPlan<ArgpGuidance>> {
    check_thrust(f)?;
    if !argp_f.is_finite() {
        return Err(OrbitError::domain(format!(
            "target argument of periapsis must be finite, got {argp_f}"
        )));
    }
    let elements = orbit.elements()?;
    let ecc = elements.ecc;
    match elements.kind() {
        OrbitKind::Elliptic => {}
        OrbitKind::Circular => {
            return Err(OrbitError::domain(
                "argument of periapsis is undefined on a circular orbit",
            ));
        }
        kind => {
            return Err(OrbitError::domain(format!(
                "periapsis rotation needs an elliptic orbit, got {kind:?}"
            )));
        }
    }

    let delta = wrap_pi(argp_f - elements.argp());
    let v = (orbit.k() / elements.a).sqrt();
    let delta_v = delta.abs() * 2.0 * ecc * v / (3.0 * (1.0 - ecc * ecc).sqrt());

    Ok(ThrustPlan::new(
        ArgpGuidance {
            f,
            direction: if delta < 0.0 { -1.0 } else { 1.0 },
        },
        TimeOfFlightEstimate::from_delta_v(delta_v, f, "argument of periapsis"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use astro_orbits::{Attractor, ClassicalElements};

    fn gto(argp: f64) -> Orbit {
        let earth = Attractor::new(398_600.4418, 6378.1366).unwrap();
        let elements = ClassicalElements::new(24_396.0, 0.7283, 0.1, 0.0, argp, 0.3);
        Orbit::from_classical(earth, &elements, 0.0).unwrap()
    }

    #[test]
    fn two_degree_rotation_budget() {
        let orbit = gto(178.0_f64.to_radians());
        let plan = change_argp(&orbit, 180.0_f64.to_radians(), 2.4e-6).unwrap();
        assert_relative_eq!(plan.estimate.delta_v().unwrap(), 0.0999727, max_relative = 1e-5);
        assert_eq!(plan.law.direction, 1.0);
    }

    #[test]
    fn rotation_takes_the_short_way_round() {
        let orbit = gto(10.0_f64.to_radians());
        let plan = change_argp(&orbit, 350.0_f64.to_radians(), 2.4e-6).unwrap();
        assert_eq!(plan.law.direction, -1.0);
        let forward = change_argp(&orbit, 30.0_f64.to_radians(), 2.4e-6).unwrap();
        assert_relative_eq!(
            plan.estimate.delta_v().unwrap(),
            forward.estimate.delta_v().unwrap(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn thrust_is_in_plane_with_constant_magnitude() {
        let orbit = gto(1.0);
        let plan = change_argp(&orbit, 1.2, 1e-6).unwrap();
        let a = plan.law.acceleration(0.0, &orbit.state(), orbit.k());
        assert_relative_eq!(vector::norm(&a), 1e-6, max_relative = 1e-12);
        let w = vector::unit(&orbit.h_vec()).unwrap();
        assert!(vector::dot(&a, &w).abs() < 1e-18);
    }

    #[test]
    fn circular_orbits_are_rejected() {
        let earth = Attractor::new(398_600.4418, 6378.1366).unwrap();
        let orbit = Orbit::circular(earth, 500.0, 0.5, 0.0, 0.0, 0.0).unwrap();
        assert!(change_argp(&orbit, 1.0, 1e-6).unwrap_err().is_domain());
    }
}
