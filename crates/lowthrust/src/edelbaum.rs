//! Edelbaum's quasi-circular semimajor-axis and inclination change.

use std::f64::consts::FRAC_PI_2;

use astro_core::vector::{self, State6, Vector3};
use astro_core::{OrbitError, Result};
use astro_orbits::Orbit;
use astro_propagation::AccelerationModel;

use crate::check_thrust;
use crate::estimate::{ThrustPlan, TimeOfFlightEstimate};

/// Thrust along the velocity tilted out of plane by a yaw angle that follows
/// Edelbaum's closed-form schedule; the out-of-plane sign flips at the nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdelbaumGuidance {
    pub f: f64,
    pub v_0: f64,
    pub beta_0: f64,
    inc_sign: f64,
}

impl EdelbaumGuidance {
    /// Yaw angle magnitude `t` seconds into the burn.
    pub fn beta(&self, t: f64) -> f64 {
        (self.v_0 * self.beta_0.sin()).atan2(self.v_0 * self.beta_0.cos() - self.f * t)
    }
}

impl AccelerationModel for EdelbaumGuidance {
    fn acceleration(&self, t: f64, state: &State6, _k: f64) -> Vector3 {
        let (r, v) = vector::split(state);
        let h = vector::cross(&r, &v);
        let (Some(t_hat), Some(w_hat)) = (vector::unit(&v), vector::unit(&h)) else {
            return [0.0; 3];
        };
        let node = vector::cross(&[0.0, 0.0, 1.0], &h);
        let node = if vector::norm(&node) > 1e-12 * vector::norm(&h) {
            node
        } else {
            [1.0, 0.0, 0.0]
        };
        // out-of-plane thrust pushes toward the target inclination on both half orbits
        let side = vector::dot(&r, &node) * self.inc_sign;
        let beta = if side < 0.0 { -self.beta(t) } else { self.beta(t) };
        vector::lin_comb(&t_hat, self.f * beta.cos(), &w_hat, self.f * beta.sin())
    }

    fn name(&self) -> &'static str {
        "edelbaum"
    }
}

fn circular_speed(k: f64, a: f64) -> f64 {
    (k / a).sqrt()
}

/// Initial yaw angle.
fn edelbaum_beta_0(v_0: f64, v_f: f64, delta_inc: f64) -> f64 {
    (FRAC_PI_2 * delta_inc)
        .sin()
        .atan2(v_0 / v_f - (FRAC_PI_2 * delta_inc).cos())
}

fn edelbaum_delta_v(v_0: f64, v_f: f64, beta_0: f64, delta_inc: f64) -> f64 {
    if delta_inc == 0.0 {
        (v_f - v_0).abs()
    } else {
        v_0 * beta_0.cos() - v_0 * beta_0.sin() / (FRAC_PI_2 * delta_inc + beta_0).tan()
    }
}

/// Change semimajor axis to `a_f` and inclination to `inc_f` from a
/// near-circular orbit under constant thrust acceleration `f`.
pub fn change_a_inc(
    orbit: &Orbit,
    a_f: f64,
    inc_f: f64,
    f: f64,
) -> Result<ThrustPlan<EdelbaumGuidance>> {
    check_thrust(f)?;
    if !(a_f.is_finite() && a_f > 0.0) || !inc_f.is_finite() {
        return Err(OrbitError::domain(format!(
            "target semimajor axis must be positive and inclination finite (a = {a_f}, inc = {inc_f})"
        )));
    }
    let elements = orbit.elements()?;
    let a_0 = elements.a;
    if !(a_0.is_finite() && a_0 > 0.0) {
        return Err(OrbitError::domain(format!(
            "Edelbaum guidance needs a closed orbit, got a = {a_0}"
        )));
    }
    let k = orbit.k();
    let v_0 = circular_speed(k, a_0);
    let v_f = circular_speed(k, a_f);
    let delta_inc = (inc_f - elements.inc).abs();
    let beta_0 = edelbaum_beta_0(v_0, v_f, delta_inc);
    let delta_v = edelbaum_delta_v(v_0, v_f, beta_0, delta_inc);

    Ok(ThrustPlan::new(
        EdelbaumGuidance {
            f,
            v_0,
            beta_0,
            inc_sign: (inc_f - elements.inc).signum(),
        },
        TimeOfFlightEstimate::from_delta_v(delta_v, f, "Edelbaum"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use astro_core::time::seconds_to_days;
    use astro_orbits::Attractor;

    fn leo(inc_deg: f64) -> Orbit {
        let earth = Attractor::new(398_600.4418, 6378.1366).unwrap();
        Orbit::circular(earth, 7000.0 - 6378.1366, inc_deg.to_radians(), 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn leo_to_geo_with_plane_change() {
        let plan = change_a_inc(&leo(28.5), 42_166.0, 0.0, 3.5e-7).unwrap();
        assert_relative_eq!(plan.estimate.delta_v().unwrap(), 5.78377, max_relative = 1e-5);
        let days = seconds_to_days(plan.estimate.time_of_flight().unwrap());
        assert_relative_eq!(days, 191.262, max_relative = 1e-5);
    }

    #[test]
    fn polar_leo_to_geo() {
        let plan = change_a_inc(&leo(90.0), 42_166.0, 0.0, 3.5e-7).unwrap();
        assert_relative_eq!(plan.estimate.delta_v().unwrap(), 10.13143, max_relative = 1e-5);
    }

    #[test]
    fn coplanar_change_is_the_speed_difference() {
        let plan = change_a_inc(&leo(10.0), 8000.0, 10.0_f64.to_radians(), 1e-6).unwrap();
        let k = 398_600.4418_f64;
        let expected = (k / 7000.0).sqrt() - (k / 8000.0).sqrt();
        assert_relative_eq!(plan.estimate.delta_v().unwrap(), expected, max_relative = 1e-6);
        // raising the orbit thrusts along the velocity
        let orbit = leo(10.0);
        let a = plan.law.acceleration(0.0, &orbit.state(), k);
        let t_hat = vector::unit(&orbit.v()).unwrap();
        assert_relative_eq!(vector::dot(&a, &t_hat), 1e-6, max_relative = 1e-9);
    }

    #[test]
    fn yaw_angle_grows_toward_the_end_of_the_burn() {
        let plan = change_a_inc(&leo(28.5), 42_166.0, 0.0, 3.5e-7).unwrap();
        let t_f = plan.estimate.time_of_flight().unwrap();
        assert_relative_eq!(plan.law.beta(0.0), plan.law.beta_0, max_relative = 1e-12);
        assert!(plan.law.beta(0.5 * t_f) > plan.law.beta_0);
    }
}
