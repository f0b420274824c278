//! Continuous-thrust guidance laws.
//!
//! Each law is an [`AccelerationModel`](astro_propagation::AccelerationModel)
//! of fixed magnitude `f`, handed to Cowell propagation, plus an analytic
//! delta-v and burn-time estimate.

pub mod argp;
pub mod ecc_inc;
pub mod edelbaum;
pub mod estimate;

pub use argp::{ArgpGuidance, change_argp};
pub use ecc_inc::{EccIncGuidance, change_ecc_inc};
pub use edelbaum::{EdelbaumGuidance, change_a_inc};
pub use estimate::{ThrustPlan, TimeOfFlightEstimate};

use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};

fn check_thrust(f: f64) -> Result<()> {
    if f.is_finite() && f > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::domain(format!(
            "thrust acceleration must be positive and finite, got {f}"
        )))
    }
}

fn eccentricity_vector(k: f64, r: &Vector3, v: &Vector3) -> Vector3 {
    let r_norm = vector::norm(r);
    let v2 = vector::dot(v, v);
    let rv = vector::dot(r, v);
    vector::scale(&vector::lin_comb(r, v2 - k / r_norm, v, -rv), 1.0 / k)
}
