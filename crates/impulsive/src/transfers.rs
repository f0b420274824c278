//! Analytic budgets for transfers between circular, coplanar orbits.
//!
//! Burns are signed: positive adds speed along the direction of motion, negative
//! is a retrograde burn. Totals are sums of magnitudes.

use std::f64::consts::PI;

use astro_core::{OrbitError, Result};
use serde::Serialize;

/// Hohmann transfer between circular orbits of radii `r1` and `r2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HohmannBudget {
    pub dv1: f64,
    pub dv2: f64,
    pub dv_total: f64,
    pub time_of_flight: f64,
}

/// Bi-elliptic transfer through an intermediate apoapsis radius `rb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiEllipticBudget {
    pub rb: f64,
    pub dv1: f64,
    pub dv2: f64,
    pub dv3: f64,
    pub dv_total: f64,
    pub time_of_flight: f64,
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::domain(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Speed on an orbit of semimajor axis `a` at radius `r` (vis-viva).
pub(crate) fn vis_viva(k: f64, r: f64, a: f64) -> f64 {
    (k * (2.0 / r - 1.0 / a)).sqrt()
}

/// Half the period of an ellipse with semimajor axis `a`.
pub(crate) fn half_period(k: f64, a: f64) -> f64 {
    PI * (a * a * a / k).sqrt()
}

pub fn hohmann(r1: f64, r2: f64, k: f64) -> Result<HohmannBudget> {
    check_positive("initial radius", r1)?;
    check_positive("final radius", r2)?;
    check_positive("gravitational parameter", k)?;

    let a_t = 0.5 * (r1 + r2);
    // inward transfers give a negative departure burn and a negative capture burn
    let dv1 = vis_viva(k, r1, a_t) - (k / r1).sqrt();
    let dv2 = (k / r2).sqrt() - vis_viva(k, r2, a_t);

    Ok(HohmannBudget {
        dv1,
        dv2,
        dv_total: dv1.abs() + dv2.abs(),
        time_of_flight: half_period(k, a_t),
    })
}

/// Bi-elliptic budget for a given `rb`; `rb` is not optimized.
///
/// For `r2 / r1` beyond about 11.94 a large enough `rb` beats Hohmann.
pub fn bi_elliptic(r1: f64, r2: f64, rb: f64, k: f64) -> Result<BiEllipticBudget> {
    check_positive("initial radius", r1)?;
    check_positive("final radius", r2)?;
    check_positive("intermediate radius", rb)?;
    check_positive("gravitational parameter", k)?;

    let a1 = 0.5 * (r1 + rb);
    let a2 = 0.5 * (rb + r2);
    let dv1 = vis_viva(k, r1, a1) - (k / r1).sqrt();
    let dv2 = vis_viva(k, rb, a2) - vis_viva(k, rb, a1);
    let dv3 = (k / r2).sqrt() - vis_viva(k, r2, a2);

    Ok(BiEllipticBudget {
        rb,
        dv1,
        dv2,
        dv3,
        dv_total: dv1.abs() + dv2.abs() + dv3.abs(),
        time_of_flight: half_period(k, a1) + half_period(k, a2),
    })
}
