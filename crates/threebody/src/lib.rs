//! Circular restricted three-body problem: Lagrange points.
//!
//! Masses only enter through their ratio, so gravitational parameters can be
//! passed in place of masses.

use astro_core::roots::{BrentOptions, brentq};
use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};
use astro_orbits::Orbit;

/// `sin(60°)`: L4 and L5 sit at the apex of equilateral triangles on the primaries.
const SIN_60: f64 = 0.866_025_403_784_438_6;

fn check_masses(m1: f64, m2: f64) -> Result<()> {
    if !(m2.is_finite() && m2 > 0.0 && m1.is_finite()) || m1 <= m2 {
        return Err(OrbitError::domain(format!(
            "primary must be heavier than a positive secondary (m1 = {m1}, m2 = {m2})"
        )));
    }
    Ok(())
}

/// Distances of L1..L5 from the primary, projected on the primary → secondary axis.
///
/// L1, L2 and L3 are roots of the collinear equilibrium condition (found by
/// Brent's method); L4 and L5 project onto the midpoint.
pub fn lagrange_points(r12: f64, m1: f64, m2: f64) -> Result<[f64; 5]> {
    check_masses(m1, m2)?;
    if !(r12.is_finite() && r12 > 0.0) {
        return Err(OrbitError::domain(format!(
            "distance between primaries must be positive, got {r12}"
        )));
    }
    let mu = m2 / (m1 + m2);

    // barycentric abscissa xi in units of r12; primary at -mu, secondary at 1 - mu
    let equilibrium = |xi: f64| {
        let d1 = xi + mu;
        let d2 = xi + mu - 1.0;
        (1.0 - mu) * d1 / d1.abs().powi(3) + mu * d2 / d2.abs().powi(3) - xi
    };
    let options = BrentOptions::default();
    let margin = 1e-11;
    let l1 = brentq(equilibrium, -mu + margin, 1.0 - mu - margin, options)?;
    let l2 = brentq(equilibrium, 1.0, 1.5, options)?;
    let l3 = brentq(equilibrium, -1.5, -1.0, options)?;

    Ok([
        (l1 + mu) * r12,
        (l2 + mu) * r12,
        (l3 + mu) * r12,
        0.5 * r12,
        0.5 * r12,
    ])
}

/// Positions of L1..L5 in the frame of `r1` and `r2`, with `n` normal to the
/// plane of motion.
pub fn lagrange_points_vec(
    m1: f64,
    r1: &Vector3,
    m2: f64,
    r2: &Vector3,
    n: &Vector3,
) -> Result<[Vector3; 5]> {
    check_masses(m1, m2)?;
    let separation = vector::sub(r2, r1);
    let r12 = vector::norm(&separation);
    let ux = vector::unit(&separation)
        .ok_or_else(|| OrbitError::domain("primaries are at the same position"))?;
    let uy = vector::cross(n, &ux);
    if vector::norm(&uy) <= 1e-12 * vector::norm(n) {
        return Err(OrbitError::domain(
            "normal vector is zero or parallel to the primary-secondary axis",
        ));
    }
    let uy = vector::scale(&uy, 1.0 / vector::norm(&uy));

    let x = lagrange_points(r12, m1, m2)?;
    let y4 = SIN_60 * r12;
    let at = |x: f64, y: f64| vector::add(r1, &vector::lin_comb(&ux, x, &uy, y));
    Ok([
        at(x[0], 0.0),
        at(x[1], 0.0),
        at(x[2], 0.0),
        at(x[3], y4),
        at(x[4], -y4),
    ])
}

/// Lagrange points of a secondary following `orbit` around a primary at the
/// origin.
pub fn lagrange_points_from_orbit(m1: f64, m2: f64, orbit: &Orbit) -> Result<[Vector3; 5]> {
    lagrange_points_vec(m1, &[0.0; 3], m2, &orbit.r(), &orbit.h_vec())
}
