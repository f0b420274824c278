//! Conversion between Cartesian state vectors and classical orbital elements.
//!
//! Circular and equatorial orbits leave some of the classical angles undefined.
//! Instead of filling them with sentinels the element set carries an explicit
//! [`OrbitGeometry`] variant holding only the angles that are meaningful, and the
//! accessors on [`ClassicalElements`] apply the usual conventions
//! (ω = 0 for circular orbits, Ω = 0 for equatorial ones).

use std::f64::consts::FRAC_PI_2;

use astro_core::angle::{wrap_pi, wrap_two_pi};
use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};
use serde::{Deserialize, Serialize};

use crate::GEOMETRY_TOL;

/// Conic section classification by eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitKind {
    Circular,
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl OrbitKind {
    pub fn from_eccentricity(ecc: f64) -> Self {
        if ecc < GEOMETRY_TOL {
            OrbitKind::Circular
        } else if (ecc - 1.0).abs() < GEOMETRY_TOL {
            OrbitKind::Parabolic
        } else if ecc < 1.0 {
            OrbitKind::Elliptic
        } else {
            OrbitKind::Hyperbolic
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, OrbitKind::Circular | OrbitKind::Elliptic)
    }
}

/// Orientation angles that are defined for a given orbit shape (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrbitGeometry {
    /// Inclined and eccentric: all three angles exist.
    General { raan: f64, argp: f64, nu: f64 },
    /// Inclined circular orbit: position measured from the ascending node.
    Circular { raan: f64, arglat: f64 },
    /// Equatorial eccentric orbit: periapsis measured from the reference direction.
    Equatorial { lonper: f64, nu: f64 },
    /// Equatorial circular orbit: only the true longitude survives.
    CircularEquatorial { truelon: f64 },
}

/// Classical (Keplerian) element set.
///
/// `a` is negative for hyperbolic orbits and infinite for parabolic ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassicalElements {
    pub a: f64,
    pub ecc: f64,
    pub inc: f64,
    pub geometry: OrbitGeometry,
}

impl ClassicalElements {
    /// Build an element set from the six classical values, collapsing the angles that
    /// are undefined for circular and/or equatorial shapes.
    pub fn new(a: f64, ecc: f64, inc: f64, raan: f64, argp: f64, nu: f64) -> Self {
        let circular = ecc < GEOMETRY_TOL;
        let equatorial = inc.sin().abs() < GEOMETRY_TOL;
        let retrograde = inc > FRAC_PI_2;

        let geometry = match (circular, equatorial) {
            (false, false) => OrbitGeometry::General {
                raan: wrap_two_pi(raan),
                argp: wrap_two_pi(argp),
                nu: wrap_pi(nu),
            },
            (true, false) => OrbitGeometry::Circular {
                raan: wrap_two_pi(raan),
                arglat: wrap_pi(argp + nu),
            },
            (false, true) => {
                let lonper = if retrograde { argp - raan } else { raan + argp };
                OrbitGeometry::Equatorial {
                    lonper: wrap_two_pi(lonper),
                    nu: wrap_pi(nu),
                }
            }
            (true, true) => {
                let truelon = if retrograde {
                    argp + nu - raan
                } else {
                    raan + argp + nu
                };
                OrbitGeometry::CircularEquatorial {
                    truelon: wrap_pi(truelon),
                }
            }
        };

        Self {
            a,
            ecc,
            inc,
            geometry,
        }
    }

    /// Right ascension of the ascending node; zero when undefined.
    pub fn raan(&self) -> f64 {
        match self.geometry {
            OrbitGeometry::General { raan, .. } | OrbitGeometry::Circular { raan, .. } => raan,
            OrbitGeometry::Equatorial { .. } | OrbitGeometry::CircularEquatorial { .. } => 0.0,
        }
    }

    /// Argument of periapsis; the longitude of periapsis for equatorial orbits, zero
    /// for circular ones.
    pub fn argp(&self) -> f64 {
        match self.geometry {
            OrbitGeometry::General { argp, .. } => argp,
            OrbitGeometry::Equatorial { lonper, .. } => lonper,
            OrbitGeometry::Circular { .. } | OrbitGeometry::CircularEquatorial { .. } => 0.0,
        }
    }

    /// True anomaly; the argument of latitude or true longitude for circular orbits.
    pub fn nu(&self) -> f64 {
        match self.geometry {
            OrbitGeometry::General { nu, .. } | OrbitGeometry::Equatorial { nu, .. } => nu,
            OrbitGeometry::Circular { arglat, .. } => arglat,
            OrbitGeometry::CircularEquatorial { truelon } => truelon,
        }
    }

    pub fn kind(&self) -> OrbitKind {
        OrbitKind::from_eccentricity(self.ecc)
    }

    /// Same shape and orientation with the anomaly-like angle replaced (true anomaly,
    /// argument of latitude, or true longitude depending on the geometry).
    pub fn with_nu(&self, nu: f64) -> Self {
        let nu = wrap_pi(nu);
        let geometry = match self.geometry {
            OrbitGeometry::General { raan, argp, .. } => OrbitGeometry::General { raan, argp, nu },
            OrbitGeometry::Circular { raan, .. } => OrbitGeometry::Circular { raan, arglat: nu },
            OrbitGeometry::Equatorial { lonper, .. } => OrbitGeometry::Equatorial { lonper, nu },
            OrbitGeometry::CircularEquatorial { .. } => {
                OrbitGeometry::CircularEquatorial { truelon: nu }
            }
        };
        Self { geometry, ..*self }
    }
}

/// Convert a Cartesian state into classical elements.
///
/// Fails with a domain error for zero position or velocity, rectilinear motion
/// (vanishing angular momentum), or a non-positive gravitational parameter.
pub fn to_classical(k: f64, r: &Vector3, v: &Vector3) -> Result<ClassicalElements> {
    check_parameter(k)?;
    if !vector::is_finite(r) || !vector::is_finite(v) {
        return Err(OrbitError::domain("state vector contains non-finite components"));
    }
    let r_norm = vector::norm(r);
    let v_norm = vector::norm(v);
    if r_norm == 0.0 {
        return Err(OrbitError::domain("position vector has zero magnitude"));
    }
    if v_norm == 0.0 {
        return Err(OrbitError::domain("velocity vector has zero magnitude"));
    }

    let h = vector::cross(r, v);
    let h_norm = vector::norm(&h);
    if h_norm <= 1e-10 * r_norm * v_norm {
        return Err(OrbitError::domain(format!(
            "rectilinear trajectory: |h| = {h_norm:e} for |r| = {r_norm}, |v| = {v_norm}"
        )));
    }
    let h_hat = vector::scale(&h, 1.0 / h_norm);

    let rv = vector::dot(r, v);
    let e_vec = vector::scale(
        &vector::lin_comb(r, v_norm * v_norm - k / r_norm, v, -rv),
        1.0 / k,
    );
    let ecc = vector::norm(&e_vec);
    let p = h_norm * h_norm / k;
    let a = if (ecc - 1.0).abs() < GEOMETRY_TOL {
        f64::INFINITY
    } else {
        p / (1.0 - ecc * ecc)
    };
    let inc = h_hat[2].clamp(-1.0, 1.0).acos();

    let node = [-h[1], h[0], 0.0];
    let circular = ecc < GEOMETRY_TOL;
    let equatorial = vector::norm(&node) < GEOMETRY_TOL * h_norm;
    let x_hat = [1.0, 0.0, 0.0];

    let geometry = match (circular, equatorial) {
        (false, false) => OrbitGeometry::General {
            raan: wrap_two_pi(node[1].atan2(node[0])),
            argp: wrap_two_pi(signed_angle(&node, &e_vec, &h_hat)),
            nu: wrap_pi(signed_angle(&e_vec, r, &h_hat)),
        },
        (true, false) => OrbitGeometry::Circular {
            raan: wrap_two_pi(node[1].atan2(node[0])),
            arglat: wrap_pi(signed_angle(&node, r, &h_hat)),
        },
        (false, true) => OrbitGeometry::Equatorial {
            lonper: wrap_two_pi(signed_angle(&x_hat, &e_vec, &h_hat)),
            nu: wrap_pi(signed_angle(&e_vec, r, &h_hat)),
        },
        (true, true) => OrbitGeometry::CircularEquatorial {
            truelon: wrap_pi(signed_angle(&x_hat, r, &h_hat)),
        },
    };

    Ok(ClassicalElements {
        a,
        ecc,
        inc,
        geometry,
    })
}

/// Convert classical elements into a Cartesian state `(r, v)`.
///
/// Parabolic element sets are rejected because `a` is infinite and the semi-latus
/// rectum cannot be recovered; hyperbolic anomalies beyond the asymptote are rejected
/// as well.
pub fn to_vectors(k: f64, elements: &ClassicalElements) -> Result<(Vector3, Vector3)> {
    check_parameter(k)?;
    let ClassicalElements { a, ecc, .. } = *elements;
    if elements.kind() == OrbitKind::Parabolic || a.is_infinite() {
        return Err(OrbitError::domain(
            "parabolic element set: semi-major axis is infinite",
        ));
    }
    let p = a * (1.0 - ecc * ecc);
    if !(p.is_finite() && p > 0.0) {
        return Err(OrbitError::domain(format!(
            "semi-major axis {a} is inconsistent with eccentricity {ecc}"
        )));
    }
    to_vectors_with_p(k, p, elements)
}

/// Like [`to_vectors`] but with the semi-latus rectum supplied explicitly, which
/// also covers parabolic orbits. `elements.a` is ignored.
pub fn to_vectors_with_p(
    k: f64,
    p: f64,
    elements: &ClassicalElements,
) -> Result<(Vector3, Vector3)> {
    check_parameter(k)?;
    let ClassicalElements { ecc, inc, .. } = *elements;
    if !(ecc.is_finite() && ecc >= 0.0) {
        return Err(OrbitError::domain(format!(
            "eccentricity must be finite and non-negative, got {ecc}"
        )));
    }
    if !inc.is_finite() {
        return Err(OrbitError::domain("inclination must be finite"));
    }
    if !(p.is_finite() && p > 0.0) {
        return Err(OrbitError::domain(format!(
            "semi-latus rectum must be positive, got {p}"
        )));
    }

    let nu = elements.nu();
    let (sin_nu, cos_nu) = nu.sin_cos();
    let denom = 1.0 + ecc * cos_nu;
    if denom <= 0.0 {
        return Err(OrbitError::domain(format!(
            "true anomaly {nu} lies beyond the hyperbolic asymptote"
        )));
    }

    let r_mag = p / denom;
    let r_pqw = [r_mag * cos_nu, r_mag * sin_nu, 0.0];
    let speed = (k / p).sqrt();
    let v_pqw = [-speed * sin_nu, speed * (ecc + cos_nu), 0.0];

    let rotate = perifocal_to_inertial(elements.raan(), inc, elements.argp());
    Ok((rotate(&r_pqw), rotate(&v_pqw)))
}

fn check_parameter(k: f64) -> Result<()> {
    if k.is_finite() && k > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::domain(format!(
            "gravitational parameter must be positive, got {k}"
        )))
    }
}

/// Angle from `from` to `to` measured positively about `axis`.
fn signed_angle(from: &Vector3, to: &Vector3, axis: &Vector3) -> f64 {
    let sin = vector::dot(&vector::cross(from, to), axis);
    let cos = vector::dot(from, to);
    sin.atan2(cos)
}

fn perifocal_to_inertial(raan: f64, inc: f64, argp: f64) -> impl Fn(&Vector3) -> Vector3 {
    let (sin_raan, cos_raan) = raan.sin_cos();
    let (sin_inc, cos_inc) = inc.sin_cos();
    let (sin_argp, cos_argp) = argp.sin_cos();

    move |v: &Vector3| {
        [
            (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v[0]
                + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v[1],
            (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v[0]
                + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v[1],
            (sin_argp * sin_inc) * v[0] + (cos_argp * sin_inc) * v[1],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const K_EARTH: f64 = 398_600.0;

    fn assert_vec_close(a: &Vector3, b: &Vector3, rel: f64) {
        let scale = vector::norm(b).max(1.0);
        let diff = vector::norm(&vector::sub(a, b));
        assert!(diff <= rel * scale, "{a:?} vs {b:?} (diff {diff:e})");
    }

    fn round_trip(r: Vector3, v: Vector3) {
        let elements = to_classical(K_EARTH, &r, &v).expect("elements");
        let (r2, v2) = to_vectors(K_EARTH, &elements).expect("vectors");
        assert_vec_close(&r2, &r, 1e-8);
        assert_vec_close(&v2, &v, 1e-8);
    }

    #[test]
    fn curtis_example_4_3_elements() {
        let r = [-6045.0, -3490.0, 2500.0];
        let v = [-3.457, 6.618, 2.533];
        let elements = to_classical(K_EARTH, &r, &v).unwrap();

        assert_relative_eq!(elements.ecc, 0.1712, epsilon = 1e-4);
        assert_relative_eq!(elements.inc.to_degrees(), 153.25, epsilon = 0.01);
        assert_relative_eq!(elements.raan().to_degrees(), 255.3, epsilon = 0.05);
        assert_relative_eq!(elements.argp().to_degrees(), 20.07, epsilon = 0.05);
        assert_relative_eq!(elements.nu().to_degrees(), 28.45, epsilon = 0.05);
        assert_relative_eq!(elements.a, 8788.0, max_relative = 1e-3);
        assert!(matches!(elements.geometry, OrbitGeometry::General { .. }));
    }

    #[test]
    fn general_states_round_trip() {
        round_trip([-6045.0, -3490.0, 2500.0], [-3.457, 6.618, 2.533]);
        round_trip([7000.0, -1200.0, 300.0], [1.2, 6.9, 3.1]);
        // hyperbolic
        round_trip([6678.0, 0.0, 100.0], [0.0, 11.5, 4.0]);
    }

    #[test]
    fn degenerate_geometries_round_trip() {
        let rc = 7000.0;
        let vc = (K_EARTH / rc).sqrt();
        let inc = 0.9_f64;

        // circular inclined
        round_trip(
            [rc * 0.6, rc * 0.8, 0.0],
            [-vc * 0.8 * inc.cos(), vc * 0.6 * inc.cos(), vc * inc.sin()],
        );
        // equatorial prograde and retrograde eccentric
        round_trip([7000.0, 1000.0, 0.0], [-1.0, 8.2, 0.0]);
        round_trip([7000.0, 1000.0, 0.0], [1.0, -8.2, 0.0]);
        // circular equatorial, both senses
        round_trip([0.0, -rc, 0.0], [vc, 0.0, 0.0]);
        round_trip([0.0, -rc, 0.0], [-vc, 0.0, 0.0]);
    }

    #[test]
    fn degenerate_geometries_use_tagged_variants() {
        let rc = 7000.0;
        let vc = (K_EARTH / rc).sqrt();
        let elements = to_classical(K_EARTH, &[rc, 0.0, 0.0], &[0.0, vc, 0.0]).unwrap();
        assert!(matches!(
            elements.geometry,
            OrbitGeometry::CircularEquatorial { .. }
        ));
        assert_eq!(elements.raan(), 0.0);
        assert_eq!(elements.argp(), 0.0);
        assert_eq!(elements.kind(), OrbitKind::Circular);

        let elements = to_classical(K_EARTH, &[rc, 0.0, 0.0], &[0.0, 0.0, vc]).unwrap();
        match elements.geometry {
            OrbitGeometry::Circular { raan, arglat } => {
                assert_relative_eq!(raan, 0.0, epsilon = 1e-12);
                assert_relative_eq!(arglat, 0.0, epsilon = 1e-12);
            }
            other => panic!("expected circular geometry, got {other:?}"),
        }
        assert_relative_eq!(elements.inc, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn elements_constructor_matches_state_conversion() {
        let elements = ClassicalElements::new(
            9000.0,
            0.2,
            0.5,
            1.0,
            2.0,
            -0.7,
        );
        let (r, v) = to_vectors(K_EARTH, &elements).unwrap();
        let recovered = to_classical(K_EARTH, &r, &v).unwrap();
        assert_relative_eq!(recovered.a, 9000.0, max_relative = 1e-10);
        assert_relative_eq!(recovered.ecc, 0.2, epsilon = 1e-12);
        assert_relative_eq!(recovered.raan(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(recovered.argp(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(recovered.nu(), -0.7, epsilon = 1e-10);
    }

    #[test]
    fn collapsed_angles_place_the_body_identically() {
        // retrograde equatorial: (Ω, ω, ν) collapse into a single longitude
        let full = ClassicalElements {
            a: 8000.0,
            ecc: 0.0,
            inc: PI,
            geometry: OrbitGeometry::General {
                raan: 0.4,
                argp: 0.3,
                nu: 0.2,
            },
        };
        let collapsed = ClassicalElements::new(8000.0, 0.0, PI, 0.4, 0.3, 0.2);
        assert!(matches!(
            collapsed.geometry,
            OrbitGeometry::CircularEquatorial { .. }
        ));
        let (r1, v1) = to_vectors(K_EARTH, &full).unwrap();
        let (r2, v2) = to_vectors(K_EARTH, &collapsed).unwrap();
        assert_vec_close(&r2, &r1, 1e-12);
        assert_vec_close(&v2, &v1, 1e-12);
    }

    #[test]
    fn angles_are_normalized() {
        let elements = to_classical(K_EARTH, &[-6045.0, -3490.0, 2500.0], &[3.457, -6.618, -2.533])
            .unwrap();
        assert!((0.0..2.0 * PI).contains(&elements.raan()));
        assert!((0.0..2.0 * PI).contains(&elements.argp()));
        assert!(elements.nu() > -PI && elements.nu() <= PI);
    }

    #[test]
    fn degenerate_states_are_domain_errors() {
        let rectilinear = to_classical(K_EARTH, &[7000.0, 0.0, 0.0], &[3.0, 0.0, 0.0]);
        assert!(rectilinear.unwrap_err().is_domain());
        assert!(to_classical(K_EARTH, &[0.0; 3], &[0.0, 7.0, 0.0]).unwrap_err().is_domain());
        assert!(to_classical(K_EARTH, &[7000.0, 0.0, 0.0], &[0.0; 3]).unwrap_err().is_domain());
        assert!(to_classical(0.0, &[7000.0, 0.0, 0.0], &[0.0, 7.0, 0.0]).unwrap_err().is_domain());
    }

    #[test]
    fn parabolic_and_asymptotic_sets_are_rejected() {
        let rp = 7000.0;
        let vp = (2.0 * K_EARTH / rp).sqrt();
        let parabolic = to_classical(K_EARTH, &[rp, 0.0, 0.0], &[0.0, vp, 0.0]).unwrap();
        assert_eq!(parabolic.kind(), OrbitKind::Parabolic);
        assert!(parabolic.a.is_infinite());
        assert!(to_vectors(K_EARTH, &parabolic).unwrap_err().is_domain());

        let beyond = ClassicalElements::new(-10_000.0, 2.0, 0.3, 0.0, 0.0, 2.5);
        assert!(to_vectors(K_EARTH, &beyond).unwrap_err().is_domain());
    }
}
