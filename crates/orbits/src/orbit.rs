use std::f64::consts::TAU;

use astro_core::vector::{self, State6, Vector3};
use astro_core::{OrbitError, Result};
use serde::{Deserialize, Serialize};

use crate::anomaly;
use crate::attractor::Attractor;
use crate::elements::{ClassicalElements, OrbitKind, to_classical, to_vectors};

/// Immutable two-body orbit: a Cartesian state at an epoch around an attractor.
///
/// Propagation and maneuvers never mutate an `Orbit`; they return new values.
/// The epoch is a plain time tag in seconds on whatever scale the caller uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    attractor: Attractor,
    r: Vector3,
    v: Vector3,
    epoch: f64,
}

impl Orbit {
    pub fn from_vectors(attractor: Attractor, r: Vector3, v: Vector3, epoch: f64) -> Result<Self> {
        if !vector::is_finite(&r) || !vector::is_finite(&v) || !epoch.is_finite() {
            return Err(OrbitError::domain("orbit state must be finite"));
        }
        if vector::norm(&r) == 0.0 {
            return Err(OrbitError::domain("orbit position cannot be the attractor centre"));
        }
        Ok(Self {
            attractor,
            r,
            v,
            epoch,
        })
    }

    pub fn from_classical(
        attractor: Attractor,
        elements: &ClassicalElements,
        epoch: f64,
    ) -> Result<Self> {
        let (r, v) = to_vectors(attractor.k, elements)?;
        Self::from_vectors(attractor, r, v, epoch)
    }

    /// Circular orbit at `altitude` above the attractor's surface.
    pub fn circular(
        attractor: Attractor,
        altitude: f64,
        inc: f64,
        raan: f64,
        arglat: f64,
        epoch: f64,
    ) -> Result<Self> {
        let a = attractor.radius + altitude;
        if !a.is_finite() || a <= 0.0 {
            return Err(OrbitError::domain(format!(
                "circular orbit radius must be positive, got {a}"
            )));
        }
        let elements = ClassicalElements::new(a, 0.0, inc, raan, 0.0, arglat);
        Self::from_classical(attractor, &elements, epoch)
    }

    /// Same attractor, new state and epoch.
    pub fn with_state(&self, r: Vector3, v: Vector3, epoch: f64) -> Result<Self> {
        Self::from_vectors(self.attractor, r, v, epoch)
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }

    pub fn k(&self) -> f64 {
        self.attractor.k
    }

    pub fn r(&self) -> Vector3 {
        self.r
    }

    pub fn v(&self) -> Vector3 {
        self.v
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn state(&self) -> State6 {
        vector::join(&self.r, &self.v)
    }

    pub fn elements(&self) -> Result<ClassicalElements> {
        to_classical(self.attractor.k, &self.r, &self.v)
    }

    pub fn h_vec(&self) -> Vector3 {
        vector::cross(&self.r, &self.v)
    }

    pub fn e_vec(&self) -> Vector3 {
        let k = self.attractor.k;
        let r_norm = vector::norm(&self.r);
        let v2 = vector::dot(&self.v, &self.v);
        let rv = vector::dot(&self.r, &self.v);
        vector::scale(&vector::lin_comb(&self.r, v2 - k / r_norm, &self.v, -rv), 1.0 / k)
    }

    pub fn ecc(&self) -> f64 {
        vector::norm(&self.e_vec())
    }

    /// Specific orbital energy.
    pub fn energy(&self) -> f64 {
        0.5 * vector::dot(&self.v, &self.v) - self.attractor.k / vector::norm(&self.r)
    }

    /// Semi-major axis from the energy integral; infinite on a parabola.
    pub fn a(&self) -> f64 {
        if self.kind() == OrbitKind::Parabolic {
            f64::INFINITY
        } else {
            -self.attractor.k / (2.0 * self.energy())
        }
    }

    /// Semi-latus rectum.
    pub fn p(&self) -> f64 {
        let h = vector::norm(&self.h_vec());
        h * h / self.attractor.k
    }

    pub fn kind(&self) -> OrbitKind {
        OrbitKind::from_eccentricity(self.ecc())
    }

    /// Orbital period; `None` for open orbits.
    pub fn period(&self) -> Option<f64> {
        if !self.kind().is_closed() {
            return None;
        }
        let a = self.a();
        Some(TAU * (a * a * a / self.attractor.k).sqrt())
    }

    /// Mean motion `sqrt(k / |a|³)`; `None` on a parabola.
    pub fn mean_motion(&self) -> Option<f64> {
        let a = self.a();
        a.is_finite()
            .then(|| (self.attractor.k / (a.abs() * a.abs() * a.abs())).sqrt())
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.p() / (1.0 + self.ecc())
    }

    /// Apoapsis radius; `None` for open orbits.
    pub fn apoapsis_radius(&self) -> Option<f64> {
        self.kind()
            .is_closed()
            .then(|| self.p() / (1.0 - self.ecc()))
    }

    /// Signed time elapsed since periapsis passage, negative before periapsis.
    ///
    /// Closed orbits report a value in `(-P/2, P/2]`.
    pub fn time_since_periapsis(&self) -> Result<f64> {
        let elements = self.elements()?;
        let k = self.attractor.k;
        let ecc = elements.ecc;
        // circular orbits measure from the node or reference direction
        let nu = elements.nu();

        match elements.kind() {
            OrbitKind::Circular | OrbitKind::Elliptic => {
                let n = (k / elements.a.powi(3)).sqrt();
                let ea = anomaly::nu_to_eccentric(nu, ecc);
                Ok(anomaly::eccentric_to_mean(ea, ecc) / n)
            }
            OrbitKind::Hyperbolic => {
                let n = (k / (-elements.a).powi(3)).sqrt();
                let fa = anomaly::nu_to_hyperbolic(nu, ecc);
                Ok(anomaly::hyperbolic_to_mean(fa, ecc) / n)
            }
            OrbitKind::Parabolic => {
                let p = self.p();
                let d = anomaly::nu_to_parabolic(nu);
                Ok(anomaly::parabolic_to_mean(d) / (2.0 * (k / (p * p * p)).sqrt()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn earth() -> Attractor {
        Attractor::new(398_600.4418, 6378.1366).unwrap()
    }

    #[test]
    fn circular_orbit_has_expected_radius_and_speed() {
        let orbit = Orbit::circular(earth(), 700.0, 0.5, 1.0, 0.3, 0.0).unwrap();
        let r = 6378.1366 + 700.0;
        assert_relative_eq!(vector::norm(&orbit.r()), r, max_relative = 1e-12);
        assert_relative_eq!(
            vector::norm(&orbit.v()),
            (398_600.4418 / r).sqrt(),
            max_relative = 1e-12
        );
        assert_eq!(orbit.kind(), OrbitKind::Circular);
        assert_relative_eq!(orbit.elements().unwrap().inc, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn period_follows_keplers_third_law() {
        let elements = ClassicalElements::new(26_600.0, 0.74, 1.1, 0.0, 4.7, 0.0);
        let orbit = Orbit::from_classical(earth(), &elements, 0.0).unwrap();
        let expected = TAU * (26_600f64.powi(3) / 398_600.4418).sqrt();
        assert_relative_eq!(orbit.period().unwrap(), expected, max_relative = 1e-10);
        assert_relative_eq!(orbit.periapsis_radius(), 26_600.0 * 0.26, max_relative = 1e-10);
        assert_relative_eq!(orbit.apoapsis_radius().unwrap(), 26_600.0 * 1.74, max_relative = 1e-10);
    }

    #[test]
    fn open_orbits_have_no_period() {
        let orbit =
            Orbit::from_vectors(earth(), [7000.0, 0.0, 0.0], [0.0, 12.0, 0.0], 0.0).unwrap();
        assert_eq!(orbit.kind(), OrbitKind::Hyperbolic);
        assert!(orbit.period().is_none());
        assert!(orbit.a() < 0.0);
    }

    #[test]
    fn time_since_periapsis_is_zero_at_periapsis() {
        let elements = ClassicalElements::new(10_000.0, 0.3, 0.4, 0.2, 0.1, 0.0);
        let orbit = Orbit::from_classical(earth(), &elements, 0.0).unwrap();
        assert!(orbit.time_since_periapsis().unwrap().abs() < 1e-6);

        let before = ClassicalElements::new(10_000.0, 0.3, 0.4, 0.2, 0.1, -0.5);
        let orbit = Orbit::from_classical(earth(), &before, 0.0).unwrap();
        assert!(orbit.time_since_periapsis().unwrap() < 0.0);
    }

    #[test]
    fn origin_state_is_rejected() {
        assert!(
            Orbit::from_vectors(earth(), [0.0; 3], [1.0, 0.0, 0.0], 0.0)
                .unwrap_err()
                .is_domain()
        );
    }
}
