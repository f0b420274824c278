//! Two-body propagation by advancing the mean anomaly.
//!
//! Slower and less robust near e = 1 than [`Kepler`](crate::Kepler), but handy as an
//! independent cross-check because it goes through the element set.

use astro_core::vector::{self, Vector3};
use astro_core::Result;
use astro_orbits::anomaly;
use astro_orbits::{OrbitKind, to_classical, to_vectors, to_vectors_with_p};

use crate::propagator::Propagator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanMotion;

impl Propagator for MeanMotion {
    fn propagate_state(
        &self,
        k: f64,
        r0: &Vector3,
        v0: &Vector3,
        tof: f64,
    ) -> Result<(Vector3, Vector3)> {
        if tof == 0.0 {
            return Ok((*r0, *v0));
        }
        let elements = to_classical(k, r0, v0)?;
        let ecc = elements.ecc;
        let nu0 = elements.nu();

        match elements.kind() {
            OrbitKind::Circular | OrbitKind::Elliptic => {
                let a = elements.a;
                let n = (k / (a * a * a)).sqrt();
                let m0 = anomaly::eccentric_to_mean(anomaly::nu_to_eccentric(nu0, ecc), ecc);
                let ea = anomaly::mean_to_eccentric(m0 + n * tof, ecc)?;
                to_vectors(k, &elements.with_nu(anomaly::eccentric_to_nu(ea, ecc)))
            }
            OrbitKind::Hyperbolic => {
                let a = -elements.a;
                let n = (k / (a * a * a)).sqrt();
                let m0 = anomaly::hyperbolic_to_mean(anomaly::nu_to_hyperbolic(nu0, ecc), ecc);
                let fa = anomaly::mean_to_hyperbolic(m0 + n * tof, ecc)?;
                to_vectors(k, &elements.with_nu(anomaly::hyperbolic_to_nu(fa, ecc)))
            }
            OrbitKind::Parabolic => {
                let h = vector::norm(&vector::cross(r0, v0));
                let p = h * h / k;
                let n = 2.0 * (k / (p * p * p)).sqrt();
                let m0 = anomaly::parabolic_to_mean(anomaly::nu_to_parabolic(nu0));
                let d = anomaly::mean_to_parabolic(m0 + n * tof);
                to_vectors_with_p(k, p, &elements.with_nu(anomaly::parabolic_to_nu(d)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "mean_motion"
    }
}
