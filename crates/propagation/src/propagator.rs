use astro_core::vector::Vector3;
use astro_core::{OrbitError, Result};
use astro_orbits::Orbit;
use rayon::prelude::*;

/// Strategy for advancing a two-body state in time.
pub trait Propagator {
    /// Advance `(r0, v0)` around an attractor of gravitational parameter `k` by `tof`.
    fn propagate_state(
        &self,
        k: f64,
        r0: &Vector3,
        v0: &Vector3,
        tof: f64,
    ) -> Result<(Vector3, Vector3)>;

    fn name(&self) -> &'static str {
        "propagator"
    }
}

/// Propagate `orbit` by `tof`; the result's epoch is `orbit.epoch() + tof`.
pub fn propagate<P>(orbit: &Orbit, tof: f64, method: &P) -> Result<Orbit>
where
    P: Propagator + ?Sized,
{
    if !tof.is_finite() {
        return Err(OrbitError::domain(format!("time of flight must be finite, got {tof}")));
    }
    let (r, v) = method.propagate_state(orbit.k(), &orbit.r(), &orbit.v(), tof)?;
    orbit.with_state(r, v, orbit.epoch() + tof)
}

/// States at each offset (seconds from `orbit.epoch()`), each propagated from the
/// original orbit.
pub fn sample<P>(orbit: &Orbit, offsets: &[f64], method: &P) -> Result<Vec<Orbit>>
where
    P: Propagator + ?Sized,
{
    offsets
        .iter()
        .map(|&dt| propagate(orbit, dt, method))
        .collect()
}

/// Propagate many orbits by the same `tof` in parallel.
pub fn propagate_many<P>(orbits: &[Orbit], tof: f64, method: &P) -> Vec<Result<Orbit>>
where
    P: Propagator + Sync + ?Sized,
{
    orbits
        .par_iter()
        .map(|orbit| propagate(orbit, tof, method))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kepler::Kepler;
    use astro_orbits::Attractor;

    fn leo() -> Orbit {
        let earth = Attractor::new(398_600.4418, 6378.1366).unwrap();
        Orbit::circular(earth, 500.0, 0.9, 0.1, 0.0, 100.0).unwrap()
    }

    #[test]
    fn propagate_advances_the_epoch() {
        let orbit = leo();
        let later = propagate(&orbit, 600.0, &Kepler::default()).unwrap();
        assert_eq!(later.epoch(), 700.0);
        assert_eq!(later.attractor(), orbit.attractor());
        // the input is untouched
        assert_eq!(orbit.epoch(), 100.0);
    }

    #[test]
    fn sample_includes_the_initial_state_for_zero_offset() {
        let orbit = leo();
        let states = sample(&orbit, &[0.0, 100.0, 200.0], &Kepler::default()).unwrap();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].r(), orbit.r());
        assert_eq!(states[2].epoch(), 300.0);
    }

    #[test]
    fn parallel_propagation_matches_serial() {
        let base = leo();
        let orbits: Vec<Orbit> = (0..8)
            .map(|i| propagate(&base, 250.0 * i as f64, &Kepler::default()).unwrap())
            .collect();
        let parallel = propagate_many(&orbits, 1800.0, &Kepler::default());
        for (orbit, result) in orbits.iter().zip(parallel) {
            let serial = propagate(orbit, 1800.0, &Kepler::default()).unwrap();
            assert_eq!(result.unwrap(), serial);
        }
    }

    #[test]
    fn non_finite_time_is_rejected() {
        assert!(
            propagate(&leo(), f64::INFINITY, &Kepler::default())
                .unwrap_err()
                .is_domain()
        );
    }
}
