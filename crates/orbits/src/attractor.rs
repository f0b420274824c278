use astro_core::{OrbitError, Result};
use serde::{Deserialize, Serialize};

/// Central body an orbit is expressed around.
///
/// `k` is the gravitational parameter and `radius` the equatorial radius, in
/// whatever consistent units the caller works in (km³/s² and km throughout the
/// bundled catalogs). Zonal coefficients are optional and only consumed by the
/// matching perturbation models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub k: f64,
    pub radius: f64,
    #[serde(default)]
    pub j2: Option<f64>,
    #[serde(default)]
    pub j3: Option<f64>,
}

impl Attractor {
    pub fn new(k: f64, radius: f64) -> Result<Self> {
        if !(k.is_finite() && k > 0.0) {
            return Err(OrbitError::domain(format!(
                "gravitational parameter must be positive, got {k}"
            )));
        }
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(OrbitError::domain(format!(
                "attractor radius must be non-negative, got {radius}"
            )));
        }
        Ok(Self {
            k,
            radius,
            j2: None,
            j3: None,
        })
    }

    pub fn with_j2(mut self, j2: f64) -> Self {
        self.j2 = Some(j2);
        self
    }

    pub fn with_j3(mut self, j3: f64) -> Self {
        self.j3 = Some(j3);
        self
    }

    /// Circular speed at radius `r`.
    pub fn circular_velocity(&self, r: f64) -> f64 {
        (self.k / r).sqrt()
    }

    /// Escape speed at radius `r`.
    pub fn escape_velocity(&self, r: f64) -> f64 {
        (2.0 * self.k / r).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_parameter() {
        assert!(Attractor::new(0.0, 6378.0).unwrap_err().is_domain());
        assert!(Attractor::new(-1.0, 6378.0).is_err());
        assert!(Attractor::new(f64::NAN, 6378.0).is_err());
    }

    #[test]
    fn escape_is_sqrt_two_times_circular() {
        let earth = Attractor::new(398_600.4418, 6378.1366).unwrap();
        let r = 7000.0;
        let ratio = earth.escape_velocity(r) / earth.circular_velocity(r);
        assert!((ratio - 2f64.sqrt()).abs() < 1e-14);
    }
}
