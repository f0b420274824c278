//! Perturbing accelerations for Cowell propagation.
//!
//! Every model computes its own contribution only; the central `-k r / |r|³` term
//! is added by the propagator. Models compose by summation with
//! [`AccelerationModel::plus`], and any closure `Fn(t, &state, k) -> [f64; 3]`
//! is a model too.

use astro_core::vector::{self, State6, Vector3};

/// Perturbing acceleration as a function of time since propagation start, the
/// Cartesian state, and the attractor's gravitational parameter.
pub trait AccelerationModel {
    fn acceleration(&self, t: f64, state: &State6, k: f64) -> Vector3;

    /// Name used in log output.
    fn name(&self) -> &'static str {
        "acceleration"
    }

    /// Sum of this model and `other`.
    fn plus<B>(self, other: B) -> Sum<Self, B>
    where
        Self: Sized,
        B: AccelerationModel,
    {
        Sum(self, other)
    }
}

impl<F> AccelerationModel for F
where
    F: Fn(f64, &State6, f64) -> Vector3,
{
    fn acceleration(&self, t: f64, state: &State6, k: f64) -> Vector3 {
        self(t, state, k)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}

/// Pointwise sum of two models.
#[derive(Debug, Clone, Copy)]
pub struct Sum<A, B>(pub A, pub B);

impl<A, B> AccelerationModel for Sum<A, B>
where
    A: AccelerationModel,
    B: AccelerationModel,
{
    fn acceleration(&self, t: f64, state: &State6, k: f64) -> Vector3 {
        vector::add(
            &self.0.acceleration(t, state, k),
            &self.1.acceleration(t, state, k),
        )
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

/// Pure two-body motion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPerturbation;

impl AccelerationModel for NoPerturbation {
    fn acceleration(&self, _t: f64, _state: &State6, _k: f64) -> Vector3 {
        [0.0; 3]
    }

    fn name(&self) -> &'static str {
        "two_body"
    }
}

/// Second zonal harmonic (oblateness).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct J2Perturbation {
    pub j2: f64,
    /// Equatorial radius of the attractor.
    pub radius: f64,
}

impl J2Perturbation {
    pub fn new(j2: f64, radius: f64) -> Self {
        Self { j2, radius }
    }
}

impl AccelerationModel for J2Perturbation {
    fn acceleration(&self, _t: f64, state: &State6, k: f64) -> Vector3 {
        let [x, y, z, ..] = *state;
        let r2 = x * x + y * y + z * z;
        let r = r2.sqrt();
        // 3/2 J2 k R² / r⁵
        let factor = 1.5 * self.j2 * k * self.radius * self.radius / (r2 * r2 * r);
        let z2_r2 = 5.0 * z * z / r2;
        [
            factor * x * (z2_r2 - 1.0),
            factor * y * (z2_r2 - 1.0),
            factor * z * (z2_r2 - 3.0),
        ]
    }

    fn name(&self) -> &'static str {
        "j2"
    }
}

/// Third zonal harmonic (pear shape).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct J3Perturbation {
    pub j3: f64,
    pub radius: f64,
}

impl J3Perturbation {
    pub fn new(j3: f64, radius: f64) -> Self {
        Self { j3, radius }
    }
}

impl AccelerationModel for J3Perturbation {
    fn acceleration(&self, _t: f64, state: &State6, k: f64) -> Vector3 {
        let [x, y, z, ..] = *state;
        let r2 = x * x + y * y + z * z;
        let r = r2.sqrt();
        let factor = 0.5 * k * self.j3 * self.radius.powi(3) / (r2 * r2 * r);
        let cos_phi = z / r;
        let c2 = cos_phi * cos_phi;

        let horizontal = 5.0 * (7.0 * c2 * cos_phi - 3.0 * cos_phi) / r;
        [
            factor * x * horizontal,
            factor * y * horizontal,
            factor * 3.0 * (35.0 / 3.0 * c2 * c2 - 10.0 * c2 + 1.0),
        ]
    }

    fn name(&self) -> &'static str {
        "j3"
    }
}

/// Drag in a non-rotating exponential atmosphere.
///
/// `rho0` is the density at `reference_altitude`, and `ballistic_factor` is
/// `C_D · A / m`. Units must be consistent with the state (e.g. kg/km³ and km²/kg
/// for a km-based state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericDrag {
    pub radius: f64,
    pub rho0: f64,
    pub reference_altitude: f64,
    pub scale_height: f64,
    pub ballistic_factor: f64,
}

impl AtmosphericDrag {
    pub fn density(&self, r: &Vector3) -> f64 {
        let altitude = vector::norm(r) - self.radius;
        self.rho0 * (-(altitude - self.reference_altitude) / self.scale_height).exp()
    }
}

impl AccelerationModel for AtmosphericDrag {
    fn acceleration(&self, _t: f64, state: &State6, _k: f64) -> Vector3 {
        let (r, v) = vector::split(state);
        let speed = vector::norm(&v);
        let rho = self.density(&r);
        vector::scale(&v, -0.5 * rho * self.ballistic_factor * speed)
    }

    fn name(&self) -> &'static str {
        "drag"
    }
}

/// Point-mass perturbation from a third body whose position relative to the
/// attractor is supplied by `position(t)`.
#[derive(Debug, Clone, Copy)]
pub struct ThirdBody<F> {
    pub k_body: f64,
    pub position: F,
}

impl<F> ThirdBody<F>
where
    F: Fn(f64) -> Vector3,
{
    pub fn new(k_body: f64, position: F) -> Self {
        Self { k_body, position }
    }
}

impl<F> AccelerationModel for ThirdBody<F>
where
    F: Fn(f64) -> Vector3,
{
    fn acceleration(&self, t: f64, state: &State6, _k: f64) -> Vector3 {
        let (r, _) = vector::split(state);
        let body = (self.position)(t);
        let rel = vector::sub(&body, &r);
        let rel_norm = vector::norm(&rel);
        let body_norm = vector::norm(&body);
        // direct attraction minus the indirect acceleration of the attractor
        vector::lin_comb(
            &rel,
            self.k_body / rel_norm.powi(3),
            &body,
            -self.k_body / body_norm.powi(3),
        )
    }

    fn name(&self) -> &'static str {
        "third_body"
    }
}

/// Solar radiation pressure with a cylindrical shadow cast by the attractor.
///
/// `power_over_c` is the star's luminosity divided by the speed of light, in the
/// same length units as the state; `star(t)` gives the star position relative to
/// the attractor.
#[derive(Debug, Clone, Copy)]
pub struct RadiationPressure<F> {
    pub radius: f64,
    pub c_r: f64,
    pub area_to_mass: f64,
    pub power_over_c: f64,
    pub star: F,
}

impl<F> AccelerationModel for RadiationPressure<F>
where
    F: Fn(f64) -> Vector3,
{
    fn acceleration(&self, t: f64, state: &State6, _k: f64) -> Vector3 {
        let (r, _) = vector::split(state);
        let star = (self.star)(t);
        if line_of_sight(&r, &star, self.radius) < 0.0 {
            return [0.0; 3];
        }
        let star_norm = vector::norm(&star);
        let pressure = self.power_over_c / (star_norm * star_norm);
        vector::scale(&star, -pressure * self.c_r * self.area_to_mass / star_norm)
    }

    fn name(&self) -> &'static str {
        "radiation_pressure"
    }
}

/// Visibility between two position vectors past a spherical body of `radius`.
///
/// Positive when the segment clears the body, negative when it is blocked.
pub fn line_of_sight(r1: &Vector3, r2: &Vector3, radius: f64) -> f64 {
    let r1_norm = vector::norm(r1);
    let r2_norm = vector::norm(r2);
    let theta = (vector::dot(r1, r2) / (r1_norm * r2_norm))
        .clamp(-1.0, 1.0)
        .acos();
    let theta_1 = (radius / r1_norm).clamp(-1.0, 1.0).acos();
    let theta_2 = (radius / r2_norm).clamp(-1.0, 1.0).acos();
    theta_1 + theta_2 - theta
}
