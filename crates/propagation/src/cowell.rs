//! Cowell's method: direct numerical integration of the perturbed two-body problem.

use astro_core::vector::{self, State6, Vector3};
use astro_core::{OrbitError, Result};
use log::debug;

use crate::integrator::{DormandPrince, OdeSystem, StepControl, Tolerances};
use crate::perturbations::{AccelerationModel, NoPerturbation};
use crate::propagator::Propagator;

/// Integrator settings for Cowell propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CowellSettings {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    pub min_step: f64,
    pub initial_step: Option<f64>,
}

impl Default for CowellSettings {
    fn default() -> Self {
        Self {
            rtol: 1e-11,
            atol: 1e-12,
            max_steps: 1_000_000,
            min_step: 0.0,
            initial_step: None,
        }
    }
}

/// Cowell propagator carrying its perturbation model.
#[derive(Debug, Clone, Copy)]
pub struct Cowell<A> {
    pub accel: A,
    pub settings: CowellSettings,
}

impl Cowell<NoPerturbation> {
    /// Unperturbed Cowell propagation, mostly useful as a numerical reference.
    pub fn two_body() -> Self {
        Self::new(NoPerturbation)
    }
}

impl<A: AccelerationModel> Cowell<A> {
    pub fn new(accel: A) -> Self {
        Self {
            accel,
            settings: CowellSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CowellSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.settings.rtol = rtol;
        self.settings.atol = atol;
        self
    }
}

impl<A: AccelerationModel> Propagator for Cowell<A> {
    fn propagate_state(
        &self,
        k: f64,
        r0: &Vector3,
        v0: &Vector3,
        tof: f64,
    ) -> Result<(Vector3, Vector3)> {
        propagate_cowell(k, r0, v0, tof, &self.accel, &self.settings)
    }

    fn name(&self) -> &'static str {
        "cowell"
    }
}

struct PerturbedTwoBody<'a, A: ?Sized> {
    k: f64,
    accel: &'a A,
}

impl<A: AccelerationModel + ?Sized> OdeSystem<6> for PerturbedTwoBody<'_, A> {
    fn rhs(&self, t: f64, y: &State6, dydt: &mut State6) {
        let (r, v) = vector::split(y);
        let r_norm = vector::norm(&r);
        let central = -self.k / (r_norm * r_norm * r_norm);
        let perturbation = self.accel.acceleration(t, y, self.k);
        dydt[..3].copy_from_slice(&v);
        for i in 0..3 {
            dydt[3 + i] = central * r[i] + perturbation[i];
        }
    }
}

/// Propagate `(r0, v0)` by `tof` under central gravity plus `accel`.
///
/// The model receives the time elapsed since `(r0, v0)`. The input state is never
/// modified. Fails with an integration error when the step size underflows (for
/// example on collision with the attractor's centre) and with a convergence error
/// when the step budget runs out.
pub fn propagate_cowell<A>(
    k: f64,
    r0: &Vector3,
    v0: &Vector3,
    tof: f64,
    accel: &A,
    settings: &CowellSettings,
) -> Result<(Vector3, Vector3)>
where
    A: AccelerationModel + ?Sized,
{
    if !(k.is_finite() && k > 0.0) {
        return Err(OrbitError::domain(format!(
            "gravitational parameter must be positive, got {k}"
        )));
    }
    if !tof.is_finite() {
        return Err(OrbitError::domain(format!("time of flight must be finite, got {tof}")));
    }
    if vector::norm(r0) == 0.0 {
        return Err(OrbitError::domain("initial position has zero magnitude"));
    }
    if tof == 0.0 {
        return Ok((*r0, *v0));
    }

    let control = StepControl {
        min_step: settings.min_step,
        max_steps: settings.max_steps,
        initial_step: settings.initial_step,
        ..StepControl::default()
    };
    let mut solver =
        DormandPrince::new(Tolerances::new(settings.rtol, settings.atol)).with_control(control);
    let system = PerturbedTwoBody { k, accel };
    let y = solver.integrate(&system, 0.0, &vector::join(r0, v0), tof)?;

    let stats = solver.stats();
    debug!(
        "cowell ({}) tof = {tof}: {} steps, {} rejected",
        accel.name(),
        stats.accepted_steps,
        stats.rejected_steps
    );
    Ok(vector::split(&y))
}
