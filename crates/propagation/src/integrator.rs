//! Adaptive embedded Runge–Kutta integration (Dormand–Prince 5(4)).
//!
//! The fifth-order solution is propagated and the embedded fourth-order one only
//! drives step-size control. The first stage of each step reuses the last stage of
//! the previous accepted step (FSAL). Integration may run forwards or backwards
//! and always lands exactly on the requested final time.

use astro_core::{OrbitError, Result};
use log::{debug, trace};

/// Right-hand side of a first-order ODE system `dy/dt = f(t, y)`.
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Mixed relative/absolute error tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

/// Step-size controller limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepControl {
    /// Fraction of the optimal step actually taken.
    pub safety: f64,
    /// Smallest allowed step shrink factor.
    pub min_factor: f64,
    /// Largest allowed step growth factor.
    pub max_factor: f64,
    /// Absolute floor on |h|; the effective floor is never below 16 ulp of t.
    pub min_step: f64,
    pub max_steps: usize,
    /// Starting step; estimated from the derivatives when `None`.
    pub initial_step: Option<f64>,
}

impl Default for StepControl {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            min_step: 0.0,
            max_steps: 1_000_000,
            initial_step: None,
        }
    }
}

/// Counters collected during the last integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub fn_evals: usize,
}

// Dormand & Prince (1980) tableau
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19_372.0 / 6_561.0,
    -25_360.0 / 2_187.0,
    64_448.0 / 6_561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9_017.0 / 3_168.0,
    -355.0 / 33.0,
    46_732.0 / 5_247.0,
    49.0 / 176.0,
    -5_103.0 / 18_656.0,
];
const B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1_113.0,
    125.0 / 192.0,
    -2_187.0 / 6_784.0,
    11.0 / 84.0,
    0.0,
];
const B4: [f64; 7] = [
    5_179.0 / 57_600.0,
    0.0,
    7_571.0 / 16_695.0,
    393.0 / 640.0,
    -92_097.0 / 339_200.0,
    187.0 / 2_100.0,
    1.0 / 40.0,
];

/// Dormand–Prince 5(4) solver.
#[derive(Debug, Clone)]
pub struct DormandPrince {
    tolerances: Tolerances,
    control: StepControl,
    stats: Stats,
}

impl DormandPrince {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            control: StepControl::default(),
            stats: Stats::default(),
        }
    }

    pub fn with_control(mut self, control: StepControl) -> Self {
        self.control = control;
        self
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Integrate from `(t0, y0)` to `tf` and return the state at `tf`.
    pub fn integrate<const N: usize, S>(
        &mut self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
    ) -> Result<[f64; N]>
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.stats = Stats::default();
        if !(t0.is_finite() && tf.is_finite()) {
            return Err(OrbitError::domain(format!(
                "integration bounds must be finite, got [{t0}, {tf}]"
            )));
        }
        if y0.iter().any(|y| !y.is_finite()) {
            return Err(OrbitError::domain("initial state contains non-finite components"));
        }
        if tf == t0 {
            return Ok(*y0);
        }
        let Tolerances { rtol, atol } = self.tolerances;
        if !(rtol >= 0.0 && atol >= 0.0) || rtol + atol <= 0.0 {
            return Err(OrbitError::domain(format!(
                "tolerances must be non-negative and not both zero (rtol = {rtol}, atol = {atol})"
            )));
        }

        let direction = (tf - t0).signum();
        let mut t = t0;
        let mut y = *y0;
        let mut k = [[0.0; N]; 7];
        self.eval(system, t, &y, &mut k[0])?;

        let mut h = match self.control.initial_step {
            Some(h0) if h0 != 0.0 && h0.is_finite() => h0.abs() * direction,
            _ => self.initial_step(system, t0, &y, &k[0], direction)?,
        };

        loop {
            if self.stats.accepted_steps + self.stats.rejected_steps >= self.control.max_steps {
                return Err(OrbitError::convergence(
                    "dormand_prince",
                    format!(
                        "step budget of {} exhausted at t = {t} (target {tf})",
                        self.control.max_steps
                    ),
                ));
            }

            let remaining = tf - t;
            let mut last = false;
            if h.abs() >= remaining.abs() {
                h = remaining;
                last = true;
            }

            let floor = self.control.min_step.max(16.0 * f64::EPSILON * t.abs());
            if h.abs() < floor && !last {
                return Err(OrbitError::Integration {
                    reason: "step size underflow",
                    t,
                    step: h,
                });
            }

            let y_new = self.stages(system, t, &y, h, &mut k)?;
            let err = error_norm(&y, &y_new, &k, h, rtol, atol);

            if err <= 1.0 {
                t = if last { tf } else { t + h };
                y = y_new;
                k[0] = k[6];
                self.stats.accepted_steps += 1;
                if last {
                    debug!(
                        "dormand_prince reached t = {tf}: {} accepted, {} rejected, {} evaluations",
                        self.stats.accepted_steps, self.stats.rejected_steps, self.stats.fn_evals
                    );
                    return Ok(y);
                }
                let factor = if err == 0.0 {
                    self.control.max_factor
                } else {
                    (self.control.safety * err.powf(-0.2))
                        .clamp(self.control.min_factor, self.control.max_factor)
                };
                h *= factor;
            } else {
                self.stats.rejected_steps += 1;
                let factor = (self.control.safety * err.powf(-0.2)).max(self.control.min_factor);
                trace!("dormand_prince rejected h = {h:e} at t = {t} (err = {err:.3})");
                h *= factor;
            }
        }
    }

    /// Stages 2..7 for a step of size `h`; returns the fifth-order solution and
    /// leaves its derivative in `k[6]`.
    fn stages<const N: usize, S>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
        k: &mut [[f64; N]; 7],
    ) -> Result<[f64; N]>
    where
        S: OdeSystem<N> + ?Sized,
    {
        let rows: [&[f64]; 5] = [&A2, &A3, &A4, &A5, &A6];
        for (stage, row) in rows.iter().enumerate() {
            let mut y_stage = *y;
            for (i, yi) in y_stage.iter_mut().enumerate() {
                let increment: f64 = row.iter().enumerate().map(|(j, a)| a * k[j][i]).sum();
                *yi += h * increment;
            }
            self.eval(system, t + C[stage + 1] * h, &y_stage, &mut k[stage + 1])?;
        }

        let mut y_new = *y;
        for (i, yi) in y_new.iter_mut().enumerate() {
            let increment: f64 = (0..6).map(|j| B5[j] * k[j][i]).sum();
            *yi += h * increment;
        }
        self.eval(system, t + h, &y_new, &mut k[6])?;
        Ok(y_new)
    }

    fn eval<const N: usize, S>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64; N],
        dydt: &mut [f64; N],
    ) -> Result<()>
    where
        S: OdeSystem<N> + ?Sized,
    {
        system.rhs(t, y, dydt);
        self.stats.fn_evals += 1;
        if dydt.iter().all(|d| d.is_finite()) {
            Ok(())
        } else {
            Err(OrbitError::Integration {
                reason: "non-finite derivative",
                t,
                step: 0.0,
            })
        }
    }

    /// Starting step heuristic from Hairer, Nørsett & Wanner (II.4).
    fn initial_step<const N: usize, S>(
        &mut self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        f0: &[f64; N],
        direction: f64,
    ) -> Result<f64>
    where
        S: OdeSystem<N> + ?Sized,
    {
        let Tolerances { rtol, atol } = self.tolerances;
        let scale = y0.map(|y| atol + rtol * y.abs());
        let rms = |v: &[f64; N]| {
            (v.iter()
                .zip(&scale)
                .map(|(x, s)| (x / s).powi(2))
                .sum::<f64>()
                / N as f64)
                .sqrt()
        };

        let d0 = rms(y0);
        let d1 = rms(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let mut y1 = *y0;
        for (y, f) in y1.iter_mut().zip(f0) {
            *y += direction * h0 * f;
        }
        let mut f1 = [0.0; N];
        self.eval(system, t0 + direction * h0, &y1, &mut f1)?;
        let mut diff = f1;
        for (d, f) in diff.iter_mut().zip(f0) {
            *d -= f;
        }
        let d2 = rms(&diff) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(0.2)
        };
        Ok(direction * (100.0 * h0).min(h1))
    }
}

fn error_norm<const N: usize>(
    y: &[f64; N],
    y_new: &[f64; N],
    k: &[[f64; N]; 7],
    h: f64,
    rtol: f64,
    atol: f64,
) -> f64 {
    let sum: f64 = (0..N)
        .map(|i| {
            let err: f64 = h * (0..7).map(|j| (B5[j] - B4[j]) * k[j][i]).sum::<f64>();
            let scale = atol + rtol * y[i].abs().max(y_new[i].abs());
            (err / scale).powi(2)
        })
        .sum();
    (sum / N as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Harmonic {
        omega: f64,
    }

    impl OdeSystem<2> for Harmonic {
        fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
            dydt[0] = y[1];
            dydt[1] = -self.omega * self.omega * y[0];
        }
    }

    struct Decay;

    impl OdeSystem<1> for Decay {
        fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
            dydt[0] = -y[0];
        }
    }

    struct BlowUp;

    impl OdeSystem<1> for BlowUp {
        fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
            dydt[0] = y[0] * y[0];
        }
    }

    #[test]
    fn harmonic_oscillator_matches_analytic_solution() {
        let mut solver = DormandPrince::new(Tolerances::new(1e-12, 1e-12));
        let y = solver
            .integrate(&Harmonic { omega: 2.0 }, 0.0, &[1.0, 0.0], 10.0)
            .unwrap();
        assert_relative_eq!(y[0], (20.0_f64).cos(), epsilon = 1e-9);
        assert_relative_eq!(y[1], -2.0 * (20.0_f64).sin(), epsilon = 1e-9);
        let stats = solver.stats();
        assert!(stats.accepted_steps > 10);
        assert!(stats.fn_evals >= 6 * stats.accepted_steps);
    }

    #[test]
    fn integrates_backwards() {
        let mut solver = DormandPrince::new(Tolerances::new(1e-12, 1e-14));
        let y = solver.integrate(&Decay, 2.0, &[1.0], 0.0).unwrap();
        assert_relative_eq!(y[0], 2.0_f64.exp(), max_relative = 1e-10);
    }

    #[test]
    fn zero_span_returns_initial_state() {
        let mut solver = DormandPrince::new(Tolerances::new(1e-10, 1e-10));
        assert_eq!(solver.integrate(&Decay, 3.0, &[0.5], 3.0).unwrap(), [0.5]);
        assert_eq!(solver.stats().fn_evals, 0);
    }

    #[test]
    fn finite_time_singularity_is_reported() {
        // y' = y², y(0) = 1 blows up at t = 1
        let control = StepControl {
            min_step: 1e-6,
            max_steps: usize::MAX,
            ..StepControl::default()
        };
        let mut solver = DormandPrince::new(Tolerances::new(1e-10, 1e-10)).with_control(control);
        let err = solver.integrate(&BlowUp, 0.0, &[1.0], 2.0).unwrap_err();
        assert!(err.is_integration(), "{err}");
        match err {
            OrbitError::Integration { reason, t, step } => {
                assert_eq!(reason, "step size underflow");
                assert!(t > 0.99 && t < 1.0, "stopped at t = {t}");
                assert!(step.abs() < 1e-6);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn step_budget_is_enforced() {
        let control = StepControl {
            max_steps: 5,
            ..StepControl::default()
        };
        let mut solver = DormandPrince::new(Tolerances::new(1e-12, 1e-12)).with_control(control);
        let err = solver
            .integrate(&Harmonic { omega: 1.0 }, 0.0, &[1.0, 0.0], 100.0)
            .unwrap_err();
        assert!(err.is_convergence());
    }
}
