//! Izzo's solver for Lambert's problem, with multi-revolution branches.
//!
//! The transfer family is parametrized by `x` (a normalized semimajor-axis
//! variable) for a fixed geometry parameter `λ`; the non-dimensional time of
//! flight `T(x)` is inverted with Householder iterations.

use std::f64::consts::PI;

use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};
use log::debug;
use serde::Serialize;

/// Smallest accepted `|r̂1 × r̂2|`, the sine of the transfer angle.
///
/// The transfer-plane normal is that cross product rescaled, so its direction
/// carries a relative error of about `ε / sin θ`. Near `√ε` half of the
/// significant digits are gone and the velocities are no longer trustworthy.
pub const COLLINEAR_TOL: f64 = 1.5e-8;

/// Which member of the transfer family a solution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LambertBranch {
    /// Zero complete revolutions.
    Direct,
    /// Multi-revolution root above the minimum-time abscissa `x(T_min)`.
    LowPath,
    /// Multi-revolution root below the minimum-time abscissa `x(T_min)`.
    HighPath,
}

/// Velocities at both endpoints of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LambertSolution {
    pub v1: Vector3,
    pub v2: Vector3,
    pub revolutions: u32,
    pub branch: LambertBranch,
}

/// Iteration settings for the Householder and Halley loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambert {
    pub rtol: f64,
    pub max_iterations: usize,
}

impl Default for Lambert {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            max_iterations: 35,
        }
    }
}

/// Solve Lambert's problem with default settings; see [`Lambert::solve`].
pub fn lambert(
    k: f64,
    r1: &Vector3,
    r2: &Vector3,
    tof: f64,
    short_way: bool,
    max_revolutions: u32,
) -> Result<Vec<LambertSolution>> {
    Lambert::default().solve(k, r1, r2, tof, short_way, max_revolutions)
}

/// Solve one branch with default settings; see [`Lambert::solve_single`].
pub fn lambert_single(
    k: f64,
    r1: &Vector3,
    r2: &Vector3,
    tof: f64,
    short_way: bool,
    revolutions: u32,
    low_path: bool,
) -> Result<LambertSolution> {
    Lambert::default().solve_single(k, r1, r2, tof, short_way, revolutions, low_path)
}

/// Transfer geometry shared by every branch of one problem.
struct Geometry {
    lambda: f64,
    /// Non-dimensional time of flight.
    t: f64,
    r1_norm: f64,
    r2_norm: f64,
    i_r1: Vector3,
    i_r2: Vector3,
    i_t1: Vector3,
    i_t2: Vector3,
    gamma: f64,
    rho: f64,
    sigma: f64,
}

impl Geometry {
    fn new(k: f64, r1: &Vector3, r2: &Vector3, tof: f64, short_way: bool) -> Result<Self> {
        if !(k.is_finite() && k > 0.0) {
            return Err(OrbitError::domain(format!(
                "gravitational parameter must be positive, got {k}"
            )));
        }
        if !(tof.is_finite() && tof > 0.0) {
            return Err(OrbitError::domain(format!(
                "time of flight must be positive and finite, got {tof}"
            )));
        }
        if !(vector::is_finite(r1) && vector::is_finite(r2)) {
            return Err(OrbitError::domain("position vectors must be finite"));
        }
        let r1_norm = vector::norm(r1);
        let r2_norm = vector::norm(r2);
        if r1_norm == 0.0 || r2_norm == 0.0 {
            return Err(OrbitError::domain("position vectors must be non-zero"));
        }

        let i_r1 = vector::scale(r1, 1.0 / r1_norm);
        let i_r2 = vector::scale(r2, 1.0 / r2_norm);
        let normal = vector::cross(&i_r1, &i_r2);
        let normal_norm = vector::norm(&normal);
        if normal_norm < COLLINEAR_TOL {
            return Err(OrbitError::domain(format!(
                "positions are collinear (|r1 x r2| / (|r1||r2|) = {normal_norm:e}); transfer plane undefined"
            )));
        }
        let i_h = vector::scale(&normal, 1.0 / normal_norm);

        let c = vector::norm(&vector::sub(r2, r1));
        let s = 0.5 * (r1_norm + r2_norm + c);
        let mut lambda = (1.0 - (c / s).min(1.0)).sqrt();
        let mut i_t1 = vector::cross(&i_h, &i_r1);
        let mut i_t2 = vector::cross(&i_h, &i_r2);
        if !short_way {
            lambda = -lambda;
            i_t1 = vector::scale(&i_t1, -1.0);
            i_t2 = vector::scale(&i_t2, -1.0);
        }

        let rho = (r1_norm - r2_norm) / c;
        Ok(Self {
            lambda,
            t: (2.0 * k / (s * s * s)).sqrt() * tof,
            r1_norm,
            r2_norm,
            i_r1,
            i_r2,
            i_t1,
            i_t2,
            gamma: (0.5 * k * s).sqrt(),
            rho,
            sigma: (1.0 - rho * rho).max(0.0).sqrt(),
        })
    }

    /// Largest revolution count with a solution, if any beyond the direct one.
    fn max_feasible_revolutions(&self, settings: &Lambert) -> Result<u32> {
        let mut m_max = (self.t / PI).floor() as u32;
        if m_max > 0 && self.t < self.t_zero(m_max) {
            let (_, t_min) = self.t_min(m_max, settings)?;
            if self.t < t_min {
                m_max -= 1;
            }
        }
        Ok(m_max)
    }

    /// `T(x = 0)` for `m` revolutions.
    fn t_zero(&self, m: u32) -> f64 {
        let l = self.lambda;
        l.acos() + l * (1.0 - l * l).sqrt() + f64::from(m) * PI
    }

    /// Minimum non-dimensional time of flight for `m >= 1` revolutions (Halley).
    fn t_min(&self, m: u32, settings: &Lambert) -> Result<(f64, f64)> {
        let l = self.lambda;
        let mut x0 = 0.1;
        for _ in 0..settings.max_iterations {
            let y = compute_y(x0, l);
            let t = tof_equation(x0, y, l, m);
            let d1 = tof_derivative(x0, y, t, l);
            let d2 = tof_second_derivative(x0, y, t, d1, l);
            let d3 = tof_third_derivative(x0, y, d1, d2, l);
            let denominator = 2.0 * d2 * d2 - d1 * d3;
            if d2 == 0.0 || denominator == 0.0 {
                return Err(OrbitError::convergence(
                    "lambert",
                    format!("vanishing derivative while searching T_min for M = {m}"),
                ));
            }
            let x = x0 - 2.0 * d1 * d2 / denominator;
            if (x - x0).abs() < settings.rtol {
                let y = compute_y(x, l);
                return Ok((x, tof_equation(x, y, l, m)));
            }
            x0 = x;
        }
        Err(OrbitError::convergence(
            "lambert",
            format!(
                "T_min search for M = {m} did not converge in {} iterations",
                settings.max_iterations
            ),
        ))
    }

    fn initial_guess(&self, m: u32, low_path: bool) -> f64 {
        let (t, l) = (self.t, self.lambda);
        if m == 0 {
            let t_0 = self.t_zero(0);
            let t_1 = 2.0 * (1.0 - l * l * l) / 3.0;
            if t >= t_0 {
                (t_0 / t).powf(2.0 / 3.0) - 1.0
            } else if t < t_1 {
                2.5 * t_1 / t * (t_1 - t) / (1.0 - l.powi(5)) + 1.0
            } else {
                (t_0 / t).powf((t_1 / t_0).log2()) - 1.0
            }
        } else {
            let m_pi = f64::from(m) * PI;
            let a = ((m_pi + PI) / (8.0 * t)).powf(2.0 / 3.0);
            let x_left = (a - 1.0) / (a + 1.0);
            let b = (8.0 * t / m_pi).powf(2.0 / 3.0);
            let x_right = (b - 1.0) / (b + 1.0);
            if low_path {
                x_left.max(x_right)
            } else {
                x_left.min(x_right)
            }
        }
    }

    /// Householder iterations on `T(x) - T`.
    fn solve_x(&self, m: u32, low_path: bool, settings: &Lambert) -> Result<f64> {
        let l = self.lambda;
        let mut x0 = self.initial_guess(m, low_path);
        for iteration in 0..settings.max_iterations {
            let y = compute_y(x0, l);
            let t = tof_equation(x0, y, l, m);
            let f = t - self.t;
            let d1 = tof_derivative(x0, y, t, l);
            let d2 = tof_second_derivative(x0, y, t, d1, l);
            let d3 = tof_third_derivative(x0, y, d1, d2, l);
            let x = x0
                - f * ((d1 * d1 - 0.5 * f * d2)
                    / (d1 * (d1 * d1 - f * d2) + d3 * f * f / 6.0));
            if !x.is_finite() {
                return Err(OrbitError::convergence(
                    "lambert",
                    format!("non-finite iterate from x = {x0} (M = {m})"),
                ));
            }
            if (x - x0).abs() < settings.rtol {
                debug!("lambert M = {m} converged in {} iterations (x = {x})", iteration + 1);
                return Ok(x);
            }
            x0 = x;
        }
        Err(OrbitError::convergence(
            "lambert",
            format!(
                "Householder iteration for M = {m} did not converge in {} iterations",
                settings.max_iterations
            ),
        ))
    }

    fn reconstruct(&self, x: f64, revolutions: u32, branch: LambertBranch) -> LambertSolution {
        let l = self.lambda;
        let y = compute_y(x, l);
        let (g, rho, sigma) = (self.gamma, self.rho, self.sigma);
        let v_r1 = g * ((l * y - x) - rho * (l * y + x)) / self.r1_norm;
        let v_r2 = -g * ((l * y - x) + rho * (l * y + x)) / self.r2_norm;
        let v_t1 = g * sigma * (y + l * x) / self.r1_norm;
        let v_t2 = g * sigma * (y + l * x) / self.r2_norm;
        LambertSolution {
            v1: vector::lin_comb(&self.i_r1, v_r1, &self.i_t1, v_t1),
            v2: vector::lin_comb(&self.i_r2, v_r2, &self.i_t2, v_t2),
            revolutions,
            branch,
        }
    }
}

impl Lambert {
    pub fn new(rtol: f64, max_iterations: usize) -> Self {
        Self {
            rtol,
            max_iterations,
        }
    }

    /// Every transfer from `r1` to `r2` in `tof` with up to `max_revolutions`
    /// complete revolutions.
    ///
    /// The direct solution comes first, followed by the low-path and high-path
    /// solutions for each revolution count in increasing order. Revolution counts
    /// whose minimum time of flight exceeds `tof` are skipped. `short_way` selects
    /// the transfer angle below π, measured in the plane of `r1 × r2`.
    ///
    /// `max_revolutions` is only an upper limit; the feasible count grows with
    /// `tof` divided by the period of the minimum-energy transfer. Each counted
    /// revolution costs two Householder solves and two entries in the result,
    /// so long times of flight with a large limit produce large result sets.
    pub fn solve(
        &self,
        k: f64,
        r1: &Vector3,
        r2: &Vector3,
        tof: f64,
        short_way: bool,
        max_revolutions: u32,
    ) -> Result<Vec<LambertSolution>> {
        let geometry = Geometry::new(k, r1, r2, tof, short_way)?;
        let feasible = geometry.max_feasible_revolutions(self)?.min(max_revolutions);
        if feasible < max_revolutions {
            debug!(
                "lambert: {} of {max_revolutions} requested revolution counts are infeasible",
                max_revolutions - feasible
            );
        }

        let mut solutions = Vec::with_capacity(1 + 2 * feasible as usize);
        let x = geometry.solve_x(0, true, self)?;
        solutions.push(geometry.reconstruct(x, 0, LambertBranch::Direct));
        for m in 1..=feasible {
            for (low_path, branch) in [(true, LambertBranch::LowPath), (false, LambertBranch::HighPath)] {
                let x = geometry.solve_x(m, low_path, self)?;
                solutions.push(geometry.reconstruct(x, m, branch));
            }
        }
        Ok(solutions)
    }

    /// One branch of the transfer family.
    ///
    /// Fails with a convergence error when `tof` is below the minimum time of
    /// flight for `revolutions`. `low_path` is ignored for the direct solution.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_single(
        &self,
        k: f64,
        r1: &Vector3,
        r2: &Vector3,
        tof: f64,
        short_way: bool,
        revolutions: u32,
        low_path: bool,
    ) -> Result<LambertSolution> {
        let geometry = Geometry::new(k, r1, r2, tof, short_way)?;
        if revolutions > 0 {
            let feasible = geometry.max_feasible_revolutions(self)?;
            if revolutions > feasible {
                return Err(OrbitError::convergence(
                    "lambert",
                    format!(
                        "time of flight {tof} is below the minimum for {revolutions} revolution(s) \
                         (at most {feasible} feasible)"
                    ),
                ));
            }
        }
        let branch = match (revolutions, low_path) {
            (0, _) => LambertBranch::Direct,
            (_, true) => LambertBranch::LowPath,
            (_, false) => LambertBranch::HighPath,
        };
        let x = geometry.solve_x(revolutions, low_path, self)?;
        Ok(geometry.reconstruct(x, revolutions, branch))
    }
}

fn compute_y(x: f64, lambda: f64) -> f64 {
    (1.0 - lambda * lambda * (1.0 - x * x)).sqrt()
}

fn compute_psi(x: f64, y: f64, lambda: f64) -> f64 {
    if (-1.0..1.0).contains(&x) {
        (x * y + lambda * (1.0 - x * x)).clamp(-1.0, 1.0).acos()
    } else if x > 1.0 {
        ((y - x * lambda) * (x * x - 1.0).sqrt()).asinh()
    } else {
        0.0
    }
}

/// Non-dimensional time of flight `T(x)` for `m` revolutions.
fn tof_equation(x: f64, y: f64, lambda: f64, m: u32) -> f64 {
    // near-parabolic direct transfers use the series form to avoid 0/0
    if m == 0 && 0.6_f64.sqrt() < x && x < 1.4_f64.sqrt() {
        let eta = y - lambda * x;
        let s1 = 0.5 * (1.0 - lambda - x * eta);
        let q = 4.0 / 3.0 * hyp2f1b(s1);
        0.5 * (eta * eta * eta * q + 4.0 * lambda * eta)
    } else {
        let psi = compute_psi(x, y, lambda);
        let one_minus_x2 = 1.0 - x * x;
        ((psi + f64::from(m) * PI) / one_minus_x2.abs().sqrt() - x + lambda * y) / one_minus_x2
    }
}

fn tof_derivative(x: f64, y: f64, t: f64, l: f64) -> f64 {
    (3.0 * t * x - 2.0 + 2.0 * l * l * l * x / y) / (1.0 - x * x)
}

fn tof_second_derivative(x: f64, y: f64, t: f64, dt: f64, l: f64) -> f64 {
    (3.0 * t + 5.0 * x * dt + 2.0 * (1.0 - l * l) * l * l * l / (y * y * y)) / (1.0 - x * x)
}

fn tof_third_derivative(x: f64, y: f64, dt: f64, ddt: f64, l: f64) -> f64 {
    (7.0 * x * ddt + 8.0 * dt - 6.0 * (1.0 - l * l) * l.powi(5) * x / y.powi(5)) / (1.0 - x * x)
}

/// Gauss hypergeometric 2F1(3, 1; 5/2; x) by its power series.
fn hyp2f1b(x: f64) -> f64 {
    if x >= 1.0 {
        return f64::INFINITY;
    }
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut n = 0.0;
    loop {
        term *= (3.0 + n) * (1.0 + n) / (2.5 + n) * x / (n + 1.0);
        let previous = sum;
        sum += term;
        if sum == previous {
            return sum;
        }
        n += 1.0;
    }
}
