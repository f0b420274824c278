//! Bracketing root finder (Brent's method).

use crate::error::{OrbitError, Result};

/// Termination settings for [`brentq`].
#[derive(Debug, Clone, Copy)]
pub struct BrentOptions {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iterations: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

/// Find a root of `f` inside `[a, b]` where `f(a)` and `f(b)` differ in sign.
///
/// Combines inverse quadratic interpolation, secant steps, and bisection, so
/// convergence is guaranteed once the bracket is valid.
pub fn brentq<F>(mut f: F, a: f64, b: f64, options: BrentOptions) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if !fpre.is_finite() || !fcur.is_finite() {
        return Err(OrbitError::domain(format!(
            "brentq: non-finite function value at bracket [{a}, {b}]"
        )));
    }
    if fpre * fcur > 0.0 {
        return Err(OrbitError::convergence(
            "brentq",
            format!("no sign change on [{a}, {b}] (f = {fpre:e}, {fcur:e})"),
        ));
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..options.max_iterations {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = 0.5 * (options.xtol + options.rtol * xcur.abs());
        let sbis = 0.5 * (xblk - xcur);
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(OrbitError::convergence(
        "brentq",
        format!(
            "exceeded {} iterations, last iterate {xcur}",
            options.max_iterations
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_cubic_root() {
        let root = brentq(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, BrentOptions::default())
            .expect("bracketed root");
        assert_relative_eq!(root, 2.094_551_481_542_326_5, epsilon = 1e-11);
    }

    #[test]
    fn rejects_interval_without_sign_change() {
        let err = brentq(|x| x * x + 1.0, -1.0, 1.0, BrentOptions::default()).unwrap_err();
        assert!(err.is_convergence());
    }

    #[test]
    fn endpoint_root_is_returned_immediately() {
        let root = brentq(|x| x - 1.0, 1.0, 4.0, BrentOptions::default()).unwrap();
        assert_eq!(root, 1.0);
    }
}
