//! Core primitives shared by the astro workspace: vectors, angles, time, errors, root finding.

pub mod error;
pub mod roots;

pub use error::{OrbitError, Result};

/// Lightweight time utilities shared across crates.
pub mod time {
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Convert seconds to hours.
    #[inline]
    pub fn seconds_to_hours(seconds: f64) -> f64 {
        seconds / SECONDS_PER_HOUR
    }
}

/// Angle wrapping helpers.
pub mod angle {
    use std::f64::consts::{PI, TAU};

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn wrap_two_pi(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// Wrap an angle into `(-π, π]`.
    #[inline]
    pub fn wrap_pi(angle: f64) -> f64 {
        let wrapped = wrap_two_pi(angle);
        if wrapped > PI { wrapped - TAU } else { wrapped }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Cartesian position and velocity packed as `[x, y, z, vx, vy, vz]`.
    pub type State6 = [f64; 6];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector along `v`, or `None` for the zero vector.
    #[inline]
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }

    /// `a * sa + b * sb`, the workhorse of the Lagrange coefficient updates.
    #[inline]
    pub fn lin_comb(a: &Vector3, sa: f64, b: &Vector3, sb: f64) -> Vector3 {
        [
            a[0] * sa + b[0] * sb,
            a[1] * sa + b[1] * sb,
            a[2] * sa + b[2] * sb,
        ]
    }

    /// Split a packed state into position and velocity.
    #[inline]
    pub fn split(state: &State6) -> (Vector3, Vector3) {
        (
            [state[0], state[1], state[2]],
            [state[3], state[4], state[5]],
        )
    }

    /// Pack position and velocity into a single state.
    #[inline]
    pub fn join(r: &Vector3, v: &Vector3) -> State6 {
        [r[0], r[1], r[2], v[0], v[1], v[2]]
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(v: &Vector3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::angle::{wrap_pi, wrap_two_pi};
    use super::vector::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn cross_follows_right_hand_rule() {
        let z = cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!(z, [0.0, 0.0, 1.0]);
        let x = cross(&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]);
        assert_eq!(x, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn unit_rejects_zero_vector() {
        assert!(unit(&[0.0; 3]).is_none());
        let u = unit(&[3.0, 4.0, 0.0]).unwrap();
        assert_relative_eq!(norm(&u), 1.0);
        assert_relative_eq!(u[0], 0.6);
    }

    #[test]
    fn split_and_join_are_inverse() {
        let state = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let (r, v) = split(&state);
        assert_eq!(join(&r, &v), state);
    }

    #[test]
    fn angles_wrap_into_expected_ranges() {
        assert_relative_eq!(wrap_two_pi(-0.5 * PI), 1.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_two_pi(5.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(PI), PI);
        assert_eq!(wrap_two_pi(-1e-300), 0.0);
    }
}
