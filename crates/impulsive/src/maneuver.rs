//! Impulsive maneuvers and their application to orbits.

use astro_core::vector::{self, Vector3};
use astro_core::{OrbitError, Result};
use astro_orbits::{Orbit, OrbitKind};
use astro_propagation::{Propagator, propagate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::lambert::lambert;
use crate::transfers::{half_period, vis_viva};

/// Instantaneous velocity change `dv` applied `dt` seconds after the reference epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impulse {
    pub dt: f64,
    pub dv: Vector3,
}

impl Impulse {
    pub fn new(dt: f64, dv: Vector3) -> Self {
        Self { dt, dv }
    }
}

/// Ordered, validated sequence of impulses.
///
/// Offsets are absolute (measured from the epoch of the orbit the maneuver is
/// applied to), finite, non-negative and non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Maneuver {
    impulses: Vec<Impulse>,
}

/// Where and along which direction a coplanar tangential transfer departs.
struct TangentialDeparture {
    wait: f64,
    radius: f64,
    speed: f64,
    along_track: Vector3,
}

fn tangential_departure(orbit: &Orbit) -> Result<TangentialDeparture> {
    let h = orbit.h_vec();
    let h_hat = vector::unit(&h)
        .ok_or_else(|| OrbitError::domain("rectilinear orbit has no transfer plane"))?;
    match orbit.kind() {
        OrbitKind::Circular => {
            let r = orbit.r();
            let radius = vector::norm(&r);
            let along_track = vector::cross(&h_hat, &vector::scale(&r, 1.0 / radius));
            Ok(TangentialDeparture {
                wait: 0.0,
                radius,
                speed: vector::norm(&orbit.v()),
                along_track,
            })
        }
        OrbitKind::Elliptic => {
            let period = orbit
                .period()
                .ok_or_else(|| OrbitError::domain("elliptic orbit without a period"))?;
            let since = orbit.time_since_periapsis()?;
            let wait = if since.abs() <= 1e-9 * period {
                0.0
            } else if since < 0.0 {
                -since
            } else {
                period - since
            };
            let e_vec = orbit.e_vec();
            let p_hat = vector::scale(&e_vec, 1.0 / vector::norm(&e_vec));
            let radius = orbit.periapsis_radius();
            Ok(TangentialDeparture {
                wait,
                radius,
                speed: vector::norm(&h) / radius,
                along_track: vector::cross(&h_hat, &p_hat),
            })
        }
        kind => Err(OrbitError::domain(format!(
            "tangential transfers need a closed initial orbit, got {kind:?}"
        ))),
    }
}

fn check_radius(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::domain(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

impl Maneuver {
    pub fn new(impulses: impl IntoIterator<Item = Impulse>) -> Result<Self> {
        let impulses: Vec<Impulse> = impulses.into_iter().collect();
        if impulses.is_empty() {
            return Err(OrbitError::domain("a maneuver needs at least one impulse"));
        }
        let mut previous = 0.0;
        for (index, impulse) in impulses.iter().enumerate() {
            if !vector::is_finite(&impulse.dv) {
                return Err(OrbitError::domain(format!(
                    "impulse {index} has a non-finite delta-v"
                )));
            }
            if !impulse.dt.is_finite() || impulse.dt < previous {
                return Err(OrbitError::domain(format!(
                    "impulse {index} at dt = {} must be finite, non-negative and not before {previous}",
                    impulse.dt
                )));
            }
            previous = impulse.dt;
        }
        Ok(Self { impulses })
    }

    /// Single immediate impulse.
    pub fn impulse(dv: Vector3) -> Result<Self> {
        Self::new([Impulse::new(0.0, dv)])
    }

    /// Hohmann transfer to a circular orbit of radius `r_f`.
    ///
    /// Circular orbits burn immediately along the velocity; elliptic orbits coast
    /// to periapsis first and burn along the periapsis velocity.
    pub fn hohmann(orbit: &Orbit, r_f: f64) -> Result<Self> {
        check_radius("target radius", r_f)?;
        let k = orbit.k();
        let start = tangential_departure(orbit)?;

        let a_t = 0.5 * (start.radius + r_f);
        let dv_a = vis_viva(k, start.radius, a_t) - start.speed;
        let dv_b = (k / r_f).sqrt() - vis_viva(k, r_f, a_t);
        let t_trans = half_period(k, a_t);
        debug!(
            "hohmann {} -> {r_f}: dv = ({dv_a}, {dv_b}), coast {} + {t_trans}",
            start.radius, start.wait
        );

        Self::new([
            Impulse::new(start.wait, vector::scale(&start.along_track, dv_a)),
            // arrival is half a revolution later, where the motion is reversed
            Impulse::new(
                start.wait + t_trans,
                vector::scale(&start.along_track, -dv_b),
            ),
        ])
    }

    /// Bi-elliptic transfer to radius `r_f` through the intermediate apoapsis `r_b`.
    pub fn bielliptic(orbit: &Orbit, r_b: f64, r_f: f64) -> Result<Self> {
        check_radius("intermediate radius", r_b)?;
        check_radius("target radius", r_f)?;
        let k = orbit.k();
        let start = tangential_departure(orbit)?;

        let a1 = 0.5 * (start.radius + r_b);
        let a2 = 0.5 * (r_b + r_f);
        let dv_a = vis_viva(k, start.radius, a1) - start.speed;
        let dv_b = vis_viva(k, r_b, a2) - vis_viva(k, r_b, a1);
        let dv_c = (k / r_f).sqrt() - vis_viva(k, r_f, a2);
        let t1 = half_period(k, a1);
        let t2 = half_period(k, a2);
        debug!(
            "bielliptic {} -> {r_b} -> {r_f}: dv = ({dv_a}, {dv_b}, {dv_c})",
            start.radius
        );

        Self::new([
            Impulse::new(start.wait, vector::scale(&start.along_track, dv_a)),
            Impulse::new(start.wait + t1, vector::scale(&start.along_track, -dv_b)),
            Impulse::new(start.wait + t1 + t2, vector::scale(&start.along_track, dv_c)),
        ])
    }

    /// Two-impulse rendezvous from `orbit_i` to the state of `orbit_f`, one
    /// maneuver per Lambert solution (same ordering as [`lambert`]).
    ///
    /// The time of flight is the difference between the two epochs.
    pub fn lambert(
        orbit_i: &Orbit,
        orbit_f: &Orbit,
        short_way: bool,
        max_revolutions: u32,
    ) -> Result<Vec<Self>> {
        let k = orbit_i.k();
        if (k - orbit_f.k()).abs() > 1e-12 * k {
            return Err(OrbitError::domain(format!(
                "orbits have different attractors (k = {k} and {})",
                orbit_f.k()
            )));
        }
        let tof = orbit_f.epoch() - orbit_i.epoch();
        let solutions = lambert(k, &orbit_i.r(), &orbit_f.r(), tof, short_way, max_revolutions)?;
        solutions
            .iter()
            .map(|solution| {
                Self::new([
                    Impulse::new(0.0, vector::sub(&solution.v1, &orbit_i.v())),
                    Impulse::new(tof, vector::sub(&orbit_f.v(), &solution.v2)),
                ])
            })
            .collect()
    }

    pub fn impulses(&self) -> &[Impulse] {
        &self.impulses
    }

    /// Sum of impulse magnitudes.
    pub fn total_cost(&self) -> f64 {
        self.impulses.iter().map(|i| vector::norm(&i.dv)).sum()
    }

    /// Offset of the last impulse.
    pub fn total_time(&self) -> f64 {
        self.impulses.last().map_or(0.0, |i| i.dt)
    }
}

/// Orbit right after the last impulse of `maneuver`.
pub fn apply_maneuver<P>(orbit: &Orbit, maneuver: &Maneuver, propagator: &P) -> Result<Orbit>
where
    P: Propagator + ?Sized,
{
    apply_maneuver_intermediate(orbit, maneuver, propagator)?
        .pop()
        .ok_or_else(|| OrbitError::domain("maneuver has no impulses"))
}

/// Orbit right after each impulse, in chronological order.
///
/// Coasts between impulses use `propagator`; each state's epoch is the
/// impulse time.
pub fn apply_maneuver_intermediate<P>(
    orbit: &Orbit,
    maneuver: &Maneuver,
    propagator: &P,
) -> Result<Vec<Orbit>>
where
    P: Propagator + ?Sized,
{
    let mut current = *orbit;
    let mut elapsed = 0.0;
    let mut states = Vec::with_capacity(maneuver.impulses.len());
    for impulse in &maneuver.impulses {
        let coast = impulse.dt - elapsed;
        if coast > 0.0 {
            current = propagate(&current, coast, propagator)?;
        }
        elapsed = impulse.dt;
        current = current.with_state(
            current.r(),
            vector::add(&current.v(), &impulse.dv),
            current.epoch(),
        )?;
        states.push(current);
    }
    Ok(states)
}
