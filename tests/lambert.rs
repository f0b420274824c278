use astro_engine::core::vector;
use astro_engine::impulsive::{LambertBranch, lambert};
use astro_engine::propagation::{Kepler, propagate};
use astro_engine::{Attractor, ClassicalElements, Orbit};

const MU_EARTH: f64 = 398_600.4418;

fn orbit() -> Orbit {
    let earth = Attractor::new(MU_EARTH, 6378.1366).expect("earth");
    let elements = ClassicalElements::new(10_000.0, 0.2, 0.6, 0.3, 1.1, 0.4);
    Orbit::from_classical(earth, &elements, 0.0).expect("orbit")
}

fn assert_close(a: &[f64; 3], b: &[f64; 3], rel: f64) {
    let scale = vector::norm(b);
    let diff = vector::norm(&vector::sub(a, b));
    assert!(diff <= rel * scale, "{a:?} vs {b:?}");
}

/// Solve between two points of a known orbit; the orbit's own velocities
/// must be among the solutions.
fn recovers_propagated_velocities(tof: f64, max_revolutions: u32) {
    let start = orbit();
    let end = propagate(&start, tof, &Kepler::default()).expect("propagate");
    let short_way = vector::dot(&vector::cross(&start.r(), &end.r()), &start.h_vec()) > 0.0;
    let solutions = lambert(
        MU_EARTH,
        &start.r(),
        &end.r(),
        tof,
        short_way,
        max_revolutions,
    )
    .expect("lambert");
    let matching = solutions.iter().find(|s| {
        vector::norm(&vector::sub(&s.v1, &start.v())) < 1e-5 * vector::norm(&start.v())
    });
    let solution = matching.expect("no solution matches the propagated orbit");
    assert_close(&solution.v2, &end.v(), 1e-5);
}

#[test]
fn single_revolution_recovers_the_orbit() {
    let period = orbit().period().expect("closed");
    recovers_propagated_velocities(0.3 * period, 0);
    recovers_propagated_velocities(0.7 * period, 0);
}

#[test]
fn multi_revolution_branch_recovers_the_orbit() {
    let period = orbit().period().expect("closed");
    recovers_propagated_velocities(2.4 * period, 2);
}

#[test]
fn solutions_are_ordered_by_revolution_count() {
    let start = orbit();
    let period = start.period().expect("closed");
    let end = propagate(&start, 2.4 * period, &Kepler::default()).expect("propagate");
    let solutions = lambert(MU_EARTH, &start.r(), &end.r(), 2.4 * period, true, 2)
        .expect("lambert");
    assert_eq!(solutions[0].revolutions, 0);
    assert_eq!(solutions[0].branch, LambertBranch::Direct);
    for pair in solutions.windows(2) {
        assert!(pair[0].revolutions <= pair[1].revolutions);
    }
}

#[test]
fn matches_an_independent_universal_variable_solver() {
    let r1 = [5000.0, 10_000.0, 2100.0];
    let r2 = [-14_600.0, 2500.0, 7000.0];
    let tof = 3600.0;
    let ours = lambert(398_600.0, &r1, &r2, tof, true, 0).expect("izzo");
    let (v1, v2) = lambert_bate::get_velocities(r1, r2, tof, 398_600.0, true, 1e-8, 500)
        .expect("bate");
    assert_close(&ours[0].v1, &v1, 1e-5);
    assert_close(&ours[0].v2, &v2, 1e-5);
}

#[test]
fn collinear_positions_are_a_domain_error() {
    let r1 = [7000.0, 0.0, 0.0];
    let r2 = [-14_000.0, 0.0, 0.0];
    let err = lambert(MU_EARTH, &r1, &r2, 5000.0, true, 0).unwrap_err();
    assert!(err.is_domain());
}
