use astro_engine::core::angle::wrap_pi;
use astro_engine::core::time::seconds_to_hours;
use astro_engine::lowthrust::{change_a_inc, change_ecc_inc};
use astro_engine::propagation::{
    AccelerationModel, Cowell, CowellSettings, J2Perturbation, Kepler, propagate,
    propagate_cowell,
};
use astro_engine::{Attractor, ClassicalElements, Orbit};

const MU_EARTH: f64 = 398_600.4418;
const R_EARTH: f64 = 6378.1366;
const J2_EARTH: f64 = 1.082_626_68e-3;

fn earth() -> Attractor {
    Attractor::new(MU_EARTH, R_EARTH)
        .expect("earth")
        .with_j2(J2_EARTH)
}

#[test]
fn j2_secular_rates_match_the_textbook_case() {
    let orbit = Orbit::from_vectors(
        earth(),
        [-2384.46, 5729.01, 3050.46],
        [-7.36138, -2.98997, 1.64354],
        0.0,
    )
    .expect("orbit");
    let tof = 48.0 * 3600.0;
    let cowell = Cowell::new(J2Perturbation::new(J2_EARTH, R_EARTH));
    let final_orbit = propagate(&orbit, tof, &cowell).expect("cowell");

    let before = orbit.elements().expect("elements");
    let after = final_orbit.elements().expect("elements");
    let hours = seconds_to_hours(tof);
    let raan_rate = wrap_pi(after.raan() - before.raan()).to_degrees() / hours;
    let argp_rate = wrap_pi(after.argp() - before.argp()).to_degrees() / hours;

    assert!((raan_rate + 0.1723).abs() < 2e-3, "raan rate = {raan_rate} deg/h");
    assert!((argp_rate - 0.2822).abs() < 3e-3, "argp rate = {argp_rate} deg/h");
}

#[test]
fn unperturbed_cowell_tracks_kepler() {
    let orbit = Orbit::from_vectors(
        earth(),
        [-6045.0, -3490.0, 2500.0],
        [-3.457, 6.618, 2.533],
        0.0,
    )
    .expect("orbit");
    let numeric = propagate(&orbit, 20_000.0, &Cowell::two_body()).expect("cowell");
    let analytic = propagate(&orbit, 20_000.0, &Kepler::default()).expect("kepler");
    for i in 0..3 {
        assert!((numeric.r()[i] - analytic.r()[i]).abs() < 1e-4);
        assert!((numeric.v()[i] - analytic.v()[i]).abs() < 1e-7);
    }
}

#[test]
fn closures_compose_with_named_models() {
    let orbit = Orbit::circular(earth(), 400.0, 0.9, 0.0, 0.0, 0.0).expect("orbit");
    let nothing = |_t: f64, _state: &[f64; 6], _k: f64| [0.0; 3];
    let model = J2Perturbation::new(J2_EARTH, R_EARTH).plus(nothing);
    let settings = CowellSettings::default();
    let (r_sum, _) = propagate_cowell(
        MU_EARTH,
        &orbit.r(),
        &orbit.v(),
        3000.0,
        &model,
        &settings,
    )
    .expect("sum");
    let (r_j2, _) = propagate_cowell(
        MU_EARTH,
        &orbit.r(),
        &orbit.v(),
        3000.0,
        &J2Perturbation::new(J2_EARTH, R_EARTH),
        &settings,
    )
    .expect("j2");
    for i in 0..3 {
        assert!((r_sum[i] - r_j2[i]).abs() < 1e-9);
    }
}

#[test]
fn edelbaum_law_raises_the_orbit_within_its_estimate() {
    let orbit = Orbit::circular(earth(), 7000.0 - R_EARTH, 0.0, 0.0, 0.0, 0.0).expect("orbit");
    let plan = change_a_inc(&orbit, 7100.0, 0.0, 1e-5).expect("plan");
    let burn = plan.estimate.time_of_flight().expect("valid estimate");
    let cowell = Cowell::new(plan.law);
    let raised = propagate(&orbit, burn, &cowell).expect("cowell");
    assert!(
        (raised.a() - 7100.0).abs() < 1.0,
        "a after the burn = {}",
        raised.a()
    );
    assert!(raised.ecc() < 5e-3);
}

fn equatorial_ellipse(a: f64, ecc: f64) -> Orbit {
    let elements = ClassicalElements::new(a, ecc, 0.0, 0.0, 0.0, 0.0);
    Orbit::from_classical(earth(), &elements, 0.0).expect("orbit")
}

#[test]
fn ecc_inc_law_circularizes_and_tilts_a_geo_ellipse() {
    let orbit = equatorial_ellipse(42_164.0, 0.1);
    let inc_f = 20.0_f64.to_radians();
    let plan = change_ecc_inc(&orbit, 0.0, inc_f, 2.4e-7).expect("plan");
    let burn = plan.estimate.time_of_flight().expect("valid estimate");
    let after = propagate(&orbit, burn, &Cowell::new(plan.law))
        .expect("cowell")
        .elements()
        .expect("elements");
    assert!(after.ecc < 1e-2, "ecc after the burn = {}", after.ecc);
    assert!((after.inc - inc_f).abs() < 1e-2, "inc after the burn = {}", after.inc);
}

#[test]
fn ecc_inc_law_circularizes_a_low_orbit_in_plane() {
    let orbit = equatorial_ellipse(R_EARTH + 900.0, 0.1245);
    let plan = change_ecc_inc(&orbit, 0.0, 0.0, 2.4e-7).expect("plan");
    let burn = plan.estimate.time_of_flight().expect("valid estimate");
    // roughly a month of thrusting
    assert!((burn / 86_400.0 - 29.7).abs() < 0.1, "burn = {burn} s");
    let after = propagate(&orbit, burn, &Cowell::new(plan.law))
        .expect("cowell")
        .elements()
        .expect("elements");
    assert!(after.ecc < 1e-3, "ecc after the burn = {}", after.ecc);
    assert!(after.inc.abs() < 1e-6);
}
