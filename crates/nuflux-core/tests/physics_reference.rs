use nuflux_core::common::constants::{CM_PER_KM, EARTH_AVERAGE_DENSITY, EARTH_RADIUS_KM, PI};
use nuflux_core::common::units::Energy;
use nuflux_core::modules::cross_section::{
    CrossSectionRegistry, CrossSectionTable, glashow_resonance_cross_section,
    reference_cross_sections,
};
use nuflux_core::modules::earth::{
    DEFAULT_CHORD_SAMPLES, attenuation_parameter, density, penetration_length,
};
use nuflux_core::modules::flux::{AstroFluxParams, astro_flux};
use nuflux_core::numerics::{linear_grid, within_tolerance};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("physics_reference.json")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhysicsFixtures {
    density_cases: Vec<DensityCase>,
    resonance_cases: Vec<EnergyCase>,
    astro_cases: Vec<EnergyCase>,
    rel_tol: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DensityCase {
    id: String,
    radius_km: f64,
    expected: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnergyCase {
    id: String,
    energy_gev: f64,
    expected: f64,
}

fn load_fixtures() -> PhysicsFixtures {
    let content = fs::read_to_string(fixture_path()).expect("physics fixture should be readable");
    serde_json::from_str(&content).expect("physics fixture should parse")
}

#[test]
fn prem_density_matches_reference_cases() {
    let fixtures = load_fixtures();
    for case in &fixtures.density_cases {
        let actual = density(case.radius_km);
        assert!(
            within_tolerance(actual, case.expected, 1.0e-12, fixtures.rel_tol, 1.0e-12),
            "{}: {actual} vs {}",
            case.id,
            case.expected
        );
    }
}

#[test]
fn glashow_resonance_matches_reference_cases() {
    let fixtures = load_fixtures();
    for case in &fixtures.resonance_cases {
        let actual = glashow_resonance_cross_section(case.energy_gev);
        assert!(
            within_tolerance(actual, case.expected, 0.0, fixtures.rel_tol, 1.0e-40),
            "{}: {actual:e} vs {:e}",
            case.id,
            case.expected
        );
    }
}

#[test]
fn astro_power_law_matches_reference_cases() {
    let fixtures = load_fixtures();
    let params = AstroFluxParams::default();
    for case in &fixtures.astro_cases {
        let actual = astro_flux(case.energy_gev, &params);
        assert!(
            within_tolerance(actual, case.expected, 0.0, fixtures.rel_tol, 1.0e-40),
            "{}: {actual:e} vs {:e}",
            case.id,
            case.expected
        );
    }
}

#[test]
fn tables_vanish_outside_their_energy_domain() {
    let registry =
        CrossSectionRegistry::from_tables(&reference_cross_sections()).expect("registry");
    for name in ["nu_cc", "nu_nc", "nubar_cc", "nubar_nc"] {
        let table = registry.get(name).expect("table should be registered");
        for outside in [1.0, 9.999, 1.0001e12, 1.0e15] {
            let energy = Energy::from_gev(outside).expect("energy");
            assert_eq!(table.evaluate(energy), 0.0, "{name} at {outside} GeV");
        }
        let inside = Energy::from_gev(1.0e6).expect("energy");
        assert!(table.evaluate(inside) > 0.0);
    }

    let resonance = CrossSectionTable::glashow_resonance();
    let peak = resonance.evaluate(Energy::from_gev(6.32e6).expect("energy"));
    assert!(peak > 1.0e-31 && peak < 1.0e-30);
}

#[test]
fn chord_geometry_and_column_density_are_physical() {
    assert!((penetration_length(0.0) - 2.0 * EARTH_RADIUS_KM).abs() < 1.0e-9);
    assert!(penetration_length(0.5 * PI) < 1.0e-9);

    let angles = linear_grid(0.0, 0.5 * PI, 90).expect("grid");
    let mut previous = f64::INFINITY;
    for theta in angles {
        let length = penetration_length(theta);
        assert!(length <= previous);
        previous = length;

        let column = attenuation_parameter(theta, DEFAULT_CHORD_SAMPLES);
        let average = EARTH_AVERAGE_DENSITY * length * CM_PER_KM;
        assert!(column >= 0.0);
        assert!(column <= 2.0 * average + 1.0, "theta={theta}");
    }

    let diameter = attenuation_parameter(0.0, DEFAULT_CHORD_SAMPLES);
    let ratio = diameter / (EARTH_AVERAGE_DENSITY * 2.0 * EARTH_RADIUS_KM * CM_PER_KM);
    assert!(ratio > 1.3 && ratio < 1.7, "ratio={ratio}");
}
