use nuflux_core::common::constants::PI;
use nuflux_core::common::species::NeutrinoSpecies;
use nuflux_core::domain::{Bounds, ComputeResult, NufluxError};
use nuflux_core::modules::cross_section::{CrossSectionRegistry, reference_cross_sections};
use nuflux_core::modules::earth::AttenuationTable;
use nuflux_core::modules::flux::{
    AstroFluxParams, AtmoFluxParams, AtmosphericFlux, FileFluxStore, FluxGridKey, FluxKind,
    FluxModel, FluxSource, Month, MonthSelection, NullFluxStore,
};
use nuflux_core::modules::{
    AtmosphericSolver, ChannelSelection, EventRateIntegrator, EventRateQuery, Neutrino,
};
use nuflux_core::numerics::geometric_grid;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Deterministic stand-in for the cascade solver: an E^-3.7 spectrum with a
/// horizon enhancement and a small seasonal modulation.
struct SyntheticSolver {
    energies: Vec<f64>,
    calls: AtomicUsize,
}

impl SyntheticSolver {
    fn new() -> Self {
        Self {
            energies: geometric_grid(1.0e2, 1.0e11, 46).expect("energy grid"),
            calls: AtomicUsize::new(0),
        }
    }
}

impl AtmosphericSolver for SyntheticSolver {
    fn energy_grid(&self) -> &[f64] {
        &self.energies
    }

    fn solve(
        &self,
        zenith_deg: f64,
        species_name: &str,
        _source: FluxSource,
        month: Month,
    ) -> ComputeResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let season = 1.0 + 0.05 * ((month as usize) as f64 * PI / 6.0).cos();
        let horizon = 1.0 + (zenith_deg.to_radians().cos().abs() + 0.1).recip();
        let anti = if species_name.contains("anti") { 0.6 } else { 1.0 };
        Ok(self
            .energies
            .iter()
            .map(|energy| season * horizon * anti * 1.0e-2 * energy.powf(-3.7))
            .collect())
    }
}

struct UnavailableSolver;

impl AtmosphericSolver for UnavailableSolver {
    fn energy_grid(&self) -> &[f64] {
        &[]
    }

    fn solve(&self, _: f64, species_name: &str, _: FluxSource, _: Month) -> ComputeResult<Vec<f64>> {
        Err(NufluxError::computation(
            "RUN.ATMOSPHERIC_SOLVER",
            format!("solver unavailable for {species_name}"),
        ))
    }
}

fn registry() -> CrossSectionRegistry {
    CrossSectionRegistry::from_tables(&reference_cross_sections()).expect("registry")
}

fn integrator(solver: Arc<dyn AtmosphericSolver>) -> EventRateIntegrator {
    EventRateIntegrator::new(
        FluxModel::new(AtmosphericFlux::new(solver, Arc::new(NullFluxStore))),
        AttenuationTable::new(128, 300).expect("attenuation table"),
    )
}

fn full_sky_query(flux: FluxKind) -> EventRateQuery {
    EventRateQuery {
        energy: Bounds {
            lower: 1.0e4,
            upper: 1.0e10,
        },
        flux,
        resolution: 120,
        ..EventRateQuery::default()
    }
}

fn january_total() -> FluxKind {
    FluxKind::Total {
        astro: AstroFluxParams::default(),
        atmo: AtmoFluxParams {
            source: FluxSource::Total,
            months: MonthSelection::single(Month::January),
        },
    }
}

#[test]
fn electron_antineutrino_total_rate_is_finite_and_exceeds_resonance_only() {
    let integrator = integrator(Arc::new(SyntheticSolver::new()));
    let nu = Neutrino::bind(NeutrinoSpecies::NUBAR_E, &registry()).expect("binding");

    let total = integrator
        .event_rate(&nu, &full_sky_query(january_total()))
        .expect("total rate");
    let resonance = integrator
        .event_rate(
            &nu,
            &EventRateQuery {
                selection: ChannelSelection::resonance_only(),
                ..full_sky_query(january_total())
            },
        )
        .expect("resonance-only rate");

    assert!(total.is_finite() && total > 0.0, "total={total}");
    assert!(resonance > 0.0, "resonance={resonance}");
    assert!(resonance < total, "resonance={resonance} total={total}");
}

#[test]
fn rate_is_linear_in_the_azimuth_sweep() {
    let integrator = integrator(Arc::new(SyntheticSolver::new()));
    let nu = Neutrino::bind(NeutrinoSpecies::NU_MU, &registry()).expect("binding");

    let full = integrator
        .event_rate(&nu, &full_sky_query(january_total()))
        .expect("full sweep");
    let third = integrator
        .event_rate(
            &nu,
            &EventRateQuery {
                azimuth: Bounds {
                    lower: 1.0,
                    upper: 1.0 + 2.0 * PI / 3.0,
                },
                ..full_sky_query(january_total())
            },
        )
        .expect("partial sweep");

    assert!((3.0 * third / full - 1.0).abs() < 1.0e-10);
}

#[test]
fn disabling_attenuation_never_decreases_the_rate() {
    let integrator = integrator(Arc::new(SyntheticSolver::new()));
    for species in NeutrinoSpecies::DEFAULTS {
        let nu = Neutrino::bind(species, &registry()).expect("binding");
        let attenuated = integrator
            .event_rate(&nu, &full_sky_query(january_total()))
            .expect("attenuated rate");
        let free = integrator
            .event_rate(
                &nu,
                &EventRateQuery {
                    attenuation: false,
                    ..full_sky_query(january_total())
                },
            )
            .expect("unattenuated rate");
        assert!(free >= attenuated, "{species}: {free} < {attenuated}");
    }
}

#[test]
fn upgoing_rate_is_suppressed_more_than_downgoing_rate() {
    let integrator = integrator(Arc::new(SyntheticSolver::new()));
    let nu = Neutrino::bind(NeutrinoSpecies::NU_E, &registry()).expect("binding");
    let astro = FluxKind::Astro(AstroFluxParams::default());

    let hemisphere = |lower: f64, upper: f64, attenuation: bool| {
        integrator
            .event_rate(
                &nu,
                &EventRateQuery {
                    zenith: Bounds { lower, upper },
                    attenuation,
                    ..full_sky_query(astro.clone())
                },
            )
            .expect("hemisphere rate")
    };

    let from_below = hemisphere(0.0, 0.5 * PI, true) / hemisphere(0.0, 0.5 * PI, false);
    let from_above = hemisphere(0.5 * PI, PI, true) / hemisphere(0.5 * PI, PI, false);
    assert!(from_below < 1.0);
    assert!((from_above - 1.0).abs() < 1.0e-12);
}

#[test]
fn averaged_grid_is_the_mean_of_all_twelve_months() {
    let flux = AtmosphericFlux::new(Arc::new(SyntheticSolver::new()), Arc::new(NullFluxStore));
    let species = NeutrinoSpecies::NU_MU;

    let average = flux
        .grid(&FluxGridKey::new(
            species,
            FluxSource::Conv,
            MonthSelection::average(),
        ))
        .expect("average grid");
    let monthly: Vec<_> = Month::ALL
        .into_iter()
        .map(|month| {
            flux.grid(&FluxGridKey::monthly(species, FluxSource::Conv, month))
                .expect("monthly grid")
        })
        .collect();

    for (index, value) in average.values().iter().enumerate() {
        let mean = monthly.iter().map(|grid| grid.values()[index]).sum::<f64>() / 12.0;
        assert!((value - mean).abs() <= 1.0e-12 * mean.abs(), "node {index}");
    }
}

#[test]
fn persisted_grids_are_reused_without_solving() {
    let temp = TempDir::new().expect("tempdir should be created");
    let store = Arc::new(FileFluxStore::new(temp.path()));
    let key = FluxGridKey::monthly(NeutrinoSpecies::NUBAR_E, FluxSource::Total, Month::April);

    let solver = Arc::new(SyntheticSolver::new());
    let first = AtmosphericFlux::new(Arc::clone(&solver) as Arc<dyn AtmosphericSolver>, store.clone())
        .grid(&key)
        .expect("solved grid");
    assert!(solver.calls.load(Ordering::SeqCst) > 0);
    assert!(temp.path().join("april").join("total_antinue").is_file());

    let reloaded = AtmosphericFlux::new(Arc::new(UnavailableSolver), store)
        .grid(&key)
        .expect("grid should load from store");
    assert_eq!(*reloaded, *first);
}

#[test]
fn solver_failures_propagate_as_computation_errors() {
    let integrator = integrator(Arc::new(UnavailableSolver));
    let nu = Neutrino::bind(NeutrinoSpecies::NU_TAU, &registry()).expect("binding");
    let error = integrator
        .event_rate(&nu, &full_sky_query(january_total()))
        .expect_err("solver should fail");
    assert_eq!(error.placeholder(), "RUN.ATMOSPHERIC_SOLVER");
    assert_eq!(error.exit_code(), 4);
}
