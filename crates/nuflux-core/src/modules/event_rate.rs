//! Expected yearly interaction count in a detector volume.
//!
//! The integrand is `V_eff · ρ_ice · Σσ·n · Φ · P_survive · sin θ`, integrated by
//! the trapezoid rule on a geometric energy grid and a linear zenith grid, then
//! scaled by the azimuth sweep and one Julian year.

use crate::common::constants::{
    ICE_DENSITY, PI, RESONANCE_ENERGY_MAX, RESONANCE_ENERGY_MIN, SECONDS_PER_YEAR,
};
use crate::common::units::Energy;
use crate::domain::{Bounds, ComputeResult, NufluxError};
use crate::modules::cross_section::Medium;
use crate::modules::earth::AttenuationTable;
use crate::modules::flux::{FluxKind, FluxModel};
use crate::modules::neutrino::{ChannelSelection, Neutrino};
use crate::numerics::{geometric_grid, linear_grid, trapezoid};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESOLUTION: usize = 1000;
pub const MIN_RESONANCE_NODES: usize = 401;
pub const DEFAULT_ENERGY_MIN_GEV: f64 = 1.0e4;
pub const DEFAULT_ENERGY_MAX_GEV: f64 = 1.0e12;

#[derive(Debug, Clone, PartialEq)]
pub struct EventRateQuery {
    /// Neutrino energy range in GeV.
    pub energy: Bounds,
    /// Zenith range in radians within `[0, π]`.
    pub zenith: Bounds,
    /// Azimuth range in radians.
    pub azimuth: Bounds,
    pub flux: FluxKind,
    pub attenuation: bool,
    pub selection: ChannelSelection,
    /// Grid points per axis.
    pub resolution: usize,
}

impl Default for EventRateQuery {
    fn default() -> Self {
        Self {
            energy: Bounds {
                lower: DEFAULT_ENERGY_MIN_GEV,
                upper: DEFAULT_ENERGY_MAX_GEV,
            },
            zenith: Bounds {
                lower: 0.0,
                upper: PI,
            },
            azimuth: Bounds {
                lower: 0.0,
                upper: 2.0 * PI,
            },
            flux: FluxKind::default(),
            attenuation: true,
            selection: ChannelSelection::All,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl EventRateQuery {
    pub fn with_energy(mut self, lower: Energy, upper: Energy) -> Self {
        self.energy = Bounds {
            lower: lower.gev(),
            upper: upper.gev(),
        };
        self
    }

    pub fn validate(&self) -> ComputeResult<()> {
        self.energy.validate("CONFIG.ENERGY_BOUNDS")?;
        if self.energy.lower <= 0.0 {
            return Err(NufluxError::configuration(
                "CONFIG.ENERGY_BOUNDS",
                format!("energy bounds must be positive, got {}", self.energy),
            ));
        }

        self.zenith.validate("CONFIG.ZENITH_BOUNDS")?;
        if self.zenith.lower < 0.0 || self.zenith.upper > PI {
            return Err(NufluxError::configuration(
                "CONFIG.ZENITH_BOUNDS",
                format!("zenith bounds must lie within [0, π], got {}", self.zenith),
            ));
        }

        self.azimuth.validate("CONFIG.AZIMUTH_BOUNDS")?;

        if self.resolution < 2 {
            return Err(NufluxError::configuration(
                "CONFIG.RESOLUTION",
                format!("resolution must be at least 2, got {}", self.resolution),
            ));
        }

        self.flux.validate()
    }
}

/// Detector medium surrounding the instrumented volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorModel {
    /// g/cm³
    pub ice_density: f64,
}

impl Default for DetectorModel {
    fn default() -> Self {
        Self {
            ice_density: ICE_DENSITY,
        }
    }
}

/// One energy sub-range of the integral.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRate {
    pub energy: Bounds,
    pub nodes: usize,
    pub resonance_window: bool,
    pub rate_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRateReport {
    pub rate_per_year: f64,
    pub segments: Vec<SegmentRate>,
}

#[derive(Debug)]
pub struct EventRateIntegrator {
    flux: FluxModel,
    attenuation: AttenuationTable,
    detector: DetectorModel,
    min_resonance_nodes: usize,
}

impl EventRateIntegrator {
    pub fn new(flux: FluxModel, attenuation: AttenuationTable) -> Self {
        Self {
            flux,
            attenuation,
            detector: DetectorModel::default(),
            min_resonance_nodes: MIN_RESONANCE_NODES,
        }
    }

    pub fn with_detector(mut self, detector: DetectorModel) -> ComputeResult<Self> {
        if !detector.ice_density.is_finite() || detector.ice_density <= 0.0 {
            return Err(NufluxError::configuration(
                "CONFIG.ICE_DENSITY",
                format!(
                    "ice density must be finite and positive, got {}",
                    detector.ice_density
                ),
            ));
        }
        self.detector = detector;
        Ok(self)
    }

    pub fn with_min_resonance_nodes(mut self, nodes: usize) -> ComputeResult<Self> {
        if nodes < 2 {
            return Err(NufluxError::configuration(
                "CONFIG.RESONANCE_NODES",
                format!("resonance window needs at least 2 nodes, got {nodes}"),
            ));
        }
        self.min_resonance_nodes = nodes;
        Ok(self)
    }

    pub fn flux(&self) -> &FluxModel {
        &self.flux
    }

    pub fn attenuation(&self) -> &AttenuationTable {
        &self.attenuation
    }

    pub fn detector(&self) -> &DetectorModel {
        &self.detector
    }

    /// Expected events per year.
    pub fn event_rate(&self, neutrino: &Neutrino, query: &EventRateQuery) -> ComputeResult<f64> {
        self.event_rate_report(neutrino, query)
            .map(|report| report.rate_per_year)
    }

    /// Expected events per year, broken down by energy segment.
    pub fn event_rate_report(
        &self,
        neutrino: &Neutrino,
        query: &EventRateQuery,
    ) -> ComputeResult<EventRateReport> {
        query.validate()?;
        self.flux.prefetch(neutrino.species(), &query.flux)?;

        let thetas = linear_grid(query.zenith.lower, query.zenith.upper, query.resolution)
            .ok_or_else(|| resolution_error(query.resolution))?;
        let per_year = query.azimuth.width() * SECONDS_PER_YEAR;

        let segments = energy_segments(query.energy)
            .into_iter()
            .map(|(energy, resonance_window)| {
                let nodes = self.segment_nodes(query.resolution, resonance_window);
                let rate = self.integrate_segment(neutrino, query, energy, nodes, &thetas)?;
                Ok(SegmentRate {
                    energy,
                    nodes,
                    resonance_window,
                    rate_per_year: rate * per_year,
                })
            })
            .collect::<ComputeResult<Vec<_>>>()?;

        let rate_per_year = segments.iter().map(|segment| segment.rate_per_year).sum();
        tracing::debug!(
            species = %neutrino.species(),
            flux = %query.flux,
            segments = segments.len(),
            rate_per_year,
            "event rate integrated"
        );

        Ok(EventRateReport {
            rate_per_year,
            segments,
        })
    }

    fn segment_nodes(&self, resolution: usize, resonance_window: bool) -> usize {
        if resonance_window && resolution < self.min_resonance_nodes {
            tracing::warn!(
                requested = resolution,
                refined = self.min_resonance_nodes,
                "energy grid too coarse for the Glashow resonance window, refining"
            );
            return self.min_resonance_nodes;
        }
        resolution
    }

    fn integrate_segment(
        &self,
        neutrino: &Neutrino,
        query: &EventRateQuery,
        energy: Bounds,
        nodes: usize,
        thetas: &[f64],
    ) -> ComputeResult<f64> {
        let energies = geometric_grid(energy.lower, energy.upper, nodes)
            .ok_or_else(|| resolution_error(nodes))?;

        let angular = energies
            .par_iter()
            .map(|energy_gev| {
                self.angular_integral(neutrino, query, Energy::from_gev_unchecked(*energy_gev), thetas)
            })
            .collect::<ComputeResult<Vec<f64>>>()?;

        trapezoid(&angular, &energies).ok_or_else(|| resolution_error(nodes))
    }

    /// ∫ dθ of the integrand at a fixed energy.
    fn angular_integral(
        &self,
        neutrino: &Neutrino,
        query: &EventRateQuery,
        energy: Energy,
        thetas: &[f64],
    ) -> ComputeResult<f64> {
        let hits = neutrino.cross_section_hits(energy, Medium::IceWater, &query.selection);
        if hits == 0.0 {
            return Ok(0.0);
        }

        let values = thetas
            .iter()
            .map(|theta| {
                let flux = neutrino.differential_flux(energy, *theta, &query.flux, &self.flux)?;
                let survival = if query.attenuation {
                    neutrino.earth_attenuation(energy, *theta, &query.selection, &self.attenuation)
                } else {
                    1.0
                };
                Ok(neutrino.effective_volume(energy, *theta)
                    * self.detector.ice_density
                    * hits
                    * flux
                    * survival
                    * theta.sin())
            })
            .collect::<ComputeResult<Vec<f64>>>()?;

        trapezoid(&values, thetas).ok_or_else(|| resolution_error(thetas.len()))
    }
}

/// Splits `energy` at the resonance window edges; the flag marks the in-window piece.
pub fn energy_segments(energy: Bounds) -> Vec<(Bounds, bool)> {
    [
        (0.0, RESONANCE_ENERGY_MIN, false),
        (RESONANCE_ENERGY_MIN, RESONANCE_ENERGY_MAX, true),
        (RESONANCE_ENERGY_MAX, f64::INFINITY, false),
    ]
    .into_iter()
    .filter_map(|(lower, upper, window)| {
        energy
            .intersect(lower, upper)
            .map(|segment| (segment, window))
    })
    .collect()
}

fn resolution_error(resolution: usize) -> NufluxError {
    NufluxError::configuration(
        "CONFIG.RESOLUTION",
        format!("resolution must be at least 2, got {resolution}"),
    )
}

#[cfg(test)]
mod tests {
    use super::{EventRateIntegrator, EventRateQuery, energy_segments};
    use crate::common::constants::PI;
    use crate::domain::Bounds;
    use crate::modules::cross_section::{CrossSectionRegistry, reference_cross_sections};
    use crate::modules::earth::AttenuationTable;
    use crate::modules::flux::{AstroFluxParams, FluxKind, FluxModel};
    use crate::modules::neutrino::{ChannelSelection, Neutrino};
    use crate::common::species::NeutrinoSpecies;

    fn astro_query(resolution: usize) -> EventRateQuery {
        EventRateQuery {
            flux: FluxKind::Astro(AstroFluxParams::default()),
            resolution,
            ..EventRateQuery::default()
        }
    }

    fn integrator() -> EventRateIntegrator {
        EventRateIntegrator::new(
            FluxModel::astro_only(),
            AttenuationTable::new(64, 200).expect("table"),
        )
    }

    fn neutrino(species: NeutrinoSpecies) -> Neutrino {
        let registry =
            CrossSectionRegistry::from_tables(&reference_cross_sections()).expect("registry");
        Neutrino::bind(species, &registry).expect("binding")
    }

    #[test]
    fn segments_split_at_resonance_window() {
        let full = energy_segments(Bounds {
            lower: 1.0e4,
            upper: 1.0e10,
        });
        assert_eq!(full.len(), 3);
        assert_eq!(full[1].0, Bounds { lower: 4.0e6, upper: 8.0e6 });
        assert!(full[1].1);

        let inside = energy_segments(Bounds {
            lower: 5.0e6,
            upper: 6.0e6,
        });
        assert_eq!(inside.len(), 1);
        assert!(inside[0].1);

        let below = energy_segments(Bounds {
            lower: 1.0e3,
            upper: 4.0e6,
        });
        assert_eq!(below.len(), 1);
        assert!(!below[0].1);
    }

    #[test]
    fn malformed_queries_are_configuration_errors() {
        let cases = [
            (
                EventRateQuery {
                    energy: Bounds { lower: 1.0e6, upper: 1.0e5 },
                    ..astro_query(10)
                },
                "CONFIG.ENERGY_BOUNDS",
            ),
            (
                EventRateQuery {
                    energy: Bounds { lower: -1.0, upper: 1.0e5 },
                    ..astro_query(10)
                },
                "CONFIG.ENERGY_BOUNDS",
            ),
            (
                EventRateQuery {
                    zenith: Bounds { lower: 0.0, upper: 4.0 },
                    ..astro_query(10)
                },
                "CONFIG.ZENITH_BOUNDS",
            ),
            (
                EventRateQuery {
                    azimuth: Bounds { lower: 1.0, upper: 1.0 },
                    ..astro_query(10)
                },
                "CONFIG.AZIMUTH_BOUNDS",
            ),
            (astro_query(1), "CONFIG.RESOLUTION"),
        ];

        let integrator = integrator();
        let nu = neutrino(NeutrinoSpecies::NU_E);
        for (query, placeholder) in cases {
            let error = integrator
                .event_rate(&nu, &query)
                .expect_err("query should be rejected");
            assert_eq!(error.placeholder(), placeholder);
        }
    }

    #[test]
    fn coarse_requests_refine_the_resonance_window() {
        let report = integrator()
            .event_rate_report(&neutrino(NeutrinoSpecies::NUBAR_E), &astro_query(40))
            .expect("report");
        let nodes: Vec<usize> = report.segments.iter().map(|segment| segment.nodes).collect();
        assert_eq!(nodes, vec![40, 401, 40]);
        assert!(report.rate_per_year > 0.0);
        let sum: f64 = report.segments.iter().map(|segment| segment.rate_per_year).sum();
        assert_eq!(sum, report.rate_per_year);
    }

    #[test]
    fn rate_scales_linearly_with_azimuth_sweep() {
        let integrator = integrator();
        let nu = neutrino(NeutrinoSpecies::NU_MU);
        let full = integrator.event_rate(&nu, &astro_query(60)).expect("rate");
        let quarter = integrator
            .event_rate(
                &nu,
                &EventRateQuery {
                    azimuth: Bounds { lower: 0.0, upper: 0.5 * PI },
                    ..astro_query(60)
                },
            )
            .expect("rate");
        assert!((quarter * 4.0 / full - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn attenuation_never_increases_the_rate() {
        let integrator = integrator();
        let nu = neutrino(NeutrinoSpecies::NUBAR_E);
        let attenuated = integrator.event_rate(&nu, &astro_query(60)).expect("rate");
        let free = integrator
            .event_rate(
                &nu,
                &EventRateQuery {
                    attenuation: false,
                    ..astro_query(60)
                },
            )
            .expect("rate");
        assert!(free >= attenuated);
        assert!(attenuated > 0.0);
    }

    #[test]
    fn resonance_only_rate_is_a_strict_fraction() {
        let integrator = integrator();
        let nu = neutrino(NeutrinoSpecies::NUBAR_E);
        let total = integrator.event_rate(&nu, &astro_query(60)).expect("rate");
        let resonance = integrator
            .event_rate(
                &nu,
                &EventRateQuery {
                    selection: ChannelSelection::resonance_only(),
                    ..astro_query(60)
                },
            )
            .expect("rate");
        assert!(resonance > 0.0);
        assert!(resonance < total);
    }
}
