mod astro;
mod atmo;
mod sources;
mod store;

pub use astro::{AstroFluxParams, astro_flux};
pub use atmo::{AtmosphericFlux, FluxGrid, ZENITH_NODES, zenith_grid_deg};
pub use sources::{FluxGridKey, FluxSource, Month, MonthSelection};
pub use store::{ENERGY_GRID_FILE, FileFluxStore, NullFluxStore};

use crate::common::species::NeutrinoSpecies;
use crate::common::units::Energy;
use crate::domain::{ComputeResult, NufluxError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Atmospheric flux selection: parent category and months averaged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmoFluxParams {
    pub source: FluxSource,
    pub months: MonthSelection,
}

/// Closed set of flux hypotheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FluxKind {
    Astro(AstroFluxParams),
    Atmo(AtmoFluxParams),
    Total {
        astro: AstroFluxParams,
        atmo: AtmoFluxParams,
    },
}

impl Default for FluxKind {
    fn default() -> Self {
        Self::Total {
            astro: AstroFluxParams::default(),
            atmo: AtmoFluxParams::default(),
        }
    }
}

impl FluxKind {
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Astro(_) => "astro",
            Self::Atmo(_) => "atmo",
            Self::Total { .. } => "total",
        }
    }

    pub fn astro_params(&self) -> Option<&AstroFluxParams> {
        match self {
            Self::Astro(params) | Self::Total { astro: params, .. } => Some(params),
            Self::Atmo(_) => None,
        }
    }

    pub fn atmo_params(&self) -> Option<&AtmoFluxParams> {
        match self {
            Self::Atmo(params) | Self::Total { atmo: params, .. } => Some(params),
            Self::Astro(_) => None,
        }
    }

    /// Same kind with the astrophysical and atmospheric parameters replaced where present.
    pub fn with_params(&self, astro: AstroFluxParams, atmo: AtmoFluxParams) -> Self {
        match self {
            Self::Astro(_) => Self::Astro(astro),
            Self::Atmo(_) => Self::Atmo(atmo),
            Self::Total { .. } => Self::Total { astro, atmo },
        }
    }

    pub fn validate(&self) -> ComputeResult<()> {
        self.astro_params().map_or(Ok(()), AstroFluxParams::validate)
    }
}

impl Display for FluxKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FluxKind {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source.trim().to_ascii_lowercase().as_str() {
            "astro" => Ok(Self::Astro(AstroFluxParams::default())),
            "atmo" => Ok(Self::Atmo(AtmoFluxParams::default())),
            "total" => Ok(Self::default()),
            _ => Err(NufluxError::configuration(
                "CONFIG.FLUX_KIND",
                format!("unknown flux kind '{source}', expected astro, atmo or total"),
            )),
        }
    }
}

/// Differential flux dispatch over the analytic and atmospheric branches.
#[derive(Debug, Default)]
pub struct FluxModel {
    atmospheric: Option<AtmosphericFlux>,
}

impl FluxModel {
    pub fn new(atmospheric: AtmosphericFlux) -> Self {
        Self {
            atmospheric: Some(atmospheric),
        }
    }

    /// Model without an atmospheric solver; atmospheric queries fail.
    pub fn astro_only() -> Self {
        Self::default()
    }

    /// Φ(E, θ) in GeV⁻¹cm⁻²s⁻¹sr⁻¹ for `species`, with `theta` in radians.
    pub fn differential_flux(
        &self,
        energy: Energy,
        theta: f64,
        species: NeutrinoSpecies,
        kind: &FluxKind,
    ) -> ComputeResult<f64> {
        match kind {
            FluxKind::Astro(params) => Ok(astro_flux(energy.gev(), params)),
            FluxKind::Atmo(params) => self.atmo_flux(energy, theta, species, params),
            FluxKind::Total { astro, atmo } => Ok(astro_flux(energy.gev(), astro)
                + self.atmo_flux(energy, theta, species, atmo)?),
        }
    }

    /// Broadcasting evaluation: equal-length inputs pair up element-wise and a
    /// single-element input is repeated against the other.
    pub fn differential_flux_many(
        &self,
        energies: &[Energy],
        thetas: &[f64],
        species: NeutrinoSpecies,
        kind: &FluxKind,
    ) -> ComputeResult<Vec<f64>> {
        let len = match (energies.len(), thetas.len()) {
            (left, right) if left == right => left,
            (1, right) => right,
            (left, 1) => left,
            (left, right) => {
                return Err(NufluxError::configuration(
                    "CONFIG.FLUX_BROADCAST",
                    format!("cannot broadcast {left} energies against {right} angles"),
                ));
            }
        };

        (0..len)
            .map(|index| {
                let energy = energies[if energies.len() == 1 { 0 } else { index }];
                let theta = thetas[if thetas.len() == 1 { 0 } else { index }];
                self.differential_flux(energy, theta, species, kind)
            })
            .collect()
    }

    /// Populates the atmospheric grid a query will touch.
    pub fn prefetch(&self, species: NeutrinoSpecies, kind: &FluxKind) -> ComputeResult<()> {
        if let Some(params) = kind.atmo_params() {
            self.require_atmospheric()?
                .grid(&grid_key(species, params))?;
        }
        Ok(())
    }

    fn atmo_flux(
        &self,
        energy: Energy,
        theta: f64,
        species: NeutrinoSpecies,
        params: &AtmoFluxParams,
    ) -> ComputeResult<f64> {
        self.require_atmospheric()?
            .evaluate(&grid_key(species, params), energy.gev(), theta)
    }

    fn require_atmospheric(&self) -> ComputeResult<&AtmosphericFlux> {
        self.atmospheric.as_ref().ok_or_else(|| {
            NufluxError::configuration(
                "CONFIG.ATMOSPHERIC_SOLVER",
                "atmospheric flux requested but no atmospheric solver is configured",
            )
        })
    }
}

fn grid_key(species: NeutrinoSpecies, params: &AtmoFluxParams) -> FluxGridKey {
    FluxGridKey::new(species, params.source, params.months.clone())
}
