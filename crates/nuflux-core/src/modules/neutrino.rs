use crate::common::constants::CM3_PER_KM3;
use crate::common::species::{Channel, NeutrinoSpecies};
use crate::common::units::Energy;
use crate::domain::{ComputeResult, NufluxError};
use crate::modules::cross_section::{CrossSectionRegistry, CrossSectionTable, Medium};
use crate::modules::earth::AttenuationTable;
use crate::modules::flux::{FluxKind, FluxModel};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const DEFAULT_EFFECTIVE_VOLUME_KM3: f64 = 1.0;

/// Interaction channels that contribute to a weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    #[default]
    All,
    Only(BTreeSet<Channel>),
}

impl ChannelSelection {
    pub fn resonance_only() -> Self {
        Self::Only(BTreeSet::from([Channel::Gr]))
    }

    pub fn only(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self::Only(channels.into_iter().collect())
    }

    pub fn includes(&self, channel: Channel) -> bool {
        match self {
            Self::All => true,
            Self::Only(channels) => channels.contains(&channel),
        }
    }
}

/// A neutrino species bound to the cross sections it interacts through.
#[derive(Debug, Clone)]
pub struct Neutrino {
    species: NeutrinoSpecies,
    cross_sections: BTreeMap<Channel, Arc<CrossSectionTable>>,
    effective_volume_cm3: f64,
}

impl Neutrino {
    pub fn bind(species: NeutrinoSpecies, registry: &CrossSectionRegistry) -> ComputeResult<Self> {
        Ok(Self {
            species,
            cross_sections: registry.for_species(species)?,
            effective_volume_cm3: DEFAULT_EFFECTIVE_VOLUME_KM3 * CM3_PER_KM3,
        })
    }

    pub fn with_effective_volume_km3(mut self, volume_km3: f64) -> ComputeResult<Self> {
        if !volume_km3.is_finite() || volume_km3 <= 0.0 {
            return Err(NufluxError::configuration(
                "CONFIG.EFFECTIVE_VOLUME",
                format!("effective volume must be finite and positive, got {volume_km3} km³"),
            ));
        }
        self.effective_volume_cm3 = volume_km3 * CM3_PER_KM3;
        Ok(self)
    }

    pub fn species(&self) -> NeutrinoSpecies {
        self.species
    }

    pub fn cross_sections(&self) -> &BTreeMap<Channel, Arc<CrossSectionTable>> {
        &self.cross_sections
    }

    /// Σ σ_i(E) × targets per gram of `medium` over the selected channels, in cm²/g.
    pub fn cross_section_hits(
        &self,
        energy: Energy,
        medium: Medium,
        selection: &ChannelSelection,
    ) -> f64 {
        self.cross_sections
            .iter()
            .filter(|(channel, _)| selection.includes(**channel))
            .map(|(_, table)| table.times_concentration(energy, medium))
            .sum()
    }

    /// Probability of crossing the Earth along zenith `theta` without interacting.
    pub fn earth_attenuation(
        &self,
        energy: Energy,
        theta: f64,
        selection: &ChannelSelection,
        attenuation: &AttenuationTable,
    ) -> f64 {
        let column = attenuation.column_density(theta);
        if column == 0.0 {
            return 1.0;
        }
        (-column * self.cross_section_hits(energy, Medium::Earth, selection)).exp()
    }

    pub fn differential_flux(
        &self,
        energy: Energy,
        theta: f64,
        kind: &FluxKind,
        flux: &FluxModel,
    ) -> ComputeResult<f64> {
        flux.differential_flux(energy, theta, self.species, kind)
    }

    /// Detector volume in cm³; independent of energy and direction.
    pub fn effective_volume(&self, _energy: Energy, _theta: f64) -> f64 {
        self.effective_volume_cm3
    }
}
