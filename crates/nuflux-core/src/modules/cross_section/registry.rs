use super::CrossSectionTable;
use crate::common::species::{Channel, NeutrinoSpecies};
use crate::domain::{ComputeResult, NufluxError};
use crate::numerics::geometric_grid;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const CANONICAL_ENERGY_POINTS: usize = 111;
pub(crate) const CANONICAL_ENERGY_MIN_GEV: f64 = 10.0;
pub(crate) const CANONICAL_ENERGY_MAX_GEV: f64 = 1.0e12;

/// The 111-point log-spaced grid from 10 GeV to 10^12 GeV shared by the tabulated channels.
pub fn canonical_energy_grid() -> Vec<f64> {
    geometric_grid(
        CANONICAL_ENERGY_MIN_GEV,
        CANONICAL_ENERGY_MAX_GEV,
        CANONICAL_ENERGY_POINTS,
    )
    .unwrap_or_default()
}

/// Parsed `(energy, cross section)` columns for one channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabulatedChannel {
    pub energies_gev: Vec<f64>,
    pub cross_sections_cm2: Vec<f64>,
}

impl TabulatedChannel {
    pub fn new(energies_gev: Vec<f64>, cross_sections_cm2: Vec<f64>) -> Self {
        Self {
            energies_gev,
            cross_sections_cm2,
        }
    }

    /// Values sampled on [`canonical_energy_grid`].
    pub fn on_canonical_grid(cross_sections_cm2: Vec<f64>) -> Self {
        Self::new(canonical_energy_grid(), cross_sections_cm2)
    }
}

/// The four deep-inelastic tables: (anti)neutrino × charged/neutral current.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabulatedCrossSections {
    pub nu_cc: TabulatedChannel,
    pub nu_nc: TabulatedChannel,
    pub nubar_cc: TabulatedChannel,
    pub nubar_nc: TabulatedChannel,
}

impl TabulatedCrossSections {
    fn channels(&self) -> [(NeutrinoSpecies, Channel, &TabulatedChannel); 4] {
        [
            (NeutrinoSpecies::NU_E, Channel::Cc, &self.nu_cc),
            (NeutrinoSpecies::NU_E, Channel::Nc, &self.nu_nc),
            (NeutrinoSpecies::NUBAR_E, Channel::Cc, &self.nubar_cc),
            (NeutrinoSpecies::NUBAR_E, Channel::Nc, &self.nubar_nc),
        ]
    }
}

/// Owned, read-only lookup from canonical names (`nu_cc`, `nubar_nc`, `gr`, ...)
/// to shared cross-section tables. Filled once when constructed.
#[derive(Debug, Clone, Default)]
pub struct CrossSectionRegistry {
    tables: HashMap<String, Arc<CrossSectionTable>>,
}

impl CrossSectionRegistry {
    pub fn from_tables(tabulated: &TabulatedCrossSections) -> ComputeResult<Self> {
        let mut registry = Self::default();
        for (species, channel, data) in tabulated.channels() {
            let name = species.cross_section_name(channel);
            let table =
                CrossSectionTable::tabulated(name, &data.energies_gev, &data.cross_sections_cm2)?;
            registry.insert(table)?;
        }
        registry.insert(CrossSectionTable::glashow_resonance())?;

        tracing::debug!(tables = registry.tables.len(), "cross-section registry loaded");
        Ok(registry)
    }

    pub fn insert(&mut self, table: CrossSectionTable) -> ComputeResult<()> {
        if self.tables.contains_key(table.name()) {
            return Err(NufluxError::configuration(
                "CONFIG.CROSS_SECTION_DUPLICATE",
                format!("cross-section table '{}' is already registered", table.name()),
            ));
        }
        self.tables
            .insert(table.name().to_string(), Arc::new(table));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<CrossSectionTable>> {
        self.tables.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> ComputeResult<Arc<CrossSectionTable>> {
        self.get(name).ok_or_else(|| {
            NufluxError::configuration(
                "CONFIG.CROSS_SECTION_MISSING",
                format!("cross-section table '{name}' is not registered"),
            )
        })
    }

    /// Tables for every channel the species interacts through.
    pub fn for_species(
        &self,
        species: NeutrinoSpecies,
    ) -> ComputeResult<BTreeMap<Channel, Arc<CrossSectionTable>>> {
        species
            .channels()
            .iter()
            .map(|channel| {
                self.require(&species.cross_section_name(*channel))
                    .map(|table| (*channel, table))
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
