mod model;
mod reference;
mod registry;

pub use model::{CrossSectionModel, glashow_resonance_cross_section, resonance_scale};
pub use reference::reference_cross_sections;
pub use registry::{
    CANONICAL_ENERGY_POINTS, CrossSectionRegistry, TabulatedChannel, TabulatedCrossSections,
    canonical_energy_grid,
};

use crate::common::constants::{
    ELECTRON_CONCENTRATION_EARTH, ELECTRON_CONCENTRATION_WATER, NUCLEON_CONCENTRATION_EARTH,
    NUCLEON_CONCENTRATION_WATER,
};
use crate::common::units::Energy;
use crate::domain::{ComputeResult, NufluxError};
use crate::numerics::LogLogTable;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Material whose target concentration weights a cross section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    /// Bulk Earth rock traversed before the detector.
    Earth,
    /// Detector ice or water.
    IceWater,
}

impl Medium {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earth => "earth",
            Self::IceWater => "ice",
        }
    }
}

impl Display for Medium {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Medium {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source.trim().to_ascii_lowercase().as_str() {
            "earth" => Ok(Self::Earth),
            "ice" | "water" => Ok(Self::IceWater),
            _ => Err(NufluxError::configuration(
                "CONFIG.MEDIUM",
                format!("unknown target medium '{source}', expected earth, ice or water"),
            )),
        }
    }
}

/// Named cross section together with its target concentrations per medium.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionTable {
    name: String,
    model: CrossSectionModel,
    target_concentration_earth: f64,
    target_concentration_water: f64,
}

impl CrossSectionTable {
    /// Deep-inelastic table scattering off nucleons.
    pub fn tabulated(
        name: impl Into<String>,
        energies_gev: &[f64],
        cross_sections_cm2: &[f64],
    ) -> ComputeResult<Self> {
        let name = name.into();
        let table = LogLogTable::new(energies_gev, cross_sections_cm2).map_err(|source| {
            NufluxError::configuration(
                "CONFIG.CROSS_SECTION_TABLE",
                format!("invalid cross-section table '{name}': {source}"),
            )
        })?;

        Ok(Self {
            name,
            model: CrossSectionModel::Tabulated(table),
            target_concentration_earth: NUCLEON_CONCENTRATION_EARTH,
            target_concentration_water: NUCLEON_CONCENTRATION_WATER,
        })
    }

    /// Resonant channel scattering off atomic electrons.
    pub fn glashow_resonance() -> Self {
        Self {
            name: "gr".to_string(),
            model: CrossSectionModel::GlashowResonance,
            target_concentration_earth: ELECTRON_CONCENTRATION_EARTH,
            target_concentration_water: ELECTRON_CONCENTRATION_WATER,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cross section in cm².
    pub fn evaluate(&self, energy: Energy) -> f64 {
        self.model.evaluate(energy.gev())
    }

    /// Targets per gram of `medium`.
    pub fn target_concentration(&self, medium: Medium) -> f64 {
        match medium {
            Medium::Earth => self.target_concentration_earth,
            Medium::IceWater => self.target_concentration_water,
        }
    }

    /// σ(E) × targets per gram, in cm²/g.
    pub fn times_concentration(&self, energy: Energy, medium: Medium) -> f64 {
        self.evaluate(energy) * self.target_concentration(medium)
    }
}

#[cfg(test)]
mod tests {
    use super::{CrossSectionTable, Medium};
    use crate::common::constants::{ELECTRON_CONCENTRATION_WATER, NUCLEONS_PER_GRAM};
    use crate::common::units::Energy;
    use crate::domain::NufluxErrorCategory;

    #[test]
    fn medium_parses_known_names_only() {
        assert_eq!("earth".parse::<Medium>().expect("medium"), Medium::Earth);
        assert_eq!("Ice".parse::<Medium>().expect("medium"), Medium::IceWater);
        assert_eq!("water".parse::<Medium>().expect("medium"), Medium::IceWater);

        let error = "mantle".parse::<Medium>().expect_err("unknown medium");
        assert_eq!(error.category(), NufluxErrorCategory::ConfigurationError);
        assert_eq!(error.placeholder(), "CONFIG.MEDIUM");
    }

    #[test]
    fn tabulated_tables_weight_by_nucleon_concentration() {
        let table = CrossSectionTable::tabulated("nu_cc", &[10.0, 1.0e12], &[1.0e-37, 1.0e-32])
            .expect("table");
        let energy = Energy::from_gev(1.0e4).expect("energy");
        let sigma = table.evaluate(energy);

        assert!(sigma > 0.0);
        assert_eq!(
            table.times_concentration(energy, Medium::Earth),
            sigma * NUCLEONS_PER_GRAM
        );
        assert_eq!(
            table.times_concentration(energy, Medium::IceWater),
            sigma * NUCLEONS_PER_GRAM
        );
    }

    #[test]
    fn resonance_table_weights_by_electron_concentration() {
        let table = CrossSectionTable::glashow_resonance();
        let energy = Energy::from_gev(6.3e6).expect("energy");
        assert_eq!(table.name(), "gr");
        assert_eq!(
            table.times_concentration(energy, Medium::IceWater),
            table.evaluate(energy) * ELECTRON_CONCENTRATION_WATER
        );
        assert_eq!(
            table.target_concentration(Medium::Earth),
            0.5 * NUCLEONS_PER_GRAM
        );
    }

    #[test]
    fn invalid_table_is_configuration_error() {
        let error = CrossSectionTable::tabulated("nu_nc", &[10.0], &[1.0e-37])
            .expect_err("single point table");
        assert_eq!(error.placeholder(), "CONFIG.CROSS_SECTION_TABLE");
        assert!(error.message().contains("nu_nc"));
    }
}
