use crate::domain::{ComputeResult, NufluxError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "eV")]
    ElectronVolt,
    #[serde(rename = "keV")]
    KiloElectronVolt,
    #[serde(rename = "MeV")]
    MegaElectronVolt,
    #[serde(rename = "GeV")]
    GigaElectronVolt,
    #[serde(rename = "TeV")]
    TeraElectronVolt,
    #[serde(rename = "PeV")]
    PetaElectronVolt,
    #[serde(rename = "EeV")]
    ExaElectronVolt,
}

impl EnergyUnit {
    pub const ALL: [Self; 7] = [
        Self::ElectronVolt,
        Self::KiloElectronVolt,
        Self::MegaElectronVolt,
        Self::GigaElectronVolt,
        Self::TeraElectronVolt,
        Self::PetaElectronVolt,
        Self::ExaElectronVolt,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ElectronVolt => "eV",
            Self::KiloElectronVolt => "keV",
            Self::MegaElectronVolt => "MeV",
            Self::GigaElectronVolt => "GeV",
            Self::TeraElectronVolt => "TeV",
            Self::PetaElectronVolt => "PeV",
            Self::ExaElectronVolt => "EeV",
        }
    }

    pub const fn gev_per_unit(self) -> f64 {
        match self {
            Self::ElectronVolt => 1.0e-9,
            Self::KiloElectronVolt => 1.0e-6,
            Self::MegaElectronVolt => 1.0e-3,
            Self::GigaElectronVolt => 1.0,
            Self::TeraElectronVolt => 1.0e3,
            Self::PetaElectronVolt => 1.0e6,
            Self::ExaElectronVolt => 1.0e9,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.symbol().eq_ignore_ascii_case(symbol.trim()))
    }
}

/// Strictly positive neutrino energy, stored in GeV.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Energy(f64);

impl Energy {
    pub fn new(value: f64, unit: EnergyUnit) -> ComputeResult<Self> {
        let gev = value * unit.gev_per_unit();
        if !gev.is_finite() || gev <= 0.0 {
            return Err(NufluxError::configuration(
                "CONFIG.ENERGY",
                format!(
                    "energy must be finite and strictly positive, got {} {}",
                    value,
                    unit.symbol()
                ),
            ));
        }
        Ok(Self(gev))
    }

    pub fn from_gev(gev: f64) -> ComputeResult<Self> {
        Self::new(gev, EnergyUnit::GigaElectronVolt)
    }

    /// Grid nodes produced inside the crate are positive by construction.
    pub(crate) const fn from_gev_unchecked(gev: f64) -> Self {
        Self(gev)
    }

    pub const fn gev(self) -> f64 {
        self.0
    }

    pub fn in_unit(self, unit: EnergyUnit) -> f64 {
        self.0 / unit.gev_per_unit()
    }
}

impl Display for Energy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:e} GeV", self.0)
    }
}

impl FromStr for Energy {
    type Err = NufluxError;

    /// Accepts `"<value> <unit>"`, `"<value><unit>"` or a bare number in GeV.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let trimmed = source.trim();
        let lowered = trimmed.to_ascii_lowercase();

        // Longest symbols first so "EeV" is not read as "eV".
        let suffix = EnergyUnit::ALL.into_iter().rev().find_map(|unit| {
            let symbol = unit.symbol().to_ascii_lowercase();
            lowered
                .strip_suffix(&symbol)
                .and_then(|number| number.trim().parse::<f64>().ok())
                .map(|value| (value, unit))
        });
        if let Some((value, unit)) = suffix {
            return Self::new(value, unit);
        }

        if let Ok(value) = trimmed.parse::<f64>() {
            return Self::new(value, EnergyUnit::GigaElectronVolt);
        }

        match trimmed.split_once(char::is_whitespace) {
            Some((number, unit)) if number.parse::<f64>().is_ok() => Err(
                NufluxError::configuration(
                    "CONFIG.ENERGY_UNIT",
                    format!("unknown energy unit '{}' in '{}'", unit.trim(), source),
                ),
            ),
            _ => Err(NufluxError::configuration(
                "CONFIG.ENERGY",
                format!("could not parse energy value from '{source}'"),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Energy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum EnergySource {
            Gev(f64),
            Text(String),
        }

        let energy = match EnergySource::deserialize(deserializer)? {
            EnergySource::Gev(gev) => Energy::from_gev(gev),
            EnergySource::Text(text) => text.parse(),
        };
        energy.map_err(serde::de::Error::custom)
    }
}
