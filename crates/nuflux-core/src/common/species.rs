use crate::domain::{ComputeResult, NufluxError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    E,
    Mu,
    Tau,
}

impl Flavor {
    pub const ALL: [Self; 3] = [Self::E, Self::Mu, Self::Tau];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::E => "e",
            Self::Mu => "mu",
            Self::Tau => "tau",
        }
    }
}

impl FromStr for Flavor {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flavor| flavor.as_str().eq_ignore_ascii_case(source.trim()))
            .ok_or_else(|| {
                NufluxError::configuration(
                    "CONFIG.FLAVOR",
                    format!("unknown neutrino flavor '{source}', expected one of e, mu, tau"),
                )
            })
    }
}

/// Interaction channel of a tabulated or analytic cross section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Charged current.
    Cc,
    /// Neutral current.
    Nc,
    /// Glashow resonance.
    Gr,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Cc, Self::Nc, Self::Gr];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cc => "cc",
            Self::Nc => "nc",
            Self::Gr => "gr",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str().eq_ignore_ascii_case(source.trim()))
            .ok_or_else(|| {
                NufluxError::configuration(
                    "CONFIG.CHANNEL",
                    format!("unknown interaction channel '{source}', expected cc, nc or gr"),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeutrinoSpecies {
    pub flavor: Flavor,
    pub anti: bool,
}

impl NeutrinoSpecies {
    pub const NU_E: Self = Self::new(Flavor::E, false);
    pub const NUBAR_E: Self = Self::new(Flavor::E, true);
    pub const NU_MU: Self = Self::new(Flavor::Mu, false);
    pub const NUBAR_MU: Self = Self::new(Flavor::Mu, true);
    pub const NU_TAU: Self = Self::new(Flavor::Tau, false);
    pub const NUBAR_TAU: Self = Self::new(Flavor::Tau, true);

    pub const DEFAULTS: [Self; 6] = [
        Self::NU_E,
        Self::NUBAR_E,
        Self::NU_MU,
        Self::NUBAR_MU,
        Self::NU_TAU,
        Self::NUBAR_TAU,
    ];

    pub const fn new(flavor: Flavor, anti: bool) -> Self {
        Self { flavor, anti }
    }

    /// Only the electron antineutrino scatters resonantly off atomic electrons.
    pub const fn has_resonance(self) -> bool {
        self.anti && matches!(self.flavor, Flavor::E)
    }

    pub const fn channels(self) -> &'static [Channel] {
        if self.has_resonance() {
            &[Channel::Cc, Channel::Nc, Channel::Gr]
        } else {
            &[Channel::Cc, Channel::Nc]
        }
    }

    /// Registry name of the cross-section table for `channel`, e.g. `nubar_cc` or `gr`.
    pub fn cross_section_name(self, channel: Channel) -> String {
        match channel {
            Channel::Gr => Channel::Gr.as_str().to_string(),
            channel => format!("{}_{}", self.particle_prefix(), channel.as_str()),
        }
    }

    /// Particle name understood by the atmospheric solver, e.g. `conv_antinue`.
    pub fn atmospheric_name(self, source: &str) -> String {
        let particle = if self.anti { "antinu" } else { "nu" };
        format!("{}_{}{}", source, particle, self.flavor.as_str())
    }

    const fn particle_prefix(self) -> &'static str {
        if self.anti { "nubar" } else { "nu" }
    }
}

impl Display for NeutrinoSpecies {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.particle_prefix(), self.flavor.as_str())
    }
}

impl FromStr for NeutrinoSpecies {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse_species(source)
    }
}

fn parse_species(source: &str) -> ComputeResult<NeutrinoSpecies> {
    let normalized = source.trim().to_ascii_lowercase();
    let (prefix, flavor) = normalized.split_once('_').ok_or_else(|| {
        NufluxError::configuration(
            "CONFIG.SPECIES",
            format!("species '{source}' must look like nu_e or nubar_mu"),
        )
    })?;

    let anti = match prefix {
        "nu" => false,
        "nubar" | "antinu" => true,
        _ => {
            return Err(NufluxError::configuration(
                "CONFIG.SPECIES",
                format!("species '{source}' must start with nu_ or nubar_"),
            ));
        }
    };

    Ok(NeutrinoSpecies::new(flavor.parse()?, anti))
}

#[cfg(test)]
mod tests {
    use super::{Channel, Flavor, NeutrinoSpecies};

    #[test]
    fn canonical_names_follow_registry_conventions() {
        let species = NeutrinoSpecies::NUBAR_E;
        assert_eq!(species.to_string(), "nubar_e");
        assert_eq!(species.cross_section_name(Channel::Cc), "nubar_cc");
        assert_eq!(species.cross_section_name(Channel::Nc), "nubar_nc");
        assert_eq!(species.cross_section_name(Channel::Gr), "gr");
        assert_eq!(species.atmospheric_name("total"), "total_antinue");
        assert_eq!(
            NeutrinoSpecies::NU_MU.atmospheric_name("conv"),
            "conv_numu"
        );
    }

    #[test]
    fn only_electron_antineutrino_binds_resonance() {
        for species in NeutrinoSpecies::DEFAULTS {
            let expected = species == NeutrinoSpecies::NUBAR_E;
            assert_eq!(species.has_resonance(), expected, "{species}");
            assert_eq!(species.channels().contains(&Channel::Gr), expected);
        }
    }

    #[test]
    fn species_parse_round_trips_display_names() {
        for species in NeutrinoSpecies::DEFAULTS {
            let parsed: NeutrinoSpecies = species.to_string().parse().expect("species");
            assert_eq!(parsed, species);
        }
        assert_eq!(
            "antinu_tau".parse::<NeutrinoSpecies>().expect("species"),
            NeutrinoSpecies::new(Flavor::Tau, true)
        );
        assert!("nu_x".parse::<NeutrinoSpecies>().is_err());
        assert!("neutrino".parse::<NeutrinoSpecies>().is_err());
    }
}
