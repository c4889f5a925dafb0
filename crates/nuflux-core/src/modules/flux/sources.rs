use crate::common::species::NeutrinoSpecies;
use crate::domain::{ComputeResult, NufluxError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Parent-meson category of an atmospheric flux component.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FluxSource {
    #[default]
    Total,
    Pi,
    K,
    /// Prompt charm decays.
    Pr,
    /// Conventional (pion + kaon).
    Conv,
}

impl FluxSource {
    pub const ALL: [Self; 5] = [Self::Total, Self::Pi, Self::K, Self::Pr, Self::Conv];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Pi => "pi",
            Self::K => "k",
            Self::Pr => "pr",
            Self::Conv => "conv",
        }
    }
}

impl Display for FluxSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FluxSource {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(source.trim()))
            .ok_or_else(|| {
                NufluxError::configuration(
                    "CONFIG.FLUX_SOURCE",
                    format!(
                        "unknown atmospheric flux source '{source}', expected one of total, pi, k, pr, conv"
                    ),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    /// Lowercase directory name used by the grid store.
    pub fn directory_name(self) -> String {
        self.name().to_ascii_lowercase()
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = NufluxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let trimmed = source.trim();
        Self::ALL
            .into_iter()
            .find(|month| {
                month.name().eq_ignore_ascii_case(trimmed)
                    || (trimmed.len() == 3 && month.name()[..3].eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| {
                NufluxError::configuration(
                    "CONFIG.MONTH",
                    format!("unknown month '{source}'"),
                )
            })
    }
}

/// Non-empty set of months whose grids are averaged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthSelection(Vec<Month>);

impl MonthSelection {
    pub fn new(months: impl IntoIterator<Item = Month>) -> ComputeResult<Self> {
        let mut months: Vec<Month> = months.into_iter().collect();
        months.sort_unstable();
        months.dedup();
        if months.is_empty() {
            return Err(NufluxError::configuration(
                "CONFIG.MONTH",
                "month selection must contain at least one month",
            ));
        }
        Ok(Self(months))
    }

    /// All twelve months.
    pub fn average() -> Self {
        Self(Month::ALL.to_vec())
    }

    pub fn single(month: Month) -> Self {
        Self(vec![month])
    }

    pub fn months(&self) -> &[Month] {
        &self.0
    }

    pub fn as_single(&self) -> Option<Month> {
        match self.0.as_slice() {
            [month] => Some(*month),
            _ => None,
        }
    }

    pub fn is_average(&self) -> bool {
        self.0.len() == Month::ALL.len()
    }
}

impl Default for MonthSelection {
    fn default() -> Self {
        Self::average()
    }
}

impl Display for MonthSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_average() {
            return f.write_str("Average");
        }
        let names: Vec<&str> = self.0.iter().map(|month| month.name()).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for MonthSelection {
    type Err = NufluxError;

    /// `"Average"` selects all twelve months; otherwise a comma-separated list.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        if source.trim().eq_ignore_ascii_case("average") {
            return Ok(Self::average());
        }
        let months = source
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<ComputeResult<Vec<Month>>>()?;
        Self::new(months)
    }
}

impl TryFrom<String> for MonthSelection {
    type Error = NufluxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthSelection> for String {
    fn from(value: MonthSelection) -> Self {
        value.to_string()
    }
}

/// Cache key of an atmospheric flux grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FluxGridKey {
    pub species: NeutrinoSpecies,
    pub source: FluxSource,
    pub months: MonthSelection,
}

impl FluxGridKey {
    pub fn new(species: NeutrinoSpecies, source: FluxSource, months: MonthSelection) -> Self {
        Self {
            species,
            source,
            months,
        }
    }

    pub fn monthly(species: NeutrinoSpecies, source: FluxSource, month: Month) -> Self {
        Self::new(species, source, MonthSelection::single(month))
    }

    /// Particle name understood by the solver and the store, e.g. `total_antinue`.
    pub fn species_name(&self) -> String {
        self.species.atmospheric_name(self.source.as_str())
    }
}

impl Display for FluxGridKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.species_name(), self.months)
    }
}
