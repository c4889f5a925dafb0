//! Smooth deep-inelastic reference cross sections used when no tabulated
//! structure-function files are supplied.
//!
//! Below ~10 TeV the cross section rises linearly with energy; at high energy it
//! follows the Gandhi et al. power laws. The two regimes are joined by a
//! harmonic blend, which keeps the curve monotone and log-log smooth.

use super::registry::{TabulatedChannel, TabulatedCrossSections, canonical_energy_grid};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PowerLawBlend {
    /// Linear-regime slope in cm²/GeV.
    low_slope: f64,
    /// High-energy normalization in cm² at 1 GeV.
    high_normalization: f64,
    high_index: f64,
}

impl PowerLawBlend {
    fn evaluate(self, energy_gev: f64) -> f64 {
        let low = self.low_slope * energy_gev;
        let high = self.high_normalization * energy_gev.powf(self.high_index);
        1.0 / (1.0 / low + 1.0 / high)
    }

    fn sample(self, energies_gev: &[f64]) -> Vec<f64> {
        energies_gev
            .iter()
            .map(|energy| self.evaluate(*energy))
            .collect()
    }
}

const NU_CC: PowerLawBlend = PowerLawBlend {
    low_slope: 0.677e-38,
    high_normalization: 2.69e-36,
    high_index: 0.402,
};
const NU_NC: PowerLawBlend = PowerLawBlend {
    low_slope: 0.21e-38,
    high_normalization: 1.06e-36,
    high_index: 0.408,
};
const NUBAR_CC: PowerLawBlend = PowerLawBlend {
    low_slope: 0.334e-38,
    high_normalization: 2.53e-36,
    high_index: 0.404,
};
const NUBAR_NC: PowerLawBlend = PowerLawBlend {
    low_slope: 0.12e-38,
    high_normalization: 0.98e-36,
    high_index: 0.410,
};

/// Reference tables for the four deep-inelastic channels on the canonical grid.
pub fn reference_cross_sections() -> TabulatedCrossSections {
    let grid = canonical_energy_grid();
    TabulatedCrossSections {
        nu_cc: TabulatedChannel::new(grid.clone(), NU_CC.sample(&grid)),
        nu_nc: TabulatedChannel::new(grid.clone(), NU_NC.sample(&grid)),
        nubar_cc: TabulatedChannel::new(grid.clone(), NUBAR_CC.sample(&grid)),
        nubar_nc: TabulatedChannel::new(grid.clone(), NUBAR_NC.sample(&grid)),
    }
}
