use crate::common::constants::{
    ELECTRON_MASS, FERMI_CONSTANT, HBARC_GEV_CM, PI, RESONANCE_ENERGY_MAX, RESONANCE_ENERGY_MIN,
    W_MASS, W_MUON_BRANCHING, W_WIDTH_RATIO,
};
use crate::numerics::LogLogTable;

/// Energy dependence of a single interaction channel.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossSectionModel {
    /// Log-log interpolated table, zero outside its energy domain.
    Tabulated(LogLogTable),
    /// On-shell W production by ν̄_e e⁻ scattering.
    GlashowResonance,
}

impl CrossSectionModel {
    /// Cross section in cm² at `energy_gev`.
    pub fn evaluate(&self, energy_gev: f64) -> f64 {
        match self {
            Self::Tabulated(table) => table.evaluate(energy_gev),
            Self::GlashowResonance => glashow_resonance_cross_section(energy_gev),
        }
    }

    /// Energy range outside which the model is identically zero.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Self::Tabulated(table) => table.domain(),
            Self::GlashowResonance => (RESONANCE_ENERGY_MIN, RESONANCE_ENERGY_MAX),
        }
    }
}

/// σ0 = G_F² M_W² (ħc)² / π in cm².
pub fn resonance_scale() -> f64 {
    let coupling = FERMI_CONSTANT * W_MASS * HBARC_GEV_CM;
    coupling * coupling / PI
}

/// Breit-Wigner Glashow resonance cross section in cm².
///
/// Restricted to `[4 PeV, 8 PeV]`; identically zero outside that window.
pub fn glashow_resonance_cross_section(energy_gev: f64) -> f64 {
    if !(RESONANCE_ENERGY_MIN..=RESONANCE_ENERGY_MAX).contains(&energy_gev) {
        return 0.0;
    }

    let s = 2.0 * ELECTRON_MASS * energy_gev / (W_MASS * W_MASS);
    let detuning = 1.0 - s;
    resonance_scale() * s / (detuning * detuning + W_WIDTH_RATIO * W_WIDTH_RATIO)
        / (3.0 * W_MUON_BRANCHING)
}
