use crate::common::constants::{
    ASTRO_FLUX_C0, ASTRO_NORMALIZATION, ASTRO_PIVOT_ENERGY, ASTRO_SPECTRAL_INDEX,
};
use crate::domain::{ComputeResult, NufluxError};
use serde::{Deserialize, Serialize};

/// Diffuse astrophysical power law, per neutrino or antineutrino.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstroFluxParams {
    pub gamma: f64,
    /// Combined ν + ν̄ normalization; half of it is assigned to each.
    pub phi_astro: f64,
}

impl Default for AstroFluxParams {
    fn default() -> Self {
        Self {
            gamma: ASTRO_SPECTRAL_INDEX,
            phi_astro: ASTRO_NORMALIZATION,
        }
    }
}

impl AstroFluxParams {
    pub fn validate(&self) -> ComputeResult<()> {
        if !self.gamma.is_finite() {
            return Err(NufluxError::configuration(
                "CONFIG.ASTRO_GAMMA",
                format!("astrophysical spectral index must be finite, got {}", self.gamma),
            ));
        }
        if !self.phi_astro.is_finite() || self.phi_astro < 0.0 {
            return Err(NufluxError::configuration(
                "CONFIG.ASTRO_PHI",
                format!(
                    "astrophysical normalization must be finite and non-negative, got {}",
                    self.phi_astro
                ),
            ));
        }
        Ok(())
    }
}

/// `C0 · φ/2 · (E/E0)^-γ` in GeV⁻¹cm⁻²s⁻¹sr⁻¹.
pub fn astro_flux(energy_gev: f64, params: &AstroFluxParams) -> f64 {
    ASTRO_FLUX_C0 * 0.5 * params.phi_astro * (energy_gev / ASTRO_PIVOT_ENERGY).powf(-params.gamma)
}
