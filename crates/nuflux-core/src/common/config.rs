//! JSON run configuration. Every field has a default, so `{}` is a valid file.

use crate::common::constants::ICE_DENSITY;
use crate::domain::{ComputeResult, NufluxError};
use crate::modules::earth::{AttenuationTable, DEFAULT_ATTENUATION_NODES, DEFAULT_CHORD_SAMPLES};
use crate::modules::event_rate::{DEFAULT_RESOLUTION, DetectorModel, MIN_RESONANCE_NODES};
use crate::modules::flux::AstroFluxParams;
use crate::modules::neutrino::DEFAULT_EFFECTIVE_VOLUME_KM3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateConfig {
    pub astro: AstroFluxParams,
    pub detector: DetectorConfig,
    pub integration: IntegrationConfig,
    pub attenuation: AttenuationConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    pub effective_volume_km3: f64,
    /// g/cm³
    pub ice_density: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            effective_volume_km3: DEFAULT_EFFECTIVE_VOLUME_KM3,
            ice_density: ICE_DENSITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationConfig {
    pub resolution: usize,
    pub min_resonance_nodes: usize,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            min_resonance_nodes: MIN_RESONANCE_NODES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttenuationConfig {
    pub nodes: usize,
    pub chord_samples: usize,
}

impl Default for AttenuationConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_ATTENUATION_NODES,
            chord_samples: DEFAULT_CHORD_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding `nu_cc.dat`, `nu_nc.dat`, `nubar_cc.dat`, `nubar_nc.dat`.
    pub cross_section_dir: Option<PathBuf>,
    /// Root of the persisted atmospheric flux grids.
    pub flux_cache_dir: Option<PathBuf>,
}

impl RateConfig {
    pub fn detector_model(&self) -> DetectorModel {
        DetectorModel {
            ice_density: self.detector.ice_density,
        }
    }

    pub fn attenuation_table(&self) -> ComputeResult<AttenuationTable> {
        AttenuationTable::new(self.attenuation.nodes, self.attenuation.chord_samples)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ConfigError> for NufluxError {
    fn from(error: ConfigError) -> Self {
        match &error {
            ConfigError::Read { .. } => NufluxError::io_system("IO.CONFIG", error.to_string()),
            ConfigError::Parse { .. } => {
                NufluxError::configuration("CONFIG.PARSE", error.to_string())
            }
        }
    }
}

pub fn load_rate_config(path: impl AsRef<Path>) -> Result<RateConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RateConfig, load_rate_config};
    use crate::domain::{NufluxError, NufluxErrorCategory};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn empty_object_yields_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("rate.json");
        fs::write(&path, "{}").expect("config should be written");

        let config = load_rate_config(&path).expect("config should load");
        assert_eq!(config, RateConfig::default());
        assert_eq!(config.integration.resolution, 1000);
        assert_eq!(config.integration.min_resonance_nodes, 401);
        assert_eq!(config.attenuation.nodes, 512);
        assert_eq!(config.detector.ice_density, 0.917);
    }

    #[test]
    fn partial_sections_override_only_given_fields() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("rate.json");
        fs::write(
            &path,
            r#"{
                "astro": {"gamma": 2.37},
                "integration": {"resolution": 300},
                "paths": {"flux_cache_dir": "data/atmo_flux"}
            }"#,
        )
        .expect("config should be written");

        let config = load_rate_config(&path).expect("config should load");
        assert_eq!(config.astro.gamma, 2.37);
        assert_eq!(config.astro.phi_astro, 1.66);
        assert_eq!(config.integration.resolution, 300);
        assert_eq!(config.integration.min_resonance_nodes, 401);
        assert_eq!(
            config.paths.flux_cache_dir,
            Some(PathBuf::from("data/atmo_flux"))
        );
        assert!(config.paths.cross_section_dir.is_none());
        assert_eq!(
            config.attenuation_table().expect("table").node_count(),
            512
        );
    }

    #[test]
    fn read_and_parse_failures_are_distinguished() {
        let temp = TempDir::new().expect("tempdir should be created");
        let missing = temp.path().join("missing.json");
        let error = load_rate_config(&missing).expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
        let error: NufluxError = error.into();
        assert_eq!(error.category(), NufluxErrorCategory::IoSystemError);

        let malformed = temp.path().join("bad.json");
        fs::write(&malformed, r#"{"integration": {"resolutoin": 10}}"#)
            .expect("config should be written");
        let error = load_rate_config(&malformed).expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse { .. }));
        let error: NufluxError = error.into();
        assert_eq!(error.placeholder(), "CONFIG.PARSE");
    }
}
