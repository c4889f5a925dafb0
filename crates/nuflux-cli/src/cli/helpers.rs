use super::CliError;
use anyhow::Context;
use nuflux_core::common::config::{RateConfig, load_rate_config};
use nuflux_core::common::constants::CM2_PER_MILLIBARN;
use nuflux_core::domain::{ComputeResult, NufluxError};
use nuflux_core::modules::AtmosphericSolver;
use nuflux_core::modules::cross_section::{
    CrossSectionRegistry, TabulatedChannel, TabulatedCrossSections, reference_cross_sections,
};
use nuflux_core::modules::flux::{
    AstroFluxParams, AtmoFluxParams, AtmosphericFlux, FileFluxStore, FluxKind, FluxModel,
    FluxSource, Month, MonthSelection,
};
use nuflux_core::modules::serialization::parse_numeric_rows;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(super) const CROSS_SECTION_FILES: [&str; 4] =
    ["nu_cc.dat", "nu_nc.dat", "nubar_cc.dat", "nubar_nc.dat"];

/// Overrides shared by every subcommand that touches configuration.
#[derive(Debug, Clone, Default)]
pub(super) struct ConfigOverrides {
    pub(super) config: Option<PathBuf>,
    pub(super) cross_section_dir: Option<PathBuf>,
    pub(super) flux_cache_dir: Option<PathBuf>,
    pub(super) gamma: Option<f64>,
    pub(super) phi_astro: Option<f64>,
    pub(super) resolution: Option<usize>,
}

pub(super) fn load_config(overrides: &ConfigOverrides) -> Result<RateConfig, CliError> {
    let mut config = match &overrides.config {
        Some(path) => load_rate_config(path).map_err(|error| CliError::Compute(error.into()))?,
        None => RateConfig::default(),
    };

    if let Some(dir) = &overrides.cross_section_dir {
        config.paths.cross_section_dir = Some(dir.clone());
    }
    if let Some(dir) = &overrides.flux_cache_dir {
        config.paths.flux_cache_dir = Some(dir.clone());
    }
    if let Some(gamma) = overrides.gamma {
        config.astro.gamma = gamma;
    }
    if let Some(phi_astro) = overrides.phi_astro {
        config.astro.phi_astro = phi_astro;
    }
    if let Some(resolution) = overrides.resolution {
        config.integration.resolution = resolution;
    }
    config.astro.validate()?;
    Ok(config)
}

/// Tables from `dir` when given, otherwise the built-in parametrization.
pub(super) fn load_registry(dir: Option<&Path>) -> Result<CrossSectionRegistry, CliError> {
    let tables = match dir {
        Some(dir) => read_cross_section_dir(dir)?,
        None => {
            tracing::debug!("no cross-section directory configured, using reference tables");
            reference_cross_sections()
        }
    };
    Ok(CrossSectionRegistry::from_tables(&tables)?)
}

fn read_cross_section_dir(dir: &Path) -> Result<TabulatedCrossSections, CliError> {
    let [nu_cc, nu_nc, nubar_cc, nubar_nc] = CROSS_SECTION_FILES;
    Ok(TabulatedCrossSections {
        nu_cc: read_cross_section_file(&dir.join(nu_cc))?,
        nu_nc: read_cross_section_file(&dir.join(nu_nc))?,
        nubar_cc: read_cross_section_file(&dir.join(nubar_cc))?,
        nubar_nc: read_cross_section_file(&dir.join(nubar_nc))?,
    })
}

/// One column of σ in mb on the canonical grid, or two columns of (GeV, mb).
pub(super) fn read_cross_section_file(path: &Path) -> Result<TabulatedChannel, CliError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read cross-section table '{}'", path.display()))?;
    let rows = parse_numeric_rows(&content).map_err(|source| {
        CliError::Compute(NufluxError::configuration(
            "CONFIG.CROSS_SECTION_TABLE",
            format!("failed to parse '{}': {source}", path.display()),
        ))
    })?;

    let width = rows.first().map_or(0, Vec::len);
    if width == 0 || width > 2 || rows.iter().any(|row| row.len() != width) {
        return Err(CliError::Compute(NufluxError::configuration(
            "CONFIG.CROSS_SECTION_TABLE",
            format!(
                "'{}' must hold one or two columns on every row",
                path.display()
            ),
        )));
    }

    let channel = if width == 1 {
        TabulatedChannel::on_canonical_grid(
            rows.iter().map(|row| row[0] * CM2_PER_MILLIBARN).collect(),
        )
    } else {
        TabulatedChannel::new(
            rows.iter().map(|row| row[0]).collect(),
            rows.iter().map(|row| row[1] * CM2_PER_MILLIBARN).collect(),
        )
    };
    tracing::debug!(
        path = %path.display(),
        points = channel.energies_gev.len(),
        "loaded cross-section table"
    );
    Ok(channel)
}

/// Atmospheric flux backed by persisted grids only.
pub(super) fn build_flux_model(cache_dir: Option<&Path>) -> FluxModel {
    match cache_dir {
        Some(root) => {
            let store = Arc::new(FileFluxStore::new(root));
            let solver = Arc::new(StoredGridSolver::new(FileFluxStore::new(root)));
            FluxModel::new(AtmosphericFlux::new(solver, store))
        }
        None => FluxModel::astro_only(),
    }
}

/// Answers only for grids that already sit in the store; the cascade solver runs elsewhere.
#[derive(Debug)]
pub(super) struct StoredGridSolver {
    store: FileFluxStore,
    energies: Vec<f64>,
}

impl StoredGridSolver {
    pub(super) fn new(store: FileFluxStore) -> Self {
        let energies = store.energy_grid().ok().flatten().unwrap_or_default();
        Self { store, energies }
    }
}

impl AtmosphericSolver for StoredGridSolver {
    fn energy_grid(&self) -> &[f64] {
        &self.energies
    }

    fn solve(
        &self,
        _zenith_deg: f64,
        species_name: &str,
        _source: FluxSource,
        month: Month,
    ) -> ComputeResult<Vec<f64>> {
        Err(NufluxError::computation(
            "RUN.FLUX_GRID_MISSING",
            format!(
                "no persisted atmospheric grid at '{}'; run the cascade solver first",
                self.store.grid_path(species_name, month).display()
            ),
        ))
    }
}

pub(super) fn flux_kind(
    kind: &str,
    source: &str,
    months: &str,
    astro: AstroFluxParams,
) -> Result<FluxKind, CliError> {
    let atmo = AtmoFluxParams {
        source: source.parse::<FluxSource>()?,
        months: months.parse::<MonthSelection>()?,
    };
    Ok(kind.parse::<FluxKind>()?.with_params(astro, atmo))
}
