use super::atmo::{FluxGrid, zenith_grid_deg};
use super::sources::Month;
use crate::domain::{ComputeResult, NufluxError};
use crate::modules::serialization::{format_numeric_rows, parse_numeric_rows, write_text_artifact};
use crate::modules::traits::FluxGridStore;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENERGY_GRID_FILE: &str = "energy_grid.dat";

/// Store that never finds or keeps anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFluxStore;

impl FluxGridStore for NullFluxStore {
    fn load(&self, _species_name: &str, _month: Month) -> ComputeResult<Option<FluxGrid>> {
        Ok(None)
    }

    fn save(&self, _species_name: &str, _month: Month, _grid: &FluxGrid) -> ComputeResult<()> {
        Ok(())
    }
}

/// Plain-text grid store laid out as `<root>/<month>/<species_name>`, one row
/// per zenith node, with the shared energy axis in `<root>/energy_grid.dat`.
#[derive(Debug, Clone)]
pub struct FileFluxStore {
    root: PathBuf,
}

impl FileFluxStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn grid_path(&self, species_name: &str, month: Month) -> PathBuf {
        self.root.join(month.directory_name()).join(species_name)
    }

    pub fn energy_grid_path(&self) -> PathBuf {
        self.root.join(ENERGY_GRID_FILE)
    }

    /// Shared energy axis, if one has been written.
    pub fn energy_grid(&self) -> ComputeResult<Option<Vec<f64>>> {
        let path = self.energy_grid_path();
        if !path.is_file() {
            return Ok(None);
        }
        let rows = read_rows(&path)?;
        Ok(Some(rows.into_iter().flatten().collect()))
    }
}

impl FluxGridStore for FileFluxStore {
    fn load(&self, species_name: &str, month: Month) -> ComputeResult<Option<FluxGrid>> {
        let path = self.grid_path(species_name, month);
        if !path.is_file() {
            return Ok(None);
        }

        let energies = self.energy_grid()?.ok_or_else(|| {
            NufluxError::io_system(
                "IO.FLUX_STORE",
                format!(
                    "flux grid '{}' exists but energy axis '{}' is missing",
                    path.display(),
                    self.energy_grid_path().display()
                ),
            )
        })?;
        let zenith = zenith_grid_deg();
        let rows = read_rows(&path)?;
        if rows.len() != zenith.len() || rows.iter().any(|row| row.len() != energies.len()) {
            return Err(NufluxError::io_system(
                "IO.FLUX_STORE",
                format!(
                    "flux grid '{}' must have {} rows of {} values",
                    path.display(),
                    zenith.len(),
                    energies.len()
                ),
            ));
        }

        FluxGrid::new(zenith, energies, rows.concat()).map(Some)
    }

    fn save(&self, species_name: &str, month: Month, grid: &FluxGrid) -> ComputeResult<()> {
        let energy_path = self.energy_grid_path();
        if self.energy_grid()?.as_deref() != Some(grid.energies_gev()) {
            let column: Vec<&[f64]> = grid.energies_gev().chunks(1).collect();
            write_text_artifact(&energy_path, &format_numeric_rows(column))
                .map_err(|source| write_error(&energy_path, source))?;
        }

        let path = self.grid_path(species_name, month);
        write_text_artifact(&path, &format_numeric_rows(grid.rows()))
            .map_err(|source| write_error(&path, source))
    }
}

fn read_rows(path: &Path) -> ComputeResult<Vec<Vec<f64>>> {
    let content = fs::read_to_string(path).map_err(|source| {
        NufluxError::io_system(
            "IO.FLUX_STORE",
            format!("failed to read '{}': {source}", path.display()),
        )
    })?;
    parse_numeric_rows(&content).map_err(|source| {
        NufluxError::io_system(
            "IO.FLUX_STORE",
            format!("failed to parse '{}': {source}", path.display()),
        )
    })
}

fn write_error(path: &Path, source: std::io::Error) -> NufluxError {
    NufluxError::io_system(
        "IO.FLUX_STORE",
        format!("failed to write '{}': {source}", path.display()),
    )
}
