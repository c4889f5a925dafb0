//! Atmospheric flux grids: solved once per (species, source, month), persisted,
//! averaged over months, and interpolated in (zenith, log10 energy).

use super::sources::{FluxGridKey, FluxSource, Month};
use crate::common::cache::OnceCache;
use crate::common::constants::DEG_PER_RAD;
use crate::common::species::NeutrinoSpecies;
use crate::domain::{ComputeResult, NufluxError};
use crate::modules::traits::{AtmosphericSolver, FluxGridStore};
use crate::numerics::{GridSurface, linear_grid};
use rayon::prelude::*;
use std::sync::Arc;

pub const ZENITH_NODES: usize = 81;

/// Zenith nodes in degrees, equidistant in `cos θ` from 0° to 180°.
pub fn zenith_grid_deg() -> Vec<f64> {
    linear_grid(1.0, -1.0, ZENITH_NODES)
        .unwrap_or_default()
        .into_iter()
        .map(|cos_theta| cos_theta.clamp(-1.0, 1.0).acos() * DEG_PER_RAD)
        .collect()
}

/// Flux values over (zenith degrees × solver energy grid), one row per zenith node.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxGrid {
    energies_gev: Vec<f64>,
    surface: GridSurface,
}

impl FluxGrid {
    pub fn new(zenith_deg: Vec<f64>, energies_gev: Vec<f64>, values: Vec<f64>) -> ComputeResult<Self> {
        if let Some(energy) = energies_gev.iter().find(|energy| !(**energy > 0.0)) {
            return Err(NufluxError::computation(
                "RUN.FLUX_GRID",
                format!("flux grid energies must be positive, got {energy}"),
            ));
        }
        let log_energies = energies_gev.iter().map(|energy| energy.log10()).collect();
        let surface = GridSurface::new(zenith_deg, log_energies, values).map_err(|source| {
            NufluxError::computation("RUN.FLUX_GRID", format!("invalid flux grid: {source}"))
        })?;

        Ok(Self {
            energies_gev,
            surface,
        })
    }

    pub fn zenith_deg(&self) -> &[f64] {
        self.surface.axis0()
    }

    pub fn energies_gev(&self) -> &[f64] {
        &self.energies_gev
    }

    pub fn values(&self) -> &[f64] {
        self.surface.values()
    }

    pub fn row(&self, zenith_index: usize) -> &[f64] {
        self.surface.row(zenith_index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.zenith_deg().len()).map(|index| self.row(index))
    }

    pub fn value(&self, zenith_index: usize, energy_index: usize) -> f64 {
        self.surface.value(zenith_index, energy_index)
    }

    /// Node-wise arithmetic mean of grids sharing the same axes.
    pub fn average(grids: &[Arc<FluxGrid>]) -> ComputeResult<Self> {
        let Some(first) = grids.first() else {
            return Err(NufluxError::internal(
                "RUN.FLUX_AVERAGE",
                "cannot average an empty set of flux grids",
            ));
        };
        if let Some(mismatch) = grids.iter().find(|grid| {
            grid.zenith_deg() != first.zenith_deg() || grid.energies_gev() != first.energies_gev()
        }) {
            return Err(NufluxError::computation(
                "RUN.FLUX_AVERAGE",
                format!(
                    "flux grids disagree on axes: {}x{} vs {}x{}",
                    first.zenith_deg().len(),
                    first.energies_gev().len(),
                    mismatch.zenith_deg().len(),
                    mismatch.energies_gev().len()
                ),
            ));
        }

        let count = grids.len() as f64;
        let values = (0..first.values().len())
            .map(|index| grids.iter().map(|grid| grid.values()[index]).sum::<f64>() / count)
            .collect();
        Self::new(
            first.zenith_deg().to_vec(),
            first.energies_gev().to_vec(),
            values,
        )
    }

    /// Cubic interpolation at `(energy_gev, zenith_deg)`.
    ///
    /// Energies outside the grid give zero, zenith clamps to the grid, and
    /// negative overshoot clamps to zero.
    pub fn interpolate(&self, energy_gev: f64, zenith_deg: f64) -> f64 {
        let (Some(low), Some(high)) = (self.energies_gev.first(), self.energies_gev.last()) else {
            return 0.0;
        };
        if energy_gev.is_nan() || energy_gev < *low || energy_gev > *high {
            return 0.0;
        }

        let value = self.surface.evaluate(zenith_deg, energy_gev.log10());
        if value.is_nan() { 0.0 } else { value.max(0.0) }
    }
}

/// Get-or-compute cache of atmospheric flux grids over an injected solver and store.
pub struct AtmosphericFlux {
    solver: Arc<dyn AtmosphericSolver>,
    store: Arc<dyn FluxGridStore>,
    zenith_deg: Vec<f64>,
    grids: OnceCache<FluxGridKey, FluxGrid>,
}

impl std::fmt::Debug for AtmosphericFlux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtmosphericFlux")
            .field("zenith_nodes", &self.zenith_deg.len())
            .field("energy_nodes", &self.solver.energy_grid().len())
            .field("cached_grids", &self.grids.len())
            .finish()
    }
}

impl AtmosphericFlux {
    pub fn new(solver: Arc<dyn AtmosphericSolver>, store: Arc<dyn FluxGridStore>) -> Self {
        Self {
            solver,
            store,
            zenith_deg: zenith_grid_deg(),
            grids: OnceCache::new(),
        }
    }

    pub fn zenith_grid(&self) -> &[f64] {
        &self.zenith_deg
    }

    pub fn cached_grids(&self) -> usize {
        self.grids.len()
    }

    /// Grid for `key`, averaging monthly grids when several months are selected.
    pub fn grid(&self, key: &FluxGridKey) -> ComputeResult<Arc<FluxGrid>> {
        if let Some(month) = key.months.as_single() {
            return self.monthly_grid(key.species, key.source, month);
        }

        self.grids.get_or_try_compute(key, || {
            let monthly = key
                .months
                .months()
                .par_iter()
                .map(|month| self.monthly_grid(key.species, key.source, *month))
                .collect::<ComputeResult<Vec<_>>>()?;
            tracing::debug!(key = %key, months = monthly.len(), "averaging monthly flux grids");
            FluxGrid::average(&monthly)
        })
    }

    /// Flux at `energy_gev` for zenith `theta` in radians.
    pub fn evaluate(&self, key: &FluxGridKey, energy_gev: f64, theta: f64) -> ComputeResult<f64> {
        let grid = self.grid(key)?;
        Ok(grid.interpolate(energy_gev, theta * DEG_PER_RAD))
    }

    fn monthly_grid(
        &self,
        species: NeutrinoSpecies,
        source: FluxSource,
        month: Month,
    ) -> ComputeResult<Arc<FluxGrid>> {
        let key = FluxGridKey::monthly(species, source, month);
        self.grids.get_or_try_compute(&key, || {
            let species_name = key.species_name();
            if let Some(grid) = self.store.load(&species_name, month)? {
                tracing::debug!(key = %key, "flux grid loaded from store");
                return Ok(grid);
            }

            let grid = self.solve_grid(&species_name, source, month)?;
            self.store.save(&species_name, month, &grid)?;
            tracing::info!(key = %key, "flux grid solved and persisted");
            Ok(grid)
        })
    }

    fn solve_grid(
        &self,
        species_name: &str,
        source: FluxSource,
        month: Month,
    ) -> ComputeResult<FluxGrid> {
        let energies = self.solver.energy_grid().to_vec();
        tracing::debug!(
            species = species_name,
            month = %month,
            nodes = self.zenith_deg.len(),
            "solving atmospheric flux grid"
        );

        let rows = self
            .zenith_deg
            .par_iter()
            .map(|theta| {
                // The solver measures zenith from the down-going direction.
                let row = self.solver.solve(180.0 - theta, species_name, source, month)?;
                if row.len() != energies.len() {
                    return Err(NufluxError::computation(
                        "RUN.ATMOSPHERIC_SOLVER",
                        format!(
                            "solver returned {} values for {species_name} at {theta}°, expected {}",
                            row.len(),
                            energies.len()
                        ),
                    ));
                }
                Ok(row)
            })
            .collect::<ComputeResult<Vec<Vec<f64>>>>()?;

        FluxGrid::new(self.zenith_deg.clone(), energies, rows.concat())
    }
}
