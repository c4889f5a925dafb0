use crate::domain::ComputeResult;
use crate::modules::flux::{FluxGrid, FluxSource, Month};

/// Atmospheric cascade solver producing a flux spectrum for one direction.
///
/// `zenith_deg` is in the solver's own convention (0° = down-going). The
/// returned values are in GeV⁻¹cm⁻²s⁻¹sr⁻¹ on [`AtmosphericSolver::energy_grid`].
pub trait AtmosphericSolver: Send + Sync {
    fn energy_grid(&self) -> &[f64];

    fn solve(
        &self,
        zenith_deg: f64,
        species_name: &str,
        source: FluxSource,
        month: Month,
    ) -> ComputeResult<Vec<f64>>;
}

/// Persistence for fully populated monthly flux grids.
pub trait FluxGridStore: Send + Sync {
    fn load(&self, species_name: &str, month: Month) -> ComputeResult<Option<FluxGrid>>;

    fn save(&self, species_name: &str, month: Month, grid: &FluxGrid) -> ComputeResult<()>;
}
