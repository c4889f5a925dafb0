use super::{DEFAULT_CHORD_SAMPLES, attenuation_parameter};
use crate::common::constants::PI;
use crate::domain::{ComputeResult, NufluxError};
use crate::numerics::linear_grid;
use std::sync::OnceLock;

pub const DEFAULT_ATTENUATION_NODES: usize = 512;

/// Lazily filled column density on nodes equidistant in `cos θ` over `[0, 1]`.
///
/// Each node is integrated at most once, on first use, and never changes
/// afterwards. Queries between nodes interpolate linearly in `cos θ`.
#[derive(Debug)]
pub struct AttenuationTable {
    cos_nodes: Vec<f64>,
    columns: Vec<OnceLock<f64>>,
    samples: usize,
}

impl Default for AttenuationTable {
    fn default() -> Self {
        let cos_nodes = linear_grid(0.0, 1.0, DEFAULT_ATTENUATION_NODES).unwrap_or_default();
        let columns = cos_nodes.iter().map(|_| OnceLock::new()).collect();
        Self {
            cos_nodes,
            columns,
            samples: DEFAULT_CHORD_SAMPLES,
        }
    }
}

impl AttenuationTable {
    pub fn new(nodes: usize, samples: usize) -> ComputeResult<Self> {
        if samples < 2 {
            return Err(NufluxError::configuration(
                "CONFIG.ATTENUATION_SAMPLES",
                format!("chord integration needs at least 2 samples, got {samples}"),
            ));
        }
        let cos_nodes = linear_grid(0.0, 1.0, nodes).ok_or_else(|| {
            NufluxError::configuration(
                "CONFIG.ATTENUATION_NODES",
                format!("attenuation grid needs at least 2 nodes, got {nodes}"),
            )
        })?;
        let columns = cos_nodes.iter().map(|_| OnceLock::new()).collect();

        Ok(Self {
            cos_nodes,
            columns,
            samples,
        })
    }

    pub fn node_count(&self) -> usize {
        self.cos_nodes.len()
    }

    /// Number of nodes integrated so far.
    pub fn filled_nodes(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| column.get().is_some())
            .count()
    }

    /// Column density in g/cm² for zenith angle `theta`; zero for `theta >= π/2`.
    pub fn column_density(&self, theta: f64) -> f64 {
        if !theta.is_finite() || theta >= 0.5 * PI {
            return 0.0;
        }

        let cos_theta = theta.cos().clamp(0.0, 1.0);
        let last = self.cos_nodes.len() - 1;
        let position = cos_theta * last as f64;
        let lower = (position.floor() as usize).min(last - 1);
        let fraction = position - lower as f64;

        let low = self.node_column(lower);
        if fraction <= 0.0 {
            return low;
        }
        let high = self.node_column(lower + 1);
        low + fraction * (high - low)
    }

    fn node_column(&self, index: usize) -> f64 {
        *self.columns[index].get_or_init(|| {
            let theta = self.cos_nodes[index].acos();
            let column = attenuation_parameter(theta, self.samples);
            tracing::debug!(node = index, theta, column, "attenuation node integrated");
            column
        })
    }
}
