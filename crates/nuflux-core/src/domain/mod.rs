pub mod errors;

pub use errors::{ComputeResult, NufluxError, NufluxErrorCategory, NufluxResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed integration interval `[lower, upper]` with `lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64, placeholder: &'static str) -> ComputeResult<Self> {
        let bounds = Self { lower, upper };
        bounds.validate(placeholder)?;
        Ok(bounds)
    }

    pub fn validate(&self, placeholder: &'static str) -> ComputeResult<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(NufluxError::configuration(
                placeholder,
                format!("bounds must be finite, got {self}"),
            ));
        }
        if self.lower >= self.upper {
            return Err(NufluxError::configuration(
                placeholder,
                format!("lower bound must be below upper bound, got {self}"),
            ));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Overlap with `[lower, upper]`, if it has positive width.
    pub fn intersect(&self, lower: f64, upper: f64) -> Option<Self> {
        let lower = self.lower.max(lower);
        let upper = self.upper.min(upper);
        (lower < upper).then_some(Self { lower, upper })
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
