//! Table interpolation kernels: log-log tables for quantities spanning many
//! decades, and a local cubic stencil for two-dimensional grids.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("interpolation table requires at least 2 points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("interpolation table length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("interpolation table '{field}' must be finite and > 0 at index {index}, got {value}")]
    NonPositiveValue {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error("interpolation axis must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingAxis {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("grid surface expects {expected} values for a {rows}x{columns} grid, got {actual}")]
    SurfaceShape {
        rows: usize,
        columns: usize,
        expected: usize,
        actual: usize,
    },
    #[error("grid surface value at row {row}, column {column} is not finite")]
    NonFiniteSurfaceValue { row: usize, column: usize },
}

/// Piecewise-linear interpolation of `log10(y)` against `log10(x)`.
///
/// Queries outside `[x_min, x_max]` evaluate to exactly zero: the table is not
/// extrapolated beyond the tabulated domain.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLogTable {
    log_x: Vec<f64>,
    log_y: Vec<f64>,
}

impl LogLogTable {
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, TableError> {
        if x.len() != y.len() {
            return Err(TableError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(TableError::InsufficientPoints { actual: x.len() });
        }
        validate_positive("x", x)?;
        validate_positive("y", y)?;
        validate_increasing(x)?;

        Ok(Self {
            log_x: x.iter().map(|value| value.log10()).collect(),
            log_y: y.iter().map(|value| value.log10()).collect(),
        })
    }

    pub fn domain(&self) -> (f64, f64) {
        let last = self.log_x.len() - 1;
        (10f64.powf(self.log_x[0]), 10f64.powf(self.log_x[last]))
    }

    pub fn len(&self) -> usize {
        self.log_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_x.is_empty()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }

        let log_x = x.log10();
        let last = self.log_x.len() - 1;
        if log_x < self.log_x[0] || log_x > self.log_x[last] {
            return 0.0;
        }

        let upper = self
            .log_x
            .partition_point(|node| *node < log_x)
            .clamp(1, last);
        let lower = upper - 1;
        let fraction = (log_x - self.log_x[lower]) / (self.log_x[upper] - self.log_x[lower]);
        let log_y = self.log_y[lower] + fraction * (self.log_y[upper] - self.log_y[lower]);
        10f64.powf(log_y)
    }
}

/// Lagrange weights of the (up to) four nodes bracketing a query point.
///
/// The stencil is centred on the bracketing interval and shifted inwards at the
/// axis ends; queries outside the axis are clamped to its end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicStencil {
    start: usize,
    len: usize,
    weights: [f64; 4],
}

impl CubicStencil {
    pub fn locate(nodes: &[f64], x: f64) -> Option<Self> {
        let count = nodes.len();
        if count == 0 || x.is_nan() {
            return None;
        }
        if count == 1 {
            return Some(Self {
                start: 0,
                len: 1,
                weights: [1.0, 0.0, 0.0, 0.0],
            });
        }

        let x = x.clamp(nodes[0], nodes[count - 1]);
        let interval = nodes
            .partition_point(|node| *node <= x)
            .saturating_sub(1)
            .min(count - 2);
        let len = count.min(4);
        let start = interval.saturating_sub(1).min(count - len);

        let mut weights = [0.0; 4];
        for (j, weight) in weights.iter_mut().enumerate().take(len) {
            let x_j = nodes[start + j];
            *weight = (0..len)
                .filter(|k| *k != j)
                .map(|k| {
                    let x_k = nodes[start + k];
                    (x - x_k) / (x_j - x_k)
                })
                .product();
        }

        Some(Self {
            start,
            len,
            weights,
        })
    }

    pub fn apply(&self, value_at: impl Fn(usize) -> f64) -> f64 {
        self.weights[..self.len]
            .iter()
            .enumerate()
            .map(|(offset, weight)| weight * value_at(self.start + offset))
            .sum()
    }
}

/// Row-major surface sampled on a rectilinear `(axis0, axis1)` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSurface {
    axis0: Vec<f64>,
    axis1: Vec<f64>,
    values: Vec<f64>,
}

impl GridSurface {
    pub fn new(axis0: Vec<f64>, axis1: Vec<f64>, values: Vec<f64>) -> Result<Self, TableError> {
        let expected = axis0.len() * axis1.len();
        if values.len() != expected {
            return Err(TableError::SurfaceShape {
                rows: axis0.len(),
                columns: axis1.len(),
                expected,
                actual: values.len(),
            });
        }
        if axis0.len() < 2 {
            return Err(TableError::InsufficientPoints {
                actual: axis0.len(),
            });
        }
        if axis1.len() < 2 {
            return Err(TableError::InsufficientPoints {
                actual: axis1.len(),
            });
        }
        validate_increasing(&axis0)?;
        validate_increasing(&axis1)?;
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(TableError::NonFiniteSurfaceValue {
                row: index / axis1.len(),
                column: index % axis1.len(),
            });
        }

        Ok(Self {
            axis0,
            axis1,
            values,
        })
    }

    pub fn axis0(&self) -> &[f64] {
        &self.axis0
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let columns = self.axis1.len();
        &self.values[index * columns..(index + 1) * columns]
    }

    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.axis1.len() + column]
    }

    /// Tensor-product cubic interpolation; both coordinates clamp to the grid.
    pub fn evaluate(&self, x0: f64, x1: f64) -> f64 {
        let (Some(stencil0), Some(stencil1)) = (
            CubicStencil::locate(&self.axis0, x0),
            CubicStencil::locate(&self.axis1, x1),
        ) else {
            return f64::NAN;
        };

        stencil0.apply(|row| stencil1.apply(|column| self.value(row, column)))
    }
}

fn validate_positive(field: &'static str, values: &[f64]) -> Result<(), TableError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || **value <= 0.0)
    {
        Some((index, value)) => Err(TableError::NonPositiveValue {
            field,
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}

fn validate_increasing(values: &[f64]) -> Result<(), TableError> {
    for (index, window) in values.windows(2).enumerate() {
        if !(window[1] > window[0]) {
            return Err(TableError::NonIncreasingAxis {
                index: index + 1,
                previous: window[0],
                current: window[1],
            });
        }
    }
    Ok(())
}
