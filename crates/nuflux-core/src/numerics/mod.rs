pub mod interpolation;

pub use interpolation::{CubicStencil, GridSurface, LogLogTable};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// Inclusive equidistant grid of `count` points.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 {
        return None;
    }

    let step = (end - start) / ((count - 1) as f64);
    let mut grid = Vec::with_capacity(count);
    for index in 0..count {
        grid.push(start + step * (index as f64));
    }

    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// Inclusive log-spaced grid of `count` points; both ends must be positive.
pub fn geometric_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if start <= 0.0 || end <= 0.0 {
        return None;
    }

    let mut grid: Vec<f64> = linear_grid(start.ln(), end.ln(), count)?
        .into_iter()
        .map(f64::exp)
        .collect();
    grid[0] = start;
    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// Trapezoid rule over a (possibly nonuniform) abscissa.
pub fn trapezoid(values: &[f64], abscissa: &[f64]) -> Option<f64> {
    if values.len() != abscissa.len() || values.len() < 2 {
        return None;
    }

    let panels: Vec<f64> = values
        .windows(2)
        .zip(abscissa.windows(2))
        .map(|(value, x)| 0.5 * (value[0] + value[1]) * (x[1] - x[0]))
        .collect();
    Some(stable_sum(&panels))
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}

#[cfg(test)]
mod tests {
    use super::{
        geometric_grid, linear_grid, relative_difference, stable_sum, trapezoid,
        within_tolerance,
    };

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        let input = [1.0e16, 1.0, -1.0e16];
        assert_eq!(stable_sum(&input), 0.0);
    }

    #[test]
    fn linear_grid_is_inclusive_and_rejects_invalid_counts() {
        assert_eq!(linear_grid(0.0, 1.0, 1), None);
        let grid = linear_grid(0.0, 2.0, 5).expect("grid");
        assert_eq!(grid, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn geometric_grid_has_constant_ratio_and_exact_ends() {
        let grid = geometric_grid(10.0, 1.0e12, 111).expect("grid");
        assert_eq!(grid.len(), 111);
        assert_eq!(grid[0], 10.0);
        assert_eq!(grid[110], 1.0e12);
        assert!((grid[10] - 100.0).abs() < 1.0e-9);
        assert_eq!(geometric_grid(0.0, 1.0, 3), None);
    }

    #[test]
    fn trapezoid_is_exact_for_linear_integrands() {
        let x = [0.0, 0.5, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|value| 2.0 * value + 1.0).collect();
        let integral = trapezoid(&y, &x).expect("integral");
        assert!((integral - 12.0).abs() < 1.0e-12);
        assert_eq!(trapezoid(&[1.0], &[0.0]), None);
        assert_eq!(trapezoid(&[1.0, 2.0], &[0.0]), None);
    }

    #[test]
    fn within_tolerance_accepts_abs_or_relative_match() {
        assert!(within_tolerance(10.0, 10.001, 1.0e-2, 1.0e-6, 1.0e-12));
        assert!(within_tolerance(1000.0, 1000.2, 1.0e-6, 5.0e-4, 1.0e-12));
        assert!(!within_tolerance(1.0, 1.1, 1.0e-3, 1.0e-3, 1.0e-12));
        let diff = relative_difference(0.0, 1.0e-10, 1.0e-6);
        assert!((diff - 1.0e-4).abs() < 1.0e-12);
    }
}
