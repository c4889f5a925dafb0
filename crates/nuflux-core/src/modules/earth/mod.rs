//! Preliminary Reference Earth Model density and chord geometry.

mod attenuation;

pub use attenuation::{AttenuationTable, DEFAULT_ATTENUATION_NODES};

use crate::common::constants::{CM_PER_KM, EARTH_RADIUS_KM, PI};
use crate::numerics::{linear_grid, trapezoid};

pub const DEFAULT_CHORD_SAMPLES: usize = 1000;

/// Outer radius (km) and density polynomial coefficients in `y = r / R_E`.
const PREM_SHELLS: [(f64, [f64; 4]); 10] = [
    (1221.5, [13.0885, 0.0, -8.8381, 0.0]),
    (3480.0, [12.5815, -1.2638, -3.6426, -5.5281]),
    (5701.0, [7.9565, -6.4761, 5.5283, -3.0807]),
    (5771.0, [5.3197, -1.4836, 0.0, 0.0]),
    (5971.0, [11.2494, -8.0298, 0.0, 0.0]),
    (6151.0, [7.1089, -3.8045, 0.0, 0.0]),
    (6346.6, [2.691, 0.6924, 0.0, 0.0]),
    (6356.0, [2.9, 0.0, 0.0, 0.0]),
    (6368.0, [2.6, 0.0, 0.0, 0.0]),
    (EARTH_RADIUS_KM, [1.02, 0.0, 0.0, 0.0]),
];

/// Density in g/cm³ at `radius_km` from the Earth's centre; zero outside the Earth.
pub fn density(radius_km: f64) -> f64 {
    if !(0.0..=EARTH_RADIUS_KM).contains(&radius_km) {
        return 0.0;
    }

    let y = radius_km / EARTH_RADIUS_KM;
    let coefficients = PREM_SHELLS
        .iter()
        .find(|(outer, _)| radius_km < *outer)
        .map_or(PREM_SHELLS[PREM_SHELLS.len() - 1].1, |(_, coefficients)| {
            *coefficients
        });

    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * y + coefficient)
}

/// Chord length in km travelled through the Earth for zenith angle `theta`.
///
/// Zero for down-going directions (`theta >= π/2`).
pub fn penetration_length(theta: f64) -> f64 {
    (2.0 * EARTH_RADIUS_KM * theta.cos()).max(0.0)
}

/// Distance from the Earth's centre at depth `z_km` along the chord for `theta`.
pub fn radius_along_chord(z_km: f64, theta: f64) -> f64 {
    let x = penetration_length(theta);
    let remaining = x - z_km;
    let squared = EARTH_RADIUS_KM * EARTH_RADIUS_KM + remaining * remaining - x * remaining;
    squared.max(0.0).sqrt().clamp(0.0, EARTH_RADIUS_KM)
}

/// Column density in g/cm² along the chord for `theta`, by the trapezoid rule
/// over `samples` equidistant points.
pub fn attenuation_parameter(theta: f64, samples: usize) -> f64 {
    if !theta.is_finite() || theta >= 0.5 * PI {
        return 0.0;
    }

    let length = penetration_length(theta);
    let Some(depths) = linear_grid(0.0, length, samples.max(2)) else {
        return 0.0;
    };
    let densities: Vec<f64> = depths
        .iter()
        .map(|z| density(radius_along_chord(*z, theta)))
        .collect();

    trapezoid(&densities, &depths).map_or(0.0, |integral| integral * CM_PER_KM)
}
