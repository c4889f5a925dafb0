//! Physical constants shared by the cross-section, Earth and flux kernels.
//!
//! Units are CGS with energies in GeV: lengths in cm unless the name says `_KM`,
//! mass densities in g/cm³, cross sections in cm², concentrations in targets per gram.

pub const PI: f64 = std::f64::consts::PI;
pub const DEG_PER_RAD: f64 = 180.0 / PI;

pub const CM_PER_KM: f64 = 1.0e5;
pub const CM2_PER_MILLIBARN: f64 = 1.0e-27;
pub const CM3_PER_KM3: f64 = 1.0e15;

/// Julian year (365.25 days) in seconds.
pub const SECONDS_PER_YEAR: f64 = 31_557_600.0;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_AVERAGE_DENSITY: f64 = 5.51;
pub const ICE_DENSITY: f64 = 0.917;

/// Inverse atomic mass unit in 1/g.
pub const NUCLEONS_PER_GRAM: f64 = 6.022_140_76e23;
pub const NUCLEON_CONCENTRATION_EARTH: f64 = NUCLEONS_PER_GRAM;
/// Protons make up about half the nucleon mass of rock.
pub const ELECTRON_CONCENTRATION_EARTH: f64 = 0.5 * NUCLEON_CONCENTRATION_EARTH;
pub const NUCLEON_CONCENTRATION_WATER: f64 = NUCLEON_CONCENTRATION_EARTH;
/// Ten electrons per eighteen nucleons in H2O.
pub const ELECTRON_CONCENTRATION_WATER: f64 = 10.0 / 18.0 * NUCLEON_CONCENTRATION_WATER;

pub const FERMI_CONSTANT: f64 = 1.166_38e-5;
pub const W_MASS: f64 = 80.379;
/// Γ_W / M_W.
pub const W_WIDTH_RATIO: f64 = 0.02634;
/// Branching ratio W → μν.
pub const W_MUON_BRANCHING: f64 = 0.1057;
pub const ELECTRON_MASS: f64 = 5.109_99e-4;
/// ħc in GeV·cm.
pub const HBARC_GEV_CM: f64 = 1.973_269_804e-14;

pub const RESONANCE_ENERGY_MIN: f64 = 4.0e6;
pub const RESONANCE_ENERGY_MAX: f64 = 8.0e6;

/// Astrophysical flux normalization in 1/(GeV cm² s sr).
pub const ASTRO_FLUX_C0: f64 = 3.0e-18;
pub const ASTRO_PIVOT_ENERGY: f64 = 1.0e5;
pub const ASTRO_SPECTRAL_INDEX: f64 = 2.53;
/// Combined ν + ν̄ normalization.
pub const ASTRO_NORMALIZATION: f64 = 1.66;
