//! Annual high-energy neutrino interaction rates in a deep-ice detector.
//!
//! Cross sections, the PREM Earth model, astrophysical and atmospheric fluxes
//! and the event-rate integral that combines them.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
