pub mod cache;
pub mod config;
pub mod constants;
pub mod species;
pub mod units;
