pub mod cross_section;
pub mod earth;
pub mod event_rate;
pub mod flux;
pub mod neutrino;
pub mod serialization;

mod traits;

pub use event_rate::{
    DetectorModel, EventRateIntegrator, EventRateQuery, EventRateReport, SegmentRate,
};
pub use neutrino::{ChannelSelection, Neutrino};
pub use traits::{AtmosphericSolver, FluxGridStore};
