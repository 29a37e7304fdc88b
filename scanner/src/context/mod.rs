// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC
mod api;
mod current;
mod scan;

pub use api::{run, start};
pub use current::CurrentSweep;
pub use scan::{ScanPhase, SweepAggregator};
