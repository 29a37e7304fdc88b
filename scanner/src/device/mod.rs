// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

mod api;
mod context;
mod sample;

pub use api::start;
pub use context::*;
pub use sample::{relay_lines, relay_stderr};
