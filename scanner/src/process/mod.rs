// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

//! Parsing of scanner output lines into [`shared::Sample`]s.

mod api;
mod structs;

pub use api::*;
pub use structs::*;
