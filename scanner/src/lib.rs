// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

//! Relay for `rtl_power` style scanner output.
//!
//! The pipeline runs as separate tasks joined by single-slot channels:
//!
//! ```text
//! device (scanner process) -> process (line parser) -> context (sweep aggregator) -> io (publisher) -> MQTT
//! ```
//!
//! Each send waits for the next stage, so a slow broker slows the reader
//! rather than dropping scanner lines.

pub mod cli;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod io;
pub mod logging;
pub mod process;

/// Capacity of the channels between pipeline stages.
pub const HANDOFF_CAPACITY: usize = 1;
