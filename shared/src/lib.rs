// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

//! Records published by the sweep relay.
//!
//! Field names and their order are what subscribers parse, so the serde
//! renames below are part of the wire contract.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root of every topic the relay publishes on.
pub const TOPIC_ROOT: &str = "scanner";

/// Seconds between the Unix epoch and `0001-01-01T00:00:00Z`.
const ZERO_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// Timestamp substituted when a scanner line carries an unreadable date or time.
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIMESTAMP_SECS, 0).unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Raw per-step samples, never retained.
    Stream,
    /// Completed sweeps, retained.
    Scan,
    /// Online/offline presence, retained.
    Status,
}

impl Topic {
    pub fn suffix(&self) -> &'static str {
        match self {
            Topic::Stream => "stream",
            Topic::Scan => "scan",
            Topic::Status => "status",
        }
    }

    /// Full topic name for the given client, e.g. `scanner/<id>/scan`.
    pub fn for_client(&self, client_id: &str) -> String {
        format!("{TOPIC_ROOT}/{client_id}/{}", self.suffix())
    }
}

/// JSON encoding shared by every published record.
pub trait Payload: Serialize {
    fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// One scanner output line covering a narrow sub-band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "hz_lo")]
    pub freq_lo: f64,
    #[serde(rename = "hz_hi")]
    pub freq_hi: f64,
    pub step: f64,
    /// Bin count claimed by the line header. Informational only.
    #[serde(rename = "samples")]
    pub bin_count: f64,
    pub power: Vec<f64>,
}

impl Payload for Sample {}

/// Renders the sample back into the scanner's own line format.
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.timestamp.format("%Y-%m-%d, %H:%M:%S"),
            self.freq_lo,
            self.freq_hi,
            self.step,
            self.bin_count
        )?;
        for value in &self.power {
            write!(f, ", {value}")?;
        }
        Ok(())
    }
}

/// One reconstructed full-band pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub id: String,
    /// Timestamp of the sample that closed the sweep.
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "hz_lo")]
    pub freq_lo: f64,
    #[serde(rename = "hz_hi")]
    pub freq_hi: f64,
    pub step: f64,
    /// Always zero. Present so sweeps and samples share one payload shape.
    #[serde(rename = "samples", default)]
    pub bin_count: f64,
    pub power: Vec<f64>,
}

impl Payload for Sweep {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

/// Presence record published on the status topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub command: String,
    pub status: Presence,
}

impl StatusMessage {
    /// Same record with a different presence.
    pub fn with_presence(&self, status: Presence) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

impl Payload for StatusMessage {}
