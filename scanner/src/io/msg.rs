// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use shared::{Payload, Sample, Sweep, Topic};

/// A message on its way to the bus, scoped to the relay's client id by the publisher.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub topic: Topic,
    pub payload: Vec<u8>,
    pub retain: bool,
}

impl Outbound {
    /// Raw per-step sample. Not retained.
    pub fn stream(sample: &Sample) -> serde_json::Result<Self> {
        Ok(Self {
            topic: Topic::Stream,
            payload: sample.to_payload()?,
            retain: false,
        })
    }

    /// Completed sweep. Retained so new subscribers get the latest full pass immediately.
    pub fn scan(sweep: &Sweep) -> serde_json::Result<Self> {
        Ok(Self {
            topic: Topic::Scan,
            payload: sweep.to_payload()?,
            retain: true,
        })
    }
}
