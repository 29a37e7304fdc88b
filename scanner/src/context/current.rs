// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use shared::{Sample, Sweep};

/// Band extent and power accumulated for the sweep in progress.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CurrentSweep {
    pub freq_lo: f64,
    pub freq_hi: f64,
    pub step: f64,
    pub buffer: Vec<f64>,
    seeded: bool,
}

impl CurrentSweep {
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Take the start of the band and the bin width from the first sample seen.
    pub fn seed(&mut self, sample: &Sample) {
        self.freq_lo = sample.freq_lo;
        self.step = sample.step;
        self.seeded = true;
    }

    pub fn fold(&mut self, power: &[f64]) {
        self.buffer.extend_from_slice(power);
    }

    /// Close the sweep, leaving an empty buffer behind.
    ///
    /// The band extent is kept; it describes every sweep that follows.
    pub fn take_sweep(&mut self, trigger: &Sample) -> Sweep {
        Sweep {
            id: trigger.id.clone(),
            timestamp: trigger.timestamp,
            freq_lo: self.freq_lo,
            freq_hi: self.freq_hi,
            step: self.step,
            bin_count: 0.0,
            power: std::mem::take(&mut self.buffer),
        }
    }
}
