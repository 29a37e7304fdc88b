// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use shared::{Sample, Sweep};
use tracing::info;

use crate::context::CurrentSweep;

#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub enum ScanPhase {
    /// The full band has not been seen yet.
    #[default]
    WarmingUp,
    /// The band extent is known and sweeps are being closed.
    Steady,
}

/// Rebuilds full-band sweeps from the narrow samples of a wrapping scanner.
///
/// Owned by a single pipeline stage. Every sample goes through [`SweepAggregator::ingest`]
/// exactly once, in arrival order.
#[derive(Debug, Default)]
pub struct SweepAggregator {
    phase: ScanPhase,
    current: CurrentSweep,
    sweep_count: usize,
}

impl SweepAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn current(&self) -> &CurrentSweep {
        &self.current
    }

    /// Completed sweeps so far.
    pub fn sweep_count(&self) -> usize {
        self.sweep_count
    }

    /// Fold one sample into the sweep in progress.
    ///
    /// Returns the sweep this sample closed, if any. A closing sample is never
    /// part of the sweep it closes; its power seeds the next one.
    pub fn ingest(&mut self, sample: &Sample) -> Option<Sweep> {
        if self.phase == ScanPhase::WarmingUp {
            self.track_band(sample);
        }

        let completed = match self.phase {
            ScanPhase::Steady if sample.freq_lo <= self.current.freq_lo => {
                self.sweep_count += 1;
                Some(self.current.take_sweep(sample))
            }
            _ => None,
        };

        self.current.fold(&sample.power);
        completed
    }

    fn track_band(&mut self, sample: &Sample) {
        if !self.current.is_seeded() {
            self.current.seed(sample);
        }

        if sample.freq_hi > self.current.freq_hi {
            self.current.freq_hi = sample.freq_hi;
        } else if sample.freq_hi < self.current.freq_hi {
            // Scanner wrapped back to the start of the band.
            self.phase = ScanPhase::Steady;
            info!(
                "First pass complete, band {} MHz to {} MHz",
                self.current.freq_lo / 1_000_000.0,
                self.current.freq_hi / 1_000_000.0
            );
        }
    }
}
