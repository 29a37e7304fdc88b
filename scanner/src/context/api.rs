// THIRD PARTY CRATES
use shared::Sample;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// LOCAL CRATE
use crate::context::SweepAggregator;
use crate::io::Outbound;

/// Public API for starting the aggregator stage on its own task.
///
/// The aggregator is moved into the task and handed back when the sample
/// channel closes, so its counters can be reported.
pub fn start(
    aggregator: SweepAggregator,
    sample_rx: Receiver<Sample>,
    outbound_tx: Sender<Outbound>,
) -> JoinHandle<SweepAggregator> {
    tokio::spawn(run(aggregator, sample_rx, outbound_tx))
}

/// Drive the aggregator until the sample channel closes.
///
/// A sweep closed by a sample is queued before that sample's own stream message.
/// The sweep still in progress when input ends is discarded.
pub async fn run(
    mut aggregator: SweepAggregator,
    mut sample_rx: Receiver<Sample>,
    outbound_tx: Sender<Outbound>,
) -> SweepAggregator {
    while let Some(sample) = sample_rx.recv().await {
        debug!(
            "start: {} stop: {} step: {} counts: {}",
            sample.freq_lo / 1_000_000.0,
            sample.freq_hi / 1_000_000.0,
            sample.step,
            sample.power.len()
        );

        if let Some(sweep) = aggregator.ingest(&sample) {
            info!(
                "Sweep {} complete with {} bins",
                aggregator.sweep_count(),
                sweep.power.len()
            );
            match Outbound::scan(&sweep) {
                Ok(msg) => forward(&outbound_tx, msg).await,
                Err(e) => error!("Error encoding sweep: {}", e),
            }
        }

        match Outbound::stream(&sample) {
            Ok(msg) => forward(&outbound_tx, msg).await,
            Err(e) => error!("Error encoding sample: {}", e),
        }
    }

    info!(
        "Sample stream closed after {} sweeps, discarding {} buffered bins",
        aggregator.sweep_count(),
        aggregator.current().buffer.len()
    );
    aggregator
}

async fn forward(outbound_tx: &Sender<Outbound>, msg: Outbound) {
    if outbound_tx.send(msg).await.is_err() {
        warn!("Publisher stage is gone, dropping outbound message");
    }
}
