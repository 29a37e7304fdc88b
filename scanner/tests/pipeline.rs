use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shared::{Sample, Sweep};
use sweep_relay::context::{self, SweepAggregator};
use sweep_relay::device::relay_lines;
use sweep_relay::error::PublishError;
use sweep_relay::io::{BusClient, Outbound, PublishStats, Publisher};
use sweep_relay::HANDOFF_CAPACITY;
use tokio::sync::mpsc::channel;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
struct Delivered {
    topic: String,
    payload: Vec<u8>,
    retain: bool,
}

/// In-memory bus. Optionally refuses everything published on one topic.
#[derive(Clone, Default)]
struct RecordingBus {
    delivered: Arc<Mutex<Vec<Delivered>>>,
    refuse_topic: Option<String>,
}

#[async_trait]
impl BusClient for RecordingBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
        if self.refuse_topic.as_deref() == Some(topic) {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                reason: "refused".to_string(),
            });
        }
        self.delivered.lock().unwrap().push(Delivered {
            topic: topic.to_string(),
            payload,
            retain,
        });
        Ok(())
    }
}

/// Holds every publish until a permit is released.
#[derive(Clone)]
struct GatedBus {
    inner: RecordingBus,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl BusClient for GatedBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
        self.gate
            .acquire()
            .await
            .map_err(|e| PublishError::Rejected {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?
            .forget();
        self.inner.publish(topic, payload, retain).await
    }
}

/// Four steps across 24–28 MHz, repeated `passes` times, plus one corrupt line.
fn scanner_output(passes: usize) -> String {
    let mut out = String::new();
    for pass in 0..passes {
        for step in 0..4u64 {
            let lo = 24_000_000 + step * 1_000_000;
            let power: Vec<String> = (0..3).map(|bin| format!("-{}.5", pass * 10 + bin)).collect();
            out.push_str(&format!(
                "2024-03-09, 10:{:02}:{:02}, {}, {}, 333333.33, 3, {}\n",
                pass,
                step,
                lo,
                lo + 1_000_000,
                power.join(", ")
            ));
        }
        if pass == 0 {
            out.push_str("2024-03-09, 10:00:59, 24000000\n");
        }
    }
    out
}

async fn run_pipeline(output: String, bus: RecordingBus) -> (SweepAggregator, PublishStats) {
    let (sample_tx, sample_rx) = channel::<Sample>(HANDOFF_CAPACITY);
    let (outbound_tx, outbound_rx) = channel::<Outbound>(HANDOFF_CAPACITY);

    let publisher = Publisher::new("roof", bus).start(outbound_rx);
    let aggregator = context::start(SweepAggregator::new(), sample_rx, outbound_tx);

    let feed = tokio::spawn(async move { relay_lines(output.as_bytes(), "roof", &sample_tx).await });
    let stats = feed.await.unwrap().unwrap();
    assert_eq!(stats.malformed, 1);

    (aggregator.await.unwrap(), publisher.await.unwrap())
}

#[tokio::test]
async fn relays_samples_and_rebuilt_sweeps() {
    let bus = RecordingBus::default();
    let (aggregator, stats) = run_pipeline(scanner_output(3), bus.clone()).await;

    // Passes 1 and 2 each close the pass before them; pass 2 is still open at EOF.
    assert_eq!(aggregator.sweep_count(), 2);
    assert_eq!(stats, PublishStats { delivered: 14, failed: 0 });

    let delivered = bus.delivered.lock().unwrap();
    let streams: Vec<&Delivered> = delivered.iter().filter(|d| d.topic == "scanner/roof/stream").collect();
    let scans: Vec<&Delivered> = delivered.iter().filter(|d| d.topic == "scanner/roof/scan").collect();
    assert_eq!(streams.len(), 12);
    assert_eq!(scans.len(), 2);
    assert!(streams.iter().all(|d| !d.retain));
    assert!(scans.iter().all(|d| d.retain));

    // Every scan is delivered right before the stream message of the sample that closed it.
    for (idx, d) in delivered.iter().enumerate() {
        if d.topic.ends_with("/scan") {
            let next: Sample = serde_json::from_slice(&delivered[idx + 1].payload).unwrap();
            assert_eq!(next.freq_lo, 24_000_000.0);
        }
    }

    let first: Sweep = serde_json::from_slice(&scans[0].payload).unwrap();
    assert_eq!(first.id, "roof");
    assert_eq!(first.freq_lo, 24_000_000.0);
    assert_eq!(first.freq_hi, 28_000_000.0);
    assert_eq!(first.step, 333_333.33);
    assert_eq!(first.bin_count, 0.0);
    assert_eq!(first.power.len(), 12);
    assert_eq!(first.power[..3], [-0.5, -1.5, -2.5]);
    assert_eq!(first.timestamp.to_rfc3339(), "2024-03-09T10:01:00+00:00");

    let second: Sweep = serde_json::from_slice(&scans[1].payload).unwrap();
    assert_eq!(second.power[..3], [-10.5, -11.5, -12.5]);
}

#[tokio::test]
async fn failed_deliveries_do_not_stop_the_pipeline() {
    let bus = RecordingBus {
        refuse_topic: Some("scanner/roof/scan".to_string()),
        ..RecordingBus::default()
    };
    let (aggregator, stats) = run_pipeline(scanner_output(4), bus.clone()).await;

    assert_eq!(aggregator.sweep_count(), 3);
    assert_eq!(stats, PublishStats { delivered: 16, failed: 3 });
    assert_eq!(bus.delivered.lock().unwrap().len(), 16);
}

#[tokio::test]
async fn stalled_bus_holds_back_the_reader_without_losing_lines() {
    let gated = GatedBus {
        inner: RecordingBus::default(),
        gate: Arc::new(Semaphore::new(0)),
    };
    let output = scanner_output(3);

    let (sample_tx, sample_rx) = channel::<Sample>(HANDOFF_CAPACITY);
    let (outbound_tx, outbound_rx) = channel::<Outbound>(HANDOFF_CAPACITY);
    let publisher = Publisher::new("roof", gated.clone()).start(outbound_rx);
    let aggregator = context::start(SweepAggregator::new(), sample_rx, outbound_tx);
    let feed_output = output.clone();
    let mut feed =
        tokio::spawn(async move { relay_lines(feed_output.as_bytes(), "roof", &sample_tx).await });

    // Nothing gets through the bus, so the reader cannot reach the end of its input.
    assert!(tokio::time::timeout(Duration::from_millis(200), &mut feed).await.is_err());
    assert!(gated.inner.delivered.lock().unwrap().is_empty());

    gated.gate.add_permits(1_000);
    let feed_stats = feed.await.unwrap().unwrap();
    assert_eq!(feed_stats.samples, 12);
    assert_eq!(aggregator.await.unwrap().sweep_count(), 2);
    assert_eq!(publisher.await.unwrap(), PublishStats { delivered: 14, failed: 0 });

    // Same messages, same order, as with a bus that never blocks.
    let unblocked = RecordingBus::default();
    run_pipeline(output, unblocked.clone()).await;
    assert_eq!(
        *gated.inner.delivered.lock().unwrap(),
        *unblocked.delivered.lock().unwrap()
    );
}
