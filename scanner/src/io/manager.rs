// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::io::{BusClient, Outbound};

/// Counters reported when the publisher stage ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    pub delivered: usize,
    pub failed: usize,
}

/// Hands outbound messages to the bus client, one at a time, in arrival order.
///
/// Failed deliveries are logged and skipped. The stage keeps going until every
/// sender of the outbound channel is gone.
pub struct Publisher<C> {
    client_id: String,
    client: C,
}

impl<C: BusClient + 'static> Publisher<C> {
    pub fn new(client_id: impl Into<String>, client: C) -> Self {
        Self {
            client_id: client_id.into(),
            client,
        }
    }

    pub fn start(self, outbound_rx: Receiver<Outbound>) -> JoinHandle<PublishStats> {
        tokio::spawn(self.run(outbound_rx))
    }

    pub async fn run(self, mut outbound_rx: Receiver<Outbound>) -> PublishStats {
        let mut stats = PublishStats::default();

        while let Some(msg) = outbound_rx.recv().await {
            let topic = msg.topic.for_client(&self.client_id);
            let size = msg.payload.len();
            match self.client.publish(&topic, msg.payload, msg.retain).await {
                Ok(()) => {
                    stats.delivered += 1;
                    debug!("Published {} bytes to {} (retain: {})", size, topic, msg.retain);
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("Error publishing message to {}: {}", topic, e);
                }
            }
        }

        info!(
            "Publisher stopped, {} delivered, {} failed",
            stats.delivered, stats.failed
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;
    use async_trait::async_trait;
    use shared::Topic;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::channel;

    #[derive(Clone, Default)]
    struct FlakyBus {
        sent: Arc<Mutex<Vec<(String, Vec<u8>, bool)>>>,
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl BusClient for FlakyBus {
        async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            // Every third call fails.
            if call % 3 == 0 {
                return Err(PublishError::Rejected {
                    topic: topic.to_string(),
                    reason: "broker unavailable".to_string(),
                });
            }
            self.sent.lock().unwrap().push((topic.to_string(), payload, retain));
            Ok(())
        }
    }

    fn message(topic: Topic, n: u8) -> Outbound {
        Outbound {
            topic,
            payload: vec![n],
            retain: topic == Topic::Scan,
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_survives_failures() {
        let bus = FlakyBus::default();
        let (tx, rx) = channel(1);
        let handle = Publisher::new("roof", bus.clone()).start(rx);

        for n in 0..7u8 {
            let topic = if n == 4 { Topic::Scan } else { Topic::Stream };
            tx.send(message(topic, n)).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats, PublishStats { delivered: 5, failed: 2 });

        let sent = bus.sent.lock().unwrap();
        let payloads: Vec<u8> = sent.iter().map(|(_, p, _)| p[0]).collect();
        assert_eq!(payloads, vec![0, 1, 3, 4, 6]);
        assert_eq!(sent[3], ("scanner/roof/scan".to_string(), vec![4], true));
        assert_eq!(sent[0], ("scanner/roof/stream".to_string(), vec![0], false));
    }

    #[tokio::test]
    async fn stops_when_senders_are_gone() {
        let (tx, rx) = channel::<Outbound>(1);
        drop(tx);
        let stats = Publisher::new("roof", FlakyBus::default()).run(rx).await;
        assert_eq!(stats, PublishStats::default());
    }
}
