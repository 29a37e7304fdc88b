// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

// STD LIB
use std::time::Duration;

// THIRD PARTY CRATES
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Outgoing, Packet, QoS};
use shared::{Payload, Presence, StatusMessage, Topic};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// LOCAL CRATE
use crate::config::BrokerAddress;
use crate::error::{ConfigError, PublishError};
use crate::io::BusClient;

const KEEP_ALIVE: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const REQUEST_CAPACITY: usize = 10;

/// Publishing handle for the MQTT broker. Cheap to clone.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
}

#[async_trait]
impl BusClient for MqttBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
        self.client
            .publish(topic, QoS::AtMostOnce, retain, payload)
            .await
            .map_err(|e| PublishError::Rejected {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A live broker session: the publishing handle plus the task driving the event loop.
pub struct MqttConnection {
    bus: MqttBus,
    status: StatusMessage,
    stop_tx: watch::Sender<bool>,
    driver: JoinHandle<()>,
}

impl MqttConnection {
    /// Configure the session and start driving it.
    ///
    /// The broker is contacted lazily by the event loop; messages published
    /// before the first connection wait in the client's request queue.
    pub fn connect(broker: &BrokerAddress, status: StatusMessage) -> Result<Self, ConfigError> {
        let offline = status.with_presence(Presence::Offline).to_payload()?;
        let online = status.with_presence(Presence::Online).to_payload()?;
        let status_topic = Topic::Status.for_client(&status.id);

        let mut options = MqttOptions::new(status.id.clone(), broker.host.clone(), broker.port);
        options
            .set_keep_alive(KEEP_ALIVE)
            .set_clean_session(true)
            .set_last_will(LastWill::new(status_topic.clone(), offline, QoS::AtMostOnce, true));

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);

        info!("Connecting to MQTT broker {}", broker);
        let driver = tokio::spawn(drive(
            eventloop,
            client.clone(),
            broker.to_string(),
            status_topic,
            online,
            stop_rx,
        ));

        Ok(Self {
            bus: MqttBus { client },
            status,
            stop_tx,
            driver,
        })
    }

    pub fn bus(&self) -> MqttBus {
        self.bus.clone()
    }

    /// Announce the relay as offline and close the session.
    pub async fn shutdown(self) {
        let status_topic = Topic::Status.for_client(&self.status.id);
        let farewell = async {
            match self.status.with_presence(Presence::Offline).to_payload() {
                Ok(payload) => {
                    if let Err(e) = self.bus.publish(&status_topic, payload, true).await {
                        warn!("Failed to publish offline status: {}", e);
                    }
                }
                Err(e) => error!("Error encoding offline status: {}", e),
            }
            if let Err(e) = self.bus.client.disconnect().await {
                warn!("Failed to request MQTT disconnect: {}", e);
            }
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, farewell).await.is_err() {
            warn!("Broker unreachable, skipping offline status");
        }

        let _ = self.stop_tx.send(true);
        let mut driver = self.driver;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut driver).await.is_err() {
            warn!("MQTT event loop did not stop in time, aborting it");
            driver.abort();
        }
        info!("Disconnected from broker");
    }
}

async fn drive(
    mut eventloop: EventLoop,
    client: AsyncClient,
    broker: String,
    status_topic: String,
    online: Vec<u8>,
    stop_rx: watch::Receiver<bool>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker {}", broker);
                // Polled from this task, so never wait on the request queue here.
                if let Err(e) = client.try_publish(
                    status_topic.as_str(),
                    QoS::AtMostOnce,
                    true,
                    online.clone(),
                ) {
                    warn!("Failed to queue online status: {}", e);
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("MQTT disconnect sent");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if *stop_rx.borrow() {
                    break;
                }
                error!("Connection lost to MQTT broker {}: {}", broker, e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
