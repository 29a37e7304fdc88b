// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use async_trait::async_trait;

use crate::error::PublishError;

/// Delivery side of a message bus.
///
/// `publish` resolves once the client has queued the message for sending, or
/// failed to. It does not wait for the broker to acknowledge it.
/// Reconnects and retries belong to the implementation, not to the caller.
#[async_trait]
pub trait BusClient: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError>;
}
