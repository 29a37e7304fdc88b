// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

mod client;
mod manager;
mod msg;
mod traits;

pub use client::{MqttBus, MqttConnection};
pub use manager::{PublishStats, Publisher};
pub use msg::Outbound;
pub use traits::BusClient;
