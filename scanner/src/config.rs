// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

//! Relay configuration.
//!
//! The configuration is a JSON document, read from the file given with
//! `--config` or else from the `SPECTRUM_CFG` environment variable:
//!
//! ```json
//! {
//!   "command": "rtl_power -f 88M:108M:10k -i 1",
//!   "name": "Roof",
//!   "description": "FM band",
//!   "servers": [{ "broker": "tcp://localhost:1883", "client_id": "roof" }]
//! }
//! ```

use std::fmt;

use serde::Deserialize;
use shared::{Presence, StatusMessage};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_MQTT_PORT: u16 = 1883;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub broker: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScannerConfig {
    pub command: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub servers: Vec<ServerConfig>,
}

impl ScannerConfig {
    /// Load from `--config` if given, else from `SPECTRUM_CFG`.
    pub fn load(args: &Cli) -> Result<Self, ConfigError> {
        let json = match (&args.config, &args.spectrum_cfg) {
            (Some(path), _) => std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?,
            (None, Some(inline)) if !inline.trim().is_empty() => inline.clone(),
            _ => return Err(ConfigError::Missing),
        };

        let config = Self::from_json(&json)?;
        info!(
            "Configuration loaded: {} ({}), {} server(s)",
            config.name,
            config.description,
            config.servers.len()
        );
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Invalid("command is empty".to_string()));
        }
        if self.servers.is_empty() {
            return Err(ConfigError::Invalid("no servers configured".to_string()));
        }
        for (idx, server) in self.servers.iter().enumerate() {
            if server.broker.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("server {idx} has no broker")));
            }
            if server.client_id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("server {idx} has no client_id")));
            }
        }
        Ok(())
    }

    /// The server the relay publishes to. Only the first one is used.
    pub fn primary_server(&self) -> Result<&ServerConfig, ConfigError> {
        if self.servers.len() > 1 {
            warn!(
                "{} servers configured, publishing to the first one only",
                self.servers.len()
            );
        }
        self.servers
            .first()
            .ok_or_else(|| ConfigError::Invalid("no servers configured".to_string()))
    }

    /// Presence record announced for the given server's client id.
    pub fn status(&self, server: &ServerConfig) -> StatusMessage {
        StatusMessage {
            id: server.client_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            command: self.command.clone(),
            status: Presence::Online,
        }
    }
}

/// Host and port of an MQTT broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl BrokerAddress {
    /// Accepts `tcp://host:port`, `mqtt://host:port` or `host[:port]`.
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Broker {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let rest = match address.trim().split_once("://") {
            Some(("tcp" | "mqtt", rest)) => rest,
            Some(_) => return Err(invalid("only tcp:// and mqtt:// are supported")),
            None => address.trim(),
        };
        let rest = rest.trim_end_matches('/');

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>().map_err(|_| invalid("port is not a number"))?,
            ),
            None => (rest, DEFAULT_MQTT_PORT),
        };
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "command": "rtl_power -f 88M:108M:10k -i 1",
        "name": "Roof",
        "description": "FM band",
        "servers": [
            { "broker": "tcp://localhost:1883", "client_id": "roof" },
            { "broker": "tcp://backup:1883", "client_id": "roof-b" }
        ]
    }"#;

    #[test]
    fn parses_and_uses_first_server() {
        let config = ScannerConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.command, "rtl_power -f 88M:108M:10k -i 1");
        let server = config.primary_server().unwrap();
        assert_eq!(server.client_id, "roof");

        let status = config.status(server);
        assert_eq!(status.id, "roof");
        assert_eq!(status.name, "Roof");
        assert_eq!(status.status, Presence::Online);
    }

    #[test]
    fn name_and_description_are_optional() {
        let config = ScannerConfig::from_json(
            r#"{"command": "rtl_power", "servers": [{"broker": "b", "client_id": "c"}]}"#,
        )
        .unwrap();
        assert!(config.name.is_empty());
        assert!(config.description.is_empty());
    }

    #[test]
    fn rejects_incomplete_configs() {
        let no_servers = r#"{"command": "rtl_power", "servers": []}"#;
        assert!(matches!(
            ScannerConfig::from_json(no_servers),
            Err(ConfigError::Invalid(_))
        ));

        let no_command = r#"{"command": " ", "servers": [{"broker": "b", "client_id": "c"}]}"#;
        assert!(matches!(
            ScannerConfig::from_json(no_command),
            Err(ConfigError::Invalid(_))
        ));

        let no_client = r#"{"command": "x", "servers": [{"broker": "b", "client_id": ""}]}"#;
        assert!(matches!(
            ScannerConfig::from_json(no_client),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            ScannerConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_inline_or_file() {
        let inline = Cli {
            config: None,
            spectrum_cfg: Some(CONFIG.to_string()),
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_to_file: false,
        };
        assert_eq!(ScannerConfig::load(&inline).unwrap().name, "Roof");

        let missing_file = Cli {
            config: Some("/nonexistent/sweep-relay.json".into()),
            ..inline
        };
        assert!(matches!(
            ScannerConfig::load(&missing_file),
            Err(ConfigError::Read { .. })
        ));

        let nothing = Cli {
            config: None,
            spectrum_cfg: None,
            ..missing_file
        };
        assert!(matches!(ScannerConfig::load(&nothing), Err(ConfigError::Missing)));
    }

    #[test]
    fn broker_addresses() {
        let parse = |s: &str| BrokerAddress::parse(s).unwrap();
        assert_eq!(
            parse("tcp://localhost:1883"),
            BrokerAddress { host: "localhost".to_string(), port: 1883 }
        );
        assert_eq!(parse("mqtt://10.0.0.5:8883/").port, 8883);
        assert_eq!(parse("broker.lan").port, DEFAULT_MQTT_PORT);
        assert_eq!(parse("broker.lan:1884").to_string(), "broker.lan:1884");

        assert!(BrokerAddress::parse("ws://broker:80").is_err());
        assert!(BrokerAddress::parse("tcp://:1883").is_err());
        assert!(BrokerAddress::parse("tcp://broker:port").is_err());
    }
}
