// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

//! Error types for the relay stages.
//!
//! Line-level parse failures live next to the parser in [`crate::process`].
//! Nothing here ends the process once the pipeline is running: publish
//! failures are logged by the publisher and a feed read failure simply ends
//! the stream.

use thiserror::Error;

/// The bus client did not accept a message.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("bus client rejected message on {topic}: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Failures of the scanner process feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("scanner command is empty")]
    EmptyCommand,

    #[error("failed to spawn scanner command {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scanner process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("failed reading scanner output: {0}")]
    Read(#[from] std::io::Error),

    #[error("scanner reader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Startup configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration given; set SPECTRUM_CFG or pass --config")]
    Missing,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid broker address {address:?}: {reason}")]
    Broker { address: String, reason: String },
}

/// Logging could not be set up.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
