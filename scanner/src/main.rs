// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

// THIRD PARTY CRATES
use anyhow::Context as _;
use clap::Parser;
use shared::Sample;
use tokio::sync::mpsc::channel;
use tracing::{error, info};

// LOCAL CRATES
use sweep_relay::cli::Cli;
use sweep_relay::config::{BrokerAddress, ScannerConfig};
use sweep_relay::context::{self, SweepAggregator};
use sweep_relay::io::{MqttConnection, Outbound, Publisher};
use sweep_relay::logging::init_logging;
use sweep_relay::{device, HANDOFF_CAPACITY};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Cli::parse();
    let _log_guards = init_logging(&args).context("failed to initialize logging")?;

    let config = ScannerConfig::load(&args).inspect_err(|e| error!("Error loading config: {}", e))?;
    let server = config.primary_server()?;
    let broker = BrokerAddress::parse(&server.broker)?;
    let client_id = server.client_id.clone();

    let mqtt = MqttConnection::connect(&broker, config.status(server))?;

    //// Inter-Task Communication Channels
    // Parsed samples for the aggregator.
    let (sample_tx, sample_rx) = channel::<Sample>(HANDOFF_CAPACITY);

    // Stream and scan messages for the publisher.
    let (outbound_tx, outbound_rx) = channel::<Outbound>(HANDOFF_CAPACITY);

    //// START PIPELINE STAGES (downstream first)
    let publisher = Publisher::new(client_id.clone(), mqtt.bus()).start(outbound_rx);
    let aggregator = context::start(SweepAggregator::new(), sample_rx, outbound_tx);
    let mut feed = match device::start(&config.command, client_id, sample_tx) {
        Ok(feed) => feed,
        Err(e) => {
            error!("Error starting scanner: {}", e);
            mqtt.shutdown().await;
            return Err(e.into());
        }
    };

    tokio::select! {
        status = feed.wait() => {
            if let Err(e) = status {
                error!("Failed waiting for scanner process: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping scanner");
            feed.kill().await;
        }
    }

    // Draining order follows the pipeline: feed, aggregator, publisher.
    match feed.finish().await {
        Ok(stats) => info!(
            "Scanner output: {} lines, {} samples, {} malformed",
            stats.lines, stats.samples, stats.malformed
        ),
        Err(e) => error!("Error while reading command output: {}", e),
    }
    match aggregator.await {
        Ok(aggregator) => info!("Completed sweeps: {}", aggregator.sweep_count()),
        Err(e) => error!("Aggregator task failed: {}", e),
    }
    match publisher.await {
        Ok(stats) => info!(
            "Published {} messages, {} failed",
            stats.delivered, stats.failed
        ),
        Err(e) => error!("Publisher task failed: {}", e),
    }

    mqtt.shutdown().await;
    Ok(())
}
