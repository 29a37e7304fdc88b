// THIRD PARTY CRATES
use shared::Sample;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

// LOCAL CRATE
use crate::device::FeedStats;
use crate::error::FeedError;
use crate::process::parse_line;

/// Turn scanner output lines into samples and hand them to the aggregator.
///
/// Each send waits for the aggregator, so a stalled downstream stalls the
/// reader instead of losing lines. Malformed lines are logged and skipped.
/// Bytes that are not valid UTF-8 are replaced, so they only spoil the fields
/// they land in. Returns on end of input, on a read error, or when the aggregator is gone.
pub async fn relay_lines<R>(
    reader: R,
    client_id: &str,
    sample_tx: &Sender<Sample>,
) -> Result<FeedStats, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.split(b'\n');
    let mut stats = FeedStats::default();

    while let Some(raw) = lines.next_segment().await? {
        stats.lines += 1;
        let line = String::from_utf8_lossy(&raw);
        let parsed = match parse_line(&line, client_id) {
            Ok(parsed) => parsed,
            Err(e) => {
                stats.malformed += 1;
                warn!("Dropping scanner line: {}", e);
                continue;
            }
        };

        for e in &parsed.field_errors {
            warn!("Line {}: {}", stats.lines, e);
        }

        if sample_tx.send(parsed.sample).await.is_err() {
            warn!("Aggregator stage is gone, stopping scanner feed");
            break;
        }
        stats.samples += 1;
    }

    info!(
        "Scanner feed ended: {} lines, {} samples, {} malformed",
        stats.lines, stats.samples, stats.malformed
    );
    Ok(stats)
}

/// Relay scanner diagnostics into the log.
pub async fn relay_stderr<R>(reader: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.split(b'\n');
    loop {
        match lines.next_segment().await {
            Ok(Some(raw)) => info!("rtl {}", String::from_utf8_lossy(&raw).trim_end()),
            Ok(None) => break,
            Err(e) => {
                warn!("Error while reading scanner stderr: {}", e);
                break;
            }
        }
    }
}
