// STD LIB
use std::process::Stdio;

// THIRD PARTY CRATES
use shared::Sample;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::sync::mpsc::Sender;
use tracing::info;

// LOCAL CRATE
use crate::device::{FeedHandle, relay_lines, relay_stderr};
use crate::error::FeedError;

/// Public API for spawning the scanner command and streaming its output.
///
/// The command line is split on whitespace, without shell quoting. The sample
/// channel is closed once stdout ends, which ends the downstream stages.
pub fn start(
    command: &str,
    client_id: String,
    sample_tx: Sender<Sample>,
) -> Result<FeedHandle, FeedError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or(FeedError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| FeedError::Spawn {
            command: command.to_string(),
            source,
        })?;
    info!("Started scanner: {}", command);

    let stdout = child.stdout.take().ok_or(FeedError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(FeedError::MissingPipe("stderr"))?;

    let stdout_task = tokio::spawn(async move {
        relay_lines(BufReader::new(stdout), &client_id, &sample_tx).await
    });
    let stderr_task = tokio::spawn(relay_stderr(BufReader::new(stderr)));

    Ok(FeedHandle {
        child,
        stdout_task,
        stderr_task,
    })
}
