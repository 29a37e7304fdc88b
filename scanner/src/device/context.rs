// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use std::process::ExitStatus;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::FeedError;

/// Line counters for one run of the scanner feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub lines: usize,
    pub samples: usize,
    pub malformed: usize,
}

/// A running scanner process and the tasks reading its output.
pub struct FeedHandle {
    pub(crate) child: Child,
    pub(crate) stdout_task: JoinHandle<Result<FeedStats, FeedError>>,
    pub(crate) stderr_task: JoinHandle<()>,
}

impl FeedHandle {
    /// Wait for the scanner process to exit.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        if status.success() {
            info!("Scanner process exited");
        } else {
            warn!("Command execution ended with error: {}", status);
        }
        Ok(status)
    }

    /// Stop the scanner process early.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill scanner process: {}", e);
        }
    }

    /// Wait for the output readers to drain and return the feed counters.
    pub async fn finish(self) -> Result<FeedStats, FeedError> {
        let stats = self.stdout_task.await??;
        if let Err(e) = self.stderr_task.await {
            warn!("Scanner stderr task failed: {}", e);
        }
        Ok(stats)
    }
}
