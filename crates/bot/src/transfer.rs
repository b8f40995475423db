//! Upload progress reporting.
//!
//! While a file goes out, a status message is edited with the latest
//! progress sample. Edits are throttled to keep clear of the platform's
//! rate limits, and a failed edit never affects the upload.

use std::time::{Duration, Instant};

use explorer::{upload_progress_text, TransferProgress};
use tokio::sync::watch;
use tracing::debug;

use crate::chat::{ChatClient, MessageRef};

/// Default minimum spacing between progress edits.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1500;

/// Time-based throttle. The first sample always passes.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Returns true and records the time if enough time has passed.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Record an emission regardless of spacing.
    pub fn force_emit(&mut self) {
        self.last_emit = Some(Instant::now());
    }
}

/// Edits a status message with progress samples until the sender is dropped.
pub struct ProgressReporter<'a, C: ChatClient> {
    chat: &'a C,
    status: MessageRef,
    file_name: &'a str,
    file_size: u64,
    throttle: Throttle,
}

impl<'a, C: ChatClient> ProgressReporter<'a, C> {
    pub fn new(
        chat: &'a C,
        status: MessageRef,
        file_name: &'a str,
        file_size: u64,
        interval: Duration,
    ) -> Self {
        Self {
            chat,
            status,
            file_name,
            file_size,
            throttle: Throttle::new(interval),
        }
    }

    /// Consume samples from `samples` and report them.
    ///
    /// The final sample of a completed transfer is always shown.
    pub async fn run(mut self, mut samples: watch::Receiver<TransferProgress>) {
        while samples.changed().await.is_ok() {
            let progress = *samples.borrow_and_update();

            let complete = progress.total > 0 && progress.sent >= progress.total;
            if complete {
                self.throttle.force_emit();
            } else if !self.throttle.should_emit() {
                continue;
            }

            let text = upload_progress_text(self.file_name, self.file_size, progress);
            if let Err(e) = self.chat.edit_message(&self.status, &text, None).await {
                debug!(error = %e, file = self.file_name, "Progress update failed");
            }
        }
    }
}
