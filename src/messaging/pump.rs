//! Backoff-driven message pump.
//!
//! Turns a backend's one-batch receive primitive into a continuous,
//! cancellable delivery loop for backends without native push delivery.
//! One pump is one sequential loop: pull-model visibility semantics
//! require a single outstanding receive at a time.
//!
//! State machine per pump:
//!
//! ```text
//! Idle → Polling → Delivering → Polling → …   (non-empty batch, no wait)
//!            │
//!            └──→ Backoff ──→ Polling → …     (empty batch / absorbed error)
//!
//! any state ──→ Stopped                        (cancellation)
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::{MessagingError, MessagingResult};
use super::message::QueueMessage;
use super::messenger::Messenger;
use super::polling::{ExponentialBackoffPolicy, PollingPolicy};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default maximum batch size per receive call.
pub const DEFAULT_BATCH_SIZE: usize = 10;

// ============================================================================
// Message Handler
// ============================================================================

/// Caller-supplied processor for received batches.
///
/// A returned error is reported and treated as an empty poll (the pump
/// backs off and retries); it never stops the pump. Returning
/// [`MessagingError::Cancelled`] stops the pump cooperatively.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, messages: Vec<QueueMessage>) -> MessagingResult<()>;
}

// ============================================================================
// Pump Configuration
// ============================================================================

/// Configuration for one message pump.
pub struct PumpConfig {
    /// Channel to receive from.
    pub channel: String,
    /// Maximum messages requested per poll.
    pub batch_size: usize,
    /// Visibility window requested per poll; backend default when `None`.
    pub visibility: Option<Duration>,
    /// Backoff strategy between empty polls.
    pub policy: Box<dyn PollingPolicy>,
}

impl PumpConfig {
    /// Default configuration for a channel: batch of
    /// [`DEFAULT_BATCH_SIZE`], backend-default visibility, exponential
    /// backoff.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            visibility: None,
            policy: Box::new(ExponentialBackoffPolicy::default()),
        }
    }
}

// ============================================================================
// Message Pump
// ============================================================================

/// A continuous receive loop over a pull-model channel backend.
pub struct MessagePump {
    messenger: Arc<dyn Messenger>,
    handler: Arc<dyn MessageHandler>,
    config: PumpConfig,
}

impl MessagePump {
    /// Create a pump. Nothing runs until [`MessagePump::start`].
    pub fn new(
        messenger: Arc<dyn Messenger>,
        handler: Arc<dyn MessageHandler>,
        config: PumpConfig,
    ) -> Self {
        Self { messenger, handler, config }
    }

    /// Spawn the pump loop and return its handle immediately, without
    /// waiting for any message to arrive.
    pub fn start(self) -> PumpHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let channel = self.config.channel.clone();
        let task = tokio::spawn(run_pump(
            self.messenger,
            self.handler,
            self.config,
            shutdown_rx,
        ));

        debug!(channel = %channel, "Message pump started");
        PumpHandle { shutdown_tx, task }
    }
}

/// Handle to a running pump. Dropping the handle cancels the pump at its
/// next wakeup.
pub struct PumpHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PumpHandle {
    /// Request cancellation without waiting. An in-progress backoff wait
    /// is aborted immediately; no further backend call is issued.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Request cancellation and wait for the loop to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Message pump task panicked");
        }
    }

    /// True once the pump loop has stopped.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

// ============================================================================
// Pump Loop
// ============================================================================

async fn run_pump(
    messenger: Arc<dyn Messenger>,
    handler: Arc<dyn MessageHandler>,
    mut config: PumpConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let channel = config.channel.clone();

    loop {
        // Cancellation is observed before every backend call.
        if *shutdown_rx.borrow() {
            break;
        }

        let batch = match messenger
            .receive(&channel, config.batch_size, config.visibility)
            .await
        {
            Ok(batch) => batch,
            Err(MessagingError::Cancelled) => break,
            Err(e) => {
                // Transient faults are absorbed as an empty poll.
                warn!(channel = %channel, error = %e, "Receive failed, backing off");
                Vec::new()
            }
        };

        if !batch.is_empty() {
            let count = batch.len();
            match handler.handle(batch).await {
                Ok(()) => {
                    debug!(channel = %channel, count, "Delivered batch");
                    config.policy.reset();
                    // Back to polling immediately under sustained load.
                    continue;
                }
                Err(MessagingError::Cancelled) => break,
                Err(e) => {
                    // Handler failures never stop the pump.
                    warn!(channel = %channel, error = %e, "Handler failed, backing off");
                }
            }
        }

        let delay = config.policy.next_delay();
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A closed channel means the handle was dropped; stop too.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    debug!(channel = %channel, "Message pump stopped");
}
