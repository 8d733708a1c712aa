//! The receive → forward → delete loop.

use crate::error::MoveError;
use crate::message::{Message, QueueUrl, ReceiveRequest, MAX_BATCH_SIZE};
use crate::progress::{Progress, TransferProgress};
use crate::service::QueueService;
use crate::translate::{to_delete_entries, to_forward_entries};

/// Seconds a received batch stays hidden from other consumers. Has to cover
/// one forward and one delete call.
pub const DEFAULT_VISIBILITY_TIMEOUT: i32 = 15;

/// Longest visibility timeout SQS accepts, 12 hours.
pub const MAX_VISIBILITY_TIMEOUT: i32 = 43_200;

/// Source and destination of a transfer plus the receive parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveConfig {
    source: QueueUrl,
    destination: QueueUrl,
    batch_size: i32,
    visibility_timeout: i32,
}

impl MoveConfig {
    pub fn new(source: QueueUrl, destination: QueueUrl) -> Result<Self, MoveError> {
        if source == destination {
            return Err(MoveError::SameQueue { queue: source });
        }

        Ok(Self {
            source,
            destination,
            batch_size: MAX_BATCH_SIZE,
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
        })
    }

    /// Clamped to what a single SQS batch call allows.
    pub fn with_batch_size(mut self, batch_size: i32) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Clamped to `1..=MAX_VISIBILITY_TIMEOUT`; a zero lease would let other
    /// consumers receive the batch while it is being forwarded.
    pub fn with_visibility_timeout(mut self, seconds: i32) -> Self {
        self.visibility_timeout = seconds.clamp(1, MAX_VISIBILITY_TIMEOUT);
        self
    }

    pub fn source(&self) -> &QueueUrl {
        &self.source
    }

    pub fn destination(&self) -> &QueueUrl {
        &self.destination
    }

    pub fn batch_size(&self) -> i32 {
        self.batch_size
    }

    pub fn visibility_timeout(&self) -> i32 {
        self.visibility_timeout
    }

    fn receive_request(&self) -> ReceiveRequest {
        ReceiveRequest {
            max_messages: self.batch_size,
            visibility_timeout: self.visibility_timeout,
            // free polling, an empty receive ends the transfer
            wait_time_seconds: 0,
        }
    }
}

/// Where a finished transfer stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// The source returned an empty receive.
    Empty,
    Failed,
}

/// Outcome of [`Mover::run`]: how far the transfer got and why it stopped.
#[derive(Debug)]
pub struct MoveReport {
    pub progress: TransferProgress,
    /// Batches that were forwarded and deleted.
    pub batches: usize,
    pub error: Option<MoveError>,
}

impl MoveReport {
    pub fn moved(&self) -> u64 {
        self.progress.moved()
    }

    pub fn state(&self) -> TransferState {
        match self.error {
            Some(_) => TransferState::Failed,
            None => TransferState::Empty,
        }
    }

    pub fn into_result(self) -> Result<u64, MoveError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.progress.moved()),
        }
    }
}

/// Moves every message of the source queue to the destination queue.
///
/// Batches are all-or-nothing: a batch is only deleted from the source once
/// the destination has accepted every message in it, and any failure ends
/// the transfer. Rerunning after a failure is safe, undeleted messages are
/// received again once their visibility timeout runs out.
pub struct Mover<S> {
    service: S,
    config: MoveConfig,
}

impl<S: QueueService> Mover<S> {
    pub fn new(service: S, config: MoveConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &MoveConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Runs until the source is observed empty or a step fails.
    ///
    /// `approximate_total` only scales the progress reported to `progress`.
    pub async fn run(
        &self,
        approximate_total: u64,
        progress: &mut (dyn Progress + Send),
    ) -> MoveReport {
        let mut state = TransferProgress::new(approximate_total);
        let mut batches = 0;

        log::info!(
            "moving messages from {} to {}",
            self.config.source,
            self.config.destination
        );
        progress.report(state.moved(), state.total());

        loop {
            match self.move_batch().await {
                Ok(None) => {
                    log::info!("source is empty, moved {} messages", state.moved());
                    return MoveReport {
                        progress: state,
                        batches,
                        error: None,
                    };
                }
                Ok(Some(moved)) => {
                    batches += 1;
                    state.record(moved);
                    progress.report(state.moved(), state.total());
                }
                Err(error) => {
                    return MoveReport {
                        progress: state,
                        batches,
                        error: Some(error),
                    };
                }
            }
        }
    }

    /// One receive → forward → delete cycle. `None` once nothing is left.
    async fn move_batch(&self) -> Result<Option<usize>, MoveError> {
        let messages = self
            .service
            .receive(&self.config.source, self.config.receive_request())
            .await?;

        if messages.is_empty() {
            return Ok(None);
        }

        log::debug!("received {} messages", messages.len());

        let forwarded = self
            .service
            .forward(&self.config.destination, to_forward_entries(&messages))
            .await?;

        if !forwarded.failed.is_empty() {
            for failure in &forwarded.failed {
                log::warn!("destination rejected {failure}");
            }
            return Err(MoveError::PartialForward {
                failed: forwarded.failed,
            });
        }

        let sent = messages.len();
        let confirmed: Vec<Message> = messages
            .into_iter()
            .filter(|message| forwarded.successful.contains(&message.message_id))
            .collect();

        if confirmed.len() != sent {
            return Err(MoveError::ForwardIncomplete {
                sent,
                confirmed: confirmed.len(),
            });
        }

        log::debug!("forwarded {sent} messages");

        let deleted = self
            .service
            .delete(&self.config.source, to_delete_entries(&confirmed))
            .await?;

        if !deleted.failed.is_empty() {
            for failure in &deleted.failed {
                log::warn!("source kept {failure}");
            }
            return Err(MoveError::PartialDelete {
                failed: deleted.failed,
            });
        }

        log::debug!("deleted {sent} messages");

        Ok(Some(sent))
    }
}
