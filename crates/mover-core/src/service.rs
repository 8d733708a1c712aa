use async_trait::async_trait;

use crate::error::MoveError;
use crate::message::{
    DeleteEntry, DeleteOutcome, ForwardEntry, ForwardOutcome, Message, QueueUrl, ReceiveRequest,
};

/// The queue operations a transfer needs.
///
/// [`crate::SqsQueues`] talks to AWS SQS; tests use an in-memory double.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Looks up the address of a queue by name.
    async fn resolve(&self, name: &str) -> Result<QueueUrl, MoveError>;

    /// Approximate number of visible messages. Only good for display.
    async fn approximate_count(&self, queue: &QueueUrl) -> Result<u64, MoveError>;

    /// Receives up to `request.max_messages` messages. An empty result means
    /// nothing is currently visible.
    async fn receive(
        &self,
        queue: &QueueUrl,
        request: ReceiveRequest,
    ) -> Result<Vec<Message>, MoveError>;

    /// Sends a batch. `Err` means the call itself failed; per-entry
    /// rejections come back in [`ForwardOutcome::failed`].
    async fn forward(
        &self,
        queue: &QueueUrl,
        entries: Vec<ForwardEntry>,
    ) -> Result<ForwardOutcome, MoveError>;

    /// Deletes a batch. Per-entry rejections come back in
    /// [`DeleteOutcome::failed`].
    async fn delete(
        &self,
        queue: &QueueUrl,
        entries: Vec<DeleteEntry>,
    ) -> Result<DeleteOutcome, MoveError>;
}
