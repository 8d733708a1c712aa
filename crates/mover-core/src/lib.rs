//! # sqs-mover-core
//!
//! Moves every message of one AWS SQS queue into another, typically to
//! requeue what piled up in a dead letter queue.
//!
//! ## How a transfer works
//!
//! [`Mover`] repeatedly receives a batch of up to ten messages from the
//! source, sends it to the destination in one batch call, and deletes the
//! batch from the source only once the destination has accepted every
//! message. An empty receive ends the transfer. Any failure ends it too, and
//! the returned [`MoveReport`] says how many messages were moved before it.
//!
//! Delivery is at-least-once: a batch that was forwarded but could not be
//! deleted is received again by the next run.
//!
//! ## Example
//!
//! ```no_run
//! use mover::{MoveConfig, Mover, QueueService, Silent, SqsQueues};
//!
//! # async fn example() -> Result<(), mover::MoveError> {
//! let config = aws_config::from_env().load().await;
//! let queues = SqsQueues::from_config(config);
//!
//! let source = queues.resolve("orders-dlq").await?;
//! let destination = queues.resolve("orders").await?;
//! let approximate_total = queues.approximate_count(&source).await?;
//!
//! let mover = Mover::new(queues, MoveConfig::new(source, destination)?);
//! let moved = mover.run(approximate_total, &mut Silent).await.into_result()?;
//! println!("moved {moved} messages");
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod mover;
mod progress;
mod service;
mod sqs;
mod translate;

#[cfg(test)]
mod test_utils;

pub use error::{MoveError, Operation};
pub use message::{
    BatchFailure, DeleteEntry, DeleteOutcome, ForwardEntry, ForwardOutcome, Message, MessageId,
    QueueUrl, ReceiveRequest, MAX_BATCH_SIZE,
};
pub use mover::{
    MoveConfig, MoveReport, Mover, TransferState, DEFAULT_VISIBILITY_TIMEOUT,
    MAX_VISIBILITY_TIMEOUT,
};
pub use progress::{Progress, Silent, TransferProgress};
pub use service::QueueService;
pub use sqs::SqsQueues;
pub use translate::{to_delete_entries, to_forward_entries};
