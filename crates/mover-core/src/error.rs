//! Error types for moving messages between queues.

use std::fmt;
use thiserror::Error;

use crate::message::{BatchFailure, QueueUrl};

/// The queue service call that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Resolve,
    Attributes,
    Receive,
    Forward,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Resolve => write!(f, "resolve queue url"),
            Operation::Attributes => write!(f, "read queue attributes"),
            Operation::Receive => write!(f, "receive messages"),
            Operation::Forward => write!(f, "send messages to the destination"),
            Operation::Delete => write!(f, "delete messages from the source"),
        }
    }
}

/// Every variant is terminal for a run.
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("queue `{name}` does not exist")]
    QueueNotFound { name: String },

    #[error("failed to {operation}: {message}")]
    Service {
        operation: Operation,
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{} messages failed to enqueue: {}", .failed.len(), Failures(.failed))]
    PartialForward { failed: Vec<BatchFailure> },

    #[error("destination confirmed {confirmed} of {sent} messages")]
    ForwardIncomplete { sent: usize, confirmed: usize },

    #[error("{} messages were not deleted from the source: {}", .failed.len(), Failures(.failed))]
    PartialDelete { failed: Vec<BatchFailure> },

    #[error("received a message without a {field}")]
    MalformedMessage { field: &'static str },

    #[error("source and destination are the same queue: {queue}")]
    SameQueue { queue: QueueUrl },
}

impl MoveError {
    pub fn service<E>(operation: Operation, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MoveError::Service {
            operation,
            message: error.to_string(),
            source: Box::new(error),
        }
    }

    /// Whether some messages of the failed batch may already be in the
    /// destination while still sitting in the source, so a rerun can deliver
    /// them twice.
    pub fn may_duplicate(&self) -> bool {
        match self {
            MoveError::PartialForward { .. }
            | MoveError::ForwardIncomplete { .. }
            | MoveError::PartialDelete { .. } => true,
            // the send may have landed before the transport failed
            MoveError::Service { operation, .. } => {
                matches!(operation, Operation::Forward | Operation::Delete)
            }
            _ => false,
        }
    }
}

struct Failures<'a>(&'a [BatchFailure]);

impl fmt::Display for Failures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
