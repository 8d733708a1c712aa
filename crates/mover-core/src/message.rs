//! Messages and the batch request/response shapes exchanged with a queue service.

use std::fmt;

/// Largest batch SQS accepts for receive, send and delete calls.
pub const MAX_BATCH_SIZE: i32 = 10;

/// Resolved address of a queue.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueUrl(String);

impl QueueUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueueUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Queue-assigned identifier of a message. Doubles as the correlation id of
/// the batch entries built from that message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A received message.
///
/// The receipt handle is only valid until the visibility timeout granted by
/// the receive call runs out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub message_id: MessageId,
    pub receipt_handle: String,
    pub body: String,
}

/// Request to deliver one message to the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardEntry {
    pub id: MessageId,
    pub body: String,
}

/// Request to remove one message from the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteEntry {
    pub id: MessageId,
    pub receipt_handle: String,
}

/// Parameters of a single receive call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub max_messages: i32,
    pub visibility_timeout: i32,
    pub wait_time_seconds: i32,
}

/// One entry of a batch call that the service refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: MessageId,
    pub code: String,
    pub message: Option<String>,
    pub sender_fault: bool,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({}: {})", self.id, self.code, message),
            None => write!(f, "{} ({})", self.id, self.code),
        }
    }
}

/// Result of a forward-batch call that reached the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub successful: Vec<MessageId>,
    pub failed: Vec<BatchFailure>,
}

/// Result of a delete-batch call that reached the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub failed: Vec<BatchFailure>,
}
