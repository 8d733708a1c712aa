//! [`QueueService`] backed by AWS SQS.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs as sqs;
use sqs::error::DisplayErrorContext;
use sqs::types::{
    BatchResultErrorEntry, DeleteMessageBatchRequestEntry, QueueAttributeName,
    SendMessageBatchRequestEntry,
};

use crate::error::{MoveError, Operation};
use crate::message::{
    BatchFailure, DeleteEntry, DeleteOutcome, ForwardEntry, ForwardOutcome, Message, MessageId,
    QueueUrl, ReceiveRequest,
};
use crate::service::QueueService;

/// Client for the SQS queues taking part in a transfer.
///
/// # Example
///
/// ```no_run
/// use mover::{QueueService, SqsQueues};
///
/// # async fn example() -> Result<(), mover::MoveError> {
/// let config = aws_config::from_env().load().await;
/// let queues = SqsQueues::from_config(config);
///
/// let dlq = queues.resolve("orders-dlq").await?;
/// println!("{} holds about {} messages", dlq, queues.approximate_count(&dlq).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqsQueues {
    client: sqs::Client,
}

impl SqsQueues {
    /// Creates the client from a pre-built AWS SDK config, so the caller
    /// decides on credentials, region and endpoint (e.g. LocalStack).
    pub fn from_config(config: SdkConfig) -> Self {
        Self {
            client: sqs::Client::new(&config),
        }
    }

    /// The underlying client, for calls a transfer does not make itself.
    pub fn client(&self) -> &sqs::Client {
        &self.client
    }
}

fn sdk_error<E>(operation: Operation, error: E) -> MoveError
where
    E: std::error::Error + Send + Sync + 'static,
{
    MoveError::Service {
        operation,
        message: DisplayErrorContext(&error).to_string(),
        source: Box::new(error),
    }
}

fn is_queue_url(name: &str) -> bool {
    name.starts_with("https://") || name.starts_with("http://")
}

#[async_trait]
impl QueueService for SqsQueues {
    async fn resolve(&self, name: &str) -> Result<QueueUrl, MoveError> {
        if is_queue_url(name) {
            return Ok(QueueUrl::new(name));
        }

        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|e| e.is_queue_does_not_exist())
                {
                    MoveError::QueueNotFound {
                        name: name.to_string(),
                    }
                } else {
                    sdk_error(Operation::Resolve, e)
                }
            })?;

        output
            .queue_url
            .map(QueueUrl::new)
            .ok_or_else(|| MoveError::QueueNotFound {
                name: name.to_string(),
            })
    }

    async fn approximate_count(&self, queue: &QueueUrl) -> Result<u64, MoveError> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue.as_str())
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| sdk_error(Operation::Attributes, e))?;

        let count = output
            .attributes()
            .and_then(|attributes| attributes.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .and_then(|value| value.parse().ok());

        if count.is_none() {
            log::debug!("{queue} did not report ApproximateNumberOfMessages, assuming 0");
        }

        Ok(count.unwrap_or(0))
    }

    async fn receive(
        &self,
        queue: &QueueUrl,
        request: ReceiveRequest,
    ) -> Result<Vec<Message>, MoveError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue.as_str())
            .max_number_of_messages(request.max_messages)
            .visibility_timeout(request.visibility_timeout)
            .wait_time_seconds(request.wait_time_seconds)
            .send()
            .await
            .map_err(|e| sdk_error(Operation::Receive, e))?;

        output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    async fn forward(
        &self,
        queue: &QueueUrl,
        entries: Vec<ForwardEntry>,
    ) -> Result<ForwardOutcome, MoveError> {
        // SQS rejects empty batch requests
        if entries.is_empty() {
            return Ok(ForwardOutcome::default());
        }

        let entries = entries
            .into_iter()
            .map(|entry| {
                SendMessageBatchRequestEntry::builder()
                    .id(entry.id.as_str())
                    .message_body(entry.body)
                    .build()
                    .map_err(|e| sdk_error(Operation::Forward, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .send_message_batch()
            .queue_url(queue.as_str())
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|e| sdk_error(Operation::Forward, e))?;

        Ok(ForwardOutcome {
            successful: output
                .successful()
                .iter()
                .map(|entry| MessageId::new(entry.id()))
                .collect(),
            failed: output.failed().iter().map(BatchFailure::from).collect(),
        })
    }

    async fn delete(
        &self,
        queue: &QueueUrl,
        entries: Vec<DeleteEntry>,
    ) -> Result<DeleteOutcome, MoveError> {
        if entries.is_empty() {
            return Ok(DeleteOutcome::default());
        }

        let entries = entries
            .into_iter()
            .map(|entry| {
                DeleteMessageBatchRequestEntry::builder()
                    .id(entry.id.as_str())
                    .receipt_handle(entry.receipt_handle)
                    .build()
                    .map_err(|e| sdk_error(Operation::Delete, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .delete_message_batch()
            .queue_url(queue.as_str())
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|e| sdk_error(Operation::Delete, e))?;

        Ok(DeleteOutcome {
            failed: output.failed().iter().map(BatchFailure::from).collect(),
        })
    }
}

impl TryFrom<sqs::types::Message> for Message {
    type Error = MoveError;

    /// Id, receipt handle and body are optional in the SDK model but always
    /// set on messages SQS hands out.
    fn try_from(message: sqs::types::Message) -> Result<Self, Self::Error> {
        Ok(Self {
            message_id: message
                .message_id
                .map(MessageId::new)
                .ok_or(MoveError::MalformedMessage { field: "message id" })?,
            receipt_handle: message
                .receipt_handle
                .ok_or(MoveError::MalformedMessage {
                    field: "receipt handle",
                })?,
            body: message
                .body
                .ok_or(MoveError::MalformedMessage { field: "body" })?,
        })
    }
}

impl From<&BatchResultErrorEntry> for BatchFailure {
    fn from(entry: &BatchResultErrorEntry) -> Self {
        Self {
            id: MessageId::new(entry.id()),
            code: entry.code().to_string(),
            message: entry.message().map(str::to_string),
            sender_fault: entry.sender_fault(),
        }
    }
}
