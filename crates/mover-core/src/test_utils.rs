//! In-memory queue service with scriptable faults.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{MoveError, Operation};
use crate::message::{
    BatchFailure, DeleteEntry, DeleteOutcome, ForwardEntry, ForwardOutcome, Message, MessageId,
    QueueUrl, ReceiveRequest,
};
use crate::progress::Progress;
use crate::service::QueueService;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Receive { queue: QueueUrl, max_messages: i32 },
    Forward { queue: QueueUrl, ids: Vec<MessageId> },
    Delete { queue: QueueUrl, ids: Vec<MessageId> },
}

/// Failures to inject. Ids name messages as they sit in the source queue.
#[derive(Default)]
pub struct Faults {
    /// Zero-based index of the receive call that fails outright.
    pub receive_fails_on: Option<usize>,
    pub forward_fails: bool,
    /// Entries the destination refuses.
    pub reject_forward: HashSet<MessageId>,
    /// Entries the destination stores but leaves out of the response.
    pub unconfirmed_forward: HashSet<MessageId>,
    pub delete_fails: bool,
    /// Entries the source refuses to delete.
    pub reject_delete: HashSet<MessageId>,
}

#[derive(Default)]
struct FakeQueue {
    visible: VecDeque<(MessageId, String)>,
    in_flight: HashMap<String, (MessageId, String)>,
}

pub struct FakeQueues {
    queues: Mutex<HashMap<QueueUrl, FakeQueue>>,
    calls: Mutex<Vec<Call>>,
    faults: Faults,
    next_id: AtomicUsize,
    next_receipt: AtomicUsize,
}

pub fn url(name: &str) -> QueueUrl {
    QueueUrl::new(format!("fake://{name}"))
}

pub fn id(n: usize) -> MessageId {
    MessageId::new(format!("id-{n}"))
}

impl FakeQueues {
    pub fn new(names: &[&str]) -> Self {
        Self {
            queues: Mutex::new(
                names
                    .iter()
                    .map(|name| (url(name), FakeQueue::default()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
            faults: Faults::default(),
            next_id: AtomicUsize::new(0),
            next_receipt: AtomicUsize::new(0),
        }
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Enqueues `count` messages with ids `id-0`, `id-1`, ... and bodies
    /// `message 0`, `message 1`, ...
    pub fn seed(self, name: &str, count: usize) -> Self {
        {
            let mut queues = self.queues.lock().unwrap();
            let queue = queues.get_mut(&url(name)).unwrap();
            for _ in 0..count {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                queue.visible.push_back((id(n), format!("message {n}")));
            }
        }
        self
    }

    pub fn bodies(&self, name: &str) -> Vec<String> {
        self.queues.lock().unwrap()[&url(name)]
            .visible
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn in_flight(&self, name: &str) -> usize {
        self.queues.lock().unwrap()[&url(name)].in_flight.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<Vec<MessageId>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn forwards(&self) -> Vec<Vec<MessageId>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Forward { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let previous = calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(&call))
            .count();
        calls.push(call);
        previous
    }
}

fn failure(id: &MessageId, code: &str) -> BatchFailure {
    BatchFailure {
        id: id.clone(),
        code: code.to_string(),
        message: None,
        sender_fault: false,
    }
}

fn missing_queue(operation: Operation, queue: &QueueUrl) -> MoveError {
    MoveError::service(operation, std::io::Error::other(format!("no queue at {queue}")))
}

#[async_trait]
impl QueueService for FakeQueues {
    async fn resolve(&self, name: &str) -> Result<QueueUrl, MoveError> {
        let queue = url(name);
        if self.queues.lock().unwrap().contains_key(&queue) {
            Ok(queue)
        } else {
            Err(MoveError::QueueNotFound {
                name: name.to_string(),
            })
        }
    }

    async fn approximate_count(&self, queue: &QueueUrl) -> Result<u64, MoveError> {
        let queues = self.queues.lock().unwrap();
        let queue = queues
            .get(queue)
            .ok_or_else(|| missing_queue(Operation::Attributes, queue))?;
        Ok(queue.visible.len() as u64)
    }

    async fn receive(
        &self,
        queue: &QueueUrl,
        request: ReceiveRequest,
    ) -> Result<Vec<Message>, MoveError> {
        let n = self.record(Call::Receive {
            queue: queue.clone(),
            max_messages: request.max_messages,
        });
        if self.faults.receive_fails_on == Some(n) {
            return Err(MoveError::service(
                Operation::Receive,
                std::io::Error::other("connection reset"),
            ));
        }

        let mut queues = self.queues.lock().unwrap();
        let source = queues
            .get_mut(queue)
            .ok_or_else(|| missing_queue(Operation::Receive, queue))?;

        let mut batch = Vec::new();
        while batch.len() < request.max_messages as usize {
            let Some((message_id, body)) = source.visible.pop_front() else {
                break;
            };
            let receipt_handle = format!(
                "{message_id}-receipt-{}",
                self.next_receipt.fetch_add(1, Ordering::SeqCst)
            );
            source
                .in_flight
                .insert(receipt_handle.clone(), (message_id.clone(), body.clone()));
            batch.push(Message {
                message_id,
                receipt_handle,
                body,
            });
        }

        Ok(batch)
    }

    async fn forward(
        &self,
        queue: &QueueUrl,
        entries: Vec<ForwardEntry>,
    ) -> Result<ForwardOutcome, MoveError> {
        self.record(Call::Forward {
            queue: queue.clone(),
            ids: entries.iter().map(|entry| entry.id.clone()).collect(),
        });
        if self.faults.forward_fails {
            return Err(MoveError::service(
                Operation::Forward,
                std::io::Error::other("service unavailable"),
            ));
        }

        let mut queues = self.queues.lock().unwrap();
        let destination = queues
            .get_mut(queue)
            .ok_or_else(|| missing_queue(Operation::Forward, queue))?;

        let mut outcome = ForwardOutcome::default();
        for entry in entries {
            if self.faults.reject_forward.contains(&entry.id) {
                outcome.failed.push(failure(&entry.id, "InternalError"));
                continue;
            }

            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            destination.visible.push_back((id(n), entry.body));
            if !self.faults.unconfirmed_forward.contains(&entry.id) {
                outcome.successful.push(entry.id);
            }
        }

        Ok(outcome)
    }

    async fn delete(
        &self,
        queue: &QueueUrl,
        entries: Vec<DeleteEntry>,
    ) -> Result<DeleteOutcome, MoveError> {
        self.record(Call::Delete {
            queue: queue.clone(),
            ids: entries.iter().map(|entry| entry.id.clone()).collect(),
        });
        if self.faults.delete_fails {
            return Err(MoveError::service(
                Operation::Delete,
                std::io::Error::other("request timed out"),
            ));
        }

        let mut queues = self.queues.lock().unwrap();
        let source = queues
            .get_mut(queue)
            .ok_or_else(|| missing_queue(Operation::Delete, queue))?;

        let mut outcome = DeleteOutcome::default();
        for entry in entries {
            if self.faults.reject_delete.contains(&entry.id)
                || source.in_flight.remove(&entry.receipt_handle).is_none()
            {
                outcome
                    .failed
                    .push(failure(&entry.id, "ReceiptHandleIsInvalid"));
            }
        }

        Ok(outcome)
    }
}

/// Keeps every progress update.
#[derive(Debug, Default)]
pub struct Recorder(pub Vec<(u64, u64)>);

impl Progress for Recorder {
    fn report(&mut self, moved: u64, total: u64) {
        self.0.push((moved, total));
    }
}
