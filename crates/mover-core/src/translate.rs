//! Conversions from received messages into outbound batch entries.

use crate::message::{DeleteEntry, ForwardEntry, Message};

/// Builds one send entry per message, in order, keyed by the message id.
pub fn to_forward_entries(messages: &[Message]) -> Vec<ForwardEntry> {
    messages
        .iter()
        .map(|message| ForwardEntry {
            id: message.message_id.clone(),
            body: message.body.clone(),
        })
        .collect()
}

/// Builds one delete entry per message, in order, keyed by the message id.
///
/// Only pass messages the destination has confirmed.
pub fn to_delete_entries(messages: &[Message]) -> Vec<DeleteEntry> {
    messages
        .iter()
        .map(|message| DeleteEntry {
            id: message.message_id.clone(),
            receipt_handle: message.receipt_handle.clone(),
        })
        .collect()
}
