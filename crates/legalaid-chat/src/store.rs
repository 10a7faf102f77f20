//! In-memory conversation log.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use legalaid_core::{Message, MessageId};

/// Append-only list of messages, cleared only by [`reset`](Self::reset).
///
/// Order is arrival order. With several queries outstanding, assistant
/// replies land in completion order, which may differ from send order.
/// Cloning shares the same log.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: Message) {
        let mut messages = self.lock();
        messages.push(message);
        tracing::debug!(count = messages.len(), "Message appended");
    }

    pub fn reset(&self) {
        let mut messages = self.lock();
        let cleared = messages.len();
        messages.clear();
        tracing::info!(cleared, "Conversation reset");
    }

    /// Snapshot of every message in order.
    pub fn all(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.lock().iter().find(|m| m.id == id).cloned()
    }

    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
