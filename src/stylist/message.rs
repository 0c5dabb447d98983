// src/stylist/message.rs — Transcript messages and the append-only transcript

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque per-transcript message id. Ids increase in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Image shown alongside a user message (the displayable data URI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedImage {
    pub display: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub image: Option<AttachedImage>,
    pub is_streaming: bool,
}

/// Ordered, append-only list of messages.
///
/// At most one message is streaming at a time, and only that message's text
/// can change. Once finalized, a message is immutable.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }

    fn push(&mut self, role: Role, text: String, image: Option<AttachedImage>, streaming: bool) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            role,
            text,
            image,
            is_streaming: streaming,
        });
        id
    }

    pub fn push_user(&mut self, text: impl Into<String>, image: Option<AttachedImage>) -> MessageId {
        self.push(Role::User, text.into(), image, false)
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Role::Assistant, text.into(), None, false)
    }

    /// Append an empty streaming assistant message. Any message still marked
    /// streaming is finalized first.
    pub fn push_placeholder(&mut self) -> MessageId {
        if let Some(id) = self.streaming_id() {
            self.finalize(id);
        }
        self.push(Role::Assistant, String::new(), None, true)
    }

    /// Append a fragment to a streaming message. Returns `false` (and changes
    /// nothing) if `id` is unknown or already finalized.
    pub fn append_fragment(&mut self, id: MessageId, fragment: &str) -> bool {
        match self.get_mut(id) {
            Some(m) if m.is_streaming => {
                m.text.push_str(fragment);
                true
            }
            _ => false,
        }
    }

    /// Clear the streaming flag. Returns `false` if there was nothing to finalize.
    pub fn finalize(&mut self, id: MessageId) -> bool {
        match self.get_mut(id) {
            Some(m) if m.is_streaming => {
                m.is_streaming = false;
                true
            }
            _ => false,
        }
    }

    fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        // ids are allocated in push order; the target is almost always last
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.id == id)
    }

    pub fn streaming_id(&self) -> Option<MessageId> {
        self.messages.iter().find(|m| m.is_streaming).map(|m| m.id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
