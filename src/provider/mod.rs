// src/provider/mod.rs — Generative model transport layer

pub mod chat;
pub mod google;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::infra::errors::LumiereError;

pub use chat::ChatHandle;

/// Lazy, finite, non-restartable sequence of text fragments.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, LumiereError>> + Send>>;

/// Core trait that model providers implement.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LumiereError>;

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, LumiereError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// `None` when the model produced no text at all.
    pub text: Option<String>,
}

impl ChatResponse {
    /// The response text, or `None` for the empty-response outcome
    /// (missing or whitespace-only output).
    pub fn into_text(self) -> Option<String> {
        self.text.filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatChunk {
    pub delta: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a multimodal turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload without any `data:` URI prefix.
    InlineImage { mime_type: String, data: String },
}

/// A non-empty sequence of parts. Construction is the only place the
/// invariant is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageParts(Vec<Part>);

impl MessageParts {
    pub fn new(parts: Vec<Part>) -> Option<Self> {
        if parts.is_empty() {
            None
        } else {
            Some(Self(parts))
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self(vec![Part::Text(text.into())])
    }

    pub fn parts(&self) -> &[Part] {
        &self.0
    }

    pub fn has_image(&self) -> bool {
        self.0
            .iter()
            .any(|p| matches!(p, Part::InlineImage { .. }))
    }

    /// Concatenated text parts, for logging and history summaries.
    pub fn text_content(&self) -> String {
        self.0
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineImage { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: MessageParts,
}

impl Message {
    pub fn user(parts: MessageParts) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: MessageParts::text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_reject_empty() {
        assert!(MessageParts::new(vec![]).is_none());
    }

    #[test]
    fn test_parts_text() {
        let p = MessageParts::text("hello");
        assert_eq!(p.parts(), &[Part::Text("hello".into())]);
        assert!(!p.has_image());
        assert_eq!(p.text_content(), "hello");
    }

    #[test]
    fn test_parts_with_image() {
        let p = MessageParts::new(vec![
            Part::InlineImage {
                mime_type: "image/png".into(),
                data: "AAAA".into(),
            },
            Part::Text("what is this?".into()),
        ])
        .unwrap();
        assert!(p.has_image());
        assert_eq!(p.text_content(), "what is this?");
    }

    #[test]
    fn test_response_empty_text_is_none() {
        assert!(ChatResponse { text: None }.into_text().is_none());
        assert!(ChatResponse {
            text: Some("  \n".into())
        }
        .into_text()
        .is_none());
        assert_eq!(
            ChatResponse {
                text: Some("Hi".into())
            }
            .into_text()
            .as_deref(),
            Some("Hi")
        );
    }

    #[test]
    fn test_message_constructors() {
        let m = Message::model("Sure!");
        assert_eq!(m.role, Role::Model);
        assert_eq!(m.parts.text_content(), "Sure!");
        let u = Message::user(MessageParts::text("Hi"));
        assert_eq!(u.role, Role::User);
    }
}
