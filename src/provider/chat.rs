// src/provider/chat.rs — Owned chat session handle over a ModelProvider

use std::sync::Arc;

use super::{ChatRequest, ChunkStream, Message, MessageParts, ModelProvider};
use crate::infra::errors::LumiereError;

/// Generation settings applied to every request of a chat.
#[derive(Debug, Clone, Default)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// One conversation with a model: system instruction plus the committed
/// history of completed turns. Owned by whoever created it and dropped with it.
pub struct ChatHandle {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    system: String,
    history: Vec<Message>,
}

impl ChatHandle {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        settings: GenerationSettings,
        system: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            settings,
            system: system.into(),
            history: Vec::new(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn request_with(&self, user: MessageParts) -> ChatRequest {
        let mut messages = self.history.clone();
        messages.push(Message::user(user));
        ChatRequest {
            model: self.settings.model.clone(),
            system: Some(self.system.clone()),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Non-streaming turn. Returns `Ok(None)` when the model produced no text;
    /// nothing is committed to history in that case.
    pub async fn send(&mut self, text: &str) -> Result<Option<String>, LumiereError> {
        let user = MessageParts::text(text);
        let response = self.provider.chat(self.request_with(user.clone())).await?;
        let reply = response.into_text();
        if let Some(text) = &reply {
            self.record_turn(user, text.as_str());
        }
        Ok(reply)
    }

    /// Streaming turn. The caller drains the stream and then calls
    /// [`ChatHandle::record_turn`] once the reply is complete.
    pub async fn send_stream(&self, parts: &MessageParts) -> Result<ChunkStream, LumiereError> {
        self.provider
            .chat_stream(self.request_with(parts.clone()))
            .await
    }

    /// Commit a completed exchange to the history sent with later turns.
    ///
    /// An exchange whose reply is blank is dropped: the API rejects model
    /// turns with empty text. Returns whether the turn was kept.
    pub fn record_turn(&mut self, user: MessageParts, reply: impl Into<String>) -> bool {
        let reply = reply.into();
        if reply.trim().is_empty() {
            return false;
        }
        self.history.push(Message::user(user));
        self.history.push(Message::model(reply));
        true
    }
}
