// src/stylist/session.rs — Stylist session lifecycle and the send/receive state machine
//
// One session = one contextual product (or none). The session owns its chat
// handle, transcript and pending input; dropping it releases all of them.
//
//   Uninitialized -> Initializing -> Ready
//   Ready -> AwaitingResponse -> StreamingResponse -> Ready
//   any busy state -> Failed -> Ready   (failures are per-turn)

use futures::StreamExt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context;
use super::input::{ImageAttachment, PendingInput};
use super::message::{Message, MessageId, Transcript};
use crate::catalog::{Catalog, Product};
use crate::infra::config::Config;
use crate::infra::errors::LumiereError;
use crate::provider::chat::GenerationSettings;
use crate::provider::{ChatHandle, MessageParts, ModelProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    AwaitingResponse,
    StreamingResponse,
    Failed,
}

impl LifecycleState {
    /// Whether a new turn may start. Only `Ready` (or a surfaced failure) accepts one.
    pub fn accepts_send(&self) -> bool {
        matches!(self, LifecycleState::Ready | LifecycleState::Failed)
    }
}

/// Why the most recent failure happened; each is surfaced as a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    Initialization(String),
    Send(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(LifecycleState),
    MessageAppended(Message),
    /// One streamed fragment, after it was patched into message `id`.
    Fragment {
        id: MessageId,
        text: String,
        is_streaming: bool,
    },
    Finalized(MessageId),
    /// The pending input after a change, including the clear on send.
    InputChanged { text: String, has_attachment: bool },
    /// Local validation notice (nothing was sent).
    Notice(String),
}

pub type SessionObserver = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub brand: String,
    pub generation: GenerationSettings,
    pub response_timeout: Option<Duration>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            brand: config.stylist.brand.clone(),
            generation: GenerationSettings {
                model: config.model.model.clone(),
                temperature: config.model.temperature,
                max_tokens: config.model.max_output_tokens,
            },
            response_timeout: config.stylist.response_timeout(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct StylistSession {
    chat: ChatHandle,
    product: Option<Product>,
    transcript: Transcript,
    input: PendingInput,
    state: LifecycleState,
    brand: String,
    response_timeout: Option<Duration>,
    last_failure: Option<SessionFailure>,
    observer: Option<SessionObserver>,
}

impl StylistSession {
    /// Build the session and its system prompt. No network traffic happens
    /// until [`StylistSession::open`].
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        catalog: &Catalog,
        product: Option<Product>,
        settings: SessionSettings,
    ) -> Self {
        let system = context::build_system_prompt(&settings.brand, catalog, product.as_ref());
        Self {
            chat: ChatHandle::new(provider, settings.generation, system),
            product,
            transcript: Transcript::new(),
            input: PendingInput::default(),
            state: LifecycleState::Uninitialized,
            brand: settings.brand,
            response_timeout: settings.response_timeout,
            last_failure: None,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: SessionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn system_prompt(&self) -> &str {
        self.chat.system_prompt()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending(&self) -> &PendingInput {
        &self.input
    }

    pub fn last_failure(&self) -> Option<&SessionFailure> {
        self.last_failure.as_ref()
    }

    pub fn can_send(&self) -> bool {
        self.state.accepts_send() && self.input.is_sendable()
    }

    // ─── Events ─────────────────────────────────────────────────

    fn emit(&self, event: SessionEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    fn set_state(&mut self, state: LifecycleState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "stylist state");
            self.state = state;
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    fn append_assistant(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.transcript.push_assistant(text);
        self.emit_appended(id);
        id
    }

    fn emit_input(&self) {
        self.emit(SessionEvent::InputChanged {
            text: self.input.text().to_string(),
            has_attachment: self.input.attachment().is_some(),
        });
    }

    fn emit_appended(&self, id: MessageId) {
        if let Some(message) = self.transcript.get(id) {
            self.emit(SessionEvent::MessageAppended(message.clone()));
        }
    }

    // ─── Initialization ─────────────────────────────────────────

    /// Post the opening message. With a contextual product this makes one
    /// non-streaming greeting request; without one it posts a canned welcome.
    /// Calling it again after the first time does nothing.
    pub async fn open(&mut self) {
        if self.state != LifecycleState::Uninitialized {
            return;
        }
        self.set_state(LifecycleState::Initializing);
        info!(
            product = self.product.as_ref().map(|p| p.name.as_str()),
            "stylist session opening"
        );

        let Some(product) = self.product.clone() else {
            let welcome = context::welcome_greeting(&self.brand);
            self.append_assistant(welcome);
            self.set_state(LifecycleState::Ready);
            return;
        };

        let prompt = context::greeting_prompt(&product);
        let timeout = self.response_timeout;
        let result = with_deadline(timeout, self.chat.send(&prompt)).await;

        match result {
            Ok(Some(text)) => {
                self.append_assistant(text);
            }
            Ok(None) => {
                debug!("greeting came back empty, using fallback");
                self.append_assistant(context::fallback_greeting(&product));
            }
            Err(e) => {
                warn!(error = %e, "stylist greeting failed");
                self.append_assistant(context::INIT_APOLOGY);
                self.last_failure = Some(SessionFailure::Initialization(e.to_string()));
                self.set_state(LifecycleState::Failed);
            }
        }
        self.set_state(LifecycleState::Ready);
    }

    // ─── Input capture ──────────────────────────────────────────

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input.set_text(text);
        self.emit_input();
    }

    /// Validate and attach a selected file. A non-image leaves the slot as it
    /// was and surfaces a notice.
    pub fn select_file(&mut self, bytes: &[u8], mime_type: &str) -> Result<(), LumiereError> {
        self.accept_attachment(ImageAttachment::from_bytes(bytes, mime_type))
    }

    pub fn select_path(&mut self, path: &Path) -> Result<(), LumiereError> {
        self.accept_attachment(ImageAttachment::from_path(path))
    }

    fn accept_attachment(
        &mut self,
        attachment: Result<ImageAttachment, LumiereError>,
    ) -> Result<(), LumiereError> {
        match attachment {
            Ok(image) => {
                self.input.attach(image);
                self.emit_input();
                Ok(())
            }
            Err(e) => {
                self.emit(SessionEvent::Notice(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn clear_attachment(&mut self) {
        self.input.clear_attachment();
        self.emit_input();
    }

    // ─── Send / receive ─────────────────────────────────────────

    /// Send the pending input. See [`StylistSession::send_with_cancel`].
    pub async fn send(&mut self) -> Result<(), LumiereError> {
        self.send_with_cancel(CancellationToken::new()).await
    }

    /// Run one user turn.
    ///
    /// Returns `Err` only for local rejections (`SessionBusy`, `EmptyInput`),
    /// which leave the session untouched. Transport failures, cancellation and
    /// timeouts are reported in the transcript and the call returns `Ok`.
    pub async fn send_with_cancel(&mut self, cancel: CancellationToken) -> Result<(), LumiereError> {
        if !self.state.accepts_send() {
            return Err(LumiereError::SessionBusy);
        }
        let Some(committed) = self.input.take() else {
            return Err(LumiereError::EmptyInput);
        };
        self.emit_input();
        self.set_state(LifecycleState::AwaitingResponse);

        let image = committed.image.as_ref().map(ImageAttachment::to_attached);
        let user_id = self.transcript.push_user(committed.text.clone(), image);
        self.emit_appended(user_id);

        let parts = committed.to_parts();
        debug!(image = parts.has_image(), "stylist turn sent");
        let timeout = self.response_timeout;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LumiereError::Cancelled),
            result = with_deadline(timeout, self.stream_reply(&parts)) => result,
        };

        match outcome {
            Ok(reply) => {
                if !self.chat.record_turn(parts, reply) {
                    debug!("empty reply left out of history");
                }
                self.set_state(LifecycleState::Ready);
            }
            Err(e) => self.fail_turn(e),
        }
        Ok(())
    }

    /// Issue the streaming request and patch fragments into a placeholder.
    async fn stream_reply(&mut self, parts: &MessageParts) -> Result<String, LumiereError> {
        let mut stream = self.chat.send_stream(parts).await?;

        let id = self.transcript.push_placeholder();
        self.emit_appended(id);
        self.set_state(LifecycleState::StreamingResponse);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.delta.is_empty() {
                continue;
            }
            self.transcript.append_fragment(id, &chunk.delta);
            let is_streaming = self.transcript.get(id).is_some_and(|m| m.is_streaming);
            self.emit(SessionEvent::Fragment {
                id,
                text: chunk.delta,
                is_streaming,
            });
        }

        self.transcript.finalize(id);
        self.emit(SessionEvent::Finalized(id));
        Ok(self
            .transcript
            .get(id)
            .map(|m| m.text.clone())
            .unwrap_or_default())
    }

    /// Surface a failed turn: stop any half-streamed placeholder where it is,
    /// post an apology, and return to `Ready`.
    fn fail_turn(&mut self, error: LumiereError) {
        warn!(error = %error, "stylist turn failed");
        if let Some(id) = self.transcript.streaming_id() {
            self.transcript.finalize(id);
            self.emit(SessionEvent::Finalized(id));
        }
        self.append_assistant(context::SEND_APOLOGY);
        self.last_failure = Some(SessionFailure::Send(error.to_string()));
        self.set_state(LifecycleState::Failed);
        self.set_state(LifecycleState::Ready);
    }
}

impl Drop for StylistSession {
    fn drop(&mut self) {
        debug!(
            messages = self.transcript.len(),
            "stylist session closed"
        );
    }
}

async fn with_deadline<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, LumiereError>
where
    F: Future<Output = Result<T, LumiereError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| LumiereError::Timeout {
                seconds: limit.as_secs(),
            })?,
        None => fut.await,
    }
}
