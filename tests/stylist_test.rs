// tests/stylist_test.rs — Integration test: stylist sessions over a scripted provider

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use lumiere::catalog::Catalog;
use lumiere::infra::errors::LumiereError;
use lumiere::provider::{ChatChunk, ChatRequest, ChatResponse, ChunkStream, ModelProvider, Part};
use lumiere::stylist::context::{INIT_APOLOGY, SEND_APOLOGY};
use lumiere::stylist::{
    LifecycleState, Role, SessionEvent, SessionFailure, SessionSettings, StylistHost,
    StylistSession, IMAGE_ONLY_PROMPT,
};

const SILK_SLIP_DRESS: u32 = 6;

enum Greeting {
    Text(&'static str),
    Empty,
    Fail,
}

/// How the next streaming request behaves.
enum Reply {
    Fragments(Vec<&'static str>),
    FailBeforeStream,
    FailAfter(Vec<&'static str>),
    Hang,
}

/// A provider that replays scripted replies and records every request.
struct ScriptedProvider {
    greeting: Greeting,
    replies: Mutex<VecDeque<Reply>>,
    greeting_requests: Mutex<Vec<ChatRequest>>,
    stream_requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn new(greeting: Greeting, replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            greeting,
            replies: Mutex::new(replies.into()),
            greeting_requests: Mutex::new(Vec::new()),
            stream_requests: Mutex::new(Vec::new()),
        })
    }

    fn greeting_requests(&self) -> Vec<ChatRequest> {
        self.greeting_requests.lock().unwrap().clone()
    }

    fn stream_requests(&self) -> Vec<ChatRequest> {
        self.stream_requests.lock().unwrap().clone()
    }
}

fn chunk(delta: &str) -> Result<ChatChunk, LumiereError> {
    Ok(ChatChunk {
        delta: delta.to_string(),
    })
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LumiereError> {
        self.greeting_requests.lock().unwrap().push(request);
        match self.greeting {
            Greeting::Text(text) => Ok(ChatResponse {
                text: Some(text.to_string()),
            }),
            Greeting::Empty => Ok(ChatResponse { text: None }),
            Greeting::Fail => Err(LumiereError::provider("scripted", "service unavailable")),
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, LumiereError> {
        self.stream_requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Fragments(vec!["ok"]));
        match reply {
            Reply::Fragments(parts) => Ok(Box::pin(futures::stream::iter(
                parts.into_iter().map(chunk).collect::<Vec<_>>(),
            ))),
            Reply::FailBeforeStream => Err(LumiereError::provider("scripted", "quota exceeded")),
            Reply::FailAfter(parts) => {
                let mut items: Vec<_> = parts.into_iter().map(chunk).collect();
                items.push(Err(LumiereError::provider("scripted", "connection reset")));
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Reply::Hang => Ok(Box::pin(futures::stream::pending::<
                Result<ChatChunk, LumiereError>,
            >())),
        }
    }
}

type EventLog = Arc<Mutex<Vec<SessionEvent>>>;

fn capture() -> (lumiere::stylist::SessionObserver, EventLog) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let observer: lumiere::stylist::SessionObserver =
        Arc::new(move |e: &SessionEvent| sink.lock().unwrap().push(e.clone()));
    (observer, log)
}

fn states(log: &EventLog) -> Vec<LifecycleState> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            SessionEvent::StateChanged(s) => Some(*s),
            _ => None,
        })
        .collect()
}

async fn open_session(
    provider: Arc<ScriptedProvider>,
    product_id: Option<u32>,
    settings: SessionSettings,
) -> (StylistSession, EventLog) {
    let catalog = Catalog::bundled().unwrap();
    let product = product_id.map(|id| catalog.get(id).unwrap().clone());
    let (observer, log) = capture();
    let mut session =
        StylistSession::new(provider, &catalog, product, settings).with_observer(observer);
    session.open().await;
    (session, log)
}

fn last_user_parts(request: &ChatRequest) -> Vec<Part> {
    request.messages.last().unwrap().parts.parts().to_vec()
}

// ─── Opening ────────────────────────────────────────────────────

#[tokio::test]
async fn test_general_session_opens_with_welcome() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    assert_eq!(session.state(), LifecycleState::Ready);
    assert_eq!(session.transcript().len(), 1);
    let welcome = session.transcript().last().unwrap();
    assert_eq!(welcome.role, Role::Assistant);
    assert!(welcome
        .text
        .starts_with("Welcome to LUMIÈRE Personal Styling."));
    assert!(provider.greeting_requests().is_empty());
    assert!(!session.system_prompt().contains("Currently Styling"));
}

#[tokio::test]
async fn test_product_greeting_carries_product_context() {
    let provider = ScriptedProvider::new(
        Greeting::Text("The Silk Slip Dress shines with gold accessories."),
        vec![],
    );
    let (session, log) =
        open_session(provider.clone(), Some(SILK_SLIP_DRESS), SessionSettings::default()).await;

    let requests = provider.greeting_requests();
    assert_eq!(requests.len(), 1);
    let prompt = requests[0].messages[0].parts.text_content();
    assert!(prompt.contains("Silk Slip Dress"));
    assert!(prompt.contains("79.9"));
    assert!(requests[0]
        .system
        .as_deref()
        .unwrap()
        .contains("Currently Styling:\nSilk Slip Dress"));

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(
        session.transcript().last().unwrap().text,
        "The Silk Slip Dress shines with gold accessories."
    );
    assert_eq!(
        states(&log),
        vec![LifecycleState::Initializing, LifecycleState::Ready]
    );
}

#[tokio::test]
async fn test_empty_greeting_uses_fallback() {
    let provider = ScriptedProvider::new(Greeting::Empty, vec![]);
    let (session, _) =
        open_session(provider, Some(SILK_SLIP_DRESS), SessionSettings::default()).await;

    let text = &session.transcript().last().unwrap().text;
    assert!(text.contains("The Silk Slip Dress is a versatile piece"));
    assert!(session.last_failure().is_none());
}

#[tokio::test]
async fn test_greeting_failure_posts_one_apology() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (mut session, log) =
        open_session(provider.clone(), Some(SILK_SLIP_DRESS), SessionSettings::default()).await;

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript().last().unwrap().text, INIT_APOLOGY);
    assert!(matches!(
        session.last_failure(),
        Some(SessionFailure::Initialization(_))
    ));
    assert_eq!(
        states(&log),
        vec![
            LifecycleState::Initializing,
            LifecycleState::Failed,
            LifecycleState::Ready
        ]
    );

    // The session stays usable after a failed greeting
    session.set_text("What shoes go with it?");
    session.send().await.unwrap();
    assert_eq!(session.transcript().last().unwrap().text, "ok");
    assert_eq!(provider.stream_requests().len(), 1);
}

// ─── Sending ────────────────────────────────────────────────────

#[tokio::test]
async fn test_streamed_reply_concatenates_fragments() {
    let provider = ScriptedProvider::new(
        Greeting::Fail,
        vec![Reply::Fragments(vec!["Try the ", "Cashmere Knit ", "in Navy."])],
    );
    let (mut session, log) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].text, "something blue");
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].text, "Try the Cashmere Knit in Navy.");
    assert!(!messages[2].is_streaming);
    assert!(session.pending().text().is_empty());
    assert_eq!(session.state(), LifecycleState::Ready);

    let events = log.lock().unwrap().clone();
    let placeholder = events.iter().find_map(|e| match e {
        SessionEvent::MessageAppended(m) if m.is_streaming => Some(m.clone()),
        _ => None,
    });
    let placeholder = placeholder.expect("placeholder announced");
    assert_eq!(placeholder.text, "");
    assert_eq!(placeholder.id, messages[2].id);

    let fragments: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Fragment { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(fragments, vec!["Try the ", "Cashmere Knit ", "in Navy."]);
    assert!(events.contains(&SessionEvent::Finalized(messages[2].id)));

    assert_eq!(
        last_user_parts(&provider.stream_requests()[0]),
        vec![Part::Text("something blue".into())]
    );
    assert_eq!(
        states(&log),
        vec![
            LifecycleState::Initializing,
            LifecycleState::Ready,
            LifecycleState::AwaitingResponse,
            LifecycleState::StreamingResponse,
            LifecycleState::Ready,
        ]
    );
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_request() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (mut session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.set_text("   \n\t");
    assert!(!session.can_send());
    assert!(matches!(session.send().await, Err(LumiereError::EmptyInput)));
    assert_eq!(session.transcript().len(), 1);
    assert!(provider.stream_requests().is_empty());
}

#[tokio::test]
async fn test_non_image_attachment_is_refused() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (mut session, log) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.select_file(b"look", "image/jpeg").unwrap();
    let err = session.select_file(b"%PDF-1.7", "application/pdf").unwrap_err();
    assert!(matches!(err, LumiereError::InvalidAttachment { .. }));

    // The earlier image is still the pending attachment
    assert_eq!(
        session.pending().attachment().unwrap().mime_type(),
        "image/jpeg"
    );
    assert!(log
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, SessionEvent::Notice(msg) if msg.starts_with("Please upload an image file"))));
    assert!(provider.stream_requests().is_empty());
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn test_image_only_send_uses_analysis_prompt() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (mut session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.select_file(b"abc", "image/png").unwrap();
    assert!(session.can_send());
    session.send().await.unwrap();

    assert_eq!(
        last_user_parts(&provider.stream_requests()[0]),
        vec![
            Part::InlineImage {
                mime_type: "image/png".into(),
                data: "YWJj".into(),
            },
            Part::Text(IMAGE_ONLY_PROMPT.into()),
        ]
    );

    let user = &session.transcript().messages()[1];
    assert_eq!(user.text, "");
    assert_eq!(
        user.image.as_ref().unwrap().display,
        "data:image/png;base64,YWJj"
    );
    assert!(session.pending().attachment().is_none());
}

#[tokio::test]
async fn test_text_and_image_are_sent_together() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![]);
    let (mut session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.select_file(b"abc", "image/webp").unwrap();
    session.set_text("Does this work for a wedding?");
    session.send().await.unwrap();

    let parts = last_user_parts(&provider.stream_requests()[0]);
    assert_eq!(parts.len(), 2);
    assert!(matches!(&parts[0], Part::InlineImage { mime_type, .. } if mime_type == "image/webp"));
    assert_eq!(parts[1], Part::Text("Does this work for a wedding?".into()));
}

#[tokio::test]
async fn test_completed_turns_are_sent_as_history() {
    let provider = ScriptedProvider::new(
        Greeting::Fail,
        vec![
            Reply::Fragments(vec!["Navy suits you."]),
            Reply::Fragments(vec!["Under $100, the knit."]),
        ],
    );
    let (mut session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();
    session.set_text("and cheaper?");
    session.send().await.unwrap();

    let requests = provider.stream_requests();
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(
        requests[1].messages[1].parts.text_content(),
        "Navy suits you."
    );
    assert_eq!(requests[0].system, requests[1].system);
}

#[tokio::test]
async fn test_empty_replies_are_not_replayed_as_history() {
    let provider = ScriptedProvider::new(
        Greeting::Empty,
        vec![Reply::Fragments(vec![]), Reply::Fragments(vec!["Navy."])],
    );
    let (mut session, _) =
        open_session(provider.clone(), Some(SILK_SLIP_DRESS), SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();
    session.set_text("and shoes?");
    session.send().await.unwrap();
    session.set_text("thanks");
    session.send().await.unwrap();

    let requests = provider.stream_requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        for message in &request.messages {
            assert!(
                !message
                    .parts
                    .parts()
                    .iter()
                    .any(|p| matches!(p, Part::Text(t) if t.trim().is_empty())),
                "blank text part sent: {:?}",
                request.messages
            );
        }
    }
    // neither the empty greeting nor the empty first reply is carried forward
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 1);
    assert_eq!(requests[2].messages.len(), 3);
    assert_eq!(requests[2].messages[1].parts.text_content(), "Navy.");
}

#[tokio::test]
async fn test_input_clears_before_reply_arrives() {
    let provider = ScriptedProvider::new(
        Greeting::Fail,
        vec![Reply::Fragments(vec!["Navy ", "and ", "gold."])],
    );
    let (mut session, log) = open_session(provider, None, SessionSettings::default()).await;

    session.select_file(b"abc", "image/png").unwrap();
    session.set_text("something blue");
    session.send().await.unwrap();

    let events = log.lock().unwrap().clone();
    let awaiting = events
        .iter()
        .position(|e| *e == SessionEvent::StateChanged(LifecycleState::AwaitingResponse))
        .unwrap();
    let first_fragment = events
        .iter()
        .position(|e| matches!(e, SessionEvent::Fragment { .. }))
        .unwrap();
    assert!(awaiting < first_fragment);

    // The last input snapshot before the turn starts is already empty
    let before_turn = events[..awaiting].iter().rev().find_map(|e| match e {
        SessionEvent::InputChanged {
            text,
            has_attachment,
        } => Some((text.clone(), *has_attachment)),
        _ => None,
    });
    assert_eq!(before_turn, Some((String::new(), false)));
    assert!(!events[awaiting..]
        .iter()
        .any(|e| matches!(e, SessionEvent::InputChanged { .. })));
}

#[tokio::test]
async fn test_reply_stays_streaming_until_finalized() {
    let provider = ScriptedProvider::new(
        Greeting::Fail,
        vec![Reply::Fragments(vec!["Try ", "the ", "knit."])],
    );
    let (mut session, log) = open_session(provider, None, SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();

    let events = log.lock().unwrap().clone();
    let flags: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Fragment { is_streaming, .. } => Some(*is_streaming),
            _ => None,
        })
        .collect();
    assert_eq!(flags, vec![true, true, true]);

    let reply_id = session.transcript().last().unwrap().id;
    let last_fragment = events
        .iter()
        .rposition(|e| matches!(e, SessionEvent::Fragment { .. }))
        .unwrap();
    let finalized = events
        .iter()
        .position(|e| *e == SessionEvent::Finalized(reply_id))
        .unwrap();
    assert!(last_fragment < finalized);
    assert!(!session.transcript().last().unwrap().is_streaming);
}

// ─── Failures ───────────────────────────────────────────────────

#[tokio::test]
async fn test_request_failure_appends_apology() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![Reply::FailBeforeStream]);
    let (mut session, log) = open_session(provider, None, SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].text, "something blue");
    assert_eq!(messages[2].text, SEND_APOLOGY);
    assert!(messages.iter().all(|m| !m.is_streaming));
    assert_eq!(session.state(), LifecycleState::Ready);
    assert!(session.pending().text().is_empty());
    assert!(states(&log).ends_with(&[
        LifecycleState::AwaitingResponse,
        LifecycleState::Failed,
        LifecycleState::Ready
    ]));
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_reply() {
    let provider = ScriptedProvider::new(
        Greeting::Fail,
        vec![Reply::FailAfter(vec!["Try the "]), Reply::Fragments(vec!["Again?"])],
    );
    let (mut session, _) = open_session(provider.clone(), None, SessionSettings::default()).await;

    session.set_text("something blue");
    session.send().await.unwrap();

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].text, "Try the ");
    assert!(!messages[2].is_streaming);
    assert_eq!(messages[3].text, SEND_APOLOGY);
    assert!(matches!(session.last_failure(), Some(SessionFailure::Send(_))));

    // The failed exchange is not replayed as history
    session.set_text("hello?");
    session.send().await.unwrap();
    assert_eq!(provider.stream_requests()[1].messages.len(), 1);
}

#[tokio::test]
async fn test_slow_reply_times_out() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![Reply::Hang]);
    let settings = SessionSettings {
        response_timeout: Some(Duration::from_millis(50)),
        ..SessionSettings::default()
    };
    let (mut session, _) = open_session(provider, None, settings).await;

    session.set_text("something blue");
    session.send().await.unwrap();

    let messages = session.transcript().messages();
    assert_eq!(messages.last().unwrap().text, SEND_APOLOGY);
    assert!(messages.iter().all(|m| !m.is_streaming));
    assert_eq!(session.state(), LifecycleState::Ready);
}

#[tokio::test]
async fn test_cancel_stops_streaming_reply() {
    let provider = ScriptedProvider::new(Greeting::Fail, vec![Reply::Hang]);
    let settings = SessionSettings {
        response_timeout: None,
        ..SessionSettings::default()
    };
    let (mut session, _) = open_session(provider, None, settings).await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    session.set_text("something blue");
    session.send_with_cancel(token).await.unwrap();

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].text, "");
    assert!(!messages[2].is_streaming);
    assert_eq!(messages[3].text, SEND_APOLOGY);
    assert_eq!(session.state(), LifecycleState::Ready);
}

// ─── Host ───────────────────────────────────────────────────────

fn host(provider: Arc<ScriptedProvider>) -> StylistHost {
    StylistHost::new(
        provider,
        Catalog::bundled().unwrap(),
        SessionSettings::default(),
    )
}

#[tokio::test]
async fn test_reentering_same_product_keeps_session() {
    let provider = ScriptedProvider::new(Greeting::Text("Lovely."), vec![]);
    let mut host = host(provider.clone());

    let session = host.enter_with_product_id(Some(SILK_SLIP_DRESS)).await.unwrap();
    session.set_text("something blue");
    session.send().await.unwrap();

    let session = host.enter_with_product_id(Some(SILK_SLIP_DRESS)).await.unwrap();
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(provider.greeting_requests().len(), 1);
}

#[tokio::test]
async fn test_switching_product_starts_fresh_session() {
    let provider = ScriptedProvider::new(Greeting::Text("Lovely."), vec![]);
    let mut host = host(provider.clone());

    let first_prompt = host
        .enter_with_product_id(Some(SILK_SLIP_DRESS))
        .await
        .unwrap()
        .system_prompt()
        .to_string();

    let other = host.enter_with_product_id(Some(1)).await.unwrap();
    assert_eq!(other.transcript().len(), 1);
    assert_ne!(other.system_prompt(), first_prompt);

    let again = host.enter_with_product_id(Some(SILK_SLIP_DRESS)).await.unwrap();
    assert_eq!(again.system_prompt(), first_prompt);
    assert_eq!(again.transcript().len(), 1);
    assert_eq!(provider.greeting_requests().len(), 3);
}

#[tokio::test]
async fn test_leave_and_unknown_product() {
    let provider = ScriptedProvider::new(Greeting::Text("Lovely."), vec![]);
    let mut host = host(provider);

    host.enter_stylist(None).await;
    assert!(host.session().is_some());
    host.leave_stylist();
    assert!(host.session().is_none());

    let err = host.enter_with_product_id(Some(999)).await.err().unwrap();
    assert!(matches!(err, LumiereError::ProductNotFound { id: 999 }));
    assert!(host.session().is_none());
}
