// src/cli/progress.rs — Terminal renderer for stylist session events

use std::io::Write;
use std::sync::Arc;

use crate::stylist::{Role, SessionEvent, SessionObserver};

/// Where a rendered event goes.
#[derive(Debug, PartialEq, Eq)]
enum Output {
    /// Stylist text, written without a trailing newline.
    Stdout(String),
    Stderr(String),
}

const STYLIST_PREFIX: &str = "stylist: ";

fn render(event: &SessionEvent) -> Option<Output> {
    match event {
        SessionEvent::MessageAppended(message) => match message.role {
            // The user just typed it; echoing adds nothing except for the image marker
            Role::User => message
                .image
                .as_ref()
                .map(|img| Output::Stderr(format!("[attached {}]", img.mime_type))),
            Role::Assistant if message.is_streaming => {
                Some(Output::Stdout(format!("{}{}", STYLIST_PREFIX, message.text)))
            }
            Role::Assistant => Some(Output::Stdout(format!("{}{}\n", STYLIST_PREFIX, message.text))),
        },
        SessionEvent::Fragment { text, .. } => Some(Output::Stdout(text.clone())),
        SessionEvent::Finalized(_) => Some(Output::Stdout("\n".into())),
        SessionEvent::Notice(msg) => Some(Output::Stderr(format!("[notice] {}", msg))),
        SessionEvent::StateChanged(_) | SessionEvent::InputChanged { .. } => None,
    }
}

/// Build an observer that prints stylist replies to stdout as they stream
/// and notices to stderr.
pub fn terminal_renderer() -> SessionObserver {
    Arc::new(|event: &SessionEvent| match render(event) {
        Some(Output::Stdout(text)) => {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
        Some(Output::Stderr(text)) => eprintln!("{}", text),
        None => {}
    })
}
