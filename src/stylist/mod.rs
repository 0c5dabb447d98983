// src/stylist/mod.rs — Conversational AI stylist

pub mod context;
pub mod host;
pub mod input;
pub mod message;
pub mod session;

pub use host::StylistHost;
pub use input::{ImageAttachment, PendingInput, IMAGE_ONLY_PROMPT};
pub use message::{AttachedImage, Message, MessageId, Role, Transcript};
pub use session::{
    LifecycleState, SessionEvent, SessionFailure, SessionObserver, SessionSettings, StylistSession,
};
