// src/stylist/input.rs — Pending input: free text plus at most one image attachment

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::path::Path;

use super::message::AttachedImage;
use crate::infra::errors::LumiereError;
use crate::provider::{MessageParts, Part};

/// Sent in place of user text when only an image is attached.
pub const IMAGE_ONLY_PROMPT: &str = "Please analyze this image. If it's a clothing item, \
suggest matching products from your collection or how to style it. \
If it's a vibe/aesthetic, suggest an outfit.";

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

fn require_image(mime_type: &str) -> Result<(), LumiereError> {
    if is_image_mime(mime_type) {
        Ok(())
    } else {
        Err(LumiereError::InvalidAttachment {
            mime_type: mime_type.to_string(),
        })
    }
}

/// A validated image: the displayable data URI and its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    display: String,
    mime_type: String,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, LumiereError> {
        require_image(mime_type)?;
        let data = BASE64_STANDARD.encode(bytes);
        Ok(Self {
            display: format!("data:{};base64,{}", mime_type, data),
            mime_type: mime_type.to_string(),
        })
    }

    /// Reads an image file. The MIME type is guessed from the extension and
    /// checked before the file is touched.
    pub fn from_path(path: &Path) -> Result<Self, LumiereError> {
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        require_image(&mime_type)?;
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, &mime_type)
    }

    pub fn display_payload(&self) -> &str {
        &self.display
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The encoded payload with any `data:...,` prefix removed.
    pub fn transmit_payload(&self) -> &str {
        match self.display.split_once(',') {
            Some((_, data)) if self.display.starts_with("data:") => data,
            _ => &self.display,
        }
    }

    pub fn to_part(&self) -> Part {
        Part::InlineImage {
            mime_type: self.mime_type.clone(),
            data: self.transmit_payload().to_string(),
        }
    }

    pub fn to_attached(&self) -> AttachedImage {
        AttachedImage {
            display: self.display.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Input committed to a send. Holds text, an image, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedInput {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl CommittedInput {
    fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Outbound parts: image first, then the user's text, or the image
    /// analysis instruction when there is no text.
    pub fn to_parts(&self) -> MessageParts {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &self.image {
            parts.push(image.to_part());
        }
        if self.has_text() {
            parts.push(Part::Text(self.text.clone()));
        } else {
            parts.push(Part::Text(IMAGE_ONLY_PROMPT.to_string()));
        }
        // at least one text part was pushed above
        MessageParts::new(parts).unwrap_or_else(|| MessageParts::text(IMAGE_ONLY_PROMPT))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingInput {
    text: String,
    attachment: Option<ImageAttachment>,
}

impl PendingInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn attachment(&self) -> Option<&ImageAttachment> {
        self.attachment.as_ref()
    }

    /// Replace the attachment slot.
    pub fn attach(&mut self, attachment: ImageAttachment) {
        self.attachment = Some(attachment);
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    pub fn is_sendable(&self) -> bool {
        !self.text.trim().is_empty() || self.attachment.is_some()
    }

    /// Take the input for a send, leaving the slot empty. `None` (and no
    /// change) when there is nothing to send.
    pub fn take(&mut self) -> Option<CommittedInput> {
        if !self.is_sendable() {
            return None;
        }
        Some(CommittedInput {
            text: std::mem::take(&mut self.text),
            image: self.attachment.take(),
        })
    }
}
