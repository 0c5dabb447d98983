// src/infra/errors.rs — Error types for Lumière

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumiereError {
    // Transport errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("No response within {seconds}s")]
    Timeout { seconds: u64 },

    // Local validation (never reaches the network)
    #[error("Please upload an image file (got '{mime_type}').")]
    InvalidAttachment { mime_type: String },

    #[error("A response is still in progress")]
    SessionBusy,

    #[error("Nothing to send")]
    EmptyInput,

    // User errors
    #[error("No API key found. Set GEMINI_API_KEY or GOOGLE_API_KEY.")]
    NoApiKey,

    #[error("Product {id} not found")]
    ProductNotFound { id: u32 },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LumiereError {
    /// Errors raised by the local send guards; these leave session state untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LumiereError::SessionBusy | LumiereError::EmptyInput
        )
    }

    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        LumiereError::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
