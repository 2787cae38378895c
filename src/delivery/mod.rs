//! Outbound delivery of rendered messages.
//!
//! The dispatcher only knows the [`DeliveryGateway`] trait; the production
//! implementation talks to the Telegram Bot API.

mod telegram;

use async_trait::async_trait;
use thiserror::Error;

use crate::hosts::ChatId;

pub use telegram::TelegramGateway;

/// Delivery-specific error type
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram API returned {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}

/// Sends text to a single destination chat.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Deliver `text` to `chat_id`. One call is one attempt; no retries.
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;

    /// Deliver `text` verbatim, without any markup parsing.
    ///
    /// Used for operational notices whose text embeds untrusted names.
    async fn deliver_plain(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.deliver(chat_id, text).await
    }
}
