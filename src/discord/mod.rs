//! Discord webhook integration.
//!
//! This module provides the notification channel for the bot: building a
//! webhook message out of an alert and executing/deleting it through a
//! Discord webhook.
//!
//! # Modules
//!
//! - `embed` - Webhook message and embed presentation for an alert
//! - `webhook` - HTTP client executing and deleting webhook messages

use thiserror::Error;

pub mod embed;
mod webhook;

pub use crate::discord::embed::WebhookMessage;
pub use crate::discord::webhook::{Channel, WebhookClient};
#[cfg(test)]
pub use crate::discord::webhook::MockChannel;

/// Errors from the Discord webhook channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The targeted webhook message no longer exists.
    ///
    /// Deleting an already-deleted message reports this; callers treat it
    /// as success since the channel already matches intent.
    #[error("webhook message no longer exists")]
    NotFound,
    /// Any other transport or HTTP failure. Transient; the operation is
    /// retried on a later cycle by resubmission.
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
