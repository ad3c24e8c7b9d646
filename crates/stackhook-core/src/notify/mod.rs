//! Outbound notification seam.
//!
//! Notifications are best effort: the gateway logs failures and carries on.
use async_trait::async_trait;

use crate::error::NotifyError;

/// Button attached to a message that opens `url` when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineLink {
    pub label: String,
    pub url: String,
}

impl InlineLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Messaging channel used to reach the human approving deploys.
///
/// `text` is already rendered in the channel's markup (see [`crate::message`]).
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send_message(&self, text: &str, link: Option<&InlineLink>) -> Result<(), NotifyError>;
}
