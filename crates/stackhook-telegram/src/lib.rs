//! Telegram Bot API backend for `stackhook_core::Notifier`.
use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stackhook_core::{InlineLink, Notifier, NotifyError};
use tracing::{debug, instrument};

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Markup dialect all message texts are rendered in.
const PARSE_MODE: &str = "MarkdownV2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends messages to one chat through a bot.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Point at a different Bot API server (self-hosted or test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

// The bot token grants full control of the bot.
impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboard<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

fn request_body<'a>(chat_id: &'a str, text: &'a str, link: Option<&'a InlineLink>) -> SendMessage<'a> {
    SendMessage {
        chat_id,
        text,
        parse_mode: PARSE_MODE,
        reply_markup: link.map(|l| InlineKeyboard {
            inline_keyboard: vec![vec![InlineButton {
                text: &l.label,
                url: &l.url,
            }]],
        }),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(level = "debug", skip_all, fields(chat = %self.chat_id, with_link = link.is_some()))]
    async fn send_message(&self, text: &str, link: Option<&InlineLink>) -> Result<(), NotifyError> {
        let body = request_body(&self.chat_id, text, link);

        // reqwest errors may embed the URL, which contains the bot token.
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let parsed = response.json::<ApiResponse>().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("message sent");
                Ok(())
            }
            other => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_without_link_has_no_markup() {
        let json = serde_json::to_value(request_body("42", "hi\\.", None)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": "42",
                "text": "hi\\.",
                "parse_mode": "MarkdownV2",
            })
        );
    }

    #[test]
    fn body_with_link_has_single_button() {
        let link = InlineLink::new("Deploy", "https://d.example/deploy/t/abc123");
        let json = serde_json::to_value(request_body("42", "x", Some(&link))).unwrap();

        assert_eq!(
            json["reply_markup"],
            serde_json::json!({
                "inline_keyboard": [[{"text": "Deploy", "url": "https://d.example/deploy/t/abc123"}]]
            })
        );
    }

    #[test]
    fn endpoint_embeds_token_but_debug_does_not() {
        let n = TelegramNotifier::new("123:secret", "42").with_api_base("http://localhost:8081/");

        assert_eq!(n.endpoint(), "http://localhost:8081/bot123:secret/sendMessage");
        assert!(!format!("{n:?}").contains("secret"));
    }
}
