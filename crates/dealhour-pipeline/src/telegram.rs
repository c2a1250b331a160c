//! Telegram Bot API client for posting deals to a channel.
//!
//! Deals go out as `sendPhoto` with an HTML caption and a single inline buy
//! button. When Telegram rejects the photo itself, the same caption is
//! retried once as a text-only `sendMessage`.

use std::time::Duration;

use dealhour_core::AppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const FALLBACK_IMAGE_URL: &str = "https://ir.ebaystatic.com/cr/v/c1/ebay-logo-1-1200x630-margin.png";
const FALLBACK_LINK: &str = "https://www.ebay.com";
const BUY_BUTTON_TEXT: &str = "🛒 Buy securely";
/// Telegram rejects photo captions longer than this.
const MAX_CAPTION_CHARS: usize = 1024;

pub struct TelegramChannel {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: [[InlineButton<'a>; 1]; 1],
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'static str,
    reply_markup: ReplyMarkup<'a>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    reply_markup: ReplyMarkup<'a>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramChannel {
    /// Creates a channel client from `TELEGRAM_TOKEN`, `CHANNEL_ID` and
    /// `TELEGRAM_API_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::CredentialsMissing`] if the token or channel
    /// id is unset, or [`ChannelError::Http`] if the `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ChannelError> {
        let (Some(token), Some(chat_id)) = (
            config.telegram_token.as_deref(),
            config.telegram_channel_id.as_deref(),
        ) else {
            return Err(ChannelError::CredentialsMissing);
        };
        Self::with_base_url(
            token,
            chat_id,
            config.request_timeout_secs,
            &config.telegram_api_base_url,
        )
    }

    /// Creates a client pointed at the production Bot API.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, chat_id: &str, timeout_secs: u64) -> Result<Self, ChannelError> {
        Self::with_base_url(token, chat_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        token: &str,
        chat_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dealhour/0.1 (channel-publisher)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Posts one deal and returns the Telegram message id.
    ///
    /// A missing image uses the eBay logo; a link that is not `http(s)` is
    /// replaced by the eBay homepage. Captions too long for a photo are sent
    /// as a text message directly.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Rejected`] if Telegram refuses the message,
    /// [`ChannelError::Http`] on network failure, or
    /// [`ChannelError::Deserialize`] if the reply is not a Bot API envelope.
    pub async fn send_deal(
        &self,
        caption: &str,
        image_url: Option<&str>,
        link: &str,
    ) -> Result<i64, ChannelError> {
        let link = if link.starts_with("http://") || link.starts_with("https://") {
            link
        } else {
            tracing::warn!(link, "invalid buy link; using eBay homepage");
            FALLBACK_LINK
        };
        let photo = image_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(FALLBACK_IMAGE_URL);

        if caption.chars().count() > MAX_CAPTION_CHARS {
            tracing::info!("caption exceeds photo limit; sending as text");
            return self.send_text(caption, link).await;
        }

        let body = SendPhoto {
            chat_id: &self.chat_id,
            photo,
            caption,
            parse_mode: "HTML",
            reply_markup: buy_button(link),
        };
        match self.call("sendPhoto", &body).await {
            Err(ChannelError::Rejected {
                status,
                description,
            }) if mentions_image(&description) => {
                tracing::warn!(
                    status,
                    description = %description,
                    "photo rejected; retrying as text message"
                );
                self.send_text(caption, link).await
            }
            other => other,
        }
    }

    async fn send_text(&self, text: &str, link: &str) -> Result<i64, ChannelError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            reply_markup: buy_button(link),
        };
        self.call("sendMessage", &body).await
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<i64, ChannelError> {
        let url = format!("{}/bot{}/{method}", self.base_url, self.token);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ChannelError::Rejected {
                    status: status.as_u16(),
                    description: text.chars().take(200).collect(),
                });
            }
            Err(source) => {
                return Err(ChannelError::Deserialize {
                    context: method.to_string(),
                    source,
                });
            }
        };
        let status = status.as_u16();

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(sent),
                ..
            } => Ok(sent.message_id),
            ApiResponse { description, .. } => Err(ChannelError::Rejected {
                status,
                description: description.unwrap_or_else(|| format!("{method} failed")),
            }),
        }
    }
}

fn buy_button(link: &str) -> ReplyMarkup<'_> {
    ReplyMarkup {
        inline_keyboard: [[InlineButton {
            text: BUY_BUTTON_TEXT,
            url: link,
        }]],
    }
}

fn mentions_image(description: &str) -> bool {
    let lower = description.to_lowercase();
    lower.contains("image") || lower.contains("photo")
}
