//! HTTP notification channels
//!
//! Each channel turns a [`PromotionMessage`] into one API call. Formatting is
//! minimal; payload shapes follow each provider's public API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::ChannelEndpoints;
use crate::core::message::PromotionMessage;
use crate::error::ChannelError;
use crate::traits::{ChannelFactory, ChannelReceipt, NotificationChannel};
use shared::{process_debug, ChannelCredentials, Platform, ProcessId};

fn transport(platform: Platform, e: reqwest::Error) -> ChannelError {
    ChannelError::Transport {
        platform,
        message: e.to_string(),
    }
}

/// Turn a non-2xx response into an error carrying the status and body
async fn check_status(platform: Platform, response: Response) -> Result<(u16, Response), ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok((status.as_u16(), response));
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChannelError::HttpStatus {
        platform,
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

/// Telegram and Slack answer 200 with `ok: false` on logical failures
fn check_ok_flag(platform: Platform, body: &Value, error_field: &str) -> Result<(), ChannelError> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = body
        .get(error_field)
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Err(ChannelError::Rejected { platform, message })
}

fn id_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Discord incoming webhook
pub struct DiscordChannel {
    client: Client,
    webhook_url: String,
}

impl DiscordChannel {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    async fn send(&self, message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError> {
        let mut embed = json!({ "description": message.text });
        if let Some(link) = &message.link {
            embed["url"] = json!(link);
            embed["title"] = json!("View deal");
        }
        if let Some(image) = &message.image_url {
            embed["image"] = json!({ "url": image });
        }
        let payload = json!({ "content": message.text, "embeds": [embed] });

        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("wait", "true")])
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport(Platform::Discord, e))?;

        let (status, response) = check_status(Platform::Discord, response).await?;
        // 204 carries no body; with wait=true Discord returns the created message
        let body: Value = response.json().await.unwrap_or(Value::Null);

        Ok(ChannelReceipt {
            platform: Platform::Discord,
            http_status: status,
            post_id: id_to_string(body.get("id")),
        })
    }
}

/// Telegram bot posting to one chat
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramChannel {
    pub fn new(client: Client, api_base: impl Into<String>, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base.trim_end_matches('/'), self.bot_token, method)
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    async fn send(&self, message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError> {
        let text = match &message.link {
            Some(link) => format!("{}\n{}", message.text, link),
            None => message.text.clone(),
        };

        let (url, payload) = match &message.image_url {
            Some(image) => (
                self.method_url("sendPhoto"),
                json!({ "chat_id": self.chat_id, "photo": image, "caption": text }),
            ),
            None => (
                self.method_url("sendMessage"),
                json!({ "chat_id": self.chat_id, "text": text }),
            ),
        };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport(Platform::Telegram, e))?;

        let (status, response) = check_status(Platform::Telegram, response).await?;
        let body: Value = response.json().await.map_err(|e| transport(Platform::Telegram, e))?;
        check_ok_flag(Platform::Telegram, &body, "description")?;

        Ok(ChannelReceipt {
            platform: Platform::Telegram,
            http_status: status,
            post_id: id_to_string(body.get("result").and_then(|r| r.get("message_id"))),
        })
    }
}

/// Slack bot posting with `chat.postMessage`
pub struct SlackChannel {
    client: Client,
    api_base: String,
    bot_token: String,
    channel: String,
}

impl SlackChannel {
    pub fn new(client: Client, api_base: impl Into<String>, bot_token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn platform(&self) -> Platform {
        Platform::Slack
    }

    async fn send(&self, message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError> {
        let text = match &message.link {
            Some(link) => format!("{} <{}|View deal>", message.text, link),
            None => message.text.clone(),
        };
        let mut payload = json!({ "channel": self.channel, "text": text, "unfurl_links": false });
        if let Some(image) = &message.image_url {
            payload["attachments"] = json!([{ "image_url": image, "fallback": message.text }]);
        }

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.bot_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport(Platform::Slack, e))?;

        let (status, response) = check_status(Platform::Slack, response).await?;
        let body: Value = response.json().await.map_err(|e| transport(Platform::Slack, e))?;
        check_ok_flag(Platform::Slack, &body, "error")?;

        Ok(ChannelReceipt {
            platform: Platform::Slack,
            http_status: status,
            post_id: id_to_string(body.get("ts")),
        })
    }
}

/// Email through a JSON HTTP mail relay
pub struct EmailChannel {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    recipient: String,
}

impl EmailChannel {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
            from: from.into(),
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn platform(&self) -> Platform {
        Platform::Email
    }

    async fn send(&self, message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError> {
        let mut body_text = message.text.clone();
        if let Some(link) = &message.link {
            body_text.push_str(&format!("\n\n{link}"));
        }
        let payload = json!({
            "from": self.from,
            "to": self.recipient,
            "subject": message.text,
            "text": body_text,
            "imageUrl": message.image_url,
        });

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        let response = request.send().await.map_err(|e| transport(Platform::Email, e))?;

        let (status, response) = check_status(Platform::Email, response).await?;
        let body: Value = response.json().await.unwrap_or(Value::Null);

        Ok(ChannelReceipt {
            platform: Platform::Email,
            http_status: status,
            post_id: id_to_string(body.get("id")),
        })
    }
}

/// Builds HTTP channels from user credentials, sharing one client
pub struct RealChannelFactory {
    client: Client,
    endpoints: ChannelEndpoints,
}

impl RealChannelFactory {
    pub fn new(endpoints: ChannelEndpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(client: Client, endpoints: ChannelEndpoints) -> Self {
        Self { client, endpoints }
    }
}

impl ChannelFactory for RealChannelFactory {
    fn channels_for(&self, credentials: &ChannelCredentials) -> Vec<Arc<dyn NotificationChannel>> {
        let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

        for platform in credentials.configured_platforms() {
            match platform {
                Platform::Discord => {
                    if let Some(url) = &credentials.discord_webhook_url {
                        channels.push(Arc::new(DiscordChannel::new(self.client.clone(), url.clone())));
                    }
                }
                Platform::Telegram => {
                    if let (Some(token), Some(chat)) = (&credentials.telegram_bot_token, &credentials.telegram_chat_id) {
                        channels.push(Arc::new(TelegramChannel::new(
                            self.client.clone(),
                            self.endpoints.telegram_api_base.clone(),
                            token.clone(),
                            chat.clone(),
                        )));
                    }
                }
                Platform::Slack => {
                    if let (Some(token), Some(channel)) = (&credentials.slack_bot_token, &credentials.slack_channel) {
                        channels.push(Arc::new(SlackChannel::new(
                            self.client.clone(),
                            self.endpoints.slack_api_base.clone(),
                            token.clone(),
                            channel.clone(),
                        )));
                    }
                }
                Platform::Email => match (&self.endpoints.email_api_url, &credentials.email_recipient) {
                    (Some(api_url), Some(recipient)) => {
                        channels.push(Arc::new(EmailChannel::new(
                            self.client.clone(),
                            api_url.clone(),
                            self.endpoints.email_api_key.clone(),
                            self.endpoints.email_from.clone(),
                            recipient.clone(),
                        )));
                    }
                    _ => {
                        process_debug!(ProcessId::current(), "Email relay not configured, skipping email channel");
                    }
                },
            }
        }

        channels
    }
}
