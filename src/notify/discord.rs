//! Discord direct message delivery over the REST API.
//!
//! Each send opens a bot session, resolves the DM channel with the target
//! user, posts a single message and releases the session when it goes out of
//! scope, whatever the outcome.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Notifier;
use crate::WeatherAlertError;
use crate::config::DiscordConfig;

/// Discord rejects messages longer than this many characters
const MAX_MESSAGE_CHARS: usize = 2000;

pub struct DiscordNotifier {
    token: String,
    user_id: u64,
    api_base_url: String,
    /// Base client; sessions reuse its connection pool and timeout
    client: Client,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig, client: Client) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WeatherAlertError::config("Missing notifications.discord.token"))?;
        let user_id = config
            .user_id
            .ok_or_else(|| WeatherAlertError::config("Missing notifications.discord.user_id"))?;

        Ok(Self {
            token,
            user_id,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn open_session(&self) -> Result<BotSession<'_>> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", self.token))
            .context("Discord token contains invalid characters")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        debug!("Opened Discord bot session");
        Ok(BotSession {
            client: &self.client,
            headers,
            api_base_url: &self.api_base_url,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        "Discord"
    }

    async fn send(&self, alert: &str) -> Result<()> {
        let session = self.open_session()?;
        let channel_id = session.open_direct_message(self.user_id).await?;
        session.post_message(&channel_id, &truncate(alert)).await?;
        drop(session);

        info!("Sent weather alert to Discord user {}", self.user_id);
        Ok(())
    }
}

/// Authenticated view of the API, valid for a single send
struct BotSession<'a> {
    client: &'a Client,
    headers: HeaderMap,
    api_base_url: &'a str,
}

#[derive(Serialize)]
struct CreateDm {
    recipient_id: String,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct DiscordError {
    message: Option<String>,
}

impl BotSession<'_> {
    async fn open_direct_message(&self, user_id: u64) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/users/@me/channels", self.api_base_url))
            .headers(self.headers.clone())
            .json(&CreateDm {
                recipient_id: user_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| WeatherAlertError::notification("Discord", e.to_string()))?;

        let channel: Channel = check(response, "open DM channel")
            .await?
            .json()
            .await
            .with_context(|| "Failed to parse Discord channel response")?;
        Ok(channel.id)
    }

    async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_base_url, channel_id))
            .headers(self.headers.clone())
            .json(&CreateMessage { content })
            .send()
            .await
            .map_err(|e| WeatherAlertError::notification("Discord", e.to_string()))?;

        check(response, "send message").await?;
        Ok(())
    }
}

impl Drop for BotSession<'_> {
    fn drop(&mut self) {
        debug!("Closed Discord bot session");
    }
}

async fn check(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<DiscordError>()
        .await
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_default();
    Err(WeatherAlertError::notification(
        "Discord",
        format!("could not {action}: HTTP {status} {detail}"),
    )
    .into())
}

fn truncate(alert: &str) -> String {
    if alert.chars().count() <= MAX_MESSAGE_CHARS {
        return alert.to_string();
    }
    let mut cut: String = alert.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    cut.push('…');
    cut
}
