// src/chat/discord.rs

//! Discord REST implementation of [`ChatClient`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::chat::ChatClient;
use crate::error::{AppError, Result};
use crate::models::{Channel, ChatMessage, DiscordConfig, Embed, HttpConfig, MessageRef};
use crate::utils::http;

/// Longest response body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    channel_id: String,
    author: WireUser,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    embeds: Vec<serde_json::Value>,
}

impl From<WireMessage> for ChatMessage {
    fn from(message: WireMessage) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            author_id: message.author.id,
            created_at: message.timestamp,
            embed_count: message.embeds.len(),
        }
    }
}

/// Bot client for the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    token: String,
    self_user_id: String,
}

impl DiscordClient {
    /// Authenticate with `token` and resolve the bot's own user id.
    pub async fn connect(
        discord: &DiscordConfig,
        http_config: &HttpConfig,
        token: impl Into<String>,
    ) -> Result<Self> {
        let client = http::create_async_client(http_config)?;
        let mut this = Self {
            client,
            api_base: discord.api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            self_user_id: String::new(),
        };

        let me: WireUser = this
            .send_json("fetch identity", this.request(Method::GET, "/users/@me"))
            .await?;
        log::info!("Authenticated with Discord as user {}", me.id);
        this.self_user_id = me.id;
        Ok(this)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::delivery(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        Err(AppError::delivery(
            operation,
            format!("status {status}: {excerpt}"),
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::delivery(operation, format!("invalid response: {e}")))
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    fn self_user_id(&self) -> &str {
        &self.self_user_id
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel> {
        let path = format!("/channels/{channel_id}");
        self.send_json("fetch channel", self.request(Method::GET, &path))
            .await
    }

    async fn list_recent_messages(&self, channel: &Channel, limit: u8) -> Result<Vec<ChatMessage>> {
        let path = format!("/channels/{}/messages", channel.id);
        let request = self
            .request(Method::GET, &path)
            .query(&[("limit", limit)]);
        let messages: Vec<WireMessage> = self.send_json("list messages", request).await?;
        Ok(messages.into_iter().map(ChatMessage::from).collect())
    }

    async fn send_message(&self, channel: &Channel, embed: &Embed) -> Result<MessageRef> {
        let path = format!("/channels/{}/messages", channel.id);
        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "embeds": [embed] }));
        let message: WireMessage = self.send_json("send message", request).await?;
        Ok(ChatMessage::from(message).to_ref())
    }

    async fn edit_message(&self, message: &MessageRef, embed: &Embed) -> Result<()> {
        let path = format!(
            "/channels/{}/messages/{}",
            message.channel_id, message.message_id
        );
        let request = self
            .request(Method::PATCH, &path)
            .json(&json!({ "embeds": [embed] }));
        self.send("edit message", request).await?;
        Ok(())
    }
}
