// src/testing.rs

//! In-memory test doubles for the page source and chat client.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::chat::ChatClient;
use crate::error::{AppError, Result};
use crate::models::{Channel, ChatMessage, Embed, MessageRef};
use crate::services::PageSource;

pub const BOT_ID: &str = "bot";
pub const CHANNEL_ID: &str = "100";

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn message(id: &str, author: &str, secs: i64, embed_count: usize) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        channel_id: CHANNEL_ID.to_string(),
        author_id: author.to_string(),
        created_at: at(secs),
        embed_count,
    }
}

/// Page source replaying queued responses; the last one repeats.
pub struct FakePages {
    responses: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn html(bodies: &[&str]) -> Self {
        Self::new(bodies.iter().map(|b| Ok(b.to_string())).collect())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.len() == 1 {
            if let Some(Ok(body)) = responses.front() {
                return Ok(body.clone());
            }
        }
        responses
            .pop_front()
            .unwrap_or_else(|| Err(AppError::fetch(url, "no response queued")))
    }
}

/// Chat client recording every send and edit.
pub struct FakeChat {
    pub history: Vec<ChatMessage>,
    pub sent: Mutex<Vec<Embed>>,
    pub edits: Mutex<Vec<(MessageRef, Embed)>>,
    pub list_limits: Mutex<Vec<u8>>,
    pub fail_edits: bool,
}

impl FakeChat {
    pub fn new(history: Vec<ChatMessage>) -> Self {
        Self {
            history,
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            list_limits: Mutex::new(Vec::new()),
            fail_edits: false,
        }
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }

    pub fn last_edit(&self) -> Option<(MessageRef, Embed)> {
        self.edits.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    fn self_user_id(&self) -> &str {
        BOT_ID
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel> {
        if channel_id != CHANNEL_ID {
            return Err(AppError::delivery("fetch channel", "unknown channel"));
        }
        Ok(Channel {
            id: channel_id.to_string(),
            name: Some("status".to_string()),
        })
    }

    async fn list_recent_messages(&self, _channel: &Channel, limit: u8) -> Result<Vec<ChatMessage>> {
        self.list_limits.lock().unwrap().push(limit);
        Ok(self.history.iter().take(limit as usize).cloned().collect())
    }

    async fn send_message(&self, channel: &Channel, embed: &Embed) -> Result<MessageRef> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(embed.clone());
        Ok(MessageRef {
            channel_id: channel.id.clone(),
            message_id: format!("sent-{}", sent.len()),
        })
    }

    async fn edit_message(&self, message: &MessageRef, embed: &Embed) -> Result<()> {
        if self.fail_edits {
            return Err(AppError::delivery("edit message", "status 404: Unknown Message"));
        }
        self.edits
            .lock()
            .unwrap()
            .push((message.clone(), embed.clone()));
        Ok(())
    }
}
