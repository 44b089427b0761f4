// src/services/synchronizer.rs

//! Message synchronizer.
//!
//! Owns the protocol that keeps exactly one tracked message per channel:
//! on startup the most recent embed message authored by the bot (within the
//! last [`RECENT_MESSAGE_WINDOW`] messages) is reused, otherwise a new one is
//! sent. Afterwards the message is only ever edited.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::chat::ChatClient;
use crate::error::Result;
use crate::models::{ChatMessage, Embed, EmbedField, EmbedTemplate, MessageRef, PollState};

/// Number of recent channel messages scanned for a tracked message.
pub const RECENT_MESSAGE_WINDOW: u8 = 10;

/// Description placeholder shown before the first successful fetch.
pub const UPDATING_SENTINEL: &str = "Updating...";

const DEFAULT_TITLE: &str = "Member Count";
const DEFAULT_COLOR: u32 = 0x5865F2;

/// Build the embed for the given state.
///
/// Pure: the same state, template, source URL and `now` always produce the
/// same embed.
pub fn render(
    state: &PollState,
    template: Option<&EmbedTemplate>,
    source_url: &str,
    now: DateTime<Utc>,
) -> Embed {
    let count = state
        .cached_count
        .map(|count| count.to_string())
        .unwrap_or_else(|| UPDATING_SENTINEL.to_string());

    let fields = state
        .worlds_count
        .iter()
        .enumerate()
        .map(|(i, count)| EmbedField::new(format!("World {}", i + 1), count.to_string(), true))
        .collect();

    let mut embed = Embed {
        title: Some(DEFAULT_TITLE.to_string()),
        description: Some(format!("Current member count: **{count}**")),
        url: Some(source_url.to_string()),
        color: Some(DEFAULT_COLOR),
        timestamp: Some(now),
        fields,
    };

    if let Some(template) = template {
        template.apply_to(&mut embed);
    }
    embed
}

/// Pick the tracked message among recent channel messages.
///
/// Only messages authored by `self_id` that carry an embed qualify; the
/// newest one wins.
pub fn select_tracked<'a>(messages: &'a [ChatMessage], self_id: &str) -> Option<&'a ChatMessage> {
    messages
        .iter()
        .filter(|m| m.author_id == self_id && m.embed_count > 0)
        .max_by_key(|m| m.created_at)
}

/// Locates, renders and edits the tracked message.
pub struct MessageSynchronizer {
    chat: Arc<dyn ChatClient>,
    template: Option<EmbedTemplate>,
    source_url: String,
}

impl MessageSynchronizer {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        template: Option<EmbedTemplate>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            template,
            source_url: source_url.into(),
        }
    }

    /// Find the tracked message in `channel_id` or send a fresh one.
    pub async fn acquire(&self, channel_id: &str, state: &PollState) -> Result<MessageRef> {
        let channel = self.chat.fetch_channel(channel_id).await?;
        let recent = self
            .chat
            .list_recent_messages(&channel, RECENT_MESSAGE_WINDOW)
            .await?;

        if let Some(existing) = select_tracked(&recent, self.chat.self_user_id()) {
            log::info!(
                "Reusing tracked message {} in channel {}",
                existing.id,
                channel.id
            );
            return Ok(existing.to_ref());
        }

        let embed = self.render(state, Utc::now());
        let sent = self.chat.send_message(&channel, &embed).await?;
        log::info!(
            "No tracked message found; sent message {} to channel {}",
            sent.message_id,
            channel.id
        );
        Ok(sent)
    }

    /// Build the embed for `state` at time `now`.
    pub fn render(&self, state: &PollState, now: DateTime<Utc>) -> Embed {
        render(state, self.template.as_ref(), &self.source_url, now)
    }

    /// Edit the tracked message to show `embed`.
    pub async fn push(&self, message: &MessageRef, embed: &Embed) -> Result<()> {
        self.chat.edit_message(message, embed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::testing::{BOT_ID, CHANNEL_ID, FakeChat, at, message};

    const SOURCE: &str = "https://example.com/status";

    fn state(count: Option<i64>, worlds: &[i64]) -> PollState {
        PollState {
            cached_count: count,
            worlds_count: worlds.to_vec(),
            running: true,
        }
    }

    #[test]
    fn test_render_empty_cache_shows_sentinel() {
        let embed = render(&PollState::new(), None, SOURCE, at(0));
        assert_eq!(
            embed.description.as_deref(),
            Some("Current member count: **Updating...**")
        );
        assert_eq!(embed.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(embed.url.as_deref(), Some(SOURCE));
        assert_eq!(embed.color, Some(DEFAULT_COLOR));
        assert_eq!(embed.timestamp, Some(at(0)));
        assert!(embed.fields.is_empty());
    }

    #[test]
    fn test_render_count_and_world_fields() {
        let embed = render(&state(Some(42), &[10, 32]), None, SOURCE, at(0));
        assert_eq!(
            embed.description.as_deref(),
            Some("Current member count: **42**")
        );
        assert_eq!(
            embed.fields,
            vec![
                EmbedField::new("World 1", "10", true),
                EmbedField::new("World 2", "32", true),
            ]
        );
    }

    #[test]
    fn test_render_is_deterministic_apart_from_timestamp() {
        let s = state(Some(7), &[3, 4]);
        let mut first = render(&s, None, SOURCE, at(0));
        let mut second = render(&s, None, SOURCE, at(90));
        assert_ne!(first.timestamp, second.timestamp);

        first.timestamp = None;
        second.timestamp = None;
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_template_merge() {
        let template = EmbedTemplate {
            title: Some("X".into()),
            url: Some("https://override.example/".into()),
            description: Some("custom".into()),
            fields: vec![EmbedField::new("f", "v", false)],
            ..EmbedTemplate::default()
        };
        let embed = render(&state(Some(5), &[2, 3]), Some(&template), SOURCE, at(0));

        assert_eq!(embed.title.as_deref(), Some("X"));
        assert_eq!(embed.url.as_deref(), Some("https://override.example/"));
        assert_eq!(embed.description.as_deref(), Some("custom"));
        assert_eq!(
            embed.fields,
            vec![
                EmbedField::new("World 1", "2", true),
                EmbedField::new("World 2", "3", true),
                EmbedField::new("f", "v", false),
            ]
        );
        assert_eq!(embed.color, Some(DEFAULT_COLOR));
    }

    #[test]
    fn test_select_tracked_ignores_foreign_and_plain_messages() {
        let messages = vec![
            message("1", "someone", 50, 1),
            message("2", BOT_ID, 40, 0),
            message("3", BOT_ID, 10, 1),
        ];
        assert_eq!(select_tracked(&messages, BOT_ID).unwrap().id, "3");
        assert!(select_tracked(&messages[..2], BOT_ID).is_none());
    }

    #[tokio::test]
    async fn test_acquire_reuses_newest_bot_embed() {
        let mut history: Vec<_> = (0..7)
            .map(|i| message(&format!("u{i}"), "user", 100 + i, 1))
            .collect();
        history.push(message("old", BOT_ID, 5, 1));
        history.push(message("newest", BOT_ID, 30, 1));
        history.push(message("mid", BOT_ID, 20, 1));
        assert_eq!(history.len(), 10);

        let chat = Arc::new(FakeChat::new(history));
        let sync = MessageSynchronizer::new(chat.clone(), None, SOURCE);
        let tracked = sync.acquire(CHANNEL_ID, &PollState::new()).await.unwrap();

        assert_eq!(tracked.message_id, "newest");
        assert_eq!(tracked.channel_id, CHANNEL_ID);
        assert_eq!(chat.sent_count(), 0);
        assert_eq!(*chat.list_limits.lock().unwrap(), vec![RECENT_MESSAGE_WINDOW]);
    }

    #[tokio::test]
    async fn test_acquire_sends_when_nothing_matches() {
        let history = vec![message("1", "user", 1, 1), message("2", BOT_ID, 2, 0)];
        let chat = Arc::new(FakeChat::new(history));
        let sync = MessageSynchronizer::new(chat.clone(), None, SOURCE);

        let tracked = sync.acquire(CHANNEL_ID, &PollState::new()).await.unwrap();
        assert_eq!(tracked.message_id, "sent-1");
        assert_eq!(chat.sent_count(), 1);

        let sent = chat.sent.lock().unwrap()[0].clone();
        assert_eq!(
            sent.description.as_deref(),
            Some("Current member count: **Updating...**")
        );
    }

    #[tokio::test]
    async fn test_acquire_unknown_channel_is_delivery_error() {
        let chat = Arc::new(FakeChat::new(Vec::new()));
        let sync = MessageSynchronizer::new(chat, None, SOURCE);
        let result = sync.acquire("999", &PollState::new()).await;
        assert!(matches!(result, Err(AppError::Delivery { .. })));
    }

    #[tokio::test]
    async fn test_push_edits_tracked_message() {
        let chat = Arc::new(FakeChat::new(Vec::new()));
        let sync = MessageSynchronizer::new(chat.clone(), None, SOURCE);
        let tracked = MessageRef {
            channel_id: CHANNEL_ID.into(),
            message_id: "m".into(),
        };
        let embed = sync.render(&state(Some(1), &[]), at(0));

        sync.push(&tracked, &embed).await.unwrap();
        assert_eq!(chat.last_edit(), Some((tracked, embed)));
    }
}
