//! Chat platform abstraction.
//!
//! The synchronizer only talks to the platform through [`ChatClient`], so
//! the Discord REST client and the in-memory test doubles are
//! interchangeable.

pub mod discord;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Channel, ChatMessage, Embed, MessageRef};

pub use discord::DiscordClient;

/// Operations the tracker needs from a chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Id of the identity this client acts as.
    fn self_user_id(&self) -> &str;

    /// Resolve a channel by id.
    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel>;

    /// Most recent messages of a channel, newest first.
    async fn list_recent_messages(&self, channel: &Channel, limit: u8) -> Result<Vec<ChatMessage>>;

    /// Post a new message carrying `embed`.
    async fn send_message(&self, channel: &Channel, embed: &Embed) -> Result<MessageRef>;

    /// Replace the embed of an existing message.
    async fn edit_message(&self, message: &MessageRef, embed: &Embed) -> Result<()>;
}
