// src/models/message.rs

//! Chat platform entities seen by the synchronizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A message as listed from a channel's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    /// Number of embeds attached to the message
    pub embed_count: usize,
}

impl ChatMessage {
    /// Reference to this message for later edits.
    pub fn to_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id.clone(),
            message_id: self.id.clone(),
        }
    }
}

/// Handle to the tracked message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}
