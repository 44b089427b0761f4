// src/models/mod.rs

//! Domain models for the member tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod embed;
mod message;
mod state;

// Re-export all public types
pub use config::{Config, DiscordConfig, HttpConfig, LoggingConfig};
pub use embed::{Embed, EmbedField, EmbedTemplate};
pub use message::{Channel, ChatMessage, MessageRef};
pub use state::{PollState, SchedulerPhase};
