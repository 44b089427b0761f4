// src/models/embed.rs

//! Embed representation sent to the chat platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single name/value field of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

/// Rich embed, serialized in the Discord wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// User overrides for the generated embed.
///
/// `title`, `color`, `url` and `description` replace the generated value when
/// present. `fields` are appended after the generated fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbedTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl EmbedTemplate {
    /// Merge this template into a generated embed.
    pub fn apply_to(&self, embed: &mut Embed) {
        if let Some(title) = &self.title {
            embed.title = Some(title.clone());
        }
        if let Some(color) = self.color {
            embed.color = Some(color);
        }
        if let Some(url) = &self.url {
            embed.url = Some(url.clone());
        }
        if let Some(description) = &self.description {
            embed.description = Some(description.clone());
        }
        embed.fields.extend(self.fields.iter().cloned());
    }
}
