// src/error.rs

//! Unified error handling for the member tracker.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network or transport failure while fetching the source page
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// HTML or numeric parse failure
    #[error("Parse error: {message} (raw text: {raw:?})")]
    Parse {
        raw: String,
        position: Option<usize>,
        message: String,
    },

    /// The chat platform rejected a request
    #[error("Delivery error during {operation}: {message}")]
    Delivery { operation: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AppError {
    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error carrying the offending raw text.
    pub fn parse(raw: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            raw: raw.into(),
            position: None,
            message: message.to_string(),
        }
    }

    /// Create a parse error for the entry at `position` of a list.
    pub fn parse_at(raw: impl Into<String>, position: usize, message: impl fmt::Display) -> Self {
        Self::Parse {
            raw: raw.into(),
            position: Some(position),
            message: message.to_string(),
        }
    }

    /// Create a delivery error for a chat platform operation.
    pub fn delivery(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::Delivery { .. } => "delivery",
            Self::Config(_) => "config",
            Self::Selector { .. } => "selector",
            Self::Io(_) => "io",
            Self::Toml(_) => "toml",
        }
    }
}
