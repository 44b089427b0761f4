// src/services/extract.rs

//! Count extraction from scraped elements.

use crate::error::{AppError, Result};
use crate::services::fetcher::ScrapedElement;

/// Parse the aggregate count from an element's trimmed text.
pub fn extract_aggregate(element: &ScrapedElement) -> Result<i64> {
    parse_count(&element.text).map_err(|message| AppError::parse(element.text.trim(), message))
}

/// Parse one count per element from each element's first child.
///
/// Fails on the first invalid entry; no partial list is returned.
pub fn extract_segments(elements: &[ScrapedElement]) -> Result<Vec<i64>> {
    elements
        .iter()
        .enumerate()
        .map(|(position, element)| {
            let raw = element.first_child_text.as_deref().unwrap_or_default();
            parse_count(raw).map_err(|message| {
                AppError::parse_at(raw.trim(), position, format!("world {}: {message}", position + 1))
            })
        })
        .collect()
}

fn parse_count(raw: &str) -> std::result::Result<i64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("expected an integer, found empty text".to_string());
    }
    trimmed
        .parse::<i64>()
        .map_err(|e| format!("expected an integer: {e}"))
}
