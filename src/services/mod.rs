//! Service layer for the member tracker.
//!
//! This module contains the business logic for:
//! - Page retrieval and selection (`PageSource`, `Document`)
//! - Count extraction (`extract_aggregate`, `extract_segments`)
//! - Tracked message synchronization (`MessageSynchronizer`)

pub mod extract;
pub mod fetcher;
pub mod synchronizer;

pub use extract::{extract_aggregate, extract_segments};
pub use fetcher::{Document, HttpPageSource, PageSource, ScrapedElement};
pub use synchronizer::{MessageSynchronizer, render};
