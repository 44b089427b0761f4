//! Pipeline entry points for the tracker.
//!
//! - `PollScheduler`: acquire the tracked message and keep it in sync
//! - `fetch_counts`: one fetch + extraction, used by dry runs

pub mod poll;

pub use poll::{
    CycleOutcome, PollReport, PollScheduler, ScrapedCounts, StopHandle, StopReason, fetch_counts,
    scrape_counts,
};
