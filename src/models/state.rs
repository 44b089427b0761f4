// src/models/state.rs

//! Poll loop state.

/// Cached values owned by the poll scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Last validated aggregate count, absent before the first cycle
    pub cached_count: Option<i64>,

    /// Per-world counts from the latest successful fetch
    pub worlds_count: Vec<i64>,

    /// Whether the loop may schedule another cycle
    pub running: bool,
}

impl PollState {
    /// Fresh state for a loop that has not polled yet.
    pub fn new() -> Self {
        Self {
            cached_count: None,
            worlds_count: Vec::new(),
            running: true,
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of the poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Constructed, tracked message not yet acquired
    Idle,
    /// One cycle in flight
    Polling,
    /// Waiting for the next interval tick
    Scheduled,
    /// Terminal; no further cycles will run
    Stopped,
}
