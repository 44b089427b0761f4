// src/pipeline/poll.rs

//! Poll scheduler.
//!
//! Drives the fetch → parse → diff → update cycle:
//!
//! ```text
//! Idle ──acquire──▶ Polling ──ok──▶ Scheduled ──tick──▶ Polling ...
//!                      │                 │
//!                      └──error──▶ Stopped ◀──stop──┘
//! ```
//!
//! Cycles never overlap: the next interval starts only after the current
//! cycle has fully resolved. Any error inside a cycle ends the loop; the
//! caller decides whether to exit or restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{Notify, watch};

use crate::chat::ChatClient;
use crate::error::{AppError, Result};
use crate::models::{Config, MessageRef, PollState, SchedulerPhase};
use crate::services::{
    Document, MessageSynchronizer, PageSource, extract_aggregate, extract_segments,
};

/// Counts read from one fetch of the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedCounts {
    pub total: i64,
    pub worlds: Vec<i64>,
}

/// Apply the configured selectors to a page body.
pub fn scrape_counts(
    body: &str,
    total_selector: &str,
    worlds_selector: Option<&str>,
) -> Result<ScrapedCounts> {
    let document = Document::parse(body)?;

    let total_element = document.select_one(total_selector)?.ok_or_else(|| {
        AppError::parse("", format!("selector '{total_selector}' matched no element"))
    })?;
    let total = extract_aggregate(&total_element)?;

    let worlds = match worlds_selector {
        Some(selector) => extract_segments(&document.select_all(selector)?)?,
        None => Vec::new(),
    };

    Ok(ScrapedCounts { total, worlds })
}

/// Fetch the configured page once and extract its counts.
pub async fn fetch_counts(pages: &dyn PageSource, config: &Config) -> Result<ScrapedCounts> {
    let body = pages.fetch_page(&config.url).await?;
    scrape_counts(&body, &config.total_count, config.worlds_count.as_deref())
}

/// Result of a single successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Aggregate count equal to the cached one; nothing pushed
    Unchanged { count: i64 },
    /// Aggregate count changed and the tracked message was edited
    Updated { previous: Option<i64>, current: i64 },
}

/// Why the loop ended.
#[derive(Debug)]
pub enum StopReason {
    /// A [`StopHandle`] asked the loop to stop
    Requested,
    /// A cycle failed; the error has already been logged
    CycleFailed(AppError),
}

/// Summary returned when the loop ends.
#[derive(Debug)]
pub struct PollReport {
    /// Last committed state
    pub state: PollState,
    /// Tracked message the loop was updating
    pub message: MessageRef,
    /// Cycles started, including a failed last one
    pub cycles: usize,
    /// Edits issued
    pub pushes: usize,
    pub stop: StopReason,
}

/// Observes a running scheduler and asks it to stop after the current cycle.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
    phase: watch::Receiver<SchedulerPhase>,
}

impl StopHandle {
    /// Prevent further cycles and wake a scheduler waiting for its tick.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Phase the scheduler is currently in.
    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase transition.
    pub fn phase_changes(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.clone()
    }
}

/// Owns the poll state and the tracked message for the process lifetime.
pub struct PollScheduler {
    config: Arc<Config>,
    pages: Arc<dyn PageSource>,
    sync: MessageSynchronizer,
    phase: watch::Sender<SchedulerPhase>,
    stop: StopHandle,
}

impl PollScheduler {
    pub fn new(
        config: Arc<Config>,
        pages: Arc<dyn PageSource>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        let sync = MessageSynchronizer::new(chat, config.embed.clone(), config.url.clone());
        let (phase, phase_rx) = watch::channel(SchedulerPhase::Idle);
        let stop = StopHandle {
            stopped: Arc::default(),
            notify: Arc::default(),
            phase: phase_rx,
        };
        Self {
            config,
            pages,
            sync,
            phase,
            stop,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.borrow()
    }

    fn set_phase(&self, phase: SchedulerPhase) {
        self.phase.send_replace(phase);
    }

    /// Handle that can stop this scheduler from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Acquire the tracked message, then poll until stopped or a cycle fails.
    ///
    /// Returns `Err` only when acquisition fails, in which case no cycle ran.
    pub async fn run(&mut self) -> Result<PollReport> {
        let mut state = PollState::new();

        let message = match self.sync.acquire(&self.config.channel_id, &state).await {
            Ok(message) => message,
            Err(e) => {
                log::error!("Failed to acquire tracked message ({}): {}", e.kind(), e);
                self.set_phase(SchedulerPhase::Stopped);
                return Err(e);
            }
        };

        let mut cycles = 0;
        let mut pushes = 0;

        loop {
            if self.stop.is_stopped() {
                state.running = false;
            }
            if !state.running {
                break;
            }

            self.set_phase(SchedulerPhase::Polling);
            cycles += 1;

            match self.poll_cycle(&state, &message).await {
                Ok((next, outcome)) => {
                    if let CycleOutcome::Updated { .. } = outcome {
                        pushes += 1;
                    }
                    state = next;
                }
                Err(e) => {
                    log::error!(
                        "Poll cycle {} failed ({} error): {}. Polling stopped.",
                        cycles,
                        e.kind(),
                        e
                    );
                    state.running = false;
                    self.set_phase(SchedulerPhase::Stopped);
                    return Ok(PollReport {
                        state,
                        message,
                        cycles,
                        pushes,
                        stop: StopReason::CycleFailed(e),
                    });
                }
            }

            self.set_phase(SchedulerPhase::Scheduled);
            self.wait_for_tick().await;
        }

        self.set_phase(SchedulerPhase::Stopped);
        log::info!("Polling stopped on request after {} cycles", cycles);
        Ok(PollReport {
            state,
            message,
            cycles,
            pushes,
            stop: StopReason::Requested,
        })
    }

    /// Run one cycle against `state`, returning the state to commit.
    ///
    /// World counts are refreshed on every successful fetch, but only a
    /// change of the aggregate count triggers an edit.
    pub async fn poll_cycle(
        &self,
        state: &PollState,
        message: &MessageRef,
    ) -> Result<(PollState, CycleOutcome)> {
        let counts = fetch_counts(self.pages.as_ref(), &self.config).await?;

        let mut next = state.clone();
        next.worlds_count = counts.worlds;

        if state.cached_count == Some(counts.total) {
            log::debug!("Member count unchanged at {}", counts.total);
            return Ok((next, CycleOutcome::Unchanged {
                count: counts.total,
            }));
        }

        next.cached_count = Some(counts.total);
        let embed = self.sync.render(&next, Utc::now());
        self.sync.push(message, &embed).await?;

        match state.cached_count {
            Some(previous) => log::info!("Member count changed: {} -> {}", previous, counts.total),
            None => log::info!("Member count: {}", counts.total),
        }

        Ok((next, CycleOutcome::Updated {
            previous: state.cached_count,
            current: counts.total,
        }))
    }

    async fn wait_for_tick(&self) {
        tokio::select! {
            _ = tokio::time::sleep(self.config.poll_interval()) => {}
            _ = self.stop.notify.notified() => {}
        }
    }
}
