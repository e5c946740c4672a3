//! Run controls shared between the run loop and whoever drives it.
//!
//! The engine binary wires `Ctrl-C` to [`OperatorState::request_stop`];
//! tests and embedders can pause, resume, and retune the tick pacing from
//! any task while the loop is running. Flags are atomics so the loop reads
//! them without locking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationBoundsConfig;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// `max_ticks` ticks completed.
    MaxTicksReached,
    /// `max_real_time_seconds` of wall-clock time elapsed.
    MaxRealTimeReached,
    /// Someone called [`OperatorState::request_stop`].
    OperatorStop,
    /// No foragers are left and the run is configured to stop on that.
    Extinction,
}

/// Pause, stop and pacing controls plus the run bounds.
#[derive(Debug)]
pub struct OperatorState {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    /// Delay between ticks; 0 runs flat out.
    tick_interval_ms: AtomicU64,
    started_at: DateTime<Utc>,
    /// 0 = unlimited.
    max_ticks: u64,
    /// 0 = unlimited.
    max_real_time_seconds: u64,
    stop_on_extinction: bool,
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Controls for a fresh run. The wall clock starts now.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            stop_on_extinction: bounds.stop_on_extinction,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Hold the loop before its next tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Release a paused loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Block while paused. A stop request also releases the wait so a
    /// paused run can still shut down.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Ask the loop to stop after the tick in progress.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record why the run ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// Why the run ended, once it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Pacing
    // -----------------------------------------------------------------------

    /// Current delay between ticks in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the delay between ticks, returning the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    /// `true` once `completed_ticks` reaches a non-zero `max_ticks`.
    pub const fn tick_limit_reached(&self, completed_ticks: u64) -> bool {
        self.max_ticks > 0 && completed_ticks >= self.max_ticks
    }

    /// `true` once a non-zero wall-clock budget is spent.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Whether an empty World ends the run.
    pub const fn stop_on_extinction(&self) -> bool {
        self.stop_on_extinction
    }

    /// When the run started.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the run started. Clock skew reads as 0.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured tick bound.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}
