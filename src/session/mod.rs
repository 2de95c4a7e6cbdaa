// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session sequencer core.
//!
//! This module provides the listening-session state machine:
//! - Segment store and even time distribution
//! - Boundary resolution from elapsed seconds to the active segment
//! - A tick-driven timer with pause/resume and completion
//! - Readiness notification for a host "start" affordance
//!
//! [`Sequencer`] is synchronous and owns all state. Side effects for the
//! host are queued as [`Effect`]s and collected with [`Sequencer::drain_effects`].
//! [`driver::SessionDriver`] runs a sequencer on a tokio task with a real
//! one-second clock.

pub mod boundary;
pub mod distribute;
pub mod driver;
pub mod readiness;
pub mod segment;
pub mod timeline;

pub use boundary::{BoundaryResolver, Transition};
pub use driver::{DriverConfig, SessionDriver, SessionHandle, SessionObserver};
pub use readiness::{SessionStatus, StartTrigger};
pub use segment::{is_valid_frequency, Segment, SegmentId, SegmentStore};
pub use timeline::{format_clock, TimelineEntry};

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FrequencyPreset;

/// Single-mode duration used before the host picks one
pub const DEFAULT_SINGLE_SECS: u32 = 180;

/// Distribution target used before the host picks one
pub const DEFAULT_DISTRIBUTE_TARGET_SECS: u32 = 600;

/// Quick picks for single-mode sessions (label, seconds)
pub const SINGLE_DURATION_PRESETS: [(&str, u32); 4] =
    [("1m", 60), ("3m", 180), ("5m", 300), ("10m", 600)];

/// Quick picks for segment durations (label, seconds)
pub const SEGMENT_DURATION_PRESETS: [(&str, u32); 4] =
    [("1m", 60), ("2m", 120), ("3m", 180), ("5m", 300)];

/// Seconds for a quick-pick label such as "3m"
pub fn duration_preset(label: &str) -> Option<u32> {
    SINGLE_DURATION_PRESETS
        .iter()
        .chain(SEGMENT_DURATION_PRESETS.iter())
        .find(|(name, _)| *name == label)
        .map(|&(_, seconds)| seconds)
}

/// Which duration source governs the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// One continuous duration at the host's current frequency
    #[default]
    Single,
    /// Segments played back to back
    Sequence,
}

/// Timer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// Elapsed time reached the effective duration
    Completed,
    /// Host called stop
    Stopped,
}

/// Side effect requested from the host
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Switch the tone engine to a new frequency
    FrequencyChange { frequency: f64, segment_index: usize },
    /// Playback should begin
    SessionStart,
    /// Playback should end
    SessionEnd(EndReason),
    /// Readiness was recomputed
    StatusChanged { is_ready: bool },
}

/// Result of delivering one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed
    Ignored,
    /// Elapsed time advanced by one second
    Advanced,
    /// The session reached its effective duration and ended
    Completed,
}

/// Sequencer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Sequence mode start with nothing to play
    #[error("add at least one frequency to the sequence")]
    EmptySequence,
    /// Start requested while a session is running or paused
    #[error("a session is already active")]
    AlreadyActive,
    /// Segment frequency that is zero, negative or not a number
    #[error("frequency must be a positive number of Hz")]
    InvalidFrequency,
    /// Configuration edit attempted during a session
    #[error("session configuration cannot change while a session is active")]
    SessionActive,
    /// The driver task is gone
    #[error("session driver has shut down")]
    DriverClosed,
}

/// Timer fields as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimerState {
    pub is_active: bool,
    pub is_paused: bool,
    pub elapsed_secs: u64,
    pub current_segment_index: usize,
}

/// Point-in-time view of the whole session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub phase: SessionPhase,
    pub timer: TimerState,
    pub single_duration_secs: u32,
    pub auto_distribute_target_secs: u32,
    pub sequence_duration_secs: u64,
    pub effective_duration_secs: u64,
    pub remaining_secs: u64,
    pub progress_percent: f64,
    pub is_ready: bool,
    pub segments: Vec<Segment>,
    pub timeline: Vec<TimelineEntry>,
}

/// Listening-session state machine
#[derive(Debug, Clone)]
pub struct Sequencer {
    mode: SessionMode,
    single_duration_secs: u32,
    auto_distribute_target_secs: u32,
    store: SegmentStore,
    phase: SessionPhase,
    elapsed_secs: u64,
    resolver: BoundaryResolver,
    effects: VecDeque<Effect>,
}

impl Sequencer {
    /// Create an idle single-mode sequencer with no segments.
    ///
    /// The initial readiness is queued so the host learns it on first drain.
    pub fn new() -> Self {
        let mut sequencer = Self {
            mode: SessionMode::Single,
            single_duration_secs: DEFAULT_SINGLE_SECS,
            auto_distribute_target_secs: DEFAULT_DISTRIBUTE_TARGET_SECS,
            store: SegmentStore::new(),
            phase: SessionPhase::Idle,
            elapsed_secs: 0,
            resolver: BoundaryResolver::new(),
            effects: VecDeque::new(),
        };
        sequencer.notify_status();
        sequencer
    }

    // ---- mutators -------------------------------------------------------

    /// Switch between single and sequence mode
    pub fn set_mode(&mut self, mode: SessionMode) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.mode != mode {
            debug!(?mode, "session mode changed");
            self.mode = mode;
            self.notify_status();
        }
        Ok(())
    }

    /// Append a segment with the default duration
    pub fn add_segment(
        &mut self,
        frequency_label: impl Into<String>,
        frequency: f64,
    ) -> Result<Segment, SessionError> {
        self.ensure_editable()?;
        if !is_valid_frequency(frequency) {
            warn!(frequency, "segment rejected: invalid frequency");
            return Err(SessionError::InvalidFrequency);
        }
        let segment = self.store.add(frequency_label, frequency);
        debug!(id = %segment.id, frequency, "segment added");
        self.notify_status();
        Ok(segment)
    }

    /// Append a segment copied from a preset
    pub fn add_preset(&mut self, preset: &FrequencyPreset) -> Result<Segment, SessionError> {
        self.add_segment(preset.label.clone(), preset.frequency)
    }

    /// Remove a segment; unknown ids are ignored
    pub fn remove_segment(&mut self, id: SegmentId) -> Result<bool, SessionError> {
        self.ensure_editable()?;
        let removed = self.store.remove(id);
        if removed {
            debug!(%id, "segment removed");
            self.notify_status();
        }
        Ok(removed)
    }

    /// Drop every segment, returning how many were removed
    pub fn clear_segments(&mut self) -> Result<usize, SessionError> {
        self.ensure_editable()?;
        let removed = self.store.len();
        if removed > 0 {
            self.store.clear();
            debug!(removed, "sequence cleared");
            self.notify_status();
        }
        Ok(removed)
    }

    /// Set a segment duration, clamped to the 10 second floor
    pub fn set_segment_duration(
        &mut self,
        id: SegmentId,
        seconds: u32,
    ) -> Result<Option<u32>, SessionError> {
        self.ensure_editable()?;
        Ok(self.store.set_duration(id, seconds))
    }

    /// Set the single-mode duration, clamped to at least one second
    pub fn set_single_duration(&mut self, seconds: u32) -> Result<u32, SessionError> {
        self.ensure_editable()?;
        self.single_duration_secs = seconds.max(1);
        Ok(self.single_duration_secs)
    }

    /// Set the total used by [`Sequencer::distribute_evenly`].
    ///
    /// This only stores a number, so it is allowed during a session.
    pub fn set_auto_distribute_target(&mut self, seconds: u32) -> u32 {
        self.auto_distribute_target_secs = seconds.max(1);
        self.auto_distribute_target_secs
    }

    /// Give every segment `floor(target / count)` seconds.
    ///
    /// The remainder is dropped; see [`distribute`].
    pub fn distribute_evenly(&mut self) -> Result<Option<u32>, SessionError> {
        self.ensure_editable()?;
        let share = self.store.distribute_evenly(self.auto_distribute_target_secs);
        if let Some(share) = share {
            let lost = distribute::remainder(self.auto_distribute_target_secs, self.store.len());
            debug!(share, lost, segments = self.store.len(), "time distributed evenly");
        }
        Ok(share)
    }

    // ---- commands -------------------------------------------------------

    /// Begin a session from idle
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.is_active() {
            warn!("start rejected: session already active");
            return Err(SessionError::AlreadyActive);
        }
        if self.mode == SessionMode::Sequence && self.store.is_empty() {
            warn!("start rejected: sequence is empty");
            return Err(SessionError::EmptySequence);
        }

        self.phase = SessionPhase::Running;
        self.elapsed_secs = 0;
        self.resolver.reset();

        // Segment 0 is active from time zero
        if self.mode == SessionMode::Sequence {
            if let Some(first) = self.store.at(0) {
                self.effects.push_back(Effect::FrequencyChange {
                    frequency: first.frequency,
                    segment_index: 0,
                });
            }
        }
        self.effects.push_back(Effect::SessionStart);
        self.notify_status();

        info!(
            mode = ?self.mode,
            duration_secs = self.effective_duration(),
            segments = self.store.len(),
            "session started"
        );
        Ok(())
    }

    /// Pause or resume. Returns the new paused flag, or `None` when idle.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        match self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Running => {
                self.phase = SessionPhase::Paused;
                info!(elapsed_secs = self.elapsed_secs, "session paused");
                Some(true)
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Running;
                info!(elapsed_secs = self.elapsed_secs, "session resumed");
                Some(false)
            }
        }
    }

    /// End the active session. Returns false (and emits nothing) when idle.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        info!(elapsed_secs = self.elapsed_secs, "session stopped");
        self.finish(EndReason::Stopped);
        true
    }

    /// Advance the clock by one second
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Running {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs += 1;

        if self.elapsed_secs >= self.effective_duration() {
            info!(elapsed_secs = self.elapsed_secs, "session completed");
            self.finish(EndReason::Completed);
            return TickOutcome::Completed;
        }

        if self.mode == SessionMode::Sequence {
            if let Some(transition) = self.resolver.resolve(self.elapsed_secs, &self.store) {
                if let Some(segment) = self.store.at(transition.to) {
                    debug!(
                        from = transition.from,
                        to = transition.to,
                        frequency = segment.frequency,
                        elapsed_secs = self.elapsed_secs,
                        "segment transition"
                    );
                    self.effects.push_back(Effect::FrequencyChange {
                        frequency: segment.frequency,
                        segment_index: transition.to,
                    });
                }
            }
        }

        TickOutcome::Advanced
    }

    // ---- effects --------------------------------------------------------

    /// Take the next queued effect
    pub fn poll_effect(&mut self) -> Option<Effect> {
        self.effects.pop_front()
    }

    /// Take every queued effect in emission order
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain(..).collect()
    }

    // ---- queries --------------------------------------------------------

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_ready(&self) -> bool {
        readiness::is_ready(self.mode, self.store.len(), self.is_active())
    }

    pub fn segments(&self) -> &[Segment] {
        self.store.segments()
    }

    pub fn single_duration(&self) -> u32 {
        self.single_duration_secs
    }

    pub fn auto_distribute_target(&self) -> u32 {
        self.auto_distribute_target_secs
    }

    /// Sum of segment durations
    pub fn sequence_duration(&self) -> u64 {
        self.store.total_secs()
    }

    /// Duration governing the session in the current mode
    pub fn effective_duration(&self) -> u64 {
        match self.mode {
            SessionMode::Single => self.single_duration_secs as u64,
            SessionMode::Sequence => self.store.total_secs(),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Seconds left in the active session, 0 when idle
    pub fn remaining_secs(&self) -> u64 {
        if !self.is_active() {
            return 0;
        }
        self.effective_duration().saturating_sub(self.elapsed_secs)
    }

    pub fn current_segment_index(&self) -> usize {
        self.resolver.current()
    }

    pub fn progress_percent(&self) -> f64 {
        timeline::progress_percent(self.elapsed_secs, self.effective_duration())
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        timeline::project(&self.store)
    }

    pub fn timer_state(&self) -> TimerState {
        TimerState {
            is_active: self.is_active(),
            is_paused: self.is_paused(),
            elapsed_secs: self.elapsed_secs,
            current_segment_index: self.resolver.current(),
        }
    }

    /// One-line status for headers and logs
    pub fn summary(&self) -> String {
        if self.is_active() {
            return format!("{} remaining", format_clock(self.remaining_secs()));
        }
        match self.mode {
            SessionMode::Single => format_clock(self.single_duration_secs as u64),
            SessionMode::Sequence if self.store.is_empty() => "Build a sequence".to_string(),
            SessionMode::Sequence => format!(
                "{} frequencies, {}",
                self.store.len(),
                format_clock(self.store.total_secs())
            ),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            phase: self.phase,
            timer: self.timer_state(),
            single_duration_secs: self.single_duration_secs,
            auto_distribute_target_secs: self.auto_distribute_target_secs,
            sequence_duration_secs: self.sequence_duration(),
            effective_duration_secs: self.effective_duration(),
            remaining_secs: self.remaining_secs(),
            progress_percent: self.progress_percent(),
            is_ready: self.is_ready(),
            segments: self.store.segments().to_vec(),
            timeline: self.timeline(),
        }
    }

    // ---- internals ------------------------------------------------------

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.is_active() {
            warn!("edit rejected: session active");
            return Err(SessionError::SessionActive);
        }
        Ok(())
    }

    fn finish(&mut self, reason: EndReason) {
        self.phase = SessionPhase::Idle;
        self.elapsed_secs = 0;
        self.resolver.reset();
        self.effects.push_back(Effect::SessionEnd(reason));
        self.notify_status();
    }

    fn notify_status(&mut self) {
        let is_ready = self.is_ready();
        self.effects.push_back(Effect::StatusChanged { is_ready });
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
