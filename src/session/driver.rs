// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Async session driver.
//!
//! Runs a [`Sequencer`] inside a single tokio task. Host commands arrive on
//! an mpsc queue and ticks come from a [`TickClock`] deadline in the same
//! `select!` loop, so exactly one mutation is in flight at a time and tick N
//! (with any frequency change it causes) is fully applied before tick N+1.
//!
//! Every command is acknowledged only after it has been applied and its
//! effects delivered to the observer. Once `stop()` or `toggle_pause()`
//! returns, the tick deadline is already gone and no further tick can land.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, trace};

use super::readiness::SessionStatus;
use super::{
    EndReason, Effect, Segment, SegmentId, SessionError, SessionMode, SessionPhase,
    SessionSnapshot, Sequencer, TickOutcome, TimelineEntry, TimerState,
};
use crate::timing::{ClockState, TickClock, TICK_INTERVAL};

/// Capability object the host hands to the driver.
///
/// Calls happen on the driver task, in effect order; implementations should
/// return quickly.
pub trait SessionObserver: Send + 'static {
    /// The tone engine should switch to `frequency` Hz
    fn on_frequency_change(&mut self, frequency: f64);

    /// Playback should begin
    fn on_session_start(&mut self) {}

    /// Playback should end
    fn on_session_end(&mut self, _reason: EndReason) {}

    /// Readiness changed; `status.start` is set only while ready
    fn on_status_change(&mut self, _status: SessionStatus) {}

    /// One second of the running session elapsed
    fn on_tick(&mut self, _timer: TimerState) {}
}

/// Driver settings
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Wall-clock spacing of ticks; each tick is one session second
    pub tick_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

pub(super) enum Command {
    SetMode(SessionMode, Reply<Result<(), SessionError>>),
    AddSegment(String, f64, Reply<Result<Segment, SessionError>>),
    RemoveSegment(SegmentId, Reply<Result<bool, SessionError>>),
    SetSegmentDuration(SegmentId, u32, Reply<Result<Option<u32>, SessionError>>),
    SetSingleDuration(u32, Reply<Result<u32, SessionError>>),
    SetAutoDistributeTarget(u32, Reply<u32>),
    DistributeEvenly(Reply<Result<Option<u32>, SessionError>>),
    ClearSegments(Reply<Result<usize, SessionError>>),
    Start(Reply<Result<(), SessionError>>),
    TogglePause(Reply<Option<bool>>),
    Stop(Reply<bool>),
    Snapshot(Reply<SessionSnapshot>),
    Shutdown,
}

/// Cloneable handle for talking to a running driver
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::SetMode(..) => "SetMode",
            Command::AddSegment(..) => "AddSegment",
            Command::RemoveSegment(..) => "RemoveSegment",
            Command::SetSegmentDuration(..) => "SetSegmentDuration",
            Command::SetSingleDuration(..) => "SetSingleDuration",
            Command::SetAutoDistributeTarget(..) => "SetAutoDistributeTarget",
            Command::DistributeEvenly(..) => "DistributeEvenly",
            Command::ClearSegments(..) => "ClearSegments",
            Command::Start(..) => "Start",
            Command::TogglePause(..) => "TogglePause",
            Command::Stop(..) => "Stop",
            Command::Snapshot(..) => "Snapshot",
            Command::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl SessionHandle {
    pub(super) fn from_sender(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { commands }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| SessionError::DriverClosed)?;
        rx.await.map_err(|_| SessionError::DriverClosed)
    }

    pub async fn set_mode(&self, mode: SessionMode) -> Result<(), SessionError> {
        self.request(|tx| Command::SetMode(mode, tx)).await?
    }

    pub async fn add_segment(
        &self,
        frequency_label: impl Into<String>,
        frequency: f64,
    ) -> Result<Segment, SessionError> {
        let label = frequency_label.into();
        self.request(|tx| Command::AddSegment(label, frequency, tx))
            .await?
    }

    pub async fn remove_segment(&self, id: SegmentId) -> Result<bool, SessionError> {
        self.request(|tx| Command::RemoveSegment(id, tx)).await?
    }

    pub async fn set_segment_duration(
        &self,
        id: SegmentId,
        seconds: u32,
    ) -> Result<Option<u32>, SessionError> {
        self.request(|tx| Command::SetSegmentDuration(id, seconds, tx))
            .await?
    }

    pub async fn set_single_duration(&self, seconds: u32) -> Result<u32, SessionError> {
        self.request(|tx| Command::SetSingleDuration(seconds, tx))
            .await?
    }

    pub async fn set_auto_distribute_target(&self, seconds: u32) -> Result<u32, SessionError> {
        self.request(|tx| Command::SetAutoDistributeTarget(seconds, tx))
            .await
    }

    pub async fn distribute_evenly(&self) -> Result<Option<u32>, SessionError> {
        self.request(Command::DistributeEvenly).await?
    }

    /// Drop every segment; returns how many were removed
    pub async fn clear_segments(&self) -> Result<usize, SessionError> {
        self.request(Command::ClearSegments).await?
    }

    /// Start a session; fails with `EmptySequence` or `AlreadyActive`
    pub async fn start(&self) -> Result<(), SessionError> {
        self.request(Command::Start).await?
    }

    /// Pause or resume; `None` when no session is active
    pub async fn toggle_pause(&self) -> Result<Option<bool>, SessionError> {
        self.request(Command::TogglePause).await
    }

    /// Stop the active session; `false` when there was nothing to stop
    pub async fn stop(&self) -> Result<bool, SessionError> {
        self.request(Command::Stop).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::Snapshot).await
    }

    pub async fn effective_duration(&self) -> Result<u64, SessionError> {
        Ok(self.snapshot().await?.effective_duration_secs)
    }

    pub async fn elapsed_secs(&self) -> Result<u64, SessionError> {
        Ok(self.snapshot().await?.timer.elapsed_secs)
    }

    pub async fn progress_percent(&self) -> Result<f64, SessionError> {
        Ok(self.snapshot().await?.progress_percent)
    }

    pub async fn timeline(&self) -> Result<Vec<TimelineEntry>, SessionError> {
        Ok(self.snapshot().await?.timeline)
    }

    pub async fn current_segment_index(&self) -> Result<usize, SessionError> {
        Ok(self.snapshot().await?.timer.current_segment_index)
    }

    /// Ask the driver task to exit. An active session ends without effects.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

/// Owns the sequencer, the clock and the observer on one task
pub struct SessionDriver<O: SessionObserver> {
    sequencer: Sequencer,
    clock: TickClock,
    observer: O,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Weak so triggers held by the observer do not keep the task alive
    handle: mpsc::WeakUnboundedSender<Command>,
}

impl<O: SessionObserver> SessionDriver<O> {
    /// Spawn a driver around a fresh sequencer
    pub fn spawn(observer: O, config: DriverConfig) -> (SessionHandle, JoinHandle<()>) {
        Self::spawn_with(Sequencer::new(), observer, config)
    }

    /// Spawn a driver around a pre-configured sequencer.
    ///
    /// Effects already queued on the sequencer are delivered first.
    pub fn spawn_with(
        sequencer: Sequencer,
        observer: O,
        config: DriverConfig,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            sequencer,
            clock: TickClock::new(config.tick_interval),
            observer,
            commands: rx,
            handle: tx.downgrade(),
        };
        let join = tokio::spawn(driver.run());
        (SessionHandle { commands: tx }, join)
    }

    async fn run(mut self) {
        debug!(interval = ?self.clock.interval(), "session driver started");
        self.dispatch_effects();

        loop {
            let deadline = self.clock.deadline();
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = wait_until(deadline) => self.handle_ticks(),
            }
        }

        info!(active = self.sequencer.is_active(), "session driver shut down");
    }

    fn handle_command(&mut self, command: Command) {
        trace!(?command, "session command");
        match command {
            Command::SetMode(mode, reply) => {
                let result = self.sequencer.set_mode(mode);
                self.finish_command(reply, result);
            }
            Command::AddSegment(label, frequency, reply) => {
                let result = self.sequencer.add_segment(label, frequency);
                self.finish_command(reply, result);
            }
            Command::RemoveSegment(id, reply) => {
                let result = self.sequencer.remove_segment(id);
                self.finish_command(reply, result);
            }
            Command::SetSegmentDuration(id, seconds, reply) => {
                let result = self.sequencer.set_segment_duration(id, seconds);
                self.finish_command(reply, result);
            }
            Command::SetSingleDuration(seconds, reply) => {
                let result = self.sequencer.set_single_duration(seconds);
                self.finish_command(reply, result);
            }
            Command::SetAutoDistributeTarget(seconds, reply) => {
                let result = self.sequencer.set_auto_distribute_target(seconds);
                self.finish_command(reply, result);
            }
            Command::DistributeEvenly(reply) => {
                let result = self.sequencer.distribute_evenly();
                self.finish_command(reply, result);
            }
            Command::ClearSegments(reply) => {
                let result = self.sequencer.clear_segments();
                self.finish_command(reply, result);
            }
            Command::Start(reply) => {
                let result = self.sequencer.start();
                self.finish_command(reply, result);
            }
            Command::TogglePause(reply) => {
                let result = self.sequencer.toggle_pause();
                self.finish_command(reply, result);
            }
            Command::Stop(reply) => {
                let result = self.sequencer.stop();
                self.finish_command(reply, result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.sequencer.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    /// Align the clock, deliver effects, then acknowledge
    fn finish_command<T>(&mut self, reply: Reply<T>, result: T) {
        self.sync_clock(Instant::now());
        self.dispatch_effects();
        let _ = reply.send(result);
    }

    fn handle_ticks(&mut self) {
        let now = Instant::now();
        while self.clock.poll(now) {
            let outcome = self.sequencer.tick();
            if outcome == TickOutcome::Advanced {
                self.observer.on_tick(self.sequencer.timer_state());
            }
            self.dispatch_effects();
            if outcome != TickOutcome::Advanced {
                break;
            }
        }
        self.sync_clock(now);
    }

    fn sync_clock(&mut self, now: Instant) {
        match (self.sequencer.phase(), self.clock.state()) {
            (SessionPhase::Idle, ClockState::Stopped)
            | (SessionPhase::Running, ClockState::Running)
            | (SessionPhase::Paused, ClockState::Paused) => {}
            (SessionPhase::Idle, _) => self.clock.stop(),
            (SessionPhase::Running, ClockState::Paused) => self.clock.resume(now),
            (SessionPhase::Running, ClockState::Stopped) => self.clock.start(now),
            (SessionPhase::Paused, _) => self.clock.pause(),
        }
    }

    fn dispatch_effects(&mut self) {
        while let Some(effect) = self.sequencer.poll_effect() {
            match effect {
                Effect::FrequencyChange { frequency, .. } => {
                    self.observer.on_frequency_change(frequency)
                }
                Effect::SessionStart => self.observer.on_session_start(),
                Effect::SessionEnd(reason) => self.observer.on_session_end(reason),
                Effect::StatusChanged { is_ready } => self
                    .observer
                    .on_status_change(SessionStatus::new(is_ready, &self.handle)),
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
