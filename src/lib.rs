// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! toneseq - timed frequency listening sessions.
//!
//! Decides, second by second, which frequency should be playing across a
//! single continuous duration or a sequence of frequency segments. The
//! audio engine itself is an external collaborator reached through
//! [`session::SessionObserver`].

pub mod config;
pub mod session;
pub mod timing;

pub use config::{FrequencyPreset, PresetTable, SessionPlan};
pub use session::{
    DriverConfig, Effect, EndReason, Segment, SegmentId, SessionDriver, SessionError,
    SessionHandle, SessionMode, SessionObserver, SessionPhase, SessionSnapshot, SessionStatus,
    Sequencer, StartTrigger, TickOutcome,
};
