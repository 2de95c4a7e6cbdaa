// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Readiness notification.
//!
//! A session can be started when nothing is running and the configuration
//! has something to play: single mode always does, sequence mode needs at
//! least one segment. Hosts receive a [`SessionStatus`] carrying a
//! [`StartTrigger`] only while starting is allowed, so a single "play"
//! affordance can start a session without knowing the sequencing rules.

use std::fmt;

use tokio::sync::mpsc;

use super::driver::{Command, SessionHandle};
use super::{SessionError, SessionMode};

/// Whether a session with this configuration may start
pub fn is_ready(mode: SessionMode, segment_count: usize, is_active: bool) -> bool {
    if is_active {
        return false;
    }
    match mode {
        SessionMode::Single => true,
        SessionMode::Sequence => segment_count > 0,
    }
}

/// Capability to start the session it was issued for.
///
/// Holds no strong reference to the driver: once every [`SessionHandle`]
/// is gone the driver exits and firing returns `DriverClosed`.
#[derive(Clone)]
pub struct StartTrigger {
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl StartTrigger {
    /// Start the session. Validation still happens in the sequencer, so a
    /// trigger that went stale reports the failure instead of misbehaving.
    pub async fn fire(&self) -> Result<(), SessionError> {
        let commands = self.commands.upgrade().ok_or(SessionError::DriverClosed)?;
        SessionHandle::from_sender(commands).start().await
    }
}

impl fmt::Debug for StartTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartTrigger").finish_non_exhaustive()
    }
}

/// Readiness as delivered to the host
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub is_ready: bool,
    /// Present if and only if `is_ready`
    pub start: Option<StartTrigger>,
}

impl SessionStatus {
    pub(super) fn new(is_ready: bool, commands: &mpsc::WeakUnboundedSender<Command>) -> Self {
        Self {
            is_ready,
            start: is_ready.then(|| StartTrigger {
                commands: commands.clone(),
            }),
        }
    }
}
