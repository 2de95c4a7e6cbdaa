// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the deadline-based tick clock that drives
//! listening sessions.

pub mod clock;

pub use clock::{ClockState, TickClock, TICK_INTERVAL};
