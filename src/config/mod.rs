// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for toneseq.
//!
//! This module provides data structures for loading session plans
//! (YAML) and frequency preset tables (TOML), and for turning a plan
//! into a configured [`Sequencer`].

pub mod presets;

pub use presets::{FrequencyPreset, PresetTable};

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::session::{
    is_valid_frequency, DriverConfig, Sequencer, SessionMode, DEFAULT_DISTRIBUTE_TARGET_SECS,
    DEFAULT_SINGLE_SECS,
};

/// Root of a session plan file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionPlan {
    /// Session-level settings
    #[serde(default)]
    pub session: SessionSettings,
    /// Segments in playback order (sequence mode)
    #[serde(default)]
    pub segments: Vec<SegmentPlan>,
}

impl SessionPlan {
    /// Load a session plan from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plan file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a session plan from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML session plan")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize session plan to YAML")
    }

    /// Save the plan to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write plan file: {:?}", path.as_ref()))
    }

    /// Build an idle sequencer configured from this plan.
    ///
    /// Segments naming a `preset` are resolved against `presets`; explicit
    /// `label`/`frequency` fields override the preset's values.
    pub fn build(&self, presets: &PresetTable) -> Result<Sequencer> {
        let mut sequencer = Sequencer::new();
        sequencer.set_single_duration(self.session.single_duration)?;
        sequencer.set_auto_distribute_target(self.session.distribute_target);

        for (index, plan) in self.segments.iter().enumerate() {
            let (label, frequency) = plan
                .resolve(presets)
                .with_context(|| format!("Invalid segment #{}", index + 1))?;
            let segment = sequencer.add_segment(label, frequency)?;
            if let Some(duration) = plan.duration {
                sequencer.set_segment_duration(segment.id, duration)?;
            }
        }

        if self.session.distribute {
            sequencer.distribute_evenly()?;
        }
        sequencer.set_mode(self.session.mode)?;
        Ok(sequencer)
    }

    /// Driver settings for this plan
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            tick_interval: Duration::from_millis(self.session.tick_interval_ms.max(1)),
        }
    }
}

/// Session-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Plan name
    #[serde(default = "default_name")]
    pub name: String,
    /// Single or sequence
    #[serde(default)]
    pub mode: SessionMode,
    /// Frequency the host plays in single mode
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Single-mode duration in seconds
    #[serde(default = "default_single_duration")]
    pub single_duration: u32,
    /// Total used when distributing time evenly
    #[serde(default = "default_distribute_target")]
    pub distribute_target: u32,
    /// Rewrite segment durations to an even split on load
    #[serde(default)]
    pub distribute: bool,
    /// Wall-clock milliseconds per session second
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_name() -> String {
    "Untitled".to_string()
}
fn default_frequency() -> f64 {
    432.0
}
fn default_single_duration() -> u32 {
    DEFAULT_SINGLE_SECS
}
fn default_distribute_target() -> u32 {
    DEFAULT_DISTRIBUTE_TARGET_SECS
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            mode: SessionMode::default(),
            frequency: default_frequency(),
            single_duration: default_single_duration(),
            distribute_target: default_distribute_target(),
            distribute: false,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// One segment entry of a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SegmentPlan {
    /// Preset label to copy from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Frequency in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Duration in seconds (default 60, edits clamp to 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl SegmentPlan {
    /// Label and frequency for this entry
    fn resolve(&self, presets: &PresetTable) -> Result<(String, f64)> {
        let preset = match &self.preset {
            Some(name) => Some(
                presets
                    .find(name)
                    .ok_or_else(|| anyhow!("Unknown preset: {:?}", name))?,
            ),
            None => None,
        };

        let frequency = self
            .frequency
            .or(preset.map(|p| p.frequency))
            .ok_or_else(|| anyhow!("Segment needs a frequency or a preset"))?;
        if !is_valid_frequency(frequency) {
            bail!("Frequency must be positive, got {}", frequency);
        }

        let label = self
            .label
            .clone()
            .or_else(|| preset.map(|p| p.label.clone()))
            .unwrap_or_else(|| frequency.to_string());

        Ok((label, frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let yaml = r#"
session:
  name: "Evening"
  mode: sequence
  distribute_target: 900

segments:
  - preset: "528"
    duration: 120
  - label: "Low"
    frequency: 110
  - preset: "Om"
"#;

        let plan = SessionPlan::from_yaml(yaml).unwrap();
        assert_eq!(plan.session.name, "Evening");
        assert_eq!(plan.session.mode, SessionMode::Sequence);
        assert_eq!(plan.session.distribute_target, 900);
        assert_eq!(plan.session.single_duration, DEFAULT_SINGLE_SECS);
        assert_eq!(plan.segments.len(), 3);
        assert_eq!(plan.segments[0].duration, Some(120));
        assert_eq!(plan.segments[1].frequency, Some(110.0));
    }

    #[test]
    fn test_default_values() {
        let plan = SessionPlan::from_yaml("session:\n  name: \"Minimal\"\n").unwrap();
        assert_eq!(plan.session.mode, SessionMode::Single);
        assert_eq!(plan.session.single_duration, 180);
        assert_eq!(plan.session.frequency, 432.0);
        assert_eq!(plan.session.distribute_target, 600);
        assert_eq!(plan.session.tick_interval_ms, 1000);
        assert!(!plan.session.distribute);
        assert!(plan.segments.is_empty());
    }

    #[test]
    fn test_build_sequencer() {
        let yaml = r#"
session:
  mode: sequence
segments:
  - preset: "528"
    duration: 120
  - label: "Low"
    frequency: 110
  - preset: "Om"
    duration: 5
"#;

        let plan = SessionPlan::from_yaml(yaml).unwrap();
        let seq = plan.build(&PresetTable::default()).unwrap();
        let segments = seq.segments();

        assert_eq!(seq.mode(), SessionMode::Sequence);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].frequency_label, "528");
        assert_eq!(segments[0].duration_secs, 120);
        assert_eq!(segments[1].frequency_label, "Low");
        assert_eq!(segments[1].duration_secs, 60);
        assert_eq!(segments[2].frequency, 136.1);
        // Plan durations go through the edit clamp
        assert_eq!(segments[2].duration_secs, 10);
        assert!(seq.is_ready());
    }

    #[test]
    fn test_build_with_distribution() {
        let yaml = r#"
session:
  mode: sequence
  distribute: true
  distribute_target: 600
segments:
  - preset: "396"
  - preset: "417"
  - preset: "528"
  - preset: "639"
  - preset: "741"
  - preset: "852"
  - preset: "432"
"#;

        let seq = SessionPlan::from_yaml(yaml)
            .unwrap()
            .build(&PresetTable::default())
            .unwrap();
        assert!(seq.segments().iter().all(|s| s.duration_secs == 85));
        assert_eq!(seq.effective_duration(), 595);
    }

    #[test]
    fn test_unknown_preset() {
        let yaml = "segments:\n  - preset: \"999\"\n";
        let plan = SessionPlan::from_yaml(yaml).unwrap();
        assert!(plan.build(&PresetTable::default()).is_err());
    }

    #[test]
    fn test_segment_without_frequency() {
        let yaml = "segments:\n  - label: \"nothing\"\n";
        let plan = SessionPlan::from_yaml(yaml).unwrap();
        assert!(plan.build(&PresetTable::default()).is_err());
    }

    #[test]
    fn test_driver_config() {
        let mut plan = SessionPlan::default();
        assert_eq!(plan.driver_config().tick_interval, Duration::from_secs(1));

        plan.session.tick_interval_ms = 0;
        assert_eq!(plan.driver_config().tick_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");

        let plan = SessionPlan {
            session: SessionSettings {
                name: "Saved".to_string(),
                mode: SessionMode::Sequence,
                ..Default::default()
            },
            segments: vec![SegmentPlan {
                preset: Some("Om".to_string()),
                duration: Some(90),
                ..Default::default()
            }],
        };
        plan.save(&path).unwrap();

        let loaded = SessionPlan::load(&path).unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(SessionPlan::from_yaml("session: [").is_err());
    }
}
