// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Frequency preset tables.
//!
//! Presets are read-only input to sequence building: each one is copied
//! into a new segment as-is. Tables load from TOML; a built-in table is
//! used when no file is given.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::is_valid_frequency;

/// A named frequency offered to the sequence builder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrequencyPreset {
    /// Display label, copied into the segment
    pub label: String,
    /// Frequency in Hz
    pub frequency: f64,
    /// Grouping key (e.g., "solfeggio", "rose", "special")
    pub category: String,
    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FrequencyPreset {
    fn new(label: &str, frequency: f64, category: &str, description: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            frequency,
            category: category.to_string(),
            description: description.map(str::to_string),
        }
    }
}

/// Ordered collection of presets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetTable {
    #[serde(default, rename = "preset")]
    pub presets: Vec<FrequencyPreset>,
}

impl PresetTable {
    /// Load a preset table from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read preset file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Parse a preset table from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let table: Self = toml::from_str(text).context("Failed to parse preset TOML")?;
        table.validate()?;
        Ok(table)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize presets to TOML")
    }

    /// Reject presets that could not be played
    pub fn validate(&self) -> Result<()> {
        for preset in &self.presets {
            if !is_valid_frequency(preset.frequency) {
                bail!(
                    "Preset {:?} has invalid frequency {}",
                    preset.label,
                    preset.frequency
                );
            }
        }
        Ok(())
    }

    /// Find a preset by its label
    pub fn find(&self, label: &str) -> Option<&FrequencyPreset> {
        self.presets.iter().find(|p| p.label == label)
    }

    /// Presets of one category, in table order
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a FrequencyPreset> {
        self.presets.iter().filter(move |p| p.category == category)
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for preset in &self.presets {
            if !seen.contains(&preset.category.as_str()) {
                seen.push(&preset.category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        let solfeggio = [
            ("396", 396.0, "Liberation"),
            ("417", 417.0, "Change"),
            ("528", 528.0, "Miracles"),
            ("639", 639.0, "Connection"),
            ("741", 741.0, "Expression"),
            ("852", 852.0, "Intuition"),
        ];
        let rose = [32.0, 64.0, 128.0, 256.0, 512.0, 1024.0];

        let mut presets: Vec<FrequencyPreset> = solfeggio
            .into_iter()
            .map(|(label, hz, desc)| FrequencyPreset::new(label, hz, "solfeggio", Some(desc)))
            .collect();
        presets.extend(
            rose.into_iter()
                .map(|hz: f64| FrequencyPreset::new(&hz.to_string(), hz, "rose", None)),
        );
        presets.push(FrequencyPreset::new("Om", 136.1, "special", Some("Cosmic Om")));
        presets.push(FrequencyPreset::new("432", 432.0, "special", Some("Verdi A")));

        Self { presets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = PresetTable::default();
        assert_eq!(table.len(), 14);
        assert_eq!(table.categories(), vec!["solfeggio", "rose", "special"]);
        assert_eq!(table.by_category("solfeggio").count(), 6);
        assert_eq!(table.by_category("rose").count(), 6);
        assert_eq!(table.find("Om").unwrap().frequency, 136.1);
        assert_eq!(table.find("1024").unwrap().frequency, 1024.0);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_parse_presets() {
        let text = r#"
[[preset]]
label = "528"
frequency = 528.0
category = "solfeggio"
description = "Miracles"

[[preset]]
label = "Om"
frequency = 136.1
category = "special"
"#;

        let table = PresetTable::from_toml(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.presets[0].description.as_deref(), Some("Miracles"));
        assert_eq!(table.presets[1].description, None);
    }

    #[test]
    fn test_reject_bad_frequency() {
        let text = r#"
[[preset]]
label = "bad"
frequency = -1.0
category = "special"
"#;
        assert!(PresetTable::from_toml(text).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.toml");
        let table = PresetTable::default();
        fs::write(&path, table.to_toml().unwrap()).unwrap();

        let loaded = PresetTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(PresetTable::load("/definitely/not/here.toml").is_err());
    }
}
