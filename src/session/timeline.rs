// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Read-only progress and timeline projections.

use serde::Serialize;

use super::boundary::start_offsets;
use super::segment::{SegmentId, SegmentStore};

/// Position of one segment on a 0-100% timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: SegmentId,
    pub frequency_label: String,
    pub frequency: f64,
    pub start_percent: f64,
    pub width_percent: f64,
}

/// Percentage of the session already played
pub fn progress_percent(elapsed_secs: u64, effective_secs: u64) -> f64 {
    if effective_secs == 0 {
        return 0.0;
    }
    100.0 * elapsed_secs as f64 / effective_secs as f64
}

/// Lay every segment out proportionally to its duration
pub fn project(store: &SegmentStore) -> Vec<TimelineEntry> {
    let total = store.total_secs();
    if total == 0 {
        return Vec::new();
    }
    let total = total as f64;

    store
        .segments()
        .iter()
        .zip(start_offsets(store.durations()))
        .map(|(segment, before)| TimelineEntry {
            id: segment.id,
            frequency_label: segment.frequency_label.clone(),
            frequency: segment.frequency,
            start_percent: 100.0 * before as f64 / total,
            width_percent: 100.0 * segment.duration_secs as f64 / total,
        })
        .collect()
}

/// Format seconds as `MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_guarded() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(10, 0), 0.0);
    }

    #[test]
    fn test_progress_values() {
        assert_eq!(progress_percent(0, 240), 0.0);
        assert_eq!(progress_percent(60, 240), 25.0);
        assert_eq!(progress_percent(240, 240), 100.0);
    }

    #[test]
    fn test_projection() {
        let mut store = SegmentStore::new();
        let a = store.add("A", 100.0);
        let b = store.add("B", 200.0);
        store.add("C", 300.0);
        store.set_duration(b.id, 120);

        let timeline = project(&store);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[0].id, a.id);
        assert_eq!(timeline[0].start_percent, 0.0);
        assert_eq!(timeline[0].width_percent, 25.0);
        assert_eq!(timeline[1].start_percent, 25.0);
        assert_eq!(timeline[1].width_percent, 50.0);
        assert_eq!(timeline[2].start_percent, 75.0);
        assert_eq!(timeline[2].width_percent, 25.0);

        let covered: f64 = timeline.iter().map(|e| e.width_percent).sum();
        assert!((covered - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_empty() {
        assert!(project(&SegmentStore::new()).is_empty());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(180), "03:00");
        assert_eq!(format_clock(595), "09:55");
        assert_eq!(format_clock(6000), "100:00");
    }
}
