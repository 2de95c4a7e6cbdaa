// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segment store.
//!
//! Holds the ordered list of frequency segments that make up a sequence
//! session. Derived values (total duration, prefix boundaries) are always
//! computed from the live list so they can never go stale after an edit.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::distribute;

/// Duration given to a freshly added segment
pub const DEFAULT_SEGMENT_SECS: u32 = 60;

/// Lower bound applied when a segment duration is edited
pub const MIN_SEGMENT_SECS: u32 = 10;

/// Whether `hz` can be handed to a tone engine
pub fn is_valid_frequency(hz: f64) -> bool {
    hz.is_finite() && hz > 0.0
}

/// Opaque, store-unique segment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg-{}", self.0)
    }
}

/// One frequency + duration unit of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique id within the owning store
    pub id: SegmentId,
    /// Display label copied from the preset
    pub frequency_label: String,
    /// Target frequency in Hz
    pub frequency: f64,
    /// Playing time in whole seconds
    pub duration_secs: u32,
}

/// Ordered list of segments
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    next_id: u64,
}

impl SegmentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment with the default duration
    ///
    /// The edit floor is not applied here; the default is already above it.
    pub fn add(&mut self, frequency_label: impl Into<String>, frequency: f64) -> Segment {
        let segment = Segment {
            id: self.fresh_id(),
            frequency_label: frequency_label.into(),
            frequency,
            duration_secs: DEFAULT_SEGMENT_SECS,
        };
        self.segments.push(segment.clone());
        segment
    }

    /// Remove the segment with `id`. Returns false if it was not present.
    pub fn remove(&mut self, id: SegmentId) -> bool {
        let before = self.segments.len();
        self.segments.retain(|s| s.id != id);
        self.segments.len() != before
    }

    /// Set a segment's duration, clamped to [`MIN_SEGMENT_SECS`].
    ///
    /// Returns the stored duration, or `None` for an unknown id.
    pub fn set_duration(&mut self, id: SegmentId, seconds: u32) -> Option<u32> {
        let segment = self.segments.iter_mut().find(|s| s.id == id)?;
        segment.duration_secs = seconds.max(MIN_SEGMENT_SECS);
        Some(segment.duration_secs)
    }

    /// Rewrite every segment to an even share of `target_secs`.
    ///
    /// Returns the per-segment duration applied, or `None` when empty.
    pub fn distribute_evenly(&mut self, target_secs: u32) -> Option<u32> {
        let share = distribute::even_share(target_secs, self.segments.len())?;
        for segment in &mut self.segments {
            segment.duration_secs = share;
        }
        Some(share)
    }

    /// Drop every segment
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Segment at a playback position
    pub fn at(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment durations
    pub fn total_secs(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_secs as u64).sum()
    }

    /// Segment durations in playback order
    pub fn durations(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().map(|s| s.duration_secs)
    }

    fn fresh_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_uses_default_duration() {
        let mut store = SegmentStore::new();
        let seg = store.add("528", 528.0);

        assert_eq!(seg.duration_secs, DEFAULT_SEGMENT_SECS);
        assert_eq!(seg.frequency_label, "528");
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_secs(), 60);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = SegmentStore::new();
        let a = store.add("396", 396.0);
        let b = store.add("396", 396.0);
        store.remove(a.id);
        let c = store.add("417", 417.0);

        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_ne!(b.id, c.id);
    }

    #[test]
    fn test_remove() {
        let mut store = SegmentStore::new();
        let a = store.add("396", 396.0);
        let b = store.add("417", 417.0);

        assert!(store.remove(a.id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.at(0).unwrap().id, b.id);

        // Absent id is a no-op
        assert!(!store.remove(a.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_duration_clamps_to_floor() {
        let mut store = SegmentStore::new();
        let seg = store.add("639", 639.0);

        assert_eq!(store.set_duration(seg.id, 120), Some(120));
        assert_eq!(store.set_duration(seg.id, 9), Some(MIN_SEGMENT_SECS));
        assert_eq!(store.set_duration(seg.id, 0), Some(MIN_SEGMENT_SECS));
        assert_eq!(store.at(0).unwrap().duration_secs, 10);
    }

    #[test]
    fn test_valid_frequency() {
        assert!(is_valid_frequency(136.1));
        assert!(is_valid_frequency(0.5));
        assert!(!is_valid_frequency(0.0));
        assert!(!is_valid_frequency(-5.0));
        assert!(!is_valid_frequency(f64::NAN));
        assert!(!is_valid_frequency(f64::INFINITY));
    }

    #[test]
    fn test_set_duration_unknown_id() {
        let mut store = SegmentStore::new();
        let seg = store.add("639", 639.0);
        store.remove(seg.id);

        assert_eq!(store.set_duration(seg.id, 120), None);
    }

    #[test]
    fn test_total_tracks_mutations() {
        let mut store = SegmentStore::new();
        let a = store.add("A", 100.0);
        let b = store.add("B", 200.0);
        assert_eq!(store.total_secs(), 120);

        store.set_duration(b.id, 300);
        assert_eq!(store.total_secs(), 360);

        store.remove(a.id);
        assert_eq!(store.total_secs(), 300);

        store.clear();
        assert_eq!(store.total_secs(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_distribute_rewrites_all() {
        let mut store = SegmentStore::new();
        for i in 0..7 {
            store.add(format!("F{}", i), 100.0 + i as f64);
        }

        assert_eq!(store.distribute_evenly(600), Some(85));
        assert!(store.durations().all(|d| d == 85));
        // 600 mod 7 = 5 seconds are dropped
        assert_eq!(store.total_secs(), 595);
    }

    #[test]
    fn test_distribute_empty_store() {
        let mut store = SegmentStore::new();
        assert_eq!(store.distribute_evenly(600), None);
    }
}
