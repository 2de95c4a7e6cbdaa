// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segment boundary resolution.
//!
//! Maps an elapsed second count onto the segment whose cumulative window
//! contains it. With prefix sums `B[i] = d[0] + ... + d[i]` the active index
//! is the smallest `i` with `elapsed < B[i]`. A linear scan is used; sequences
//! hold tens of segments at most.

use super::segment::SegmentStore;

/// Index of the segment active at `elapsed_secs`, or `None` past the end
pub fn active_index<I>(elapsed_secs: u64, durations: I) -> Option<usize>
where
    I: IntoIterator<Item = u32>,
{
    let mut boundary = 0u64;
    for (index, duration) in durations.into_iter().enumerate() {
        boundary += duration as u64;
        if elapsed_secs < boundary {
            return Some(index);
        }
    }
    None
}

/// Cumulative start offset of each segment, in seconds
pub fn start_offsets<I>(durations: I) -> Vec<u64>
where
    I: IntoIterator<Item = u32>,
{
    let mut offset = 0u64;
    durations
        .into_iter()
        .map(|duration| {
            let start = offset;
            offset += duration as u64;
            start
        })
        .collect()
}

/// A change of active segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

/// Tracks the current segment and reports transitions tick by tick
#[derive(Debug, Clone, Default)]
pub struct BoundaryResolver {
    current: usize,
}

impl BoundaryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the segment considered active
    pub fn current(&self) -> usize {
        self.current
    }

    /// Back to the first segment
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Resolve the active segment for `elapsed_secs`.
    ///
    /// Returns a transition when the resolved index differs from the stored
    /// one, and stores the new index. Past the end of the sequence nothing
    /// changes.
    pub fn resolve(&mut self, elapsed_secs: u64, store: &SegmentStore) -> Option<Transition> {
        let index = active_index(elapsed_secs, store.durations())?;
        if index == self.current {
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: index,
        };
        self.current = index;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(durations: &[u32]) -> SegmentStore {
        let mut store = SegmentStore::new();
        for (i, &d) in durations.iter().enumerate() {
            let seg = store.add(format!("F{}", i), 100.0 * (i + 1) as f64);
            store.set_duration(seg.id, d);
        }
        store
    }

    #[test]
    fn test_active_index_windows() {
        let durations = [60, 120, 60];
        assert_eq!(active_index(0, durations), Some(0));
        assert_eq!(active_index(59, durations), Some(0));
        assert_eq!(active_index(60, durations), Some(1));
        assert_eq!(active_index(179, durations), Some(1));
        assert_eq!(active_index(180, durations), Some(2));
        assert_eq!(active_index(239, durations), Some(2));
        assert_eq!(active_index(240, durations), None);
    }

    #[test]
    fn test_active_index_empty() {
        assert_eq!(active_index(0, std::iter::empty()), None);
    }

    #[test]
    fn test_start_offsets() {
        assert_eq!(start_offsets([60, 120, 60]), vec![0, 60, 180]);
        assert!(start_offsets(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_resolver_reports_each_transition_once() {
        let store = store(&[60, 120, 60]);
        let mut resolver = BoundaryResolver::new();

        let mut transitions = Vec::new();
        for elapsed in 1..240 {
            if let Some(t) = resolver.resolve(elapsed, &store) {
                transitions.push((elapsed, t));
            }
        }

        assert_eq!(
            transitions,
            vec![
                (60, Transition { from: 0, to: 1 }),
                (180, Transition { from: 1, to: 2 }),
            ]
        );
        assert_eq!(resolver.current(), 2);
    }

    #[test]
    fn test_resolver_past_end_keeps_index() {
        let store = store(&[30]);
        let mut resolver = BoundaryResolver::new();

        assert_eq!(resolver.resolve(30, &store), None);
        assert_eq!(resolver.current(), 0);
    }

    #[test]
    fn test_resolver_reset() {
        let store = store(&[10, 10]);
        let mut resolver = BoundaryResolver::new();
        resolver.resolve(15, &store);
        assert_eq!(resolver.current(), 1);

        resolver.reset();
        assert_eq!(resolver.current(), 0);
    }
}
