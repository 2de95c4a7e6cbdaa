// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Even time distribution across sequence segments.
//!
//! Every segment receives `floor(target / count)` seconds. The remainder
//! `target % count` is dropped, so the resulting total can fall short of the
//! target by up to `count - 1` seconds (600s over 7 segments gives 85s each,
//! 595s total). This is the documented behaviour, not an error to correct.

/// Smallest share handed out, keeps every segment playable
pub const MIN_SHARE_SECS: u32 = 1;

/// Per-segment duration for an even split, or `None` when there are no segments
pub fn even_share(target_secs: u32, count: usize) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    Some((target_secs / count).max(MIN_SHARE_SECS))
}

/// Seconds of the target that an even split leaves unassigned
pub fn remainder(target_secs: u32, count: usize) -> u32 {
    match even_share(target_secs, count) {
        Some(share) => target_secs.saturating_sub(share.saturating_mul(count as u32)),
        None => target_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_split() {
        assert_eq!(even_share(600, 4), Some(150));
        assert_eq!(remainder(600, 4), 0);
    }

    #[test]
    fn test_rounding_loss() {
        assert_eq!(even_share(600, 7), Some(85));
        assert_eq!(remainder(600, 7), 5);
    }

    #[test]
    fn test_single_segment_takes_all() {
        assert_eq!(even_share(437, 1), Some(437));
    }

    #[test]
    fn test_no_segments() {
        assert_eq!(even_share(600, 0), None);
        assert_eq!(remainder(600, 0), 600);
    }

    #[test]
    fn test_target_smaller_than_count() {
        // Floor would be zero; each segment still gets a playable second
        assert_eq!(even_share(3, 5), Some(MIN_SHARE_SECS));
        assert_eq!(remainder(3, 5), 0);
    }

    #[test]
    fn test_share_below_edit_floor_is_kept() {
        // Distribution does not apply the 10 second edit floor
        assert_eq!(even_share(50, 7), Some(7));
    }
}
