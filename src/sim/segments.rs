//! Bank segment lifecycle: extend ahead/behind the player, retire far behind
//!
//! The world is vertically unbounded but the sample set is not: a window of
//! `[current - R, current + R]` segment indices is kept populated as the
//! player moves, and a throttled retirement pass drops samples once they are
//! far enough outside the window. Each segment also carries an opaque visual
//! bank handle so the rendering collaborator can attach/detach per segment.

use crate::consts::{CLEANUP_INTERVAL, RETIRE_FACTOR, VISIBLE_RANGE};
use crate::segment_index;

use super::path::PathField;

/// Handle the renderer associates with a generated bank segment.
pub type BankHandle = u64;

/// Notification that a segment gained or lost its visual banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankChange {
    Generated { index: i64, handle: BankHandle },
    Retired { index: i64, handle: BankHandle },
}

/// Owns the populated window of boundary samples inside a [`PathField`].
#[derive(Debug)]
pub struct SegmentManager {
    lowest: i64,
    highest: i64,
    last_cleanup_segment: i64,
    next_handle: BankHandle,
    handles: std::collections::BTreeMap<i64, BankHandle>,
    /// Bank attach/detach notifications for the rendering collaborator,
    /// drained once per frame.
    pub changes: Vec<BankChange>,
}

impl SegmentManager {
    /// Seed the initial window around y = 0.
    pub fn new(field: &mut PathField) -> Self {
        let mut mgr = Self {
            lowest: -VISIBLE_RANGE,
            highest: VISIBLE_RANGE,
            last_cleanup_segment: 0,
            next_handle: 1,
            handles: std::collections::BTreeMap::new(),
            changes: Vec::new(),
        };
        for i in mgr.lowest..=mgr.highest {
            mgr.create(i, field);
        }
        mgr
    }

    fn create(&mut self, index: i64, field: &mut PathField) {
        if field.contains(index) {
            return;
        }
        let sample = field.generate(index);
        field.insert(index, sample);
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(index, handle);
        self.changes.push(BankChange::Generated { index, handle });
    }

    /// Ensure the window `[current - R, current + R]` exists, then run the
    /// throttled retirement pass.
    pub fn extend(&mut self, player_y: f32, field: &mut PathField) {
        let current = segment_index(player_y);

        let target_low = current - VISIBLE_RANGE;
        if target_low < self.lowest {
            for i in (target_low..self.lowest).rev() {
                self.create(i, field);
            }
            self.lowest = target_low;
        }

        let target_high = current + VISIBLE_RANGE;
        if target_high > self.highest {
            for i in (self.highest + 1)..=target_high {
                self.create(i, field);
            }
            self.highest = target_high;
        }

        // Retirement is throttled: only when the player has crossed enough
        // segments since the last pass.
        if (current - self.last_cleanup_segment).abs() >= CLEANUP_INTERVAL {
            self.last_cleanup_segment = current;
            self.retire(current, field);
        }
    }

    fn retire(&mut self, current: i64, field: &mut PathField) {
        let limit = (VISIBLE_RANGE as f32 * RETIRE_FACTOR) as i64;
        let retired = field.retain(|i| (i - current).abs() <= limit);
        if retired > 0 {
            let stale: Vec<i64> = self
                .handles
                .keys()
                .copied()
                .filter(|&i| (i - current).abs() > limit)
                .collect();
            for index in stale {
                if let Some(handle) = self.handles.remove(&index) {
                    self.changes.push(BankChange::Retired { index, handle });
                }
            }
            log::debug!("retired {retired} bank segments around index {current}");
        }
    }

    pub fn window(&self) -> (i64, i64) {
        (self.lowest, self.highest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SEGMENT_HEIGHT;

    fn setup() -> (PathField, SegmentManager) {
        let mut field = PathField::new(500.0, 0.18, 450.0);
        let mgr = SegmentManager::new(&mut field);
        (field, mgr)
    }

    #[test]
    fn test_initial_window() {
        let (field, mgr) = setup();
        assert_eq!(mgr.window(), (-VISIBLE_RANGE, VISIBLE_RANGE));
        assert_eq!(field.sample_count(), (2 * VISIBLE_RANGE + 1) as usize);
    }

    #[test]
    fn test_extend_upstream() {
        let (mut field, mut mgr) = setup();
        // Swim upstream (negative y) far past the seeded window
        let y = -100.0 * SEGMENT_HEIGHT;
        mgr.extend(y, &mut field);
        let (low, _) = mgr.window();
        assert_eq!(low, segment_index(y) - VISIBLE_RANGE);
        assert!(field.contains(segment_index(y)));
        assert!(field.contains(segment_index(y) - VISIBLE_RANGE));
    }

    #[test]
    fn test_retirement_is_throttled_and_bounded() {
        let (mut field, mut mgr) = setup();
        // A short hop does not trigger retirement
        mgr.extend(-(CLEANUP_INTERVAL as f32 / 2.0) * SEGMENT_HEIGHT, &mut field);
        let count_before = field.sample_count();
        assert!(count_before > (2 * VISIBLE_RANGE) as usize);

        // Crossing the cleanup interval drops everything beyond 2.5R
        let far = -(CLEANUP_INTERVAL as f32 * 4.0) * SEGMENT_HEIGHT;
        mgr.extend(far, &mut field);
        let current = segment_index(far);
        let limit = (VISIBLE_RANGE as f32 * RETIRE_FACTOR) as i64;
        assert!(!field.contains(0));
        assert!(field.contains(current));
        assert!(field.sample_count() <= (2 * limit + 1) as usize);
    }

    #[test]
    fn test_generated_and_retired_changes_pair_up() {
        let (mut field, mut mgr) = setup();
        mgr.changes.clear();
        let far = -(CLEANUP_INTERVAL as f32 * 4.0) * SEGMENT_HEIGHT;
        mgr.extend(far, &mut field);
        let generated = mgr
            .changes
            .iter()
            .filter(|c| matches!(c, BankChange::Generated { .. }))
            .count();
        let retired = mgr
            .changes
            .iter()
            .filter(|c| matches!(c, BankChange::Retired { .. }))
            .count();
        assert!(generated > 0);
        assert!(retired > 0);
    }
}
