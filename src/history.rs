use std::collections::VecDeque;

use crate::snapshot::Snapshot;

/// Number of snapshots kept when no other depth is configured
pub const DEFAULT_HISTORY_DEPTH: usize = 20;

/// A cursor move issued by undo or redo, waiting for its snapshot to be restored
#[derive(Debug, Clone)]
pub struct Restore {
    /// Cursor position before the move
    pub from: usize,
    /// Cursor position after the move
    pub to: usize,
    /// The snapshot the surface has to show once the move lands
    pub snapshot: Snapshot,
}

/// Capped timeline of surface snapshots with a cursor on the active one.
///
/// Inserting while the cursor is behind the end discards the redo branch.
/// Once the timeline is full the oldest snapshot is evicted first.
#[derive(Debug)]
pub struct History {
    timeline: VecDeque<Snapshot>,
    current_step: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Creates an empty history keeping at most `capacity` snapshots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            timeline: VecDeque::with_capacity(capacity),
            current_step: 0,
            capacity,
        }
    }

    /// Record a new snapshot and move the cursor onto it
    pub fn snapshot(&mut self, snapshot: Snapshot) {
        if !self.timeline.is_empty() {
            let discarded = self.timeline.len() - self.current_step - 1;
            if discarded > 0 {
                log::debug!("Discarding {} redo snapshot(s)", discarded);
            }
            self.timeline.truncate(self.current_step + 1);
        }

        self.timeline.push_back(snapshot);
        while self.timeline.len() > self.capacity {
            if let Some(evicted) = self.timeline.pop_front() {
                log::debug!("History full, evicted snapshot {}", evicted.id());
            }
        }
        self.current_step = self.timeline.len() - 1;
    }

    /// Step the cursor back. Returns `None` and changes nothing if there is nothing to undo.
    pub fn undo(&mut self) -> Option<Restore> {
        if !self.can_undo() {
            return None;
        }
        self.move_to(self.current_step - 1)
    }

    /// Step the cursor forward. Returns `None` and changes nothing if there is nothing to redo.
    pub fn redo(&mut self) -> Option<Restore> {
        if !self.can_redo() {
            return None;
        }
        self.move_to(self.current_step + 1)
    }

    /// Put the cursor back where a failed restore found it
    pub fn rollback(&mut self, restore: &Restore) {
        if self.current_step == restore.to && restore.from < self.timeline.len() {
            log::debug!("Rolling history back from {} to {}", restore.to, restore.from);
            self.current_step = restore.from;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_step + 1 < self.timeline.len()
    }

    /// The snapshot under the cursor
    pub fn current(&self) -> Option<&Snapshot> {
        self.timeline.get(self.current_step)
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.timeline.iter()
    }

    fn move_to(&mut self, step: usize) -> Option<Restore> {
        let snapshot = self.timeline.get(step)?.clone();
        let restore = Restore {
            from: self.current_step,
            to: step,
            snapshot,
        };
        self.current_step = step;
        Some(restore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn snap() -> Snapshot {
        Snapshot::capture(&RgbaImage::new(1, 1)).unwrap()
    }

    fn history_with(count: usize, capacity: usize) -> (History, Vec<Snapshot>) {
        let mut history = History::new(capacity);
        let snapshots: Vec<_> = (0..count).map(|_| snap()).collect();
        for snapshot in &snapshots {
            history.snapshot(snapshot.clone());
        }
        (history, snapshots)
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_DEPTH);
    }

    #[test]
    fn test_can_undo_tracks_cursor() {
        for strokes in 0..6 {
            let (mut history, _) = history_with(strokes + 1, 20);
            while history.undo().is_some() {
                assert_eq!(history.can_undo(), history.current_step() != 0);
            }
            assert_eq!(history.current_step(), 0);
            assert!(!history.can_undo());
        }
    }

    #[test]
    fn test_undo_redo_move_one_step() {
        let (mut history, snapshots) = history_with(3, 20);
        assert_eq!(history.current_step(), 2);

        let restore = history.undo().unwrap();
        assert_eq!((restore.from, restore.to), (2, 1));
        assert_eq!(restore.snapshot, snapshots[1]);
        assert!(history.can_redo());

        let restore = history.redo().unwrap();
        assert_eq!((restore.from, restore.to), (1, 2));
        assert_eq!(restore.snapshot, snapshots[2]);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current_step(), 2);
    }

    #[test]
    fn test_undo_at_start_changes_nothing() {
        let (mut history, snapshots) = history_with(1, 20);
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_step(), 0);
        assert_eq!(history.current(), Some(&snapshots[0]));
    }

    #[test]
    fn test_snapshot_after_undo_truncates_redo_branch() {
        let (mut history, snapshots) = history_with(6, 20);
        for _ in 0..3 {
            history.undo();
        }
        let branch = snap();
        history.snapshot(branch.clone());

        assert_eq!(history.len(), 4);
        assert_eq!(history.current_step(), 3);
        assert!(!history.can_redo());
        let kept: Vec<_> = history.snapshots().cloned().collect();
        assert_eq!(kept, vec![snapshots[0].clone(), snapshots[1].clone(), snapshots[2].clone(), branch]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (mut history, snapshots) = history_with(25, 20);
        assert_eq!(history.len(), 20);
        assert_eq!(history.current_step(), 19);

        let mut last = None;
        while let Some(restore) = history.undo() {
            last = Some(restore.snapshot);
        }
        assert_eq!(last, Some(snapshots[5].clone()));
        assert!(history.snapshots().all(|s| !snapshots[..5].contains(s)));
    }

    #[test]
    fn test_eviction_after_undo_keeps_cursor_on_new_snapshot() {
        let (mut history, _) = history_with(3, 3);
        history.undo();
        let newest = snap();
        history.snapshot(newest.clone());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&newest));

        history.snapshot(snap());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_step(), 2);
    }

    #[test]
    fn test_rollback_restores_previous_cursor() {
        let (mut history, _) = history_with(3, 20);
        let restore = history.undo().unwrap();
        history.rollback(&restore);
        assert_eq!(history.current_step(), 2);

        // A stale rollback after the cursor moved on does nothing.
        let restore = history.undo().unwrap();
        history.redo();
        history.rollback(&restore);
        assert_eq!(history.current_step(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let (history, snapshots) = history_with(3, 0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&snapshots[2]));
    }
}
