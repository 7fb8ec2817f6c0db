//! History manager: linear undo/redo over owned document snapshots.
//!
//! The stack always holds at least one snapshot (the session's starting document)
//! and a cursor pointing at the snapshot currently shown. Pushing while the cursor
//! is behind the newest snapshot discards the redo branch; branches are never kept.
//!
//! Snapshots are owned values (`T: Clone`), never references into the live
//! document, so a past state cannot change after it was recorded.

/// Undo/redo stack generic over any cloneable document type.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    cursor: usize,
    /// Maximum retained snapshots; `None` keeps everything.
    limit: Option<usize>,
}

impl<T: Clone> History<T> {
    /// History that keeps at most `limit` snapshots, dropping the oldest first.
    /// A limit of 0 means unbounded.
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            limit: (limit > 0).then_some(limit),
        }
    }

    /// Records a completed edit. Anything after the cursor is discarded first.
    pub fn push(&mut self, snapshot: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;

        if let Some(limit) = self.limit {
            let overflow = self.snapshots.len().saturating_sub(limit);
            if overflow > 0 {
                self.snapshots.drain(..overflow);
                self.cursor -= overflow;
            }
        }
    }

    /// Steps back one snapshot. Returns `None` (and changes nothing) at the oldest.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor].clone())
    }

    /// Steps forward one snapshot. Returns `None` (and changes nothing) at the newest.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.snapshots[self.cursor].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &T {
        &self.snapshots[self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::{ExperiencePatch, PersonalField};
    use crate::document::{apply_all, CVDocument, EditCommand};

    impl<T> History<T> {
        fn unbounded(initial: T) -> Self {
            Self {
                snapshots: vec![initial],
                cursor: 0,
                limit: None,
            }
        }

        fn len(&self) -> usize {
            self.snapshots.len()
        }

        fn cursor(&self) -> usize {
            self.cursor
        }
    }

    #[test]
    fn test_new_history_cannot_move() {
        let mut history = History::unbounded(0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::unbounded(0);
        for n in 1..=5 {
            history.push(n);
        }

        for _ in 0..5 {
            assert!(history.undo().is_some());
        }
        assert_eq!(*history.current(), 0);
        assert_eq!(history.undo(), None);

        for _ in 0..5 {
            assert!(history.redo().is_some());
        }
        assert_eq!(*history.current(), 5);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_push_after_undo_discards_branch() {
        let mut history = History::unbounded("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.undo(), Some("b"));

        history.push("d");
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some("b"));
        assert_eq!(history.undo(), Some("a"));
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut history = History::unbounded(1);
        history.push(2);
        history.undo();
        history.undo();
        history.undo();
        assert_eq!(history.cursor(), 0);
        history.redo();
        history.redo();
        assert_eq!(history.cursor(), 1);
        assert!(history.cursor() < history.len());
    }

    #[test]
    fn test_limit_drops_oldest_snapshots() {
        let mut history = History::with_limit(0, 3);
        for n in 1..=5 {
            history.push(n);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(*history.current(), 5);
        assert_eq!(history.undo(), Some(4));
        assert_eq!(history.undo(), Some(3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut history = History::with_limit(0, 0);
        for n in 1..=200 {
            history.push(n);
        }
        assert_eq!(history.len(), 201);
    }

    #[test]
    fn test_snapshots_are_isolated_from_later_edits() {
        let start = CVDocument::default();
        let mut history = History::unbounded(start.clone());
        let mut live = start.set_summary("first");
        history.push(live.clone());

        live.summary.push_str(" and more");
        assert_eq!(history.current().summary, "first");
    }

    #[test]
    fn test_john_doe_scenario() {
        let empty = CVDocument::default();
        let mut history = History::unbounded(empty.clone());

        let snapshot1 = empty.set_personal_field(PersonalField::FullName, "John Doe");
        history.push(snapshot1.clone());

        let snapshot2 = apply_all(
            &snapshot1,
            &[
                EditCommand::AddExperience,
                EditCommand::UpdateExperience {
                    index: 0,
                    patch: ExperiencePatch {
                        job_title: Some("Engineer".into()),
                        company: Some("Acme".into()),
                        ..Default::default()
                    },
                },
            ],
        );
        history.push(snapshot2.clone());

        let undone = history.undo().unwrap();
        assert_eq!(undone.personal.full_name, "John Doe");
        assert!(undone.experience.is_empty());

        let redone = history.redo().unwrap();
        assert_eq!(redone, snapshot2);
        assert_eq!(redone.experience.len(), 1);
        assert_eq!(redone.experience[0].job_title, "Engineer");
        assert_eq!(redone.experience[0].company, "Acme");
    }
}
