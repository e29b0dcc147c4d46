//! Bounded undo/redo log.

use bevy::log::debug;
use std::collections::VecDeque;

use super::HISTORY_LIMIT;

/// Undo and redo lists, most recent entry first.
///
/// `undo` never holds more than `limit` entries; the oldest are dropped
/// silently when a push would exceed it. `redo` only fills through
/// [`ActionLog::pop_undo`] and is emptied by every [`ActionLog::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLog<T> {
    undo: VecDeque<T>,
    redo: VecDeque<T>,
    limit: usize,
}

impl<T> Default for ActionLog<T> {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl<T> ActionLog<T> {
    /// Create an empty log keeping at most `limit` undo entries (minimum 1)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the bound, dropping the oldest undo entries if necessary
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo.len() > self.limit {
            let dropped = self.undo.len() - self.limit;
            self.undo.truncate(self.limit);
            debug!("History limit reached, dropped {} oldest entries", dropped);
        }
    }

    /// Record a new entry. Clears the redo list.
    pub fn push(&mut self, entry: T) {
        self.undo.push_front(entry);
        self.trim();
        self.redo.clear();
    }

    /// Move the most recent undo entry to the head of the redo list
    pub fn pop_undo(&mut self) -> Option<&T> {
        let entry = self.undo.pop_front()?;
        self.redo.push_front(entry);
        self.redo.front()
    }

    /// Move the most recent redo entry to the head of the undo list
    pub fn pop_redo(&mut self) -> Option<&T> {
        let entry = self.redo.pop_front()?;
        self.undo.push_front(entry);
        self.undo.front()
    }

    pub fn peek_undo(&self) -> Option<&T> {
        self.undo.front()
    }

    pub fn peek_redo(&self) -> Option<&T> {
        self.redo.front()
    }

    /// Drop all entries (project closed or replaced)
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// True when nothing has been recorded since the last clear
    pub fn is_pristine(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Undo entries, most recent first
    pub fn undo_entries(&self) -> impl Iterator<Item = &T> {
        self.undo.iter()
    }

    /// Redo entries, most recent first
    pub fn redo_entries(&self) -> impl Iterator<Item = &T> {
        self.redo.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push() {
        let mut log = ActionLog::default();
        assert!(!log.can_undo());

        log.push(1);
        assert!(log.can_undo());
        assert_eq!(log.undo_len(), 1);
    }

    #[test]
    fn test_entries_are_most_recent_first() {
        let mut log = ActionLog::default();
        log.push(1);
        log.push(2);
        log.push(3);
        let entries: Vec<_> = log.undo_entries().copied().collect();
        assert_eq!(entries, vec![3, 2, 1]);
    }

    #[test]
    fn test_pop_undo_moves_head_to_redo() {
        let mut log = ActionLog::default();
        log.push(1);
        log.push(2);

        assert_eq!(log.pop_undo(), Some(&2));
        assert_eq!(log.peek_undo(), Some(&1));
        assert_eq!(log.peek_redo(), Some(&2));

        assert_eq!(log.pop_undo(), Some(&1));
        let redo: Vec<_> = log.redo_entries().copied().collect();
        assert_eq!(redo, vec![1, 2]);
    }

    #[test]
    fn test_pop_redo_moves_head_to_undo() {
        let mut log = ActionLog::default();
        log.push(1);
        log.pop_undo();

        assert_eq!(log.pop_redo(), Some(&1));
        assert_eq!(log.undo_len(), 1);
        assert_eq!(log.redo_len(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut log = ActionLog::default();
        log.push(1);
        log.push(2);
        log.pop_undo();
        assert!(log.can_redo());

        log.push(3);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_max_size() {
        let mut log = ActionLog::default();
        for i in 0..150 {
            log.push(i);
        }

        assert_eq!(log.undo_len(), HISTORY_LIMIT);
        // The 100 most recent, newest first
        let entries: Vec<_> = log.undo_entries().copied().collect();
        let expected: Vec<_> = (50..150).rev().collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_empty_pops_leave_state_unchanged() {
        let mut log: ActionLog<i32> = ActionLog::default();
        log.push(1);
        log.pop_undo();
        log.pop_redo();
        let snapshot = log.clone();

        // undo list holds one entry, redo is empty
        assert_eq!(log.pop_redo(), None);
        assert_eq!(log, snapshot);

        log.pop_undo();
        let snapshot = log.clone();
        assert_eq!(log.pop_undo(), None);
        assert_eq!(log, snapshot);
    }

    #[test]
    fn test_pristine() {
        let mut log = ActionLog::default();
        assert!(log.is_pristine());

        log.push(1);
        assert!(!log.is_pristine());

        log.pop_undo();
        assert!(!log.is_pristine(), "an entry on the redo list is still history");

        log.clear();
        assert!(log.is_pristine());
    }

    #[test]
    fn test_set_limit_truncates_oldest() {
        let mut log = ActionLog::default();
        for i in 0..10 {
            log.push(i);
        }
        log.set_limit(3);

        let entries: Vec<_> = log.undo_entries().copied().collect();
        assert_eq!(entries, vec![9, 8, 7]);
        assert_eq!(log.limit(), 3);
    }

    #[test]
    fn test_zero_limit_keeps_one_entry() {
        let mut log = ActionLog::with_limit(0);
        log.push(1);
        log.push(2);
        assert_eq!(log.undo_len(), 1);
        assert_eq!(log.peek_undo(), Some(&2));
    }
}
