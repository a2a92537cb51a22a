//! Visible list with swipe-to-delete and positional undo.
//!
//! # Invariants
//! - A swiped entry disappears from `items()` at once; storage is only
//!   touched when its window expires.
//! - Undo reinserts at the original index, clamped to the current length.

use super::clock::{Clock, SystemClock};
use super::scheduler::{CommitOutcome, DeleteTicket, DeletionScheduler, UndoError};
use std::fmt::Display;

/// Items shown to the user plus the deletions still awaiting commit.
#[derive(Debug)]
pub struct UndoableList<T, C: Clock = SystemClock> {
    items: Vec<T>,
    scheduler: DeletionScheduler<T, C>,
}

impl<T, C: Clock> UndoableList<T, C> {
    pub fn new(items: Vec<T>, scheduler: DeletionScheduler<T, C>) -> Self {
        Self { items, scheduler }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn scheduler(&self) -> &DeletionScheduler<T, C> {
        &self.scheduler
    }

    /// Replaces visible items after a reload; pending deletions are kept.
    pub fn replace_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes the entry at `index` from view and starts its grace window.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn swipe_delete(&mut self, index: usize) -> Option<DeleteTicket> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        Some(self.scheduler.schedule(item, index))
    }

    /// Restores a swiped entry and returns the index it now occupies.
    pub fn undo(&mut self, ticket: DeleteTicket) -> Result<usize, UndoError> {
        let restored = self.scheduler.undo(ticket)?;
        let index = restored.position.min(self.items.len());
        self.items.insert(index, restored.item);
        Ok(index)
    }

    pub fn commit_expired<E: Display>(
        &mut self,
        commit: impl FnMut(&T) -> Result<(), E>,
    ) -> Vec<CommitOutcome<T, E>> {
        self.scheduler.commit_expired(commit)
    }

    pub fn commit_all<E: Display>(
        &mut self,
        commit: impl FnMut(&T) -> Result<(), E>,
    ) -> Vec<CommitOutcome<T, E>> {
        self.scheduler.commit_all(commit)
    }
}
