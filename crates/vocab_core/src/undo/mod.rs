//! Swipe-to-delete with a timed undo window.
//!
//! # Responsibility
//! - Defer persistent deletes until the undo window elapses.
//! - Restore swiped entries at their original position on undo.
//!
//! The host drives time: it calls `commit_expired` from its own timer
//! (armed with `next_deadline`) and never blocks on this module.

pub mod clock;
pub mod display_list;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display_list::UndoableList;
pub use scheduler::{
    CommitOutcome, DeleteTicket, DeletionScheduler, Restored, UndoError, DEFAULT_UNDO_WINDOW,
};
