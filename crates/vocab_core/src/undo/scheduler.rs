//! Deferred deletion with an undo grace window.
//!
//! # Responsibility
//! - Hold swiped entries until their grace window elapses.
//! - Cancel a pending deletion when undo arrives in time.
//! - Commit expired deletions through a caller-supplied action.
//!
//! # Invariants
//! - Each ticket resolves exactly once: restored, committed, or failed.
//! - An undone entry is never passed to the commit action.
//! - Undo after the deadline is refused even if the commit has not run yet,
//!   so the entry is still committed on the next `commit_expired`.

use super::clock::{Clock, SystemClock};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Grace window matching a long transient notification (2.75 s).
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_millis(2750);

/// Cancellation token for one pending deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeleteTicket(Uuid);

impl DeleteTicket {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a ticket previously rendered with `Display`.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Display for DeleteTicket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an undo request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoError {
    /// Ticket was never issued, or already restored/committed.
    UnknownTicket(DeleteTicket),
    /// Grace window is over; the deletion will be committed.
    WindowElapsed(DeleteTicket),
}

impl Display for UndoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTicket(ticket) => write!(f, "no pending deletion for ticket {ticket}"),
            Self::WindowElapsed(ticket) => write!(f, "undo window elapsed for ticket {ticket}"),
        }
    }
}

impl Error for UndoError {}

/// Entry handed back by a successful undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored<T> {
    pub item: T,
    /// Position the entry had in its list when it was swiped.
    pub position: usize,
}

/// Result of committing one expired deletion.
#[derive(Debug)]
pub enum CommitOutcome<T, E> {
    Deleted {
        ticket: DeleteTicket,
        item: T,
    },
    /// Commit action failed; the deletion is not retried.
    Failed {
        ticket: DeleteTicket,
        item: T,
        error: E,
    },
}

impl<T, E> CommitOutcome<T, E> {
    pub fn ticket(&self) -> DeleteTicket {
        match self {
            Self::Deleted { ticket, .. } | Self::Failed { ticket, .. } => *ticket,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

#[derive(Debug)]
struct PendingDelete<T> {
    ticket: DeleteTicket,
    item: T,
    position: usize,
    deadline: Instant,
}

/// Queue of swiped entries waiting for their grace window to elapse.
#[derive(Debug)]
pub struct DeletionScheduler<T, C: Clock = SystemClock> {
    clock: C,
    window: Duration,
    pending: Vec<PendingDelete<T>>,
}

impl<T> DeletionScheduler<T, SystemClock> {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(SystemClock, window)
    }
}

impl<T, C: Clock> DeletionScheduler<T, C> {
    pub fn with_clock(clock: C, window: Duration) -> Self {
        Self {
            clock,
            window,
            pending: Vec::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Starts the grace window for `item`, which sat at `position` in its list.
    pub fn schedule(&mut self, item: T, position: usize) -> DeleteTicket {
        let ticket = DeleteTicket::new();
        self.pending.push(PendingDelete {
            ticket,
            item,
            position,
            deadline: self.clock.now() + self.window,
        });
        debug!(
            "event=delete_schedule module=undo status=ok pending={} window_ms={}",
            self.pending.len(),
            self.window.as_millis()
        );
        ticket
    }

    /// Cancels a pending deletion and hands the entry back.
    pub fn undo(&mut self, ticket: DeleteTicket) -> Result<Restored<T>, UndoError> {
        let index = self
            .pending
            .iter()
            .position(|pending| pending.ticket == ticket)
            .ok_or(UndoError::UnknownTicket(ticket))?;
        if self.pending[index].deadline <= self.clock.now() {
            return Err(UndoError::WindowElapsed(ticket));
        }

        let pending = self.pending.remove(index);
        debug!("event=delete_undo module=undo status=ok pending={}", self.pending.len());
        Ok(Restored {
            item: pending.item,
            position: pending.position,
        })
    }

    pub fn is_pending(&self, ticket: DeleteTicket) -> bool {
        self.pending.iter().any(|pending| pending.ticket == ticket)
    }

    /// Entries still waiting, oldest first.
    pub fn pending_items(&self) -> impl Iterator<Item = &T> {
        self.pending.iter().map(|pending| &pending.item)
    }

    /// Ticket of the first pending entry matching `pred`.
    pub fn find_pending(&self, mut pred: impl FnMut(&T) -> bool) -> Option<DeleteTicket> {
        self.pending
            .iter()
            .find(|pending| pred(&pending.item))
            .map(|pending| pending.ticket)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest deadline among pending entries, for arming a host timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|pending| pending.deadline).min()
    }

    /// Commits every entry whose window has elapsed.
    pub fn commit_expired<E: Display>(
        &mut self,
        commit: impl FnMut(&T) -> Result<(), E>,
    ) -> Vec<CommitOutcome<T, E>> {
        let now = self.clock.now();
        let (expired, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|pending| pending.deadline <= now);
        self.pending = waiting;
        run_commits(expired, commit)
    }

    /// Commits every pending entry immediately, e.g. when its screen closes
    /// and the undo notification disappears early.
    pub fn commit_all<E: Display>(
        &mut self,
        commit: impl FnMut(&T) -> Result<(), E>,
    ) -> Vec<CommitOutcome<T, E>> {
        run_commits(std::mem::take(&mut self.pending), commit)
    }
}

fn run_commits<T, E: Display>(
    expired: Vec<PendingDelete<T>>,
    mut commit: impl FnMut(&T) -> Result<(), E>,
) -> Vec<CommitOutcome<T, E>> {
    expired
        .into_iter()
        .map(|pending| match commit(&pending.item) {
            Ok(()) => {
                debug!("event=delete_commit module=undo status=ok");
                CommitOutcome::Deleted {
                    ticket: pending.ticket,
                    item: pending.item,
                }
            }
            Err(err) => {
                error!(
                    "event=delete_commit module=undo status=error error={}",
                    err
                );
                CommitOutcome::Failed {
                    ticket: pending.ticket,
                    item: pending.item,
                    error: err,
                }
            }
        })
        .collect()
}
