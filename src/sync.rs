//! Sync controller — debounced content push and snapshot pull.
//!
//! DESIGN
//! ======
//! Pure state, no I/O. The session owns one controller per workspace
//! attachment and asks it two questions: "should this local change schedule a
//! push?" and "is a push due now?". Time is passed in, so the debounce logic
//! is testable without a runtime.
//!
//! ECHO SUPPRESSION
//! ================
//! Every write comes back through the subscription. Applying that snapshot
//! changes local state, which would look like a local edit and schedule a push
//! of the same content. While a remote snapshot is being applied the
//! controller is suppressed and local-change notifications are ignored. The
//! session lifts suppression on its next loop iteration.
//!
//! PENDING PUSH
//! ============
//! While a content push is pending, a snapshot only brings in the remote
//! cursors. The local collections are newer than the document and the push
//! is about to overwrite the document's board with them anyway; replacing
//! them here would lose every edit made since the last push, including the
//! ones echoed back by this client's own presence write. Once the push has
//! gone out, snapshots replace the whole board again.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::consts::DEFAULT_CONTENT_DEBOUNCE_MS;
use crate::engine::EngineCore;
use crate::store::WorkspaceDoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Local-only: nothing is pushed and no snapshots are applied.
    Detached,
    Attached,
}

#[derive(Debug, Clone)]
pub struct SyncController {
    state: SyncState,
    debounce: Duration,
    suppress_echo: bool,
    pending_push: Option<Instant>,
}

impl SyncController {
    #[must_use]
    pub fn detached() -> Self {
        Self {
            state: SyncState::Detached,
            debounce: Duration::from_millis(DEFAULT_CONTENT_DEBOUNCE_MS),
            suppress_echo: false,
            pending_push: None,
        }
    }

    #[must_use]
    pub fn attached(debounce: Duration) -> Self {
        Self { state: SyncState::Attached, debounce, suppress_echo: false, pending_push: None }
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state == SyncState::Attached
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppress_echo
    }

    /// A remote snapshot is about to replace local state.
    pub fn begin_remote_apply(&mut self) {
        self.suppress_echo = true;
    }

    pub fn end_remote_apply(&mut self) {
        self.suppress_echo = false;
    }

    /// A local collection changed. Restarts the debounce window unless the
    /// change is the echo of a remote snapshot. Returns whether a push is now
    /// scheduled because of it.
    pub fn note_local_change(&mut self, now: Instant) -> bool {
        if !self.is_attached() || self.suppress_echo {
            return false;
        }
        self.pending_push = Some(now + self.debounce);
        true
    }

    /// When the pending push is due, if one is scheduled.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_push
    }

    /// Consume the pending push if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending_push {
            Some(at) if at <= now => {
                self.pending_push = None;
                true
            }
            _ => false,
        }
    }

    /// Stop syncing. Any pending push is dropped.
    pub fn detach(&mut self) {
        self.state = SyncState::Detached;
        self.pending_push = None;
        self.suppress_echo = false;
    }
}

/// What a subscription delivery did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotApply {
    /// Detached, missing document, or no board in it. Local state untouched.
    Ignored,
    /// All six collections and the cursor set were replaced.
    Replaced,
    /// A local push is pending: only the cursor set was replaced.
    CursorsOnly,
}

/// Apply one subscription delivery to the engine.
///
/// A missing workspace or a document without a board leaves local state
/// alone, as does a detached controller.
pub fn apply_snapshot(engine: &mut EngineCore, sync: &mut SyncController, doc: Option<WorkspaceDoc>) -> SnapshotApply {
    if !sync.is_attached() {
        return SnapshotApply::Ignored;
    }
    let Some(doc) = doc else {
        warn!("workspace document missing; keeping local board");
        return SnapshotApply::Ignored;
    };
    let Some(board) = doc.board else {
        debug!("workspace document has no board; ignored");
        return SnapshotApply::Ignored;
    };
    sync.begin_remote_apply();
    if sync.deadline().is_some() {
        debug!("content push pending; taking remote cursors only");
        engine.board.cursors = board.cursors;
        return SnapshotApply::CursorsOnly;
    }
    engine.load_snapshot(board);
    SnapshotApply::Replaced
}
