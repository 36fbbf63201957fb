//! Presence broadcaster — the local user's live cursor.
//!
//! DESIGN
//! ======
//! Cursor positions are ephemeral and chatty. Every pointer move updates the
//! local cursor entry right away so it is in the next content push too, but
//! the cursor-only write runs on its own, shorter debounce. That way presence
//! never waits on the content window and a burst of moves costs one write.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::time::Duration;

use tokio::time::Instant;

use crate::camera::Point;
use crate::doc::CursorSet;
use crate::identity::Identity;

#[derive(Debug, Clone)]
pub struct PresenceBroadcaster {
    user: Identity,
    debounce: Duration,
    pending_push: Option<Instant>,
}

impl PresenceBroadcaster {
    #[must_use]
    pub fn new(user: Identity, debounce: Duration) -> Self {
        Self { user, debounce, pending_push: None }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Record the local pointer at `at` and restart the presence window.
    pub fn on_pointer_move(&mut self, cursors: &mut CursorSet, at: Point, now: Instant) {
        cursors.upsert(self.user.cursor_at(at));
        self.pending_push = Some(now + self.debounce);
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_push
    }

    /// Consume the pending cursor push if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending_push {
            Some(at) if at <= now => {
                self.pending_push = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.pending_push = None;
    }
}
