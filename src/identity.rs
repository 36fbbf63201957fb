//! Identity — the signed-in user as the identity provider reports it.
//!
//! Nothing here authenticates anyone. The session only needs a stable user id
//! (to tag writes and key the cursor set) and something printable to show next
//! to the user's cursor.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{Cursor, cursor_color};

const GUEST_NAME: &str = "Guest";

/// A signed-in user. Absence of an `Identity` means the client is a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: None, email: None, photo_url: None }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Label shown next to this user's cursor: display name, then email, then
    /// `"Guest"`. Blank values are skipped.
    #[must_use]
    pub fn cursor_name(&self) -> &str {
        [self.display_name.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(GUEST_NAME)
    }

    #[must_use]
    pub fn cursor_color(&self) -> &'static str {
        cursor_color(&self.id)
    }

    /// This user's cursor record at a board point.
    #[must_use]
    pub fn cursor_at(&self, at: Point) -> Cursor {
        Cursor {
            id: self.id.clone(),
            name: self.cursor_name().to_owned(),
            color: self.cursor_color().to_owned(),
            x: at.x,
            y: at.y,
        }
    }
}
