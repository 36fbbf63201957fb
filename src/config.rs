//! Configuration — debounce windows and the attach/detach decision.
//!
//! DESIGN
//! ======
//! Tuning knobs come from environment variables with compiled-in defaults, so
//! an embedding host can adjust sync latency without code changes. Whether a
//! session syncs at all is decided once, up front, from what the host hands
//! over: a store, a signed-in user and a real (non-demo) workspace.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::consts::{DEFAULT_CONTENT_DEBOUNCE_MS, DEFAULT_PRESENCE_DEBOUNCE_MS, DEMO_WORKSPACE_ID};
use crate::identity::Identity;
use crate::store::DocumentStore;

/// Debounce windows for the two outbound channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last content change before the board is pushed.
    pub content_debounce: Duration,
    /// Quiet period after the last pointer move before cursors are pushed.
    pub presence_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            content_debounce: Duration::from_millis(DEFAULT_CONTENT_DEBOUNCE_MS),
            presence_debounce: Duration::from_millis(DEFAULT_PRESENCE_DEBOUNCE_MS),
        }
    }
}

impl SyncConfig {
    /// Load from `BOARD_CONTENT_DEBOUNCE_MS` and `BOARD_PRESENCE_DEBOUNCE_MS`,
    /// falling back to the defaults for missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            content_debounce: Duration::from_millis(env_parse("BOARD_CONTENT_DEBOUNCE_MS", DEFAULT_CONTENT_DEBOUNCE_MS)),
            presence_debounce: Duration::from_millis(env_parse(
                "BOARD_PRESENCE_DEBOUNCE_MS",
                DEFAULT_PRESENCE_DEBOUNCE_MS,
            )),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Why a session runs without sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReason {
    /// No document store was supplied.
    NotConfigured,
    /// Nobody is signed in.
    Guest,
    /// The shared demo workspace is always local-only.
    DemoWorkspace,
}

/// Everything a session needs to start.
#[derive(Clone)]
pub struct SessionOptions {
    pub workspace_id: String,
    pub identity: Option<Identity>,
    pub store: Option<Arc<dyn DocumentStore>>,
    pub config: SyncConfig,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("workspace_id", &self.workspace_id)
            .field("identity", &self.identity)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .field("config", &self.config)
            .finish()
    }
}

impl SessionOptions {
    #[must_use]
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self { workspace_id: workspace_id.into(), identity: None, store: None, config: SyncConfig::default() }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// `None` if the session should attach, else the first reason it cannot.
    #[must_use]
    pub fn detach_reason(&self) -> Option<DetachReason> {
        if self.store.is_none() {
            Some(DetachReason::NotConfigured)
        } else if self.identity.is_none() {
            Some(DetachReason::Guest)
        } else if self.workspace_id == DEMO_WORKSPACE_ID {
            Some(DetachReason::DemoWorkspace)
        } else {
            None
        }
    }
}
