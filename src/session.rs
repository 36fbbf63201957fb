//! Session — one client's attachment to one workspace.
//!
//! DESIGN
//! ======
//! A session is a single tokio task that owns the engine, the sync controller
//! and the presence broadcaster. Everything that can change board state
//! arrives through one `select!` loop:
//! - UI events from the host (pointer, tool, text, view)
//! - snapshots from the workspace subscription
//! - the content and presence debounce deadlines
//!
//! Because exactly one branch runs per iteration, board state needs no lock.
//! After every iteration the current view is published on a `watch` channel;
//! live stroke segments go out on their own channel so the host can paint
//! them without waiting for a full repaint.
//!
//! LIFECYCLE
//! =========
//! 1. Spawn → decide Attached vs Detached from the options
//! 2. Attached → subscribe and apply the current document before any UI event
//! 3. Loop until `Detach` is sent or the handle is dropped
//! 4. Exit → pending pushes are discarded, the subscription is dropped
//!
//! ERROR HANDLING
//! ==============
//! Document writes run as spawned tasks. A failed write is logged and
//! forgotten: the session stays attached and the next local change pushes the
//! whole board again. Unreadable snapshots are logged and skipped.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::camera::{Camera, Point};
use crate::config::SessionOptions;
use crate::doc::{BoardPath, BoardState, EntityRef};
use crate::engine::{Action, EngineCore};
use crate::hit::Hit;
use crate::identity::Identity;
use crate::input::{Button, Tool, UiState};
use crate::presence::PresenceBroadcaster;
use crate::render::{self, PaintCommand, Scene};
use crate::store::{DocumentStore, Snapshot, StoreError, Subscription};
use crate::sync::{self, SnapshotApply, SyncController};

const EVENT_BUFFER: usize = 256;
const LIVE_PAINT_BUFFER: usize = 256;

// =============================================================================
// TYPES
// =============================================================================

/// Input from the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PointerDown { at: Point, button: Button },
    /// Pointer-down the host already resolved to an entity's hit region.
    EntityPointerDown { hit: Hit, at: Point, button: Button },
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    SetTool(Tool),
    SetStroke(String),
    SetText { target: EntityRef, text: String },
    ZoomBy(f64),
    ResetView,
    /// Stop syncing and end the session.
    Detach,
}

/// Everything the host needs to repaint, as of the last processed event.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub board: BoardState,
    pub camera: Camera,
    pub ui: UiState,
    /// The path being drawn, not yet committed to the board.
    pub active_path: Option<BoardPath>,
    pub attached: bool,
    pub local_user: Option<String>,
}

impl SessionView {
    /// Project this view for painting, leaving out the local user's cursor.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::project(&self.board, &self.camera, &self.ui, self.local_user.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session closed")]
    Closed,
    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// =============================================================================
// HANDLE
// =============================================================================

/// Host-side handle. Dropping it ends the session.
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    view: watch::Receiver<SessionView>,
    live_paint: mpsc::Receiver<Vec<PaintCommand>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue a UI event.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events.send(event).await.map_err(|_| SessionError::Closed)
    }

    /// The most recently published view.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified whenever the view changes.
    #[must_use]
    pub fn subscribe_view(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Next batch of live paint commands, if one is waiting.
    pub fn try_live_paint(&mut self) -> Option<Vec<PaintCommand>> {
        match self.live_paint.try_recv() {
            Ok(commands) => Some(commands),
            Err(_) => None,
        }
    }

    /// Wait for the next batch of live paint commands.
    pub async fn live_paint(&mut self) -> Option<Vec<PaintCommand>> {
        self.live_paint.recv().await
    }

    /// Detach and wait for the session task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Join`] if the session task panicked.
    pub async fn detach(self) -> Result<(), SessionError> {
        if self.events.send(SessionEvent::Detach).await.is_err() {
            debug!("session already closed");
        }
        self.task.await?;
        Ok(())
    }
}

/// Start a session for `options.workspace_id`. Must be called from within a
/// tokio runtime.
#[must_use]
pub fn spawn_session(options: SessionOptions) -> SessionHandle {
    let reason = options.detach_reason();
    let SessionOptions { workspace_id, identity, store, config } = options;

    let sync = match reason {
        None => SyncController::attached(config.content_debounce),
        Some(reason) => {
            info!(workspace_id = %workspace_id, reason = ?reason, "session running detached");
            SyncController::detached()
        }
    };
    let presence = match (&identity, sync.is_attached()) {
        (Some(user), true) => Some(PresenceBroadcaster::new(user.clone(), config.presence_debounce)),
        _ => None,
    };

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let (live_tx, live_rx) = mpsc::channel(LIVE_PAINT_BUFFER);
    let engine = EngineCore::new();
    let (view_tx, view_rx) = watch::channel(view_of(&engine, &sync, identity.as_ref()));

    let actor = SessionActor {
        workspace_id,
        engine,
        sync,
        presence,
        store,
        identity,
        subscription: None,
        view_tx,
        live_tx,
    };
    let task = tokio::spawn(actor.run(events_rx));

    SessionHandle { events: events_tx, view: view_rx, live_paint: live_rx, task }
}

// =============================================================================
// ACTOR
// =============================================================================

struct SessionActor {
    workspace_id: String,
    engine: EngineCore,
    sync: SyncController,
    presence: Option<PresenceBroadcaster>,
    store: Option<Arc<dyn DocumentStore>>,
    identity: Option<Identity>,
    subscription: Option<Subscription>,
    view_tx: watch::Sender<SessionView>,
    live_tx: mpsc::Sender<Vec<PaintCommand>>,
}

impl SessionActor {
    async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        self.attach().await;

        loop {
            // Suppression covers exactly one turn of the loop.
            self.sync.end_remote_apply();
            let content_due = self.sync.deadline();
            let presence_due = self.presence.as_ref().and_then(PresenceBroadcaster::deadline);

            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Detach) | None => break,
                    Some(event) => self.handle_event(event),
                },
                delivery = next_delivery(self.subscription.as_mut()) => self.handle_delivery(delivery),
                () = wait_until(content_due) => self.push_content(),
                () = wait_until(presence_due) => self.push_presence(),
            }

            self.publish();
        }

        self.sync.detach();
        if let Some(presence) = &mut self.presence {
            presence.cancel();
        }
        info!(workspace_id = %self.workspace_id, "session detached");
    }

    /// Subscribe and apply the current document, so the first UI event
    /// already sees the shared board.
    async fn attach(&mut self) {
        if !self.sync.is_attached() {
            return;
        }
        let store = match self.store() {
            Ok(store) => store,
            Err(e) => {
                warn!(workspace_id = %self.workspace_id, error = %e, "cannot attach");
                return;
            }
        };
        match store.subscribe(&self.workspace_id).await {
            Ok(mut subscription) => {
                info!(workspace_id = %self.workspace_id, "session attached");
                let first = subscription.next().await;
                self.subscription = Some(subscription);
                self.handle_delivery(first);
                self.publish();
            }
            Err(e) => {
                warn!(workspace_id = %self.workspace_id, error = %e, "subscribe failed; pushing without snapshots");
            }
        }
    }

    // --- Inputs ---

    fn handle_event(&mut self, event: SessionEvent) {
        let engine = &mut self.engine;
        let actions = match event {
            SessionEvent::PointerDown { at, button } => engine.on_pointer_down(at, button),
            SessionEvent::EntityPointerDown { hit, at, button } => engine.on_entity_pointer_down(hit, at, button),
            SessionEvent::PointerMove(at) => engine.on_pointer_move(at),
            SessionEvent::PointerUp => engine.on_pointer_up(),
            SessionEvent::PointerLeave => engine.on_pointer_leave(),
            SessionEvent::SetTool(tool) => {
                engine.set_tool(tool);
                Vec::new()
            }
            SessionEvent::SetStroke(color) => {
                engine.set_stroke(color);
                Vec::new()
            }
            SessionEvent::SetText { target, text } => engine.set_text(&target, text),
            SessionEvent::ZoomBy(delta) => engine.zoom_by(delta),
            SessionEvent::ResetView => engine.reset_view(),
            SessionEvent::Detach => Vec::new(),
        };
        self.apply_actions(actions);
    }

    fn handle_delivery(&mut self, delivery: Option<Snapshot>) {
        match delivery {
            None => {
                let e = StoreError::Closed;
                warn!(workspace_id = %self.workspace_id, error = %e, code = e.error_code(), "no further snapshots");
                self.subscription = None;
            }
            Some(Err(e)) => {
                warn!(workspace_id = %self.workspace_id, error = %e, code = e.error_code(), "snapshot ignored");
            }
            Some(Ok(doc)) => match sync::apply_snapshot(&mut self.engine, &mut self.sync, doc) {
                // Same path as a local edit; suppression keeps it from echoing.
                SnapshotApply::Replaced | SnapshotApply::CursorsOnly => self.on_board_changed(),
                SnapshotApply::Ignored => {}
            },
        }
    }

    fn apply_actions(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::BoardChanged => self.on_board_changed(),
                Action::CursorMoved(at) => self.on_cursor_moved(at),
                Action::LivePaint(commands) => self.forward_live_paint(commands),
                // The view is republished after every event.
                Action::ViewChanged | Action::RenderNeeded => {}
            }
        }
    }

    fn on_board_changed(&mut self) {
        if self.sync.note_local_change(Instant::now()) {
            debug!(workspace_id = %self.workspace_id, "content push scheduled");
        }
    }

    fn on_cursor_moved(&mut self, at: Point) {
        if !self.sync.is_attached() {
            return;
        }
        if let Some(presence) = &mut self.presence {
            presence.on_pointer_move(&mut self.engine.board.cursors, at, Instant::now());
        }
    }

    fn forward_live_paint(&self, commands: Vec<PaintCommand>) {
        if let Err(e) = self.live_tx.try_send(commands) {
            debug!(error = %e, "live paint dropped");
        }
    }

    // --- Outputs ---

    fn push_content(&mut self) {
        if !self.sync.take_due(Instant::now()) {
            return;
        }
        let Some(editor_id) = self.identity.as_ref().map(|user| user.id.clone()) else {
            return;
        };
        let store = match self.store() {
            Ok(store) => store,
            Err(e) => {
                debug!(error = %e, "board push skipped");
                return;
            }
        };
        let workspace_id = self.workspace_id.clone();
        // Snapshots never replace the collections while this push is pending,
        // so the live board holds every local edit since the last push.
        let board = self.engine.board.clone();
        debug!(workspace_id = %workspace_id, notes = board.notes.len(), paths = board.paths.len(), "pushing board");

        tokio::spawn(async move {
            if let Err(e) = store.write_board(&workspace_id, &board, &editor_id).await {
                error!(workspace_id = %workspace_id, error = %e, code = e.error_code(), "board write failed");
            }
        });
    }

    fn push_presence(&mut self) {
        let Some(presence) = &mut self.presence else {
            return;
        };
        if !presence.take_due(Instant::now()) {
            return;
        }
        let editor_id = presence.user_id().to_owned();
        let store = match self.store() {
            Ok(store) => store,
            Err(e) => {
                debug!(error = %e, "cursor push skipped");
                return;
            }
        };
        let workspace_id = self.workspace_id.clone();
        let cursors = self.engine.board.cursors.clone();

        tokio::spawn(async move {
            if let Err(e) = store.write_cursors(&workspace_id, &cursors, &editor_id).await {
                error!(workspace_id = %workspace_id, error = %e, code = e.error_code(), "cursor write failed");
            }
        });
    }

    fn store(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        self.store.clone().ok_or(StoreError::NotConfigured)
    }

    fn publish(&self) {
        let next = view_of(&self.engine, &self.sync, self.identity.as_ref());
        self.view_tx.send_if_modified(|view| {
            if *view == next {
                return false;
            }
            *view = next;
            true
        });
    }
}

fn view_of(engine: &EngineCore, sync: &SyncController, identity: Option<&Identity>) -> SessionView {
    SessionView {
        board: engine.board.clone(),
        camera: engine.camera(),
        ui: engine.ui.clone(),
        active_path: engine.input.active_path().cloned(),
        attached: sync.is_attached(),
        local_user: identity.map(|user| user.id.clone()),
    }
}

async fn next_delivery(subscription: Option<&mut Subscription>) -> Option<Snapshot> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
