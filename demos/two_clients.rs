//! Two clients editing one workspace through an in-memory store.
//!
//! Alice drops a note and draws a stroke, Bob drags out a rectangle and an
//! arrow, and both log what they see once sync has settled.

use std::sync::Arc;
use std::time::Duration;

use collaboard_core::camera::Point;
use collaboard_core::config::{SessionOptions, SyncConfig};
use collaboard_core::identity::Identity;
use collaboard_core::input::{Button, Tool};
use collaboard_core::session::{SessionEvent, SessionHandle, spawn_session};
use collaboard_core::store::{DocumentStore, MemoryStore, NewWorkspace};
use tracing::info;

async fn gesture(handle: &SessionHandle, tool: Tool, points: &[(f64, f64)]) {
    handle.send(SessionEvent::SetTool(tool)).await.expect("session alive");
    let Some((&(x, y), rest)) = points.split_first() else {
        return;
    };
    handle.send(SessionEvent::PointerDown { at: Point::new(x, y), button: Button::Primary }).await.expect("session alive");
    for &(x, y) in rest {
        handle.send(SessionEvent::PointerMove(Point::new(x, y))).await.expect("session alive");
    }
    handle.send(SessionEvent::PointerUp).await.expect("session alive");
}

fn report(who: &str, handle: &SessionHandle) {
    let view = handle.view();
    let board = &view.board;
    info!(
        "{who}: notes={} paths={} shapes={} arrows={} cursors={} overlays={}",
        board.notes.len(),
        board.paths.len(),
        board.shapes.len(),
        board.arrows.len(),
        board.cursors.len(),
        view.scene().overlays.len(),
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = MemoryStore::new();
    let alice_id = Identity::new("alice").with_display_name("Alice");
    let bob_id = Identity::new("bob").with_email("bob@example.com");
    let workspace_id = store
        .create_workspace(NewWorkspace { name: "demo board".into(), owner: alice_id.clone(), invites: Vec::new() })
        .await
        .expect("create workspace");

    let open = |user: Identity| {
        spawn_session(
            SessionOptions::new(workspace_id.clone())
                .with_store(Arc::new(store.clone()) as Arc<dyn DocumentStore>)
                .with_identity(user)
                .with_config(SyncConfig::from_env()),
        )
    };
    let alice = open(alice_id);
    let bob = open(bob_id);

    gesture(&alice, Tool::Note, &[(40.0, 40.0)]).await;
    gesture(&alice, Tool::Pen, &[(300.0, 40.0), (320.0, 60.0), (360.0, 50.0)]).await;
    tokio::time::sleep(Duration::from_millis(800)).await;

    gesture(&bob, Tool::Rect, &[(50.0, 250.0), (150.0, 330.0)]).await;
    gesture(&bob, Tool::Arrow, &[(200.0, 250.0), (260.0, 300.0)]).await;
    tokio::time::sleep(Duration::from_millis(800)).await;

    report("alice", &alice);
    report("bob", &bob);

    alice.detach().await.expect("alice detach");
    bob.detach().await.expect("bob detach");
}
