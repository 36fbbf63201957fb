//! Collaborative board state engine.
//!
//! Several users edit one shared board (freehand strokes, sticky notes, text
//! boxes, shapes, arrows, frames) and see each other's cursors. This crate
//! owns everything between raw pointer input and the shared document: the
//! entity model, the gesture state machine that turns input into mutations,
//! the paint/overlay projection, debounced whole-board sync with self-echo
//! suppression, and the cursor presence channel. The host is responsible only
//! for feeding [`session::SessionEvent`]s in and painting what
//! [`session::SessionView`] and the live paint stream hand back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Per-workspace actor: event loop, timers, spawned writes |
//! | [`engine`] | Synchronous interaction engine, [`engine::EngineCore`] |
//! | [`doc`] | Board entity types, cursor set and board state |
//! | [`camera`] | Pan/zoom transform and coordinate conversions |
//! | [`input`] | Tools and the gesture state machine |
//! | [`hit`] | Hit-testing against overlay geometry |
//! | [`render`] | Paint script and overlay projection |
//! | [`sync`] | Content debounce and echo suppression |
//! | [`presence`] | Local cursor upsert and presence debounce |
//! | [`store`] | Document store trait and the in-memory store |
//! | [`identity`] | Signed-in user and cursor labelling |
//! | [`config`] | Debounce settings and attach/detach decision |
//! | [`consts`] | Shared constants (minimum sizes, palettes, zoom limits) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod identity;
pub mod input;
pub mod presence;
pub mod render;
pub mod session;
pub mod store;
pub mod sync;
