//! Shared constants for the board engine.

// ── Minimum sizes ───────────────────────────────────────────────

/// Smallest width/height a shape can be resized to, in board units.
pub const SHAPE_MIN_SIZE: (f64, f64) = (40.0, 40.0);

/// Smallest width/height of a text box.
pub const TEXT_MIN_SIZE: (f64, f64) = (120.0, 60.0);

/// Smallest width/height of a frame.
pub const FRAME_MIN_SIZE: (f64, f64) = (120.0, 80.0);

// ── Creation defaults ───────────────────────────────────────────

/// Notes render at a fixed width; their height comes from the UI.
pub const NOTE_WIDTH: f64 = 200.0;

/// Height used when hit-testing a note body.
pub const NOTE_HIT_HEIGHT: f64 = 120.0;

pub const NOTE_PLACEHOLDER: &str = "New note";

pub const TEXT_DEFAULT_SIZE: (f64, f64) = (220.0, 80.0);
pub const TEXT_PLACEHOLDER: &str = "Text";

/// A freshly placed rect starts tiny; the creating drag grows it from here.
pub const SHAPE_SEED_SIZE: (f64, f64) = (10.0, 10.0);
pub const SHAPE_DEFAULT_COLOR: &str = "#ffffff";

pub const FRAME_DEFAULT_SIZE: (f64, f64) = (200.0, 140.0);
pub const FRAME_DEFAULT_TITLE: &str = "Frame";

// ── Strokes ─────────────────────────────────────────────────────

pub const PEN_WIDTH: f64 = 3.0;
pub const ERASER_WIDTH: f64 = 18.0;

/// Strokes rendered under the overlay for arrows.
pub const ARROW_STROKE_WIDTH: f64 = 2.0;

// ── Palettes ────────────────────────────────────────────────────

pub const STROKE_COLORS: [&str; 5] = ["#111111", "#444444", "#6b6b6b", "#9a9a9a", "#d1d1d1"];
pub const NOTE_COLORS: [&str; 4] = ["#fff6a3", "#ffe4c7", "#cfe8ff", "#d8f1e5"];
pub const CURSOR_COLORS: [&str; 5] = ["#3f7cff", "#ff9f1c", "#22c55e", "#ec4899", "#8b5cf6"];

// ── View ────────────────────────────────────────────────────────

pub const MIN_SCALE: f64 = 0.4;
pub const MAX_SCALE: f64 = 2.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Radius of resize and arrow-endpoint handles, in board units.
pub const HANDLE_RADIUS: f64 = 6.0;

/// Inset of a resize handle's center from the entity's bottom-right corner.
pub const RESIZE_HANDLE_INSET: f64 = 14.0;

// ── Sync ────────────────────────────────────────────────────────

pub const DEFAULT_CONTENT_DEBOUNCE_MS: u64 = 600;
pub const DEFAULT_PRESENCE_DEBOUNCE_MS: u64 = 200;

/// Workspace id that always runs without sync.
pub const DEMO_WORKSPACE_ID: &str = "demo";

/// Length of generated entity ids.
pub const ENTITY_ID_LEN: usize = 7;
