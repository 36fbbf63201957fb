//! Rendering projector: derives what to paint from board state.
//!
//! This module never touches a drawing surface. It turns read-only views of
//! the board, the camera and the UI state into two outputs the host layer
//! consumes:
//!
//! - a vector [`PaintCommand`] script for committed freehand paths, replayed
//!   onto a 2D surface under the current transform;
//! - a list of [`Overlay`] regions (frames, shapes, arrows, text boxes, notes,
//!   remote cursors) with board-space geometry, which the host positions in a
//!   scene-graph layer transformed by the same camera.
//!
//! Selection highlighting is derived here by comparing entity references; it
//! is never stored on the entities themselves.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point};
use crate::consts::{
    ARROW_STROKE_WIDTH, ERASER_WIDTH, HANDLE_RADIUS, NOTE_HIT_HEIGHT, NOTE_WIDTH, PEN_WIDTH, RESIZE_HANDLE_INSET,
};
use crate::doc::{BoardPath, BoardState, EntityKind, EntityRef, PathMode, ShapeKind};
use crate::input::UiState;

// =============================================================
// Paint script
// =============================================================

/// How a stroke combines with pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    SourceOver,
    /// Erases whatever lies beneath the stroke.
    DestinationOut,
}

impl From<PathMode> for Composite {
    fn from(mode: PathMode) -> Self {
        match mode {
            PathMode::Draw => Self::SourceOver,
            PathMode::Erase => Self::DestinationOut,
        }
    }
}

/// Stroke settings for a freehand path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    pub mode: PathMode,
}

impl StrokeStyle {
    /// Pen stroke in `color`.
    #[must_use]
    pub fn pen(color: &str) -> Self {
        Self { color: color.to_owned(), width: PEN_WIDTH, mode: PathMode::Draw }
    }

    /// Eraser stroke. The color is kept only for the record; destination-out
    /// ignores it.
    #[must_use]
    pub fn eraser(color: &str) -> Self {
        Self { color: color.to_owned(), width: ERASER_WIDTH, mode: PathMode::Erase }
    }

    #[must_use]
    pub fn of_path(path: &BoardPath) -> Self {
        Self { color: path.color.clone(), width: path.width, mode: path.mode }
    }

    #[must_use]
    pub fn composite(&self) -> Composite {
        self.mode.into()
    }
}

/// One instruction for the 2D drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Clear the whole surface.
    Clear,
    Save,
    Restore,
    /// Map board space onto the surface: `screen = board * scale + offset`.
    SetTransform { offset: Point, scale: f64 },
    /// Stroke color, width and composite for subsequent strokes. Line caps
    /// and joins are always round.
    SetStroke { color: String, width: f64, composite: Composite },
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Stroke,
}

impl PaintCommand {
    fn set_stroke(style: &StrokeStyle) -> Self {
        Self::SetStroke { color: style.color.clone(), width: style.width, composite: style.composite() }
    }
}

/// Build the paint script for committed paths, in collection order.
///
/// Paths with fewer than two points are skipped.
#[must_use]
pub fn paint_paths(paths: &[BoardPath], camera: &Camera) -> Vec<PaintCommand> {
    let mut script = vec![
        PaintCommand::Clear,
        PaintCommand::Save,
        PaintCommand::SetTransform { offset: camera.offset, scale: camera.scale },
    ];

    for path in paths {
        let [first, rest @ ..] = path.points.as_slice() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        script.push(PaintCommand::Save);
        script.push(PaintCommand::set_stroke(&StrokeStyle::of_path(path)));
        script.push(PaintCommand::BeginPath);
        script.push(PaintCommand::MoveTo(*first));
        script.extend(rest.iter().map(|p| PaintCommand::LineTo(*p)));
        script.push(PaintCommand::Stroke);
        script.push(PaintCommand::Restore);
    }

    script.push(PaintCommand::Restore);
    script
}

/// Live-stroke commands for the first point of a new path, in screen space.
#[must_use]
pub fn live_stroke_begin(style: &StrokeStyle, at_screen: Point) -> Vec<PaintCommand> {
    vec![PaintCommand::set_stroke(style), PaintCommand::BeginPath, PaintCommand::MoveTo(at_screen)]
}

/// Live-stroke commands for one segment of an in-progress path, in screen space.
#[must_use]
pub fn live_stroke_segment(style: &StrokeStyle, from_screen: Point, to_screen: Point) -> Vec<PaintCommand> {
    vec![
        PaintCommand::set_stroke(style),
        PaintCommand::BeginPath,
        PaintCommand::MoveTo(from_screen),
        PaintCommand::LineTo(to_screen),
        PaintCommand::Stroke,
    ]
}

// =============================================================
// Overlays
// =============================================================

/// Axis-aligned rectangle in board space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// The same rectangle in screen space.
    #[must_use]
    pub fn to_screen(&self, camera: &Camera) -> Rect {
        let origin = camera.board_to_screen(Point::new(self.x, self.y));
        Rect { x: origin.x, y: origin.y, width: self.width * camera.scale, height: self.height * camera.scale }
    }
}

/// What grabbing a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Resize,
    ArrowStart,
    ArrowEnd,
}

/// A round grab handle in board space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub center: Point,
    pub radius: f64,
}

impl Handle {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let d = p.delta_from(self.center);
        d.x.hypot(d.y) <= self.radius
    }
}

/// Kind-specific content of an overlay region.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayBody {
    Frame { title: String },
    Shape { kind: ShapeKind, color: String },
    Arrow { start: Point, end: Point, color: String, stroke_width: f64 },
    Text { text: String },
    Note { text: String, color: String },
    Cursor { user_id: String, name: String, color: String },
}

/// One positioned element in the overlay layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// The entity this region stands for. `None` for remote cursors.
    pub target: Option<EntityRef>,
    pub bounds: Rect,
    pub selected: bool,
    pub handles: Vec<Handle>,
    pub body: OverlayBody,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub paint: Vec<PaintCommand>,
    /// Transform applied to the whole overlay layer (origin at top-left).
    pub overlay_transform: Camera,
    pub overlays: Vec<Overlay>,
}

fn is_selected(selected: Option<&EntityRef>, kind: EntityKind, id: &str) -> bool {
    selected.is_some_and(|s| s.is(kind, id))
}

fn resize_handle(bounds: Rect) -> Handle {
    Handle {
        kind: HandleKind::Resize,
        center: Point::new(bounds.x + bounds.width - RESIZE_HANDLE_INSET, bounds.y + bounds.height - RESIZE_HANDLE_INSET),
        radius: HANDLE_RADIUS,
    }
}

fn boxed(target: EntityRef, bounds: Rect, selected: bool, resizable: bool, body: OverlayBody) -> Overlay {
    let handles = if selected && resizable { vec![resize_handle(bounds)] } else { Vec::new() };
    Overlay { target: Some(target), bounds, selected, handles, body }
}

/// Build overlay regions in layer order: frames, shapes, arrows, text boxes,
/// notes, then remote cursors on top.
///
/// The cursor owned by `local_user` is left out; a user never sees their own
/// presence marker.
#[must_use]
pub fn overlays(board: &BoardState, selected: Option<&EntityRef>, local_user: Option<&str>) -> Vec<Overlay> {
    let mut out = Vec::new();

    for f in &board.frames {
        let sel = is_selected(selected, EntityKind::Frame, &f.id);
        let bounds = Rect { x: f.x, y: f.y, width: f.width, height: f.height };
        out.push(boxed(EntityRef::Frame(f.id.clone()), bounds, sel, true, OverlayBody::Frame { title: f.title.clone() }));
    }

    for s in &board.shapes {
        let sel = is_selected(selected, EntityKind::Shape, &s.id);
        let bounds = Rect { x: s.x, y: s.y, width: s.width, height: s.height };
        let body = OverlayBody::Shape { kind: s.kind, color: s.color.clone() };
        out.push(boxed(EntityRef::Shape(s.id.clone()), bounds, sel, true, body));
    }

    for a in &board.arrows {
        let sel = is_selected(selected, EntityKind::Arrow, &a.id);
        // Degenerate arrows still get a 1×1 box so the layer has something to place.
        let width = (a.end.x - a.start.x).abs();
        let height = (a.end.y - a.start.y).abs();
        let bounds = Rect {
            x: a.start.x.min(a.end.x),
            y: a.start.y.min(a.end.y),
            width: if width > 0.0 { width } else { 1.0 },
            height: if height > 0.0 { height } else { 1.0 },
        };
        let handles = vec![
            Handle { kind: HandleKind::ArrowStart, center: a.start, radius: HANDLE_RADIUS },
            Handle { kind: HandleKind::ArrowEnd, center: a.end, radius: HANDLE_RADIUS },
        ];
        out.push(Overlay {
            target: Some(EntityRef::Arrow(a.id.clone())),
            bounds,
            selected: sel,
            handles,
            body: OverlayBody::Arrow { start: a.start, end: a.end, color: a.color.clone(), stroke_width: ARROW_STROKE_WIDTH },
        });
    }

    for t in &board.texts {
        let sel = is_selected(selected, EntityKind::Text, &t.id);
        let bounds = Rect { x: t.x, y: t.y, width: t.width, height: t.height };
        out.push(boxed(EntityRef::Text(t.id.clone()), bounds, sel, true, OverlayBody::Text { text: t.text.clone() }));
    }

    for n in &board.notes {
        let sel = is_selected(selected, EntityKind::Note, &n.id);
        let bounds = Rect { x: n.x, y: n.y, width: NOTE_WIDTH, height: NOTE_HIT_HEIGHT };
        let body = OverlayBody::Note { text: n.text.clone(), color: n.color.clone() };
        out.push(boxed(EntityRef::Note(n.id.clone()), bounds, sel, false, body));
    }

    for c in board.cursors.iter().filter(|c| local_user != Some(c.id.as_str())) {
        out.push(Overlay {
            target: None,
            bounds: Rect { x: c.x, y: c.y, width: 0.0, height: 0.0 },
            selected: false,
            handles: Vec::new(),
            body: OverlayBody::Cursor { user_id: c.id.clone(), name: c.name.clone(), color: c.color.clone() },
        });
    }

    out
}

/// Project the full scene for the current state.
#[must_use]
pub fn project(board: &BoardState, camera: &Camera, ui: &UiState, local_user: Option<&str>) -> Scene {
    Scene {
        paint: paint_paths(&board.paths, camera),
        overlay_transform: *camera,
        overlays: overlays(board, ui.selected.as_ref(), local_user),
    }
}
