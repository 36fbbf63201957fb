use crate::camera::{Camera, Point};
use crate::consts::{
    FRAME_DEFAULT_SIZE, FRAME_DEFAULT_TITLE, NOTE_COLORS, NOTE_PLACEHOLDER, SHAPE_DEFAULT_COLOR, SHAPE_SEED_SIZE,
    TEXT_DEFAULT_SIZE, TEXT_PLACEHOLDER,
};
use crate::doc::{
    Arrow, ArrowEnd, BoardPath, BoardState, EntityRef, Frame, Note, Shape, ShapeKind, TextBox, new_entity_id,
};
use crate::hit::{self, Hit, HitPart};
use crate::input::{Button, Drag, InputState, Tool, UiState};
use crate::render::{self, PaintCommand, Scene, StrokeStyle};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// One of the six entity collections changed; content sync should run.
    BoardChanged,
    /// The local pointer is now at this board point.
    CursorMoved(Point),
    /// Paint these commands on the live surface right away (screen space).
    LivePaint(Vec<PaintCommand>),
    /// Pan or zoom changed.
    ViewChanged,
    RenderNeeded,
}

/// Interaction engine: board state, view, UI state and the active gesture.
///
/// Every handler is synchronous and returns the [`Action`]s the host must
/// act on. The engine knows nothing about sync; the session decides what a
/// `BoardChanged` or `CursorMoved` means.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub board: BoardState,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the whole board with a remote snapshot.
    ///
    /// Any in-progress gesture survives; a drag whose target vanished simply
    /// stops having an effect.
    pub fn load_snapshot(&mut self, board: BoardState) {
        self.board.replace_with(board);
    }

    // --- Tool / view / text ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
    }

    /// Stroke color for subsequent paths and arrows.
    pub fn set_stroke(&mut self, color: impl Into<String>) {
        self.ui.stroke = color.into();
    }

    /// Replace the text of a note or text box.
    pub fn set_text(&mut self, target: &EntityRef, text: String) -> Vec<Action> {
        if self.board.set_text(target, text) {
            vec![Action::BoardChanged, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn zoom_by(&mut self, delta: f64) -> Vec<Action> {
        self.camera.zoom_by(delta);
        vec![Action::ViewChanged, Action::RenderNeeded]
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.camera.reset_offset();
        vec![Action::ViewChanged, Action::RenderNeeded]
    }

    // --- Input events ---

    /// Pointer-down on the board.
    ///
    /// Entities under the pointer intercept the event before the active tool
    /// sees it. Non-primary buttons are ignored, as is any pointer-down while
    /// another gesture is still active.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let board_pt = self.camera.screen_to_board(screen_pt);
        if let Some(hit) = hit::hit_test(board_pt, &self.board, self.ui.selected.as_ref()) {
            return self.grab(hit, board_pt);
        }
        self.tool_down(screen_pt, board_pt)
    }

    /// Pointer-down reported on an entity's own hit region by the host.
    pub fn on_entity_pointer_down(&mut self, hit: Hit, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let board_pt = self.camera.screen_to_board(screen_pt);
        self.grab(hit, board_pt)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let board_pt = self.camera.screen_to_board(screen_pt);
        let mut actions = Vec::new();

        match &mut self.input {
            InputState::Idle => {}
            InputState::Drawing { path } => {
                if let Some(prev) = path.points.last().copied() {
                    let from = self.camera.board_to_screen(prev);
                    actions.push(Action::LivePaint(render::live_stroke_segment(
                        &StrokeStyle::of_path(path),
                        from,
                        screen_pt,
                    )));
                }
                path.points.push(board_pt);
            }
            InputState::Dragging(drag) => {
                let drag = drag.clone();
                actions.extend(self.apply_drag(&drag, screen_pt, board_pt));
            }
        }

        actions.push(Action::CursorMoved(board_pt));
        actions
    }

    /// Pointer-up: commit the active path if it has at least two points, then
    /// clear every gesture.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let InputState::Drawing { path } = std::mem::take(&mut self.input) {
            if path.points.len() >= 2 {
                self.board.paths.push(path);
                actions.push(Action::BoardChanged);
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The pointer left the surface. Behaves exactly like pointer-up.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.on_pointer_up()
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&EntityRef> {
        self.ui.selected.as_ref()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Project the current state for painting.
    #[must_use]
    pub fn scene(&self, local_user: Option<&str>) -> Scene {
        render::project(&self.board, &self.camera, &self.ui, local_user)
    }

    // --- Internals ---

    fn grab(&mut self, hit: Hit, board_pt: Point) -> Vec<Action> {
        if !self.board.contains(&hit.target) {
            return Vec::new();
        }
        let drag = match (hit.part, &hit.target) {
            (HitPart::ArrowEndpoint(end), EntityRef::Arrow(id)) => Some(Drag::ArrowEndpoint { id: id.clone(), end }),
            (HitPart::ResizeHandle, target) => self
                .board
                .size_of(target)
                .map(|origin_size| Drag::Resize { target: target.clone(), anchor: board_pt, origin_size }),
            (HitPart::Body, target) => self
                .board
                .position_of(target)
                .map(|origin| Drag::Move { target: target.clone(), anchor: board_pt, origin }),
            (HitPart::ArrowEndpoint(_), _) => None,
        };
        if let Some(drag) = drag {
            self.input = InputState::Dragging(drag);
        }
        self.ui.selected = Some(hit.target);
        vec![Action::RenderNeeded]
    }

    fn tool_down(&mut self, screen_pt: Point, board_pt: Point) -> Vec<Action> {
        match self.ui.tool {
            Tool::Pan => {
                let origin_offset = self.camera.offset;
                self.input = InputState::Dragging(Drag::Pan { anchor_screen: screen_pt, origin_offset });
                Vec::new()
            }
            Tool::Note => {
                let color = NOTE_COLORS[self.board.notes.len() % NOTE_COLORS.len()];
                self.board.notes.push(Note {
                    id: new_entity_id(),
                    x: board_pt.x,
                    y: board_pt.y,
                    text: NOTE_PLACEHOLDER.to_owned(),
                    color: color.to_owned(),
                });
                self.ui.tool = Tool::Select;
                vec![Action::BoardChanged, Action::RenderNeeded]
            }
            Tool::Text => {
                let id = new_entity_id();
                let (width, height) = TEXT_DEFAULT_SIZE;
                self.board.texts.push(TextBox {
                    id: id.clone(),
                    x: board_pt.x,
                    y: board_pt.y,
                    width,
                    height,
                    text: TEXT_PLACEHOLDER.to_owned(),
                });
                self.ui.selected = Some(EntityRef::Text(id));
                self.ui.tool = Tool::Select;
                vec![Action::BoardChanged, Action::RenderNeeded]
            }
            Tool::Rect => {
                let id = new_entity_id();
                let (width, height) = SHAPE_SEED_SIZE;
                self.board.shapes.push(Shape {
                    id: id.clone(),
                    x: board_pt.x,
                    y: board_pt.y,
                    width,
                    height,
                    color: SHAPE_DEFAULT_COLOR.to_owned(),
                    kind: ShapeKind::Rect,
                });
                let target = EntityRef::Shape(id);
                let drag = Drag::Resize { target: target.clone(), anchor: board_pt, origin_size: (width, height) };
                self.input = InputState::Dragging(drag);
                self.ui.selected = Some(target);
                vec![Action::BoardChanged, Action::RenderNeeded]
            }
            Tool::Arrow => {
                let id = new_entity_id();
                let color = self.ui.stroke.clone();
                self.board.arrows.push(Arrow { id: id.clone(), start: board_pt, end: board_pt, color });
                self.input = InputState::Dragging(Drag::ArrowEndpoint { id: id.clone(), end: ArrowEnd::End });
                self.ui.selected = Some(EntityRef::Arrow(id));
                vec![Action::BoardChanged, Action::RenderNeeded]
            }
            Tool::Frame => {
                let id = new_entity_id();
                let (width, height) = FRAME_DEFAULT_SIZE;
                self.board.frames.push(Frame {
                    id: id.clone(),
                    x: board_pt.x,
                    y: board_pt.y,
                    width,
                    height,
                    title: FRAME_DEFAULT_TITLE.to_owned(),
                });
                let target = EntityRef::Frame(id);
                let drag = Drag::Resize { target: target.clone(), anchor: board_pt, origin_size: (width, height) };
                self.input = InputState::Dragging(drag);
                self.ui.selected = Some(target);
                vec![Action::BoardChanged, Action::RenderNeeded]
            }
            Tool::Pen | Tool::Eraser => {
                let style = if self.ui.tool == Tool::Eraser {
                    StrokeStyle::eraser(&self.ui.stroke)
                } else {
                    StrokeStyle::pen(&self.ui.stroke)
                };
                let begin = render::live_stroke_begin(&style, screen_pt);
                self.input = InputState::Drawing {
                    path: BoardPath {
                        id: new_entity_id(),
                        color: style.color,
                        width: style.width,
                        mode: style.mode,
                        points: vec![board_pt],
                    },
                };
                vec![Action::LivePaint(begin)]
            }
            Tool::Select => {
                self.ui.selected = None;
                vec![Action::RenderNeeded]
            }
        }
    }

    fn apply_drag(&mut self, drag: &Drag, screen_pt: Point, board_pt: Point) -> Vec<Action> {
        let changed = match drag {
            Drag::Pan { anchor_screen, origin_offset } => {
                self.camera.offset = origin_offset.offset_by(screen_pt.delta_from(*anchor_screen));
                return vec![Action::ViewChanged, Action::RenderNeeded];
            }
            Drag::Move { target, anchor, origin } => {
                let delta = board_pt.delta_from(*anchor);
                self.board.move_entity(target, origin.offset_by(delta))
            }
            Drag::Resize { target, anchor, origin_size } => {
                let delta = board_pt.delta_from(*anchor);
                self.board.resize_entity(target, origin_size.0 + delta.x, origin_size.1 + delta.y)
            }
            Drag::ArrowEndpoint { id, end } => self.board.set_arrow_endpoint(id, *end, board_pt),
        };
        if changed {
            vec![Action::BoardChanged, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }
}
