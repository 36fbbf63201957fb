//! Input model: tools, mouse buttons, and the gesture state machine.
//!
//! `Tool` captures what a pointer-down on the empty board means. `InputState`
//! is the single gesture tracked between pointer-down and pointer-up: either a
//! freehand path being drawn or one drag. Both cannot be active at once, which
//! is how the engine guarantees a single active pointer interaction.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::STROKE_COLORS;
use crate::doc::{ArrowEnd, BoardPath, EntityId, EntityRef};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag the view.
    Pan,
    /// Freehand stroke.
    Pen,
    /// Freehand destination-out stroke.
    Eraser,
    /// Drop a sticky note.
    Note,
    /// Drop a text box.
    Text,
    /// Drag out a rectangle.
    Rect,
    /// Drag out an arrow.
    Arrow,
    /// Drag out a frame.
    Frame,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// An active drag and the anchor context needed to compute it.
#[derive(Debug, Clone, PartialEq)]
pub enum Drag {
    /// Panning the view. Deltas are taken in screen space.
    Pan {
        /// Screen point where the drag started.
        anchor_screen: Point,
        /// View offset when the drag started.
        origin_offset: Point,
    },
    /// Moving an entity. Deltas are taken in board space.
    Move {
        target: EntityRef,
        /// Board point where the drag started.
        anchor: Point,
        /// Entity position when the drag started.
        origin: Point,
    },
    /// Resizing an entity from its bottom-right handle.
    Resize {
        target: EntityRef,
        anchor: Point,
        /// Entity size when the drag started.
        origin_size: (f64, f64),
    },
    /// Placing one arrow endpoint directly under the pointer.
    ArrowEndpoint { id: EntityId, end: ArrowEnd },
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The currently selected entity, if any.
    pub selected: Option<EntityRef>,
    /// Stroke color for new paths and arrows.
    pub stroke: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::default(), selected: None, stroke: STROKE_COLORS[0].to_owned() }
    }
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A freehand path is being drawn. It is not part of the board until
    /// pointer-up commits it.
    Drawing { path: BoardPath },
    /// A drag is in progress.
    Dragging(Drag),
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn drag(&self) -> Option<&Drag> {
        match self {
            Self::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    #[must_use]
    pub fn active_path(&self) -> Option<&BoardPath> {
        match self {
            Self::Drawing { path } => Some(path),
            _ => None,
        }
    }
}
