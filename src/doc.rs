//! Document model: board entities, cursor presence, and the board state.
//!
//! This module defines the six durable entity kinds that live on a board
//! (`BoardPath`, `Note`, `Shape`, `TextBox`, `Arrow`, `Frame`), the ephemeral
//! `Cursor` presence record, and `BoardState`, which owns one ordered
//! collection per kind plus the cursor set.
//!
//! Everything here is plain data plus validation helpers: minimum-size
//! clamping, id generation and the cursor color hash. The input engine mutates
//! these types, the sync layer serializes them into the shared document, and
//! the renderer reads them. Field names follow the document's camelCase wire
//! format; every collection defaults to empty when a snapshot omits it.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::camera::Point;
use crate::consts::{CURSOR_COLORS, ENTITY_ID_LEN, FRAME_MIN_SIZE, SHAPE_MIN_SIZE, TEXT_MIN_SIZE};

/// Locally generated, opaque entity identifier.
pub type EntityId = String;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh random base-36 entity id.
#[must_use]
pub fn new_entity_id() -> EntityId {
    let mut rng = rand::rng();
    (0..ENTITY_ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

/// Clamp a requested size so neither axis drops below `min`.
#[must_use]
pub fn clamp_size(min: (f64, f64), width: f64, height: f64) -> (f64, f64) {
    (width.max(min.0), height.max(min.1))
}

/// Pick a presence color for a user id.
///
/// The hash walks the UTF-16 code units of the id. Only the shift is done in
/// 32-bit wrapping arithmetic; the running value itself is kept wide, so every
/// client (whatever it is written in) derives the same color for the same user.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cursor_color(seed: &str) -> &'static str {
    let mut hash: i64 = 0;
    for unit in seed.encode_utf16() {
        let shifted = (hash as i32) << 5;
        hash = i64::from(shifted) - hash + i64::from(unit);
    }
    let len = i64::try_from(CURSOR_COLORS.len()).unwrap_or(1);
    let idx = usize::try_from(hash.abs() % len).unwrap_or(0);
    CURSOR_COLORS[idx]
}

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// How a freehand path composites with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Normal source-over painting.
    #[default]
    Draw,
    /// Destination-out: punches through strokes beneath it.
    Erase,
}

/// A freehand stroke. Append-only while drawing, immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPath {
    pub id: EntityId,
    pub color: String,
    pub width: f64,
    pub mode: PathMode,
    pub points: Vec<Point>,
}

/// A sticky note. Width is fixed by the UI and height is intrinsic to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

/// A straight arrow between two free endpoints. `start == end` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub id: EntityId,
    pub start: Point,
    pub end: Point,
    pub color: String,
}

/// A titled grouping rectangle. Containment of other entities is not tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
}

/// Live pointer presence of one user. `id` is the owning user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub id: String,
    pub name: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
}

/// Which end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowEnd {
    Start,
    End,
}

// =============================================================================
// ENTITY REFERENCES
// =============================================================================

/// Kind tag for the entity collections that can be selected or dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Note,
    Shape,
    Text,
    Arrow,
    Frame,
}

/// A typed reference to a selectable entity: kind plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Note(EntityId),
    Shape(EntityId),
    Text(EntityId),
    Arrow(EntityId),
    Frame(EntityId),
}

impl EntityRef {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Note(_) => EntityKind::Note,
            Self::Shape(_) => EntityKind::Shape,
            Self::Text(_) => EntityKind::Text,
            Self::Arrow(_) => EntityKind::Arrow,
            Self::Frame(_) => EntityKind::Frame,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Note(id) | Self::Shape(id) | Self::Text(id) | Self::Arrow(id) | Self::Frame(id) => id,
        }
    }

    /// Whether this reference names `kind` with `id`.
    #[must_use]
    pub fn is(&self, kind: EntityKind, id: &str) -> bool {
        self.kind() == kind && self.id() == id
    }
}

// =============================================================================
// POSITION / SIZE ACCESS
// =============================================================================

/// Entities with a top-left anchor that can be dragged.
pub trait Placed {
    fn position(&self) -> Point;
    fn set_position(&mut self, p: Point);
}

/// Entities with a size that can be dragged larger or smaller, down to a floor.
pub trait Resizable: Placed {
    const MIN_SIZE: (f64, f64);

    fn size(&self) -> (f64, f64);

    /// Store the raw size; callers go through [`Resizable::resize`].
    fn store_size(&mut self, width: f64, height: f64);

    /// Resize, never dropping below [`Resizable::MIN_SIZE`] on either axis.
    fn resize(&mut self, width: f64, height: f64) {
        let (w, h) = clamp_size(Self::MIN_SIZE, width, height);
        self.store_size(w, h);
    }
}

macro_rules! impl_placed {
    ($($ty:ty),*) => {
        $(impl Placed for $ty {
            fn position(&self) -> Point {
                Point::new(self.x, self.y)
            }

            fn set_position(&mut self, p: Point) {
                self.x = p.x;
                self.y = p.y;
            }
        })*
    };
}

macro_rules! impl_resizable {
    ($($ty:ty => $min:expr),*) => {
        $(impl Resizable for $ty {
            const MIN_SIZE: (f64, f64) = $min;

            fn size(&self) -> (f64, f64) {
                (self.width, self.height)
            }

            fn store_size(&mut self, width: f64, height: f64) {
                self.width = width;
                self.height = height;
            }
        })*
    };
}

impl_placed!(Note, Shape, TextBox, Frame);
impl_resizable!(Shape => SHAPE_MIN_SIZE, TextBox => TEXT_MIN_SIZE, Frame => FRAME_MIN_SIZE);

// =============================================================================
// CURSOR SET
// =============================================================================

/// Cursor presence keyed by user id, stored as a list on the wire.
///
/// Holds at most one entry per user id: [`CursorSet::upsert`] replaces in
/// place, and decoding a list with repeated ids keeps the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CursorSet(Vec<Cursor>);

impl CursorSet {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace the cursor for `cursor.id`.
    ///
    /// A replaced cursor moves to the end, so the most recently active user
    /// paints on top.
    pub fn upsert(&mut self, cursor: Cursor) {
        self.0.retain(|c| c.id != cursor.id);
        self.0.push(cursor);
    }

    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&Cursor> {
        self.0.iter().find(|c| c.id == user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Cursor> for CursorSet {
    fn from_iter<I: IntoIterator<Item = Cursor>>(iter: I) -> Self {
        let mut set = Self::new();
        for cursor in iter {
            set.upsert(cursor);
        }
        set
    }
}

impl<'de> Deserialize<'de> for CursorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<Cursor>::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}

// =============================================================================
// BOARD STATE
// =============================================================================

/// Everything on one board: six ordered entity collections plus live cursors.
///
/// Collection order is insertion order; for paths it is also paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardState {
    pub notes: Vec<Note>,
    pub paths: Vec<BoardPath>,
    pub shapes: Vec<Shape>,
    pub texts: Vec<TextBox>,
    pub arrows: Vec<Arrow>,
    pub frames: Vec<Frame>,
    pub cursors: CursorSet,
}

impl BoardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every collection, cursors included, with `other`'s.
    pub fn replace_with(&mut self, other: BoardState) {
        *self = other;
    }

    /// Whether the referenced entity is currently present.
    #[must_use]
    pub fn contains(&self, target: &EntityRef) -> bool {
        match target {
            EntityRef::Note(id) => self.notes.iter().any(|n| &n.id == id),
            EntityRef::Shape(id) => self.shapes.iter().any(|s| &s.id == id),
            EntityRef::Text(id) => self.texts.iter().any(|t| &t.id == id),
            EntityRef::Arrow(id) => self.arrows.iter().any(|a| &a.id == id),
            EntityRef::Frame(id) => self.frames.iter().any(|f| &f.id == id),
        }
    }

    /// Top-left position of a placed entity. Arrows have no single position.
    #[must_use]
    pub fn position_of(&self, target: &EntityRef) -> Option<Point> {
        match target {
            EntityRef::Note(id) => find(&self.notes, id, |n| &n.id).map(Placed::position),
            EntityRef::Shape(id) => find(&self.shapes, id, |s| &s.id).map(Placed::position),
            EntityRef::Text(id) => find(&self.texts, id, |t| &t.id).map(Placed::position),
            EntityRef::Frame(id) => find(&self.frames, id, |f| &f.id).map(Placed::position),
            EntityRef::Arrow(_) => None,
        }
    }

    /// Size of a resizable entity. Notes and arrows are not resizable.
    #[must_use]
    pub fn size_of(&self, target: &EntityRef) -> Option<(f64, f64)> {
        match target {
            EntityRef::Shape(id) => find(&self.shapes, id, |s| &s.id).map(Resizable::size),
            EntityRef::Text(id) => find(&self.texts, id, |t| &t.id).map(Resizable::size),
            EntityRef::Frame(id) => find(&self.frames, id, |f| &f.id).map(Resizable::size),
            EntityRef::Note(_) | EntityRef::Arrow(_) => None,
        }
    }

    /// Move a placed entity. Returns `false` if it is missing or not placeable.
    pub fn move_entity(&mut self, target: &EntityRef, to: Point) -> bool {
        let placed: Option<&mut dyn Placed> = match target {
            EntityRef::Note(id) => find_mut(&mut self.notes, id, |n| &n.id).map(|n| n as &mut dyn Placed),
            EntityRef::Shape(id) => find_mut(&mut self.shapes, id, |s| &s.id).map(|s| s as &mut dyn Placed),
            EntityRef::Text(id) => find_mut(&mut self.texts, id, |t| &t.id).map(|t| t as &mut dyn Placed),
            EntityRef::Frame(id) => find_mut(&mut self.frames, id, |f| &f.id).map(|f| f as &mut dyn Placed),
            EntityRef::Arrow(_) => None,
        };
        let Some(placed) = placed else {
            return false;
        };
        placed.set_position(to);
        true
    }

    /// Resize an entity, clamped to its kind's minimum. Returns `false` if it
    /// is missing or not resizable.
    pub fn resize_entity(&mut self, target: &EntityRef, width: f64, height: f64) -> bool {
        match target {
            EntityRef::Shape(id) => resize_in(&mut self.shapes, id, |s| &s.id, width, height),
            EntityRef::Text(id) => resize_in(&mut self.texts, id, |t| &t.id, width, height),
            EntityRef::Frame(id) => resize_in(&mut self.frames, id, |f| &f.id, width, height),
            EntityRef::Note(_) | EntityRef::Arrow(_) => false,
        }
    }

    /// Place one endpoint of an arrow. Returns `false` if the arrow is missing.
    pub fn set_arrow_endpoint(&mut self, id: &str, end: ArrowEnd, to: Point) -> bool {
        let Some(arrow) = self.arrows.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        match end {
            ArrowEnd::Start => arrow.start = to,
            ArrowEnd::End => arrow.end = to,
        }
        true
    }

    /// Replace the body text of a note or text box.
    pub fn set_text(&mut self, target: &EntityRef, text: String) -> bool {
        match target {
            EntityRef::Note(id) => match find_mut(&mut self.notes, id, |n| &n.id) {
                Some(note) => {
                    note.text = text;
                    true
                }
                None => false,
            },
            EntityRef::Text(id) => match find_mut(&mut self.texts, id, |t| &t.id) {
                Some(tb) => {
                    tb.text = text;
                    true
                }
                None => false,
            },
            EntityRef::Shape(_) | EntityRef::Arrow(_) | EntityRef::Frame(_) => false,
        }
    }
}

fn find<'a, T>(items: &'a [T], id: &str, key: impl Fn(&T) -> &String) -> Option<&'a T> {
    items.iter().find(|item| key(item) == id)
}

fn find_mut<'a, T>(items: &'a mut [T], id: &str, key: impl Fn(&T) -> &String) -> Option<&'a mut T> {
    items.iter_mut().find(|item| key(item) == id)
}

fn resize_in<T: Resizable>(items: &mut [T], id: &str, key: impl Fn(&T) -> &String, width: f64, height: f64) -> bool {
    let Some(item) = find_mut(items, id, key) else {
        return false;
    };
    item.resize(width, height);
    true
}
