#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::{ArrowEnd, BoardState, EntityRef};
use crate::render::{self, HandleKind, Overlay, OverlayBody};

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
    ArrowEndpoint(ArrowEnd),
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub target: EntityRef,
    pub part: HitPart,
}

/// Test which entity (if any) is under `board_pt`.
///
/// Handles win over bodies, and later overlay layers win over earlier ones.
/// Arrows are grabbed only by their endpoint handles and cursors are never hit.
#[must_use]
pub fn hit_test(board_pt: Point, board: &BoardState, selected: Option<&EntityRef>) -> Option<Hit> {
    let layers = render::overlays(board, selected, None);
    hit_handles(board_pt, &layers).or_else(|| hit_bodies(board_pt, &layers))
}

fn hit_handles(p: Point, layers: &[Overlay]) -> Option<Hit> {
    for overlay in layers.iter().rev() {
        let Some(target) = &overlay.target else {
            continue;
        };
        if let Some(handle) = overlay.handles.iter().rev().find(|h| h.contains(p)) {
            let part = match handle.kind {
                HandleKind::Resize => HitPart::ResizeHandle,
                HandleKind::ArrowStart => HitPart::ArrowEndpoint(ArrowEnd::Start),
                HandleKind::ArrowEnd => HitPart::ArrowEndpoint(ArrowEnd::End),
            };
            return Some(Hit { target: target.clone(), part });
        }
    }
    None
}

fn hit_bodies(p: Point, layers: &[Overlay]) -> Option<Hit> {
    layers
        .iter()
        .rev()
        .filter(|o| !matches!(o.body, OverlayBody::Arrow { .. } | OverlayBody::Cursor { .. }))
        .find(|o| o.bounds.contains(p))
        .and_then(|o| o.target.clone())
        .map(|target| Hit { target, part: HitPart::Body })
}
