#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::{FRAME_MIN_SIZE, SHAPE_MIN_SIZE, TEXT_MIN_SIZE};
use crate::doc::PathMode;
use crate::render::Composite;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_board_changed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::BoardChanged))
}

fn down(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary)
}

fn drag(core: &mut EngineCore, from: (f64, f64), to: &[(f64, f64)]) {
    down(core, from.0, from.1);
    for &(x, y) in to {
        core.on_pointer_move(pt(x, y));
    }
    core.on_pointer_up();
}

fn core_with_tool(tool: Tool) -> EngineCore {
    let mut core = EngineCore::new();
    core.set_tool(tool);
    core
}

fn add_text_box(core: &mut EngineCore, id: &str, x: f64, y: f64) -> EntityRef {
    core.board.texts.push(TextBox { id: id.into(), x, y, width: 220.0, height: 80.0, text: String::new() });
    EntityRef::Text(id.into())
}

// =============================================================
// EngineCore: construction and defaults
// =============================================================

#[test]
fn core_new_is_empty_and_idle() {
    let core = EngineCore::new();
    assert!(core.selection().is_none());
    assert!(core.input.is_idle());
    assert_eq!(core.camera(), Camera::default());
    assert_eq!(core.board, BoardState::new());
    assert_eq!(core.ui.tool, Tool::Select);
}

// =============================================================
// Freehand paths
// =============================================================

#[test]
fn pen_three_point_stroke_commits_unchanged() {
    let mut core = core_with_tool(Tool::Pen);
    core.set_stroke("#111111");
    drag(&mut core, (0.0, 0.0), &[(5.0, 5.0), (10.0, 10.0)]);

    assert_eq!(core.board.paths.len(), 1);
    let path = &core.board.paths[0];
    assert_eq!(path.points, vec![pt(0.0, 0.0), pt(5.0, 5.0), pt(10.0, 10.0)]);
    assert_eq!(path.mode, PathMode::Draw);
    assert_eq!(path.color, "#111111");
    assert_eq!(path.width, 3.0);
}

#[test]
fn single_point_path_is_discarded() {
    let mut core = core_with_tool(Tool::Pen);
    down(&mut core, 1.0, 1.0);
    let actions = core.on_pointer_up();
    assert!(core.board.paths.is_empty());
    assert!(!has_board_changed(&actions));
    assert!(core.input.is_idle());
}

#[test]
fn two_point_path_is_committed() {
    let mut core = core_with_tool(Tool::Pen);
    down(&mut core, 1.0, 1.0);
    core.on_pointer_move(pt(2.0, 2.0));
    let actions = core.on_pointer_up();
    assert_eq!(core.board.paths.len(), 1);
    assert!(has_board_changed(&actions));
}

#[test]
fn active_path_is_not_on_board_until_commit() {
    let mut core = core_with_tool(Tool::Pen);
    down(&mut core, 0.0, 0.0);
    let actions = core.on_pointer_move(pt(5.0, 5.0));
    assert!(core.board.paths.is_empty());
    assert!(!has_board_changed(&actions));
    assert_eq!(core.input.active_path().map(|p| p.points.len()), Some(2));
}

#[test]
fn eraser_forces_width_and_erase_mode() {
    let mut core = core_with_tool(Tool::Eraser);
    core.set_stroke("#444444");
    drag(&mut core, (0.0, 0.0), &[(10.0, 0.0)]);
    let path = &core.board.paths[0];
    assert_eq!(path.width, 18.0);
    assert_eq!(path.mode, PathMode::Erase);
}

#[test]
fn pen_down_begins_live_sub_path_in_screen_space() {
    let mut core = core_with_tool(Tool::Pen);
    core.camera = Camera { offset: pt(10.0, 20.0), scale: 2.0 };
    let actions = down(&mut core, 30.0, 40.0);
    let Some(Action::LivePaint(cmds)) = actions.first() else {
        panic!("expected live paint, got {actions:?}");
    };
    assert!(cmds.contains(&PaintCommand::BeginPath));
    assert!(cmds.contains(&PaintCommand::MoveTo(pt(30.0, 40.0))));
    // Stored point is in board space.
    assert_eq!(core.input.active_path().map(|p| p.points[0]), Some(pt(10.0, 10.0)));
}

#[test]
fn pen_move_paints_segment_from_previous_point() {
    let mut core = core_with_tool(Tool::Eraser);
    down(&mut core, 0.0, 0.0);
    let actions = core.on_pointer_move(pt(4.0, 3.0));
    let segment = actions
        .iter()
        .find_map(|a| match a {
            Action::LivePaint(cmds) => Some(cmds.clone()),
            _ => None,
        })
        .unwrap();
    assert!(segment.contains(&PaintCommand::MoveTo(pt(0.0, 0.0))));
    assert!(segment.contains(&PaintCommand::LineTo(pt(4.0, 3.0))));
    assert!(segment.iter().any(|c| matches!(
        c,
        PaintCommand::SetStroke { composite: Composite::DestinationOut, width, .. } if *width == 18.0
    )));
}

// =============================================================
// Creation tools
// =============================================================

#[test]
fn rect_drag_defines_extent() {
    let mut core = core_with_tool(Tool::Rect);
    drag(&mut core, (50.0, 50.0), &[(150.0, 130.0)]);
    assert_eq!(core.board.shapes.len(), 1);
    let shape = &core.board.shapes[0];
    assert_eq!((shape.x, shape.y), (50.0, 50.0));
    // Grows from the 10x10 seed by the drag delta (100, 80).
    assert_eq!((shape.width, shape.height), (110.0, 90.0));
    assert_eq!(shape.kind, ShapeKind::Rect);
}

#[test]
fn rect_small_drag_clamps_to_minimum() {
    let mut core = core_with_tool(Tool::Rect);
    drag(&mut core, (0.0, 0.0), &[(3.0, 2.0)]);
    let shape = &core.board.shapes[0];
    assert_eq!((shape.width, shape.height), SHAPE_MIN_SIZE);
}

#[test]
fn rect_down_selects_and_starts_resize() {
    let mut core = core_with_tool(Tool::Rect);
    let actions = down(&mut core, 5.0, 5.0);
    assert!(has_board_changed(&actions));
    let id = core.board.shapes[0].id.clone();
    assert_eq!(core.selection(), Some(&EntityRef::Shape(id)));
    assert!(matches!(core.input.drag(), Some(Drag::Resize { origin_size, .. }) if *origin_size == (10.0, 10.0)));
    assert_eq!(core.ui.tool, Tool::Rect);
}

#[test]
fn note_colors_round_robin_and_tool_returns_to_select() {
    let mut core = EngineCore::new();
    for i in 0..5 {
        core.set_tool(Tool::Note);
        // Spread notes out so none intercepts the next pointer-down.
        down(&mut core, f64::from(i) * 1000.0, 0.0);
        core.on_pointer_up();
        assert_eq!(core.ui.tool, Tool::Select);
    }
    let colors: Vec<_> = core.board.notes.iter().map(|n| n.color.as_str()).collect();
    assert_eq!(colors, [NOTE_COLORS[0], NOTE_COLORS[1], NOTE_COLORS[2], NOTE_COLORS[3], NOTE_COLORS[0]]);
    assert!(core.board.notes.iter().all(|n| n.text == NOTE_PLACEHOLDER));
}

#[test]
fn text_tool_creates_selected_box() {
    let mut core = core_with_tool(Tool::Text);
    let actions = down(&mut core, 12.0, 34.0);
    assert!(has_board_changed(&actions));
    let tb = &core.board.texts[0];
    assert_eq!((tb.x, tb.y, tb.width, tb.height), (12.0, 34.0, 220.0, 80.0));
    assert_eq!(core.selection(), Some(&EntityRef::Text(tb.id.clone())));
    assert_eq!(core.ui.tool, Tool::Select);
    assert!(core.input.is_idle());
}

#[test]
fn arrow_tool_drags_end_point() {
    let mut core = core_with_tool(Tool::Arrow);
    core.set_stroke("#6b6b6b");
    drag(&mut core, (10.0, 10.0), &[(20.0, 20.0), (70.0, 40.0)]);
    let arrow = &core.board.arrows[0];
    assert_eq!(arrow.start, pt(10.0, 10.0));
    assert_eq!(arrow.end, pt(70.0, 40.0));
    assert_eq!(arrow.color, "#6b6b6b");
}

#[test]
fn arrow_without_move_is_degenerate_but_kept() {
    let mut core = core_with_tool(Tool::Arrow);
    down(&mut core, 10.0, 10.0);
    core.on_pointer_up();
    assert_eq!(core.board.arrows.len(), 1);
    assert_eq!(core.board.arrows[0].start, core.board.arrows[0].end);
}

#[test]
fn frame_tool_resizes_from_default() {
    let mut core = core_with_tool(Tool::Frame);
    drag(&mut core, (0.0, 0.0), &[(50.0, 10.0)]);
    let frame = &core.board.frames[0];
    assert_eq!((frame.width, frame.height), (250.0, 150.0));
    assert_eq!(frame.title, FRAME_DEFAULT_TITLE);
}

#[test]
fn frame_resize_never_below_floor() {
    let mut core = core_with_tool(Tool::Frame);
    drag(&mut core, (0.0, 0.0), &[(-900.0, -900.0)]);
    let frame = &core.board.frames[0];
    assert_eq!((frame.width, frame.height), FRAME_MIN_SIZE);
}

// =============================================================
// Select / move / resize of existing entities
// =============================================================

#[test]
fn select_on_empty_board_clears_selection() {
    let mut core = EngineCore::new();
    core.ui.selected = Some(EntityRef::Note("n".into()));
    down(&mut core, 500.0, 500.0);
    assert!(core.selection().is_none());
}

#[test]
fn pointer_down_on_entity_selects_and_moves_it() {
    let mut core = EngineCore::new();
    let target = add_text_box(&mut core, "t1", 100.0, 100.0);
    down(&mut core, 110.0, 110.0);
    assert_eq!(core.selection(), Some(&target));
    let actions = core.on_pointer_move(pt(140.0, 90.0));
    assert!(has_board_changed(&actions));
    core.on_pointer_up();
    assert_eq!(core.board.position_of(&target), Some(pt(130.0, 80.0)));
    assert_eq!(core.board.size_of(&target), Some((220.0, 80.0)));
}

#[test]
fn entity_intercepts_creation_tools() {
    let mut core = core_with_tool(Tool::Pen);
    add_text_box(&mut core, "t1", 0.0, 0.0);
    down(&mut core, 10.0, 10.0);
    assert!(core.input.active_path().is_none());
    assert!(matches!(core.input.drag(), Some(Drag::Move { .. })));
}

#[test]
fn move_uses_board_space_delta_under_zoom() {
    let mut core = EngineCore::new();
    core.camera.scale = 2.0;
    let target = add_text_box(&mut core, "t1", 0.0, 0.0);
    drag(&mut core, (20.0, 20.0), &[(60.0, 20.0)]);
    assert_eq!(core.board.position_of(&target), Some(pt(20.0, 0.0)));
}

#[test]
fn resize_handle_resizes_without_moving() {
    let mut core = EngineCore::new();
    let target = add_text_box(&mut core, "t1", 0.0, 0.0);
    core.ui.selected = Some(target.clone());
    // Handle sits 14 units in from the bottom-right corner.
    drag(&mut core, (206.0, 66.0), &[(106.0, 200.0)]);
    assert_eq!(core.board.position_of(&target), Some(pt(0.0, 0.0)));
    assert_eq!(core.board.size_of(&target), Some((120.0, 214.0)));
}

#[test]
fn resize_floor_holds_for_any_delta() {
    let deltas = [(-1000.0, -1000.0), (-150.0, 3.0), (0.0, -79.0), (500.0, -500.0), (-0.5, -0.5)];
    for (dx, dy) in deltas {
        let mut core = EngineCore::new();
        let target = add_text_box(&mut core, "t", 0.0, 0.0);
        let grip = Hit { target: target.clone(), part: HitPart::ResizeHandle };
        core.on_entity_pointer_down(grip, pt(0.0, 0.0), Button::Primary);
        core.on_pointer_move(pt(dx, dy));
        let (w, h) = core.board.size_of(&target).unwrap();
        assert!(w >= TEXT_MIN_SIZE.0 && h >= TEXT_MIN_SIZE.1, "delta ({dx},{dy}) gave {w}x{h}");
    }
}

#[test]
fn arrow_start_handle_places_start_directly() {
    let mut core = EngineCore::new();
    core.board.arrows.push(Arrow { id: "a".into(), start: pt(0.0, 0.0), end: pt(100.0, 0.0), color: "#111111".into() });
    drag(&mut core, (2.0, 1.0), &[(-30.0, 45.0)]);
    assert_eq!(core.board.arrows[0].start, pt(-30.0, 45.0));
    assert_eq!(core.board.arrows[0].end, pt(100.0, 0.0));
    assert_eq!(core.selection(), Some(&EntityRef::Arrow("a".into())));
}

#[test]
fn drag_on_vanished_entity_is_noop() {
    let mut core = EngineCore::new();
    add_text_box(&mut core, "t1", 0.0, 0.0);
    down(&mut core, 10.0, 10.0);
    core.load_snapshot(BoardState::new());
    let actions = core.on_pointer_move(pt(50.0, 50.0));
    assert!(!has_board_changed(&actions));
    assert!(core.board.texts.is_empty());
    core.on_pointer_up();
    assert!(core.input.is_idle());
}

#[test]
fn entity_pointer_down_on_missing_entity_is_ignored() {
    let mut core = EngineCore::new();
    let hit = Hit { target: EntityRef::Frame("nope".into()), part: HitPart::Body };
    assert!(core.on_entity_pointer_down(hit, pt(0.0, 0.0), Button::Primary).is_empty());
    assert!(core.selection().is_none());
    assert!(core.input.is_idle());
}

// =============================================================
// Pan / view
// =============================================================

#[test]
fn pan_uses_screen_space_delta() {
    let mut core = core_with_tool(Tool::Pan);
    core.camera = Camera { offset: pt(10.0, 10.0), scale: 2.0 };
    down(&mut core, 100.0, 100.0);
    let actions = core.on_pointer_move(pt(130.0, 80.0));
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged)));
    assert!(!has_board_changed(&actions));
    assert_eq!(core.camera.offset, pt(40.0, -10.0));
    core.on_pointer_move(pt(100.0, 100.0));
    assert_eq!(core.camera.offset, pt(10.0, 10.0));
}

#[test]
fn zoom_and_reset_touch_only_the_view() {
    let mut core = EngineCore::new();
    core.camera.offset = pt(3.0, 4.0);
    let actions = core.zoom_by(0.5);
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged)));
    assert_eq!(core.camera.scale, 1.5);
    core.reset_view();
    assert_eq!(core.camera.offset, pt(0.0, 0.0));
    assert_eq!(core.camera.scale, 1.5);
}

// =============================================================
// Gesture guards
// =============================================================

#[test]
fn non_primary_buttons_are_ignored() {
    let mut core = core_with_tool(Tool::Note);
    assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Secondary).is_empty());
    assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Middle).is_empty());
    assert!(core.board.notes.is_empty());
}

#[test]
fn second_pointer_down_while_active_is_ignored() {
    let mut core = core_with_tool(Tool::Pen);
    down(&mut core, 0.0, 0.0);
    core.set_tool(Tool::Rect);
    assert!(down(&mut core, 50.0, 50.0).is_empty());
    assert!(core.board.shapes.is_empty());
    assert!(core.input.active_path().is_some());
}

#[test]
fn pointer_leave_behaves_like_pointer_up() {
    let mut core = core_with_tool(Tool::Pen);
    down(&mut core, 0.0, 0.0);
    core.on_pointer_move(pt(1.0, 1.0));
    let actions = core.on_pointer_leave();
    assert!(has_board_changed(&actions));
    assert_eq!(core.board.paths.len(), 1);
    assert!(core.input.is_idle());

    let mut core = core_with_tool(Tool::Frame);
    down(&mut core, 0.0, 0.0);
    core.on_pointer_leave();
    assert!(core.input.drag().is_none());
}

#[test]
fn every_move_reports_cursor_in_board_space() {
    let mut core = EngineCore::new();
    core.camera = Camera { offset: pt(100.0, 0.0), scale: 0.5 };
    let actions = core.on_pointer_move(pt(110.0, 10.0));
    assert_eq!(actions.last(), Some(&Action::CursorMoved(pt(20.0, 20.0))));
}

// =============================================================
// Text editing
// =============================================================

#[test]
fn set_text_reports_board_change() {
    let mut core = EngineCore::new();
    let target = add_text_box(&mut core, "t1", 0.0, 0.0);
    let actions = core.set_text(&target, "hello".into());
    assert!(has_board_changed(&actions));
    assert_eq!(core.board.texts[0].text, "hello");
    assert!(core.set_text(&EntityRef::Note("nope".into()), "x".into()).is_empty());
}

#[test]
fn scene_excludes_local_cursor() {
    let mut core = EngineCore::new();
    core.board.cursors.upsert(crate::doc::Cursor {
        id: "me".into(),
        name: "Me".into(),
        color: "#3f7cff".into(),
        x: 0.0,
        y: 0.0,
    });
    assert!(core.scene(Some("me")).overlays.is_empty());
    assert_eq!(core.scene(Some("other")).overlays.len(), 1);
}
