#![allow(clippy::float_cmp)]

use super::*;
use crate::field::FieldKind;

// =============================================================
// Helpers
// =============================================================

fn pos(top: f64, left: f64) -> FieldPosition {
    FieldPosition::new(top, left)
}

fn keys(names: &[&str]) -> Vec<FieldKey> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn core_with(entries: &[(&str, f64, f64)]) -> EngineCore {
    let mut core = EngineCore::new();
    core.load_fields(vec![
        FieldConfig::new("name", "Petitioner name", FieldKind::Text),
        FieldConfig::new("agree", "", FieldKind::Checkbox),
    ]);
    core.load_positions(entries.iter().map(|(k, t, l)| ((*k).to_string(), pos(*t, *l))));
    core.set_edit_mode(true);
    core.set_container(Some(ContainerSize::new(1000.0, 1000.0)));
    core
}

fn fire_due(core: &mut EngineCore) -> Vec<Action> {
    let due = core.scheduler_mut().take_due();
    due.into_iter().flat_map(|h| core.on_frame(h)).collect()
}

// =============================================================
// Drag through the core
// =============================================================

#[test]
fn release_commits_and_announces_with_label() {
    let mut core = core_with(&[("name", 10.0, 10.0)]);
    core.on_pointer_down("name", Point::new(0.0, 0.0)).unwrap();
    core.on_pointer_move(Point::new(100.0, 50.0));
    assert_eq!(fire_due(&mut core).len(), 1);

    let actions = core.on_pointer_up();
    assert!(actions.contains(&Action::Committed { key: "name".into(), position: pos(15.0, 20.0) }));
    assert_eq!(actions.last(), Some(&Action::Announce("Petitioner name repositioned".into())));
    assert_eq!(core.position("name"), Some(pos(15.0, 20.0)));
}

#[test]
fn announcement_falls_back_to_key_without_label() {
    let mut core = core_with(&[("agree", 10.0, 10.0)]);
    core.on_pointer_down("agree", Point::new(0.0, 0.0)).unwrap();
    core.on_pointer_move(Point::new(10.0, 0.0));

    let actions = core.on_pointer_up();
    assert_eq!(actions.last(), Some(&Action::Announce("agree repositioned".into())));
}

#[test]
fn teardown_leaves_model_untouched() {
    let mut core = core_with(&[("name", 10.0, 10.0)]);
    core.on_pointer_down("name", Point::new(0.0, 0.0)).unwrap();
    core.on_pointer_move(Point::new(300.0, 300.0));

    core.teardown();
    assert!(fire_due(&mut core).is_empty());
    assert_eq!(core.position("name"), Some(pos(10.0, 10.0)));
}

#[test]
fn committed_model_is_read_only_while_dragging() {
    let mut core = core_with(&[("name", 10.0, 10.0)]);
    core.on_pointer_down("name", Point::new(0.0, 0.0)).unwrap();
    core.on_pointer_move(Point::new(200.0, 200.0));
    fire_due(&mut core);

    assert!(core.drag().is_dragging());
    assert_eq!(core.positions().get("name"), Some(pos(10.0, 10.0)));
    assert_eq!(core.set_position("name", pos(1.0, 1.0)), Err(LayoutError::DragInProgress));

    core.on_pointer_up();
    assert!(!core.drag().is_dragging());
    assert_eq!(core.positions().get("name"), Some(pos(30.0, 30.0)));
}

// =============================================================
// Layout through the core
// =============================================================

#[test]
fn layout_is_refused_during_drag() {
    let mut core = core_with(&[("a", 10.0, 10.0), ("b", 20.0, 20.0)]);
    core.on_pointer_down("a", Point::new(0.0, 0.0)).unwrap();

    let selection = keys(&["a", "b"]);
    assert_eq!(core.apply_layout(LayoutOp::Align(Alignment::Left), &selection), Err(LayoutError::DragInProgress));
    assert_eq!(core.paste(&selection), Err(LayoutError::DragInProgress));
    assert_eq!(core.set_position("a", pos(1.0, 1.0)), Err(LayoutError::DragInProgress));

    core.on_pointer_up();
    assert!(core.apply_layout(LayoutOp::Align(Alignment::Left), &selection).is_ok());
    assert_eq!(core.position("b"), Some(pos(20.0, 10.0)));
}

#[test]
fn layout_commits_every_patched_field() {
    let mut core = core_with(&[("a", 12.0, 13.0), ("b", 21.0, 22.0), ("c", 50.0, 50.0)]);
    let actions = core
        .apply_layout(LayoutOp::SnapToGrid(5.0), &keys(&["a", "b"]))
        .unwrap();

    assert_eq!(actions.len(), 2);
    assert_eq!(core.position("a"), Some(pos(10.0, 15.0)));
    assert_eq!(core.position("b"), Some(pos(20.0, 20.0)));
    assert_eq!(core.position("c"), Some(pos(50.0, 50.0)));
}

#[test]
fn invalid_layout_writes_nothing() {
    let mut core = core_with(&[("a", 12.0, 13.0)]);
    let before = core.positions().clone();
    assert!(core.apply_layout(LayoutOp::SnapToGrid(-1.0), &keys(&["a"])).is_err());
    assert_eq!(*core.positions(), before);
}

#[test]
fn copy_then_paste_round_trips_through_clipboard() {
    let mut core = core_with(&[("a", 10.0, 10.0), ("b", 50.0, 50.0)]);
    assert_eq!(core.copy(&keys(&["a"])), 1);
    assert_eq!(core.clipboard().len(), 1);

    core.paste(&keys(&["b"])).unwrap();
    assert_eq!(core.position("b"), Some(pos(12.0, 12.0)));
}

#[test]
fn every_commit_path_respects_bounds() {
    let mut core = core_with(&[("a", 90.0, 90.0), ("b", 5.0, 5.0)]);
    let selection = keys(&["a", "b"]);

    let offset = Transform { offset_x: Some(20.0), offset_y: Some(-20.0), scale: None };
    core.apply_layout(LayoutOp::Transform(offset), &selection).unwrap();
    core.apply_layout(LayoutOp::Transform(Transform { scale: Some(4.0), ..Transform::default() }), &selection)
        .unwrap();
    core.copy(&selection);
    core.paste(&keys(&["a"])).unwrap();

    core.on_pointer_down("b", Point::new(0.0, 0.0)).unwrap();
    core.on_pointer_move(Point::new(-9000.0, 9000.0));
    core.on_pointer_up();

    for (_, position) in core.positions().iter() {
        assert!(position.is_within_bounds(), "{position:?}");
    }
}
