#![allow(clippy::float_cmp)]

use super::*;

fn pos(top: f64, left: f64) -> FieldPosition {
    FieldPosition::new(top, left)
}

#[test]
fn set_clamps_and_preserves_insertion_order() {
    let mut map = PositionMap::new();
    map.set("b", pos(10.0, 10.0));
    map.set("a", pos(-5.0, 200.0));
    map.set("c", pos(1.0, 2.0));

    assert_eq!(map.get("a"), Some(pos(0.0, 95.0)));
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["b", "a", "c"]);
}

#[test]
fn overwrite_keeps_original_slot() {
    let mut map = PositionMap::new();
    map.set("a", pos(1.0, 1.0));
    map.set("b", pos(2.0, 2.0));
    map.set("a", pos(3.0, 3.0));

    let entries: Vec<(String, FieldPosition)> = map.iter().map(|(k, p)| (k.clone(), p)).collect();
    assert_eq!(entries, vec![("a".to_string(), pos(3.0, 3.0)), ("b".to_string(), pos(2.0, 2.0))]);
}

#[test]
fn apply_patch_writes_every_entry_clamped() {
    let mut map: PositionMap = vec![("a".to_string(), pos(1.0, 1.0))].into_iter().collect();
    let mut patch = PositionPatch::new();
    patch.push("a", pos(99.0, 4.0));
    patch.push("z", pos(5.0, 5.0));

    assert_eq!(map.apply(&patch), 2);
    assert_eq!(map.get("a"), Some(pos(95.0, 4.0)));
    assert_eq!(map.get("z"), Some(pos(5.0, 5.0)));
    assert_eq!(patch.get("a"), Some(pos(99.0, 4.0)));
}

#[test]
fn remove_drops_key_from_order() {
    let mut map = PositionMap::new();
    map.set("a", pos(1.0, 1.0));
    map.set("b", pos(2.0, 2.0));

    assert_eq!(map.remove("a"), Some(pos(1.0, 1.0)));
    assert_eq!(map.remove("a"), None);
    assert_eq!(map.len(), 1);
    assert!(!map.contains("a"));
}

#[test]
fn json_round_trip_keeps_document_order() {
    let raw = r#"{"zeta":{"top":10.0,"left":20.0},"alpha":{"top":30.5,"left":40.0}}"#;
    let map: PositionMap = serde_json::from_str(raw).unwrap();

    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["zeta", "alpha"]);
    assert_eq!(serde_json::to_string(&map).unwrap(), raw);
}

#[test]
fn load_clamps_out_of_range_snapshot() {
    let mut map = PositionMap::new();
    map.load(vec![("a".to_string(), pos(120.0, -1.0))]);
    assert!(map.get("a").is_some_and(FieldPosition::is_within_bounds));
}
