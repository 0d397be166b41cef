#![allow(clippy::float_cmp)]

use super::*;
use crate::export::test_helpers::{first_page, plain_page, sample_form};

fn sample() -> Document {
    Document::load_mem(&sample_form()).unwrap()
}

#[test]
fn collects_terminal_fields_by_full_name() {
    let fields = collect_fields(&sample());
    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["agree", "applicant.first", "count", "name", "submit"]);
}

#[test]
fn kinds_follow_type_and_flags() {
    let fields = collect_fields(&sample());
    assert_eq!(fields["name"].kind, WidgetKind::Text);
    assert_eq!(fields["agree"].kind, WidgetKind::Checkbox);
    assert_eq!(fields["submit"].kind, WidgetKind::PushButton);
    assert_eq!(fields["applicant.first"].kind, WidgetKind::Text);
}

#[test]
fn merged_field_is_its_own_widget() {
    let doc = sample();
    let fields = collect_fields(&doc);
    let name = &fields["name"];

    assert_eq!(name.widgets.len(), 1);
    assert_eq!(name.widgets[0].id, name.field_id);
    assert_eq!(name.widgets[0].page, Some(first_page(&doc)));
    assert_eq!(name.widgets[0].rect, Some(Rect { x0: 72.0, y0: 700.0, x1: 300.0, y1: 720.0 }));
}

#[test]
fn widget_kid_without_page_link_is_found_through_annots() {
    let doc = sample();
    let fields = collect_fields(&doc);
    let first = &fields["applicant.first"];

    assert_eq!(first.widgets.len(), 1);
    assert_ne!(first.widgets[0].id, first.field_id);
    assert_eq!(first.widgets[0].page, Some(first_page(&doc)));
}

#[test]
fn on_state_comes_from_normal_appearance() {
    let doc = sample();
    let fields = collect_fields(&doc);
    let agree = &fields["agree"];
    assert_eq!(on_state(&doc, agree.widgets[0].id), Some(b"On".to_vec()));
    assert_eq!(on_state(&doc, fields["name"].field_id), None);
}

#[test]
fn document_without_acroform_has_no_fields() {
    let doc = Document::load_mem(&plain_page()).unwrap();
    assert!(collect_fields(&doc).is_empty());
}

#[test]
fn media_box_is_inherited_from_page_tree() {
    let doc = sample();
    let (x, y, size) = page_box(&doc, first_page(&doc)).unwrap();
    assert_eq!((x, y), (0.0, 0.0));
    assert_eq!(size, PageSize::LETTER);
}

#[test]
fn utf16_titles_are_decoded() {
    let title = Object::String(vec![0xFE, 0xFF, 0x00, b'N', 0x00, 0xE9], lopdf::StringFormat::Hexadecimal);
    assert_eq!(text_string(&title).as_deref(), Some("Né"));
}
