//! In-memory PDF fixtures for export tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
    Object::Array(vec![x0.into(), y0.into(), x1.into(), y1.into()])
}

/// One US Letter page with a header line and this AcroForm:
///
/// - `name`: text field, widget rect `[72 700 300 720]`
/// - `count`: text field, widget rect `[72 600 200 620]`
/// - `agree`: checkbox whose on-state is `On`
/// - `applicant`: parent of `applicant.first` (text, one widget kid)
/// - `submit`: push button
pub fn sample_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let body = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 14.into()]),
            Operation::new("Td", vec![72.into(), 750.into()]),
            Operation::new("Tj", vec![Object::string_literal("Petition header")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), body.encode().unwrap()));

    let header_font = doc.add_object(Dictionary::from_iter([
        ("Type", name("Font")),
        ("Subtype", name("Type1")),
        ("BaseFont", name("Times-Roman")),
    ]));

    let text_widget = |doc: &mut Document, title: &str, r: Object| {
        doc.add_object(Dictionary::from_iter([
            ("Type", name("Annot")),
            ("Subtype", name("Widget")),
            ("FT", name("Tx")),
            ("T", Object::string_literal(title)),
            ("Rect", r),
            ("P", Object::Reference(page_id)),
        ]))
    };
    let name_id = text_widget(&mut doc, "name", rect(72, 700, 300, 720));
    let count_id = text_widget(&mut doc, "count", rect(72, 600, 200, 620));

    let on_ap = doc.add_object(Stream::new(Dictionary::new(), b"0 g".to_vec()));
    let off_ap = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
    let agree_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Annot")),
        ("Subtype", name("Widget")),
        ("FT", name("Btn")),
        ("T", Object::string_literal("agree")),
        ("Rect", rect(72, 500, 86, 514)),
        ("V", name("Off")),
        ("AS", name("Off")),
        (
            "AP",
            Object::Dictionary(Dictionary::from_iter([(
                "N",
                Object::Dictionary(Dictionary::from_iter([
                    ("On", Object::Reference(on_ap)),
                    ("Off", Object::Reference(off_ap)),
                ])),
            )])),
        ),
    ]));

    let applicant_id = doc.new_object_id();
    let first_id = doc.new_object_id();
    let first_widget_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Annot")),
        ("Subtype", name("Widget")),
        ("Parent", Object::Reference(first_id)),
        ("Rect", rect(300, 400, 500, 420)),
    ]));
    doc.objects.insert(
        first_id,
        Object::Dictionary(Dictionary::from_iter([
            ("T", Object::string_literal("first")),
            ("Parent", Object::Reference(applicant_id)),
            ("Kids", Object::Array(vec![Object::Reference(first_widget_id)])),
        ])),
    );
    doc.objects.insert(
        applicant_id,
        Object::Dictionary(Dictionary::from_iter([
            ("T", Object::string_literal("applicant")),
            ("FT", name("Tx")),
            ("Kids", Object::Array(vec![Object::Reference(first_id)])),
        ])),
    );

    let submit_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Annot")),
        ("Subtype", name("Widget")),
        ("FT", name("Btn")),
        ("Ff", Object::Integer(1 << 16)),
        ("T", Object::string_literal("submit")),
        ("Rect", rect(72, 100, 150, 130)),
        ("P", Object::Reference(page_id)),
    ]));

    let annots: Vec<Object> = [name_id, count_id, agree_id, first_widget_id, submit_id]
        .into_iter()
        .map(Object::Reference)
        .collect();
    doc.objects.insert(
        page_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", name("Page")),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "Resources",
                Object::Dictionary(Dictionary::from_iter([(
                    "Font",
                    Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(header_font))])),
                )])),
            ),
            ("Annots", Object::Array(annots)),
        ])),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", name("Pages")),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
            ("MediaBox", rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT)),
        ])),
    );

    let fields: Vec<Object> = [name_id, count_id, agree_id, applicant_id, submit_id]
        .into_iter()
        .map(Object::Reference)
        .collect();
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Catalog")),
        ("Pages", Object::Reference(pages_id)),
        ("AcroForm", Object::Dictionary(Dictionary::from_iter([("Fields", Object::Array(fields))]))),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    save(&mut doc)
}

/// A single blank page with no AcroForm.
pub fn plain_page() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Page")),
        ("Parent", Object::Reference(pages_id)),
        ("MediaBox", rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT)),
    ]));
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", name("Pages")),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", name("Catalog")),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    save(&mut doc)
}

fn save(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().get(&1).unwrap()
}

/// Decoded operations of page 1, across all of its content streams.
pub fn page_operations(pdf: &[u8]) -> Vec<Operation> {
    let doc = Document::load_mem(pdf).unwrap();
    let content = doc.get_page_content(first_page(&doc)).unwrap();
    Content::decode(&content).unwrap().operations
}

/// Text shown by every `Tj` on page 1, in order.
pub fn shown_text(pdf: &[u8]) -> Vec<String> {
    page_operations(pdf)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// `Td` operand pairs on page 1, in order.
pub fn text_origins(pdf: &[u8]) -> Vec<(f64, f64)> {
    page_operations(pdf)
        .into_iter()
        .filter(|op| op.operator == "Td" && op.operands.len() == 2)
        .map(|op| {
            let x = op.operands[0].as_float().unwrap();
            let y = op.operands[1].as_float().unwrap();
            (f64::from(x), f64::from(y))
        })
        .collect()
}
