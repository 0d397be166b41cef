//! AcroForm traversal: terminal fields by fully qualified name, with their widgets.
//!
//! A field's full name is its ancestors' partial names (`/T`) joined with `.`. A kid
//! without `/T` is a widget annotation of its parent; a field without kids is its own
//! widget. Field type (`/FT`) and flags (`/Ff`) are inherited down the tree.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::coords::{GeometryError, PageSize};

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;

const MAX_DEPTH: usize = 32;
const FLAG_RADIO: i64 = 1 << 15;
const FLAG_PUSHBUTTON: i64 = 1 << 16;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Text,
    Checkbox,
    Radio,
    PushButton,
    Choice,
    Signature,
    Unknown,
}

impl WidgetKind {
    fn from_type(field_type: Option<&[u8]>, flags: i64) -> Self {
        match field_type {
            Some(b"Tx") => Self::Text,
            Some(b"Btn") if flags & FLAG_PUSHBUTTON != 0 => Self::PushButton,
            Some(b"Btn") if flags & FLAG_RADIO != 0 => Self::Radio,
            Some(b"Btn") => Self::Checkbox,
            Some(b"Ch") => Self::Choice,
            Some(b"Sig") => Self::Signature,
            _ => Self::Unknown,
        }
    }
}

/// Axis-aligned rectangle in PDF user space, normalized so `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    fn from_object(doc: &Document, object: &Object) -> Option<Self> {
        let values = numbers(doc, object)?;
        let [a, b, c, d] = values[..] else {
            return None;
        };
        Some(Self { x0: a.min(c), y0: b.min(d), x1: a.max(c), y1: b.max(d) })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAnnot {
    pub id: ObjectId,
    pub page: Option<ObjectId>,
    pub rect: Option<Rect>,
}

/// A terminal form field: the object holding `/V` plus its widget annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: WidgetKind,
    pub field_id: ObjectId,
    pub widgets: Vec<WidgetAnnot>,
}

impl FormField {
    /// First widget placed on a page.
    #[must_use]
    pub fn placed_widget(&self) -> Option<&WidgetAnnot> {
        self.widgets.iter().find(|w| w.page.is_some())
    }
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Every terminal field in the document's AcroForm, keyed by full name.
///
/// A document without an AcroForm yields an empty map.
#[must_use]
pub fn collect_fields(doc: &Document) -> BTreeMap<String, FormField> {
    let mut fields = BTreeMap::new();
    let Some(roots) = catalog_fields(doc) else {
        return fields;
    };
    let pages = annotation_pages(doc);
    let mut walker = Walker { doc, pages: &pages, out: &mut fields };
    for root in roots {
        walker.visit(root, &Inherited::default(), 0);
    }
    fields
}

#[derive(Default, Clone)]
struct Inherited {
    name: Option<String>,
    field_type: Option<Vec<u8>>,
    flags: i64,
}

struct Walker<'a> {
    doc: &'a Document,
    pages: &'a HashMap<ObjectId, ObjectId>,
    out: &'a mut BTreeMap<String, FormField>,
}

impl Walker<'_> {
    fn visit(&mut self, id: ObjectId, parent: &Inherited, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }
        let Ok(dict) = self.doc.get_dictionary(id) else {
            return;
        };

        let name = match (&parent.name, dict.get(b"T").ok().and_then(text_string)) {
            (Some(p), Some(t)) => format!("{p}.{t}"),
            (None, Some(t)) => t,
            (Some(p), None) => p.clone(),
            (None, None) => return,
        };
        let here = Inherited {
            name: Some(name.clone()),
            field_type: dict
                .get(b"FT")
                .and_then(Object::as_name)
                .map(<[u8]>::to_vec)
                .ok()
                .or_else(|| parent.field_type.clone()),
            flags: dict.get(b"Ff").and_then(Object::as_i64).unwrap_or(parent.flags),
        };

        let kids = references(self.doc, dict.get(b"Kids").ok());
        let (child_fields, widget_kids): (Vec<ObjectId>, Vec<ObjectId>) = kids
            .into_iter()
            .partition(|kid| self.doc.get_dictionary(*kid).is_ok_and(|d| d.has(b"T")));

        for child in child_fields {
            self.visit(child, &here, depth + 1);
        }

        let mut widgets: Vec<WidgetAnnot> = widget_kids.iter().filter_map(|w| self.widget(*w)).collect();
        if widgets.is_empty() && is_widget(dict) {
            widgets.extend(self.widget(id));
        }
        if widgets.is_empty() && dict.has(b"Kids") {
            return;
        }

        let kind = WidgetKind::from_type(here.field_type.as_deref(), here.flags);
        self.out.insert(name.clone(), FormField { name, kind, field_id: id, widgets });
    }

    fn widget(&self, id: ObjectId) -> Option<WidgetAnnot> {
        let dict = self.doc.get_dictionary(id).ok()?;
        let page = dict
            .get(b"P")
            .and_then(Object::as_reference)
            .ok()
            .or_else(|| self.pages.get(&id).copied());
        let rect = dict.get(b"Rect").ok().and_then(|r| Rect::from_object(self.doc, r));
        Some(WidgetAnnot { id, page, rect })
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    dict.get(b"Subtype").and_then(Object::as_name).is_ok_and(|s| s == b"Widget") || dict.has(b"Rect")
}

fn catalog_fields(doc: &Document) -> Option<Vec<ObjectId>> {
    let catalog = doc.catalog().ok()?;
    let acroform = resolve_dict(doc, catalog.get(b"AcroForm").ok()?)?;
    Some(references(doc, acroform.get(b"Fields").ok()))
}

/// Map each annotation on any page to the page that lists it.
fn annotation_pages(doc: &Document) -> HashMap<ObjectId, ObjectId> {
    let mut map = HashMap::new();
    for page_id in doc.get_pages().into_values() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        for annot in references(doc, page.get(b"Annots").ok()) {
            map.insert(annot, page_id);
        }
    }
    map
}

// =============================================================================
// CHECKBOX STATE
// =============================================================================

/// The widget's "on" appearance state name: the first `/AP /N` key other than `Off`.
#[must_use]
pub fn on_state(doc: &Document, widget: ObjectId) -> Option<Vec<u8>> {
    let dict = doc.get_dictionary(widget).ok()?;
    let appearance = resolve_dict(doc, dict.get(b"AP").ok()?)?;
    let normal = resolve_dict(doc, appearance.get(b"N").ok()?)?;
    normal
        .iter()
        .map(|(key, _)| key)
        .find(|key| key.as_slice() != b"Off")
        .cloned()
}

// =============================================================================
// PAGE GEOMETRY
// =============================================================================

/// A page's media box: its lower-left origin and validated size.
///
/// Falls back to US Letter at the origin when no media box is present.
///
/// # Errors
///
/// Returns [`GeometryError`] when the media box has zero or non-finite extent.
pub fn page_box(doc: &Document, page_id: ObjectId) -> Result<(f64, f64, PageSize), GeometryError> {
    let Some(rect) = inherited(doc, page_id, b"MediaBox").and_then(|o| Rect::from_object(doc, o)) else {
        return Ok((0.0, 0.0, PageSize::LETTER));
    };
    Ok((rect.x0, rect.y0, PageSize::new(rect.width(), rect.height())?))
}

/// Look up `key` on a page, walking `/Parent` links for inheritable attributes.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

// =============================================================================
// OBJECT HELPERS
// =============================================================================

pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn resolve_array<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Vec<Object>> {
    match object {
        Object::Array(items) => Some(items),
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_array).ok(),
        _ => None,
    }
}

fn references(doc: &Document, object: Option<&Object>) -> Vec<ObjectId> {
    object
        .and_then(|o| resolve_array(doc, o))
        .map(|items| items.iter().filter_map(|i| i.as_reference().ok()).collect())
        .unwrap_or_default()
}

fn numbers(doc: &Document, object: &Object) -> Option<Vec<f64>> {
    resolve_array(doc, object)?
        .iter()
        .map(|o| match o {
            #[allow(clippy::cast_precision_loss)]
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(f64::from(*r)),
            _ => None,
        })
        .collect()
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise one byte per char.
fn text_string(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        return Some(String::from_utf16_lossy(&units));
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}
