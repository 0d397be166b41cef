//! Export engine: bake field values into a copy of the PDF.
//!
//! DESIGN
//! ======
//! Each value is resolved through a [`FieldMapping`] to an AcroForm field. Text
//! values are drawn with Helvetica into one content stream appended per page, at the
//! baseline point of the field's percent-space position (falling back to the widget
//! rectangle when no position is stored). Checkboxes get `/V` and `/AS` set to the
//! widget's on-state or `/Off`. Fields stay interactive; nothing is flattened. The
//! page's existing content is wrapped in `q`/`Q` so its graphics state cannot leak
//! into the appended text.
//!
//! ERROR HANDLING
//! ==============
//! Per-field problems (blank values, unmapped keys, missing widgets) are logged and
//! collected in the [`FillReport`]; the export carries on. Only an unreadable input,
//! invalid page geometry, or a failed save aborts.

pub mod form;
pub mod mapping;
pub mod values;

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::{BTreeMap, HashMap};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DEFAULT_FONT_SIZE_PT;
use crate::coords::{AbsolutePoint, GeometryError, baseline_offset};
use crate::field::{FieldConfig, FieldKey, FieldKind};
use crate::model::PositionMap;

pub use form::{FormField, WidgetKind};
pub use mapping::FieldMapping;
pub use values::FieldValues;

/// Resource name under which the export font is registered on each touched page.
pub const FONT_RESOURCE: &[u8] = b"FcHelv";

const LINE_SPACING: f64 = 1.2;
const DEFAULT_ON_STATE: &[u8] = b"Yes";

// =============================================================================
// ERROR / REPORT
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("failed to write PDF: {0}")]
    Save(String),
    #[error("malformed PDF structure: {0}")]
    Document(String),
    #[error("font size must be a positive finite number (got {0})")]
    InvalidFontSize(f64),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// What happened to each submitted value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Drawn or set in the output.
    pub filled: Vec<FieldKey>,
    /// Blank values (`null`, `""`) that were deliberately left out.
    pub skipped_empty: Vec<FieldKey>,
    /// Keys with no entry in the mapping table.
    pub unmapped: Vec<FieldKey>,
    /// Mapped keys whose widget is missing, unplaced, or of an unusable kind.
    pub unresolved: Vec<FieldKey>,
}

impl FillReport {
    /// Aggregate count for diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.unmapped.len() + self.unresolved.len()
    }
}

#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub bytes: Vec<u8>,
    pub report: FillReport,
}

// =============================================================================
// FILLER
// =============================================================================

/// Configurable export. Without a mapping, keys join widgets by exact name.
#[derive(Debug, Clone)]
pub struct FormFiller {
    mapping: Option<FieldMapping>,
    font_size_pt: f64,
    field_kinds: HashMap<FieldKey, FieldKind>,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self { mapping: None, font_size_pt: DEFAULT_FONT_SIZE_PT, field_kinds: HashMap::new() }
    }
}

impl FormFiller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    #[must_use]
    pub fn font_size(mut self, font_size_pt: f64) -> Self {
        self.font_size_pt = font_size_pt;
        self
    }

    /// Declared kinds. Keys not listed take their kind from the widget type.
    #[must_use]
    pub fn field_kinds(mut self, kinds: impl IntoIterator<Item = (FieldKey, FieldKind)>) -> Self {
        self.field_kinds.extend(kinds);
        self
    }

    /// Declared kinds taken from field descriptors.
    #[must_use]
    pub fn fields<'a>(self, configs: impl IntoIterator<Item = &'a FieldConfig>) -> Self {
        self.field_kinds(configs.into_iter().map(|c| (c.key.clone(), c.kind)))
    }

    /// Fill `pdf` and return new bytes. The input slice is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the input cannot be parsed, a touched page has
    /// invalid geometry, or the output cannot be serialized.
    pub fn fill(&self, pdf: &[u8], values: &FieldValues, positions: &PositionMap) -> Result<FillOutcome, ExportError> {
        if !self.font_size_pt.is_finite() || self.font_size_pt <= 0.0 {
            return Err(ExportError::InvalidFontSize(self.font_size_pt));
        }
        let mut doc = Document::load_mem(pdf).map_err(|e| ExportError::Parse(e.to_string()))?;
        let fields = form::collect_fields(&doc);

        let mut report = FillReport::default();
        let mut page_ops: BTreeMap<ObjectId, Vec<Operation>> = BTreeMap::new();

        for (key, value) in values {
            let Some(text) = values::display_string(value) else {
                report.skipped_empty.push(key.clone());
                continue;
            };
            let widget_name = match &self.mapping {
                Some(mapping) => match mapping.widget_for(key) {
                    Some(name) => name,
                    None => {
                        warn!(field = %key, "no mapping entry; skipping");
                        report.unmapped.push(key.clone());
                        continue;
                    }
                },
                None => key.as_str(),
            };
            let Some(field) = fields.get(widget_name) else {
                warn!(field = %key, widget = %widget_name, "no matching form widget; skipping");
                report.unresolved.push(key.clone());
                continue;
            };

            let applied = match self.kind_for(key, field) {
                FieldKind::Checkbox => set_checkbox(&mut doc, field, values::is_checked(value))?,
                FieldKind::Text | FieldKind::Textarea => {
                    self.draw_text(&doc, key, field, &text, positions, &mut page_ops)?
                }
            };
            if applied {
                report.filled.push(key.clone());
            } else {
                warn!(field = %key, widget = %widget_name, kind = ?field.kind, "widget cannot take this value; skipping");
                report.unresolved.push(key.clone());
            }
        }

        if !page_ops.is_empty() {
            let font_id = doc.add_object(helvetica());
            for (page_id, ops) in page_ops {
                register_font(&mut doc, page_id, font_id)?;
                append_content(&mut doc, page_id, ops)?;
            }
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|e| ExportError::Save(e.to_string()))?;
        info!(
            filled = report.filled.len(),
            skipped = report.skipped_empty.len(),
            warnings = report.warning_count(),
            "form filled"
        );
        Ok(FillOutcome { bytes, report })
    }

    fn kind_for(&self, key: &str, field: &FormField) -> FieldKind {
        if let Some(kind) = self.field_kinds.get(key) {
            return *kind;
        }
        match field.kind {
            WidgetKind::Checkbox => FieldKind::Checkbox,
            _ => FieldKind::Text,
        }
    }

    fn draw_text(
        &self,
        doc: &Document,
        key: &str,
        field: &FormField,
        text: &str,
        positions: &PositionMap,
        page_ops: &mut BTreeMap<ObjectId, Vec<Operation>>,
    ) -> Result<bool, ExportError> {
        let Some(widget) = field.placed_widget() else {
            return Ok(false);
        };
        let Some(page_id) = widget.page else {
            return Ok(false);
        };
        let (origin_x, origin_y, page) = form::page_box(doc, page_id)?;
        let font = self.font_size_pt;

        let position = match (positions.get(key), widget.rect) {
            (Some(position), _) => position,
            (None, Some(rect)) => {
                let top_left = AbsolutePoint { x_pt: rect.x0 - origin_x, y_pt: rect.y1 - origin_y - baseline_offset(font) };
                page.to_position(top_left, font).clamped()
            }
            (None, None) => return Ok(false),
        };
        let point = page.to_absolute(position, font);

        let ops = page_ops.entry(page_id).or_default();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![Object::Name(FONT_RESOURCE.to_vec()), real(font)]));
        ops.push(Operation::new("Td", vec![real(origin_x + point.x_pt), real(origin_y + point.y_pt)]));
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                ops.push(Operation::new("Td", vec![real(0.0), real(-font * LINE_SPACING)]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(values::to_win_ansi(line))]));
        }
        ops.push(Operation::new("ET", vec![]));
        Ok(true)
    }
}

/// Fill with exact-name joins and no declared kinds.
///
/// # Errors
///
/// See [`FormFiller::fill`].
pub fn fill(
    pdf: &[u8],
    values: &FieldValues,
    positions: &PositionMap,
    font_size_pt: f64,
) -> Result<FillOutcome, ExportError> {
    FormFiller::new().font_size(font_size_pt).fill(pdf, values, positions)
}

// =============================================================================
// DOCUMENT EDITS
// =============================================================================

fn set_checkbox(doc: &mut Document, field: &FormField, checked: bool) -> Result<bool, ExportError> {
    if field.kind != WidgetKind::Checkbox {
        return Ok(false);
    }
    let states: Vec<(ObjectId, Vec<u8>)> = field
        .widgets
        .iter()
        .map(|w| (w.id, form::on_state(doc, w.id).unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())))
        .collect();
    let field_on = states.first().map_or_else(|| DEFAULT_ON_STATE.to_vec(), |(_, on)| on.clone());

    for (widget_id, on) in states {
        let state = if checked { on } else { b"Off".to_vec() };
        dictionary_mut(doc, widget_id)?.set("AS", Object::Name(state));
    }
    let value = if checked { field_on } else { b"Off".to_vec() };
    dictionary_mut(doc, field.field_id)?.set("V", Object::Name(value));
    Ok(true)
}

fn helvetica() -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

/// Give the page its own resource dictionary (copied from whatever it inherits) with
/// the export font added.
fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<(), ExportError> {
    let mut resources = form::inherited(doc, page_id, b"Resources")
        .and_then(|o| form::resolve_dict(doc, o))
        .cloned()
        .unwrap_or_default();
    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|o| form::resolve_dict(doc, o))
        .cloned()
        .unwrap_or_default();
    fonts.set(FONT_RESOURCE.to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn append_content(doc: &mut Document, page_id: ObjectId, ops: Vec<Operation>) -> Result<(), ExportError> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id).ok().and_then(|p| p.get(b"Contents").ok()) {
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut operations = Vec::with_capacity(ops.len() + 3);
    if !existing.is_empty() {
        operations.push(Operation::new("Q", vec![]));
    }
    operations.push(Operation::new("q", vec![]));
    operations.extend(ops);
    operations.push(Operation::new("Q", vec![]));
    let encoded = Content { operations }.encode().map_err(|e| ExportError::Document(e.to_string()))?;
    let appended = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(save));
        contents.extend(existing);
    }
    contents.push(Object::Reference(appended));
    dictionary_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

fn dictionary_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary, ExportError> {
    doc.get_dictionary_mut(id)
        .map_err(|e| ExportError::Document(format!("object {} {}: {e}", id.0, id.1)))
}

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}
