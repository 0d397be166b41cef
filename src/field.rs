//! Static field descriptors loaded once per form template.

#[cfg(test)]
#[path = "field_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// Unique key identifying a field across positions, values, and descriptors.
pub type FieldKey = String;

/// The kind of input a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text.
    #[default]
    Text,
    /// Multi-line text. Rendered like `Text` on export.
    Textarea,
    /// Boolean toggle.
    Checkbox,
}

impl FieldKind {
    /// Whether values of this kind are drawn as text on export.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Textarea)
    }
}

/// Immutable descriptor for one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Unique field key.
    pub key: FieldKey,
    /// Human-readable label, used in accessibility announcements.
    #[serde(default)]
    pub label: String,
    /// Input kind.
    #[serde(default)]
    pub kind: FieldKind,
    /// Placeholder text shown in the editor when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Field in the external vault data source this field is populated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_field: Option<String>,
    /// 1-based page number the field sits on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Section heading the field is grouped under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl FieldConfig {
    #[must_use]
    pub fn new(key: impl Into<FieldKey>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            placeholder: None,
            vault_field: None,
            page: None,
            section: None,
        }
    }

    /// The label if present, otherwise the key.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() { &self.key } else { &self.label }
    }
}
