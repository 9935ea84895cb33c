//! Annotation and label types
//!
//! Field names follow the annotation store's JSON (camelCase). The store has
//! historically answered in snake_case too, so every field also accepts its
//! snake_case alias when decoding.

use serde::{Deserialize, Serialize};

/// Annotation identifier, assigned by the annotation store
pub type AnnotationId = i64;
/// Label identifier
pub type LabelId = i64;
/// Document identifier
pub type DocumentId = i64;
/// User identifier
pub type UserId = i64;

/// Color used when a label has none or cannot be found
pub const DEFAULT_LABEL_COLOR: &str = "#007bff";

/// Display name for annotations whose label is gone
pub const UNKNOWN_LABEL: &str = "Unknown";

fn default_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

/// A named, colored category assignable to spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    /// Hex RGB, e.g. `#ff8800`
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Label {
    pub fn new(id: LabelId, name: &str, color: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            category: None,
            description: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A labeled span over document text
///
/// Offsets are character offsets into the document content, `start_position`
/// inclusive and `end_position` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(alias = "document_id")]
    pub document_id: DocumentId,
    #[serde(alias = "start_position")]
    pub start_position: usize,
    #[serde(alias = "end_position")]
    pub end_position: usize,
    #[serde(alias = "text_selection")]
    pub text_selection: String,
    #[serde(alias = "label_id")]
    pub label_id: LabelId,
    /// Denormalized from the label when the annotation was created or last refreshed
    #[serde(default, alias = "label_name", skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    #[serde(default, alias = "label_color", skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default, alias = "label_category", skip_serializing_if = "Option::is_none")]
    pub label_category: Option<String>,
    #[serde(default, alias = "context_before")]
    pub context_before: String,
    #[serde(default, alias = "context_after")]
    pub context_after: String,
    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, alias = "user_name", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Display timestamp as formatted by the store
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Annotation {
    /// Create an annotation without denormalized label or user fields
    pub fn new(
        id: AnnotationId,
        document_id: DocumentId,
        start_position: usize,
        end_position: usize,
        text_selection: &str,
        label_id: LabelId,
    ) -> Self {
        Self {
            id,
            document_id,
            start_position,
            end_position,
            text_selection: text_selection.to_string(),
            label_id,
            label_name: None,
            label_color: None,
            label_category: None,
            context_before: String::new(),
            context_after: String::new(),
            user_id: None,
            user_name: None,
            created_at: None,
        }
    }

    /// Set the author
    pub fn with_user(mut self, user_id: UserId, user_name: Option<&str>) -> Self {
        self.user_id = Some(user_id);
        self.user_name = user_name.map(|s| s.to_string());
        self
    }

    /// Copy the label's display fields onto the annotation
    pub fn apply_label(&mut self, label: &Label) {
        self.label_name = Some(label.name.clone());
        self.label_color = Some(label.color.clone());
        self.label_category = label.category.clone();
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end_position.saturating_sub(self.start_position)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the half-open span `[start, end)` shares at least one character
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start_position < end && self.end_position > start
    }

    /// Whether the offsets are ordered and fit a document of `doc_len` characters
    pub fn is_within(&self, doc_len: usize) -> bool {
        self.start_position < self.end_position && self.end_position <= doc_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_is_half_open() {
        let a = Annotation::new(1, 1, 0, 5, "Hello", 1);

        assert!(a.intersects(4, 6));
        assert!(a.intersects(0, 1));
        assert!(!a.intersects(5, 10));
        assert!(a.intersects(0, 20));
    }

    #[test]
    fn test_apply_label() {
        let mut a = Annotation::new(1, 1, 0, 5, "Hello", 7);
        let label = Label::new(7, "Person", "#ff0000").with_category("Entities");
        a.apply_label(&label);

        assert_eq!(a.label_name.as_deref(), Some("Person"));
        assert_eq!(a.label_color.as_deref(), Some("#ff0000"));
        assert_eq!(a.label_category.as_deref(), Some("Entities"));
    }

    #[test]
    fn test_decode_snake_case() {
        let json = r#"{
            "id": 4,
            "document_id": 9,
            "start_position": 10,
            "end_position": 15,
            "text_selection": "world",
            "label_id": 2,
            "label_name": "Place",
            "created_at": "01/02/2024 10:00"
        }"#;

        let parsed: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.document_id, 9);
        assert_eq!(parsed.start_position, 10);
        assert_eq!(parsed.label_name.as_deref(), Some("Place"));
        assert!(parsed.context_before.is_empty());
    }

    #[test]
    fn test_label_without_color() {
        let parsed: Label = serde_json::from_str(r#"{"id": 1, "name": "Topic"}"#).unwrap();
        assert_eq!(parsed.color, DEFAULT_LABEL_COLOR);
        assert!(parsed.category.is_none());
    }
}
