//! View models for the annotation list, label sidebar and detail panes
//!
//! All of these are derived from the annotation set and label set and rebuilt
//! after every mutation; none hold state of their own.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::annotations::{
    Annotation, AnnotationId, AnnotationSet, Label, LabelId, DEFAULT_LABEL_COLOR,
};
use crate::document::Document;
use crate::render::find_label;
use crate::session::Viewer;

const PREVIEW_CHARS: usize = 50;
const UNCATEGORIZED: &str = "Uncategorized";

/// Everything shown for one annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDetails {
    pub id: AnnotationId,
    pub label_name: String,
    pub label_color: String,
    pub label_category: Option<String>,
    pub author: String,
    pub created_at: String,
    pub start_position: usize,
    pub end_position: usize,
    pub text: String,
    pub context_before: String,
    pub context_after: String,
}

/// Result of activating a highlighted run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "annotations", rename_all = "lowercase")]
pub enum Activation {
    /// One annotation covers the run
    Details(AnnotationDetails),
    /// Several do; each can be opened or deleted on its own
    Chooser(Vec<AnnotationDetails>),
}

/// Row of the annotation list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationListEntry {
    pub id: AnnotationId,
    pub label_name: String,
    pub label_color: String,
    pub preview: String,
    pub author: String,
    pub created_at: String,
}

/// Row of the label sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSidebarEntry {
    pub id: LabelId,
    pub name: String,
    pub color: String,
    pub category: Option<String>,
    pub count: usize,
}

/// Label picker option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelOption {
    pub id: LabelId,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Labels sharing a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelGroup {
    pub category: String,
    pub labels: Vec<LabelOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub annotation_count: usize,
    pub label_count: usize,
    pub annotator_count: usize,
    /// Share of the text covered by annotations, capped at 100
    pub coverage_percent: f64,
}

/// One line of the line-number gutter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Line {
    /// 1-based
    pub number: usize,
    /// Character offset of the first character
    pub start: usize,
    /// Character offset just past the last character, newline excluded
    pub end: usize,
}

/// Lines of the document, split on `\n`.
///
/// A trailing newline yields a final empty line, like the rendered text.
pub fn line_starts(document: &Document) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (offset, ch) in document.content().chars().enumerate() {
        if ch == '\n' {
            lines.push(Line {
                number: lines.len() + 1,
                start,
                end: offset,
            });
            start = offset + 1;
        }
    }
    lines.push(Line {
        number: lines.len() + 1,
        start,
        end: document.char_len(),
    });
    lines
}

/// Cut to `max` characters, marking the cut with an ellipsis
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// How the author of an annotation is shown to the viewer
pub fn user_display_name(annotation: &Annotation, viewer: &Viewer) -> String {
    if viewer.is_author(annotation) {
        return "You".to_string();
    }
    match (&annotation.user_name, annotation.user_id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => format!("User {}", id),
        (None, None) => "Unknown user".to_string(),
    }
}

/// Label name and color for list entries: the live label, then the fields
/// stored on the annotation, then a placeholder.
pub fn label_badge(annotation: &Annotation, labels: &[Label]) -> (String, String) {
    match find_label(labels, annotation) {
        Some(label) => (label.name.clone(), label.color.clone()),
        None => (
            annotation
                .label_name
                .clone()
                .unwrap_or_else(|| format!("Label {}", annotation.label_id)),
            annotation
                .label_color
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
        ),
    }
}

fn created_at(annotation: &Annotation) -> String {
    annotation
        .created_at
        .clone()
        .unwrap_or_else(|| "Now".to_string())
}

pub fn details(annotation: &Annotation, labels: &[Label], viewer: &Viewer) -> AnnotationDetails {
    let (label_name, label_color) = label_badge(annotation, labels);
    let label_category = find_label(labels, annotation)
        .and_then(|l| l.category.clone())
        .or_else(|| annotation.label_category.clone());

    AnnotationDetails {
        id: annotation.id,
        label_name,
        label_color,
        label_category,
        author: user_display_name(annotation, viewer),
        created_at: created_at(annotation),
        start_position: annotation.start_position,
        end_position: annotation.end_position,
        text: annotation.text_selection.clone(),
        context_before: annotation.context_before.clone(),
        context_after: annotation.context_after.clone(),
    }
}

/// Detail pane or chooser for the annotations covering a run.
///
/// Ids no longer in the set are skipped; `None` when nothing is left.
pub fn activate(
    ids: &[AnnotationId],
    annotations: &AnnotationSet,
    labels: &[Label],
    viewer: &Viewer,
) -> Option<Activation> {
    let mut found: Vec<AnnotationDetails> = ids
        .iter()
        .filter_map(|id| annotations.get(*id))
        .map(|a| details(a, labels, viewer))
        .collect();

    match found.len() {
        0 => None,
        1 => found.pop().map(Activation::Details),
        _ => Some(Activation::Chooser(found)),
    }
}

/// Annotation list, most recent first
pub fn annotation_list(
    annotations: &AnnotationSet,
    labels: &[Label],
    viewer: &Viewer,
) -> Vec<AnnotationListEntry> {
    annotations
        .iter()
        .rev()
        .map(|a| {
            let (label_name, label_color) = label_badge(a, labels);
            AnnotationListEntry {
                id: a.id,
                label_name,
                label_color,
                preview: preview(&a.text_selection, PREVIEW_CHARS),
                author: user_display_name(a, viewer),
                created_at: created_at(a),
            }
        })
        .collect()
}

/// Every label with the number of annotations using it
pub fn label_sidebar(labels: &[Label], annotations: &AnnotationSet) -> Vec<LabelSidebarEntry> {
    let counts = annotations.count_by_label();
    labels
        .iter()
        .map(|l| LabelSidebarEntry {
            id: l.id,
            name: l.name.clone(),
            color: l.color.clone(),
            category: l.category.clone(),
            count: counts.get(&l.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Labels grouped by category, categories in alphabetical order
pub fn label_picker(labels: &[Label]) -> Vec<LabelGroup> {
    let mut groups: BTreeMap<&str, Vec<LabelOption>> = BTreeMap::new();
    for label in labels {
        let category = label
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED);
        groups.entry(category).or_default().push(LabelOption {
            id: label.id,
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.as_deref().map(|d| preview(d, PREVIEW_CHARS)),
        });
    }

    groups
        .into_iter()
        .map(|(category, labels)| LabelGroup {
            category: category.to_string(),
            labels,
        })
        .collect()
}

pub fn document_stats(document: &Document, annotations: &AnnotationSet) -> DocumentStats {
    let labels: BTreeSet<LabelId> = annotations.iter().map(|a| a.label_id).collect();
    let annotators: BTreeSet<_> = annotations.iter().filter_map(|a| a.user_id).collect();
    let covered: usize = annotations.iter().map(Annotation::len).sum();

    let len = document.char_len();
    let coverage_percent = if len == 0 {
        0.0
    } else {
        (covered as f64 / len as f64 * 100.0).min(100.0)
    };

    DocumentStats {
        annotation_count: annotations.len(),
        label_count: labels.len(),
        annotator_count: annotators.len(),
        coverage_percent,
    }
}
