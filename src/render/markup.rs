//! HTML markup for rendered segments
//!
//! Plain segments become escaped text, annotated segments become spans
//! carrying the covering ids as data attributes. Each segment maps to exactly
//! one text node, which is what the position index relies on.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::document::Document;

use super::style::SegmentStyle;
use super::sweep::Segment;

/// Configuration for highlight markup
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    /// CSS class on every highlight span
    pub class_name: String,
    /// Data attribute for a single annotation ID
    pub id_attribute: String,
    /// Data attribute for the comma-separated IDs of overlapping annotations
    pub multiple_attribute: String,
    /// Whether to include inline styles
    pub include_inline_styles: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            class_name: "annotation-highlight".to_string(),
            id_attribute: "data-annotation-id".to_string(),
            multiple_attribute: "data-multiple-annotations".to_string(),
            include_inline_styles: true,
        }
    }
}

/// Render segments and their styles as an HTML fragment.
///
/// `styles` must line up with `segments`.
pub fn render_markup(
    document: &Document,
    segments: &[Segment],
    styles: &[SegmentStyle],
    config: &MarkupConfig,
) -> String {
    let mut out = String::with_capacity(document.content().len() + segments.len() * 96);

    for (segment, style) in segments.iter().zip(styles) {
        let text = encode_text(segment.text(document));
        match style {
            SegmentStyle::Plain => out.push_str(&text),
            SegmentStyle::Single {
                annotation_id,
                fill,
                underline,
                title,
            } => {
                let style = format!("background-color: {}; border-bottom: {};", fill, underline);
                out.push_str(&format_span(
                    config,
                    &config.id_attribute,
                    &annotation_id.to_string(),
                    &style,
                    title,
                    &text,
                ));
            }
            SegmentStyle::Multiple {
                annotation_ids,
                background,
                border,
                title,
            } => {
                let ids: Vec<String> = annotation_ids.iter().map(|id| id.to_string()).collect();
                let style = format!("background: {}; border-bottom: {};", background, border);
                out.push_str(&format_span(
                    config,
                    &config.multiple_attribute,
                    &ids.join(","),
                    &style,
                    title,
                    &text,
                ));
            }
        }
    }

    out
}

fn format_span(
    config: &MarkupConfig,
    data_attribute: &str,
    data_value: &str,
    style: &str,
    title: &str,
    text: &str,
) -> String {
    let style = if config.include_inline_styles {
        format!(" style=\"{}\"", encode_double_quoted_attribute(style))
    } else {
        String::new()
    };

    format!(
        "<span class=\"{}\" {}=\"{}\"{} title=\"{}\">{}</span>",
        config.class_name,
        data_attribute,
        data_value,
        style,
        encode_double_quoted_attribute(title),
        text
    )
}
