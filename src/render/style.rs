//! Visual treatment of segments
//!
//! A segment covered by one annotation is keyed by its label color (fill and
//! underline). A segment covered by several gets evenly divided color bands and
//! a double border, and carries every covering id so a click can choose.

use serde::Serialize;

use crate::annotations::{Annotation, AnnotationId, AnnotationSet, Label, DEFAULT_LABEL_COLOR, UNKNOWN_LABEL};

use super::sweep::{Coverage, Segment};

/// Fill opacity for a single annotation
pub const SINGLE_FILL_ALPHA: f32 = 0.3;
/// Band opacity for overlapping annotations
pub const MULTI_FILL_ALPHA: f32 = 0.4;
/// Border drawn under overlapping annotations
pub const MULTI_BORDER: &str = "3px double #333";

const TITLE_PREVIEW_CHARS: usize = 50;

/// Style of one rendered segment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentStyle {
    Plain,
    Single {
        annotation_id: AnnotationId,
        /// `rgba(...)` background
        fill: String,
        /// CSS border-bottom value
        underline: String,
        title: String,
    },
    Multiple {
        annotation_ids: Vec<AnnotationId>,
        /// `linear-gradient(...)` background
        background: String,
        border: String,
        title: String,
    },
}

/// Live label for an annotation, if it still exists
pub fn find_label<'a>(labels: &'a [Label], annotation: &Annotation) -> Option<&'a Label> {
    labels.iter().find(|l| l.id == annotation.label_id)
}

/// Style a segment using the current label set.
///
/// Dangling label references fall back to "Unknown" and the default color.
pub fn style_segment(segment: &Segment, annotations: &AnnotationSet, labels: &[Label]) -> SegmentStyle {
    match segment.coverage() {
        Coverage::Plain => SegmentStyle::Plain,
        Coverage::Single(id) => {
            let annotation = annotations.get(id);
            let label = annotation.and_then(|a| find_label(labels, a));
            let color = label.map_or(DEFAULT_LABEL_COLOR, |l| l.color.as_str());
            let name = label.map_or(UNKNOWN_LABEL, |l| l.name.as_str());
            let preview: String = annotation
                .map(|a| a.text_selection.chars().take(TITLE_PREVIEW_CHARS).collect())
                .unwrap_or_default();

            SegmentStyle::Single {
                annotation_id: id,
                fill: hex_to_rgba(color, SINGLE_FILL_ALPHA),
                underline: format!("2px solid {}", color),
                title: format!("{}: {}...", name, preview),
            }
        }
        Coverage::Multiple(ids) => {
            let labels_used: Vec<Option<&Label>> = ids
                .iter()
                .map(|id| annotations.get(*id).and_then(|a| find_label(labels, a)))
                .collect();

            let colors: Vec<String> = labels_used
                .iter()
                .map(|l| hex_to_rgba(l.map_or(DEFAULT_LABEL_COLOR, |l| l.color.as_str()), MULTI_FILL_ALPHA))
                .collect();
            let names: Vec<&str> = labels_used
                .iter()
                .map(|l| l.map_or(UNKNOWN_LABEL, |l| l.name.as_str()))
                .collect();

            SegmentStyle::Multiple {
                annotation_ids: ids.to_vec(),
                background: band_gradient(&colors),
                border: MULTI_BORDER.to_string(),
                title: format!("Multiple Labels: {}", names.join(", ")),
            }
        }
    }
}

/// Convert `#rrggbb` (or `#rgb`) to `rgba(r, g, b, alpha)`.
///
/// Unparseable colors fall back to the default label color.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> String {
    let (r, g, b) = parse_hex(hex)
        .or_else(|| parse_hex(DEFAULT_LABEL_COLOR))
        .unwrap_or((0, 0, 0));
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        6 => Some((
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        )),
        3 => {
            let expand = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

/// Horizontal gradient with one hard-edged band per color
pub fn band_gradient(colors: &[String]) -> String {
    match colors {
        [] => String::new(),
        [only] => only.clone(),
        _ => {
            let width = 100.0 / colors.len() as f64;
            let stops: Vec<String> = colors
                .iter()
                .enumerate()
                .map(|(i, color)| {
                    format!(
                        "{} {}, {} {}",
                        color,
                        percent(i as f64 * width),
                        color,
                        percent((i + 1) as f64 * width)
                    )
                })
                .collect();
            format!("linear-gradient(90deg, {})", stops.join(", "))
        }
    }
}

fn percent(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}%", value)
    } else {
        format!("{:.2}%", value)
    }
}
