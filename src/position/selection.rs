//! Selection validation
//!
//! Turns a raw (node, offset) selection into a trimmed character span, or a
//! [`Rejection`] saying why not. Checks run in a fixed order: collapsed,
//! outside the document, stale reference, annotated text, length.

use std::str::FromStr;

use serde::Deserialize;

use crate::annotations::AnnotationSet;
use crate::document::Document;
use crate::error::Rejection;

use super::index::{NodeRef, TextIndex};

/// Whether new spans may overlap existing annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Overlaps are created and rendered as multi-annotation segments
    #[default]
    Permit,
    /// Spans touching annotated text are refused
    Reject,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permit" | "allow" => Ok(OverlapPolicy::Permit),
            "reject" | "deny" => Ok(OverlapPolicy::Reject),
            other => Err(other.to_string()),
        }
    }
}

/// Limits applied to every new span, whichever way it was made
#[derive(Debug, Clone)]
pub struct SelectionRules {
    pub min_chars: usize,
    pub max_chars: usize,
    pub overlap: OverlapPolicy,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            min_chars: 3,
            max_chars: 1000,
            overlap: OverlapPolicy::Permit,
        }
    }
}

impl SelectionRules {
    /// Overlap and length checks for a span about to be created
    pub fn check_span(
        &self,
        annotations: &AnnotationSet,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<(), Rejection> {
        if self.overlap == OverlapPolicy::Reject {
            if let Some(existing) = annotations.first_intersecting(start, end) {
                tracing::debug!(
                    "Span {}..{} touches annotation {}",
                    start,
                    end,
                    existing.id
                );
                return Err(Rejection::TouchesAnnotation);
            }
        }

        let len = text.chars().count();
        if len < self.min_chars {
            return Err(Rejection::TooShort {
                min: self.min_chars,
                len,
            });
        }
        if len > self.max_chars {
            return Err(Rejection::TooLong {
                max: self.max_chars,
                len,
            });
        }
        Ok(())
    }
}

/// One end of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPoint {
    pub node: NodeRef,
    pub offset: usize,
}

impl TextPoint {
    pub fn new(node: NodeRef, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection as reported by the host, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub start: TextPoint,
    pub end: TextPoint,
    /// Whether the selection's common ancestor lies inside the document container
    pub inside_container: bool,
}

impl RawSelection {
    pub fn new(start: TextPoint, end: TextPoint) -> Self {
        Self {
            start,
            end,
            inside_container: true,
        }
    }

    /// A selection whose common ancestor is outside the document
    pub fn outside(start: TextPoint, end: TextPoint) -> Self {
        Self {
            start,
            end,
            inside_container: false,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A validated span, trimmed of surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub start: usize,
    pub end: usize,
    /// Always equal to the document text between `start` and `end`
    pub text: String,
}

/// Validate a raw selection against the current rendering.
pub fn resolve_selection(
    index: &TextIndex,
    document: &Document,
    annotations: &AnnotationSet,
    rules: &SelectionRules,
    raw: &RawSelection,
) -> Result<ResolvedSelection, Rejection> {
    if raw.is_collapsed() {
        return Err(Rejection::Collapsed);
    }
    if !raw.inside_container {
        return Err(Rejection::OutsideContainer);
    }

    let a = index
        .resolve_position(raw.start.node, raw.start.offset)
        .ok_or(Rejection::StaleReference)?;
    let b = index
        .resolve_position(raw.end.node, raw.end.offset)
        .ok_or(Rejection::StaleReference)?;
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    if start == end {
        return Err(Rejection::Collapsed);
    }

    let selected = document
        .slice(start, end)
        .ok_or(Rejection::StaleReference)?;
    let leading = selected.chars().take_while(|c| c.is_whitespace()).count();
    let trailing = selected.chars().rev().take_while(|c| c.is_whitespace()).count();
    let text = selected.trim();

    let start_trimmed = start + leading;
    let end_trimmed = end.saturating_sub(trailing).max(start_trimmed);

    rules.check_span(annotations, start_trimmed, end_trimmed, text)?;

    tracing::debug!(
        "Resolved selection {}..{} ({} characters)",
        start_trimmed,
        end_trimmed,
        end_trimmed - start_trimmed
    );

    Ok(ResolvedSelection {
        start: start_trimmed,
        end: end_trimmed,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Annotation;

    fn setup(content: &str) -> (Document, TextIndex) {
        let doc = Document::new(1, content);
        let index = TextIndex::from_lengths(1, [doc.char_len()]);
        (doc, index)
    }

    fn select(index: &TextIndex, start: usize, end: usize) -> RawSelection {
        let (a, ao) = index.locate(start).unwrap();
        let (b, bo) = index.locate(end).unwrap();
        RawSelection::new(TextPoint::new(a, ao), TextPoint::new(b, bo))
    }

    #[test]
    fn test_collapsed_is_silent() {
        let (doc, index) = setup("Hello world");
        let raw = select(&index, 3, 3);

        let err = resolve_selection(&index, &doc, &AnnotationSet::new(), &SelectionRules::default(), &raw)
            .unwrap_err();
        assert_eq!(err, Rejection::Collapsed);
        assert!(err.is_silent());
    }

    #[test]
    fn test_outside_container() {
        let (doc, index) = setup("Hello world");
        let inside = select(&index, 0, 5);
        let raw = RawSelection::outside(inside.start, inside.end);

        let err = resolve_selection(&index, &doc, &AnnotationSet::new(), &SelectionRules::default(), &raw)
            .unwrap_err();
        assert_eq!(err, Rejection::OutsideContainer);
    }

    #[test]
    fn test_trims_and_moves_offsets() {
        let (doc, index) = setup("say   hello   there");
        let raw = select(&index, 3, 14);

        let resolved =
            resolve_selection(&index, &doc, &AnnotationSet::new(), &SelectionRules::default(), &raw)
                .unwrap();
        assert_eq!(resolved.text, "hello");
        assert_eq!((resolved.start, resolved.end), (6, 11));
        assert_eq!(doc.slice(resolved.start, resolved.end), Some("hello"));
    }

    #[test]
    fn test_backwards_points_are_ordered() {
        let (doc, index) = setup("Hello world");
        let forward = select(&index, 0, 5);
        let raw = RawSelection::new(forward.end, forward.start);

        let resolved =
            resolve_selection(&index, &doc, &AnnotationSet::new(), &SelectionRules::default(), &raw)
                .unwrap();
        assert_eq!((resolved.start, resolved.end), (0, 5));
    }

    #[test]
    fn test_whitespace_only_is_too_short() {
        let (doc, index) = setup("a      b");
        let raw = select(&index, 1, 7);

        let err = resolve_selection(&index, &doc, &AnnotationSet::new(), &SelectionRules::default(), &raw)
            .unwrap_err();
        assert_eq!(err, Rejection::TooShort { min: 3, len: 0 });
    }

    #[test]
    fn test_length_bounds() {
        let rules = SelectionRules::default();
        let set = AnnotationSet::new();

        assert!(matches!(
            rules.check_span(&set, 0, 2, "ab"),
            Err(Rejection::TooShort { .. })
        ));
        assert!(rules.check_span(&set, 0, 3, "abc").is_ok());
        assert!(rules.check_span(&set, 0, 1000, &"x".repeat(1000)).is_ok());
        assert!(matches!(
            rules.check_span(&set, 0, 1001, &"x".repeat(1001)),
            Err(Rejection::TooLong { .. })
        ));
    }

    #[test]
    fn test_overlap_policy() {
        let set = AnnotationSet::from_annotations(vec![Annotation::new(1, 1, 5, 10, "hello", 1)]);
        let permit = SelectionRules::default();
        let reject = SelectionRules {
            overlap: OverlapPolicy::Reject,
            ..SelectionRules::default()
        };

        assert!(permit.check_span(&set, 8, 14, "lo wor").is_ok());
        assert_eq!(
            reject.check_span(&set, 8, 14, "lo wor"),
            Err(Rejection::TouchesAnnotation)
        );
        assert!(reject.check_span(&set, 10, 14, "worl").is_ok());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Reject".parse::<OverlapPolicy>(), Ok(OverlapPolicy::Reject));
        assert_eq!("permit".parse::<OverlapPolicy>(), Ok(OverlapPolicy::Permit));
        assert!("sometimes".parse::<OverlapPolicy>().is_err());
    }
}
