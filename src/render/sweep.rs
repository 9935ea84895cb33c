//! Boundary-event sweep
//!
//! Turns the annotation set into maximal runs of text that share the same
//! covering annotations. Every render starts over from the document length and
//! the full set; nothing is patched incrementally.

use crate::annotations::{Annotation, AnnotationId};
use crate::document::Document;

/// A maximal run `[start, end)` covered by the same annotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// Covering annotations, in the order they became active
    pub covering: Vec<AnnotationId>,
}

/// How many annotations cover a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage<'a> {
    Plain,
    Single(AnnotationId),
    Multiple(&'a [AnnotationId]),
}

impl Segment {
    fn plain(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            covering: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_plain(&self) -> bool {
        self.covering.is_empty()
    }

    pub fn coverage(&self) -> Coverage<'_> {
        match self.covering.as_slice() {
            [] => Coverage::Plain,
            [id] => Coverage::Single(*id),
            ids => Coverage::Multiple(ids),
        }
    }

    /// The segment's text within `document`
    pub fn text<'d>(&self, document: &'d Document) -> &'d str {
        document.slice(self.start, self.end).unwrap_or_default()
    }
}

/// Ends sort before starts at the same position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Start,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    position: usize,
    kind: EventKind,
    id: AnnotationId,
}

/// Segment a document of `len` characters by the given annotations.
///
/// Annotations with empty or out-of-range spans are skipped. The segments
/// always tile `[0, len)` exactly.
pub fn segment(len: usize, annotations: &[Annotation]) -> Vec<Segment> {
    let mut events = Vec::with_capacity(annotations.len() * 2);
    for annotation in annotations {
        if !annotation.is_within(len) {
            tracing::warn!(
                "Skipping annotation {} with span {}..{} outside document of length {}",
                annotation.id,
                annotation.start_position,
                annotation.end_position,
                len
            );
            continue;
        }
        events.push(Event {
            position: annotation.start_position,
            kind: EventKind::Start,
            id: annotation.id,
        });
        events.push(Event {
            position: annotation.end_position,
            kind: EventKind::End,
            id: annotation.id,
        });
    }

    // Stable: annotations starting together keep insertion order
    events.sort_by_key(|e| (e.position, e.kind));

    let mut segments = Vec::with_capacity(events.len() + 1);
    let mut cursor = 0;
    let mut active: Vec<AnnotationId> = Vec::new();

    for event in &events {
        if event.position > cursor {
            segments.push(Segment {
                start: cursor,
                end: event.position,
                covering: active.clone(),
            });
            cursor = event.position;
        }

        match event.kind {
            EventKind::Start => active.push(event.id),
            EventKind::End => {
                if let Some(idx) = active.iter().position(|id| *id == event.id) {
                    active.remove(idx);
                }
            }
        }
    }

    if cursor < len {
        segments.push(Segment::plain(cursor, len));
    }

    tracing::debug!(
        "Rendered {} segments from {} annotations",
        segments.len(),
        annotations.len()
    );

    segments
}
