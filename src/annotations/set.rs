//! In-memory annotation set
//!
//! The authoritative, insertion-ordered collection of annotations for the
//! loaded document. The session mutates it only after the store confirms.

use std::collections::BTreeMap;

use super::types::{Annotation, AnnotationId, LabelId};

/// Insertion-ordered annotations keyed by id
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    items: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list, keeping the last occurrence of duplicate ids
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let mut set = Self::new();
        for annotation in annotations {
            set.insert(annotation);
        }
        set
    }

    /// Append an annotation, or replace in place if the id is already present.
    ///
    /// Returns the replaced annotation.
    pub fn insert(&mut self, annotation: Annotation) -> Option<Annotation> {
        match self.position(annotation.id) {
            Some(idx) => {
                tracing::warn!("Annotation {} already present, replacing", annotation.id);
                Some(std::mem::replace(&mut self.items[idx], annotation))
            }
            None => {
                self.items.push(annotation);
                None
            }
        }
    }

    /// Remove an annotation by id
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        self.position(id).map(|idx| self.items.remove(idx))
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Annotation> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    /// First annotation sharing at least one character with `[start, end)`
    pub fn first_intersecting(&self, start: usize, end: usize) -> Option<&Annotation> {
        self.items.iter().find(|a| a.intersects(start, end))
    }

    /// Number of annotations per label
    pub fn count_by_label(&self) -> BTreeMap<LabelId, usize> {
        let mut counts = BTreeMap::new();
        for annotation in &self.items {
            *counts.entry(annotation.label_id).or_insert(0) += 1;
        }
        counts
    }

    fn position(&self, id: AnnotationId) -> Option<usize> {
        self.items.iter().position(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(id: AnnotationId, start: usize, end: usize, label_id: LabelId) -> Annotation {
        Annotation::new(id, 1, start, end, "text", label_id)
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut set = AnnotationSet::new();
        set.insert(annotation(3, 0, 4, 1));
        set.insert(annotation(1, 5, 9, 1));
        set.insert(annotation(2, 2, 6, 2));

        let ids: Vec<_> = set.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_duplicate_replaces_in_place() {
        let mut set = AnnotationSet::new();
        set.insert(annotation(1, 0, 4, 1));
        set.insert(annotation(2, 5, 9, 1));

        let replaced = set.insert(annotation(1, 0, 4, 3));
        assert!(replaced.is_some());
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].label_id, 3);
    }

    #[test]
    fn test_remove() {
        let mut set = AnnotationSet::from_annotations(vec![annotation(1, 0, 4, 1), annotation(2, 5, 9, 1)]);

        assert!(set.remove(1).is_some());
        assert!(set.remove(1).is_none());
        assert!(!set.contains(1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_count_by_label() {
        let set = AnnotationSet::from_annotations(vec![
            annotation(1, 0, 4, 1),
            annotation(2, 5, 9, 1),
            annotation(3, 10, 14, 2),
        ]);

        let counts = set.count_by_label();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&2], 1);
    }

    #[test]
    fn test_first_intersecting() {
        let set = AnnotationSet::from_annotations(vec![annotation(1, 0, 5, 1), annotation(2, 10, 15, 1)]);

        assert_eq!(set.first_intersecting(3, 7).map(|a| a.id), Some(1));
        assert!(set.first_intersecting(5, 10).is_none());
        assert_eq!(set.first_intersecting(14, 20).map(|a| a.id), Some(2));
    }
}
