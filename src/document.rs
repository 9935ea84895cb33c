//! The document being annotated
//!
//! Content is immutable for the life of a session. All positions are
//! character offsets (Unicode scalar values), never byte offsets.

use crate::annotations::DocumentId;

/// Immutable plain-text document
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    content: String,
    /// Byte offset of every character, followed by `content.len()`
    boundaries: Vec<usize>,
}

/// Text immediately around a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context<'a> {
    pub before: &'a str,
    pub after: &'a str,
}

impl Document {
    pub fn new(id: DocumentId, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut boundaries: Vec<usize> = content.char_indices().map(|(i, _)| i).collect();
        boundaries.push(content.len());
        Self {
            id,
            content,
            boundaries,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Slice by character offsets, `None` if out of bounds or reversed
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.char_len() {
            return None;
        }
        Some(&self.content[self.boundaries[start]..self.boundaries[end]])
    }

    /// Up to `width` characters before `start` and after `end`, clamped to the document
    pub fn context(&self, start: usize, end: usize, width: usize) -> Context<'_> {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.clamp(start, len);

        let before_start = start.saturating_sub(width);
        let after_end = end.saturating_add(width).min(len);

        Context {
            before: &self.content[self.boundaries[before_start]..self.boundaries[start]],
            after: &self.content[self.boundaries[end]..self.boundaries[after_end]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_by_chars() {
        let doc = Document::new(1, "caffè latte");

        assert_eq!(doc.char_len(), 11);
        assert_eq!(doc.slice(0, 5), Some("caffè"));
        assert_eq!(doc.slice(6, 11), Some("latte"));
        assert_eq!(doc.slice(6, 12), None);
        assert_eq!(doc.slice(5, 4), None);
    }

    #[test]
    fn test_context_clamped() {
        let doc = Document::new(1, "0123456789");

        let ctx = doc.context(4, 6, 3);
        assert_eq!(ctx.before, "123");
        assert_eq!(ctx.after, "678");

        let ctx = doc.context(1, 9, 100);
        assert_eq!(ctx.before, "0");
        assert_eq!(ctx.after, "9");
    }

    #[test]
    fn test_context_full_width() {
        let content = "a".repeat(150) + "TARGET" + &"b".repeat(150);
        let doc = Document::new(1, content);

        let ctx = doc.context(150, 156, 100);
        assert_eq!(ctx.before.chars().count(), 100);
        assert_eq!(ctx.after.chars().count(), 100);
        assert!(ctx.before.chars().all(|c| c == 'a'));
        assert!(ctx.after.chars().all(|c| c == 'b'));
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(1, "");
        assert!(doc.is_empty());
        assert_eq!(doc.char_len(), 0);
        assert_eq!(doc.slice(0, 0), Some(""));
    }
}
