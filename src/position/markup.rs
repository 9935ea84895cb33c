//! Text extraction from rendered markup using lol_html
//!
//! Walks an HTML fragment in document order and collects its text nodes with
//! entities decoded, ignoring every element boundary. Building a [`TextIndex`]
//! from rendered highlights gives the same offsets as the plain text.

use lol_html::{doc_text, rewrite_str, RewriteStrSettings};

use super::index::TextIndex;

/// Errors while reading markup
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

/// Text nodes of an HTML fragment, in document order
pub fn flatten_markup(markup: &str) -> Result<Vec<String>, MarkupError> {
    let mut nodes: Vec<String> = Vec::new();
    let mut pending = String::new();

    rewrite_str(
        markup,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                // Chunks can split a node anywhere, including inside an entity
                pending.push_str(chunk.as_str());
                if chunk.last_in_text_node() {
                    if !pending.is_empty() {
                        nodes.push(html_escape::decode_html_entities(&pending).into_owned());
                    }
                    pending.clear();
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| MarkupError::RewriteError(e.to_string()))?;

    Ok(nodes)
}

impl TextIndex {
    /// Index the text nodes of rendered markup
    pub fn from_markup(generation: u64, markup: &str) -> Result<Self, MarkupError> {
        let nodes = flatten_markup(markup)?;
        Ok(Self::from_lengths(
            generation,
            nodes.iter().map(|n| n.chars().count()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_ignores_elements() {
        let html = r#"plain <span class="annotation-highlight" data-annotation-id="1">marked</span> tail"#;
        let nodes = flatten_markup(html).unwrap();

        assert_eq!(nodes, vec!["plain ", "marked", " tail"]);
    }

    #[test]
    fn test_flatten_decodes_entities() {
        let nodes = flatten_markup("a &lt; b <span>&amp;</span> c").unwrap();
        assert_eq!(nodes.concat(), "a < b & c");
    }

    #[test]
    fn test_index_from_markup() {
        let html = "ab<span title=\"x\">cde</span>fgh";
        let index = TextIndex::from_markup(4, html).unwrap();

        assert_eq!(index.len(), 8);
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.resolve_position(index.node(2).unwrap(), 1), Some(6));
    }
}
