//! Position resolver
//!
//! Maps selections made over rendered text back to character offsets in the
//! document's plain text.
//!
//! - [`TextIndex`]: text nodes of one rendering with their absolute offsets
//! - [`resolve_selection`]: validation and trimming of a raw selection
//! - [`flatten_markup`]: text nodes of an HTML fragment

mod index;
mod markup;
mod selection;

pub use index::{NodeRef, TextIndex, TextNode};
pub use markup::{flatten_markup, MarkupError};
pub use selection::{
    resolve_selection, OverlapPolicy, RawSelection, ResolvedSelection, SelectionRules, TextPoint,
};
