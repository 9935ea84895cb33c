//! Annotation module
//!
//! Labeled spans over a plain-text document.
//!
//! # Types
//!
//! - [`Label`]: a named, colored category
//! - [`Annotation`]: a character span tagged with a label, plus the label and
//!   author fields the store denormalizes onto it
//! - [`AnnotationSet`]: the insertion-ordered set for one document

mod set;
mod types;

pub use set::AnnotationSet;
pub use types::{
    Annotation, AnnotationId, DocumentId, Label, LabelId, UserId, DEFAULT_LABEL_COLOR,
    UNKNOWN_LABEL,
};
