//! Text Annotator Library
//!
//! Overlap-aware span annotation over plain-text documents, kept in sync with
//! a remote annotation store.
//!
//! # Modules
//!
//! - `position`: maps (text node, offset) selections to character offsets
//! - `annotations`: labels, annotations and the in-memory annotation set
//! - `render`: event-sweep segmentation, segment styles and HTML markup
//! - `store`: the remote annotation store client
//! - `session`: one document view tying the above together
//! - `view`: annotation list, label sidebar and detail view models

pub mod annotations;
pub mod config;
pub mod document;
pub mod error;
pub mod notice;
pub mod position;
pub mod render;
pub mod session;
pub mod store;
pub mod view;

pub use annotations::{Annotation, AnnotationId, AnnotationSet, Label, LabelId};
pub use config::Config;
pub use document::Document;
pub use error::{RemoteError, Rejection, SessionError};
pub use session::{AnnotationSession, SessionSettings, Viewer};
pub use store::{AnnotationBackend, HttpStore};
