//! Annotation store client
//!
//! The remote store owns persistence and id assignment. The session only
//! talks to it through [`AnnotationBackend`], so tests and alternative
//! transports can stand in for [`HttpStore`].
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `POST /annotate`
//! - `DELETE /annotations/{id}`
//! - `GET /labels`
//! - `GET /documents/{id}/annotations`

mod http;
mod wire;

use async_trait::async_trait;

use crate::annotations::{Annotation, AnnotationId, DocumentId, Label};
use crate::error::RemoteError;

pub use http::HttpStore;
pub use wire::{
    AnnotationsResponse, CreateAnnotationRequest, CreateAnnotationResponse, Created,
    LabelsResponse, StatusResponse, StoredAnnotation,
};

/// Remote annotation store
#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    /// Create an annotation; the store assigns its id
    async fn create(&self, request: &CreateAnnotationRequest) -> Result<Created, RemoteError>;

    /// Delete an annotation, returning the store's confirmation message
    async fn delete(&self, id: AnnotationId) -> Result<String, RemoteError>;

    /// Current label set
    async fn labels(&self) -> Result<Vec<Label>, RemoteError>;

    /// Every annotation of a document
    async fn annotations(&self, document_id: DocumentId) -> Result<Vec<Annotation>, RemoteError>;
}
