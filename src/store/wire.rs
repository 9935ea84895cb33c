//! Annotation store request and response bodies

use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, AnnotationId, DocumentId, Label, LabelId, UserId};

/// Body of `POST /annotate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnotationRequest {
    pub document_id: DocumentId,
    pub text_selection: String,
    pub start_position: usize,
    pub end_position: usize,
    pub label_id: LabelId,
    pub context_before: String,
    pub context_after: String,
}

/// Response of `POST /annotate`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnotationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub annotation: Option<StoredAnnotation>,
}

/// The annotation as echoed by the store.
///
/// Stores differ in how much they echo back; anything missing is taken from
/// the request that created it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnnotation {
    pub id: AnnotationId,
    #[serde(default, alias = "start_position")]
    pub start_position: Option<usize>,
    #[serde(default, alias = "end_position")]
    pub end_position: Option<usize>,
    #[serde(default, alias = "text_selection")]
    pub text_selection: Option<String>,
    #[serde(default, alias = "label_id")]
    pub label_id: Option<LabelId>,
    #[serde(default, alias = "label_name")]
    pub label_name: Option<String>,
    #[serde(default, alias = "label_color")]
    pub label_color: Option<String>,
    #[serde(default, alias = "label_category")]
    pub label_category: Option<String>,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<UserId>,
    #[serde(default, alias = "user_name")]
    pub user_name: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl StoredAnnotation {
    /// Merge the echo with the request that produced it
    pub fn into_annotation(self, request: &CreateAnnotationRequest) -> Annotation {
        Annotation {
            id: self.id,
            document_id: request.document_id,
            start_position: self.start_position.unwrap_or(request.start_position),
            end_position: self.end_position.unwrap_or(request.end_position),
            text_selection: self
                .text_selection
                .unwrap_or_else(|| request.text_selection.clone()),
            label_id: self.label_id.unwrap_or(request.label_id),
            label_name: self.label_name,
            label_color: self.label_color,
            label_category: self.label_category,
            context_before: request.context_before.clone(),
            context_after: request.context_after.clone(),
            user_id: self.user_id,
            user_name: self.user_name,
            created_at: self.created_at,
        }
    }
}

/// Response of `DELETE /annotations/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /labels`
#[derive(Debug, Clone, Deserialize)]
pub struct LabelsResponse {
    pub success: bool,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /documents/{id}/annotations`
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationsResponse {
    pub success: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub message: String,
}

/// A confirmed creation
#[derive(Debug, Clone)]
pub struct Created {
    pub annotation: Annotation,
    pub message: String,
}
