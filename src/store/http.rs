//! HTTP client for the annotation store

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::annotations::{Annotation, AnnotationId, DocumentId, Label};
use crate::config::StoreConfig;
use crate::error::RemoteError;

use super::wire::{
    AnnotationsResponse, CreateAnnotationRequest, CreateAnnotationResponse, Created,
    LabelsResponse, StatusResponse,
};
use super::AnnotationBackend;

const CSRF_HEADER: &str = "X-CSRF-Token";

/// Annotation store reached over HTTP+JSON
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Use an existing client (shared connection pool, custom transport settings)
    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(ref token) = self.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder
    }
}

/// Decode a JSON body. The store answers refusals with a JSON body and an
/// error status, so the body is tried first and the status only matters when
/// the body is not JSON.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        }),
        Err(e) => Err(RemoteError::Decode(e.to_string())),
    }
}

fn rejected(message: String) -> RemoteError {
    let message = if message.is_empty() {
        "Request refused by the annotation store".to_string()
    } else {
        message
    };
    RemoteError::Rejected { message }
}

#[async_trait]
impl AnnotationBackend for HttpStore {
    async fn create(&self, request: &CreateAnnotationRequest) -> Result<Created, RemoteError> {
        let response = self
            .request(Method::POST, "annotate")
            .json(request)
            .send()
            .await?;
        let body: CreateAnnotationResponse = read_json(response).await?;

        if !body.success {
            return Err(rejected(body.message));
        }
        let stored = body
            .annotation
            .ok_or_else(|| RemoteError::Decode("response has no annotation".to_string()))?;

        Ok(Created {
            annotation: stored.into_annotation(request),
            message: body.message,
        })
    }

    async fn delete(&self, id: AnnotationId) -> Result<String, RemoteError> {
        let response = self
            .request(Method::DELETE, &format!("annotations/{}", id))
            .send()
            .await?;
        let body: StatusResponse = read_json(response).await?;

        if !body.success {
            return Err(rejected(body.message));
        }
        Ok(body.message)
    }

    async fn labels(&self) -> Result<Vec<Label>, RemoteError> {
        let response = self.request(Method::GET, "labels").send().await?;
        let body: LabelsResponse = read_json(response).await?;

        if !body.success {
            return Err(rejected(body.message));
        }
        Ok(body.labels)
    }

    async fn annotations(&self, document_id: DocumentId) -> Result<Vec<Annotation>, RemoteError> {
        let response = self
            .request(Method::GET, &format!("documents/{}/annotations", document_id))
            .send()
            .await?;
        let body: AnnotationsResponse = read_json(response).await?;

        if !body.success {
            return Err(rejected(body.message));
        }
        Ok(body.annotations)
    }
}
