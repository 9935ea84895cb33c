//! HttpStore against a fake annotation store

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use text_annotator::config::StoreConfig;
use text_annotator::store::{AnnotationBackend, CreateAnnotationRequest, HttpStore};
use text_annotator::RemoteError;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    tokens: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    fn token(&self, headers: &HeaderMap) {
        let token = headers
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.tokens.lock().unwrap().push(token);
    }
}

async fn annotate(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    recorded.token(&headers);
    recorded.bodies.lock().unwrap().push(body.clone());

    if body["labelId"] == 99 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Invalid label"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Annotation created",
            "annotation": {
                "id": 12,
                "label_name": "Person",
                "label_color": "#ff0000",
                "created_at": "05/03/2024 14:30"
            }
        })),
    )
}

async fn remove(State(recorded): State<Recorded>, headers: HeaderMap, Path(id): Path<i64>) -> impl IntoResponse {
    recorded.token(&headers);
    match id {
        12 => (StatusCode::OK, "{\"success\": true, \"message\": \"Annotation deleted\"}".to_string()),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Internal Server Error</h1>".to_string()),
        _ => (
            StatusCode::NOT_FOUND,
            "{\"success\": false, \"message\": \"Annotation not found\"}".to_string(),
        ),
    }
}

async fn labels() -> Json<Value> {
    Json(json!({
        "success": true,
        "labels": [
            {"id": 1, "name": "Person", "color": "#ff0000", "category": "Entities"},
            {"id": 2, "name": "Place"}
        ]
    }))
}

async fn document_annotations(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({
        "success": true,
        "annotations": [
            {
                "id": 3,
                "documentId": id,
                "startPosition": 0,
                "endPosition": 5,
                "textSelection": "Hello",
                "labelId": 1
            },
            {
                "id": 4,
                "document_id": id,
                "start_position": 6,
                "end_position": 11,
                "text_selection": "world",
                "label_id": 2
            }
        ]
    }))
}

async fn spawn_store() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/annotate", post(annotate))
        .route("/api/annotations/:id", delete(remove))
        .route("/api/labels", get(labels))
        .route("/api/documents/:id/annotations", get(document_annotations))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/", addr), recorded)
}

fn store(base_url: &str) -> HttpStore {
    HttpStore::new(&StoreConfig {
        base_url: base_url.to_string(),
        csrf_token: Some("token-123".to_string()),
    })
}

fn request(label_id: i64) -> CreateAnnotationRequest {
    CreateAnnotationRequest {
        document_id: 5,
        text_selection: "world".to_string(),
        start_position: 6,
        end_position: 11,
        label_id,
        context_before: "Hello ".to_string(),
        context_after: String::new(),
    }
}

#[tokio::test]
async fn test_create_fills_sparse_echo() {
    let (base, recorded) = spawn_store().await;
    let store = store(&base);

    let created = store.create(&request(1)).await.unwrap();

    assert_eq!(created.message, "Annotation created");
    assert_eq!(created.annotation.id, 12);
    assert_eq!(created.annotation.document_id, 5);
    assert_eq!(created.annotation.text_selection, "world");
    assert_eq!(created.annotation.label_name.as_deref(), Some("Person"));

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies[0]["textSelection"], "world");
    assert_eq!(bodies[0]["contextBefore"], "Hello ");
    assert_eq!(
        recorded.tokens.lock().unwrap()[0].as_deref(),
        Some("token-123")
    );
}

#[tokio::test]
async fn test_create_refused() {
    let (base, _recorded) = spawn_store().await;

    let err = store(&base).create(&request(99)).await.unwrap_err();
    match err {
        RemoteError::Rejected { message } => assert_eq!(message, "Invalid label"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete() {
    let (base, _recorded) = spawn_store().await;
    let store = store(&base);

    assert_eq!(store.delete(12).await.unwrap(), "Annotation deleted");
    assert!(matches!(
        store.delete(13).await,
        Err(RemoteError::Rejected { .. })
    ));
}

#[tokio::test]
async fn test_non_json_error_keeps_status() {
    let (base, _recorded) = spawn_store().await;

    match store(&base).delete(500).await {
        Err(RemoteError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("Internal Server Error"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_labels_and_annotations() {
    let (base, _recorded) = spawn_store().await;
    let store = store(&base);

    let labels = store.labels().await.unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].category.as_deref(), Some("Entities"));
    assert_eq!(labels[1].color, "#007bff");

    let annotations = store.annotations(5).await.unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1].document_id, 5);
    assert_eq!(annotations[1].text_selection, "world");
}

#[tokio::test]
async fn test_unreachable_store() {
    let store = store("http://127.0.0.1:1/api");

    assert!(matches!(
        store.labels().await,
        Err(RemoteError::Transport(_))
    ));
}
