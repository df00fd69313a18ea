//! Exercises the registry client against an in-process fake registry.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use schema_registry_client::{value_subject, SchemaRegistryClient, SchemaRegistryError};

#[derive(Default)]
struct Seen {
    subject: Option<String>,
    authorization: Option<String>,
    body: Option<serde_json::Value>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn registry(seen: Arc<Mutex<Seen>>, status: StatusCode, reply: &'static str) -> Router {
    Router::new()
        .route(
            "/subjects/{subject}/versions",
            post(
                move |State(seen): State<Arc<Mutex<Seen>>>,
                      Path(subject): Path<String>,
                      headers: HeaderMap,
                      body: String| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.subject = Some(subject);
                    seen.authorization = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    seen.body = serde_json::from_str(&body).ok();
                    (status, reply)
                },
            ),
        )
        .with_state(seen)
}

#[test]
fn value_subject_uses_topic_name_strategy() {
    assert_eq!(value_subject("netflix_browsing_activity"), "netflix_browsing_activity-value");
}

#[tokio::test]
async fn register_returns_schema_id_and_sends_basic_auth() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let base = serve(registry(seen.clone(), StatusCode::OK, r#"{"id": 100042}"#)).await;

    let client =
        SchemaRegistryClient::new(&base, Some(("key".to_string(), "secret".to_string()))).unwrap();
    let schema = r#"{"type":"record","name":"A","fields":[]}"#;
    let id = client.register_schema("topic-value", schema).await.unwrap();

    assert_eq!(id, 100042);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.subject.as_deref(), Some("topic-value"));
    // base64("key:secret")
    assert_eq!(seen.authorization.as_deref(), Some("Basic a2V5OnNlY3JldA=="));
    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["schema"], schema);
    assert!(body.get("schemaType").is_none());
}

#[tokio::test]
async fn register_surfaces_api_errors_with_status() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let base = serve(registry(
        seen,
        StatusCode::CONFLICT,
        r#"{"error_code":409,"message":"incompatible"}"#,
    ))
    .await;

    let client = SchemaRegistryClient::new(&format!("{base}/"), None).unwrap();
    let err = client.register_schema("topic-value", "{}").await.unwrap_err();

    match err {
        SchemaRegistryError::Api { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("incompatible"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn register_rejects_unparseable_reply() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let base = serve(registry(seen, StatusCode::OK, "not json")).await;

    let client = SchemaRegistryClient::new(&base, None).unwrap();
    let err = client.register_schema("topic-value", "{}").await.unwrap_err();
    assert!(matches!(err, SchemaRegistryError::Parse(_)));
}
