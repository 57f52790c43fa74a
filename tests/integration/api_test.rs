//! Document store client against a mock server

use crate::assert_err;
use lexdraft::api::{ApiError, DocumentApi};
use lexdraft::editor::{DocumentNode, StructuredDocumentModel};
use lexdraft::offline::{OptimisticStore, RetryPolicy};
use lexdraft::shared::{AppConfig, DocumentId};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
        jitter_ms: 0,
    }
}

fn client(server: &MockServer) -> DocumentApi {
    let config = AppConfig::builder()
        .api_base_url(format!("{}/api/", server.uri()))
        .retry(fast_retry())
        .build()
        .unwrap();
    DocumentApi::new(&config).unwrap()
}

fn doc_id(raw: &str) -> DocumentId {
    DocumentId::parse(raw).unwrap()
}

#[tokio::test]
async fn test_get_document_feeds_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/6650f0/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "6650f0",
            "title": "Mutual NDA",
            "messages": [],
            "document_versions": [
                {"version_number": 0, "content": "<p>draft</p>", "uploaded_at": "2024-05-01T10:00:00"},
                {"version_number": 1, "content": {"type": "doc", "content": [
                    {"type": "paragraph", "attrs": {"data-indent": 1}, "content": [{"type": "text", "text": "Parties"}]}
                ]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server).get_document(&doc_id("6650f0")).await.unwrap();
    assert_eq!(record.title.as_deref(), Some("Mutual NDA"));

    let latest = record.latest_version().unwrap();
    let model = StructuredDocumentModel::new(DocumentNode::from_value(&latest.content).unwrap());
    assert_eq!(model.root().children[0].indent().get(), 1);
}

#[tokio::test]
async fn test_fetch_comments_feeds_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/d1/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "user": "bob", "content": "clause 3?", "created_at": "2024-05-01T10:00:00.5"},
            {"id": 2, "user": "alice", "content": "fixed", "created_at": "2024-05-01T11:00:00Z", "parent_comment_id": 1}
        ])))
        .mount(&server)
        .await;

    let comments = client(&server).fetch_comments(&doc_id("d1")).await.unwrap();
    let mut store = OptimisticStore::new();
    store.load(comments);
    assert_eq!(store.len(), 2);
    assert_eq!(store.roots().count(), 1);
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"_id": "a"}])))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client(&server).list_documents().await.unwrap();
    assert_eq!(documents.len(), 1);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let result = client(&server).list_documents().await;
    assert_err!(result, ApiError::Status { status: 500, .. });
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_document(&doc_id("gone"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_share_document_posts_shared_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/"))
        .and(body_json(json!({
            "title": "Shared Document",
            "messages": [],
            "initial_document_content": "<p>terms</p>",
            "notes": "Shared document"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "66aa"})))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .share_document(json!("<p>terms</p>"), None)
        .await
        .unwrap();
    assert_eq!(id.as_str(), "66aa");
}

#[tokio::test]
async fn test_version_content_unwraps_content_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/d1/versions/2/content/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "<p>v2</p>"})))
        .mount(&server)
        .await;

    let content = client(&server)
        .get_version_content(&doc_id("d1"), 2)
        .await
        .unwrap();
    assert_eq!(content, json!("<p>v2</p>"));
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client(&server).list_documents().await;
    assert_err!(result, ApiError::Decode(_));
}
