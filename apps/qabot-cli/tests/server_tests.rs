use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use qabot_cli::server::{app_router, AppState, ChatResult, NO_MATCH_MESSAGE};
use qabot_core::session::InMemorySessionStore;
use qabot_core::traits::SessionStore;
use qabot_core::{QaPair, SearchHit, SynonymRule};
use qabot_hybrid::{build_index, QueryEngine, SharedIndex};

const COMPANY_ANSWER: &str = "The internship was completed at IMI Games.";

fn ready_index() -> Arc<SharedIndex> {
    let shared = SharedIndex::new(QueryEngine::default());
    shared.publish(
        build_index(
            &[
                QaPair::new("company name", COMPANY_ANSWER),
                QaPair::new("ocr preprocessing", "Canvas is upscaled first."),
            ],
            &[SynonymRule::new("company", ["organization", "firm"])],
        )
        .unwrap(),
    );
    Arc::new(shared)
}

fn app(shared: Arc<SharedIndex>, sessions: Arc<InMemorySessionStore>) -> Router {
    app_router(AppState::new(shared, sessions).with_stream_delay(Duration::ZERO))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = post(app, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn sse_events(bytes: &[u8]) -> Vec<Value> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(ready_index(), Arc::new(InMemorySessionStore::new()));
    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn chat_before_publish_is_unavailable() {
    let app = app(Arc::new(SharedIndex::default()), Arc::new(InMemorySessionStore::new()));
    let (status, body) = post_json(app, "/chat", json!({ "question": "company name" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn chat_returns_best_answer_with_markdown() {
    let app = app(ready_index(), Arc::new(InMemorySessionStore::new()));
    let (status, body) = post_json(app, "/chat", json!({ "question": "What organization did you intern at?" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], COMPANY_ANSWER);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    let top = &body["results"][0];
    assert_eq!(top["question"], "organization name");
    assert_eq!(top["canonical"], "company name");
    assert_eq!(top["answer"], COMPANY_ANSWER);
    let score = top["score"].as_f64().unwrap();
    assert!(score > 0.0 && score <= 1.0, "score={score}");
    assert!(top["tfidf"].as_f64().is_some());
    assert!(top["fuzzy"].as_f64().is_some());
    assert!(top.get("hybrid_score").is_none());
    let markdown = body["markdown"].as_str().unwrap();
    assert!(markdown.starts_with(&format!("**Answer:** {COMPANY_ANSWER}\n\n**Confidence:** 0.")));
}

#[test]
fn chat_result_uses_client_field_names() {
    let hit = SearchHit {
        variant_text: "firm name".into(),
        canonical_text: "company name".into(),
        answer_text: COMPANY_ANSWER.into(),
        hybrid_score: 0.5,
        vector_score: 0.25,
        fuzzy_score: 0.75,
    };
    let value = serde_json::to_value(ChatResult::from(&hit)).unwrap();
    assert_eq!(
        value,
        json!({
            "question": "firm name",
            "canonical": "company name",
            "answer": COMPANY_ANSWER,
            "score": 0.5,
            "tfidf": 0.25,
            "fuzzy": 0.75,
        })
    );
}

#[tokio::test]
async fn chat_without_confident_match_explains() {
    let app = app(ready_index(), Arc::new(InMemorySessionStore::new()));
    let (status, body) =
        post_json(app, "/chat", json!({ "question": "zebra quantum", "threshold": 0.99 })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].is_null());
    assert_eq!(body["message"], NO_MATCH_MESSAGE);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let app = app(ready_index(), Arc::new(InMemorySessionStore::new()));
    let (status, _) = post_json(app, "/chat", json!({ "question": " ?? " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_init_and_history() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let shared = ready_index();

    let (status, body) = post_json(
        app(shared.clone(), sessions.clone()),
        "/session/init",
        json!({ "name": "Ada", "email": " Ada@Example.com " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["user_id"].as_str().unwrap().to_string();
    assert_eq!(user_id.len(), 16);
    assert_eq!(body["name"], "Ada");

    let (status, _) = post_json(
        app(shared.clone(), sessions.clone()),
        "/chat",
        json!({ "question": "company name", "user_id": user_id.clone() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let session = sessions.get(&user_id).unwrap();
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0].answer, COMPANY_ANSWER);

    let (status, _) = post_json(app(shared, sessions), "/session/init", json!({ "name": "x", "email": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stream_emits_meta_tokens_and_done() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let session = sessions.init("Ada", "ada@example.com").unwrap();
    let app = app(ready_index(), sessions.clone());

    let (status, bytes) =
        post(app, "/chat/stream", json!({ "question": "company name", "user_id": session.user_id.clone() })).await;
    assert_eq!(status, StatusCode::OK);

    let events = sse_events(&bytes);
    let words: Vec<&str> = COMPANY_ANSWER.split_whitespace().collect();
    assert_eq!(events.len(), words.len() + 2);
    assert_eq!(events[0]["event"], "meta");
    assert_eq!(events[0]["sources"][0]["question"], "company name");
    let text: String = events[1..=words.len()]
        .iter()
        .map(|e| {
            assert_eq!(e["event"], "token");
            e["text"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(text.trim_end(), COMPANY_ANSWER);
    assert_eq!(events.last().unwrap()["event"], "done");

    let history = sessions.get(&session.user_id).unwrap().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].answer, COMPANY_ANSWER);
}

#[tokio::test]
async fn stream_without_match_sends_single_done() {
    let app = app(ready_index(), Arc::new(InMemorySessionStore::new()));
    let (status, bytes) = post(app, "/chat/stream", json!({ "question": "zebra", "threshold": 0.99 })).await;
    assert_eq!(status, StatusCode::OK);
    let events = sse_events(&bytes);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "done");
    assert!(events[0]["answer"].is_null());
}
