//! HTTP surface over a [`Retriever`] and a [`SessionStore`].
//!
//! Routes: `GET /health`, `POST /session/init`, `POST /chat` and
//! `POST /chat/stream` (server-sent events). Streaming pacing only shapes
//! the response; retrieval runs to completion before the first event.
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_stream::stream;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use qabot_core::config::ServerSettings;
use qabot_core::traits::{Retriever, SessionStore};
use qabot_core::types::HistoryRecord;
use qabot_core::{Error, Query, SearchHit};

pub const NO_MATCH_MESSAGE: &str = "No confident match. Please rephrase or try a more specific question.";

#[derive(Clone)]
pub struct AppState {
    pub retriever: Arc<dyn Retriever>,
    pub sessions: Arc<dyn SessionStore>,
    pub stream_delay: Duration,
}

impl AppState {
    pub fn new(retriever: Arc<dyn Retriever>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { retriever, sessions, stream_delay: Duration::from_millis(30) }
    }

    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = delay;
        self
    }
}

/// Library errors mapped onto status codes with a `{"detail": ..}` body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::IndexUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionInit {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInitResponse {
    pub user_id: String,
    pub name: String,
}

/// One ranked hit as the chat client reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    #[serde(rename = "question")]
    pub variant_text: String,
    #[serde(rename = "canonical")]
    pub canonical_text: String,
    #[serde(rename = "answer")]
    pub answer_text: String,
    #[serde(rename = "score")]
    pub hybrid_score: f64,
    #[serde(rename = "tfidf")]
    pub vector_score: f64,
    #[serde(rename = "fuzzy")]
    pub fuzzy_score: f64,
}

impl From<&SearchHit> for ChatResult {
    fn from(hit: &SearchHit) -> Self {
        Self {
            variant_text: hit.variant_text.clone(),
            canonical_text: hit.canonical_text.clone(),
            answer_text: hit.answer_text.clone(),
            hybrid_score: hit.hybrid_score,
            vector_score: hit.vector_score,
            fuzzy_score: hit.fuzzy_score,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: Option<String>,
    pub results: Vec<ChatResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/session/init", post(session_init))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(settings: &ServerSettings, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| "invalid host/port for qabot server")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("qabot listening on http://{}", addr);
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}

fn markdown(hit: &SearchHit) -> String {
    format!("**Answer:** {}\n\n**Confidence:** {:.2}", hit.answer_text, hit.hybrid_score)
}

fn known_user<'a>(state: &AppState, query: &'a Query) -> Option<&'a str> {
    query.user_id.as_deref().filter(|id| state.sessions.get(id).is_some())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn session_init(
    State(state): State<AppState>,
    Json(payload): Json<SessionInit>,
) -> Result<Json<SessionInitResponse>, ApiError> {
    let session = state.sessions.init(&payload.name, &payload.email)?;
    Ok(Json(SessionInitResponse { user_id: session.user_id, name: session.name }))
}

async fn chat(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Json<ChatResponse>, ApiError> {
    let results = state.retriever.retrieve(&query.question, query.limit(), query.threshold)?;
    let Some(best) = results.first() else {
        return Ok(Json(ChatResponse {
            answer: None,
            results: Vec::new(),
            markdown: None,
            message: Some(NO_MATCH_MESSAGE.to_string()),
        }));
    };

    if let Some(user_id) = known_user(&state, &query) {
        state
            .sessions
            .append(user_id, HistoryRecord::now(query.question.as_str(), best.answer_text.as_str(), best.hybrid_score));
    }
    Ok(Json(ChatResponse {
        answer: Some(best.answer_text.clone()),
        markdown: Some(markdown(best)),
        message: None,
        results: results.iter().map(ChatResult::from).collect(),
    }))
}

async fn chat_stream(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let results = state.retriever.retrieve(&query.question, query.limit(), query.threshold)?;
    let user_id = known_user(&state, &query).map(str::to_string);

    let stream = stream! {
        let Some(best) = results.first() else {
            let done = json!({ "event": "done", "answer": null, "message": "No confident match" });
            yield Ok(Event::default().data(done.to_string()));
            return;
        };

        if let Some(id) = user_id.as_deref() {
            state.sessions.append(id, HistoryRecord::now(query.question.as_str(), "", best.hybrid_score));
        }
        let sources: Vec<_> = results
            .iter()
            .map(|hit| json!({ "question": hit.canonical_text, "score": hit.hybrid_score }))
            .collect();
        let meta = json!({ "event": "meta", "sources": sources, "confidence": best.hybrid_score });
        yield Ok(Event::default().data(meta.to_string()));

        for token in best.answer_text.split_whitespace() {
            tokio::time::sleep(state.stream_delay).await;
            let chunk = json!({ "event": "token", "text": format!("{token} ") });
            yield Ok(Event::default().data(chunk.to_string()));
        }

        if let Some(id) = user_id.as_deref() {
            state.sessions.update_last_answer(id, &best.answer_text);
        }
        yield Ok(Event::default().data(json!({ "event": "done" }).to_string()));
    };

    Ok(Sse::new(stream))
}
