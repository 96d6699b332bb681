//! Shared test fixtures and utilities for integration tests.
//!
//! # Stub Omnisearch Service
//!
//! [`StubService`] is an `axum` router on `127.0.0.1:<random port>` with a
//! single `GET /search?q=...` route. It answers with whatever a responder
//! closure returns for the decoded query. Requests are served concurrently,
//! so a slow reply never blocks a fast one.
//!
//! # Available Fixtures
//!
//! - `notes_service`: answers every query with [`sample_results`]
//! - `dead_port`: a port with nothing listening on it

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use omnisearch_inject::{MemoryRegion, OmnisearchClient, ProcessOptions, SearchSession};
use rstest::fixture;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the stub answers for one request.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

#[allow(dead_code)] // Constructors used across different integration test crates
impl StubReply {
    pub fn json(value: &Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&str) -> StubReply + Send + Sync;

struct StubState {
    responder: Box<Responder>,
    requests: AtomicUsize,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// A running stub service; shut down when dropped.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct StubService {
    pub port: u16,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl StubService {
    /// Bind a random local port and start answering with `responder`.
    pub async fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub service");
        let port = listener.local_addr().expect("No local address").port();
        let state = Arc::new(StubState {
            responder: Box::new(responder),
            requests: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/search", get(search))
            .with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            port,
            state,
            handle,
        }
    }

    pub fn client(&self) -> OmnisearchClient {
        OmnisearchClient::new(self.port).expect("Failed to build client")
    }

    pub fn session(&self, options: ProcessOptions) -> SearchSession<MemoryRegion> {
        SearchSession::new(self.client(), options, MemoryRegion::new())
    }

    /// Number of search requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn search(State(state): State<Arc<StubState>>, Query(params): Query<SearchParams>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let reply = (state.responder)(&params.q);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Four results in service order, with one non-positive and one zero score.
pub fn sample_results() -> Value {
    json!([
        {
            "vault": "Personal",
            "path": "pets/cat food.md",
            "basename": "cat food",
            "excerpt": "Which &lt;b&gt;cat&lt;/b&gt; food is in the catalog?",
            "score": 3.0,
            "foundWords": ["cat"],
            "matches": [{"match": "cat", "offset": 6}]
        },
        {
            "vault": "Personal",
            "path": "junk.md",
            "basename": "junk",
            "excerpt": "nothing here",
            "score": -1,
            "foundWords": [],
            "matches": []
        },
        {
            "vault": "Work",
            "path": "taxonomy/category.md",
            "basename": "category",
            "excerpt": "&lt;script&gt;alert(1)&lt;/script&gt;A category of cat",
            "score": 5.25,
            "foundWords": ["cat", "category"],
            "matches": [{}, {}]
        },
        {
            "vault": "Work",
            "path": "empty.md",
            "basename": "empty",
            "excerpt": "",
            "score": 0,
            "foundWords": "not-an-array",
            "matches": null
        }
    ])
}

/// A stub that answers every query with [`sample_results`].
#[fixture]
pub async fn notes_service() -> StubService {
    let results = sample_results();
    StubService::spawn(move |_| StubReply::json(&results)).await
}

/// A local port with nothing listening on it.
#[fixture]
pub async fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    port
}
