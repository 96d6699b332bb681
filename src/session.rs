//! Query sessions: request tokens, stale-response discard, and the output region.
//!
//! Every query gets a monotonically increasing [`RequestToken`]. Issuing a
//! new query cancels the previous in-flight request, and a completion may
//! only repaint the output region while its token is still the latest one.
//! The token check and the repaint happen under one lock, so two accepted
//! completions can never interleave their writes.

use crate::client::OmnisearchClient;
use crate::process::{ProcessOptions, process};
use crate::render::{LOADING_FRAGMENT, TRANSPORT_ERROR_FRAGMENT, render_results};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Identifier of an issued query; later queries have larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The region of the host page that displays results.
///
/// Each accepted completion replaces the whole region content.
pub trait OutputRegion: Send + Sync {
    fn repaint(&self, html: &str);
}

/// An [`OutputRegion`] that keeps the latest fragment in memory.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    html: Mutex<String>,
    paints: AtomicUsize,
}

impl MemoryRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current region content.
    pub fn contents(&self) -> String {
        self.html.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of repaints so far.
    pub fn paint_count(&self) -> usize {
        self.paints.load(Ordering::SeqCst)
    }
}

impl OutputRegion for MemoryRegion {
    fn repaint(&self, html: &str) {
        let mut current = self.html.lock().unwrap_or_else(PoisonError::into_inner);
        html.clone_into(&mut *current);
        self.paints.fetch_add(1, Ordering::SeqCst);
    }
}

/// How a query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Results were rendered into the region.
    Rendered { count: usize, fragment: String },
    /// The service answered with nothing displayable.
    Empty { fragment: String },
    /// The service could not be reached; the region shows the error message.
    Failed { fragment: String },
    /// A newer query was issued first; nothing was written.
    Stale,
    /// Blank query; nothing was issued.
    Skipped,
}

impl Outcome {
    /// The fragment written to the region, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Rendered { fragment, .. } | Self::Empty { fragment } | Self::Failed { fragment } => {
                Some(fragment)
            }
            Self::Stale | Self::Skipped => None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    latest: u64,
    in_flight: CancellationToken,
}

/// Runs queries against the service and owns the output region.
#[derive(Debug)]
pub struct SearchSession<R> {
    client: OmnisearchClient,
    options: ProcessOptions,
    region: R,
    state: Mutex<SessionState>,
}

impl<R: OutputRegion> SearchSession<R> {
    pub fn new(client: OmnisearchClient, options: ProcessOptions, region: R) -> Self {
        Self {
            client,
            options,
            region,
            state: Mutex::new(SessionState {
                latest: 0,
                in_flight: CancellationToken::new(),
            }),
        }
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Run a query with the session's configured options.
    pub async fn run(&self, query: &str) -> Outcome {
        self.run_with(query, &self.options).await
    }

    /// Run a query with explicit processing options.
    pub async fn run_with(&self, query: &str, options: &ProcessOptions) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::Skipped;
        }

        let (token, cancel) = self.begin();
        tracing::info!(token = token.get(), query, "Running search");

        let fetched = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(token = token.get(), "Search superseded before completion");
                return Outcome::Stale;
            }
            fetched = self.client.search(query) => fetched,
        };

        let outcome = match fetched {
            Ok(raw) => {
                let results = process(&raw, options);
                let fragment = render_results(&results);
                if results.is_empty() {
                    Outcome::Empty { fragment }
                } else {
                    Outcome::Rendered {
                        count: results.len(),
                        fragment,
                    }
                }
            }
            Err(e) => {
                tracing::error!(token = token.get(), "Omnisearch error: {}", e);
                Outcome::Failed {
                    fragment: TRANSPORT_ERROR_FRAGMENT.to_string(),
                }
            }
        };

        let Some(fragment) = outcome.fragment() else {
            return outcome;
        };
        if self.paint_if_current(token, fragment) {
            outcome
        } else {
            tracing::debug!(token = token.get(), "Discarding stale search response");
            Outcome::Stale
        }
    }

    /// Issue a new token, cancel the previous request and show the loading state.
    pub(crate) fn begin(&self) -> (RequestToken, CancellationToken) {
        let mut state = self.lock_state();
        state.latest += 1;
        state.in_flight.cancel();
        state.in_flight = CancellationToken::new();
        self.region.repaint(LOADING_FRAGMENT);
        (RequestToken(state.latest), state.in_flight.clone())
    }

    /// Repaint the region only if `token` is still the latest issued token.
    pub(crate) fn paint_if_current(&self, token: RequestToken, html: &str) -> bool {
        let state = self.lock_state();
        if state.latest != token.0 {
            return false;
        }
        self.region.repaint(html);
        true
    }

    /// The most recently issued token, if any query ran.
    pub fn latest_token(&self) -> Option<RequestToken> {
        let latest = self.lock_state().latest;
        (latest > 0).then_some(RequestToken(latest))
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
