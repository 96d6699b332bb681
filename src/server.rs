//! MCP server exposing the search pipeline as tools.

use crate::render::excerpt_html;
use crate::session::{MemoryRegion, Outcome, SearchSession};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// Parameters for the search_notes tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchNotesRequest {
    /// Search query sent to Omnisearch
    pub query: String,
    /// Maximum number of results to render (default: configured nbResults)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for the render_excerpt tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RenderExcerptRequest {
    /// Excerpt text as returned by Omnisearch (may contain encoded markup)
    pub excerpt: String,
    /// Words to highlight
    #[serde(default)]
    pub words: Vec<String>,
}

/// MCP server for Obsidian Omnisearch queries
#[derive(Clone)]
pub struct OmnisearchServer {
    /// Shared query session (client, options, output region)
    session: Arc<SearchSession<MemoryRegion>>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for OmnisearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmnisearchServer")
            .field("session", &self.session)
            .finish()
    }
}

#[tool_router]
impl OmnisearchServer {
    pub fn new(session: Arc<SearchSession<MemoryRegion>>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> &Arc<SearchSession<MemoryRegion>> {
        &self.session
    }

    #[tool(
        description = "Search the user's Obsidian vaults through the Omnisearch plugin's local HTTP server. Returns an HTML fragment with one card per note: title, path, match count, score, and a sanitized excerpt with the matched words highlighted."
    )]
    async fn search_notes(
        &self,
        Parameters(request): Parameters<SearchNotesRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_notes(&self.session, request).await
    }

    #[tool(
        description = "Decode, sanitize and highlight a single Omnisearch excerpt. Only inline formatting tags (b, i, u, em, strong, code, mark, br) survive, and no attributes are kept."
    )]
    fn render_excerpt(
        &self,
        Parameters(RenderExcerptRequest { excerpt, words }): Parameters<RenderExcerptRequest>,
    ) -> std::result::Result<String, String> {
        Ok(excerpt_html(&excerpt, &words))
    }
}

/// Execute a search and return the fragment written to the results region.
pub async fn handle_search_notes(
    session: &SearchSession<MemoryRegion>,
    request: SearchNotesRequest,
) -> Result<String, String> {
    let mut options = *session.options();
    if let Some(limit) = request.limit {
        options.nb_results = limit;
    }

    match session.run_with(&request.query, &options).await {
        Outcome::Skipped => Err("Query must not be empty".to_string()),
        Outcome::Stale => Err("Superseded by a newer search before it completed".to_string()),
        Outcome::Failed { fragment } => Err(fragment),
        Outcome::Rendered { fragment, .. } | Outcome::Empty { fragment } => Ok(fragment),
    }
}

#[tool_handler]
impl ServerHandler for OmnisearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "omnisearch-inject: searches Obsidian notes through the Omnisearch plugin's local HTTP server. \
                 Obsidian must be running with the Omnisearch HTTP server enabled.",
            )
    }
}
