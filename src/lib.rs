//! Search Obsidian notes through the Omnisearch plugin and render the hits
//! as safe HTML fragments.
//!
//! Per result, the excerpt flows through [`decode`] → [`sanitize`] →
//! [`highlight`]; the result set itself is shaped by [`process`] before
//! rendering.

pub mod cli;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod highlight;
pub mod markup;
pub mod process;
pub mod render;
pub mod sanitize;
pub mod server;
pub mod session;
pub mod tracing;
pub mod types;

pub use client::OmnisearchClient;
pub use config::Config;
pub use decode::decode;
pub use error::{ConfigError, SearchError};
pub use highlight::{TermMatcher, highlight, highlight_with};
pub use markup::{AllowList, MarkupNode};
pub use process::{ProcessOptions, process};
pub use render::{excerpt_html, render_result, render_results};
pub use sanitize::{sanitize, sanitize_tree};
pub use session::{MemoryRegion, Outcome, OutputRegion, RequestToken, SearchSession};
pub use types::SearchResult;
