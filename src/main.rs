use anyhow::Context;
use clap::Parser;
use omnisearch_inject::cli::{Cli, Commands};
use omnisearch_inject::error::Result;
use omnisearch_inject::server::OmnisearchServer;
use omnisearch_inject::{Config, MemoryRegion, OmnisearchClient, Outcome, SearchSession};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    omnisearch_inject::tracing::init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let client = OmnisearchClient::new(config.port).context("Failed to build HTTP client")?;
    let session = Arc::new(SearchSession::new(
        client,
        config.process_options(),
        MemoryRegion::new(),
    ));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(session).await,
        Commands::Query { query, limit } => {
            let mut options = config.process_options();
            if let Some(limit) = limit {
                options.nb_results = limit;
            }
            let outcome = session.run_with(&query.join(" "), &options).await;
            if let Some(fragment) = outcome.fragment() {
                println!("{}", fragment);
            }
            if let Outcome::Failed { .. } = outcome {
                anyhow::bail!("Omnisearch server unreachable on port {}", config.port);
            }
            Ok(())
        }
    }
}

async fn serve(session: Arc<SearchSession<MemoryRegion>>) -> Result<()> {
    tracing::info!("Starting omnisearch-inject MCP server");

    let server = OmnisearchServer::new(session);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
