use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "omnisearch-inject")]
#[command(about = "Search Obsidian notes through Omnisearch and render safe result fragments", long_about = None)]
pub struct Cli {
    /// Config file (default: $OMNISEARCH_INJECT_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the Omnisearch HTTP port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve MCP tools over stdio (default)
    Serve,
    /// Run one search and print the rendered fragment
    Query {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["omnisearch-inject"]).unwrap();
        check!(cli.command.is_none());
        check!(cli.port.is_none());
    }

    #[test]
    fn query_joins_words_and_takes_overrides() {
        let cli = Cli::try_parse_from([
            "omnisearch-inject",
            "query",
            "rust",
            "traits",
            "-n",
            "5",
            "--port",
            "9000",
        ])
        .unwrap();
        let_assert!(Some(Commands::Query { query, limit }) = cli.command);
        check!(query == vec!["rust", "traits"]);
        check!(limit == Some(5));
        check!(cli.port == Some(9000));
    }

    #[test]
    fn query_requires_text() {
        check!(Cli::try_parse_from(["omnisearch-inject", "query"]).is_err());
    }
}
