use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use orgblock_lsp::Backend;

/// Org block header completion language server (stdio transport).
#[derive(Parser)]
#[command(name = "orgblock_lsp", version, about)]
struct Cli {
    /// Log filter directive, e.g. "info" or "orgblock_lsp=debug".
    /// Overridden by RUST_LOG when set.
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the LSP transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log)),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting orgblock-lsp");

    let (service, socket) = LspService::new(Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
