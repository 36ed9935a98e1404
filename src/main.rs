//! difyc binary entry point.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls log output; --debug raises the default floor.
    let default_filter = if std::env::args().any(|a| a == "--debug") {
        "dify_chat=debug"
    } else {
        "dify_chat=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    dify_chat::cli::run().await
}
