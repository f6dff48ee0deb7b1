mod cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "flexbatch=info,worker=info,common=info";

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG tiene prioridad sobre el filtro por defecto
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    cli::run().await
}
