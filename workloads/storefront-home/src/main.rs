//! Storefront home page server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use edge_core::StorefrontConfig;
use edge_data::{QueryClient, StorefrontClient};
use edge_observability::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "storefront-home", version, about = "Streaming storefront home page")]
struct Cli {
    /// Config file (defaults to $STOREFRONT_CONFIG, then ./storefront.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = StorefrontConfig::discover(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    config.validate()?;

    init_tracing(config.log_format()?).map_err(|e| anyhow::anyhow!(e))?;

    let client: Arc<dyn QueryClient> = Arc::new(StorefrontClient::from_config(&config)?);
    let app = storefront_home::router(client);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        endpoint = %config.graphql_endpoint(),
        timeout_ms = config.request_timeout_ms,
        "Storefront home listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
