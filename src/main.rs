//! wikiracer-server: crawl Wikipedia concurrently to find a chain of
//! links from a start article to a destination article.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wikiracer_server::pool::JobPool;
use wikiracer_server::{api, port_from_env};

/// wikiracer-server: find a chain of Wikipedia links between two articles.
#[derive(Parser)]
#[command(name = "wikiracer-server")]
#[command(about = "Concurrent Wikipedia link-chasing server")]
struct Cli {
    /// Port to listen on; overrides WIKI_PORT if given.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let port = cli.port.unwrap_or_else(port_from_env);

    let pool: api::AppState = Arc::new(JobPool::new());
    let app = api::new_router(pool);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("Start server on :{port}");
    tracing::info!("Use http://127.0.0.1:{port}/api/v1/ for more help");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
