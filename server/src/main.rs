use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use server::{AppState, ServerConfig, load_corpus, router};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jobboard-server")]
#[command(version)]
#[command(about = "Simulated job board backend")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "JOBBOARD_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Path to the jobs corpus (JSON array)
    #[arg(long, env = "JOBBOARD_DATA", default_value = "data/jobs.json")]
    data: PathBuf,

    /// Simulated latency for listings, in milliseconds
    #[arg(long, env = "JOBBOARD_DELAY_MS", default_value_t = 100)]
    delay_ms: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let list_delay = Duration::from_millis(self.delay_ms);
        // detail and submit keep their ratio to the listing delay
        ServerConfig {
            addr: self.addr,
            data_path: self.data,
            list_delay,
            detail_delay: list_delay * 2,
            submit_delay: list_delay * 10,
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received SIGINT, shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("🚀 Starting Job Board Server...");

    let config = Args::parse().into_config();
    let jobs = load_corpus(&config.data_path)?;
    let addr = config.addr;

    let app = router(Arc::new(AppState::new(jobs, config)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("🌐 Server running at http://{}", addr);
    tracing::info!("   Try: curl 'http://{}/jobs?search=engineer'", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
