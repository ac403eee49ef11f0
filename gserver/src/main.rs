use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gemline::{GemlineConfig, build_runtime};
use gserver::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gserver", about = "Gemini chat server with model fallback and tool calling")]
struct Cli {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Standing instructions sent ahead of every conversation (overrides GEMLINE_PROMPT_FILE)
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = GemlineConfig::from_env();
    if let Some(prompt_file) = cli.prompt_file {
        config = config.with_prompt_file(prompt_file);
    }
    info!(
        gemini_key = config.gemini_key_configured(),
        image_key = config.image_key_configured(),
        fallback = ?config.fallback.as_slice(),
        "configuration loaded"
    );

    let runtime = build_runtime(&config).context("failed to build runtime")?;
    if config.gemini_key_configured() {
        runtime.warm_up().await;
    }

    let listener = gserver::bind(&cli.host, cli.port)
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!("listening on http://{addr}");

    gserver::serve(listener, AppState::new(runtime, &config), shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
