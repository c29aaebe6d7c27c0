//! Taskstate reference store server.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use taskstate_store::{create_router, AppState, Config};

/// Taskstate reference state store.
#[derive(Parser, Debug)]
#[command(name = "taskstate-store", about = "In-memory task/group state store over HTTP")]
struct Args {
    /// HTTP server address
    #[arg(long)]
    bind_addr: Option<String>,

    /// Path prefix of the state API
    #[arg(long)]
    api_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("taskstate=info".parse::<Directive>()?),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let defaults = Config::default();
    let config = Config {
        bind_addr: args.bind_addr.unwrap_or(defaults.bind_addr),
        api_prefix: args.api_prefix.unwrap_or(defaults.api_prefix),
    };

    let state = AppState::new();
    let router = create_router(state, &config.api_prefix);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        api_prefix = %config.api_prefix,
        "Taskstate store listening"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
