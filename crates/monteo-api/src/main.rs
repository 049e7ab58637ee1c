//! Monteo REST API entry point.
//!
//! Binary name: `monteo`
//!
//! Parses CLI arguments, initializes the database and services, then starts
//! the REST API server or runs the requested maintenance command.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use monteo_infra::config::{load_config, resolve_data_dir};
use monteo_types::process::Actor;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            data_dir,
            json_logs,
        } => {
            monteo_observe::tracing_setup::init_tracing(json_logs)
                .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

            let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
            let mut config = load_config(&data_dir).await;
            if let Some(port) = port {
                config.port = port;
            }

            let state = AppState::init(data_dir, &config).await?;
            let router = http::router::build_router(state);

            let addr = format!("0.0.0.0:{}", config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("listening on {addr}");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Commands::InitKey {
            role,
            name,
            data_dir,
        } => {
            let role: Actor = role
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            if role == Actor::System {
                anyhow::bail!("'system' is reserved for the automation engine");
            }

            let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
            let config = load_config(&data_dir).await;
            let state = AppState::init(data_dir, &config).await?;

            let key =
                http::extractors::auth::create_api_key(&state.db_pool, &name, role).await?;
            println!("{key}");
            eprintln!("Store this key now; only its hash is kept.");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
