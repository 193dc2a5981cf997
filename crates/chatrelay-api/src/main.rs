//! chatrelay CLI and HTTP server entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! dispatches to a command handler or starts the HTTP server.

mod cli;

use std::time::Duration;

use clap::Parser;

use chatrelay_api::http;
use chatrelay_api::state::AppState;
use chatrelay_core::relay::service::RelaySettings;
use chatrelay_infra::config::resolve_data_dir;
use chatrelay_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level based on verbosity; RUST_LOG takes precedence
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn,chatrelay=info,tower_http=info",
        1 => "info,chatrelay_core=debug,chatrelay_infra=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);

    match cli.command {
        Commands::Serve {
            port,
            host,
            route,
            max_history,
            history_ttl_secs,
            purge_interval_secs,
        } => {
            let settings = RelaySettings {
                max_history,
                history_ttl_secs,
            };
            let state = AppState::init(&data_dir, cli.store, settings).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} chatrelay listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}{route}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, %route, store = %cli.store, max_history, "Server starting");

            let purge = state.spawn_purge_task(Duration::from_secs(purge_interval_secs));
            let router = http::router::build_router(state, &route);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            purge.abort();

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::History { action } => {
            let state = AppState::init(&data_dir, cli.store, RelaySettings::default()).await?;
            cli::history::run(&state, action, cli.json).await?;
        }

        Commands::Config { action } => {
            let state = AppState::init(&data_dir, cli.store, RelaySettings::default()).await?;
            cli::config::run(&state, action, cli.json).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
