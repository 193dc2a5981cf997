//! CLI command definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chatrelay_core::history::{HISTORY_TTL_SECS, MAX_HISTORY_MESSAGES};
use chatrelay_infra::store::{PURGE_INTERVAL, StoreKind};

/// Relay chat messages to a conversational AI upstream.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Directory holding relay.toml and chatrelay.db (default: ~/.chatrelay).
    #[arg(long, env = "CHATRELAY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// History store backend: sqlite or memory.
    #[arg(long, env = "CHATRELAY_STORE", default_value = "sqlite", global = true)]
    pub store: StoreKind,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "CHATRELAY_PORT", default_value = "8787")]
        port: u16,

        /// Host to bind to.
        #[arg(long, env = "CHATRELAY_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Path of the chat endpoint.
        #[arg(long, default_value = chatrelay_api::http::router::DEFAULT_CHAT_PATH)]
        route: String,

        /// Prior turns sent upstream with each message.
        #[arg(long, default_value_t = MAX_HISTORY_MESSAGES)]
        max_history: usize,

        /// Seconds a session history survives without activity.
        #[arg(long, default_value_t = HISTORY_TTL_SECS)]
        history_ttl_secs: u64,

        /// Seconds between sweeps that delete expired histories.
        #[arg(long, default_value_t = PURGE_INTERVAL.as_secs())]
        purge_interval_secs: u64,
    },

    /// Inspect or clear stored session histories.
    History {
        #[command(subcommand)]
        action: history::HistoryCommand,
    },

    /// Inspect the relay configuration.
    Config {
        #[command(subcommand)]
        action: config::ConfigCommand,
    },
}
