//! `Taskboard` table server -- hosts the `tasks` table over HTTP.
//!
//! ```bash
//! # Empty table on 0.0.0.0:8787
//! cargo run --bin taskboard-server
//!
//! # Seed rows and read oldest first unless a client asks otherwise
//! cargo run --bin taskboard-server -- --config demo.toml --default-order created_at.asc
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use taskboard_proto::table::format_order;
use taskboard_server::api::{self, ServerState};
use taskboard_server::config::{ServerCliArgs, ServerConfig};
use taskboard_server::store::TableStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let seeded = config.seed.len();
    let table = match TableStore::seeded(config.seed) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e.message, "seed rows rejected");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        addr = %config.bind_addr,
        seeded,
        order = %format_order(&config.default_order),
        "starting taskboard table server"
    );

    let state = ServerState::with_table(table)
        .body_limit(config.max_body_size)
        .default_order(config.default_order);

    match api::start_server_with_state(&config.bind_addr, Arc::new(state)).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "table server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "table server task failed");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start table server");
            ExitCode::FAILURE
        }
    }
}
