//! Knowledge Base server entry point
//!
//! ```text
//! cargo run -- --env dev
//! cargo run -- --env prod --port 9000
//! ```

use anyhow::{Context, Result};

use knowledge_base::config::AppConfig;
use knowledge_base::gateway::run_server;
use knowledge_base::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env, get_port_override())?;

    let _log_guard = init_logging(&config);
    tracing::info!("Starting Knowledge Base in {} mode", env);
    tracing::debug!(?config, "Configuration loaded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.server.blocking_threads)
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_server(config))
}
