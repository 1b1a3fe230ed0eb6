//! PassionDSA API server — entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (defaults < TOML < env)
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build the resolver (mock or live tier)
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve `/api/*` until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use passiondsa::{config, error::AppError, logger, resolver::Resolver, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bind = %config.server.bind_addr(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        mock_ai = config.mock_ai,
        has_api_key = config.openai_api_key.is_some(),
        "config loaded"
    );

    let resolver = Resolver::from_config(&config).map_err(|e| AppError::Config(e.to_string()))?;
    if resolver.tier_name() == "mock" {
        warn!("serving mock explanations (MOCK_AI=1 or OPENAI_API_KEY unset)");
    } else {
        info!(model = %config.llm.openai.model, "live tier enabled");
    }

    // Shared shutdown token — Ctrl-C cancels it, the server watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    server::run(&config.server.bind_addr(), Arc::new(resolver), shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: passiondsa [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml if present)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!();
                println!("Environment: PORT, MOCK_AI=1, OPENAI_API_KEY, PASSIONDSA_LOG_LEVEL");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => {
                eprintln!("warning: ignoring unknown argument '{other}'");
            }
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path }
}
