//! PrintVault CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

use commands::Cli;
use printvault_core::config::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // An unreadable config falls back to default logging here; the
    // command itself reports the config error when it loads.
    let logging = commands::load_config(&cli.env)
        .map(|c| c.logging)
        .unwrap_or_default();
    init_logging(&logging);

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing from the logging section.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}
