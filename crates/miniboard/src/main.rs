//! Mini Board CLI binary.

use anyhow::Result;
use miniboard::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the miniboard CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file operations.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=miniboard=debug,miniboard_jsonl=trace
    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("miniboard=warn,miniboard_jsonl=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting miniboard CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("miniboard CLI completed successfully");
    Ok(())
}
