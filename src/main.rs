use std::process;

use clap::Parser;
use dirty_bits::Cli;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with RUST_LOG environment variable support.
    // Default to "info" so the detection trace shows up in CI logs.
    // Write to stderr so logs don't interfere with stdout output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");

        // Print the full error chain if available
        for err in e.chain().skip(1) {
            eprintln!("  Caused by: {err}");
        }

        process::exit(1);
    }
}
