//! CI reaper - reclaims stale test machines and leftover local test processes

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ci_reaper::cli::Cli;
use ci_reaper::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let json_output = cli.json;

    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        if json_output {
            if let Ok(out) = json::format_error(&format!("{e:#}")) {
                println!("{out}");
            }
        }
        if verbose {
            eprintln!("Error: {e:?}");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
