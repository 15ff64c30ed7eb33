//! ReadSleuth — throttled read-health verifier for suspect storage.
//!
//! Thin binary entry point. All logic lives in the `readsleuth-core`
//! and `readsleuth-cli` crates.

use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    readsleuth_cli::run(readsleuth_cli::Cli::parse())
}
