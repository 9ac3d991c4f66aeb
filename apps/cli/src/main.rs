//! taxsync CLI — sync academic course data into remote term-store
//! taxonomies.
//!
//! Reads a semester's course export, classifies each course into department
//! buckets, and reconciles the resulting term hierarchies against the remote
//! store.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
