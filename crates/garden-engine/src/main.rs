//! # Garden Engine
//!
//! Headless runner for Fractal Garden.
//!
//! Loads plant definitions from a directory, builds a garden from a TOML
//! configuration and simulates it, logging periodic summaries.
//!
//! Usage: `garden [config.toml]` (defaults to `garden.toml`). Log output is
//! controlled with `RUST_LOG`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod loader;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("garden=info".parse()?)
                .add_directive("garden_sim=info".parse()?),
        )
        .init();

    info!("Fractal Garden starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = EngineConfig::load_or_create(&config_path);

    app::run(config)?;

    info!("Fractal Garden shutdown complete");
    Ok(())
}
