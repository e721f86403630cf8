//! Command-line interface

pub mod landing;
pub mod seed;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "claroche", about = "Activewear storefront tracking service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Load the demo catalog into the configured database
    Seed,
    /// Simulate a tracked landing against a running server
    Landing {
        /// Landing URL, e.g. "/shop?add=1&variant=2&ref=ABCDEF"
        url: String,
    },
    /// Print a sample config.toml to stdout
    SampleConfig,
}
