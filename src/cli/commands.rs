//! CLI command definitions using clap.
//!
//! - serve: run the HTTP chat endpoint (default)
//! - ask: one local round trip, printed to stdout

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shopmate - storefront chat endpoint backed by Gemini and a product lookup tool
#[derive(Parser, Debug)]
#[command(name = "shopmate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Serve the chat endpoint over HTTP
    Serve {
        /// Address to bind, overriding server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// Message for the assistant
        message: String,
    },
}
