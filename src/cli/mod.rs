//! CLI module for shopmate - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
