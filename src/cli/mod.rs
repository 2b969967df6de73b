//! CLI module for the task manager
//!
//! - `serve`: run the HTTP API
//! - `config`: print the effective configuration

pub mod config;
pub mod serve;

use clap::{Parser, Subcommand};

/// Task Manager - projects, tasks and users over a cached REST API
#[derive(Parser)]
#[command(name = "task-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default)
    Serve,

    /// Print the effective configuration with secrets hidden
    Config,
}

/// Load `.env` and the layered configuration; fall back to defaults when no source parses
pub fn load_config() -> crate::AppConfig {
    dotenvy::dotenv().ok();

    match crate::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration, using defaults: {}", e);
            crate::AppConfig::default()
        }
    }
}
