//! CLI module - Command-line interface for the sales health monitor
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sales Health Monitor - WooCommerce sales watchdog
/// Reports recent order counts to the external monitoring service
#[derive(Parser)]
#[command(name = "sales-health-monitor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to the first config.toml found)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server until Ctrl+C
    #[command(alias = "daemon", alias = "-d", alias = "--daemon")]
    Serve,

    /// Create default config file and the stored credentials
    #[command(alias = "--init")]
    Init,

    /// Show settings, last access and the current order count
    #[command(alias = "st")]
    Status,

    /// Print the secret token and admin key
    Token,

    /// Change monitor settings (notifies the monitoring service)
    Settings {
        /// Notification email
        #[arg(long)]
        email: Option<String>,
        /// Minimum sales allowed in the time frame
        #[arg(long)]
        threshold: Option<u32>,
        /// Time frame in hours (6, 12, 24, 48 or 168)
        #[arg(long)]
        hours: Option<u32>,
        /// Enable the monitor
        #[arg(long, conflicts_with = "disabled")]
        enabled: bool,
        /// Disable the monitor
        #[arg(long)]
        disabled: bool,
    },
}

pub use commands::*;
