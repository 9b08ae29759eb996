//! CLI command definitions for the `hotelbot` binary.
//!
//! Uses clap derive macros. Commands follow a noun-verb pattern
//! (e.g., `hotelbot session list`, `hotelbot rec click`).

pub mod message;
pub mod preference;
pub mod recommendation;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Inspect and drive the hotel chatbot's conversation store.
#[derive(Parser)]
#[command(name = "hotelbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage chat sessions (start, list, show, email, delete).
    Session {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Append or list conversation messages.
    Message {
        #[command(subcommand)]
        action: message::MessageCommand,
    },

    /// Set or show the cached search preferences of a session.
    Prefs {
        #[command(subcommand)]
        action: preference::PreferenceCommand,
    },

    /// Send, list and click hotel recommendations.
    Rec {
        #[command(subcommand)]
        action: recommendation::RecommendationCommand,
    },

    /// Show row counts for every table.
    Status,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
