//! Command-line interface definitions for valdoc

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the valdoc application
#[derive(Parser)]
#[command(name = "valdoc")]
#[command(version)]
#[command(about = "Change tracking for VAL document sections", long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for valdoc
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the changes between two detail lists of one section
    Changes {
        /// JSON array of baseline details
        baseline: PathBuf,

        /// JSON array of current details
        current: PathBuf,

        /// Owning document id
        #[arg(long)]
        val_id: i64,

        /// Owning section id
        #[arg(long)]
        group_id: i64,

        /// Write the change list to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the document-wide change list from a section state snapshot
    Plan {
        /// JSON object mapping section ids to section states
        state: PathBuf,

        /// Owning document id (defaults to val_id from the config)
        #[arg(long)]
        val_id: Option<i64>,

        /// Builder configuration file
        #[arg(short, long, default_value = "valdoc.toml")]
        config: PathBuf,

        /// Apply the changes to an in-memory store and print the saved state
        #[arg(long)]
        apply: bool,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report details sharing a display order
    Check {
        /// JSON object mapping section ids to section states
        state: PathBuf,

        /// Renumber colliding sections and write the fixed snapshot here
        #[arg(long)]
        fix: Option<PathBuf>,
    },

    /// Print section contents with bracket mappings resolved
    Render {
        /// JSON object mapping section ids to section states
        state: PathBuf,

        /// Builder configuration file holding the bracket mappings
        #[arg(short, long, default_value = "valdoc.toml")]
        config: PathBuf,

        /// Fail if any placeholder has no mapping
        #[arg(long)]
        strict: bool,
    },
}
