use clap::{Parser, Subcommand};

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `eagle` binary.
#[derive(Debug, Parser)]
#[command(name = "eagle", version, about = "Eagle - assessment entity store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report registered entities, their locations, and the text index
    Bootstrap,

    /// List registered entities, or show one entity's body schema
    Entities {
        /// Entity name (e.g. Project)
        name: Option<String>,
    },

    /// Full-text search over the shared location
    Search {
        /// FTS5 query
        query: String,
    },

    /// Show audit records
    Audit {
        /// Only records for this object id
        #[arg(long)]
        object_id: Option<String>,

        /// Only records for this entity
        #[arg(long)]
        schema: Option<String>,
    },
}
