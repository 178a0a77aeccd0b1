//! Command-line interface definitions for docweave

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the docweave application
#[derive(Parser)]
#[command(name = "docweave")]
#[command(version)]
#[command(about = "Markdown document parser and project indexer", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for docweave
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new document project
    Init {
        /// Project name
        name: String,

        /// Project author
        #[arg(short, long, default_value = "unknown")]
        author: String,

        /// Directory to initialize (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Parse all project documents and render them to HTML
    Build {
        /// Project directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Output directory for rendered HTML
        #[arg(short, long, default_value = "build")]
        output: PathBuf,

        /// Skip HTML rendering
        #[arg(long)]
        no_html: bool,

        /// Skip structural metadata extraction
        #[arg(long)]
        no_metadata: bool,

        /// Leave diagram directives as literal text
        #[arg(long)]
        no_diagrams: bool,

        /// Skip link classification and resolution
        #[arg(long)]
        no_links: bool,

        /// Root used to resolve relative internal links
        #[arg(long)]
        base_path: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print project statistics
    Stats {
        /// Project directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Emit the index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search documents by title, description, and tags
    Search {
        /// Project directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Search query
        query: String,
    },

    /// List documents in a category
    Category {
        /// Project directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Category name (exact match)
        name: String,
    },
}
