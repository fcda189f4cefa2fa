//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::render_cmd::RenderArgs;
use super::resolve::IdentifierQuery;
use super::{imports_cmd, render_cmd, resolve, tui, watch};

#[derive(Parser)]
#[command(name = "plannav")]
#[command(author, version)]
#[command(about = "Reference navigator and chart preview for hierarchical plan files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a task or resource identifier to its source locations
    Resolve {
        /// Root plan file
        file: PathBuf,

        /// Identifier to look up (dotted for nested tasks)
        identifier: String,

        /// What the identifier names
        #[arg(long, value_enum, default_value = "auto")]
        kind: IdentifierQuery,
    },

    /// List the import closure of a plan file
    Imports {
        /// Root plan file
        file: PathBuf,
    },

    /// Render the chart once
    Render {
        /// Root plan file
        file: PathBuf,

        #[command(flatten)]
        options: RenderArgs,
    },

    /// Re-render whenever a file in the import closure changes
    Watch {
        /// Root plan file
        file: PathBuf,

        #[command(flatten)]
        options: RenderArgs,
    },

    /// Interactive chart preview with click-to-source navigation
    Preview {
        /// Root plan file
        file: PathBuf,

        #[command(flatten)]
        options: RenderArgs,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("plannav starting");

    match cli.command {
        Commands::Resolve {
            file,
            identifier,
            kind,
        } => {
            output.verbose_ctx(
                "resolve",
                &format!("Resolving '{}' in {}", identifier, file.display()),
            );
            resolve::run(&output, &file, &identifier, kind)?
        }

        Commands::Imports { file } => {
            output.verbose_ctx("imports", &format!("Scanning closure of {}", file.display()));
            imports_cmd::run(&output, &file)?
        }

        Commands::Render { file, options } => render_cmd::run(&output, &file, &options)?,

        Commands::Watch { file, options } => watch::run(&output, &file, &options)?,

        Commands::Preview { file, options } => tui::run(&output, &file, &options)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
