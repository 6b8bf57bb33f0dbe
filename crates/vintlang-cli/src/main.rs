//! VintLang CLI - The `vint` command.
//!
//! Entry point for the VintLang editor tooling:
//!
//! - **lsp**: run the language server over stdio (the default)
//! - **check**: print the diagnostics of a `.vint` file
//! - **format**: reindent a `.vint` file

mod check;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VintLang - editor tooling
#[derive(Parser, Debug)]
#[command(name = "vint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Language server and checker for VintLang", long_about = None)]
struct Args {
    /// Log filter (e.g. `debug`, `vintlang_lsp=trace`); overrides RUST_LOG
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the language server over stdio
    Lsp,

    /// Print diagnostics for a .vint file
    Check {
        /// Path to the .vint file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Format a .vint file
    Format {
        /// Path to the .vint file to format
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Show version information
    Version,
}

/// Log to stderr; stdout carries the LSP stream.
fn init_logger(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn run_lsp() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    log::info!("Starting VintLang language server on stdio");
    runtime.block_on(vintlang_lsp::run_lsp_server())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.as_deref());

    match args.command.unwrap_or(Commands::Lsp) {
        Commands::Lsp => run_lsp(),
        Commands::Check { file } => check::check_file(&file),
        Commands::Format { file, write } => check::format_file(&file, write),
        Commands::Version => {
            println!("vint {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Part of the VintLang tooling");
            Ok(())
        }
    }
}
