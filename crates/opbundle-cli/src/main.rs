//! opbundle CLI - Publication checks for Kubernetes operator bundles

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;

#[derive(Parser)]
#[command(name = "opbundle")]
#[command(author = "opbundle Contributors")]
#[command(version)]
#[command(about = "Publication checks for Kubernetes operator bundles", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true, env = "OPBUNDLE_DEBUG")]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more bundles
    Validate {
        /// Bundle directories or .tar.gz archives
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,

        /// Strict mode - treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Show bundle contents and the declared max Kubernetes version
    Inspect {
        /// Bundle directory or .tar.gz archive
        path: PathBuf,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init(cli.debug);

    let result = match cli.command {
        Commands::Validate {
            paths,
            json,
            strict,
        } => commands::validate::run(&paths, json, strict),

        Commands::Inspect { path } => commands::inspect::run(&path),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
