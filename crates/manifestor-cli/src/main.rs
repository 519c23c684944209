mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, generate::GenerateArgs};
use manifestor_core::OutputFormat;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "manifestor",
    about = "Generate Tekton EventListeners from a deployment manifest",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .manifestor.yaml or .git/)
    #[arg(long, global = true, env = "MANIFESTOR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the EventListener for every service with a source URL
    Generate {
        /// Manifest file, relative to the project root (default: `manifest` from config)
        #[arg(long, short = 'm')]
        manifest: Option<PathBuf>,

        /// EventListener name (default: `listener.name` from config)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Output format: yaml or json
        #[arg(long, short = 'f')]
        format: Option<OutputFormat>,

        /// Write to this file instead of stdout, relative to the project root
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the services that would get a trigger
    Services {
        /// Manifest file, relative to the project root (default: `manifest` from config)
        #[arg(long, short = 'm')]
        manifest: Option<PathBuf>,
    },

    /// Inspect or scaffold the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins outright; without it only warnings and errors show.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Generate {
            manifest,
            name,
            format,
            output,
        } => cmd::generate::run(
            &root,
            GenerateArgs {
                manifest,
                name,
                format,
                output,
            },
            cli.json,
        ),
        Commands::Services { manifest } => {
            cmd::services::run(&root, manifest.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
