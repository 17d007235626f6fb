use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docdrift::ConfigLoader;
use docdrift::cli::commands::scan::ScanOptions;

#[derive(Parser)]
#[command(name = "docdrift")]
#[command(
    version,
    about = "Scan a repository and propose documentation updates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load configuration from this file only (defaults still apply)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and print documentation proposals
    Scan {
        #[arg(help = "Repository as owner/repo or owner/repo@ref")]
        repo: String,
        #[arg(
            long = "target",
            short = 't',
            value_name = "TYPE=GLOB[,GLOB]",
            help = "Documentation target; repeatable, replaces configured targets"
        )]
        targets: Vec<String>,
        #[arg(long, help = "Extra instructions for the generator")]
        constraints: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, short, help = "Write proposed files under this directory")]
        output: Option<PathBuf>,
    },

    /// Check whether a file exists in a repository at a ref
    Exists {
        #[arg(help = "Repository as owner/repo or owner/repo@ref")]
        repo: String,
        #[arg(help = "Path relative to the repository root")]
        path: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocdrift encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    match cli.command {
        Commands::Scan {
            repo,
            targets,
            constraints,
            format,
            output,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(docdrift::cli::commands::scan::run(
                &config,
                ScanOptions {
                    repo,
                    targets,
                    constraints,
                    format,
                    output,
                    quiet: cli.quiet,
                },
            ))?;
        }
        Commands::Exists { repo, path, format } => {
            let rt = Runtime::new()?;
            rt.block_on(docdrift::cli::commands::exists::run(
                &config, &repo, &path, &format,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                docdrift::cli::commands::config::show(&config, &format)?;
            }
            ConfigAction::Path => {
                docdrift::cli::commands::config::path()?;
            }
        },
    }

    Ok(())
}
