#![forbid(unsafe_code)]
//! nodegen command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nodegen::commands::{
    execute_generate, execute_init, execute_inspect, GenerateOptions, InitOptions, InspectOptions,
};
use nodegen::config::{Config, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "nodegen")]
#[command(about = "Generate NodeFlow node classes from annotated C++ headers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Header patterns to include (can specify multiple)
        #[arg(long)]
        include: Vec<String>,

        /// Generation cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Number of parallel workers
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Generate node classes for annotated functions
    Generate {
        /// Header files or directories
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Print generated source instead of writing the cache
        #[arg(long)]
        stdout: bool,

        /// Skip headers that have not changed since the last run
        #[arg(short, long)]
        incremental: bool,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the namespaces, functions, classes and events of a header
    Inspect {
        /// Header file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "nodegen=debug" } else { "nodegen=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init {
            force,
            include,
            cache_dir,
            workers,
        } => {
            let options = InitOptions {
                path: cli.config,
                force,
                include,
                cache_dir,
                workers,
            };
            execute_init(options)?;
        }

        Commands::Generate {
            paths,
            stdout,
            incremental,
            quiet,
        } => {
            let options = GenerateOptions {
                paths,
                stdout,
                incremental,
                quiet,
            };
            let config = Config::load_or_default(&cli.config)?;
            execute_generate(options, &config)?;
        }

        Commands::Inspect { file, json } => {
            execute_inspect(InspectOptions { file, json })?;
        }
    }

    Ok(())
}
