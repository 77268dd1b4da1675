//! ietc: command-line front end for IET target specialization.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ietc", version, about = "Specialize Iteration/Expression Trees for a target platform")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower an IET for a platform and write the result as JSON
    Lower {
        /// Input IET (.json)
        #[arg(long)]
        input: PathBuf,
        /// Platform name (built-in or platforms/<name>.platform.toml)
        #[arg(long, conflicts_with = "platform_file")]
        platform: Option<String>,
        /// Platform definition file
        #[arg(long)]
        platform_file: Option<PathBuf>,
        /// Rewrite mode (noop, advanced, or a comma-separated pass list)
        #[arg(long, conflicts_with = "passes")]
        mode: Option<String>,
        /// Explicit pass sequence, comma-separated
        #[arg(long)]
        passes: Option<String>,
        /// Option override as key=value (repeatable)
        #[arg(long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
        /// Configuration file (default: iet.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Profiling level (off, basic, advanced)
        #[arg(long)]
        profiling: Option<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect target platforms
    Platform {
        #[command(subcommand)]
        action: PlatformAction,
    },
    /// List the passes of the reference CPU backend
    Passes,
}

#[derive(Subcommand)]
enum PlatformAction {
    /// List available platforms
    List,
    /// Show details of a platform
    Describe {
        /// Platform name
        name: String,
        /// Output format (default: human-readable, "toml" for TOML)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Lower {
            input,
            platform,
            platform_file,
            mode,
            passes,
            options,
            config,
            profiling,
            output,
        } => commands::lower::run(
            &cwd,
            &commands::lower::LowerArgs {
                input,
                platform,
                platform_file,
                mode,
                passes,
                options,
                config,
                profiling,
                output,
            },
        ),

        Commands::Platform { action } => match action {
            PlatformAction::List => commands::platform::list(&cwd),
            PlatformAction::Describe { name, format } => {
                commands::platform::describe(&name, &cwd, format.as_deref())
            }
        },

        Commands::Passes => commands::passes::list(),
    }
}
