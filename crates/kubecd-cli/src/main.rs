//! kubecd CLI - resolve the helm values of releases deployed into environments

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use commands::values::OutputFormat;
use error::Result;

#[derive(Parser)]
#[command(name = "kubecd")]
#[command(author = "kubecd Contributors")]
#[command(version)]
#[command(about = "Resolve the helm values of releases deployed into kubecd environments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Root of the inspect cache [default: $KUBECD_CACHE, then the home directory]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved values of a release
    Values {
        /// Environment file
        env_file: PathBuf,

        /// Release name
        release: String,

        /// Keep literal values instead of looking up value-from entries
        #[arg(long)]
        skip_value_from: bool,

        /// Only print the node at this dotted path
        #[arg(short, long)]
        key: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Print the default values of a remote chart
    Inspect {
        /// Chart reference (e.g. stable/nginx-ingress)
        reference: String,

        /// Chart version
        #[arg(long)]
        version: String,
    },

    /// Print the commands deploying an environment
    Commands {
        /// Environment file
        env_file: PathBuf,

        /// Only deploy these releases
        #[arg(short, long = "release")]
        releases: Vec<String>,

        /// Pass --dry-run to helm and kubectl
        #[arg(long)]
        dry_run: bool,

        /// Pass --debug to helm
        #[arg(long)]
        debug_helm: bool,

        /// Print `helm diff upgrade` instead of `helm upgrade`
        #[arg(long)]
        diff: bool,

        /// Also print repository setup and context switch commands
        #[arg(long)]
        setup: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cache_dir = cli.cache_dir.as_deref();

    match cli.command {
        Commands::Values {
            env_file,
            release,
            skip_value_from,
            key,
            output,
        } => commands::values::run(
            &env_file,
            &release,
            skip_value_from,
            key.as_deref(),
            output,
            cache_dir,
            cli.debug,
        ),

        Commands::Inspect { reference, version } => {
            commands::inspect::run(&reference, &version, cache_dir)
        }

        Commands::Commands {
            env_file,
            releases,
            dry_run,
            debug_helm,
            diff,
            setup,
        } => commands::deploy::run(
            &env_file,
            &releases,
            commands::deploy::Options {
                dry_run,
                debug_helm,
                diff,
                setup,
            },
        ),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
