use clap::{Parser, Subcommand};
use modspec::{
    commands::{
        check::{self, CheckCommand},
        config::{self, ConfigAction},
        inspect::{self, InspectCommand},
        matches::{self, MatchesCommand},
    },
    common, config_manager, logger, GlobalOpts,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modspec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Mod manifest toolkit",
    long_about = "modspec reads versioned mod manifests, validates them and evaluates dependency version ranges."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a manifest and print it as JSON
    Inspect {
        /// Manifest file, or a directory containing one
        path: PathBuf,
        /// Parse with this schema version instead of detecting it
        #[arg(long = "schema-version")]
        schema_version: Option<i64>,
    },
    /// Validate one or more manifests
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Check a version against constraints (all must hold)
    Matches {
        version: String,
        #[arg(required = true, allow_hyphen_values = true)]
        constraints: Vec<String>,
    },
    /// Configure modspec
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = config_manager::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        config_manager::Config::default()
    });
    let verbosity = cli.global.effective_verbosity(config.verbosity());
    let log_file = config.log_file();
    if let Err(e) = logger::init_with_verbosity(verbosity, log_file.as_deref()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    common::init_tracing(verbosity);

    let result: anyhow::Result<()> = match cli.command {
        Commands::Inspect {
            path,
            schema_version,
        } => inspect::handle_inspect(InspectCommand {
            path,
            schema_version,
        })
        .map_err(Into::into),
        Commands::Check { paths } => {
            check::handle_check(CheckCommand { paths }, &cli.global).map_err(Into::into)
        }
        Commands::Matches {
            version,
            constraints,
        } => match matches::handle_matches(MatchesCommand {
            version,
            constraints,
        }) {
            Ok(true) => Ok(()),
            Ok(false) => std::process::exit(1),
            Err(e) => Err(e.into()),
        },
        Commands::Config { action } => config::handle_config(action, &cli.global).map_err(Into::into),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
