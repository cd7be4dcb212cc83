//! Common types and utilities shared across modules

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Verbosity from the flags, falling back to the configured default
    pub fn effective_verbosity(&self, configured: u8) -> u8 {
        if self.quiet || self.verbose > 0 {
            self.verbosity_level()
        } else {
            configured
        }
    }
}

/// `tracing` filter directive for a verbosity level
pub fn tracing_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "modspec_manifest=warn",
        1 => "modspec_manifest=debug",
        _ => "modspec_manifest=trace",
    }
}

/// Install the `tracing` subscriber used by the parsing library.
///
/// `RUST_LOG` wins over the verbosity flags when set.
pub fn init_tracing(verbosity: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_directive(verbosity).into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
