use crate::config_manager::{Config, KEYS};
use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Print the path of the configuration file
    Path,
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            if let Err(e) = config.set(&key, value.clone()) {
                logger::error(&format!(
                    "Currently supported keys: {}",
                    KEYS.join(", ")
                ));
                return Err(e.into());
            }
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            let config_path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));
            println!("{}", config_path.display());
        }
    }
    Ok(())
}
