//! Validate many manifests at once
//!
//! Paths are resolved first, then every manifest found is parsed on the
//! rayon pool. Failures are reported per unit and summed up at the end.

use crate::config_manager::Config;
use crate::errors::CliError;
use crate::logger;
use crate::manifest_lookup::resolve_manifest_path;
use crate::GlobalOpts;
use colored::Colorize;
use modspec_manifest::{parse_all, Manifest};
use std::path::PathBuf;

pub struct CheckCommand {
    pub paths: Vec<PathBuf>,
}

/// Result of checking one command line path
pub struct CheckReport {
    pub path: PathBuf,
    pub result: Result<Manifest, CliError>,
}

/// Resolve and parse every path, keeping input order.
pub fn check_paths(paths: &[PathBuf], config: &Config) -> Result<Vec<CheckReport>, CliError> {
    let resolved: Vec<Result<PathBuf, CliError>> = paths
        .iter()
        .map(|path| resolve_manifest_path(path, config.manifest_file_name()))
        .collect();
    let found: Vec<PathBuf> = resolved
        .iter()
        .filter_map(|r| r.as_ref().ok().cloned())
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parse_threads())
        .build()
        .map_err(|e| CliError::ThreadPool(e.to_string()))?;
    logger::debug(&format!(
        "Parsing {} manifest(s) on {} thread(s)",
        found.len(),
        pool.current_num_threads()
    ));
    let mut parsed = pool.install(|| parse_all(&found)).into_iter();

    let reports = paths
        .iter()
        .zip(resolved)
        .map(|(path, resolved)| {
            let result = match resolved {
                Ok(_) => match parsed.next() {
                    Some(result) => result.map_err(CliError::from),
                    None => Err(CliError::ManifestNotFound(path.clone())),
                },
                Err(e) => Err(e),
            };
            CheckReport {
                path: path.clone(),
                result,
            }
        })
        .collect();
    Ok(reports)
}

pub fn handle_check(cmd: CheckCommand, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    logger::spinner_start(&format!("Checking {} manifest(s)", cmd.paths.len()));
    let reports = check_paths(&cmd.paths, &config);
    logger::spinner_stop();
    let reports = reports?;

    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(manifest) => {
                if !opts.quiet {
                    println!(
                        "{} {} {} ({})",
                        "ok".green().bold(),
                        manifest.id().cyan(),
                        manifest.version(),
                        report.path.display()
                    );
                }
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", "failed".red().bold(), report.path.display());
                logger::error(&e.to_string());
            }
        }
    }

    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            total: reports.len(),
        });
    }
    logger::success(&format!("{} manifest(s) are valid", reports.len()));
    Ok(())
}
