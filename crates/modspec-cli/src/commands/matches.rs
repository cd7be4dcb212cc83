use crate::errors::CliError;
use colored::Colorize;
use modspec_manifest::{Version, VersionRange};

pub struct MatchesCommand {
    pub version: String,
    pub constraints: Vec<String>,
}

/// Evaluate `constraints` (all must hold) against `version`.
pub fn evaluate(cmd: &MatchesCommand) -> Result<bool, CliError> {
    let version = Version::parse(&cmd.version)?;
    let range = VersionRange::parse_all(&cmd.constraints)?;
    Ok(range.matches(&version))
}

/// Print the verdict; returns whether the version matched.
pub fn handle_matches(cmd: MatchesCommand) -> Result<bool, CliError> {
    let matched = evaluate(&cmd)?;
    let verdict = if matched {
        "matches".green().bold()
    } else {
        "does not match".red().bold()
    };
    println!("{} {} {}", cmd.version, verdict, cmd.constraints.join(" "));
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use crate::commands::matches::*;

    fn cmd(version: &str, constraints: &[&str]) -> MatchesCommand {
        MatchesCommand {
            version: version.to_string(),
            constraints: constraints.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_all_constraints_must_hold() {
        assert!(evaluate(&cmd("1.5.0", &[">=1.0.0", "<2.0.0"])).is_ok_and(|m| m));
        assert!(evaluate(&cmd("2.1.0", &[">=1.0.0", "<2.0.0"])).is_ok_and(|m| !m));
    }

    #[test]
    fn test_malformed_constraint_is_an_error() {
        assert!(evaluate(&cmd("1.0.0", &[">=banana"])).is_err());
    }
}
