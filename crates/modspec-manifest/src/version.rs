//! Mod versions and dependency version ranges
//!
//! Versions are parsed leniently: anything semver accepts is semantic, short
//! forms such as `1.2` are padded to three components, and everything else is
//! kept as an opaque string version.
//!
//! When a semantic constraint meets a non-semantic version (or the reverse)
//! comparison falls back to the canonical string forms.

use crate::errors::ManifestError;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A declared mod version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: Arc<str>,
    semantic: Option<semver::Version>,
}

impl Version {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ManifestError::InvalidVersion(text.to_string()));
        }

        Ok(Version {
            raw: Arc::from(trimmed),
            semantic: parse_semantic(trimmed),
        })
    }

    /// The version exactly as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn semantic(&self) -> Option<&semver::Version> {
        self.semantic.as_ref()
    }

    pub fn is_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    /// Structured comparison when both sides are semantic, string comparison otherwise
    pub fn compare(&self, other: &Version) -> Ordering {
        match (&self.semantic, &other.semantic) {
            (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            _ => self.raw.cmp(&other.raw),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

fn parse_semantic(text: &str) -> Option<semver::Version> {
    if let Ok(version) = semver::Version::parse(text) {
        return Some(version);
    }

    // `1` and `1.2` are common in manifests; pad the numeric core
    let split = text.find(|c| c == '-' || c == '+').unwrap_or(text.len());
    let (core, suffix) = text.split_at(split);
    let parts: SmallVec<[&str; 3]> = core.split('.').collect();
    if parts.len() >= 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut padded = core.to_string();
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);
    semver::Version::parse(&padded).ok()
}

/// A single clause of a version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `*`
    Any,
    /// `1.2.3` or `=1.2.3`
    Exact(Version),
    Ge(Version),
    Gt(Version),
    Le(Version),
    Lt(Version),
    /// `^1.2.3`: compatible with, same left-most non-zero component
    Caret(Version),
    /// `~1.2.3`: same major and minor
    Tilde(Version),
    /// `1.x` or `1.2.x`
    Prefix(SmallVec<[u64; 2]>),
}

impl Constraint {
    pub fn parse(clause: &str) -> Result<Self, ManifestError> {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err(ManifestError::malformed_constraint(
                clause,
                "empty constraint",
            ));
        }
        if clause == "*" {
            return Ok(Constraint::Any);
        }

        if let Some(rest) = clause.strip_prefix(">=") {
            return semantic_operand(clause, rest).map(Constraint::Ge);
        }
        if let Some(rest) = clause.strip_prefix("<=") {
            return semantic_operand(clause, rest).map(Constraint::Le);
        }
        if let Some(rest) = clause.strip_prefix('>') {
            return semantic_operand(clause, rest).map(Constraint::Gt);
        }
        if let Some(rest) = clause.strip_prefix('<') {
            return semantic_operand(clause, rest).map(Constraint::Lt);
        }
        if let Some(rest) = clause.strip_prefix('^') {
            return semantic_operand(clause, rest).map(Constraint::Caret);
        }
        if let Some(rest) = clause.strip_prefix('~') {
            return semantic_operand(clause, rest).map(Constraint::Tilde);
        }
        if let Some(rest) = clause.strip_prefix('=') {
            return Version::parse(rest)
                .map(Constraint::Exact)
                .map_err(|_| ManifestError::malformed_constraint(clause, "missing version"));
        }
        if let Some(prefix) = parse_x_range(clause)? {
            return Ok(Constraint::Prefix(prefix));
        }

        Version::parse(clause)
            .map(Constraint::Exact)
            .map_err(|_| ManifestError::malformed_constraint(clause, "missing version"))
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Exact(expected) => version.compare(expected) == Ordering::Equal,
            Constraint::Ge(bound) => version.compare(bound) != Ordering::Less,
            Constraint::Gt(bound) => version.compare(bound) == Ordering::Greater,
            Constraint::Le(bound) => version.compare(bound) != Ordering::Greater,
            Constraint::Lt(bound) => version.compare(bound) == Ordering::Less,
            Constraint::Caret(base) => within(version, base, caret_upper),
            Constraint::Tilde(base) => within(version, base, tilde_upper),
            Constraint::Prefix(parts) => match version.semantic() {
                Some(semantic) => {
                    semantic.major == parts[0] && parts.get(1).map_or(true, |m| semantic.minor == *m)
                }
                None => {
                    let prefix = parts
                        .iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join(".");
                    version.as_str() == prefix || version.as_str().starts_with(&format!("{prefix}."))
                }
            },
        }
    }
}

fn semantic_operand(clause: &str, rest: &str) -> Result<Version, ManifestError> {
    let version = Version::parse(rest)
        .map_err(|_| ManifestError::malformed_constraint(clause, "missing version"))?;
    if !version.is_semantic() {
        return Err(ManifestError::malformed_constraint(
            clause,
            format!("'{}' is not a semantic version", version),
        ));
    }
    Ok(version)
}

/// `1.x`, `1.2.x`, `1.*`, `1.2.X` -> leading components
fn parse_x_range(clause: &str) -> Result<Option<SmallVec<[u64; 2]>>, ManifestError> {
    let Some(head) = clause
        .strip_suffix(".x")
        .or_else(|| clause.strip_suffix(".X"))
        .or_else(|| clause.strip_suffix(".*"))
    else {
        return Ok(None);
    };

    let mut parts = SmallVec::new();
    for part in head.split('.') {
        let value = part.parse::<u64>().map_err(|_| {
            ManifestError::malformed_constraint(clause, format!("'{}' is not a number", part))
        })?;
        parts.push(value);
    }
    if parts.len() > 2 {
        return Err(ManifestError::malformed_constraint(
            clause,
            "wildcard must follow the major or minor component",
        ));
    }
    Ok(Some(parts))
}

/// Upper bounds are exclusive; `None` when the bumped component would overflow.
fn within(
    version: &Version,
    base: &Version,
    upper: fn(&semver::Version) -> Option<semver::Version>,
) -> bool {
    match (version.semantic(), base.semantic()) {
        (Some(v), Some(b)) => v >= b && upper(b).map_or(true, |limit| *v < limit),
        _ => version.as_str() == base.as_str(),
    }
}

fn caret_upper(base: &semver::Version) -> Option<semver::Version> {
    if base.major > 0 {
        base.major.checked_add(1).map(|major| semver::Version::new(major, 0, 0))
    } else if base.minor > 0 {
        base.minor.checked_add(1).map(|minor| semver::Version::new(0, minor, 0))
    } else {
        base.patch.checked_add(1).map(|patch| semver::Version::new(0, 0, patch))
    }
}

fn tilde_upper(base: &semver::Version) -> Option<semver::Version> {
    base.minor
        .checked_add(1)
        .map(|minor| semver::Version::new(base.major, minor, 0))
}

/// Conjunction of constraints parsed from one or more strings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRange {
    sources: Vec<Arc<str>>,
    clauses: Vec<Constraint>,
}

impl VersionRange {
    /// A range that matches every version
    pub fn any() -> Self {
        VersionRange::default()
    }

    pub fn parse(constraint: &str) -> Result<Self, ManifestError> {
        VersionRange::parse_all([constraint])
    }

    /// Parse several constraint strings; every clause of every string must hold.
    ///
    /// A single string may itself hold whitespace separated clauses
    /// (`">=1.0.0 <2.0.0"`).
    pub fn parse_all<I, S>(constraints: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut range = VersionRange::default();
        for constraint in constraints {
            let constraint = constraint.as_ref();
            let mut clauses = constraint.split_whitespace().peekable();
            if clauses.peek().is_none() {
                return Err(ManifestError::malformed_constraint(
                    constraint,
                    "empty constraint",
                ));
            }
            for clause in clauses {
                range.clauses.push(Constraint::parse(clause)?);
            }
            range.sources.push(Arc::from(constraint));
        }
        Ok(range)
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// The constraint strings as written in the manifest
    pub fn constraints(&self) -> &[Arc<str>] {
        &self.sources
    }

    pub fn clauses(&self) -> &[Constraint] {
        &self.clauses
    }

    pub fn is_any(&self) -> bool {
        self.clauses.iter().all(|clause| *clause == Constraint::Any)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sources.is_empty() {
            return f.write_str("*");
        }
        f.write_str(&self.sources.join(" "))
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sources.iter().map(AsRef::<str>::as_ref))
    }
}
