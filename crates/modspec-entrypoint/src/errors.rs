use crate::container::UnitInfo;
use std::fmt;
use thiserror::Error;

/// Errors raised by entrypoint registration and invocation
#[derive(Error, Debug)]
pub enum EntrypointError {
    #[error(transparent)]
    Aggregate(#[from] AggregateInvocationFailure),

    #[error("Could not resolve entrypoint '{value}' of stage '{stage}' provided by '{unit}': {source}")]
    Resolve {
        unit: String,
        stage: String,
        value: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Every failure one unit's callbacks produced during a stage run
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: UnitInfo,
    /// In the order the callbacks ran
    pub failures: Vec<anyhow::Error>,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provided by '{}': {} failure(s)",
            self.unit.id(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n    - {:#}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnitFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &**failure as &(dyn std::error::Error + 'static))
    }
}

/// Raised once per stage run, after every callback ran, if any failed
#[derive(Debug)]
pub struct AggregateInvocationFailure {
    pub stage: String,
    /// One entry per failing unit, in the order units were invoked
    pub per_unit: Vec<UnitFailure>,
}

impl AggregateInvocationFailure {
    pub fn unit(&self, id: &str) -> Option<&UnitFailure> {
        self.per_unit.iter().find(|failure| failure.unit.id() == id)
    }

    pub fn failed_units(&self) -> impl Iterator<Item = &str> {
        self.per_unit.iter().map(|failure| failure.unit.id())
    }

    pub fn failure_count(&self) -> usize {
        self.per_unit.iter().map(|failure| failure.failures.len()).sum()
    }
}

impl fmt::Display for AggregateInvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not execute entrypoint stage '{}' due to errors",
            self.stage
        )?;
        for unit in &self.per_unit {
            write!(f, "\n  {}", unit)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateInvocationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.per_unit
            .first()
            .map(|unit| unit as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_aggregate_display_names_units() {
        let failure = AggregateInvocationFailure {
            stage: "init".to_string(),
            per_unit: vec![UnitFailure {
                unit: UnitInfo::new("unit-b", "Unit B"),
                failures: vec![anyhow::anyhow!("boom"), anyhow::anyhow!("bang")],
            }],
        };
        let text = failure.to_string();
        assert!(text.contains("stage 'init'"));
        assert!(text.contains("'unit-b'"));
        assert!(text.contains("boom") && text.contains("bang"));
        assert_eq!(failure.failure_count(), 2);
        assert!(failure.unit("unit-b").is_some());
        assert!(failure.unit("unit-a").is_none());
    }
}
