//! Stage invocation
//!
//! Every callback of every container runs, in container order and then in
//! registration order. A failing callback (an `Err` or a panic) is recorded
//! against its unit and invocation moves on. Failures are reported together
//! once the whole stage has run.

use crate::container::UnitInfo;
use crate::errors::{AggregateInvocationFailure, UnitFailure};
use crate::registry::{ContainerLookup, EntrypointProvider};
use ahash::AHashMap;
use modspec_logger as logger;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How a stage run ended when nothing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// No unit registered anything for the stage
    NoSubscribers,
    /// Every callback ran successfully
    Completed { invoked: usize },
}

/// Run `callback` on every entrypoint of type `T` registered for `stage`.
pub fn invoke<T, P, F>(
    provider: &P,
    stage: &str,
    mut callback: F,
) -> Result<InvocationOutcome, AggregateInvocationFailure>
where
    T: ?Sized + Send + Sync + 'static,
    P: EntrypointProvider,
    F: FnMut(&T) -> anyhow::Result<()>,
{
    if !provider.has_entrypoints(stage) {
        logger::debug(&format!("No subscribers for entrypoint '{}'", stage));
        return Ok(InvocationOutcome::NoSubscribers);
    }

    logger::debug(&format!("Iterating over entrypoint '{}'", stage));

    let mut failures = FailureLog::default();
    let mut invoked = 0;
    for lookup in provider.containers::<T>(stage) {
        let container = match lookup {
            ContainerLookup::Matched(container) => container,
            ContainerLookup::Mismatched { provider, stored } => {
                failures.record(
                    stage,
                    provider,
                    anyhow::anyhow!(
                        "entrypoints are of type '{}', expected '{}'",
                        stored,
                        std::any::type_name::<T>()
                    ),
                );
                continue;
            }
        };

        for entry in container.entries() {
            invoked += 1;
            let result = catch_unwind(AssertUnwindSafe(|| callback(&**entry)))
                .unwrap_or_else(|payload| Err(panic_error(&*payload)));
            if let Err(error) = result {
                failures.record(stage, container.provider(), error);
            }
        }
    }

    match failures.into_aggregate(stage) {
        Some(aggregate) => Err(aggregate),
        None => Ok(InvocationOutcome::Completed { invoked }),
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    anyhow::anyhow!("entrypoint panicked: {}", message)
}

/// Failures grouped by unit, units kept in first-failure order
#[derive(Default)]
struct FailureLog {
    index: AHashMap<UnitInfo, usize>,
    per_unit: Vec<UnitFailure>,
}

impl FailureLog {
    fn record(&mut self, stage: &str, unit: &UnitInfo, error: anyhow::Error) {
        logger::error(&format!(
            "Entrypoint stage '{}' failed for {}: {:#}",
            stage, unit, error
        ));

        let slot = *self.index.entry(unit.clone()).or_insert_with(|| {
            self.per_unit.push(UnitFailure {
                unit: unit.clone(),
                failures: Vec::new(),
            });
            self.per_unit.len() - 1
        });
        self.per_unit[slot].failures.push(error);
    }

    fn into_aggregate(self, stage: &str) -> Option<AggregateInvocationFailure> {
        if self.per_unit.is_empty() {
            return None;
        }
        Some(AggregateInvocationFailure {
            stage: stage.to_string(),
            per_unit: self.per_unit,
        })
    }
}
