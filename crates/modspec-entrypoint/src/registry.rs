//! Stage registry
//!
//! The host fills an [`EntrypointRegistry`] while units are loaded, freezes
//! it, then shares it read-only (usually behind an `Arc`) for invocation.

use crate::container::{EntrypointContainer, StoredContainer, UnitInfo};
use crate::errors::EntrypointError;
use ahash::AHashMap;
use modspec_logger as logger;
use modspec_manifest::{EntrypointMetadata, Manifest};
use std::sync::Arc;

/// A registered container as seen by a typed lookup
#[derive(Debug)]
pub enum ContainerLookup<'a, T: ?Sized> {
    Matched(&'a EntrypointContainer<T>),
    /// The unit registered callbacks of another type under this stage
    Mismatched {
        provider: &'a UnitInfo,
        stored: &'static str,
    },
}

impl<T: ?Sized> ContainerLookup<'_, T> {
    pub fn provider(&self) -> &UnitInfo {
        match self {
            ContainerLookup::Matched(container) => container.provider(),
            ContainerLookup::Mismatched { provider, .. } => provider,
        }
    }
}

/// Host side view of registered entrypoints
pub trait EntrypointProvider {
    fn has_entrypoints(&self, stage: &str) -> bool;

    /// Containers registered under `stage`, in unit registration order
    fn containers<T: ?Sized + Send + Sync + 'static>(
        &self,
        stage: &str,
    ) -> Vec<ContainerLookup<'_, T>>;
}

/// Default registry: stage name -> containers
#[derive(Default)]
pub struct EntrypointRegistry {
    stages: AHashMap<Arc<str>, Vec<Box<dyn StoredContainer>>>,
    frozen: bool,
}

impl EntrypointRegistry {
    pub fn new() -> Self {
        EntrypointRegistry::default()
    }

    /// Register `entry` for `stage` on behalf of `provider`.
    ///
    /// Ignored once the registry is frozen.
    pub fn register<T>(&mut self, stage: &str, provider: &UnitInfo, entry: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if self.frozen {
            return;
        }

        let containers = self.stages.entry(Arc::from(stage)).or_default();
        let existing = containers.iter_mut().find_map(|stored| {
            if stored.provider() == provider {
                stored
                    .as_any_mut()
                    .downcast_mut::<EntrypointContainer<T>>()
            } else {
                None
            }
        });

        match existing {
            Some(container) => container.add(entry),
            None => {
                let mut container = EntrypointContainer::new(provider.clone());
                container.add(entry);
                containers.push(Box::new(container));
            }
        }
    }

    /// Bind every entrypoint `manifest` declares for `stage` through `resolve`.
    ///
    /// Returns the number of registered entries. The first entry that cannot
    /// be resolved stops registration for this unit.
    pub fn register_declared<T, F>(
        &mut self,
        manifest: &Manifest,
        stage: &str,
        mut resolve: F,
    ) -> Result<usize, EntrypointError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnMut(&EntrypointMetadata) -> anyhow::Result<Arc<T>>,
    {
        let provider = UnitInfo::from(manifest);
        let declared = manifest.entrypoints(stage);
        let mut resolved = Vec::with_capacity(declared.len());
        for metadata in declared {
            let entry = resolve(metadata).map_err(|source| EntrypointError::Resolve {
                unit: provider.id().to_string(),
                stage: stage.to_string(),
                value: metadata.value.to_string(),
                source,
            })?;
            resolved.push(entry);
        }

        let count = resolved.len();
        for entry in resolved {
            self.register(stage, &provider, entry);
        }
        logger::debug(&format!(
            "Registered {} '{}' entrypoint(s) for {}",
            count, stage, provider
        ));
        Ok(count)
    }

    /// Freeze every container and close registration.
    pub fn freeze(&mut self) {
        self.frozen = true;
        for container in self.stages.values_mut().flatten() {
            container.freeze();
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(AsRef::as_ref)
    }

    /// Total number of entries registered for `stage`
    pub fn entry_count(&self, stage: &str) -> usize {
        self.stages
            .get(stage)
            .map_or(0, |containers| containers.iter().map(|c| c.len()).sum())
    }
}

impl EntrypointProvider for EntrypointRegistry {
    fn has_entrypoints(&self, stage: &str) -> bool {
        self.stages
            .get(stage)
            .is_some_and(|containers| !containers.is_empty())
    }

    fn containers<T: ?Sized + Send + Sync + 'static>(
        &self,
        stage: &str,
    ) -> Vec<ContainerLookup<'_, T>> {
        let Some(containers) = self.stages.get(stage) else {
            return Vec::new();
        };

        containers
            .iter()
            .map(|stored| {
                match stored.as_any().downcast_ref::<EntrypointContainer<T>>() {
                    Some(container) => ContainerLookup::Matched(container),
                    None => ContainerLookup::Mismatched {
                        provider: stored.provider(),
                        stored: stored.entry_type(),
                    },
                }
            })
            .collect()
    }
}

impl<P: EntrypointProvider> EntrypointProvider for Arc<P> {
    fn has_entrypoints(&self, stage: &str) -> bool {
        (**self).has_entrypoints(stage)
    }

    fn containers<T: ?Sized + Send + Sync + 'static>(
        &self,
        stage: &str,
    ) -> Vec<ContainerLookup<'_, T>> {
        (**self).containers(stage)
    }
}
