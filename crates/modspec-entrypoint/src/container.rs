//! Per-unit entrypoint containers
//!
//! A container holds the callbacks one unit registered for one stage. It is
//! append-only until frozen; after that `add` does nothing and the container
//! can be shared freely between readers.

use modspec_manifest::Manifest;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identity of the unit that contributed a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitInfo {
    id: Arc<str>,
    name: Arc<str>,
}

impl UnitInfo {
    pub fn new(id: &str, name: &str) -> Self {
        UnitInfo {
            id: Arc::from(id),
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, used in messages
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&Manifest> for UnitInfo {
    fn from(manifest: &Manifest) -> Self {
        UnitInfo::new(manifest.id(), manifest.name())
    }
}

impl fmt::Display for UnitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.id {
            f.write_str(&self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// Callbacks of type `T` registered by one unit
pub struct EntrypointContainer<T: ?Sized> {
    provider: UnitInfo,
    entries: Vec<Arc<T>>,
    frozen: bool,
}

impl<T: ?Sized> EntrypointContainer<T> {
    pub fn new(provider: UnitInfo) -> Self {
        EntrypointContainer {
            provider,
            entries: Vec::new(),
            frozen: false,
        }
    }

    /// Append `entry`; once the container is frozen this is a no-op.
    pub fn add(&mut self, entry: Arc<T>) {
        if self.frozen {
            return;
        }
        self.entries.push(entry);
    }

    /// Close registration. There is no way back.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn provider(&self) -> &UnitInfo {
        &self.provider
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[Arc<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for EntrypointContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrypointContainer")
            .field("provider", &self.provider)
            .field("entries", &self.entries.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}

/// Type-erased container as kept by the registry
pub(crate) trait StoredContainer: Send + Sync {
    fn provider(&self) -> &UnitInfo;
    fn entry_type(&self) -> &'static str;
    fn len(&self) -> usize;
    fn freeze(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ?Sized + Send + Sync + 'static> StoredContainer for EntrypointContainer<T> {
    fn provider(&self) -> &UnitInfo {
        &self.provider
    }

    fn entry_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn freeze(&mut self) {
        EntrypointContainer::freeze(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::container::*;

    #[test]
    fn test_add_after_freeze_is_a_no_op() {
        let mut container: EntrypointContainer<str> =
            EntrypointContainer::new(UnitInfo::new("unit-a", "Unit A"));
        container.add(Arc::from("first"));
        container.freeze();
        container.add(Arc::from("ignored"));

        assert!(container.is_frozen());
        assert_eq!(container.len(), 1);
        assert_eq!(&*container.entries()[0], "first");
    }

    #[test]
    fn test_entries_keep_registration_order() {
        let mut container = EntrypointContainer::new(UnitInfo::new("unit-a", "unit-a"));
        for n in 0..4 {
            container.add(Arc::new(n));
        }
        let order: Vec<i32> = container.entries().iter().map(|e| **e).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(UnitInfo::new("a", "a").to_string(), "a");
        assert_eq!(UnitInfo::new("a", "Alpha").to_string(), "Alpha (a)");
    }
}
