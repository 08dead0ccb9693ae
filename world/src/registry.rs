//! Identifier-keyed storage for live entities.

use std::collections::BTreeMap;

use skirmish_core::{CharacterId, EnemyId};

/// Identifier type that a [`Registry`] can allocate.
pub(crate) trait RegistryKey: Copy + Ord {
    fn from_raw(value: u32) -> Self;
}

impl RegistryKey for CharacterId {
    fn from_raw(value: u32) -> Self {
        CharacterId::new(value)
    }
}

impl RegistryKey for EnemyId {
    fn from_raw(value: u32) -> Self {
        EnemyId::new(value)
    }
}

/// Registry that stores entities ordered by identifier and allocates new ones.
///
/// Identifiers are never reused within a session.
#[derive(Debug)]
pub(crate) struct Registry<K, V> {
    entries: BTreeMap<K, V>,
    next_id: Option<u32>,
}

impl<K: RegistryKey, V> Registry<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: Some(0),
        }
    }

    /// Allocates a fresh identifier; `None` once the identifier space is spent.
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(K) -> V) -> Option<K> {
        let raw = self.next_id?;
        let id = K::from_raw(raw);
        self.next_id = raw.checked_add(1);
        let _ = self.entries.insert(id, build(id));
        Some(id)
    }

    pub(crate) fn remove(&mut self, id: K) -> Option<V> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_increase_and_are_not_reused() {
        let mut registry: Registry<EnemyId, &str> = Registry::new();
        let first = registry.insert_with(|_| "first").expect("id");
        let second = registry.insert_with(|_| "second").expect("id");
        assert_eq!(first, EnemyId::new(0));
        assert_eq!(second, EnemyId::new(1));

        assert_eq!(registry.remove(first), Some("first"));
        let third = registry.insert_with(|_| "third").expect("id");
        assert_eq!(third, EnemyId::new(2));
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn values_iterate_in_identifier_order() {
        let mut registry: Registry<CharacterId, u32> = Registry::new();
        for _ in 0..4 {
            let _ = registry.insert_with(|id| id.get() * 10);
        }
        let values: Vec<u32> = registry.values().copied().collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn exhausted_identifiers_refuse_new_entries() {
        let mut registry: Registry<EnemyId, &str> = Registry::new();
        registry.next_id = Some(u32::MAX);
        let last = registry.insert_with(|_| "last").expect("last id");
        assert_eq!(last, EnemyId::new(u32::MAX));

        assert_eq!(registry.insert_with(|_| "overflow"), None);
        assert_eq!(registry.get(last), Some(&"last"));
    }
}
