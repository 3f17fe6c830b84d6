use std::{
    any::Any,
    collections::HashMap,
    hash::Hash,
    rc::{Rc, Weak},
};

/// Entries below this count are never swept.
const MIN_SWEEP: usize = 32;

/// Hash map of weak values that sweeps its dead entries as it grows.
///
/// A sweep runs once the map has doubled since the previous one, so the
/// number of entries stays within twice the live set.
pub(crate) struct WeakCache<K> {
    entries: HashMap<K, Weak<dyn Any>>,
    sweep_at: usize,
}

impl<K: Eq + Hash> WeakCache<K> {
    pub(crate) fn new() -> WeakCache<K> {
        WeakCache {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP,
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<Rc<dyn Any>> {
        self.entries.get(key)?.upgrade()
    }

    pub(crate) fn insert(&mut self, key: K, value: &Rc<dyn Any>) {
        self.entries.insert(key, Rc::downgrade(value));

        if self.entries.len() >= self.sweep_at {
            self.prune();
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn prune(&mut self) {
        self.entries.retain(|_, value| value.strong_count() > 0);
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.sweep_at = MIN_SWEEP;
    }
}
