//! Parse-scoped store of in-flight and settled resolutions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tokio::sync::OnceCell;

/// Keyed cells that each settle at most once.
///
/// A caller that finds a pending cell awaits the first caller's
/// initialization instead of starting its own. Single-threaded: the map is
/// only touched between suspension points.
pub struct EntityCache<K, V> {
    slots: RefCell<HashMap<K, Rc<OnceCell<V>>>>,
}

impl<K: Eq + Hash, V> EntityCache<K, V> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Cell stored under `key`, if any.
    pub fn get(&self, key: &K) -> Option<Rc<OnceCell<V>>> {
        self.slots.borrow().get(key).cloned()
    }

    /// Store an already settled value, replacing whatever was there.
    pub fn put(&self, key: K, value: V) {
        self.slots
            .borrow_mut()
            .insert(key, Rc::new(OnceCell::new_with(Some(value))));
    }

    /// Cell stored under `key`, inserting an empty one on first use.
    pub fn slot(&self, key: K) -> Rc<OnceCell<V>> {
        self.slots
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| Rc::new(OnceCell::new()))
            .clone()
    }

    /// Forget everything. Callers still holding a cell keep it alive.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl<K: Eq + Hash, V> Default for EntityCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
