//! Lazily populated concurrent map
//!
//! Holds expensive shared resources (connections, rate limiters) that are
//! created on first use and then reused for the life of the process.
//! Lookups take the read lock; a miss takes the write lock and checks again
//! before creating, so each key is created at most once.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Concurrent get-or-create map with double-checked insertion
#[derive(Debug)]
pub struct LazyMap<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> LazyMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up an existing entry without creating one
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().get(key).cloned()
    }

    /// Return the entry for `key`, creating it with `create` if absent
    pub fn get_or_create<Q, F>(&self, key: &Q, create: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        match self.get_or_try_create::<Q, _, std::convert::Infallible>(key, || Ok(create())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Return the entry for `key`, creating it with `create` if absent.
    ///
    /// A failed creation inserts nothing, so the next caller tries again.
    /// `create` runs under the write lock and should not call back into
    /// this map.
    pub fn get_or_try_create<Q, F, E>(&self, key: &Q, create: F) -> Result<V, E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Result<V, E>,
    {
        // Fast path: shared read
        {
            let entries = self.entries.read();
            if let Some(value) = entries.get(key) {
                return Ok(value.clone());
            }
        }

        let mut entries = self.entries.write();

        // Another writer may have inserted while we waited for the lock
        if let Some(value) = entries.get(key) {
            return Ok(value.clone());
        }

        let value = create()?;
        entries.insert(key.to_owned(), value.clone());
        Ok(value)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for LazyMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
