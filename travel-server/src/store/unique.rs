//! Uniqueness-keyed storage with merge-on-insert.
//!
//! Both travel legs and users live in a [`UniqueStore`]: at most one value
//! per key, where re-inserting under an occupied key folds the new fields
//! into the value already stored instead of replacing it. Callers holding
//! the key therefore keep addressing the same canonical entry across
//! updates.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A value addressable by a unique key it carries itself.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug;

    /// Returns the value's current key.
    fn key(&self) -> Self::Key;

    /// Rebind the value to a new key. Only the store calls this, as part
    /// of [`UniqueStore::rename`].
    fn set_key(&mut self, key: Self::Key);
}

/// A value that can fold another instance's fields into itself.
pub trait Merge {
    /// Overwrite this value's fields with `other`'s, preserving whatever
    /// state the implementation considers identity-bound.
    fn merge_from(&mut self, other: Self);
}

/// A keyed collection enforcing one live value per key.
///
/// All operations are total: looking up or removing an absent key is not an
/// error, and renaming onto an occupied key is a silent no-op (callers that
/// need to distinguish can check [`UniqueStore::contains`] first). Iteration
/// order is unspecified.
#[derive(Debug, Clone)]
pub struct UniqueStore<V: Keyed> {
    entries: HashMap<V::Key, V>,
}

impl<V: Keyed> Default for UniqueStore<V> {
    fn default() -> Self {
        UniqueStore {
            entries: HashMap::new(),
        }
    }
}

impl<V: Keyed + Merge> UniqueStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether a value is stored under the key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Look up the value stored under the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Look up the value stored under the key, mutably.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Insert a value, or merge it into the existing value under the same
    /// key. Returns the canonical stored value.
    pub fn put(&mut self, value: V) -> &mut V {
        match self.entries.entry(value.key()) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                let stored = entry.into_mut();
                stored.merge_from(value);
                stored
            }
            std::collections::hash_map::Entry::Vacant(entry) => entry.insert(value),
        }
    }

    /// Insert or merge each value in turn.
    pub fn put_all(&mut self, values: impl IntoIterator<Item = V>) {
        for value in values {
            self.put(value);
        }
    }

    /// Remove and return the value under the key, if any.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key)
    }

    /// Move the value under `old` to `new`, rewriting its own key field.
    ///
    /// Returns false without changing anything if `new` is already
    /// occupied or nothing is stored under `old`. The silent-on-collision
    /// behavior keeps duplicate registrations idempotent.
    pub fn rename<Q>(&mut self, old: &Q, new: V::Key) -> bool
    where
        V::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.entries.contains_key::<V::Key>(&new) {
            return false;
        }
        let Some(mut value) = self.entries.remove(old) else {
            return false;
        };
        value.set_key(new.clone());
        self.entries.insert(new, value);
        true
    }

    /// Iterate over all stored values. Order is unspecified.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Iterate over all stored values, mutably. Order is unspecified.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal keyed value for exercising the store.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: String,
        payload: u32,
        generation: u32,
    }

    impl Entry {
        fn new(id: &str, payload: u32) -> Self {
            Entry {
                id: id.to_string(),
                payload,
                generation: 0,
            }
        }
    }

    impl Keyed for Entry {
        type Key = String;

        fn key(&self) -> String {
            self.id.clone()
        }

        fn set_key(&mut self, key: String) {
            self.id = key;
        }
    }

    impl Merge for Entry {
        fn merge_from(&mut self, other: Self) {
            // generation plays the role of identity-bound state: it
            // survives merges the way booked references must
            self.payload = other.payload;
            self.generation += 1;
        }
    }

    #[test]
    fn put_inserts_new_value() {
        let mut store = UniqueStore::new();
        store.put(Entry::new("a", 1));

        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
        assert_eq!(store.get("a").unwrap().payload, 1);
    }

    #[test]
    fn put_merges_into_existing_value() {
        let mut store = UniqueStore::new();
        store.put(Entry::new("a", 1));
        let stored = store.put(Entry::new("a", 7));

        assert_eq!(stored.payload, 7);
        // the original instance was updated, not replaced
        assert_eq!(stored.generation, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_absent_key_is_none() {
        let store: UniqueStore<Entry> = UniqueStore::new();
        assert!(store.get("missing").is_none());
        assert!(!store.contains("missing"));
    }

    #[test]
    fn remove_is_silent_on_absent_key() {
        let mut store = UniqueStore::new();
        store.put(Entry::new("a", 1));

        assert!(store.remove("missing").is_none());
        assert!(store.remove("a").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn rename_moves_the_value() {
        let mut store = UniqueStore::new();
        store.put(Entry::new("a", 1));

        assert!(store.rename("a", "b".to_string()));
        assert!(!store.contains("a"));
        let moved = store.get("b").unwrap();
        assert_eq!(moved.id, "b");
        assert_eq!(moved.payload, 1);
    }

    #[test]
    fn rename_to_occupied_key_is_a_no_op() {
        let mut store = UniqueStore::new();
        store.put(Entry::new("a", 1));
        store.put(Entry::new("b", 2));

        assert!(!store.rename("a", "b".to_string()));
        // both values are untouched
        assert_eq!(store.get("a").unwrap().payload, 1);
        assert_eq!(store.get("b").unwrap().payload, 2);
    }

    #[test]
    fn rename_of_absent_key_is_a_no_op() {
        let mut store: UniqueStore<Entry> = UniqueStore::new();
        assert!(!store.rename("missing", "b".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn put_all_and_clear() {
        let mut store = UniqueStore::new();
        store.put_all(vec![
            Entry::new("a", 1),
            Entry::new("b", 2),
            Entry::new("a", 3), // merges into the first
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().payload, 3);

        store.clear();
        assert!(store.is_empty());
    }
}
