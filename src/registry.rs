//! Insertion-ordered unique-key registry.
//!
//! Backs the children collection of every component. Membership, lookup, and
//! position queries are O(1); removal compacts the order so `index_of` stays
//! consistent with `to_vec`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A combination of a vector and a map: entries keep insertion order, keys are
/// unique, and `add` of an existing key is a silent no-op.
pub struct OrderedRegistry<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> OrderedRegistry<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `value` under `key`. Returns `false` without touching the
    /// registry if the key is already present; re-registration is routine,
    /// not an error.
    pub fn add(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let position = self.entries.len();
        self.entries.push((key.clone(), value));
        self.index.insert(key, position);
        true
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).copied()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn at(&self, index: usize) -> Option<&V> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Remove `key`, compacting the order of everything behind it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (key, _) in &self.entries[position..] {
            if let Some(slot) = self.index.get_mut::<K>(key) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}

impl<K, V> OrderedRegistry<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Defensive copy of the values in insertion order.
    pub fn to_vec(&self) -> Vec<V> {
        self.entries.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Derived sequence of values matching `predicate`; the registry itself
    /// is untouched.
    pub fn filter(&self, predicate: impl Fn(&V) -> bool) -> Vec<V> {
        self.entries
            .iter()
            .filter(|(_, value)| predicate(value))
            .map(|(_, value)| value.clone())
            .collect()
    }
}

impl<K, V> Default for OrderedRegistry<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
