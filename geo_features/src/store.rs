//! Ordered key/value store with strict add/remove semantics.
//!
//! [`NamedValueStore`] is the container behind attribute bags. It keeps
//! insertion order, rejects duplicate adds, and can be created read-only, in
//! which case every mutator fails before touching any entry. Key equality is
//! natural `Eq` unless a [`KeyComparer`] strategy is supplied at construction.

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FeatureError, Result};

/// Key-equality strategy for a store.
///
/// Two keys are equal when they map to the same canonical key.
pub trait KeyComparer<K>: fmt::Debug + Send + Sync {
    fn canonical(&self, key: &K) -> K;

    /// Identifies the rule. Stores using different rules never compare equal.
    fn rule(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Case-insensitive matching of string keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

impl KeyComparer<String> for IgnoreCase {
    fn canonical(&self, key: &String) -> String {
        key.to_lowercase()
    }
}

type Entry<K, V> = (K, V);

fn entry_key<K, V>(entry: &Entry<K, V>) -> &K {
    &entry.0
}

fn entry_value<K, V>(entry: &Entry<K, V>) -> &V {
    &entry.1
}

fn entry_pair<K, V>(entry: &Entry<K, V>) -> (&K, &V) {
    (&entry.0, &entry.1)
}

/// Ordered key/value container.
///
/// Entries are indexed by their canonical key and keep the spelling of the
/// key used when they were first inserted.
#[derive(Clone)]
pub struct NamedValueStore<K, V> {
    read_only: bool,
    comparer: Option<Arc<dyn KeyComparer<K>>>,
    entries: IndexMap<K, Entry<K, V>>,
}

impl<K, V> NamedValueStore<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty, writable store using natural key equality.
    pub fn new() -> Self {
        Self {
            read_only: false,
            comparer: None,
            entries: IndexMap::new(),
        }
    }

    /// Creates an empty, writable store using `comparer` for key equality.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: KeyComparer<K> + 'static,
    {
        Self {
            read_only: false,
            comparer: Some(Arc::new(comparer)),
            entries: IndexMap::new(),
        }
    }

    /// Creates a writable store seeded with `pairs`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_parts(pairs, false, None)
    }

    /// Creates a read-only store holding exactly `pairs`.
    pub fn read_only<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_parts(pairs, true, None)
    }

    /// Creates a store from a seed sequence, a read-only flag and an optional
    /// key strategy. Duplicate keys in the seed fail with `DuplicateKey`.
    pub fn from_parts<I>(
        pairs: I,
        read_only: bool,
        comparer: Option<Arc<dyn KeyComparer<K>>>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut store = Self {
            read_only: false,
            comparer,
            entries: IndexMap::new(),
        };
        for (key, value) in pairs {
            store.add(key, value)?;
        }
        store.read_only = read_only;
        Ok(store)
    }

    fn canonical<'k>(&self, key: &'k K) -> Cow<'k, K> {
        match &self.comparer {
            Some(comparer) => Cow::Owned(comparer.canonical(key)),
            None => Cow::Borrowed(key),
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(FeatureError::ReadOnly);
        }
        Ok(())
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The key strategy, `None` for natural equality.
    pub fn comparer(&self) -> Option<&Arc<dyn KeyComparer<K>>> {
        self.comparer.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(&*self.canonical(key))
    }

    /// Returns the value for `key`, failing with `KeyNotFound` when absent.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.try_get(key).ok_or(FeatureError::KeyNotFound)
    }

    /// Returns the value for `key`, `None` when absent.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.entries
            .get(&*self.canonical(key))
            .map(entry_value)
    }

    /// Inserts or overwrites the value for `key`.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.ensure_writable()?;
        let canonical = self.canonical(&key).into_owned();
        match self.entries.get_mut(&canonical) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(canonical, (key, value));
            }
        }
        Ok(())
    }

    /// Inserts a new entry, failing with `DuplicateKey` if `key` is present.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        self.ensure_writable()?;
        let canonical = self.canonical(&key).into_owned();
        if self.entries.contains_key(&canonical) {
            return Err(FeatureError::DuplicateKey);
        }
        self.entries.insert(canonical, (key, value));
        Ok(())
    }

    /// Removes `key`, returning whether it was present. Later entries keep
    /// their relative order.
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        self.ensure_writable()?;
        let canonical = self.canonical(key).into_owned();
        Ok(self.entries.shift_remove(&canonical).is_some())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_writable()?;
        self.entries.clear();
        Ok(())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.values().map(entry_pair)
    }

    /// Live view of the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { store: self }
    }

    /// Live view of the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { store: self }
    }

    /// Borrows the store through a view that has no mutators.
    pub fn as_read_only(&self) -> ReadOnlyStore<'_, K, V> {
        ReadOnlyStore { store: self }
    }
}

impl<K, V> NamedValueStore<K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    /// Returns true when `key` is present and its value equals `value`.
    pub fn contains_entry(&self, key: &K, value: &V) -> bool {
        self.try_get(key).is_some_and(|v| v == value)
    }

    /// Removes `key` only when its value equals `value`.
    pub fn remove_entry(&mut self, key: &K, value: &V) -> Result<bool> {
        self.ensure_writable()?;
        if !self.contains_entry(key, value) {
            return Ok(false);
        }
        self.remove(key)
    }

    pub fn contains_value(&self, value: &V) -> bool {
        self.entries.values().any(|(_, v)| v == value)
    }
}

impl<K, V> Default for NamedValueStore<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for NamedValueStore<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedValueStore")
            .field("read_only", &self.read_only)
            .field("comparer", &self.comparer)
            .field("entries", &self.entries.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Stores are equal when they use the same key rule and hold the same keys
/// mapped to equal values, regardless of order.
impl<K, V> PartialEq for NamedValueStore<K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        let rule = |store: &Self| store.comparer.as_ref().map(|c| c.rule());
        rule(self) == rule(other)
            && self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(canonical, (_, v))| {
                    other.entries.get(canonical).is_some_and(|(_, o)| o == v)
                })
    }
}

impl<'a, K, V> IntoIterator for &'a NamedValueStore<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter =
        std::iter::Map<indexmap::map::Values<'a, K, Entry<K, V>>, fn(&'a Entry<K, V>) -> (&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values().map(entry_pair::<K, V> as fn(&'a Entry<K, V>) -> (&'a K, &'a V))
    }
}

/// Read-only projection over the keys of a store.
#[derive(Debug)]
pub struct Keys<'a, K, V> {
    store: &'a NamedValueStore<K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Keys<'_, K, V> {}

impl<'a, K, V> Keys<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Membership test honouring the store's key strategy.
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a K> + 'a {
        self.store.entries.values().map(entry_key)
    }
}

impl<'a, K, V> IntoIterator for Keys<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a K;
    type IntoIter = std::iter::Map<indexmap::map::Values<'a, K, Entry<K, V>>, fn(&'a Entry<K, V>) -> &'a K>;

    fn into_iter(self) -> Self::IntoIter {
        self.store
            .entries
            .values()
            .map(entry_key::<K, V> as fn(&'a Entry<K, V>) -> &'a K)
    }
}

/// Read-only projection over the values of a store.
#[derive(Debug)]
pub struct Values<'a, K, V> {
    store: &'a NamedValueStore<K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Values<'_, K, V> {}

impl<'a, K, V> Values<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a V> + 'a {
        self.store.entries.values().map(entry_value)
    }
}

impl<K, V> Values<'_, K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    pub fn contains(&self, value: &V) -> bool {
        self.store.contains_value(value)
    }
}

impl<'a, K, V> IntoIterator for Values<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a V;
    type IntoIter = std::iter::Map<indexmap::map::Values<'a, K, Entry<K, V>>, fn(&'a Entry<K, V>) -> &'a V>;

    fn into_iter(self) -> Self::IntoIter {
        self.store
            .entries
            .values()
            .map(entry_value::<K, V> as fn(&'a Entry<K, V>) -> &'a V)
    }
}

/// Borrowed view of a store exposing only its readers.
#[derive(Debug)]
pub struct ReadOnlyStore<'a, K, V> {
    store: &'a NamedValueStore<K, V>,
}

impl<K, V> Clone for ReadOnlyStore<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for ReadOnlyStore<'_, K, V> {}

impl<'a, K, V> ReadOnlyStore<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Result<&'a V> {
        self.store.get(key)
    }

    pub fn try_get(&self, key: &K) -> Option<&'a V> {
        self.store.try_get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.store.entries.values().map(entry_pair)
    }

    pub fn keys(&self) -> Keys<'a, K, V> {
        self.store.keys()
    }

    pub fn values(&self) -> Values<'a, K, V> {
        self.store.values()
    }
}

#[derive(Serialize)]
struct StoreRecordRef<'a, K, V> {
    read_only: bool,
    entries: Vec<(&'a K, &'a V)>,
}

#[derive(Deserialize)]
struct StoreRecord<K, V> {
    read_only: bool,
    entries: Vec<(K, V)>,
}

/// Encodes the read-only flag and the entries in order. The key strategy is
/// not encoded.
impl<K, V> Serialize for NamedValueStore<K, V>
where
    K: Hash + Eq + Clone + Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        StoreRecordRef {
            read_only: self.read_only,
            entries: self.iter().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for NamedValueStore<K, V>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = StoreRecord::<K, V>::deserialize(deserializer)?;
        Self::from_parts(record.entries, record.read_only, None).map_err(D::Error::custom)
    }
}
