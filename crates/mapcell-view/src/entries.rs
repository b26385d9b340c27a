//! Entry snapshots

use mapcell_core::Mapping;
use std::borrow::Borrow;
use std::hash::Hash;

/// Entries of a cell as resolved at one point in time
///
/// Owned and detached: later writes to the cell are not reflected here, and
/// consuming or mutating the snapshot never reaches the cell.
#[derive(Debug, Clone)]
pub struct Entries<K, V> {
    mapping: Mapping<K, V>,
}

impl<K, V> Entries<K, V> {
    pub(crate) fn new(mapping: Mapping<K, V>) -> Self {
        Self { mapping }
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether the snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Iterate entries in cell order
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.mapping.iter()
    }

    /// Iterate keys in cell order
    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.mapping.keys()
    }

    /// Iterate values in cell order
    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.mapping.values()
    }

    /// Borrow as a mapping
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> &Mapping<K, V> {
        &self.mapping
    }

    /// Take the mapping out of the snapshot
    #[inline]
    #[must_use]
    pub fn into_mapping(self) -> Mapping<K, V> {
        self.mapping
    }
}

impl<K: Eq + Hash, V> Entries<K, V> {
    /// Value for `key` in the snapshot
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mapping.get(key)
    }

    /// Whether the snapshot has `key`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mapping.contains_key(key)
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for Entries<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.mapping == other.mapping
    }
}

impl<K: Eq + Hash, V: Eq> Eq for Entries<K, V> {}

impl<K, V> IntoIterator for Entries<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.mapping.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Entries<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.mapping.iter()
    }
}

impl<K, V> From<Entries<K, V>> for Mapping<K, V> {
    fn from(entries: Entries<K, V>) -> Self {
        entries.mapping
    }
}
