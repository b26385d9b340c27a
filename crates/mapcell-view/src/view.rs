//! Mutable-map view over a deferred map cell
//!
//! Reads resolve the cell on every call. Single-entry writes resolve, edit
//! the owned copy and hand the whole copy back through `replace`, so the
//! cell observes each mutation as one whole-value change. Bulk insertion and
//! clearing are delegated so the cell applies its own semantics.

use crate::entries::Entries;
use mapcell_core::{MapCell, Mapping};
use std::borrow::Borrow;
use std::hash::Hash;

/// Conventional mutable-map interface over a [`MapCell`]
///
/// The view owns no mapping data and caches nothing: every read costs one
/// resolution and every single-entry write costs one resolution plus one
/// whole-value replacement.
///
/// Errors from the cell are returned unchanged. An absent key is `Ok(None)`.
/// A write that fails leaves the cell's value as it was.
///
/// # Threading
/// No internal synchronization. Sequential calls on one view observe their
/// own writes; interleaving with other holders of the same cell needs
/// external serialization.
#[derive(Debug, Clone)]
pub struct MapView<C> {
    cell: C,
}

impl<C> MapView<C> {
    /// Wrap a cell handle
    #[inline]
    #[must_use]
    pub fn new(cell: C) -> Self {
        Self { cell }
    }

    /// Underlying cell handle
    #[inline]
    #[must_use]
    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// Unwrap the cell handle
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> C {
        self.cell
    }
}

impl<C> From<C> for MapView<C> {
    fn from(cell: C) -> Self {
        Self::new(cell)
    }
}

impl<C: MapCell> MapView<C> {
    /// Value for `key`
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<C::Value>, C::Error>
    where
        C::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut current = self.cell.resolve()?;
        Ok(current.swap_remove(key))
    }

    /// Value for `key`, or `default` when absent
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn get_or<Q>(&self, key: &Q, default: C::Value) -> Result<C::Value, C::Error>
    where
        C::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Whether `key` is present
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool, C::Error>
    where
        C::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.cell.resolve()?.contains_key(key))
    }

    /// Whether any key maps to `value`
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn contains_value(&self, value: &C::Value) -> Result<bool, C::Error>
    where
        C::Value: PartialEq,
    {
        Ok(self.cell.resolve()?.values().any(|v| v == value))
    }

    /// Snapshot of all entries
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn entries(&self) -> Result<Entries<C::Key, C::Value>, C::Error> {
        self.cell.resolve().map(Entries::new)
    }

    /// Snapshot of all keys, in cell order
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn keys(&self) -> Result<Vec<C::Key>, C::Error> {
        Ok(self.cell.resolve()?.into_keys().collect())
    }

    /// Snapshot of all values, in cell order
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn values(&self) -> Result<Vec<C::Value>, C::Error> {
        Ok(self.cell.resolve()?.into_values().collect())
    }

    /// Number of entries
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn len(&self) -> Result<usize, C::Error> {
        Ok(self.cell.resolve()?.len())
    }

    /// Whether the cell resolves to an empty mapping
    ///
    /// # Errors
    /// Resolution failure of the cell.
    pub fn is_empty(&self) -> Result<bool, C::Error> {
        Ok(self.cell.resolve()?.is_empty())
    }

    /// Insert or overwrite `key`, returning the previous value
    ///
    /// Existing keys keep their position; a new key is appended.
    ///
    /// # Errors
    /// Resolution failure, or the cell rejecting the new value.
    pub fn insert(&mut self, key: C::Key, value: C::Value) -> Result<Option<C::Value>, C::Error> {
        let mut next = self.cell.resolve()?;
        let previous = next.insert(key, value);
        self.commit("insert", next)?;
        Ok(previous)
    }

    /// Insert only when `key` is absent, returning the existing value otherwise
    ///
    /// Nothing is written when the key is already present.
    ///
    /// # Errors
    /// Resolution failure, or the cell rejecting the new value.
    pub fn insert_if_absent(
        &mut self,
        key: C::Key,
        value: C::Value,
    ) -> Result<Option<C::Value>, C::Error> {
        let mut next = self.cell.resolve()?;
        if let Some(existing) = next.get(&key) {
            return Ok(Some(existing.clone()));
        }
        next.insert(key, value);
        self.commit("insert_if_absent", next)?;
        Ok(None)
    }

    /// Hand `entries` to the cell's bulk merge
    ///
    /// The cell decides how overlapping keys combine.
    ///
    /// # Errors
    /// The cell rejecting the entries.
    pub fn put_all<I>(&mut self, entries: I) -> Result<(), C::Error>
    where
        I: IntoIterator<Item = (C::Key, C::Value)>,
    {
        let entries: Mapping<C::Key, C::Value> = entries.into_iter().collect();
        tracing::debug!(entries = entries.len(), "delegating bulk merge to map cell");
        self.cell.put_all(entries)
    }

    /// Remove `key`, returning its value
    ///
    /// The remaining keys keep their relative order. The cell's value is
    /// replaced even when the key was absent.
    ///
    /// # Errors
    /// Resolution failure, or the cell rejecting the new value.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<C::Value>, C::Error>
    where
        C::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut next = self.cell.resolve()?;
        let previous = next.shift_remove(key);
        self.commit("remove", next)?;
        Ok(previous)
    }

    /// Keep only entries matching `keep`, returning how many were removed
    ///
    /// # Errors
    /// Resolution failure, or the cell rejecting the new value.
    pub fn retain<F>(&mut self, mut keep: F) -> Result<usize, C::Error>
    where
        F: FnMut(&C::Key, &C::Value) -> bool,
    {
        let mut next = self.cell.resolve()?;
        let before = next.len();
        next.retain(|k, v| keep(k, v));
        let removed = before - next.len();
        self.commit("retain", next)?;
        Ok(removed)
    }

    /// Reset the cell to its own notion of empty
    ///
    /// # Errors
    /// The cell refusing the reset.
    pub fn clear(&mut self) -> Result<(), C::Error> {
        tracing::debug!("delegating reset to map cell");
        self.cell.clear()
    }

    fn commit(
        &self,
        operation: &'static str,
        next: Mapping<C::Key, C::Value>,
    ) -> Result<(), C::Error> {
        tracing::debug!(operation, entries = next.len(), "replacing map cell value");
        self.cell.replace(next)
    }
}
