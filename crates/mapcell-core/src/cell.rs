//! Deferred map cell contract
//!
//! Provides the [`MapCell`] trait implemented by anything that owns a
//! lazily computed, change-tracked mapping.

use crate::mapping::Mapping;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

/// Owner of a mapping value that may be computed lazily and that learns
/// about every whole-value change.
///
/// All methods take `&self`: a cell is a shared handle and is expected to
/// use interior mutability. Implementations are not required to be safe for
/// concurrent unsynchronized access.
///
/// # Contract
/// - `resolve()` returns an owned mapping that does not alias the cell's
///   storage; callers may mutate it freely.
/// - `replace()` either installs the whole value or fails leaving the
///   previous value in place.
/// - `put_all()` merges with the cell's own semantics, which need not be a
///   plain overwrite.
/// - `clear()` resets to the cell's own definition of empty.
pub trait MapCell {
    /// Key type
    type Key: Eq + Hash + Clone;

    /// Value type
    type Value: Clone;

    /// Failure raised by resolution or by rejecting a write
    type Error: std::error::Error;

    /// Materialize the current logical value
    ///
    /// # Errors
    /// Fails when the value cannot be computed (missing or invalid upstream state).
    fn resolve(&self) -> Result<Mapping<Self::Key, Self::Value>, Self::Error>;

    /// Install a new logical value
    ///
    /// # Errors
    /// Fails when the cell rejects the value; the previous value stays in place.
    fn replace(&self, mapping: Mapping<Self::Key, Self::Value>) -> Result<(), Self::Error>;

    /// Merge entries into the current value
    ///
    /// # Errors
    /// Fails when the cell rejects the entries.
    fn put_all(&self, entries: Mapping<Self::Key, Self::Value>) -> Result<(), Self::Error>;

    /// Reset to the cell's definition of empty
    ///
    /// # Errors
    /// Fails when the cell does not accept changes.
    fn clear(&self) -> Result<(), Self::Error>;
}

macro_rules! forward_map_cell {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<C: MapCell + ?Sized> MapCell for $ptr {
                type Key = C::Key;
                type Value = C::Value;
                type Error = C::Error;

                #[inline]
                fn resolve(&self) -> Result<Mapping<Self::Key, Self::Value>, Self::Error> {
                    (**self).resolve()
                }

                #[inline]
                fn replace(
                    &self,
                    mapping: Mapping<Self::Key, Self::Value>,
                ) -> Result<(), Self::Error> {
                    (**self).replace(mapping)
                }

                #[inline]
                fn put_all(
                    &self,
                    entries: Mapping<Self::Key, Self::Value>,
                ) -> Result<(), Self::Error> {
                    (**self).put_all(entries)
                }

                #[inline]
                fn clear(&self) -> Result<(), Self::Error> {
                    (**self).clear()
                }
            }
        )*
    };
}

forward_map_cell!(&C, Rc<C>, Arc<C>, Box<C>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    #[derive(Default)]
    struct PlainCell {
        value: RefCell<Mapping<&'static str, i32>>,
    }

    impl MapCell for PlainCell {
        type Key = &'static str;
        type Value = i32;
        type Error = Never;

        fn resolve(&self) -> Result<Mapping<&'static str, i32>, Never> {
            Ok(self.value.borrow().clone())
        }

        fn replace(&self, mapping: Mapping<&'static str, i32>) -> Result<(), Never> {
            *self.value.borrow_mut() = mapping;
            Ok(())
        }

        fn put_all(&self, entries: Mapping<&'static str, i32>) -> Result<(), Never> {
            self.value.borrow_mut().extend(entries);
            Ok(())
        }

        fn clear(&self) -> Result<(), Never> {
            self.value.borrow_mut().clear();
            Ok(())
        }
    }

    fn write_through<C: MapCell<Key = &'static str, Value = i32>>(cell: C) {
        let mut entries = Mapping::new();
        entries.insert("a", 1);
        assert!(cell.put_all(entries).is_ok());
    }

    #[test]
    fn borrowed_cell_forwards() {
        let cell = PlainCell::default();
        write_through(&cell);
        assert_eq!(cell.resolve().unwrap().get("a"), Some(&1));
    }

    #[test]
    fn shared_cell_forwards() {
        let cell = Rc::new(PlainCell::default());
        write_through(Rc::clone(&cell));
        assert_eq!(cell.resolve().unwrap().len(), 1);

        assert!(Rc::clone(&cell).clear().is_ok());
        assert!(cell.resolve().unwrap().is_empty());
    }

    #[test]
    fn boxed_cell_forwards() {
        let cell: Box<PlainCell> = Box::default();
        let mut next = Mapping::new();
        next.insert("z", 26);
        assert!(cell.replace(next).is_ok());
        assert_eq!(cell.resolve().unwrap().get("z"), Some(&26));
    }
}
