//! Ordered mapping type and additive value combination

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

/// Insertion-ordered mapping exchanged between cells and views
///
/// Removal must go through `shift_remove` wherever the relative order of
/// the remaining keys matters.
pub type Mapping<K, V> = IndexMap<K, V>;

/// Build a mapping from pairs, keeping first-seen key order
#[must_use]
pub fn mapping_of<K, V, I>(pairs: I) -> Mapping<K, V>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    pairs.into_iter().collect()
}

/// Failure while combining two values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombineError {
    /// Numeric combination left the representable range
    #[error("combining values overflowed {type_name}")]
    Overflow {
        /// Name of the overflowing type
        type_name: &'static str,
    },

    /// Values cannot be combined
    #[error("values cannot be combined: {0}")]
    Incompatible(String),
}

/// Additive merge of an incoming value into an existing one
///
/// Used by cells whose bulk insertion accumulates rather than overwrites.
pub trait Combine: Sized {
    /// Fold `incoming` into `self`
    ///
    /// # Errors
    /// Returns [`CombineError`] if the values cannot be combined; `self` is
    /// left unchanged in that case.
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError>;
}

macro_rules! combine_checked_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Combine for $t {
                #[inline]
                fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
                    *self = self.checked_add(incoming).ok_or(CombineError::Overflow {
                        type_name: stringify!($t),
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

combine_checked_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Combine for f32 {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        *self += incoming;
        Ok(())
    }
}

impl Combine for f64 {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        *self += incoming;
        Ok(())
    }
}

impl Combine for String {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        self.push_str(&incoming);
        Ok(())
    }
}

impl<T> Combine for Vec<T> {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        self.extend(incoming);
        Ok(())
    }
}

impl<T: Ord> Combine for BTreeSet<T> {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        self.extend(incoming);
        Ok(())
    }
}

impl<T: Eq + Hash> Combine for HashSet<T> {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        self.extend(incoming);
        Ok(())
    }
}

// Nested mappings merge shallowly: incoming entries overwrite in place.
impl<K: Eq + Hash, V> Combine for IndexMap<K, V> {
    #[inline]
    fn combine(&mut self, incoming: Self) -> Result<(), CombineError> {
        self.extend(incoming);
        Ok(())
    }
}
