//! Value sources and pending additions

use crate::error::CellResult;
use mapcell_core::Mapping;
use std::hash::Hash;
use std::rc::Rc;

/// Lazily computed mapping
pub type MapProvider<K, V> = Rc<dyn Fn() -> CellResult<Mapping<K, V>>>;

/// Lazily computed single value
pub type ValueProvider<V> = Rc<dyn Fn() -> CellResult<V>>;

/// Where a base value comes from
pub(crate) enum Source<K, V> {
    Fixed(Mapping<K, V>),
    Provider(MapProvider<K, V>),
}

impl<K: Clone, V: Clone> Clone for Source<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(mapping) => Self::Fixed(mapping.clone()),
            Self::Provider(provider) => Self::Provider(Rc::clone(provider)),
        }
    }
}

impl<K: Clone, V: Clone> Source<K, V> {
    pub(crate) fn evaluate(&self) -> CellResult<Mapping<K, V>> {
        match self {
            Self::Fixed(mapping) => Ok(mapping.clone()),
            Self::Provider(provider) => provider(),
        }
    }
}

/// Entries queued on top of the base value, applied in order at resolution
pub(crate) enum Addition<K, V> {
    Entries(Mapping<K, V>),
    Entry(K, ValueProvider<V>),
    Provider(MapProvider<K, V>),
}

impl<K: Clone, V: Clone> Clone for Addition<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Entries(mapping) => Self::Entries(mapping.clone()),
            Self::Entry(key, provider) => Self::Entry(key.clone(), Rc::clone(provider)),
            Self::Provider(provider) => Self::Provider(Rc::clone(provider)),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Addition<K, V> {
    pub(crate) fn evaluate(&self) -> CellResult<Mapping<K, V>> {
        match self {
            Self::Entries(mapping) => Ok(mapping.clone()),
            Self::Entry(key, provider) => {
                let mut single = Mapping::with_capacity(1);
                single.insert(key.clone(), provider()?);
                Ok(single)
            }
            Self::Provider(provider) => provider(),
        }
    }
}

/// Explicit value, or nothing so the convention applies
pub(crate) enum ValueState<K, V> {
    Unset,
    Explicit(Source<K, V>),
}

/// Write permission of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteLock {
    /// Writes accepted
    Open,
    /// Writes refused, value still computed lazily
    Disallowed,
    /// Writes refused, value frozen
    Finalized,
}

pub(crate) struct CellState<K, V> {
    pub(crate) value: ValueState<K, V>,
    pub(crate) convention: Option<Source<K, V>>,
    pub(crate) additions: Vec<Addition<K, V>>,
    pub(crate) lock: WriteLock,
}

impl<K: Clone, V: Clone> CellState<K, V> {
    pub(crate) fn with_value(value: Mapping<K, V>) -> Self {
        Self {
            value: ValueState::Explicit(Source::Fixed(value)),
            convention: None,
            additions: Vec::new(),
            lock: WriteLock::Open,
        }
    }

    /// Base source in effect, falling back to the convention when unset
    pub(crate) fn effective_source(&self) -> Option<Source<K, V>> {
        match &self.value {
            ValueState::Explicit(source) => Some(source.clone()),
            ValueState::Unset => self.convention.clone(),
        }
    }

    /// Fixed explicit value with nothing pending, mergeable in place
    pub(crate) fn settled_value_mut(&mut self) -> Option<&mut Mapping<K, V>> {
        if !self.additions.is_empty() {
            return None;
        }
        match &mut self.value {
            ValueState::Explicit(Source::Fixed(mapping)) => Some(mapping),
            _ => None,
        }
    }

    pub(crate) fn install(&mut self, source: Source<K, V>) {
        self.value = ValueState::Explicit(source);
        self.additions.clear();
    }
}
