//! Testing utilities for mapcell workspace
//!
//! Shared test helpers, fixtures, and a scriptable fake cell.

#![allow(missing_docs)]

use mapcell_core::{MapCell, Mapping};
use std::cell::{Cell, RefCell};
use std::hash::Hash;

/// Failure raised by [`RecordingCell`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FakeCellError {
    #[error("resolution failed: {0}")]
    Resolution(String),

    #[error("replacement rejected: {0}")]
    Rejected(String),
}

/// Calls observed by a [`RecordingCell`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub resolves: usize,
    pub replaces: usize,
    pub put_alls: usize,
    pub clears: usize,
}

/// In-memory cell that counts every call and can be told to fail
///
/// `put_all` overwrites like a plain map.
#[derive(Debug)]
pub struct RecordingCell<K, V> {
    value: RefCell<Mapping<K, V>>,
    counts: Cell<CallCounts>,
    fail_resolve: RefCell<Option<String>>,
    reject_writes: RefCell<Option<String>>,
}

impl<K: Eq + Hash + Clone, V: Clone> RecordingCell<K, V> {
    pub fn new(initial: Mapping<K, V>) -> Self {
        Self {
            value: RefCell::new(initial),
            counts: Cell::new(CallCounts::default()),
            fail_resolve: RefCell::new(None),
            reject_writes: RefCell::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::new(Mapping::new())
    }

    /// Make every resolution fail until [`heal`](Self::heal) is called
    pub fn fail_resolution(&self, message: &str) {
        *self.fail_resolve.borrow_mut() = Some(message.to_string());
    }

    /// Make every write fail until [`heal`](Self::heal) is called
    pub fn reject_writes(&self, message: &str) {
        *self.reject_writes.borrow_mut() = Some(message.to_string());
    }

    pub fn heal(&self) {
        self.fail_resolve.borrow_mut().take();
        self.reject_writes.borrow_mut().take();
    }

    /// Stored value, read without counting a resolution
    pub fn peek(&self) -> Mapping<K, V> {
        self.value.borrow().clone()
    }

    pub fn counts(&self) -> CallCounts {
        self.counts.get()
    }

    fn bump(&self, f: impl FnOnce(&mut CallCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }

    fn check_writable(&self) -> Result<(), FakeCellError> {
        match self.reject_writes.borrow().as_ref() {
            Some(message) => Err(FakeCellError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> MapCell for RecordingCell<K, V> {
    type Key = K;
    type Value = V;
    type Error = FakeCellError;

    fn resolve(&self) -> Result<Mapping<K, V>, FakeCellError> {
        self.bump(|c| c.resolves += 1);
        if let Some(message) = self.fail_resolve.borrow().as_ref() {
            return Err(FakeCellError::Resolution(message.clone()));
        }
        Ok(self.value.borrow().clone())
    }

    fn replace(&self, mapping: Mapping<K, V>) -> Result<(), FakeCellError> {
        self.bump(|c| c.replaces += 1);
        self.check_writable()?;
        *self.value.borrow_mut() = mapping;
        Ok(())
    }

    fn put_all(&self, entries: Mapping<K, V>) -> Result<(), FakeCellError> {
        self.bump(|c| c.put_alls += 1);
        self.check_writable()?;
        self.value.borrow_mut().extend(entries);
        Ok(())
    }

    fn clear(&self) -> Result<(), FakeCellError> {
        self.bump(|c| c.clears += 1);
        self.check_writable()?;
        self.value.borrow_mut().clear();
        Ok(())
    }
}

/// `{"x": 1, "y": 2}`
pub fn xy_mapping() -> Mapping<String, i32> {
    string_mapping(&[("x", 1), ("y", 2)])
}

pub fn string_mapping(pairs: &[(&str, i32)]) -> Mapping<String, i32> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

pub fn keys_of<V>(mapping: &Mapping<String, V>) -> Vec<&str> {
    mapping.keys().map(String::as_str).collect()
}

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
