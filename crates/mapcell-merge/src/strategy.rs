//! Merge strategy trait and core types
//!
//! Provides the [`MergeStrategy`] trait used by cells to apply a bulk
//! insertion to their current value.

use mapcell_core::{CombineError, Mapping};

/// Bulk-merge semantics for a map cell
///
/// # Contract
/// `merge()` is all-or-nothing: on error `base` must be left exactly as it
/// was passed in. Entries new to `base` are appended in the order they
/// appear in `incoming`; keys already present keep their position.
pub trait MergeStrategy<K, V>: std::fmt::Debug {
    /// Merge `incoming` into `base`
    ///
    /// # Errors
    /// Returns [`MergeError`] when the batch conflicts with `base` under
    /// this strategy.
    fn merge(&self, base: &mut Mapping<K, V>, incoming: Mapping<K, V>)
        -> Result<MergeReport, MergeError>;

    /// Whether applying two batches in either order gives the same value
    fn is_commutative(&self) -> bool;

    /// Strategy name (for debugging/serialization)
    fn name(&self) -> &'static str;
}

/// Counts of what a merge did to the base mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Keys that were not present before
    pub inserted: usize,

    /// Existing values replaced by incoming ones
    pub overwritten: usize,

    /// Existing values combined with incoming ones
    pub combined: usize,

    /// Incoming values discarded in favour of existing ones
    pub kept: usize,
}

impl MergeReport {
    /// Number of incoming entries that changed the base mapping
    #[inline]
    #[must_use]
    pub fn changed(&self) -> usize {
        self.inserted + self.overwritten + self.combined
    }

    /// Whether the merge left the base mapping untouched
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed() == 0
    }
}

/// Merge error with diagnostics
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Batch conflicts with the base mapping
    #[error("merge conflict: {diagnostic}")]
    Conflict {
        /// Detailed diagnostic
        diagnostic: ConflictDiagnostic,
    },

    /// Two values for the same key could not be combined
    #[error("cannot combine values for key {key}: {source}")]
    Combine {
        /// Debug rendering of the key
        key: String,
        /// Underlying combination failure
        #[source]
        source: CombineError,
    },

    /// Strategy is not available for this value type
    #[error("merge strategy '{0}' is not supported for this value type")]
    Unsupported(&'static str),
}

impl MergeError {
    /// Create conflict error
    #[inline]
    #[must_use]
    pub fn conflict(diagnostic: ConflictDiagnostic) -> Self {
        Self::Conflict { diagnostic }
    }

    /// Keys involved in the failure, if any
    #[must_use]
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Conflict { diagnostic } => &diagnostic.keys,
            Self::Combine { key, .. } => std::slice::from_ref(key),
            Self::Unsupported(_) => &[],
        }
    }
}

/// Detailed merge conflict diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictDiagnostic {
    /// Kind of conflict
    pub kind: ConflictKind,

    /// Debug renderings of the conflicting keys
    pub keys: Vec<String>,

    /// Human-readable description
    pub description: String,

    /// Suggested resolutions
    pub suggestions: Vec<ResolutionSuggestion>,
}

impl std::fmt::Display for ConflictDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.description)
    }
}

/// Types of conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Incoming keys already have values
    OverlappingKeys,
}

/// Resolution suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSuggestion {
    /// Let incoming entries overwrite
    UseOverwrite,

    /// Combine overlapping values
    UseAdditive,

    /// Discard incoming values for existing keys
    UseKeepExisting,

    /// Remove the existing keys before merging
    RemoveKeysFirst,
}
