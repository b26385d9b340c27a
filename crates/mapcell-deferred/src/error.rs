//! Error types for deferred map cells
//!
//! Covers the two failure families a cell can raise:
//! - Resolution (no value, failing provider, circular evaluation)
//! - Rejected writes (validation, finalization, merge conflicts)

use mapcell_merge::MergeError;

/// Errors raised by a [`DeferredMapCell`](crate::DeferredMapCell)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    /// Cell is unset and has no convention
    #[error("cannot query the value of '{cell}' because it has no value available")]
    Missing {
        /// Display name of the cell
        cell: String,
    },

    /// A provider could not produce its value
    #[error("provider failed: {0}")]
    Provider(String),

    /// Resolving the cell required resolving the cell itself
    #[error("circular evaluation detected while resolving '{cell}'")]
    Circular {
        /// Display name of the cell
        cell: String,
    },

    /// Value refused by validation
    #[error("'{cell}' rejected value: {reason}")]
    Rejected {
        /// Display name of the cell
        cell: String,
        /// Validation message
        reason: String,
    },

    /// Value is final and can no longer change
    #[error("the value of '{cell}' is final and cannot be changed")]
    Finalized {
        /// Display name of the cell
        cell: String,
    },

    /// Changes were disallowed on the cell
    #[error("the value of '{cell}' cannot be changed any further")]
    ChangesDisallowed {
        /// Display name of the cell
        cell: String,
    },

    /// Bulk merge conflicted with the current value
    #[error("merge into '{cell}' failed: {source}")]
    Merge {
        /// Display name of the cell
        cell: String,
        /// Underlying merge failure
        #[source]
        source: MergeError,
    },
}

impl CellError {
    /// Create provider failure
    #[inline]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create rejection for cell
    #[inline]
    pub fn rejected(cell: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            cell: cell.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened while computing a value
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::Missing { .. } | Self::Provider(_) | Self::Circular { .. }
        )
    }
}

/// Result type alias for cell operations
pub type CellResult<T> = Result<T, CellError>;
