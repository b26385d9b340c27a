//! Strategy selection for merge strategies
//!
//! Provides [`MergeKind`], a serializable name for each built-in strategy.

use crate::additive::AdditiveStrategy;
use crate::keep_existing::KeepExistingStrategy;
use crate::overwrite::OverwriteStrategy;
use crate::single_writer::SingleWriterStrategy;
use crate::strategy::{MergeError, MergeStrategy};
use mapcell_core::Combine;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

/// Built-in merge strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
    /// Incoming entries win - default
    #[default]
    Overwrite,

    /// Existing entries win
    KeepExisting,

    /// Overlapping keys are rejected
    SingleWriter,

    /// Overlapping values are combined
    Additive,
}

impl MergeKind {
    /// All built-in kinds
    pub const ALL: [Self; 4] = [
        Self::Overwrite,
        Self::KeepExisting,
        Self::SingleWriter,
        Self::Additive,
    ];

    /// Stable configuration name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::KeepExisting => "keep_existing",
            Self::SingleWriter => "single_writer",
            Self::Additive => "additive",
        }
    }

    /// Build the strategy for values that support [`Combine`]
    #[must_use]
    pub fn strategy<K, V>(&self) -> Box<dyn MergeStrategy<K, V>>
    where
        K: Eq + Hash + Debug + 'static,
        V: Combine + Clone + 'static,
    {
        match self {
            Self::Additive => Box::new(AdditiveStrategy::new()),
            other => other.plain_strategy(),
        }
    }

    /// Build the strategy for values without additive semantics
    ///
    /// # Errors
    /// Returns [`MergeError::Unsupported`] for [`MergeKind::Additive`].
    pub fn try_plain_strategy<K, V>(&self) -> Result<Box<dyn MergeStrategy<K, V>>, MergeError>
    where
        K: Eq + Hash + Debug + 'static,
        V: 'static,
    {
        match self {
            Self::Additive => Err(MergeError::Unsupported(self.as_str())),
            other => Ok(other.plain_strategy()),
        }
    }

    fn plain_strategy<K, V>(&self) -> Box<dyn MergeStrategy<K, V>>
    where
        K: Eq + Hash + Debug + 'static,
        V: 'static,
    {
        match self {
            Self::KeepExisting => Box::new(KeepExistingStrategy::new()),
            Self::SingleWriter => Box::new(SingleWriterStrategy::new()),
            Self::Overwrite | Self::Additive => Box::new(OverwriteStrategy::new()),
        }
    }
}

impl std::fmt::Display for MergeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown merge strategy: {s}"))
    }
}
