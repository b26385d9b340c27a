//! Overwrite merge strategy
//!
//! Plain map semantics: the incoming value wins.

use crate::strategy::{MergeError, MergeReport, MergeStrategy};
use mapcell_core::Mapping;
use std::hash::Hash;

/// Overwrite strategy: incoming entries replace existing ones
///
/// # Characteristics
/// - Never fails
/// - Not commutative (last batch wins)
/// - Overwritten keys keep their original position
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteStrategy;

impl OverwriteStrategy {
    /// Create new overwrite strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<K: Eq + Hash, V> MergeStrategy<K, V> for OverwriteStrategy {
    fn merge(
        &self,
        base: &mut Mapping<K, V>,
        incoming: Mapping<K, V>,
    ) -> Result<MergeReport, MergeError> {
        let mut report = MergeReport::default();

        for (key, value) in incoming {
            if base.insert(key, value).is_some() {
                report.overwritten += 1;
            } else {
                report.inserted += 1;
            }
        }

        Ok(report)
    }

    fn is_commutative(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "Overwrite"
    }
}
