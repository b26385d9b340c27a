//! Keep-existing merge strategy
//!
//! Incoming entries only fill keys that are not yet present.

use crate::strategy::{MergeError, MergeReport, MergeStrategy};
use indexmap::map::Entry;
use mapcell_core::Mapping;
use std::hash::Hash;

/// Keep-existing strategy: existing values win
///
/// # Characteristics
/// - Never fails
/// - Not commutative (first batch wins)
/// - Good for layering defaults underneath explicit entries
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExistingStrategy;

impl KeepExistingStrategy {
    /// Create new keep-existing strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<K: Eq + Hash, V> MergeStrategy<K, V> for KeepExistingStrategy {
    fn merge(
        &self,
        base: &mut Mapping<K, V>,
        incoming: Mapping<K, V>,
    ) -> Result<MergeReport, MergeError> {
        let mut report = MergeReport::default();

        for (key, value) in incoming {
            match base.entry(key) {
                Entry::Occupied(_) => report.kept += 1,
                Entry::Vacant(slot) => {
                    slot.insert(value);
                    report.inserted += 1;
                }
            }
        }

        Ok(report)
    }

    fn is_commutative(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "KeepExisting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcell_core::mapping_of;

    #[test]
    fn keep_existing_fills_gaps_only() {
        let mut base = mapping_of([("port", 8080)]);
        let report = KeepExistingStrategy::new()
            .merge(&mut base, mapping_of([("port", 80), ("retries", 3)]))
            .unwrap();

        assert_eq!(base, mapping_of([("port", 8080), ("retries", 3)]));
        assert_eq!(report.kept, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.changed(), 1);
    }
}
