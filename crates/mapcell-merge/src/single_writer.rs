//! Single writer merge strategy
//!
//! Each key may be written by exactly one batch. Maximum safety.

use crate::strategy::{
    ConflictDiagnostic, ConflictKind, MergeError, MergeReport, MergeStrategy,
    ResolutionSuggestion,
};
use mapcell_core::Mapping;
use std::fmt::Debug;
use std::hash::Hash;

/// Single writer strategy: batches must claim disjoint keys
///
/// # Characteristics
/// - Rejects any batch touching a key that already has a value
/// - Commutative (disjoint batches compose in any order)
/// - All-or-nothing: the base is untouched when a conflict is found
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleWriterStrategy;

impl SingleWriterStrategy {
    /// Create new single writer strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate incoming keys are disjoint from the base
    fn validate_disjoint<K, V>(
        base: &Mapping<K, V>,
        incoming: &Mapping<K, V>,
    ) -> Result<(), MergeError>
    where
        K: Eq + Hash + Debug,
    {
        let overlapping: Vec<String> = incoming
            .keys()
            .filter(|key| base.contains_key(*key))
            .map(|key| format!("{key:?}"))
            .collect();

        if overlapping.is_empty() {
            return Ok(());
        }

        Err(MergeError::conflict(ConflictDiagnostic {
            kind: ConflictKind::OverlappingKeys,
            description: format!(
                "{} key(s) already written: {}",
                overlapping.len(),
                overlapping.join(", ")
            ),
            keys: overlapping,
            suggestions: vec![
                ResolutionSuggestion::RemoveKeysFirst,
                ResolutionSuggestion::UseOverwrite,
            ],
        }))
    }
}

impl<K: Eq + Hash + Debug, V> MergeStrategy<K, V> for SingleWriterStrategy {
    fn merge(
        &self,
        base: &mut Mapping<K, V>,
        incoming: Mapping<K, V>,
    ) -> Result<MergeReport, MergeError> {
        Self::validate_disjoint(base, &incoming)?;

        let inserted = incoming.len();
        base.extend(incoming);

        Ok(MergeReport {
            inserted,
            ..MergeReport::default()
        })
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "SingleWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcell_core::mapping_of;

    #[test]
    fn single_writer_accepts_disjoint() {
        let mut base = mapping_of([("auth.login", 1)]);
        let report = SingleWriterStrategy::new()
            .merge(&mut base, mapping_of([("auth.register", 2)]))
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn single_writer_rejects_overlap_without_partial_write() {
        let mut base = mapping_of([("a", 1), ("b", 2)]);
        let err = SingleWriterStrategy::new()
            .merge(&mut base, mapping_of([("c", 3), ("b", 20)]))
            .unwrap_err();

        match &err {
            MergeError::Conflict { diagnostic } => {
                assert_eq!(diagnostic.kind, ConflictKind::OverlappingKeys);
                assert_eq!(diagnostic.keys, vec!["\"b\"".to_string()]);
                assert!(diagnostic
                    .suggestions
                    .contains(&ResolutionSuggestion::RemoveKeysFirst));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(base, mapping_of([("a", 1), ("b", 2)]));
    }
}
