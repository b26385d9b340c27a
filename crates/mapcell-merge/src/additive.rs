//! Additive merge strategy
//!
//! Overlapping values are folded together with [`Combine`].

use crate::strategy::{MergeError, MergeReport, MergeStrategy};
use mapcell_core::{Combine, Mapping};
use std::fmt::Debug;
use std::hash::Hash;

/// Additive strategy: overlapping values are combined
///
/// # Characteristics
/// - Counters, lists and sets accumulate instead of being replaced
/// - Commutative whenever the value's `Combine` is
/// - All-or-nothing: combination runs on a staged copy of the touched values
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveStrategy;

impl AdditiveStrategy {
    /// Create new additive strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<K, V> MergeStrategy<K, V> for AdditiveStrategy
where
    K: Eq + Hash + Debug,
    V: Combine + Clone,
{
    fn merge(
        &self,
        base: &mut Mapping<K, V>,
        incoming: Mapping<K, V>,
    ) -> Result<MergeReport, MergeError> {
        let mut report = MergeReport::default();
        let mut staged: Vec<(K, V)> = Vec::with_capacity(incoming.len());

        // Combine into copies first so a failure leaves `base` untouched
        for (key, value) in incoming {
            let next = match base.get(&key) {
                Some(existing) => {
                    let mut acc = existing.clone();
                    acc.combine(value).map_err(|source| MergeError::Combine {
                        key: format!("{key:?}"),
                        source,
                    })?;
                    report.combined += 1;
                    acc
                }
                None => {
                    report.inserted += 1;
                    value
                }
            };
            staged.push((key, next));
        }

        base.extend(staged);
        Ok(report)
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Additive"
    }
}
