//! Deferred map cell
//!
//! A mapping whose value may come from a fixed literal, a lazy provider or a
//! convention, with queued additions applied at resolution time. Every
//! accepted write is recorded and broadcast to listeners.

use crate::config::CellConfig;
use crate::error::{CellError, CellResult};
use crate::events::{ChangeEvent, ChangeKind, ChangeLog, Listener, SubscriptionId};
use crate::source::{Addition, CellState, Source, ValueState, WriteLock};
use mapcell_core::{Combine, MapCell, Mapping};
use mapcell_merge::{MergeStrategy, OverwriteStrategy};
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

type EntryValidator<K, V> = Box<dyn Fn(&K, &V) -> Result<(), String>>;

/// Lazily evaluated, change-tracked map cell
///
/// # Lifecycle
/// - Starts with an explicit empty value.
/// - `unset()` drops the explicit value; resolution then uses the convention
///   and fails with [`CellError::Missing`] if there is none.
/// - `disallow_changes()` and `finalize_value()` make every later write fail.
///
/// # Threading
/// Single-threaded. The cell is `!Sync`; share it with `Rc` and serialize
/// dependent sequences of calls externally.
pub struct DeferredMapCell<K, V> {
    config: CellConfig,
    state: RefCell<CellState<K, V>>,
    merge: Box<dyn MergeStrategy<K, V>>,
    validator: Option<EntryValidator<K, V>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    history: RefCell<ChangeLog>,
    next_subscription: Cell<u64>,
    resolving: Cell<bool>,
}

impl<K, V> DeferredMapCell<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    /// Create cell with overwrite semantics for bulk insertion
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self::build(CellConfig::new(display_name), Box::new(OverwriteStrategy::new()))
    }

    /// Create cell for values without additive semantics
    ///
    /// # Errors
    /// Returns [`CellError::Merge`] if the configuration asks for additive merging.
    pub fn with_config(config: CellConfig) -> CellResult<Self> {
        let merge = config
            .merge
            .try_plain_strategy()
            .map_err(|source| CellError::Merge {
                cell: config.display_name.clone(),
                source,
            })?;
        Ok(Self::build(config, merge))
    }

    fn build(config: CellConfig, merge: Box<dyn MergeStrategy<K, V>>) -> Self {
        let history = ChangeLog::new(config.history_capacity);
        Self {
            config,
            state: RefCell::new(CellState::with_value(Mapping::new())),
            merge,
            validator: None,
            listeners: RefCell::new(Vec::new()),
            history: RefCell::new(history),
            next_subscription: Cell::new(0),
            resolving: Cell::new(false),
        }
    }

    /// With initial explicit value (not recorded as a change)
    #[must_use]
    pub fn with_value(self, value: Mapping<K, V>) -> Self {
        self.state.borrow_mut().install(Source::Fixed(value));
        self
    }

    /// With custom merge strategy
    #[must_use]
    pub fn with_strategy(mut self, merge: Box<dyn MergeStrategy<K, V>>) -> Self {
        self.merge = merge;
        self
    }

    /// With per-entry validation applied to every written and resolved value
    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&K, &V) -> Result<(), String> + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.display_name
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CellConfig {
        &self.config
    }

    /// Name of the bulk-merge strategy
    #[inline]
    #[must_use]
    pub fn merge_strategy(&self) -> &'static str {
        self.merge.name()
    }

    /// Current write permission
    #[must_use]
    pub fn write_lock(&self) -> WriteLock {
        self.state.borrow().lock
    }

    /// Compute the current value
    ///
    /// Evaluates the base (explicit value or convention) and then every
    /// pending addition in order through the merge strategy.
    ///
    /// # Errors
    /// - [`CellError::Missing`] when unset without a convention
    /// - [`CellError::Circular`] when a provider reads this cell
    /// - provider, merge and validation failures
    pub fn resolve(&self) -> CellResult<Mapping<K, V>> {
        let value = {
            let _guard = EvaluationGuard::enter(&self.resolving, self.name())?;
            self.evaluate()?
        };

        if self.config.finalize_on_read && self.write_lock() != WriteLock::Finalized {
            self.freeze(value.clone());
        }
        Ok(value)
    }

    fn evaluate(&self) -> CellResult<Mapping<K, V>> {
        let (base, additions) = {
            let state = self.state.borrow();
            (state.effective_source(), state.additions.clone())
        };

        let Some(base) = base else {
            return Err(CellError::Missing {
                cell: self.name().to_string(),
            });
        };

        let mut value = base.evaluate()?;
        for addition in &additions {
            let incoming = addition.evaluate()?;
            self.merge
                .merge(&mut value, incoming)
                .map_err(|source| self.merge_error(source))?;
        }

        self.validate(&value)?;
        tracing::trace!(
            cell = %self.name(),
            entries = value.len(),
            pending = additions.len(),
            "resolved map cell"
        );
        Ok(value)
    }

    /// Resolve, mapping a missing value to `None`
    ///
    /// # Errors
    /// Any resolution failure other than [`CellError::Missing`].
    pub fn get_or_none(&self) -> CellResult<Option<Mapping<K, V>>> {
        match self.resolve() {
            Ok(value) => Ok(Some(value)),
            Err(CellError::Missing { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether the cell currently has a value
    ///
    /// # Errors
    /// Any resolution failure other than [`CellError::Missing`].
    pub fn is_present(&self) -> CellResult<bool> {
        self.get_or_none().map(|value| value.is_some())
    }

    /// Install a new explicit value, discarding pending additions
    ///
    /// # Errors
    /// Fails when the cell is locked or the value is rejected.
    pub fn replace(&self, mapping: Mapping<K, V>) -> CellResult<()> {
        self.ensure_writable()?;
        self.validate(&mapping)?;

        let entries = mapping.len();
        self.state.borrow_mut().install(Source::Fixed(mapping));
        self.emit(ChangeKind::Replaced { entries });
        Ok(())
    }

    /// Merge entries into the value with the configured strategy
    ///
    /// When the value is a settled literal the merge happens immediately and
    /// conflicts are reported here; otherwise the batch is queued and merged
    /// at resolution.
    ///
    /// # Errors
    /// Fails when the cell is locked, an entry or the merged value is
    /// rejected, or the merge conflicts with a settled value.
    pub fn put_all(&self, entries: Mapping<K, V>) -> CellResult<()> {
        self.ensure_writable()?;
        self.validate_entries(&entries)?;

        let count = entries.len();
        {
            let mut state = self.state.borrow_mut();
            if let Some(current) = state.settled_value_mut() {
                let mut merged = current.clone();
                let report = self
                    .merge
                    .merge(&mut merged, entries)
                    .map_err(|source| self.merge_error(source))?;
                self.validate(&merged)?;
                *current = merged;
                tracing::trace!(
                    cell = %self.config.display_name,
                    inserted = report.inserted,
                    overwritten = report.overwritten,
                    combined = report.combined,
                    "merged into settled value"
                );
            } else {
                state.additions.push(Addition::Entries(entries));
            }
        }

        self.emit(ChangeKind::Merged { entries: count });
        Ok(())
    }

    /// Add a single entry with the configured merge strategy
    ///
    /// # Errors
    /// Same as [`put_all`](Self::put_all).
    pub fn put(&self, key: K, value: V) -> CellResult<()> {
        let mut single = Mapping::with_capacity(1);
        single.insert(key, value);
        self.put_all(single)
    }

    /// Queue a lazily computed entry
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn put_provider(
        &self,
        key: K,
        provider: impl Fn() -> CellResult<V> + 'static,
    ) -> CellResult<()> {
        self.ensure_writable()?;
        self.state
            .borrow_mut()
            .additions
            .push(Addition::Entry(key, Rc::new(provider)));
        self.emit(ChangeKind::ProviderAttached);
        Ok(())
    }

    /// Queue a lazily computed batch of entries
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn put_all_provider(
        &self,
        provider: impl Fn() -> CellResult<Mapping<K, V>> + 'static,
    ) -> CellResult<()> {
        self.ensure_writable()?;
        self.state
            .borrow_mut()
            .additions
            .push(Addition::Provider(Rc::new(provider)));
        self.emit(ChangeKind::ProviderAttached);
        Ok(())
    }

    /// Compute the explicit value lazily from a provider
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn set_provider(
        &self,
        provider: impl Fn() -> CellResult<Mapping<K, V>> + 'static,
    ) -> CellResult<()> {
        self.ensure_writable()?;
        self.state
            .borrow_mut()
            .install(Source::Provider(Rc::new(provider)));
        self.emit(ChangeKind::ProviderAttached);
        Ok(())
    }

    /// Value used while the cell is unset
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn set_convention(&self, convention: Mapping<K, V>) -> CellResult<()> {
        self.install_convention(Source::Fixed(convention))
    }

    /// Lazily computed value used while the cell is unset
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn set_convention_provider(
        &self,
        provider: impl Fn() -> CellResult<Mapping<K, V>> + 'static,
    ) -> CellResult<()> {
        self.install_convention(Source::Provider(Rc::new(provider)))
    }

    fn install_convention(&self, source: Source<K, V>) -> CellResult<()> {
        self.ensure_writable()?;
        self.state.borrow_mut().convention = Some(source);
        self.emit(ChangeKind::ConventionChanged);
        Ok(())
    }

    /// Drop the explicit value and pending additions so the convention applies
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn unset(&self) -> CellResult<()> {
        self.ensure_writable()?;
        {
            let mut state = self.state.borrow_mut();
            state.value = ValueState::Unset;
            state.additions.clear();
        }
        self.emit(ChangeKind::Unset);
        Ok(())
    }

    /// Reset to the explicit empty mapping, ignoring any convention
    ///
    /// # Errors
    /// Fails when the cell is locked.
    pub fn clear(&self) -> CellResult<()> {
        self.ensure_writable()?;
        self.state
            .borrow_mut()
            .install(Source::Fixed(Mapping::new()));
        self.emit(ChangeKind::Cleared);
        Ok(())
    }

    /// Resolve now and freeze the result
    ///
    /// Calling this on an already final cell does nothing.
    ///
    /// # Errors
    /// Any resolution failure; the cell stays unfrozen in that case.
    pub fn finalize_value(&self) -> CellResult<()> {
        if self.write_lock() == WriteLock::Finalized {
            return Ok(());
        }
        let value = {
            let _guard = EvaluationGuard::enter(&self.resolving, self.name())?;
            self.evaluate()?
        };
        self.freeze(value);
        Ok(())
    }

    /// Refuse further writes while keeping the value lazy
    pub fn disallow_changes(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.lock != WriteLock::Open {
                return;
            }
            state.lock = WriteLock::Disallowed;
        }
        self.emit(ChangeKind::ChangesDisallowed);
    }

    fn freeze(&self, value: Mapping<K, V>) {
        {
            let mut state = self.state.borrow_mut();
            state.install(Source::Fixed(value));
            state.convention = None;
            state.lock = WriteLock::Finalized;
        }
        self.emit(ChangeKind::Finalized);
    }

    /// Register a listener called after every accepted write
    pub fn subscribe(&self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Retained change events, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<ChangeEvent> {
        self.history.borrow().events()
    }

    /// Number of changes ever recorded
    #[must_use]
    pub fn change_count(&self) -> u64 {
        self.history.borrow().total()
    }

    fn emit(&self, kind: ChangeKind) {
        let event = self.history.borrow_mut().record(self.name(), kind);
        tracing::debug!(
            cell = %event.cell,
            sequence = event.sequence,
            change = ?event.kind,
            "map cell changed"
        );

        // Listeners may read or write this cell; no borrow is held while they run.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    fn ensure_writable(&self) -> CellResult<()> {
        let cell = self.name().to_string();
        let err = match self.write_lock() {
            WriteLock::Open => return Ok(()),
            WriteLock::Disallowed => CellError::ChangesDisallowed { cell },
            WriteLock::Finalized => CellError::Finalized { cell },
        };
        tracing::warn!(cell = %self.name(), error = %err, "write refused");
        Err(err)
    }

    fn validate(&self, mapping: &Mapping<K, V>) -> CellResult<()> {
        self.check_limit(mapping)?;
        self.validate_entries(mapping)
    }

    fn check_limit(&self, mapping: &Mapping<K, V>) -> CellResult<()> {
        match self.config.max_entries {
            Some(max) if mapping.len() > max => Err(self.reject(format!(
                "{} entries exceed the limit of {max}",
                mapping.len()
            ))),
            _ => Ok(()),
        }
    }

    fn validate_entries(&self, mapping: &Mapping<K, V>) -> CellResult<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        for (key, value) in mapping {
            validator(key, value).map_err(|reason| self.reject(format!("{key:?}: {reason}")))?;
        }
        Ok(())
    }

    fn reject(&self, reason: String) -> CellError {
        tracing::warn!(cell = %self.name(), %reason, "value rejected");
        CellError::rejected(self.name(), reason)
    }

    fn merge_error(&self, source: mapcell_merge::MergeError) -> CellError {
        tracing::warn!(cell = %self.name(), error = %source, "merge failed");
        CellError::Merge {
            cell: self.name().to_string(),
            source,
        }
    }
}

impl<K, V> DeferredMapCell<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Combine + Clone + 'static,
{
    /// Create cell honouring every merge kind, including additive
    #[must_use]
    pub fn from_config(config: CellConfig) -> Self {
        let merge = config.merge.strategy();
        Self::build(config, merge)
    }
}

impl<K, V> MapCell for DeferredMapCell<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    type Key = K;
    type Value = V;
    type Error = CellError;

    fn resolve(&self) -> CellResult<Mapping<K, V>> {
        DeferredMapCell::resolve(self)
    }

    fn replace(&self, mapping: Mapping<K, V>) -> CellResult<()> {
        DeferredMapCell::replace(self, mapping)
    }

    fn put_all(&self, entries: Mapping<K, V>) -> CellResult<()> {
        DeferredMapCell::put_all(self, entries)
    }

    fn clear(&self) -> CellResult<()> {
        DeferredMapCell::clear(self)
    }
}

impl<K, V> Debug for DeferredMapCell<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.try_borrow();
        f.debug_struct("DeferredMapCell")
            .field("name", &self.config.display_name)
            .field("merge", &self.merge.name())
            .field("lock", &state.as_ref().map(|s| s.lock).ok())
            .field(
                "pending",
                &state.as_ref().map(|s| s.additions.len()).ok(),
            )
            .finish_non_exhaustive()
    }
}

/// Marks a cell as being evaluated; entering twice is a cycle
struct EvaluationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> EvaluationGuard<'a> {
    fn enter(flag: &'a Cell<bool>, cell: &str) -> CellResult<Self> {
        if flag.replace(true) {
            return Err(CellError::Circular {
                cell: cell.to_string(),
            });
        }
        Ok(Self { flag })
    }
}

impl Drop for EvaluationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
