// Copyright 2025 Cowboy AI, LLC.

//! Categorical scopes
//!
//! A [`CategoryScope`] manages a set of named datasets in a caller-owned
//! [`DatasetRegistry`]. Entering it converts every string and integer column
//! to categorical, unifies the domains of same-named categorical columns and
//! hands back a [`ScopeGuard`] through which the category-aware operations
//! are reached. Leaving it, explicitly or by dropping the guard, restores the
//! integer columns to the widths they had when the scope was created.
//!
//! Datasets are always looked up by name, so a rebind made while the scope is
//! active is what the exit step restores.
//!
//! ```
//! use cim_catcontext::{configure_registry, CategoryScope, Column, Dataset, ScopeConfig};
//!
//! let df = Dataset::new(vec![Column::from_strs("A", &["a", "b"])]).unwrap();
//! let mut registry = configure_registry([("df", df)]);
//! let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
//! let guard = scope.enter().unwrap();
//! assert!(guard.dataset("df").unwrap().column("A").unwrap().is_categorical());
//! guard.exit().unwrap();
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::classifier::{columns_of, integer_snapshot};
use crate::column::{CastTarget, Column};
use crate::config::ScopeConfig;
use crate::dataset::{Dataset, MergeOptions, Series};
use crate::dtype::DTypeTag;
use crate::errors::{CastBackFailure, CatError, CatResult};
use crate::lifecycle::{Lifecycle, ScopeState, StateTransition};
use crate::overlay::{CategoryOverlay, Operand, Operations};
use crate::registry::DatasetRegistry;
use crate::unify::{unify_all, UnifyOutcome};
use crate::value::{IntKind, Value};

/// Identity of one scope, used to correlate its log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// Create a new random scope ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer width of every integer column, per dataset name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerTypeSnapshot {
    columns: IndexMap<String, IndexMap<String, IntKind>>,
}

impl IntegerTypeSnapshot {
    /// Record the integer columns of the named datasets
    pub fn capture(registry: &DatasetRegistry, names: &[String]) -> CatResult<Self> {
        let mut columns = IndexMap::with_capacity(names.len());
        for name in names {
            columns.insert(name.clone(), integer_snapshot(registry.resolve(name)?));
        }
        Ok(Self { columns })
    }

    /// Recorded width of one column
    pub fn get(&self, dataset: &str, column: &str) -> Option<IntKind> {
        self.columns.get(dataset)?.get(column).copied()
    }

    /// Every `(dataset, columns)` entry in capture order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, IntKind>)> {
        self.columns.iter().map(|(name, cols)| (name.as_str(), cols))
    }

    /// Total number of recorded columns
    pub fn column_count(&self) -> usize {
        self.columns.values().map(IndexMap::len).sum()
    }
}

/// A categorical scope over some datasets of a registry
#[derive(Debug)]
pub struct CategoryScope<'r> {
    id: ScopeId,
    registry: &'r mut DatasetRegistry,
    names: Vec<String>,
    config: ScopeConfig,
    snapshot: IntegerTypeSnapshot,
    lifecycle: Lifecycle<ScopeState>,
    overlay: CategoryOverlay,
}

impl<'r> CategoryScope<'r> {
    /// Create a scope managing `names`.
    ///
    /// The registry must be configured and every name bound. Integer widths
    /// are snapshotted now; duplicate names are managed once.
    pub fn new<I, S>(
        registry: &'r mut DatasetRegistry,
        names: I,
        config: ScopeConfig,
    ) -> CatResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !registry.is_configured() {
            return Err(CatError::GlobalsNotConfigured);
        }
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let snapshot = IntegerTypeSnapshot::capture(registry, &names)?;
        let id = ScopeId::new();
        debug!(
            scope_id = %id,
            datasets = ?names,
            integer_columns = snapshot.column_count(),
            "created categorical scope"
        );
        Ok(Self {
            id,
            registry,
            names,
            overlay: CategoryOverlay::new(Default::default(), config.mixed_domain_policy),
            config,
            snapshot,
            lifecycle: Lifecycle::new(ScopeState::Unentered),
        })
    }

    /// Scope identity
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Managed dataset names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Configuration
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Integer widths captured at construction
    pub fn snapshot(&self) -> &IntegerTypeSnapshot {
        &self.snapshot
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScopeState {
        *self.lifecycle.current()
    }

    /// Transitions so far
    pub fn history(&self) -> &[StateTransition<ScopeState>] {
        self.lifecycle.history()
    }

    /// The registry, for inspection outside the active window
    pub fn registry(&self) -> &DatasetRegistry {
        &*self.registry
    }

    /// Enter the scope.
    ///
    /// Steps run in order over every managed dataset: strings to
    /// categorical, integers to categorical, unification of every
    /// categorical column name, then the optional index reset. If a step
    /// fails the exit steps run before the error is returned.
    pub fn enter(&mut self) -> CatResult<ScopeGuard<'_, 'r>> {
        self.lifecycle.transition_to(ScopeState::Active)?;
        match self.prepare() {
            Ok(outcomes) => {
                info!(
                    scope_id = %self.id,
                    datasets = ?self.names,
                    unified_columns = outcomes.len(),
                    "entered categorical scope"
                );
                Ok(ScopeGuard {
                    scope: self,
                    exited: false,
                })
            }
            Err(err) => {
                error!(scope_id = %self.id, error = %err, "failed to enter categorical scope");
                if let Err(exit_err) = self.finish() {
                    error!(scope_id = %self.id, error = %exit_err, "exit after failed entry");
                }
                Err(err)
            }
        }
    }

    fn prepare(&mut self) -> CatResult<IndexMap<String, UnifyOutcome>> {
        let steps: [fn(DTypeTag) -> bool; 2] = [
            |tag| tag == DTypeTag::String,
            |tag| matches!(tag, DTypeTag::Integer(_)),
        ];
        for selects in steps {
            for name in &self.names {
                let dataset = self.registry.resolve_mut(name)?;
                let targets: IndexMap<String, CastTarget> = columns_of(dataset, selects)
                    .into_iter()
                    .map(|column| (column, CastTarget::Categorical))
                    .collect();
                debug!(
                    scope_id = %self.id,
                    dataset = %name,
                    columns = ?targets.keys().collect::<Vec<_>>(),
                    "categorizing columns"
                );
                dataset.cast_columns(&targets)?;
            }
        }

        let outcomes = unify_all(&mut *self.registry, &self.names, self.config.mixed_domain_policy)?;

        if self.config.reset_index {
            for name in &self.names {
                self.registry.resolve_mut(name)?.reset_index();
            }
        }
        Ok(outcomes)
    }

    fn finish(&mut self) -> CatResult<()> {
        self.lifecycle.transition_to(ScopeState::Exited)?;
        let failures = if self.config.cast_back_integers {
            self.restore_integers()
        } else {
            Vec::new()
        };
        info!(
            scope_id = %self.id,
            cast_back_failures = failures.len(),
            "exited categorical scope"
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CatError::CastBack { failures })
        }
    }

    fn restore_integers(&mut self) -> Vec<CastBackFailure> {
        let mut failures = Vec::new();
        for (name, columns) in self.snapshot.iter() {
            let Ok(dataset) = self.registry.resolve_mut(name) else {
                warn!(
                    scope_id = %self.id,
                    dataset = %name,
                    "dataset no longer bound, integers not restored"
                );
                continue;
            };
            for (column, kind) in columns {
                let Some(current) = dataset.column(column) else {
                    warn!(
                        scope_id = %self.id,
                        dataset = %name,
                        column = %column,
                        "integer column no longer present, not restored"
                    );
                    continue;
                };
                let restored = current
                    .cast(&CastTarget::Integer(*kind))
                    .and_then(|restored| dataset.insert_column(restored));
                if let Err(err) = restored {
                    failures.push(CastBackFailure {
                        dataset: name.to_string(),
                        column: column.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        failures
    }
}

/// Access to an active scope; dropping it exits the scope
#[derive(Debug)]
pub struct ScopeGuard<'s, 'r> {
    scope: &'s mut CategoryScope<'r>,
    exited: bool,
}

impl<'s, 'r> ScopeGuard<'s, 'r> {
    /// Scope identity
    pub fn id(&self) -> ScopeId {
        self.scope.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScopeState {
        self.scope.state()
    }

    /// The operations in force while the scope is active
    pub fn overlay(&self) -> &CategoryOverlay {
        &self.scope.overlay
    }

    /// The registry
    pub fn registry(&self) -> &DatasetRegistry {
        &*self.scope.registry
    }

    /// The registry, mutably
    pub fn registry_mut(&mut self) -> &mut DatasetRegistry {
        &mut *self.scope.registry
    }

    /// Dataset bound to `name`
    pub fn dataset(&self, name: &str) -> CatResult<&Dataset> {
        self.scope.registry.resolve(name)
    }

    /// Mutable dataset bound to `name`
    pub fn dataset_mut(&mut self, name: &str) -> CatResult<&mut Dataset> {
        self.scope.registry.resolve_mut(name)
    }

    /// Bind `name` to another dataset; the exit step restores whatever is bound then
    pub fn rebind(&mut self, name: impl Into<String>, dataset: Dataset) -> Option<Dataset> {
        self.scope.registry.rebind(name, dataset)
    }

    /// Column `column` of dataset `name` with its row index
    pub fn series(&self, name: &str, column: &str) -> CatResult<Series<'_>> {
        let dataset = self.dataset(name)?;
        dataset.series(column).ok_or_else(|| CatError::ColumnNotFound {
            dataset: name.to_string(),
            column: column.to_string(),
        })
    }

    /// Category-aware addition
    pub fn add(&self, lhs: Series<'_>, rhs: Operand<'_>) -> CatResult<Column> {
        self.scope.overlay.add(lhs, rhs)
    }

    /// Add two columns of the same dataset
    pub fn add_columns(&self, name: &str, lhs: &str, rhs: &str) -> CatResult<Column> {
        let rhs = self.series(name, rhs)?;
        self.add(self.series(name, lhs)?, Operand::Series(rhs))
    }

    /// Category-aware element-wise map of one column
    pub fn apply(
        &self,
        name: &str,
        column: &str,
        func: &dyn Fn(&Value) -> Value,
    ) -> CatResult<Column> {
        self.scope.overlay.apply(self.series(name, column)?.column(), func)
    }

    /// Merge two bound datasets.
    ///
    /// Every managed dataset is unified first and the result written back to
    /// the registry, so the merged key columns keep their categorical dtype.
    pub fn merge(&mut self, left: &str, right: &str, options: &MergeOptions) -> CatResult<Dataset> {
        let scope = &mut *self.scope;
        unify_all(&mut *scope.registry, &scope.names, scope.config.mixed_domain_policy)?;
        let left = scope.registry.resolve(left)?;
        let right = scope.registry.resolve(right)?;
        scope.overlay.merge(left, right, options)
    }

    /// Leave the scope, restoring integer columns.
    ///
    /// Every snapshotted column is attempted; failures are reported together
    /// once the scope has reached `Exited`.
    pub fn exit(mut self) -> CatResult<()> {
        self.exited = true;
        self.scope.finish()
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        if let Err(err) = self.scope.finish() {
            error!(scope_id = %self.scope.id, error = %err, "categorical scope exit failed");
        }
    }
}

/// Run `body` inside `scope`, exiting afterwards whatever `body` returns.
///
/// An error from `body` takes precedence over an exit error.
pub fn with_scope<'r, T, F>(scope: &mut CategoryScope<'r>, body: F) -> CatResult<T>
where
    F: FnOnce(&mut ScopeGuard<'_, 'r>) -> CatResult<T>,
{
    let mut guard = scope.enter()?;
    let result = body(&mut guard);
    let exited = guard.exit();
    let value = result?;
    exited?;
    Ok(value)
}
