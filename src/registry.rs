// Copyright 2025 Cowboy AI, LLC.

//! Dataset handles: a caller-owned table of named datasets
//!
//! The scope never caches a dataset. Every access goes through the name, so a
//! caller that rebinds a name while a scope is active is seen on the next
//! access, including the integer restoration at exit.

use crate::dataset::Dataset;
use crate::errors::{CatError, CatResult};
use indexmap::IndexMap;

/// Name → dataset bindings consulted by a scope
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    bindings: IndexMap<String, Dataset>,
    configured: bool,
}

/// Build a configured registry from `(name, dataset)` pairs
pub fn configure_registry<I, S>(mapping: I) -> DatasetRegistry
where
    I: IntoIterator<Item = (S, Dataset)>,
    S: Into<String>,
{
    let mut registry = DatasetRegistry::new();
    registry.configure(mapping);
    registry
}

impl DatasetRegistry {
    /// An unconfigured registry; scopes refuse to use it until configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Install bindings and mark the registry configured
    pub fn configure<I, S>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (S, Dataset)>,
        S: Into<String>,
    {
        self.bindings
            .extend(mapping.into_iter().map(|(name, ds)| (name.into(), ds)));
        self.configured = true;
    }

    /// Whether `configure` (or `bind`) has been called
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Bind one dataset, configuring the registry if needed
    pub fn bind(&mut self, name: impl Into<String>, dataset: Dataset) {
        self.bindings.insert(name.into(), dataset);
        self.configured = true;
    }

    /// Dataset bound to `name`
    pub fn resolve(&self, name: &str) -> CatResult<&Dataset> {
        self.bindings
            .get(name)
            .ok_or_else(|| CatError::NotFound(name.to_string()))
    }

    /// Mutable dataset bound to `name`
    pub fn resolve_mut(&mut self, name: &str) -> CatResult<&mut Dataset> {
        self.bindings
            .get_mut(name)
            .ok_or_else(|| CatError::NotFound(name.to_string()))
    }

    /// Mutable datasets for several names, in the order of `names`
    pub fn resolve_many_mut(&mut self, names: &[String]) -> CatResult<Vec<&mut Dataset>> {
        if let Some(missing) = names.iter().find(|n| !self.bindings.contains_key(n.as_str())) {
            return Err(CatError::NotFound(missing.clone()));
        }
        let mut found: Vec<(usize, &mut Dataset)> = self
            .bindings
            .iter_mut()
            .filter_map(|(name, ds)| names.iter().position(|n| n == name).map(|pos| (pos, ds)))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        Ok(found.into_iter().map(|(_, ds)| ds).collect())
    }

    /// Replace the dataset bound to `name`, returning the previous one
    pub fn rebind(&mut self, name: impl Into<String>, dataset: Dataset) -> Option<Dataset> {
        self.bindings.insert(name.into(), dataset)
    }

    /// Remove a binding
    pub fn unbind(&mut self, name: &str) -> Option<Dataset> {
        self.bindings.shift_remove(name)
    }

    /// Whether `name` is bound
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names in binding order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
