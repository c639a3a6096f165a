// Copyright 2025 Cowboy AI, LLC.

//! Category unifier: one shared domain per column name
//!
//! For a column name that is categorical in several datasets, the declared
//! domain of every such column becomes the union of their domains. Rows are
//! recoded, never changed: no observed value can be lost because each
//! dataset's own domain is part of the union.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MixedDomainPolicy;
use crate::dataset::Dataset;
use crate::dtype::{CategoryDomain, DomainKind};
use crate::errors::{CatError, CatResult};
use crate::registry::DatasetRegistry;
use crate::value::Value;

/// Result of unifying one column name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnifyOutcome {
    /// No dataset declares the column as categorical; nothing was done
    EmptyUnificationSet,
    /// Every participating column now declares the same domain
    Unified {
        /// Number of datasets whose column was rewritten
        datasets: usize,
        /// Size of the shared domain
        domain_size: usize,
    },
}

/// Unify `column` across the named datasets of `registry`
pub fn unify(
    registry: &mut DatasetRegistry,
    names: &[String],
    column: &str,
    policy: MixedDomainPolicy,
) -> CatResult<UnifyOutcome> {
    let mut datasets = registry.resolve_many_mut(names)?;
    unify_datasets(&mut datasets, column, policy)
}

/// Unify every column name that is categorical in at least one named dataset
pub fn unify_all(
    registry: &mut DatasetRegistry,
    names: &[String],
    policy: MixedDomainPolicy,
) -> CatResult<IndexMap<String, UnifyOutcome>> {
    let mut datasets = registry.resolve_many_mut(names)?;
    unify_all_datasets(&mut datasets, policy)
}

/// [`unify_all`] over datasets already in hand
pub fn unify_all_datasets(
    datasets: &mut [&mut Dataset],
    policy: MixedDomainPolicy,
) -> CatResult<IndexMap<String, UnifyOutcome>> {
    let names = categorical_column_names(datasets.iter().map(|d| &**d));
    if policy == MixedDomainPolicy::Reject {
        for name in &names {
            check_kinds(datasets, name)?;
        }
    }
    let mut outcomes = IndexMap::with_capacity(names.len());
    for name in names {
        let outcome = unify_datasets(datasets, &name, policy)?;
        outcomes.insert(name, outcome);
    }
    Ok(outcomes)
}

/// Column names that are categorical in any of `datasets`, first-seen order
pub fn categorical_column_names<'a, I>(datasets: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Dataset>,
{
    let mut names: IndexSet<String> = IndexSet::new();
    for dataset in datasets {
        for column in dataset.columns().filter(|c| c.is_categorical()) {
            names.insert(column.name().to_string());
        }
    }
    names.into_iter().collect()
}

/// Unify `column` across `datasets`.
///
/// The shared domain is the first participant's domain followed by each later
/// participant's new categories. Non-categorical columns of the same name are
/// left alone.
pub fn unify_datasets(
    datasets: &mut [&mut Dataset],
    column: &str,
    policy: MixedDomainPolicy,
) -> CatResult<UnifyOutcome> {
    let participants = participant_indices(datasets, column);
    if participants.is_empty() {
        debug!(column, "no categorical column to unify");
        return Ok(UnifyOutcome::EmptyUnificationSet);
    }

    match policy {
        MixedDomainPolicy::Reject => check_kinds(datasets, column)?,
        MixedDomainPolicy::CoerceToString => {
            let kinds = domain_kinds(datasets, column);
            if kinds.len() > 1 {
                debug!(column, ?kinds, "coercing mixed domains to strings");
                for &i in &participants {
                    stringify_categories(datasets[i], column)?;
                }
            }
        }
    }

    let domain = participants
        .iter()
        .filter_map(|&i| datasets[i].column(column).and_then(|c| c.domain()))
        .fold(CategoryDomain::new(), |acc, d| acc.union(d));

    for &i in &participants {
        if let Some(col) = datasets[i].column_mut(column) {
            col.set_domain(domain.clone())?;
        }
    }

    debug!(
        column,
        datasets = participants.len(),
        domain_size = domain.len(),
        "unified categories"
    );
    Ok(UnifyOutcome::Unified {
        datasets: participants.len(),
        domain_size: domain.len(),
    })
}

/// Indices of the datasets in which `column` is categorical
fn participant_indices(datasets: &[&mut Dataset], column: &str) -> Vec<usize> {
    datasets
        .iter()
        .enumerate()
        .filter(|(_, d)| d.column(column).is_some_and(|c| c.is_categorical()))
        .map(|(i, _)| i)
        .collect()
}

/// Non-empty domain kinds declared for `column`
fn domain_kinds(datasets: &[&mut Dataset], column: &str) -> IndexSet<DomainKind> {
    datasets
        .iter()
        .filter_map(|d| d.column(column).and_then(|c| c.domain()))
        .map(CategoryDomain::kind)
        .filter(|k| *k != DomainKind::Empty)
        .collect()
}

/// Fail with `DomainTypeMismatch` when `column` declares more than one kind
fn check_kinds(datasets: &[&mut Dataset], column: &str) -> CatResult<()> {
    let kinds = domain_kinds(datasets, column);
    if kinds.len() > 1 {
        return Err(CatError::DomainTypeMismatch {
            column: column.to_string(),
            kinds: kinds.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(())
}

fn stringify_categories(dataset: &mut Dataset, column: &str) -> CatResult<()> {
    let Some(col) = dataset.column(column) else {
        return Ok(());
    };
    let renamed = col.rename_categories(|v| match v {
        Value::Str(_) => v.clone(),
        other => Value::Str(other.to_string()),
    })?;
    dataset.insert_column(renamed)
}
