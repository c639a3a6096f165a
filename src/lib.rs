// Copyright 2025 Cowboy AI, LLC.

//! # CIM CatContext
//!
//! Scoped categorical harmonization for groups of named datasets.
//!
//! Inside a scope every string and integer column of the managed datasets is
//! categorical, and same-named categorical columns share one category domain,
//! so the datasets can be joined and combined without dtype drift:
//! - **Registry**: caller-owned name → dataset bindings, looked up on every access
//! - **Classifier**: coarse dtype tags for finding the columns to convert
//! - **Unifier**: one union domain per column name across datasets
//! - **Scope**: enter/exit lifecycle with integer width restoration
//! - **Overlay**: category-aware add, apply and merge
//!
//! ## Design Principles
//!
//! 1. **Values, not globals**: the overlay is reached through the scope guard only
//! 2. **Guaranteed exit**: dropping the guard runs the exit steps
//! 3. **Recode, never rewrite**: unification changes domains, not row values
//! 4. **Controlled State**: a scope is entered once and exited once

#![warn(missing_docs)]

mod classifier;
mod column;
mod config;
mod dataset;
mod dtype;
mod errors;
mod lifecycle;
mod overlay;
mod registry;
mod scope;
mod unify;
mod value;

pub use classifier::{classify, columns_of, integer_snapshot};
pub use column::{CastTarget, CategoricalData, Column, ColumnData};
pub use config::{MixedDomainPolicy, ScopeConfig};
pub use dataset::{default_index, Dataset, JoinKind, MergeOptions, RowIndex, Series};
pub use dtype::{CategoryDomain, DType, DTypeTag, DomainKind};
pub use errors::{CastBackFailure, CatError, CatResult};
pub use lifecycle::{Lifecycle, ScopeState, State, StateTransition};
pub use overlay::{
    add_categories, combine_pairs, CategoryOverlay, DefaultOperations, Operand, Operations,
    PairwiseResult,
};
pub use registry::{configure_registry, DatasetRegistry};
pub use scope::{with_scope, CategoryScope, IntegerTypeSnapshot, ScopeGuard, ScopeId};
pub use unify::{
    categorical_column_names, unify, unify_all, unify_all_datasets, unify_datasets, UnifyOutcome,
};
pub use value::{IntKind, Value};
