// Copyright 2025 Cowboy AI, LLC.

//! Category-aware operation overlay
//!
//! [`Operations`] is the seam: [`DefaultOperations`] is plain column
//! arithmetic, [`CategoryOverlay`] wraps any other implementation and
//! redefines add, apply and merge for categorical inputs. The overlay is a
//! value owned by whoever uses it, so it is visible only where it is passed
//! and overlays stack by wrapping.
//!
//! Adding two aligned categorical columns evaluates each distinct
//! `(lhs, rhs)` category pair once and broadcasts the results back to the
//! rows, so the work is bounded by `k1 * k2` rather than by the row count.

use indexmap::IndexMap;
use tracing::debug;

use crate::column::{CastTarget, Column};
use crate::config::MixedDomainPolicy;
use crate::dataset::{Dataset, MergeOptions, Series};
use crate::dtype::{CategoryDomain, DomainKind};
use crate::errors::{CatError, CatResult};
use crate::unify::unify_all_datasets;
use crate::value::Value;

/// Right-hand side of an addition
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// Another column with its row index
    Series(Series<'a>),
    /// A string literal
    Str(&'a str),
    /// Any other literal
    Scalar(Value),
}

/// Column and dataset operations whose meaning an overlay may redefine
pub trait Operations {
    /// Element-wise addition
    fn add(&self, lhs: Series<'_>, rhs: Operand<'_>) -> CatResult<Column>;

    /// Map every value through `func`
    fn apply(&self, column: &Column, func: &dyn Fn(&Value) -> Value) -> CatResult<Column>;

    /// Equi-join two datasets
    fn merge(&self, left: &Dataset, right: &Dataset, options: &MergeOptions)
        -> CatResult<Dataset>;
}

/// Plain semantics: categorical inputs are treated as their decoded values
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOperations;

impl Operations for DefaultOperations {
    fn add(&self, lhs: Series<'_>, rhs: Operand<'_>) -> CatResult<Column> {
        let left = lhs.column().values();
        let sums = match rhs {
            Operand::Series(rhs) => {
                if !lhs.is_aligned_with(&rhs) {
                    return Err(CatError::unsupported(format!(
                        "{} and {} do not share a row index",
                        lhs.column().name(),
                        rhs.column().name()
                    )));
                }
                left.iter()
                    .zip(rhs.column().values())
                    .map(|(a, b)| add_values(a, &b))
                    .collect::<CatResult<Vec<_>>>()?
            }
            Operand::Str(s) => {
                let s = Value::Str(s.to_string());
                left.iter()
                    .map(|a| add_values(a, &s))
                    .collect::<CatResult<Vec<_>>>()?
            }
            Operand::Scalar(v) => left
                .iter()
                .map(|a| add_values(a, &v))
                .collect::<CatResult<Vec<_>>>()?,
        };
        Ok(Column::from_values(lhs.column().name(), sums))
    }

    fn apply(&self, column: &Column, func: &dyn Fn(&Value) -> Value) -> CatResult<Column> {
        let mapped = column
            .values()
            .iter()
            .map(|v| if v.is_null() { Value::Null } else { func(v) })
            .collect();
        Ok(Column::from_values(column.name(), mapped))
    }

    fn merge(
        &self,
        left: &Dataset,
        right: &Dataset,
        options: &MergeOptions,
    ) -> CatResult<Dataset> {
        left.merge(right, options)
    }
}

/// Plain addition of two values: numbers add, strings concatenate, nulls propagate
fn add_values(a: &Value, b: &Value) -> CatResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(x), Value::Int(y)) => x
            .checked_add(*y)
            .map(Value::Int)
            .ok_or_else(|| CatError::invalid_operation(format!("{x} + {y} overflows"))),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(a.as_f64().unwrap_or_default() + b.as_f64().unwrap_or_default()))
        }
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
        _ => Err(CatError::unsupported(format!(
            "cannot add {} and {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

/// Addition of two categories: numbers add, an integer meeting a string is
/// stringified first, strings concatenate
pub fn add_categories(a: &Value, b: &Value) -> CatResult<Value> {
    match (a, b) {
        (Value::Int(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
        (Value::Str(x), Value::Int(y)) => Ok(Value::Str(format!("{x}{y}"))),
        (Value::Float(_), Value::Str(_)) | (Value::Str(_), Value::Float(_)) => {
            Err(CatError::unsupported(format!(
                "cannot add {} and {} categories",
                a.kind_name(),
                b.kind_name()
            )))
        }
        _ => add_values(a, b),
    }
}

/// Append a string literal to every category; only string and integer
/// categories may be stringified
fn append_suffix(column: &Column, suffix: &str) -> CatResult<Column> {
    let kind = column.domain().map(CategoryDomain::kind);
    match kind {
        Some(DomainKind::String | DomainKind::Integer | DomainKind::Empty) => {
            column.rename_categories(|c| Value::Str(format!("{c}{suffix}")))
        }
        _ => Err(CatError::unsupported(format!(
            "categorical {} of {} categories plus str literal",
            column.name(),
            kind.map(|k| k.to_string()).unwrap_or_else(|| column.dtype().to_string())
        ))),
    }
}

/// Result of [`combine_pairs`]
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseResult {
    /// Row-aligned categorical result
    pub column: Column,
    /// Number of distinct `(lhs, rhs)` pairs evaluated
    pub distinct_pairs: usize,
}

/// Combine two row-aligned categorical columns one distinct code pair at a time.
///
/// Rows are reduced to their distinct `(lhs, rhs)` code pairs, `combine` runs
/// once per pair with both sides present, and the results are broadcast back
/// to every row. Pairs with a null side produce null without calling
/// `combine`. The result is categorical over the sorted distinct results and
/// takes the name of `lhs`.
pub fn combine_pairs<F>(lhs: &Column, rhs: &Column, mut combine: F) -> CatResult<PairwiseResult>
where
    F: FnMut(&Value, &Value) -> CatResult<Value>,
{
    let (Some(lhs_codes), Some(rhs_codes)) = (lhs.codes(), rhs.codes()) else {
        return Err(CatError::unsupported("pairwise addition needs two categorical columns"));
    };
    let (Some(lhs_domain), Some(rhs_domain)) = (lhs.domain(), rhs.domain()) else {
        return Err(CatError::unsupported("pairwise addition needs two categorical columns"));
    };
    if lhs_codes.len() != rhs_codes.len() {
        return Err(CatError::LengthMismatch {
            expected: lhs_codes.len(),
            actual: rhs_codes.len(),
        });
    }

    let mut pairs: IndexMap<(Option<u32>, Option<u32>), usize> = IndexMap::new();
    let row_pairs: Vec<usize> = lhs_codes
        .iter()
        .zip(rhs_codes)
        .map(|(l, r)| {
            let next = pairs.len();
            *pairs.entry((*l, *r)).or_insert(next)
        })
        .collect();

    let mut results = Vec::with_capacity(pairs.len());
    for (l, r) in pairs.keys() {
        let a = l.and_then(|c| lhs_domain.category(c));
        let b = r.and_then(|c| rhs_domain.category(c));
        results.push(match (a, b) {
            (Some(a), Some(b)) => combine(a, b)?,
            _ => Value::Null,
        });
    }

    let domain = CategoryDomain::sorted_from(results.iter().cloned());
    let pair_codes: Vec<Option<u32>> = results.iter().map(|v| domain.code_of(v)).collect();
    let codes = row_pairs.iter().map(|&p| pair_codes[p]).collect();

    debug!(
        rows = row_pairs.len(),
        distinct_pairs = pairs.len(),
        column = lhs.name(),
        "combined categorical pairs"
    );
    Ok(PairwiseResult {
        column: Column::categorical_from_codes(lhs.name(), domain, codes)?,
        distinct_pairs: pairs.len(),
    })
}

/// Category-aware semantics layered over another [`Operations`]
#[derive(Debug, Clone, Default)]
pub struct CategoryOverlay<O = DefaultOperations> {
    base: O,
    policy: MixedDomainPolicy,
}

impl<O: Operations> CategoryOverlay<O> {
    /// Overlay `base`, unifying merges with `policy`
    pub fn new(base: O, policy: MixedDomainPolicy) -> Self {
        Self { base, policy }
    }
}

impl<O: Operations> Operations for CategoryOverlay<O> {
    fn add(&self, lhs: Series<'_>, rhs: Operand<'_>) -> CatResult<Column> {
        let column = lhs.column();
        if !column.is_categorical() {
            return self.base.add(lhs, rhs);
        }
        match rhs {
            Operand::Str(suffix) => append_suffix(column, suffix),
            Operand::Scalar(Value::Str(suffix)) => append_suffix(column, &suffix),
            Operand::Series(other)
                if other.column().is_categorical() && lhs.is_aligned_with(&other) =>
            {
                Ok(combine_pairs(column, other.column(), add_categories)?.column)
            }
            Operand::Series(other) => Err(CatError::unsupported(format!(
                "categorical {} plus {} {}",
                column.name(),
                other.column().dtype(),
                if lhs.is_aligned_with(&other) {
                    "column"
                } else {
                    "column on a different row index"
                }
            ))),
            Operand::Scalar(v) => Err(CatError::unsupported(format!(
                "categorical {} plus {} literal",
                column.name(),
                v.kind_name()
            ))),
        }
    }

    fn apply(&self, column: &Column, func: &dyn Fn(&Value) -> Value) -> CatResult<Column> {
        let result = self.base.apply(column, func)?;
        if column.is_categorical() {
            result.cast(&CastTarget::Categorical)
        } else {
            Ok(result)
        }
    }

    fn merge(
        &self,
        left: &Dataset,
        right: &Dataset,
        options: &MergeOptions,
    ) -> CatResult<Dataset> {
        let (mut left, mut right) = (left.clone(), right.clone());
        unify_all_datasets(&mut [&mut left, &mut right], self.policy)?;
        self.base.merge(&left, &right, options)
    }
}
