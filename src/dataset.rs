// Copyright 2025 Cowboy AI, LLC.

//! Datasets: ordered columns sharing a row index
//!
//! A [`Dataset`] is the table this crate harmonizes. Besides column access
//! it provides the storage primitives the scope relies on: bulk casts, index
//! reset and an equi-join.

use crate::column::{CastTarget, Column};
use crate::dtype::DType;
use crate::errors::{CatError, CatResult};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row labels of a dataset
pub type RowIndex = Vec<i64>;

/// A dense `0..n` index
pub fn default_index(n: usize) -> RowIndex {
    (0..n as i64).collect()
}

/// A column seen together with the row index of its dataset
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    column: &'a Column,
    index: &'a [i64],
}

impl<'a> Series<'a> {
    /// Pair a column with row labels
    pub fn new(column: &'a Column, index: &'a [i64]) -> Self {
        Self { column, index }
    }

    /// The column
    pub fn column(&self) -> &'a Column {
        self.column
    }

    /// The row labels
    pub fn index(&self) -> &'a [i64] {
        self.index
    }

    /// Whether both series carry the same row labels in the same order
    pub fn is_aligned_with(&self, other: &Series<'_>) -> bool {
        self.index == other.index && self.column.len() == other.column.len()
    }
}

/// Join flavour for [`Dataset::merge`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// Matching rows only
    #[default]
    Inner,
    /// Every left row
    Left,
    /// Every right row
    Right,
    /// Every row of both sides
    Outer,
}

/// Options for [`Dataset::merge`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Key columns, present on both sides
    pub on: Vec<String>,
    /// Join flavour
    pub how: JoinKind,
    /// Suffixes for non-key columns present on both sides
    pub suffixes: (String, String),
}

impl MergeOptions {
    /// Inner join on the given keys
    pub fn on<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            on: keys.into_iter().map(Into::into).collect(),
            how: JoinKind::Inner,
            suffixes: ("_x".to_string(), "_y".to_string()),
        }
    }

    /// Use another join flavour
    pub fn how(mut self, how: JoinKind) -> Self {
        self.how = how;
        self
    }
}

/// An ordered collection of equally long columns with a row index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: IndexMap<String, Column>,
    index: RowIndex,
}

impl Dataset {
    /// Build a dataset with a default index; all columns must have the same length
    pub fn new(columns: Vec<Column>) -> CatResult<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        let mut dataset = Dataset {
            columns: IndexMap::new(),
            index: default_index(height),
        };
        for column in columns {
            dataset.insert_column(column)?;
        }
        Ok(dataset)
    }

    /// Replace the row index
    pub fn with_index(mut self, index: RowIndex) -> CatResult<Self> {
        if index.len() != self.height() {
            return Err(CatError::LengthMismatch {
                expected: self.height(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Row labels
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    /// Reset the row index to `0..n`, discarding the previous labels
    pub fn reset_index(&mut self) {
        self.index = default_index(self.height());
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Mutable column by name
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Columns in order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Column paired with the row index
    pub fn series(&self, name: &str) -> Option<Series<'_>> {
        self.columns.get(name).map(|c| Series::new(c, &self.index))
    }

    /// Insert a column, replacing any column of the same name in place
    pub fn insert_column(&mut self, column: Column) -> CatResult<()> {
        if column.len() != self.height() {
            return Err(CatError::LengthMismatch {
                expected: self.height(),
                actual: column.len(),
            });
        }
        self.columns.insert(column.name().to_string(), column);
        Ok(())
    }

    /// Remove a column, keeping the order of the others
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(name)
    }

    /// Dtype of every column
    pub fn dtypes(&self) -> IndexMap<String, DType> {
        self.columns
            .iter()
            .map(|(name, c)| (name.clone(), c.dtype()))
            .collect()
    }

    /// Cast several columns at once; nothing is modified if any cast fails
    pub fn cast_columns(&mut self, targets: &IndexMap<String, CastTarget>) -> CatResult<()> {
        let mut cast = Vec::with_capacity(targets.len());
        for (name, target) in targets {
            let column = self.columns.get(name).ok_or_else(|| CatError::ColumnNotFound {
                dataset: String::new(),
                column: name.clone(),
            })?;
            cast.push(column.cast(target)?);
        }
        for column in cast {
            self.columns.insert(column.name().to_string(), column);
        }
        Ok(())
    }

    /// Equi-join with `right` on the key columns of `options`.
    ///
    /// Left row order is preserved and matches follow right row order;
    /// unmatched right rows come last for `Outer`. Null keys never match.
    /// The result has a fresh `0..n` index.
    pub fn merge(&self, right: &Dataset, options: &MergeOptions) -> CatResult<Dataset> {
        for key in &options.on {
            for (side, dataset) in [("left", self), ("right", right)] {
                if !dataset.has_column(key) {
                    return Err(CatError::ColumnNotFound {
                        dataset: side.to_string(),
                        column: key.clone(),
                    });
                }
            }
        }
        if options.on.is_empty() {
            return Err(CatError::invalid_operation("merge requires at least one key"));
        }

        let left_keys = self.key_rows(&options.on);
        let right_keys = right.key_rows(&options.on);
        let mut right_lookup: HashMap<&[Value], Vec<usize>> = HashMap::new();
        for (row, key) in right_keys.iter().enumerate() {
            if let Some(key) = key {
                right_lookup.entry(key.as_slice()).or_default().push(row);
            }
        }

        let mut left_rows: Vec<Option<usize>> = Vec::new();
        let mut right_rows: Vec<Option<usize>> = Vec::new();
        match options.how {
            JoinKind::Right => {
                let mut left_lookup: HashMap<&[Value], Vec<usize>> = HashMap::new();
                for (row, key) in left_keys.iter().enumerate() {
                    if let Some(key) = key {
                        left_lookup.entry(key.as_slice()).or_default().push(row);
                    }
                }
                for (r, key) in right_keys.iter().enumerate() {
                    match key.as_ref().and_then(|k| left_lookup.get(k.as_slice())) {
                        Some(matches) => {
                            for &l in matches {
                                left_rows.push(Some(l));
                                right_rows.push(Some(r));
                            }
                        }
                        None => {
                            left_rows.push(None);
                            right_rows.push(Some(r));
                        }
                    }
                }
            }
            how => {
                let mut right_matched = vec![false; right.height()];
                for (l, key) in left_keys.iter().enumerate() {
                    match key.as_ref().and_then(|k| right_lookup.get(k.as_slice())) {
                        Some(matches) => {
                            for &r in matches {
                                right_matched[r] = true;
                                left_rows.push(Some(l));
                                right_rows.push(Some(r));
                            }
                        }
                        None if how != JoinKind::Inner => {
                            left_rows.push(Some(l));
                            right_rows.push(None);
                        }
                        None => {}
                    }
                }
                if how == JoinKind::Outer {
                    for (r, matched) in right_matched.iter().enumerate() {
                        if !matched {
                            left_rows.push(None);
                            right_rows.push(Some(r));
                        }
                    }
                }
            }
        }

        let mut columns = Vec::new();
        for (name, left_col) in &self.columns {
            if options.on.contains(name) {
                let right_col = right.columns.get(name).ok_or_else(|| CatError::ColumnNotFound {
                    dataset: "right".to_string(),
                    column: name.clone(),
                })?;
                columns.push(coalesce_key(left_col, &left_rows, right_col, &right_rows)?);
            } else if right.has_column(name) {
                columns.push(
                    left_col
                        .take(&left_rows)
                        .with_name(format!("{name}{}", options.suffixes.0)),
                );
            } else {
                columns.push(left_col.take(&left_rows));
            }
        }
        for (name, right_col) in &right.columns {
            if options.on.contains(name) {
                continue;
            }
            if self.has_column(name) {
                columns.push(
                    right_col
                        .take(&right_rows)
                        .with_name(format!("{name}{}", options.suffixes.1)),
                );
            } else {
                columns.push(right_col.take(&right_rows));
            }
        }

        let mut merged = Dataset {
            columns: IndexMap::new(),
            index: default_index(left_rows.len()),
        };
        for column in columns {
            merged.insert_column(column)?;
        }
        Ok(merged)
    }

    fn key_rows(&self, keys: &[String]) -> Vec<Option<Vec<Value>>> {
        let key_columns: Vec<&Column> = keys.iter().filter_map(|k| self.column(k)).collect();
        (0..self.height())
            .map(|row| {
                let key: Vec<Value> = key_columns.iter().map(|c| c.value(row)).collect();
                (!key.iter().any(Value::is_null)).then_some(key)
            })
            .collect()
    }
}

/// Key column of a merge: left values, filled from the right where the left
/// side is missing. Keeps the dtype when both sides declare the same one.
fn coalesce_key(
    left: &Column,
    left_rows: &[Option<usize>],
    right: &Column,
    right_rows: &[Option<usize>],
) -> CatResult<Column> {
    let values: Vec<Value> = left_rows
        .iter()
        .zip(right_rows)
        .map(|(l, r)| match (l, r) {
            (Some(l), _) => left.value(*l),
            (None, Some(r)) => right.value(*r),
            (None, None) => Value::Null,
        })
        .collect();
    let (left_dtype, right_dtype) = (left.dtype(), right.dtype());
    if left_dtype != right_dtype {
        return Ok(Column::from_values(left.name(), values));
    }
    let target = match left_dtype {
        DType::Categorical(domain) => CastTarget::CategoricalWith(domain),
        DType::Integer(kind) => CastTarget::Integer(kind),
        DType::String => CastTarget::String,
        DType::Float => CastTarget::Float,
        DType::Boolean | DType::Object => CastTarget::Object,
    };
    let inferred = Column::from_values(left.name(), values);
    if matches!(target, CastTarget::Object) {
        return Ok(inferred);
    }
    inferred.cast(&target)
}
