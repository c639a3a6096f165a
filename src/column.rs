// Copyright 2025 Cowboy AI, LLC.

//! Typed columns and their categorical encoding
//!
//! A categorical column stores one optional `u32` code per row pointing into
//! its [`CategoryDomain`]. Rewriting the domain recodes the rows; the decoded
//! values and their order never change.

use crate::dtype::{CategoryDomain, DType, DTypeTag};
use crate::errors::{CatError, CatResult};
use crate::value::{IntKind, Value};

/// Physical storage of a categorical column
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalData {
    domain: CategoryDomain,
    codes: Vec<Option<u32>>,
}

impl CategoricalData {
    /// Encode `values` against `domain`; every non-null value must be a category
    pub fn encode(values: &[Value], domain: CategoryDomain) -> Result<Self, Value> {
        let codes = values
            .iter()
            .map(|v| {
                if v.is_null() {
                    Ok(None)
                } else {
                    domain.code_of(v).map(Some).ok_or_else(|| v.clone())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { domain, codes })
    }

    /// Declared domain
    pub fn domain(&self) -> &CategoryDomain {
        &self.domain
    }

    /// One code per row
    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    fn decode(&self, code: Option<u32>) -> Value {
        code.and_then(|c| self.domain.category(c))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Column storage by physical type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Text
    String(Vec<Option<String>>),
    /// Integers of one width
    Integer(IntKind, Vec<Option<i64>>),
    /// Floats
    Float(Vec<Option<f64>>),
    /// Booleans
    Boolean(Vec<Option<bool>>),
    /// Heterogeneous values
    Object(Vec<Value>),
    /// Codes into a category domain
    Categorical(CategoricalData),
}

/// Target of [`Column::cast`]
#[derive(Debug, Clone, PartialEq)]
pub enum CastTarget {
    /// Categorical with a fresh domain: the sorted distinct observed values
    Categorical,
    /// Categorical with the given domain
    CategoricalWith(CategoryDomain),
    /// Integer of a given width
    Integer(IntKind),
    /// Text
    String,
    /// Float
    Float,
    /// Heterogeneous values
    Object,
}

impl CastTarget {
    fn name(&self) -> String {
        match self {
            CastTarget::Categorical | CastTarget::CategoricalWith(_) => "category".to_string(),
            CastTarget::Integer(kind) => kind.name().to_string(),
            CastTarget::String => "string".to_string(),
            CastTarget::Float => "float64".to_string(),
            CastTarget::Object => "object".to_string(),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column from raw storage
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Text column without nulls
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        let data = values.iter().map(|s| Some((*s).to_string())).collect();
        Self::new(name, ColumnData::String(data))
    }

    /// Integer column of the given width without nulls
    pub fn from_ints(name: impl Into<String>, kind: IntKind, values: &[i64]) -> Self {
        Self::new(name, ColumnData::Integer(kind, values.iter().copied().map(Some).collect()))
    }

    /// Float column without nulls
    pub fn from_floats(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, ColumnData::Float(values.iter().copied().map(Some).collect()))
    }

    /// Column whose dtype is inferred from the values.
    ///
    /// Nulls are ignored for inference. All integers give `int64`, integers
    /// mixed with floats give `float64`, all strings give `string`, all
    /// booleans give `bool`; anything else is `object`.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        let (mut ints, mut floats, mut strs, mut bools) = (0, 0, 0, 0);
        for v in &values {
            match v {
                Value::Null => {}
                Value::Int(_) => ints += 1,
                Value::Float(_) => floats += 1,
                Value::Str(_) => strs += 1,
                Value::Bool(_) => bools += 1,
            }
        }
        let non_null = ints + floats + strs + bools;
        let data = if non_null == 0 {
            ColumnData::Object(values)
        } else if ints == non_null {
            ColumnData::Integer(IntKind::Int64, values.iter().map(Value::as_int).collect())
        } else if ints + floats == non_null {
            ColumnData::Float(values.iter().map(Value::as_f64).collect())
        } else if strs == non_null {
            ColumnData::String(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::Str(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )
        } else if bools == non_null {
            ColumnData::Boolean(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            ColumnData::Object(values)
        };
        Self::new(name, data)
    }

    /// Categorical column with a fresh (sorted) domain
    pub fn categorical(name: impl Into<String>, values: Vec<Value>) -> Self {
        let domain = CategoryDomain::sorted_from(values.iter().cloned());
        let codes = values.iter().map(|v| domain.code_of(v)).collect();
        Self::new(name, ColumnData::Categorical(CategoricalData { domain, codes }))
    }

    /// Categorical column over an explicit domain
    pub fn categorical_with(
        name: impl Into<String>,
        values: Vec<Value>,
        domain: CategoryDomain,
    ) -> CatResult<Self> {
        let name = name.into();
        let encoded = CategoricalData::encode(&values, domain).map_err(|missing| {
            CatError::InvalidCast {
                column: name.clone(),
                from: "values".to_string(),
                to: "category".to_string(),
                reason: format!("{missing} is not a category of the domain"),
            }
        })?;
        Ok(Self::new(name, ColumnData::Categorical(encoded)))
    }

    /// Categorical column from precomputed codes; every code must index `domain`
    pub fn categorical_from_codes(
        name: impl Into<String>,
        domain: CategoryDomain,
        codes: Vec<Option<u32>>,
    ) -> CatResult<Self> {
        let name = name.into();
        if let Some(bad) = codes.iter().flatten().find(|c| **c as usize >= domain.len()) {
            return Err(CatError::invalid_operation(format!(
                "code {bad} out of range for a domain of {} in column {name}",
                domain.len()
            )));
        }
        Ok(Self::new(
            name,
            ColumnData::Categorical(CategoricalData { domain, codes }),
        ))
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same column under another name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Raw storage
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::String(v) => v.len(),
            ColumnData::Integer(_, v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Object(v) => v.len(),
            ColumnData::Categorical(c) => c.codes.len(),
        }
    }

    /// True when the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full dtype
    pub fn dtype(&self) -> DType {
        match &self.data {
            ColumnData::String(_) => DType::String,
            ColumnData::Integer(kind, _) => DType::Integer(*kind),
            ColumnData::Float(_) => DType::Float,
            ColumnData::Boolean(_) => DType::Boolean,
            ColumnData::Object(_) => DType::Object,
            ColumnData::Categorical(c) => DType::Categorical(c.domain.clone()),
        }
    }

    /// Classifier tag, without cloning the domain
    pub fn tag(&self) -> DTypeTag {
        match &self.data {
            ColumnData::String(_) => DTypeTag::String,
            ColumnData::Integer(kind, _) => DTypeTag::Integer(*kind),
            ColumnData::Categorical(_) => DTypeTag::Categorical,
            _ => DTypeTag::Other,
        }
    }

    /// Is this column categorical
    pub fn is_categorical(&self) -> bool {
        matches!(self.data, ColumnData::Categorical(_))
    }

    /// Declared domain of a categorical column
    pub fn domain(&self) -> Option<&CategoryDomain> {
        match &self.data {
            ColumnData::Categorical(c) => Some(&c.domain),
            _ => None,
        }
    }

    /// Physical codes of a categorical column
    pub fn codes(&self) -> Option<&[Option<u32>]> {
        match &self.data {
            ColumnData::Categorical(c) => Some(&c.codes),
            _ => None,
        }
    }

    /// Decoded value at `row` (null when out of range)
    pub fn value(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::String(v) => v.get(row).cloned().flatten().into(),
            ColumnData::Integer(_, v) => v.get(row).copied().flatten().into(),
            ColumnData::Float(v) => v.get(row).copied().flatten().into(),
            ColumnData::Boolean(v) => v.get(row).copied().flatten().into(),
            ColumnData::Object(v) => v.get(row).cloned().unwrap_or(Value::Null),
            ColumnData::Categorical(c) => c.decode(c.codes.get(row).copied().flatten()),
        }
    }

    /// All decoded values in row order
    pub fn values(&self) -> Vec<Value> {
        match &self.data {
            ColumnData::Categorical(c) => c.codes.iter().map(|code| c.decode(*code)).collect(),
            _ => (0..self.len()).map(|row| self.value(row)).collect(),
        }
    }

    /// Cast to another dtype; row values are preserved or the cast fails
    pub fn cast(&self, target: &CastTarget) -> CatResult<Column> {
        let values = self.values();
        let fail = |reason: String| CatError::InvalidCast {
            column: self.name.clone(),
            from: self.dtype().name().to_string(),
            to: target.name(),
            reason,
        };
        let data = match target {
            CastTarget::Categorical => {
                let domain = CategoryDomain::sorted_from(values.iter().cloned());
                ColumnData::Categorical(
                    CategoricalData::encode(&values, domain)
                        .map_err(|v| fail(format!("{v} missing from derived domain")))?,
                )
            }
            CastTarget::CategoricalWith(domain) => ColumnData::Categorical(
                CategoricalData::encode(&values, domain.clone())
                    .map_err(|v| fail(format!("{v} is not a category of the domain")))?,
            ),
            CastTarget::Integer(kind) => {
                let ints = values
                    .iter()
                    .map(|v| {
                        if v.is_null() {
                            return Ok(None);
                        }
                        let i = v
                            .to_integer()
                            .ok_or_else(|| fail(format!("{v} is not an integer")))?;
                        if kind.contains(i) {
                            Ok(Some(i))
                        } else {
                            Err(fail(format!("{i} out of range for {kind}")))
                        }
                    })
                    .collect::<CatResult<Vec<_>>>()?;
                ColumnData::Integer(*kind, ints)
            }
            CastTarget::String => ColumnData::String(
                values
                    .iter()
                    .map(|v| (!v.is_null()).then(|| v.to_string()))
                    .collect(),
            ),
            CastTarget::Float => ColumnData::Float(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Str(s) => s
                            .trim()
                            .parse()
                            .map(Some)
                            .map_err(|_| fail(format!("{s} is not a number"))),
                        other => other
                            .as_f64()
                            .map(Some)
                            .ok_or_else(|| fail(format!("{other} is not a number"))),
                    })
                    .collect::<CatResult<Vec<_>>>()?,
            ),
            CastTarget::Object => ColumnData::Object(values),
        };
        Ok(Column::new(self.name.clone(), data))
    }

    /// Replace the declared domain of a categorical column.
    ///
    /// Rows are recoded against `domain`; every observed value must be a
    /// category of it. Non-categorical columns are rejected.
    pub fn set_domain(&mut self, domain: CategoryDomain) -> CatResult<()> {
        if !self.is_categorical() {
            return Err(CatError::invalid_operation(format!(
                "column {} is {}, not category",
                self.name,
                self.dtype()
            )));
        }
        let recoded = self.cast(&CastTarget::CategoricalWith(domain))?;
        self.data = recoded.data;
        Ok(())
    }

    /// Transform the domain of a categorical column, leaving codes pointing at
    /// the transformed entries. Categories that collide after `f` are merged.
    pub fn rename_categories<F: FnMut(&Value) -> Value>(&self, mut f: F) -> CatResult<Column> {
        let ColumnData::Categorical(cat) = &self.data else {
            return Err(CatError::invalid_operation(format!(
                "column {} is not categorical",
                self.name
            )));
        };
        let renamed: Vec<Value> = cat.domain.iter().map(&mut f).collect();
        let domain = CategoryDomain::from_values(renamed.iter().cloned());
        let codes = cat
            .codes
            .iter()
            .map(|code| {
                code.and_then(|c| renamed.get(c as usize))
                    .and_then(|v| domain.code_of(v))
            })
            .collect();
        Ok(Column::new(
            self.name.clone(),
            ColumnData::Categorical(CategoricalData { domain, codes }),
        ))
    }

    /// Gather rows; `None` produces a null row
    pub fn take(&self, rows: &[Option<usize>]) -> Column {
        fn gather<T: Clone>(v: &[Option<T>], rows: &[Option<usize>]) -> Vec<Option<T>> {
            rows.iter()
                .map(|r| r.and_then(|i| v.get(i).cloned().flatten()))
                .collect()
        }
        let data = match &self.data {
            ColumnData::String(v) => ColumnData::String(gather(v, rows)),
            ColumnData::Integer(kind, v) => ColumnData::Integer(*kind, gather(v, rows)),
            ColumnData::Float(v) => ColumnData::Float(gather(v, rows)),
            ColumnData::Boolean(v) => ColumnData::Boolean(gather(v, rows)),
            ColumnData::Object(v) => ColumnData::Object(
                rows.iter()
                    .map(|r| r.and_then(|i| v.get(i).cloned()).unwrap_or(Value::Null))
                    .collect(),
            ),
            ColumnData::Categorical(c) => ColumnData::Categorical(CategoricalData {
                domain: c.domain.clone(),
                codes: gather(&c.codes, rows),
            }),
        };
        Column::new(self.name.clone(), data)
    }
}
