// Copyright 2025 Cowboy AI, LLC.

//! Column dtypes and category domains

use crate::value::{IntKind, Value};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared set of valid values of a categorical column.
///
/// Domains are never ordered (`ordered = false`). Insertion order is kept
/// only because the physical codes of a column index into it; equality
/// compares value sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDomain {
    categories: IndexSet<Value>,
}

/// The kind of values a domain holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainKind {
    /// No categories
    Empty,
    /// Only integers
    Integer,
    /// Only floats
    Float,
    /// Only strings
    String,
    /// Only booleans
    Boolean,
    /// More than one kind
    Mixed,
}

impl CategoryDomain {
    /// An empty domain
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a domain from values in first-seen order, dropping nulls and duplicates
    pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
        Self {
            categories: values.into_iter().filter(|v| !v.is_null()).collect(),
        }
    }

    /// Build a domain from values in sorted order, dropping nulls and duplicates
    pub fn sorted_from<I: IntoIterator<Item = Value>>(values: I) -> Self {
        let mut distinct: Vec<Value> = Self::from_values(values).categories.into_iter().collect();
        distinct.sort();
        Self {
            categories: distinct.into_iter().collect(),
        }
    }

    /// Always false: this system never declares ordered categories
    pub fn ordered(&self) -> bool {
        false
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True when the domain has no categories
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Whether `value` is a category of this domain
    pub fn contains(&self, value: &Value) -> bool {
        self.categories.contains(value)
    }

    /// Physical code of `value`
    pub fn code_of(&self, value: &Value) -> Option<u32> {
        self.categories.get_index_of(value).map(|i| i as u32)
    }

    /// Category behind a physical code
    pub fn category(&self, code: u32) -> Option<&Value> {
        self.categories.get_index(code as usize)
    }

    /// Categories in code order
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.categories.iter()
    }

    /// Union with `other`: this domain's order, then `other`'s new values
    pub fn union(&self, other: &CategoryDomain) -> CategoryDomain {
        let mut categories = self.categories.clone();
        categories.extend(other.categories.iter().cloned());
        CategoryDomain { categories }
    }

    /// Map every category through `f`, keeping the first occurrence of collisions
    pub fn map<F: FnMut(&Value) -> Value>(&self, f: F) -> CategoryDomain {
        Self::from_values(self.categories.iter().map(f))
    }

    /// Kind of values held
    pub fn kind(&self) -> DomainKind {
        let mut kind = DomainKind::Empty;
        for value in &self.categories {
            let this = match value {
                Value::Int(_) => DomainKind::Integer,
                Value::Float(_) => DomainKind::Float,
                Value::Str(_) => DomainKind::String,
                Value::Bool(_) => DomainKind::Boolean,
                Value::Null => continue,
            };
            kind = match kind {
                DomainKind::Empty => this,
                k if k == this => k,
                _ => return DomainKind::Mixed,
            };
        }
        kind
    }

    /// Same categories in the same code order
    pub fn same_layout(&self, other: &CategoryDomain) -> bool {
        self.categories.iter().eq(other.categories.iter())
    }
}

impl FromIterator<Value> for CategoryDomain {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Full dtype of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    /// Text
    String,
    /// Integer of a given width
    Integer(IntKind),
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// Heterogeneous values
    Object,
    /// Values drawn from a category domain
    Categorical(CategoryDomain),
}

impl DType {
    /// Dtype name
    pub fn name(&self) -> &'static str {
        match self {
            DType::String => "string",
            DType::Integer(kind) => kind.name(),
            DType::Float => "float64",
            DType::Boolean => "bool",
            DType::Object => "object",
            DType::Categorical(_) => "category",
        }
    }

    /// Classifier tag for this dtype
    pub fn tag(&self) -> DTypeTag {
        match self {
            DType::String => DTypeTag::String,
            DType::Integer(kind) => DTypeTag::Integer(*kind),
            DType::Categorical(_) => DTypeTag::Categorical,
            DType::Float | DType::Boolean | DType::Object => DTypeTag::Other,
        }
    }

    /// Domain of a categorical dtype
    pub fn domain(&self) -> Option<&CategoryDomain> {
        match self {
            DType::Categorical(domain) => Some(domain),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse dtype classification used by the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DTypeTag {
    /// Text column
    String,
    /// Integer column with its original width
    Integer(IntKind),
    /// Categorical column
    Categorical,
    /// Anything else (floats, booleans, objects)
    Other,
}
