// Copyright 2025 Cowboy AI, LLC.

//! Cell values and integer widths
//!
//! `Value` is the decoded form of every cell, whatever the physical column
//! type. It has total equality, hashing and ordering so that it can key a
//! category domain; floats compare by bit pattern.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single decoded cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (all widths are held as i64)
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Str(String),
}

impl Value {
    /// Is this the missing value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Text payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer reading used when restoring integer columns.
    ///
    /// Accepts integers, integral floats within `i64` range and base-10
    /// integer strings (the latter appear when a mixed domain was coerced to
    /// strings).
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Physical integer width and signedness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    /// 8-bit signed
    Int8,
    /// 16-bit signed
    Int16,
    /// 32-bit signed
    Int32,
    /// 64-bit signed
    Int64,
    /// 8-bit unsigned
    UInt8,
    /// 16-bit unsigned
    UInt16,
    /// 32-bit unsigned
    UInt32,
    /// 64-bit unsigned (values above i64::MAX are not representable)
    UInt64,
}

impl IntKind {
    /// Dtype name, as printed in error messages
    pub fn name(&self) -> &'static str {
        match self {
            IntKind::Int8 => "int8",
            IntKind::Int16 => "int16",
            IntKind::Int32 => "int32",
            IntKind::Int64 => "int64",
            IntKind::UInt8 => "uint8",
            IntKind::UInt16 => "uint16",
            IntKind::UInt32 => "uint32",
            IntKind::UInt64 => "uint64",
        }
    }

    /// Inclusive range of values this width can hold
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            IntKind::Int8 => (i8::MIN.into(), i8::MAX.into()),
            IntKind::Int16 => (i16::MIN.into(), i16::MAX.into()),
            IntKind::Int32 => (i32::MIN.into(), i32::MAX.into()),
            IntKind::Int64 => (i64::MIN, i64::MAX),
            IntKind::UInt8 => (0, u8::MAX.into()),
            IntKind::UInt16 => (0, u16::MAX.into()),
            IntKind::UInt32 => (0, u32::MAX.into()),
            IntKind::UInt64 => (0, i64::MAX),
        }
    }

    /// Whether `value` fits this width
    pub fn contains(&self, value: i64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&value)
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_float_values_hash_by_bits() {
        let mut set = HashSet::new();
        set.insert(Value::Float(1.5));
        set.insert(Value::Float(1.5));
        set.insert(Value::Int(1));
        assert_eq!(set.len(), 2);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_ordering_groups_by_kind() {
        let mut values = vec![
            Value::Str("b".into()),
            Value::Int(3),
            Value::Null,
            Value::Str("a".into()),
            Value::Int(-1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Int(-1),
                Value::Int(3),
                Value::Str("a".into()),
                Value::Str("b".into()),
            ]
        );
    }

    #[test]
    fn test_display_is_plain_text() {
        assert_eq!(Value::Str("abc".into()).to_string(), "abc");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
    }

    #[test]
    fn test_to_integer_accepts_integer_strings() {
        assert_eq!(Value::Str("17".into()).to_integer(), Some(17));
        assert_eq!(Value::Float(3.0).to_integer(), Some(3));
        assert_eq!(Value::Float(3.5).to_integer(), None);
        assert_eq!(Value::Str("x".into()).to_integer(), None);
    }

    #[test]
    fn test_to_integer_rejects_floats_outside_i64() {
        assert_eq!(Value::Float(1e19).to_integer(), None);
        assert_eq!(Value::Float(-1e19).to_integer(), None);
        assert_eq!(Value::Float(9_223_372_036_854_775_808.0).to_integer(), None);
        assert_eq!(Value::Float(f64::INFINITY).to_integer(), None);
        assert_eq!(Value::Float(f64::NAN).to_integer(), None);
        assert_eq!(Value::Float(-9_223_372_036_854_775_808.0).to_integer(), Some(i64::MIN));
    }

    #[test]
    fn test_int_kind_bounds() {
        assert!(IntKind::Int8.contains(127));
        assert!(!IntKind::Int8.contains(128));
        assert!(!IntKind::UInt32.contains(-1));
        assert!(IntKind::UInt32.contains(u32::MAX as i64));
        assert_eq!(IntKind::Int32.to_string(), "int32");
    }
}
