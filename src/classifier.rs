// Copyright 2025 Cowboy AI, LLC.

//! Type classifier: map dataset columns to coarse dtype tags
//!
//! Pure functions. The scope calls them once to find the columns to
//! categorize and once, filtered to integers, to snapshot original widths
//! before categorization erases them.

use indexmap::IndexMap;

use crate::dataset::Dataset;
use crate::dtype::DTypeTag;
use crate::value::IntKind;

/// Tag of every column, in column order
pub fn classify(dataset: &Dataset) -> IndexMap<String, DTypeTag> {
    dataset
        .columns()
        .map(|c| (c.name().to_string(), c.tag()))
        .collect()
}

/// Names of the columns whose tag satisfies `predicate`
pub fn columns_of<P: Fn(DTypeTag) -> bool>(dataset: &Dataset, predicate: P) -> Vec<String> {
    classify(dataset)
        .into_iter()
        .filter(|(_, tag)| predicate(*tag))
        .map(|(name, _)| name)
        .collect()
}

/// Original integer width of every integer column
pub fn integer_snapshot(dataset: &Dataset) -> IndexMap<String, IntKind> {
    classify(dataset)
        .into_iter()
        .filter_map(|(name, tag)| match tag {
            DTypeTag::Integer(kind) => Some((name, kind)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CastTarget, Column};

    fn mixed() -> Dataset {
        Dataset::new(vec![
            Column::from_strs("A", &["a", "b", "c"]),
            Column::from_ints("B", IntKind::Int64, &[1, 2, 3]),
            Column::from_floats("C", &[1.4, 2.5, 3.6]),
            Column::from_ints("D", IntKind::Int32, &[3, 4, 5]),
            Column::from_strs("E", &["x", "y", "z"])
                .cast(&CastTarget::Categorical)
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_classify_tags_every_column() {
        let tags = classify(&mixed());
        assert_eq!(tags["A"], DTypeTag::String);
        assert_eq!(tags["B"], DTypeTag::Integer(IntKind::Int64));
        assert_eq!(tags["C"], DTypeTag::Other);
        assert_eq!(tags["D"], DTypeTag::Integer(IntKind::Int32));
        assert_eq!(tags["E"], DTypeTag::Categorical);
    }

    #[test]
    fn test_columns_of_filters_in_order() {
        let strings = columns_of(&mixed(), |t| t == DTypeTag::String);
        assert_eq!(strings, vec!["A".to_string()]);
        let ints = columns_of(&mixed(), |t| matches!(t, DTypeTag::Integer(_)));
        assert_eq!(ints, vec!["B".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_integer_snapshot_keeps_widths() {
        let snapshot = integer_snapshot(&mixed());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["D"], IntKind::Int32);
    }
}
