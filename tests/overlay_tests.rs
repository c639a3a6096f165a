// Copyright 2025 Cowboy AI, LLC.

//! Category-aware operations reached through an active scope

use cim_catcontext::{
    add_categories, combine_pairs, configure_registry, CastTarget, CatError, CategoryDomain,
    CategoryScope, Column, Dataset, DefaultOperations, IntKind, JoinKind, MergeOptions, Operand,
    Operations, ScopeConfig, Value,
};
use pretty_assertions::assert_eq;

fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().map(|s| Value::from(*s)).collect()
}

fn domain_values(column: &Column) -> Vec<Value> {
    column.domain().unwrap().iter().cloned().collect()
}

#[test]
fn test_categorical_plus_string_literal() {
    let mut registry = configure_registry([(
        "df",
        Dataset::new(vec![Column::from_strs("A", &["a", "b", "c", "b"])]).unwrap(),
    )]);
    let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
    let guard = scope.enter().unwrap();
    let out = guard
        .add(guard.series("df", "A").unwrap(), Operand::Str("d"))
        .unwrap();
    assert!(out.is_categorical());
    assert_eq!(out.values(), strs(&["ad", "bd", "cd", "bd"]));
    assert_eq!(domain_values(&out), strs(&["ad", "bd", "cd"]));
}

#[test]
fn test_pairwise_add_of_integer_and_string_categories() {
    let mut registry = configure_registry([(
        "df",
        Dataset::new(vec![
            Column::from_ints("X", IntKind::Int64, &[1, 2, 1]),
            Column::from_strs("Y", &["x", "x", "y"]),
        ])
        .unwrap(),
    )]);
    let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
    let guard = scope.enter().unwrap();
    let out = guard.add_columns("df", "X", "Y").unwrap();
    assert!(out.is_categorical());
    assert_eq!(out.values(), strs(&["1x", "2x", "1y"]));

    let ds = guard.dataset("df").unwrap();
    let (x, y) = (ds.column("X").unwrap(), ds.column("Y").unwrap());
    let result = combine_pairs(x, y, add_categories).unwrap();
    let bound = x.domain().unwrap().len() * y.domain().unwrap().len();
    assert_eq!(result.distinct_pairs, 3);
    assert!(result.distinct_pairs <= bound);
}

#[test]
fn test_categorical_string_add_matches_concat_then_categorize() {
    let frame = Dataset::new(vec![
        Column::from_strs("A", &["a", "b", "c", "a"]),
        Column::from_strs("B", &["d", "e", "f", "d"]),
    ])
    .unwrap();
    let idx: Vec<i64> = (0..4).collect();
    let plain = DefaultOperations
        .add(
            frame.series("A").unwrap(),
            Operand::Series(frame.series("B").unwrap()),
        )
        .unwrap()
        .cast(&CastTarget::Categorical)
        .unwrap();

    let mut registry = configure_registry([("df", frame)]);
    let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
    let guard = scope.enter().unwrap();
    let overlaid = guard.add_columns("df", "A", "B").unwrap();
    assert_eq!(overlaid.values(), plain.values());
    assert_eq!(overlaid.domain(), plain.domain());
    assert_eq!(guard.dataset("df").unwrap().index(), idx.as_slice());
}

#[test]
fn test_merge_unifies_after_apply_changed_a_domain() {
    let mut registry = configure_registry([
        (
            "a",
            Dataset::new(vec![
                Column::from_strs("K", &["a", "b"]),
                Column::from_ints("L", IntKind::Int8, &[1, 2]),
            ])
            .unwrap(),
        ),
        (
            "b",
            Dataset::new(vec![
                Column::from_strs("K", &["b", "c"]),
                Column::from_floats("R", &[0.5, 1.5]),
            ])
            .unwrap(),
        ),
    ]);
    let mut scope = CategoryScope::new(&mut registry, ["a", "b"], ScopeConfig::default()).unwrap();
    let mut guard = scope.enter().unwrap();

    let narrowed = guard.apply("b", "K", &|v| v.clone()).unwrap();
    assert_eq!(domain_values(&narrowed), strs(&["b", "c"]));
    guard.dataset_mut("b").unwrap().insert_column(narrowed).unwrap();

    let merged = guard.merge("a", "b", &MergeOptions::on(["K"])).unwrap();
    let expected = CategoryDomain::from_values(strs(&["a", "b", "c"]));
    for name in ["a", "b"] {
        let k = guard.dataset(name).unwrap().column("K").unwrap();
        assert_eq!(k.domain(), Some(&expected));
    }
    let key = merged.column("K").unwrap();
    assert!(key.is_categorical());
    assert_eq!(key.values(), strs(&["b"]));
    assert_eq!(merged.column("R").unwrap().values(), vec![Value::Float(0.5)]);
}

#[test]
fn test_outer_merge_keeps_categorical_key() {
    let mut registry = configure_registry([
        ("a", Dataset::new(vec![Column::from_strs("K", &["a", "b"])]).unwrap()),
        ("b", Dataset::new(vec![Column::from_strs("K", &["b", "c"])]).unwrap()),
    ]);
    let mut scope = CategoryScope::new(&mut registry, ["a", "b"], ScopeConfig::default()).unwrap();
    let mut guard = scope.enter().unwrap();
    let merged = guard
        .merge("a", "b", &MergeOptions::on(["K"]).how(JoinKind::Outer))
        .unwrap();
    let key = merged.column("K").unwrap();
    assert!(key.is_categorical());
    assert_eq!(key.values(), strs(&["a", "b", "c"]));
}

#[test]
fn test_add_across_datasets_of_different_index_is_unsupported() {
    let mut registry = configure_registry([
        ("a", Dataset::new(vec![Column::from_strs("K", &["a", "b"])]).unwrap()),
        ("b", Dataset::new(vec![Column::from_strs("K", &["c"])]).unwrap()),
    ]);
    let mut scope = CategoryScope::new(&mut registry, ["a", "b"], ScopeConfig::default()).unwrap();
    let guard = scope.enter().unwrap();
    let err = guard
        .add(
            guard.series("a", "K").unwrap(),
            Operand::Series(guard.series("b", "K").unwrap()),
        )
        .unwrap_err();
    assert!(matches!(err, CatError::UnsupportedOperand { .. }));
}

#[test]
fn test_series_lookup_reports_missing_column() {
    let mut registry = configure_registry([(
        "df",
        Dataset::new(vec![Column::from_strs("A", &["a"])]).unwrap(),
    )]);
    let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
    let guard = scope.enter().unwrap();
    let err = guard.series("df", "Z").unwrap_err();
    assert!(matches!(err, CatError::ColumnNotFound { ref column, .. } if column == "Z"));
}

#[test]
fn test_failed_merge_leaves_every_domain_untouched() {
    let mut registry = configure_registry([
        (
            "a",
            Dataset::new(vec![
                Column::from_strs("A", &["a", "a"]),
                Column::from_strs("K", &["x", "y"]),
            ])
            .unwrap(),
        ),
        (
            "b",
            Dataset::new(vec![
                Column::from_strs("A", &["b", "b"]),
                Column::from_strs("K", &["x", "z"]),
            ])
            .unwrap(),
        ),
    ]);
    let mut scope = CategoryScope::new(&mut registry, ["a", "b"], ScopeConfig::default()).unwrap();
    let mut guard = scope.enter().unwrap();

    let narrowed = guard.apply("b", "A", &|v| v.clone()).unwrap();
    guard.dataset_mut("b").unwrap().insert_column(narrowed).unwrap();
    let int_key = Column::categorical("K", vec![Value::Int(1), Value::Int(2)]);
    guard.dataset_mut("b").unwrap().insert_column(int_key).unwrap();

    let err = guard.merge("a", "b", &MergeOptions::on(["K"])).unwrap_err();
    assert!(matches!(err, CatError::DomainTypeMismatch { ref column, .. } if column == "K"));
    let a = guard.dataset("a").unwrap().column("A").unwrap();
    assert_eq!(domain_values(a), strs(&["a", "b"]));
    let b = guard.dataset("b").unwrap().column("A").unwrap();
    assert_eq!(domain_values(b), strs(&["b"]));
}

#[test]
fn test_string_literal_on_float_categories_is_unsupported() {
    let mut registry = configure_registry([(
        "df",
        Dataset::new(vec![Column::from_strs("A", &["1.5", "2.0"])]).unwrap(),
    )]);
    let mut scope = CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
    let mut guard = scope.enter().unwrap();
    let floats = guard
        .apply("df", "A", &|v| {
            Value::Float(v.as_str().and_then(|s| s.parse().ok()).unwrap_or_default())
        })
        .unwrap();
    assert!(floats.is_categorical());
    guard.dataset_mut("df").unwrap().insert_column(floats).unwrap();

    let err = guard
        .add(guard.series("df", "A").unwrap(), Operand::Str("u"))
        .unwrap_err();
    assert!(matches!(err, CatError::UnsupportedOperand { .. }));
    let err = guard
        .add(guard.series("df", "A").unwrap(), Operand::Scalar(Value::from("u")))
        .unwrap_err();
    assert!(matches!(err, CatError::UnsupportedOperand { .. }));
}
