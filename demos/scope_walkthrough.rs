//! Scope Walkthrough
//!
//! Two datasets share a `city` column. Inside a categorical scope both
//! columns carry the same category domain, so the merge keeps the key
//! categorical; integer columns come back at their original width on exit.

use anyhow::Result;
use cim_catcontext::{
    configure_registry, with_scope, CategoryScope, Column, Dataset, IntKind, JoinKind,
    MergeOptions, Operand, ScopeConfig,
};

fn main() -> Result<()> {
    let stores = Dataset::new(vec![
        Column::from_strs("city", &["Austin", "Boise", "Denver"]),
        Column::from_ints("store", IntKind::Int16, &[101, 102, 103]),
    ])?;
    let sales = Dataset::new(vec![
        Column::from_strs("city", &["Boise", "Denver", "Denver", "Reno"]),
        Column::from_floats("amount", &[12.5, 40.0, 7.25, 3.0]),
    ])?;

    let mut registry = configure_registry([("stores", stores), ("sales", sales)]);
    let mut scope =
        CategoryScope::new(&mut registry, ["stores", "sales"], ScopeConfig::default())?;

    println!("=== Categorical Scope Walkthrough ===\n");
    println!(
        "Scope {} snapshotted {} integer column(s)",
        scope.id(),
        scope.snapshot().column_count()
    );

    let merged = with_scope(&mut scope, |guard| {
        for name in ["stores", "sales"] {
            let dataset = guard.dataset(name)?;
            println!("\n{name}:");
            for (column, dtype) in dataset.dtypes() {
                println!("   {column}: {dtype}");
            }
        }

        let labelled = guard.add(guard.series("stores", "city")?, Operand::Str("-TX"))?;
        println!("\ncity + \"-TX\": {:?}", labelled.values());

        let merged = guard.merge(
            "stores",
            "sales",
            &MergeOptions::on(["city"]).how(JoinKind::Outer),
        )?;
        Ok(merged)
    })?;

    println!("\nmerged ({} rows):", merged.height());
    for (column, dtype) in merged.dtypes() {
        println!("   {column}: {dtype}");
    }

    println!("\nAfter exit: {:?}", scope.state());
    let store = registry.resolve("stores")?.column("store").map(|c| c.dtype());
    println!("stores.store dtype restored to {store:?}");
    Ok(())
}
