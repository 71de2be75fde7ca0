// ABOUTME: Criterion benchmarks for shopping list aggregation and rendering
// ABOUTME: Measures grouping and report formatting across cart sizes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for shopping list generation.
//!
//! Carts are synthesized with a fixed pool of ingredients so that larger
//! carts produce heavier grouping rather than more output lines.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use foodgram_server::models::ShoppingItem;
use foodgram_server::services::shopping_list::{aggregate, build_report, render};

const UNITS: [&str; 4] = ["g", "ml", "pcs", "tbsp"];

fn synthetic_cart(recipes: usize, lines_per_recipe: usize, distinct: usize) -> Vec<ShoppingItem> {
    (0..recipes * lines_per_recipe)
        .map(|i| {
            let ingredient = (i * 7) % distinct;
            ShoppingItem {
                name: format!("ingredient {ingredient}"),
                measurement_unit: UNITS[ingredient % UNITS.len()].to_owned(),
                amount: i64::try_from(i % 500).unwrap_or(0) + 1,
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("shopping_list_aggregate");

    for recipes in [1usize, 10, 100] {
        let items = synthetic_cart(recipes, 12, 200);
        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(recipes), &items, |b, items| {
            b.iter(|| aggregate(black_box(items)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let lines = aggregate(&synthetic_cart(100, 12, 200));
    c.bench_function("shopping_list_render_200_lines", |b| {
        b.iter(|| render(black_box(&lines)));
    });
}

fn bench_full_report(c: &mut Criterion) {
    let items = synthetic_cart(50, 12, 200);
    c.bench_function("shopping_list_build_report_50_recipes", |b| {
        b.iter(|| build_report(black_box(&items)));
    });
}

criterion_group!(benches, bench_aggregate, bench_render, bench_full_report);
criterion_main!(benches);
