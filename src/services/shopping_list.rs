// ABOUTME: Shopping list aggregation over the ingredients of carted recipes
// ABOUTME: Sums amounts per (name, unit) in first-appearance order and renders a numbered text report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::models::ShoppingItem;

/// One aggregated line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingLine {
    /// Ingredient name as stored
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across carted recipes
    pub total: i64,
}

/// Group items by `(name, measurement_unit)` and sum their amounts
///
/// Groups keep the position of their first item, so the output order is
/// fully determined by the input order.
#[must_use]
pub fn aggregate(items: &[ShoppingItem]) -> Vec<ShoppingLine> {
    let mut lines: Vec<ShoppingLine> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for item in items {
        let key = (item.name.as_str(), item.measurement_unit.as_str());
        if let Some(&pos) = index.get(&key) {
            lines[pos].total += item.amount;
        } else {
            index.insert(key, lines.len());
            lines.push(ShoppingLine {
                name: item.name.clone(),
                measurement_unit: item.measurement_unit.clone(),
                total: item.amount,
            });
        }
    }

    lines
}

/// Render aggregated lines as `"<n>. <Name> (<unit>) — <total>"`, one per line
///
/// An empty list renders as an empty string.
#[must_use]
pub fn render(lines: &[ShoppingLine]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({}) — {}",
            i + 1,
            capitalize_first(&line.name),
            line.measurement_unit,
            line.total
        );
    }
    out
}

/// Aggregate and render in one step
#[must_use]
pub fn build_report(items: &[ShoppingItem]) -> String {
    render(&aggregate(items))
}

/// Upper-case the first character, leaving the rest untouched
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
