//! Common display utilities for CLI commands.

use colored::Colorize;
use crossref::{EntityId, KindCounts, ReferenceGraph};

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print a bulleted list, truncated after `MAX_DISPLAY_ITEMS` entries.
///
/// If `items` is empty, shows the provided `empty_message`.
pub fn print_list(items: &[String], empty_message: &str) {
    if items.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for item in items.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {item}", "•".dimmed());
    }

    if items.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            items.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Display name of an entity, falling back to its handle.
pub fn entity_name(graph: &ReferenceGraph, entity: EntityId) -> String {
    graph
        .entity_display(entity)
        .unwrap_or_else(|| format!("{entity:?}"))
}

/// Render per-kind counts as `call ×2, parameter ×1`.
pub fn format_kinds(kinds: &KindCounts) -> String {
    kinds
        .iter()
        .map(|(kind, count)| format!("{kind} ×{count}"))
        .collect::<Vec<_>>()
        .join(", ")
}
