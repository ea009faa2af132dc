//! `crossref relations` command implementation.

use std::path::Path;

use colored::Colorize;
use crossref::{Error, ResolveOptions};

use super::display::{entity_name, format_kinds};

/// Run the relations command.
///
/// With both `source` and `target`, prints the total between them;
/// otherwise enumerates every non-empty relation.
pub fn run(
    model: &Path,
    source: Option<&str>,
    target: Option<&str>,
    options: &ResolveOptions,
) -> crossref::Result<()> {
    let resolution = super::resolve_file(model, options)?;
    let relations = &resolution.relations;

    if let (Some(source), Some(target)) = (source, target) {
        for name in [source, target] {
            if relations.entity(name).is_none() {
                return Err(Error::Config(format!("no entity named '{name}'")));
            }
        }
        println!(
            "{} → {}: {}",
            source.white().bold(),
            target.white().bold(),
            relations.total_relation_count(source, target).to_string().green()
        );
        return Ok(());
    }

    let graph = &resolution.graph;
    let mut shown = 0usize;
    for (from, targets) in graph
        .relation_entities()
        .filter_map(|entity| relations.relations_from(entity).map(|targets| (entity, targets)))
    {
        if targets.is_empty() {
            continue;
        }
        println!("  {}", entity_name(graph, from).white().bold());
        for (to, kinds) in targets {
            println!(
                "    {} {} ({})",
                "→".dimmed(),
                entity_name(graph, *to),
                format_kinds(kinds).dimmed()
            );
        }
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No relations found.".dimmed());
    }

    Ok(())
}
