//! `crossref cycles` command implementation.

use std::path::Path;

use colored::Colorize;
use crossref::{EntityId, ResolveOptions};

use super::display::{entity_name, print_list};

/// Run the cycles command.
pub fn run(model: &Path, options: &ResolveOptions) -> crossref::Result<()> {
    let resolution = super::resolve_file(model, options)?;
    let cycles = resolution.relations.dependency_cycles();

    if cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular dependencies:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);
        let names: Vec<String> = cycle
            .types
            .iter()
            .map(|&id| entity_name(&resolution.graph, EntityId::Type(id)))
            .collect();
        print_list(&names, "empty");
    }

    Ok(())
}
