//! `crossref resolve` command implementation.

use std::path::Path;

use colored::Colorize;
use crossref::ResolveOptions;

use super::display::print_list;

/// Run the resolve command.
pub fn run(model: &Path, output: Option<&Path>, options: &ResolveOptions) -> crossref::Result<()> {
    let resolution = super::resolve_file(model, options)?;
    let stats = &resolution.stats;

    println!("{}", "Crossref Resolution Summary".cyan().bold());
    println!();

    println!(
        "  {}: {} types, {} members",
        "Declared".white().bold(),
        stats.declared_types.to_string().green(),
        stats.declared_members.to_string().green()
    );
    println!(
        "  {}: {} external types, {} ambiguous types, {} members",
        "Synthesized".white().bold(),
        stats.external_types,
        stats.ambiguous_types,
        stats.synthesized_members
    );
    println!();

    let references = &stats.references;
    println!(
        "  {}: {} total",
        "References".white().bold(),
        references.total().to_string().green()
    );
    println!("    {}: {}", "Resolved".dimmed(), references.resolved);
    println!("    {}: {}", "Already qualified".dimmed(), references.already_qualified);
    println!("    {}: {}", "Type parameters".dimmed(), references.type_parameters);
    println!("    {}: {}", "External".dimmed(), references.unresolved);
    println!("    {}: {}", "Ambiguous".dimmed(), references.ambiguous);
    println!();

    println!(
        "  {}: {}",
        "Relation edges".white().bold(),
        stats.relation_edges.to_string().green()
    );
    println!(
        "  {}: {:.1?}",
        "Duration".white().bold(),
        stats.duration
    );

    let attention: Vec<String> = resolution
        .diagnostics()
        .iter()
        .filter(|d| d.kind.needs_attention())
        .map(ToString::to_string)
        .collect();
    if stats.ambiguous_names > 0 || stats.overload_mismatches > 0 {
        println!();
        println!(
            "  {}: {} ambiguous names, {} overload mismatches",
            "Warning".yellow().bold(),
            stats.ambiguous_names.to_string().yellow(),
            stats.overload_mismatches.to_string().yellow()
        );
        print_list(&attention, "none");
    }

    if let Some(path) = output {
        std::fs::write(path, resolution.qualified.to_json()?)?;
        println!();
        println!(
            "  {} {}",
            "Wrote qualified model to".dimmed(),
            path.display()
        );
    }

    Ok(())
}
