//! `crossref ambiguities` command implementation.

use std::path::Path;

use colored::Colorize;
use crossref::ResolveOptions;

/// Run the ambiguities command.
pub fn run(model: &Path, options: &ResolveOptions) -> crossref::Result<()> {
    let resolution = super::resolve_file(model, options)?;

    if resolution.ambiguities.is_empty() {
        println!("{}", "No ambiguous names.".green());
        return Ok(());
    }

    println!(
        "Found {} ambiguous names:",
        resolution.ambiguities.len().to_string().yellow().bold()
    );
    println!();

    for entry in resolution.ambiguities.entries() {
        println!("  {}", entry.name.white().bold());
        for candidate in &entry.candidates {
            println!("    {} {}", "•".dimmed(), candidate);
        }
    }

    Ok(())
}
