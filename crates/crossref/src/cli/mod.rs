//! CLI command implementations.

mod display;

pub mod ambiguities;
pub mod cycles;
pub mod relations;
pub mod resolve;

use std::path::Path;

use crossref::{Repository, Resolution, ResolveOptions};

/// Read options from `config` (or defaults), then apply flag overrides.
pub fn load_options(config: Option<&Path>, parallel: bool) -> crossref::Result<ResolveOptions> {
    let options = match config {
        Some(path) => ResolveOptions::load(path)?,
        None => ResolveOptions::default(),
    };
    Ok(if parallel { options.with_parallel(true) } else { options })
}

/// Load a model file and run the full pipeline on it.
fn resolve_file(model: &Path, options: &ResolveOptions) -> crossref::Result<Resolution> {
    let repository = Repository::from_json_file(model)?;
    crossref::resolve(&repository, options)
}
