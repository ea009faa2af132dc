//! Run options.
//!
//! Options are plain data with defaults for every field, so a config file
//! only needs the keys it changes:
//!
//! ```yaml
//! parallel: true
//! include-self-relations: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for a resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolveOptions {
    /// Process projects and types on the rayon pool
    pub parallel: bool,
    /// Count relations from a type to itself
    pub include_self_relations: bool,
    /// Record member → member call relations next to the type-level ones
    pub member_relations: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            include_self_relations: false,
            member_relations: true,
        }
    }
}

impl ResolveOptions {
    /// Enable or disable parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable counting of self relations.
    #[must_use]
    pub fn with_self_relations(mut self, include: bool) -> Self {
        self.include_self_relations = include;
        self
    }

    /// Parse options from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load options from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save options to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
