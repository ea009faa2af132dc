//! Declared-type scope index and the widening scope-chain search.
//!
//! The index is built once per run by a single writer and is read-only
//! afterwards, so projects can be searched concurrently.
//!
//! ## Scope chain
//!
//! | Level | Candidates considered |
//! |-------|-----------------------|
//! | Enclosing type | The type itself and its directly nested types, then each outer type likewise |
//! | Namespace | Types of the enclosing namespace (this project only) |
//! | Project | Every namespace of the same project |
//! | Solution | Every namespace of the same solution |
//! | Repository | Every namespace of every other solution |
//!
//! The search stops at the first level with at least one candidate, even
//! when that level is ambiguous.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::Repository;
use crate::validate::{TypeLayout, layout_namespace, namespace_display};

/// Scope level that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeLevel {
    EnclosingType,
    Namespace,
    Project,
    Solution,
    Repository,
}

impl ScopeLevel {
    /// Whether a declaration is visible at this (non type) level from `site`.
    fn contains(self, decl: &DeclaredType, site: &Site) -> bool {
        match self {
            Self::EnclosingType | Self::Namespace => decl.slot == site.slot,
            Self::Project => decl.solution == site.solution && decl.project == site.project,
            Self::Solution => decl.solution == site.solution,
            Self::Repository => decl.solution != site.solution,
        }
    }
}

/// Where a reference was written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site {
    pub solution: usize,
    pub project: usize,
    /// Flat namespace slot, see [`ScopeIndex::slot`]
    pub slot: usize,
    /// Index of the enclosing type in its namespace, if any
    pub type_index: Option<usize>,
}

/// Outcome of a scope-chain search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// The search string already is a declared fully-qualified name
    AlreadyQualified,
    /// Candidates from the first non-empty level, deduplicated by full name
    Found {
        level: ScopeLevel,
        candidates: Vec<String>,
    },
    /// No declared type matches at any level
    NotFound,
}

#[derive(Debug, Clone)]
pub(crate) struct DeclaredType {
    pub simple_name: String,
    pub full_name: String,
    pub arity: usize,
    pub solution: usize,
    pub project: usize,
    pub slot: usize,
    pub type_index: usize,
    pub parent: Option<usize>,
}

impl DeclaredType {
    /// Simple-name match, or a match of the search string against a
    /// dot-aligned suffix of the full name (partially qualified names).
    fn matches(&self, search: &str, arity: usize) -> bool {
        if self.arity != arity {
            return false;
        }
        if self.simple_name == search {
            return true;
        }
        let full = self.full_name.as_str();
        full.len() > search.len()
            && full.ends_with(search)
            && full.as_bytes()[full.len() - search.len() - 1] == b'.'
    }
}

/// Index of every declared type, addressable by scope.
#[derive(Debug)]
pub(crate) struct ScopeIndex {
    decls: Vec<DeclaredType>,
    /// Last name segment → declaration indices in declaration order
    by_name: HashMap<String, Vec<usize>>,
    /// `project_base[s][p]` is the first namespace slot of that project
    project_base: Vec<Vec<usize>>,
    /// Per-slot containment layout
    layouts: Vec<Vec<TypeLayout>>,
    /// Per-slot namespace name
    namespace_names: Vec<String>,
}

impl ScopeIndex {
    /// Build the index for a repository.
    pub fn build(repository: &Repository) -> Result<Self> {
        let mut index = Self {
            decls: Vec::new(),
            by_name: HashMap::new(),
            project_base: Vec::with_capacity(repository.solutions.len()),
            layouts: Vec::new(),
            namespace_names: Vec::new(),
        };

        for (s, solution) in repository.solutions.iter().enumerate() {
            let mut bases = Vec::with_capacity(solution.projects.len());
            for (p, project) in solution.projects.iter().enumerate() {
                bases.push(index.layouts.len());
                for namespace in &project.namespaces {
                    let slot = index.layouts.len();
                    let path = format!(
                        "{}/{}/{}/{}",
                        repository.name,
                        solution.name,
                        project.name,
                        namespace_display(namespace)
                    );
                    let layouts = layout_namespace(namespace, &path)?;

                    for (t, (ty, layout)) in namespace.types.iter().zip(&layouts).enumerate() {
                        let decl = index.decls.len();
                        index
                            .by_name
                            .entry(ty.name.clone())
                            .or_default()
                            .push(decl);
                        index.decls.push(DeclaredType {
                            simple_name: ty.name.clone(),
                            full_name: namespace.qualify(&layout.relative_path),
                            arity: ty.generic_parameters.len(),
                            solution: s,
                            project: p,
                            slot,
                            type_index: t,
                            parent: layout.parent,
                        });
                    }
                    index.layouts.push(layouts);
                    index.namespace_names.push(namespace.name.clone());
                }
            }
            index.project_base.push(bases);
        }

        Ok(index)
    }

    /// Flat slot of namespace `n` in project `p` of solution `s`.
    pub fn slot(&self, s: usize, p: usize, n: usize) -> usize {
        self.project_base[s][p] + n
    }

    /// Containment layout of the types in a slot.
    pub fn layouts(&self, slot: usize) -> &[TypeLayout] {
        &self.layouts[slot]
    }

    /// Fully-qualified name of type `t` in `slot`.
    pub fn full_name(&self, slot: usize, t: usize) -> String {
        let name = &self.namespace_names[slot];
        let relative = &self.layouts[slot][t].relative_path;
        if name.is_empty() {
            relative.clone()
        } else {
            format!("{name}.{relative}")
        }
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Search the scope chain for `search` written at `site`.
    pub fn lookup(&self, site: &Site, search: &str, arity: usize) -> Lookup {
        let last = search.rsplit('.').next().unwrap_or(search);
        let Some(pool) = self.by_name.get(last) else {
            return Lookup::NotFound;
        };

        if pool.iter().any(|&i| {
            let d = &self.decls[i];
            d.full_name == search && d.arity == arity
        }) {
            return Lookup::AlreadyQualified;
        }

        let matching: Vec<&DeclaredType> = pool
            .iter()
            .map(|&i| &self.decls[i])
            .filter(|d| d.matches(search, arity))
            .collect();
        if matching.is_empty() {
            return Lookup::NotFound;
        }

        if let Some(start) = site.type_index {
            let mut current = Some(start);
            while let Some(t) = current {
                let level: Vec<&DeclaredType> = matching
                    .iter()
                    .copied()
                    .filter(|d| d.slot == site.slot && (d.type_index == t || d.parent == Some(t)))
                    .collect();
                if !level.is_empty() {
                    return found(ScopeLevel::EnclosingType, &level);
                }
                current = self.layouts[site.slot][t].parent;
            }
        }

        for level in [
            ScopeLevel::Namespace,
            ScopeLevel::Project,
            ScopeLevel::Solution,
            ScopeLevel::Repository,
        ] {
            let hits: Vec<&DeclaredType> = matching
                .iter()
                .copied()
                .filter(|d| level.contains(d, site))
                .collect();
            if !hits.is_empty() {
                return found(level, &hits);
            }
        }

        Lookup::NotFound
    }
}

fn found(level: ScopeLevel, hits: &[&DeclaredType]) -> Lookup {
    let mut candidates: Vec<String> = Vec::with_capacity(hits.len());
    for hit in hits {
        if !candidates.contains(&hit.full_name) {
            candidates.push(hit.full_name.clone());
        }
    }
    Lookup::Found { level, candidates }
}
