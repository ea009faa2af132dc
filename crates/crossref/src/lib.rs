//! # Crossref: Name Resolution and Cross-Reference Graphs
//!
//! Crossref takes a hierarchical model of a codebase, as produced by a
//! language extractor, in which every cross-type reference is still a name
//! string, and turns it into resolved, countable facts.
//!
//! ## Pipeline
//!
//! ```text
//! Repository ──▶ qualify ──▶ build_graph ──▶ aggregate
//!  (strings)      (full names,   (arena handles,   (relation counts,
//!                  ambiguity log) placeholders)     coupling, cycles)
//! ```
//!
//! Each stage is a pure transformation producing a new value; nothing is
//! mutated in place.
//!
//! ## Design Philosophy
//!
//! - **Best effort for references** - Ambiguous and unknown names never stop a run
//! - **Strict for structure** - Broken containment fails fast with [`Error::Invariant`]
//! - **Deterministic** - Same input, same names, same ambiguity log, same counts
//! - **Library first** - The CLI is a thin wrapper
//!
//! ## Quick Start
//!
//! ```
//! use crossref::{Crossref, Member, Namespace, Project, Repository, ResolveOptions, Solution, TypeDecl};
//!
//! let repo = Repository::new("demo").with_solution(
//!     Solution::new("main").with_project(
//!         Project::new("App")
//!             .with_namespace(Namespace::new("Models").with_type(TypeDecl::class("Class1")))
//!             .with_namespace(Namespace::new("Services").with_type(
//!                 TypeDecl::class("Class2").with_member(Member::field("dependency", "Class1")),
//!             )),
//!     ),
//! );
//!
//! let resolution = Crossref::new(ResolveOptions::default()).run(&repo)?;
//!
//! assert_eq!(resolution.relations.total_relation_count("Services.Class2", "Models.Class1"), 1);
//! assert!(resolution.ambiguities.is_empty());
//! # Ok::<(), crossref::Error>(())
//! ```

mod config;
mod error;
mod graph;
mod model;
mod parallel;
mod qualifier;
mod relations;
mod type_name;
mod types;
mod validate;

pub use config::ResolveOptions;
pub use error::{Diagnostic, DiagnosticKind, Error, Invariant, Result};
pub use graph::{
    CallRef, MemberEntity, MemberOrigin, NamespaceNode, ProjectNode, ReferenceGraph, SolutionNode,
    TypeEntity, TypeOrigin, TypeRef,
};
pub use model::{CallSite, Member, Namespace, Project, Repository, Solution, TypeDecl};
pub use qualifier::{Ambiguity, AmbiguityLog, QualifiedModel, Qualification, QualifyStats};
pub use relations::{KindCounts, RelationMap, Targets};
pub use type_name::{MAX_GENERIC_DEPTH, Suffix, TypeName};
pub use types::{Cycle, EntityId, MemberId, MemberKind, RelationKind, TypeId, TypeKind};
pub use validate::validate;

use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Statistics from a resolution run.
///
/// Returned as part of [`Resolution`] by [`Crossref::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Types declared in the repository
    pub declared_types: usize,
    /// Members declared in the repository
    pub declared_members: usize,
    /// External placeholder types synthesized
    pub external_types: usize,
    /// Ambiguous placeholder types synthesized
    pub ambiguous_types: usize,
    /// Placeholder members synthesized for unmatched calls
    pub synthesized_members: usize,
    /// Reference outcomes from the qualifier
    pub references: QualifyStats,
    /// Distinct ambiguous names
    pub ambiguous_names: usize,
    /// Call sites that matched no declared overload of a known type
    pub overload_mismatches: usize,
    /// Distinct `(source, target, kind)` relation edges
    pub relation_edges: usize,
    /// How long the run took
    pub duration: Duration,
}

/// Everything a resolution run produces.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The model with names rewritten to fully-qualified form
    pub qualified: Repository,
    /// The handle-based reference graph
    pub graph: ReferenceGraph,
    /// Relation counts between graph entities
    pub relations: RelationMap,
    /// Ambiguous names in first-seen order
    pub ambiguities: AmbiguityLog,
    /// Run statistics
    pub stats: ResolveStats,
}

impl Resolution {
    /// Every recoverable condition met during the run.
    ///
    /// Graph diagnostics (ambiguous reference sites and overload mismatches)
    /// come first, then one unresolved entry per external type, by name.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.graph.diagnostics().to_vec();

        let mut external: Vec<&TypeEntity> = self
            .graph
            .synthesized_types()
            .filter(|t| t.origin == TypeOrigin::External)
            .collect();
        external.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.arity.cmp(&b.arity)));
        diagnostics.extend(external.into_iter().map(|t| {
            Diagnostic::new(DiagnosticKind::Unresolved, t.full_name.clone(), self.qualified.name.clone())
        }));

        diagnostics
    }
}

/// Resolution pipeline entry point.
///
/// `Crossref` runs the three stages in order. Each stage is also exposed on
/// its own for callers that only need part of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crossref {
    options: ResolveOptions,
}

impl Crossref {
    /// Create a pipeline with the given options.
    #[must_use]
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// The options this pipeline runs with.
    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Validate, qualify, build the graph and aggregate relations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the repository breaks a containment
    /// invariant. No partial output is returned.
    pub fn run(&self, repository: &Repository) -> Result<Resolution> {
        let start = Instant::now();

        validate(repository)?;
        let qualified = self.qualify(repository)?;
        let graph = self.build_graph(&qualified)?;
        let relations = self.aggregate(&graph);

        let QualifiedModel {
            repository: qualified,
            ambiguities,
            stats: references,
        } = qualified;

        let synthesized: Vec<&TypeEntity> = graph.synthesized_types().collect();
        let stats = ResolveStats {
            declared_types: graph.declared_type_count(),
            declared_members: graph.declared_member_count(),
            external_types: synthesized
                .iter()
                .filter(|t| t.origin == TypeOrigin::External)
                .count(),
            ambiguous_types: synthesized
                .iter()
                .filter(|t| matches!(t.origin, TypeOrigin::Ambiguous { .. }))
                .count(),
            synthesized_members: graph.synthesized_members().count(),
            references,
            ambiguous_names: ambiguities.len(),
            overload_mismatches: graph
                .diagnostics()
                .iter()
                .filter(|d| d.kind == DiagnosticKind::OverloadMismatch)
                .count(),
            relation_edges: relations.edge_count(),
            duration: start.elapsed(),
        };

        info!(
            repository = %repository.name,
            types = stats.declared_types,
            external = stats.external_types,
            ambiguous = stats.ambiguous_names,
            edges = stats.relation_edges,
            duration_ms = stats.duration.as_millis(),
            "Resolution completed"
        );

        Ok(Resolution {
            qualified,
            graph,
            relations,
            ambiguities,
            stats,
        })
    }

    /// Stage 1: rewrite reference strings to fully-qualified names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the containment structure is broken.
    pub fn qualify(&self, repository: &Repository) -> Result<QualifiedModel> {
        debug!(parallel = self.options.parallel, "Qualifying names");
        qualifier::qualify(repository, self.options.parallel)
    }

    /// Stage 2: replace qualified names with entity handles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the containment structure is broken,
    /// [`Error::Internal`] if the placeholder registry fails.
    pub fn build_graph(&self, qualified: &QualifiedModel) -> Result<ReferenceGraph> {
        debug!(parallel = self.options.parallel, "Building reference graph");
        graph::build(qualified, self.options.parallel)
    }

    /// Stage 3: count relations between graph entities.
    #[must_use]
    pub fn aggregate(&self, graph: &ReferenceGraph) -> RelationMap {
        relations::aggregate(graph, &self.options)
    }
}

/// Run the whole pipeline with `options`.
///
/// Shorthand for `Crossref::new(*options).run(repository)`.
///
/// # Errors
///
/// See [`Crossref::run`].
pub fn resolve(repository: &Repository, options: &ResolveOptions) -> Result<Resolution> {
    Crossref::new(*options).run(repository)
}
