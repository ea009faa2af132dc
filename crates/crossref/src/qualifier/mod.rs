//! Scope-chain qualifier: promotes short and partially-qualified names to
//! fully-qualified names.
//!
//! Input is a validated [`Repository`]; output is a new, independent
//! repository of the same shape in which
//!
//! - every type carries its `full_name`,
//! - every reference string (base types, field/property/parameter/return/local
//!   types, call targets and call argument types) is rewritten to its
//!   fully-qualified form when exactly one candidate is found,
//! - ambiguous and unknown names are left exactly as written.
//!
//! Ambiguous names are reported through the returned [`AmbiguityLog`].
//!
//! ## Parallelism
//!
//! The scope index is built by a single writer before any search starts.
//! Projects are then qualified independently (optionally on the rayon pool)
//! and their logs merged in declaration order, so the output is the same
//! whether or not `parallel` is set.

mod ambiguity;
mod scope;

pub use ambiguity::{Ambiguity, AmbiguityLog};

use std::ops::AddAssign;

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::model::{CallSite, Member, Namespace, Project, Repository, Solution, TypeDecl};
use crate::parallel::map_maybe_parallel;
use crate::type_name::TypeName;
use scope::{Lookup, ScopeIndex, Site};

/// Outcome of qualifying a single name.
///
/// The model itself keeps strings; this is the decision behind each string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualification {
    /// Exactly one candidate; the name becomes this fully-qualified name
    Resolved(String),
    /// The name already is a declared fully-qualified name
    AlreadyQualified,
    /// Several candidates at the first non-empty scope level
    Ambiguous(Vec<String>),
    /// The name is a generic parameter in scope
    TypeParameter,
    /// No declared candidate; presumed external
    Unresolved,
}

/// Counters for reference outcomes during qualification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualifyStats {
    /// Names rewritten to a fully-qualified name
    pub resolved: usize,
    /// Names that already were fully qualified
    pub already_qualified: usize,
    /// Names left unchanged because of ambiguity
    pub ambiguous: usize,
    /// Names referring to generic parameters in scope
    pub type_parameters: usize,
    /// Names with no declared candidate
    pub unresolved: usize,
}

impl QualifyStats {
    /// Total number of names examined.
    #[must_use]
    pub fn total(&self) -> usize {
        self.resolved
            + self.already_qualified
            + self.ambiguous
            + self.type_parameters
            + self.unresolved
    }
}

impl AddAssign for QualifyStats {
    fn add_assign(&mut self, rhs: Self) {
        self.resolved += rhs.resolved;
        self.already_qualified += rhs.already_qualified;
        self.ambiguous += rhs.ambiguous;
        self.type_parameters += rhs.type_parameters;
        self.unresolved += rhs.unresolved;
    }
}

/// Output of the qualifier stage.
#[derive(Debug, Clone)]
pub struct QualifiedModel {
    /// The rewritten model
    pub repository: Repository,
    /// Ambiguous names in first-seen order
    pub ambiguities: AmbiguityLog,
    /// Reference outcome counters
    pub stats: QualifyStats,
}

/// Qualify every reference in `repository`.
///
/// # Errors
///
/// Returns [`crate::Error::Invariant`] if the containment structure is broken.
pub fn qualify(repository: &Repository, parallel: bool) -> Result<QualifiedModel> {
    let index = ScopeIndex::build(repository)?;
    let qualifier = Qualifier { index: &index };

    let jobs: Vec<(usize, usize, &Project)> = repository
        .solutions
        .iter()
        .enumerate()
        .flat_map(|(s, solution)| {
            solution
                .projects
                .iter()
                .enumerate()
                .map(move |(p, project)| (s, p, project))
        })
        .collect();

    let outputs = map_maybe_parallel(&jobs, parallel, |&(s, p, project)| {
        qualifier.qualify_project(s, p, project)
    });

    let mut ambiguities = AmbiguityLog::new();
    let mut stats = QualifyStats::default();
    let mut projects = outputs.into_iter();
    let mut qualified = Repository {
        name: repository.name.clone(),
        solutions: Vec::with_capacity(repository.solutions.len()),
    };

    for solution in &repository.solutions {
        let mut out = Solution {
            name: solution.name.clone(),
            projects: Vec::with_capacity(solution.projects.len()),
        };
        for _ in &solution.projects {
            let Some(done) = projects.next() else { break };
            for entry in ambiguities.merge(done.ambiguities) {
                warn!(
                    name = %entry.name,
                    candidates = ?entry.candidates,
                    "Ambiguous reference left unqualified"
                );
            }
            stats += done.stats;
            out.projects.push(done.project);
        }
        qualified.solutions.push(out);
    }

    debug!(
        types = index.len(),
        resolved = stats.resolved,
        ambiguous = stats.ambiguous,
        unresolved = stats.unresolved,
        "Qualification completed"
    );

    Ok(QualifiedModel {
        repository: qualified,
        ambiguities,
        stats,
    })
}

struct Qualifier<'a> {
    index: &'a ScopeIndex,
}

/// Per-project accumulator, merged after all projects finish.
struct ProjectOutput {
    project: Project,
    ambiguities: AmbiguityLog,
    stats: QualifyStats,
}

/// Lexical context of a reference: where it was written and which generic
/// parameters are visible there.
struct Context<'a> {
    site: Site,
    type_parameters: Vec<&'a str>,
}

impl Context<'_> {
    fn is_type_parameter(&self, name: &str) -> bool {
        self.type_parameters.contains(&name)
    }
}

impl Qualifier<'_> {
    fn qualify_project(&self, s: usize, p: usize, project: &Project) -> ProjectOutput {
        let mut output = ProjectOutput {
            project: Project {
                name: project.name.clone(),
                namespaces: Vec::with_capacity(project.namespaces.len()),
            },
            ambiguities: AmbiguityLog::new(),
            stats: QualifyStats::default(),
        };

        for (n, namespace) in project.namespaces.iter().enumerate() {
            let slot = self.index.slot(s, p, n);
            let layouts = self.index.layouts(slot);
            let mut out_ns = Namespace {
                name: namespace.name.clone(),
                types: Vec::with_capacity(namespace.types.len()),
            };

            for (t, ty) in namespace.types.iter().enumerate() {
                // Generic parameters of outer types stay visible in nested types.
                let mut type_parameters: Vec<&str> = Vec::new();
                let mut current = Some(t);
                while let Some(i) = current {
                    type_parameters
                        .extend(namespace.types[i].generic_parameters.iter().map(String::as_str));
                    current = layouts[i].parent;
                }

                let ctx = Context {
                    site: Site {
                        solution: s,
                        project: p,
                        slot,
                        type_index: Some(t),
                    },
                    type_parameters,
                };
                let full_name = self.index.full_name(slot, t);
                out_ns.types.push(self.qualify_type(&ctx, ty, full_name, &mut output));
            }
            output.project.namespaces.push(out_ns);
        }

        output
    }

    fn qualify_type(
        &self,
        ctx: &Context<'_>,
        ty: &TypeDecl,
        full_name: String,
        out: &mut ProjectOutput,
    ) -> TypeDecl {
        let base_types = ty
            .base_types
            .iter()
            .map(|b| self.qualify_reference(ctx, b, out))
            .collect();
        let members = ty
            .members
            .iter()
            .map(|m| self.qualify_member(ctx, m, out))
            .collect();

        trace!(type_name = %full_name, "Qualified type");

        TypeDecl {
            name: ty.name.clone(),
            kind: ty.kind,
            full_name: Some(full_name),
            containing_type: ty.containing_type.clone(),
            generic_parameters: ty.generic_parameters.clone(),
            base_types,
            members,
        }
    }

    fn qualify_member(&self, ctx: &Context<'_>, member: &Member, out: &mut ProjectOutput) -> Member {
        let mut type_parameters = ctx.type_parameters.clone();
        type_parameters.extend(member.generic_parameters.iter().map(String::as_str));
        let ctx = Context {
            site: ctx.site,
            type_parameters,
        };

        let mut qualify = |text: &String| self.qualify_reference(&ctx, text, out);

        let value_type = member.value_type.as_ref().map(&mut qualify);
        let parameters = member.parameters.iter().map(&mut qualify).collect();
        let return_type = member.return_type.as_ref().map(&mut qualify);
        let local_variables = member.local_variables.iter().map(&mut qualify).collect();
        let calls = member
            .calls
            .iter()
            .map(|call| CallSite {
                target_type: if call.target_type.is_empty() {
                    String::new()
                } else {
                    qualify(&call.target_type)
                },
                method: call.method.clone(),
                parameter_types: call.parameter_types.iter().map(&mut qualify).collect(),
            })
            .collect();

        Member {
            name: member.name.clone(),
            kind: member.kind,
            value_type,
            parameters,
            return_type,
            generic_parameters: member.generic_parameters.clone(),
            local_variables,
            calls,
        }
    }

    /// Qualify a full reference string, keeping the original text when no
    /// component changes.
    fn qualify_reference(&self, ctx: &Context<'_>, text: &str, out: &mut ProjectOutput) -> String {
        let parsed = TypeName::parse(text);
        let mut changed = false;
        let rewritten = self.qualify_type_name(ctx, &parsed, out, &mut changed);
        if changed {
            rewritten.to_string()
        } else {
            text.to_string()
        }
    }

    fn qualify_type_name(
        &self,
        ctx: &Context<'_>,
        name: &TypeName,
        out: &mut ProjectOutput,
        changed: &mut bool,
    ) -> TypeName {
        let arguments = name
            .arguments
            .iter()
            .map(|a| self.qualify_type_name(ctx, a, out, changed))
            .collect();

        let base = match self.qualify_name(ctx, &name.base, name.arity()) {
            Qualification::Resolved(full_name) => {
                out.stats.resolved += 1;
                *changed = true;
                full_name
            }
            Qualification::AlreadyQualified => {
                out.stats.already_qualified += 1;
                name.base.clone()
            }
            Qualification::Ambiguous(candidates) => {
                out.stats.ambiguous += 1;
                out.ambiguities.record(&name.base, candidates);
                name.base.clone()
            }
            Qualification::TypeParameter => {
                out.stats.type_parameters += 1;
                name.base.clone()
            }
            Qualification::Unresolved => {
                out.stats.unresolved += 1;
                name.base.clone()
            }
        };

        TypeName {
            base,
            arguments,
            suffixes: name.suffixes.clone(),
        }
    }

    fn qualify_name(&self, ctx: &Context<'_>, name: &str, arity: usize) -> Qualification {
        if arity == 0 && ctx.is_type_parameter(name) {
            return Qualification::TypeParameter;
        }

        match self.index.lookup(&ctx.site, name, arity) {
            Lookup::AlreadyQualified => Qualification::AlreadyQualified,
            Lookup::NotFound => {
                trace!(search = %name, "No declared candidate, treating as external");
                Qualification::Unresolved
            }
            Lookup::Found { level, mut candidates } => {
                if candidates.len() == 1 {
                    let full_name = candidates.remove(0);
                    trace!(search = %name, level = ?level, full_name = %full_name, "Resolved name");
                    Qualification::Resolved(full_name)
                } else {
                    trace!(search = %name, level = ?level, count = candidates.len(), "Ambiguous name");
                    Qualification::Ambiguous(candidates)
                }
            }
        }
    }
}
