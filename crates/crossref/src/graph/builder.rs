//! Materializes a qualified model into a [`ReferenceGraph`].
//!
//! ## Passes
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           build                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  1 (Sequential):  arenas for declared types, members, type       │
//! │                   parameters; the name index                     │
//! │  2 (Parallel):    base types and member signatures               │
//! │  3 (Parallel):    call sites, bound against resolved signatures  │
//! │  4 (Sequential):  append synthesized placeholders                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The name index is written only in pass 1. Passes 2 and 3 read the arenas
//! and create placeholders exclusively through the [`PlaceholderRegistry`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::error::{Diagnostic, DiagnosticKind, Result};
use crate::graph::ReferenceGraph;
use crate::graph::registry::{PlaceholderRegistry, Synthesized, arena_len, placeholder_key};
use crate::graph::types::{
    CallRef, MemberEntity, MemberOrigin, NamespaceNode, ProjectNode, SolutionNode, TypeEntity,
    TypeOrigin, TypeRef,
};
use crate::model::{CallSite, TypeDecl};
use crate::parallel::map_maybe_parallel;
use crate::qualifier::{AmbiguityLog, QualifiedModel};
use crate::type_name::TypeName;
use crate::types::{EntityId, MemberId, TypeId};
use crate::validate::{layout_namespace, namespace_display};

/// Generic parameters visible at a reference, innermost first.
type Scope<'a> = Vec<(&'a str, TypeId)>;

/// Build the reference graph for a qualified model.
///
/// # Errors
///
/// Returns [`crate::Error::Invariant`] if the containment structure is
/// broken, or [`crate::Error::Internal`] if the placeholder registry fails.
pub fn build(qualified: &QualifiedModel, parallel: bool) -> Result<ReferenceGraph> {
    let mut builder = Builder::skeleton(qualified)?;
    let declared_ids: Vec<TypeId> = (0..builder.declared.len())
        .map(|i| arena_len(i).map(TypeId))
        .collect::<Result<_>>()?;

    let mut diagnostics = Vec::new();

    let signatures = map_maybe_parallel(&declared_ids, parallel, |&id| builder.resolve_signatures(id));
    for result in signatures {
        let resolved = result?;
        builder.apply_signatures(resolved, &mut diagnostics);
    }

    let calls = map_maybe_parallel(&declared_ids, parallel, |&id| builder.resolve_calls(id));
    for result in calls {
        let resolved = result?;
        for (member, calls) in resolved.members {
            builder.members[member.index()].calls = calls;
        }
        diagnostics.extend(resolved.diagnostics);
    }

    builder.assemble(diagnostics)
}

struct Builder<'a> {
    types: Vec<TypeEntity>,
    members: Vec<MemberEntity>,
    /// Source declaration of every declared type, indexed by `TypeId`
    declared: Vec<&'a TypeDecl>,
    solutions: Vec<SolutionNode>,
    /// `(full name, arity)` → first declared type with that name
    index: HashMap<(String, usize), TypeId>,
    ambiguities: &'a AmbiguityLog,
    registry: PlaceholderRegistry,
    type_parameters: usize,
    declared_members: usize,
}

struct MemberSignature {
    id: MemberId,
    value_type: Option<TypeRef>,
    parameters: Vec<TypeRef>,
    return_type: Option<TypeRef>,
    local_variables: Vec<TypeRef>,
}

struct TypeSignatures {
    id: TypeId,
    base_types: Vec<TypeRef>,
    members: Vec<MemberSignature>,
    diagnostics: Vec<Diagnostic>,
}

struct TypeCalls {
    members: Vec<(MemberId, Vec<CallRef>)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Builder<'a> {
    /// Pass 1: allocate every declared entity and index declared names.
    fn skeleton(qualified: &'a QualifiedModel) -> Result<Self> {
        let repository = &qualified.repository;
        let mut types: Vec<TypeEntity> = Vec::new();
        let mut declared: Vec<&TypeDecl> = Vec::new();
        let mut solutions = Vec::with_capacity(repository.solutions.len());
        let mut index = HashMap::new();

        for (s, solution) in repository.solutions.iter().enumerate() {
            let mut solution_node = SolutionNode {
                name: solution.name.clone(),
                projects: Vec::with_capacity(solution.projects.len()),
            };
            for (p, project) in solution.projects.iter().enumerate() {
                let mut project_node = ProjectNode {
                    name: project.name.clone(),
                    namespaces: Vec::with_capacity(project.namespaces.len()),
                };
                for (n, namespace) in project.namespaces.iter().enumerate() {
                    let path = format!(
                        "{}/{}/{}/{}",
                        repository.name,
                        solution.name,
                        project.name,
                        namespace_display(namespace)
                    );
                    let layouts = layout_namespace(namespace, &path)?;
                    let first = arena_len(types.len())?;
                    let mut namespace_node = NamespaceNode {
                        name: namespace.name.clone(),
                        types: Vec::with_capacity(namespace.types.len()),
                    };

                    for (ty, layout) in namespace.types.iter().zip(&layouts) {
                        let id = TypeId(arena_len(types.len())?);
                        let full_name = namespace.qualify(&layout.relative_path);
                        let arity = ty.generic_parameters.len();
                        index.entry((full_name.clone(), arity)).or_insert(id);

                        let containing_type = layout
                            .parent
                            .map(|parent| arena_len(parent).map(|offset| TypeId(first + offset)))
                            .transpose()?;

                        types.push(TypeEntity {
                            id,
                            name: ty.name.clone(),
                            full_name,
                            kind: ty.kind,
                            origin: TypeOrigin::Declared {
                                solution: s,
                                project: p,
                                namespace: n,
                            },
                            containing_type,
                            arity,
                            generic_parameters: Vec::new(),
                            base_types: Vec::new(),
                            members: Vec::new(),
                        });
                        declared.push(ty);
                        namespace_node.types.push(id);
                    }
                    project_node.namespaces.push(namespace_node);
                }
                solution_node.projects.push(project_node);
            }
            solutions.push(solution_node);
        }

        let mut members = Vec::new();
        for (t, ty) in declared.iter().enumerate() {
            for member in &ty.members {
                let id = MemberId(arena_len(members.len())?);
                members.push(MemberEntity {
                    id,
                    owner: types[t].id,
                    name: member.name.clone(),
                    kind: member.kind,
                    origin: MemberOrigin::Declared,
                    value_type: None,
                    parameters: Vec::new(),
                    return_type: None,
                    generic_parameters: Vec::new(),
                    local_variables: Vec::new(),
                    calls: Vec::new(),
                });
                types[t].members.push(id);
            }
        }
        let declared_members = members.len();

        // Type parameters follow declared types in the arena.
        let declared_types = types.len();
        for t in 0..declared_types {
            let owner = types[t].id;
            let owner_name = types[t].full_name.clone();
            for parameter in &declared[t].generic_parameters {
                let id = TypeId(arena_len(types.len())?);
                types.push(type_parameter(
                    id,
                    parameter,
                    format!("{owner_name}.{parameter}"),
                    EntityId::Type(owner),
                ));
                types[t].generic_parameters.push(id);
            }
            for (member, &member_id) in declared[t].members.iter().zip(&types[t].members.clone()) {
                for parameter in &member.generic_parameters {
                    let id = TypeId(arena_len(types.len())?);
                    types.push(type_parameter(
                        id,
                        parameter,
                        format!("{owner_name}.{}.{parameter}", member.name),
                        EntityId::Member(member_id),
                    ));
                    members[member_id.index()].generic_parameters.push(id);
                }
            }
        }
        let type_parameters = types.len() - declared_types;

        let registry =
            PlaceholderRegistry::new(arena_len(types.len())?, arena_len(members.len())?);

        debug!(
            declared_types,
            declared_members, type_parameters, "Reference graph skeleton allocated"
        );

        Ok(Self {
            types,
            members,
            declared,
            solutions,
            index,
            ambiguities: &qualified.ambiguities,
            registry,
            type_parameters,
            declared_members,
        })
    }

    /// Generic parameters of `id` and of every type declaring it.
    fn type_scope(&self, id: TypeId) -> Scope<'_> {
        let mut scope = Vec::new();
        let mut current = Some(id);
        while let Some(t) = current {
            let entity = &self.types[t.index()];
            for &parameter in &entity.generic_parameters {
                scope.push((self.types[parameter.index()].name.as_str(), parameter));
            }
            current = entity.containing_type;
        }
        scope
    }

    /// `type_scope` with the member's own generic parameters in front.
    fn member_scope<'s>(&'s self, member: MemberId, type_scope: &Scope<'s>) -> Scope<'s> {
        let mut scope: Scope<'s> = self.members[member.index()]
            .generic_parameters
            .iter()
            .map(|&parameter| (self.types[parameter.index()].name.as_str(), parameter))
            .collect();
        scope.extend(type_scope.iter().copied());
        scope
    }

    fn resolve(
        &self,
        scope: &[(&str, TypeId)],
        context: &str,
        text: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<TypeRef> {
        self.resolve_name(scope, context, &TypeName::parse(text), diagnostics)
    }

    fn resolve_name(
        &self,
        scope: &[(&str, TypeId)],
        context: &str,
        name: &TypeName,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<TypeRef> {
        let mut arguments = Vec::with_capacity(name.arguments.len());
        for argument in &name.arguments {
            arguments.push(self.resolve_name(scope, context, argument, diagnostics)?);
        }
        let target = self.resolve_base(scope, context, &name.base, name.arity(), diagnostics)?;
        Ok(TypeRef {
            target,
            arguments,
            suffixes: name.suffixes.clone(),
        })
    }

    fn resolve_base(
        &self,
        scope: &[(&str, TypeId)],
        context: &str,
        base: &str,
        arity: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<TypeId> {
        if arity == 0 {
            if let Some(&(_, id)) = scope.iter().find(|(name, _)| *name == base) {
                return Ok(id);
            }
        }

        if let Some(&id) = self.index.get(&(base.to_string(), arity)) {
            return Ok(id);
        }

        // Candidates are per name: the log keeps the first ambiguous site's set.
        if let Some(entry) = self.ambiguities.get(base) {
            let candidates: Vec<TypeId> = entry
                .candidates
                .iter()
                .filter_map(|candidate| self.index.get(&(candidate.clone(), arity)).copied())
                .collect();
            if !candidates.is_empty() {
                diagnostics.push(Diagnostic::new(DiagnosticKind::Ambiguous, base, context));
                return self.registry.ambiguous_type(base, arity, &candidates);
            }
        }

        trace!(type_name = %placeholder_key(base, arity), "Referencing external type");
        self.registry.external_type(base, arity)
    }

    /// Pass 2 for one declared type.
    fn resolve_signatures(&self, id: TypeId) -> Result<TypeSignatures> {
        let decl = self.declared[id.index()];
        let entity = &self.types[id.index()];
        let scope = self.type_scope(id);
        let mut diagnostics = Vec::new();

        let mut base_types = Vec::with_capacity(decl.base_types.len());
        for base in &decl.base_types {
            base_types.push(self.resolve(&scope, &entity.full_name, base, &mut diagnostics)?);
        }

        let mut members = Vec::with_capacity(decl.members.len());
        for (member, &member_id) in decl.members.iter().zip(&entity.members) {
            let scope = self.member_scope(member_id, &scope);
            let context = format!("{}.{}", entity.full_name, member.name);
            let mut resolve = |text: &String| self.resolve(&scope, &context, text, &mut diagnostics);

            let value_type = member.value_type.as_ref().map(&mut resolve).transpose()?;
            let parameters = member
                .parameters
                .iter()
                .map(&mut resolve)
                .collect::<Result<Vec<_>>>()?;
            let return_type = member.return_type.as_ref().map(&mut resolve).transpose()?;
            let local_variables = member
                .local_variables
                .iter()
                .map(&mut resolve)
                .collect::<Result<Vec<_>>>()?;

            members.push(MemberSignature {
                id: member_id,
                value_type,
                parameters,
                return_type,
                local_variables,
            });
        }

        Ok(TypeSignatures {
            id,
            base_types,
            members,
            diagnostics,
        })
    }

    fn apply_signatures(&mut self, resolved: TypeSignatures, diagnostics: &mut Vec<Diagnostic>) {
        self.types[resolved.id.index()].base_types = resolved.base_types;
        for signature in resolved.members {
            let member = &mut self.members[signature.id.index()];
            member.value_type = signature.value_type;
            member.parameters = signature.parameters;
            member.return_type = signature.return_type;
            member.local_variables = signature.local_variables;
        }
        diagnostics.extend(resolved.diagnostics);
    }

    /// Pass 3 for one declared type.
    fn resolve_calls(&self, id: TypeId) -> Result<TypeCalls> {
        let decl = self.declared[id.index()];
        let entity = &self.types[id.index()];
        let scope = self.type_scope(id);
        let mut output = TypeCalls {
            members: Vec::new(),
            diagnostics: Vec::new(),
        };

        for (member, &member_id) in decl.members.iter().zip(&entity.members) {
            if member.calls.is_empty() {
                continue;
            }
            let scope = self.member_scope(member_id, &scope);
            let context = format!("{}.{}", entity.full_name, member.name);

            let mut calls = Vec::with_capacity(member.calls.len());
            for call in &member.calls {
                let receiver = if call.target_type.is_empty() {
                    TypeRef::to(id)
                } else {
                    self.resolve(&scope, &context, &call.target_type, &mut output.diagnostics)?
                };
                let mut arguments = Vec::with_capacity(call.parameter_types.len());
                for argument in &call.parameter_types {
                    arguments.push(self.resolve(&scope, &context, argument, &mut output.diagnostics)?);
                }
                let bound = self.bind_call(
                    receiver.target,
                    call,
                    &arguments,
                    &context,
                    &mut output.diagnostics,
                )?;
                calls.push(CallRef {
                    receiver,
                    member: bound,
                    arguments,
                });
            }
            output.members.push((member_id, calls));
        }

        Ok(output)
    }

    /// Bind a call to a declared overload, or to a placeholder member.
    fn bind_call(
        &self,
        target: TypeId,
        call: &CallSite,
        arguments: &[TypeRef],
        context: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<MemberId> {
        if let Some(found) = self.find_overload(target, &call.method, arguments) {
            return Ok(found);
        }

        let slot = self.registry.member(target, &call.method, arguments)?;

        let known = self
            .types
            .get(target.index())
            .filter(|entity| entity.is_declared() && !entity.members.is_empty());
        if let Some(entity) = known {
            let signature = format!(
                "{}.{}({})",
                entity.full_name,
                call.method,
                call.parameter_types.join(", ")
            );
            warn!(
                call = %signature,
                caller = %context,
                "No declared overload matches call, using placeholder member"
            );
            diagnostics.push(Diagnostic::overload_mismatch(signature, context));
        } else if slot.created {
            trace!(method = %call.method, "Synthesized placeholder member");
        }

        Ok(slot.id)
    }

    /// Find a callable member named `method` whose parameter handles equal
    /// `arguments`, searching `target` and then its declared base types.
    fn find_overload(&self, target: TypeId, method: &str, arguments: &[TypeRef]) -> Option<MemberId> {
        let mut pending = vec![target];
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(entity) = self.types.get(current.index()) else {
                continue;
            };
            if !entity.is_declared() {
                continue;
            }

            let found = entity.members.iter().copied().find(|&id| {
                let member = &self.members[id.index()];
                member.name == method
                    && member.kind.is_callable()
                    && member.parameters.as_slice() == arguments
            });
            if found.is_some() {
                return found;
            }

            pending.extend(entity.base_types.iter().rev().map(|base| base.target));
        }

        None
    }

    /// Pass 4: append synthesized entities and freeze the graph.
    fn assemble(self, diagnostics: Vec<Diagnostic>) -> Result<ReferenceGraph> {
        let Self {
            mut types,
            mut members,
            declared,
            solutions,
            index,
            registry,
            type_parameters,
            declared_members,
            ..
        } = self;

        let Synthesized {
            types: placeholders,
            members: synthesized,
        } = registry.into_synthesized()?;

        let mut placeholder_index = HashMap::with_capacity(placeholders.len());
        for placeholder in &placeholders {
            placeholder_index.insert(
                placeholder_key(&placeholder.full_name, placeholder.arity),
                placeholder.id,
            );
        }
        types.extend(placeholders);

        for member in synthesized {
            types[member.owner.index()].members.push(member.id);
            members.push(member);
        }

        let graph = ReferenceGraph {
            declared_types: declared.len(),
            type_parameters,
            declared_members,
            types,
            members,
            solutions,
            index,
            placeholder_index,
            diagnostics,
        };

        debug!(
            types = graph.types.len(),
            members = graph.members.len(),
            external_types = graph.synthesized_types().count(),
            synthesized_members = graph.synthesized_members().count(),
            diagnostics = graph.diagnostics.len(),
            "Reference graph built"
        );

        Ok(graph)
    }
}

fn type_parameter(id: TypeId, name: &str, full_name: String, owner: EntityId) -> TypeEntity {
    let mut entity = TypeEntity::placeholder(id, name, 0, TypeOrigin::TypeParameter { owner });
    entity.full_name = full_name;
    entity
}
