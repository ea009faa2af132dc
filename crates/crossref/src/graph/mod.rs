//! The reference graph: the qualified model with every reference replaced by
//! an arena handle.
//!
//! ## Arena layout
//!
//! | Range | Contents |
//! |-------|----------|
//! | Types `0..declared` | Declared types, declaration order |
//! | Types, next | Type parameters of declared types and methods |
//! | Types, last | External and ambiguous placeholders, discovery order |
//! | Members `0..declared` | Declared members, declaration order |
//! | Members, last | Placeholder members for unmatched call signatures |
//!
//! Handles are identities: two references to the same entity carry the same
//! [`TypeId`] or [`MemberId`].

mod builder;
mod registry;
mod types;

pub use builder::build;
pub use types::{
    CallRef, MemberEntity, MemberOrigin, NamespaceNode, ProjectNode, SolutionNode, TypeEntity,
    TypeOrigin, TypeRef,
};

use std::collections::HashMap;

use crate::error::Diagnostic;
use crate::type_name::TypeName;
use crate::types::{EntityId, MemberId, TypeId};
use registry::placeholder_key;

/// Resolved, handle-based view of a repository.
#[derive(Debug, Clone)]
pub struct ReferenceGraph {
    types: Vec<TypeEntity>,
    members: Vec<MemberEntity>,
    solutions: Vec<SolutionNode>,
    index: HashMap<(String, usize), TypeId>,
    placeholder_index: HashMap<String, TypeId>,
    diagnostics: Vec<Diagnostic>,
    declared_types: usize,
    type_parameters: usize,
    declared_members: usize,
}

impl ReferenceGraph {
    /// Look up a type entity.
    #[must_use]
    pub fn ty(&self, id: TypeId) -> Option<&TypeEntity> {
        self.types.get(id.index())
    }

    /// Look up a member entity.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&MemberEntity> {
        self.members.get(id.index())
    }

    /// Every type entity in arena order.
    pub fn types(&self) -> &[TypeEntity] {
        &self.types
    }

    /// Every member entity in arena order.
    pub fn members(&self) -> &[MemberEntity] {
        &self.members
    }

    /// Declared types in declaration order.
    pub fn declared_types(&self) -> &[TypeEntity] {
        &self.types[..self.declared_types]
    }

    /// External and ambiguous placeholder types.
    pub fn synthesized_types(&self) -> impl Iterator<Item = &TypeEntity> {
        self.types[self.declared_types + self.type_parameters..].iter()
    }

    /// Placeholder members created for unmatched call signatures.
    pub fn synthesized_members(&self) -> impl Iterator<Item = &MemberEntity> {
        self.members[self.declared_members..].iter()
    }

    /// The container mirror: solutions → projects → namespaces → types.
    pub fn solutions(&self) -> &[SolutionNode] {
        &self.solutions
    }

    /// Overload mismatches and ambiguous references met while building.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Handle for a name: a declared fully-qualified name first, then a
    /// non-generic placeholder of that name.
    ///
    /// When two declarations share a fully-qualified name, the first one
    /// declared is returned.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.declared_by_name(name, 0)
            .or_else(|| self.placeholder(name, 0))
            .or_else(|| {
                self.declared_types()
                    .iter()
                    .find(|t| t.full_name == name)
                    .map(|t| t.id)
            })
    }

    /// Declared type with the given fully-qualified name and generic arity.
    #[must_use]
    pub fn declared_by_name(&self, full_name: &str, arity: usize) -> Option<TypeId> {
        self.index.get(&(full_name.to_string(), arity)).copied()
    }

    /// Placeholder type for a name as referenced and its generic arity.
    #[must_use]
    pub fn placeholder(&self, name: &str, arity: usize) -> Option<TypeId> {
        self.placeholder_index.get(&placeholder_key(name, arity)).copied()
    }

    /// Members of `owner` named `name`, declared overloads first.
    #[must_use]
    pub fn members_named(&self, owner: TypeId, name: &str) -> Vec<MemberId> {
        self.ty(owner)
            .map(|t| {
                t.members
                    .iter()
                    .copied()
                    .filter(|&id| self.members[id.index()].name == name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render a reference with fully-qualified names, e.g. `List<App.User>[]`.
    #[must_use]
    pub fn display_ref(&self, reference: &TypeRef) -> String {
        self.type_name(reference).to_string()
    }

    fn type_name(&self, reference: &TypeRef) -> TypeName {
        let base = self
            .ty(reference.target)
            .map_or_else(|| format!("#{}", reference.target.0), |t| match t.origin {
                TypeOrigin::TypeParameter { .. } => t.name.clone(),
                _ => t.full_name.clone(),
            });
        TypeName {
            base,
            arguments: reference.arguments.iter().map(|a| self.type_name(a)).collect(),
            suffixes: reference.suffixes.clone(),
        }
    }

    /// Render a member as `Owner.Name(Param1, Param2)`; fields and
    /// properties have no parameter list.
    #[must_use]
    pub fn member_display(&self, id: MemberId) -> Option<String> {
        let member = self.member(id)?;
        let owner = self.ty(member.owner)?;
        if member.kind.is_callable() {
            let parameters: Vec<String> = member.parameters.iter().map(|p| self.display_ref(p)).collect();
            Some(format!("{}.{}({})", owner.full_name, member.name, parameters.join(", ")))
        } else {
            Some(format!("{}.{}", owner.full_name, member.name))
        }
    }

    /// Display name of any entity.
    #[must_use]
    pub fn entity_display(&self, id: EntityId) -> Option<String> {
        match id {
            EntityId::Type(t) => self.ty(t).map(|t| t.full_name.clone()),
            EntityId::Member(m) => self.member_display(m),
        }
    }

    /// Every entity that can take part in a relation, types before members.
    ///
    /// Type parameters are excluded.
    pub fn relation_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.types
            .iter()
            .filter(|t| !t.is_type_parameter())
            .map(|t| EntityId::Type(t.id))
            .chain(self.members.iter().map(|m| EntityId::Member(m.id)))
    }

    /// Number of declared types.
    #[must_use]
    pub fn declared_type_count(&self) -> usize {
        self.declared_types
    }

    /// Number of declared members.
    #[must_use]
    pub fn declared_member_count(&self) -> usize {
        self.declared_members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::model::{CallSite, Member, Namespace, Project, Repository, Solution, TypeDecl};
    use crate::qualifier::qualify;

    fn graph_for(namespaces: Vec<Namespace>) -> ReferenceGraph {
        let mut project = Project::new("App");
        project.namespaces = namespaces;
        let repo = Repository::new("repo").with_solution(Solution::new("sln").with_project(project));
        build(&qualify(&repo, false).unwrap(), false).unwrap()
    }

    #[test]
    fn references_to_the_same_declaration_share_a_handle() {
        let graph = graph_for(vec![
            Namespace::new("App.Models").with_type(TypeDecl::class("User")),
            Namespace::new("App.Services").with_type(
                TypeDecl::class("UserService")
                    .with_member(Member::field("current", "User"))
                    .with_member(Member::method("Save", ["User"], Some("Models.User"))),
            ),
        ]);

        let user = graph.type_by_name("App.Models.User").unwrap();
        let service = graph.ty(graph.type_by_name("App.Services.UserService").unwrap()).unwrap();
        let field = graph.member(service.members[0]).unwrap();
        let save = graph.member(service.members[1]).unwrap();

        assert_eq!(field.value_type.as_ref().unwrap().target, user);
        assert_eq!(save.parameters[0].target, user);
        assert_eq!(save.return_type.as_ref().unwrap().target, user);
    }

    #[test]
    fn generic_arguments_become_handles() {
        let graph = graph_for(vec![Namespace::new("App")
            .with_type(TypeDecl::class("User"))
            .with_type(TypeDecl::class("Cache").with_member(Member::field("items", "Dictionary<string,User[]>")))]);

        let cache = graph.ty(graph.type_by_name("App.Cache").unwrap()).unwrap();
        let items = graph.member(cache.members[0]).unwrap().value_type.clone().unwrap();

        assert_eq!(graph.display_ref(&items), "Dictionary<string,App.User[]>");
        assert_eq!(items.arguments[1].target, graph.type_by_name("App.User").unwrap());
        assert_eq!(graph.placeholder("Dictionary", 2), Some(items.target));
    }

    #[test]
    fn type_parameters_resolve_to_owned_entities() {
        let graph = graph_for(vec![Namespace::new("App").with_type(
            TypeDecl::class("Box")
                .with_generic("T")
                .with_member(Member::field("value", "T"))
                .with_member(Member::method("Map", ["TOut"], Some("T")).with_generic("TOut")),
        )]);

        let boxed = graph.ty(graph.declared_by_name("App.Box", 1).unwrap()).unwrap();
        let t = boxed.generic_parameters[0];
        let value = graph.member(boxed.members[0]).unwrap();
        let map = graph.member(boxed.members[1]).unwrap();

        assert_eq!(value.value_type.as_ref().unwrap().target, t);
        assert_eq!(map.parameters[0].target, map.generic_parameters[0]);
        assert_eq!(
            graph.ty(t).unwrap().origin,
            TypeOrigin::TypeParameter { owner: EntityId::Type(boxed.id) }
        );
        assert_eq!(graph.synthesized_types().count(), 0);
    }

    #[test]
    fn calls_bind_to_matching_overload() {
        let graph = graph_for(vec![Namespace::new("App")
            .with_type(
                TypeDecl::class("Printer")
                    .with_member(Member::method("Print", ["int"], None))
                    .with_member(Member::method("Print", ["string"], None)),
            )
            .with_type(TypeDecl::class("Worker").with_member(
                Member::method("Run", Vec::<String>::new(), None)
                    .with_call(CallSite::new("Printer", "Print", ["string"])),
            ))]);

        let printer = graph.ty(graph.type_by_name("App.Printer").unwrap()).unwrap();
        let worker = graph.ty(graph.type_by_name("App.Worker").unwrap()).unwrap();
        let run = graph.member(worker.members[0]).unwrap();

        assert_eq!(run.calls[0].member, printer.members[1]);
        assert_eq!(graph.synthesized_members().count(), 0);
        assert!(graph.diagnostics().is_empty());
    }

    #[test]
    fn calls_to_inherited_methods_bind_through_base_types() {
        let graph = graph_for(vec![Namespace::new("App")
            .with_type(TypeDecl::class("Base").with_member(Member::method("Save", Vec::<String>::new(), None)))
            .with_type(TypeDecl::class("Derived").with_base("Base"))
            .with_type(TypeDecl::class("Client").with_member(
                Member::method("Use", Vec::<String>::new(), None)
                    .with_call(CallSite::new("Derived", "Save", Vec::<String>::new())),
            ))]);

        let base = graph.ty(graph.type_by_name("App.Base").unwrap()).unwrap();
        let client = graph.ty(graph.type_by_name("App.Client").unwrap()).unwrap();

        assert_eq!(graph.member(client.members[0]).unwrap().calls[0].member, base.members[0]);
    }

    #[test]
    fn overload_mismatch_synthesizes_member_on_known_type() {
        let graph = graph_for(vec![Namespace::new("App")
            .with_type(TypeDecl::class("Printer").with_member(Member::method("Print", ["int"], None)))
            .with_type(TypeDecl::class("Worker").with_member(
                Member::method("Run", Vec::<String>::new(), None)
                    .with_call(CallSite::new("Printer", "Print", ["double"]))
                    .with_call(CallSite::new("Printer", "Print", ["double"])),
            ))]);

        let printer_id = graph.type_by_name("App.Printer").unwrap();
        let placeholders: Vec<&MemberEntity> = graph.synthesized_members().collect();

        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].owner, printer_id);
        assert_eq!(graph.members_named(printer_id, "Print").len(), 2);
        assert_eq!(graph.diagnostics().len(), 2);
        assert!(graph
            .diagnostics()
            .iter()
            .all(|d| d.kind == DiagnosticKind::OverloadMismatch && d.context == "App.Worker.Run"));
        assert_eq!(
            graph.member_display(placeholders[0].id).unwrap(),
            "App.Printer.Print(double)"
        );
    }

    #[test]
    fn calls_on_this_target_enclosing_type() {
        let graph = graph_for(vec![Namespace::new("App").with_type(
            TypeDecl::class("Worker")
                .with_member(Member::method("Helper", Vec::<String>::new(), None))
                .with_member(
                    Member::method("Run", Vec::<String>::new(), None)
                        .with_call(CallSite::new("", "Helper", Vec::<String>::new())),
                ),
        )]);

        let worker = graph.ty(graph.type_by_name("App.Worker").unwrap()).unwrap();
        let run = graph.member(worker.members[1]).unwrap();

        assert_eq!(run.calls[0].receiver.target, worker.id);
        assert_eq!(run.calls[0].member, worker.members[0]);
    }

    #[test]
    fn container_mirror_follows_model_shape() {
        let graph = graph_for(vec![
            Namespace::new("App.A").with_type(TypeDecl::class("One")).with_type(TypeDecl::class("Two")),
            Namespace::new("App.B").with_type(TypeDecl::interface("IThree")),
        ]);

        let namespaces = &graph.solutions()[0].projects[0].namespaces;
        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespaces[0].types.len(), 2);
        assert_eq!(graph.ty(namespaces[1].types[0]).unwrap().full_name, "App.B.IThree");
    }
}
