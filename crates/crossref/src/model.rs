//! The Model Store: the hierarchical, string-keyed model produced by a
//! language extractor.
//!
//! ```text
//! Repository → Solution → Project → Namespace → TypeDecl → Member → CallSite
//! ```
//!
//! Every cross-type reference (base types, field/parameter/return types,
//! local variable types, call targets) is a name string exactly as written in
//! source, possibly with generic or array syntax. Containers exclusively own
//! their children. Nested types are stored flat under their namespace and
//! point at their declaring type through [`TypeDecl::containing_type`].
//!
//! The qualifier produces a model of this same shape with the reference
//! strings rewritten; the graph builder consumes that qualified model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{MemberKind, TypeKind};

/// Top-level unit of a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Solutions in declaration order
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

/// An ordered collection of projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Solution name
    pub name: String,
    /// Projects in declaration order
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// An ordered collection of namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,
    /// Namespaces in declaration order
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
}

/// A dotted namespace name and the types declared directly under it.
///
/// Namespace names are not unique: two projects may both declare
/// `Company.Services`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Dotted namespace name; empty for the global namespace
    pub name: String,
    /// Types in declaration order, nested types included
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// A class, interface, struct, record, enum or delegate declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name without namespace or generic parameters
    pub name: String,
    /// Declaration kind
    #[serde(default)]
    pub kind: TypeKind,
    /// Fully-qualified name; absent until the qualifier assigns it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Simple name of the declaring type in the same namespace, for nested types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    /// Generic parameter names (e.g., `["TKey", "TValue"]`)
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    /// Base class and interface references
    #[serde(default)]
    pub base_types: Vec<String>,
    /// Members in declaration order
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A field, property, method or constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member name
    pub name: String,
    /// Member kind
    #[serde(default)]
    pub kind: MemberKind,
    /// Type of a field or property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Parameter types of a method or constructor, in order
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Return type of a method (`None` for constructors and `void`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Method-level generic parameter names
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    /// Types of local variables declared in the body
    #[serde(default)]
    pub local_variables: Vec<String>,
    /// Call sites in the body, in source order
    #[serde(default)]
    pub calls: Vec<CallSite>,
}

/// A recorded method call.
///
/// Chained and fluent calls are recorded as separate call sites, each with
/// the receiver type the extractor inferred for that link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Receiver type name; empty for calls on the enclosing type
    #[serde(default)]
    pub target_type: String,
    /// Called method name
    pub method: String,
    /// Argument types as recorded by the extractor
    #[serde(default)]
    pub parameter_types: Vec<String>,
}

// ============================================================================
// Construction helpers
// ============================================================================

impl Repository {
    /// Create an empty repository.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solutions: Vec::new(),
        }
    }

    /// Append a solution.
    #[must_use]
    pub fn with_solution(mut self, solution: Solution) -> Self {
        self.solutions.push(solution);
        self
    }

    /// Decode a repository from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a repository from a JSON file written by an extractor.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Encode the repository as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Iterate over every type declaration in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.solutions
            .iter()
            .flat_map(|s| &s.projects)
            .flat_map(|p| &p.namespaces)
            .flat_map(|n| &n.types)
    }

    /// Find a type by its assigned fully-qualified name.
    ///
    /// Only meaningful on a qualified model, where `full_name` is set.
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<&TypeDecl> {
        self.types()
            .find(|t| t.full_name.as_deref() == Some(full_name))
    }

    /// Total number of declared types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types().count()
    }
}

impl Solution {
    /// Create an empty solution.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            projects: Vec::new(),
        }
    }

    /// Append a project.
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }
}

impl Project {
    /// Create an empty project.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
        }
    }

    /// Append a namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }
}

impl Namespace {
    /// Create an empty namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Append a type declaration.
    #[must_use]
    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    /// Prefix a relative type path with this namespace's name.
    #[must_use]
    pub fn qualify(&self, relative: &str) -> String {
        if self.name.is_empty() {
            relative.to_string()
        } else {
            format!("{}.{relative}", self.name)
        }
    }
}

impl TypeDecl {
    /// Create a type declaration of the given kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Create a class declaration.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Create an interface declaration.
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Mark this type as nested inside `outer` (simple name, same namespace).
    #[must_use]
    pub fn nested_in(mut self, outer: impl Into<String>) -> Self {
        self.containing_type = Some(outer.into());
        self
    }

    /// Add a base class or interface reference.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_types.push(base.into());
        self
    }

    /// Add a generic parameter.
    #[must_use]
    pub fn with_generic(mut self, parameter: impl Into<String>) -> Self {
        self.generic_parameters.push(parameter.into());
        self
    }

    /// Add a member.
    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}

impl Member {
    fn of_kind(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Create a field of type `ty`.
    #[must_use]
    pub fn field(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let mut member = Self::of_kind(name, MemberKind::Field);
        member.value_type = Some(ty.into());
        member
    }

    /// Create a property of type `ty`.
    #[must_use]
    pub fn property(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let mut member = Self::of_kind(name, MemberKind::Property);
        member.value_type = Some(ty.into());
        member
    }

    /// Create a method with parameter types and an optional return type.
    #[must_use]
    pub fn method<S: Into<String>>(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = S>,
        return_type: Option<&str>,
    ) -> Self {
        let mut member = Self::of_kind(name, MemberKind::Method);
        member.parameters = parameters.into_iter().map(Into::into).collect();
        member.return_type = return_type.map(str::to_string);
        member
    }

    /// Create a constructor with parameter types.
    #[must_use]
    pub fn constructor<S: Into<String>>(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut member = Self::of_kind(name, MemberKind::Constructor);
        member.parameters = parameters.into_iter().map(Into::into).collect();
        member
    }

    /// Add a local variable type.
    #[must_use]
    pub fn with_local(mut self, ty: impl Into<String>) -> Self {
        self.local_variables.push(ty.into());
        self
    }

    /// Add a method-level generic parameter.
    #[must_use]
    pub fn with_generic(mut self, parameter: impl Into<String>) -> Self {
        self.generic_parameters.push(parameter.into());
        self
    }

    /// Add a call site.
    #[must_use]
    pub fn with_call(mut self, call: CallSite) -> Self {
        self.calls.push(call);
        self
    }

    /// Display signature, e.g. `Save(Models.User, int)`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }
}

impl CallSite {
    /// Create a call site.
    #[must_use]
    pub fn new<S: Into<String>>(
        target_type: impl Into<String>,
        method: impl Into<String>,
        parameter_types: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            target_type: target_type.into(),
            method: method.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Display signature, e.g. `Foo.Method(int)`.
    #[must_use]
    pub fn signature(&self) -> String {
        if self.target_type.is_empty() {
            format!("{}({})", self.method, self.parameter_types.join(", "))
        } else {
            format!(
                "{}.{}({})",
                self.target_type,
                self.method,
                self.parameter_types.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_json_with_defaults() {
        let json = r#"{
            "name": "repo",
            "solutions": [{
                "name": "sln",
                "projects": [{
                    "name": "App",
                    "namespaces": [{
                        "name": "App.Models",
                        "types": [{ "name": "User", "members": [
                            { "name": "Id", "kind": "property", "value_type": "int" }
                        ]}]
                    }]
                }]
            }]
        }"#;

        let repo = Repository::from_json_str(json).expect("decode failed");
        let user = repo.types().next().expect("one type");

        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeKind::Class);
        assert!(user.full_name.is_none());
        assert_eq!(user.members[0].kind, MemberKind::Property);
        assert_eq!(user.members[0].value_type.as_deref(), Some("int"));
    }

    #[test]
    fn json_encoding_round_trips_builder_output() {
        let repo = Repository::new("repo").with_solution(
            Solution::new("sln").with_project(
                Project::new("App").with_namespace(
                    Namespace::new("App").with_type(
                        TypeDecl::class("Worker").with_member(
                            Member::method("Run", ["int"], None)
                                .with_call(CallSite::new("Foo", "Method", ["int"])),
                        ),
                    ),
                ),
            ),
        );

        let decoded = Repository::from_json_str(&repo.to_json().unwrap()).unwrap();
        assert_eq!(decoded, repo);
    }

    #[test]
    fn namespace_qualify_handles_global_namespace() {
        assert_eq!(Namespace::new("").qualify("Foo"), "Foo");
        assert_eq!(Namespace::new("A.B").qualify("Foo.Bar"), "A.B.Foo.Bar");
    }

    #[test]
    fn signatures_render_parameter_lists() {
        let method = Member::method("Save", ["Models.User", "int"], Some("bool"));
        assert_eq!(method.signature(), "Save(Models.User, int)");

        assert_eq!(CallSite::new("Foo", "Method", ["int"]).signature(), "Foo.Method(int)");
        assert_eq!(CallSite::new("", "Helper", Vec::<String>::new()).signature(), "Helper()");
    }

    #[test]
    fn missing_model_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Repository::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
