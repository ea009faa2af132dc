//! Entity and reference types of the reference graph.

use std::fmt;

use serde::Serialize;

use crate::type_name::Suffix;
use crate::types::{EntityId, MemberId, MemberKind, TypeId, TypeKind};

/// Where a type entity came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum TypeOrigin {
    /// Declared in the repository, at these container indices
    Declared {
        /// Solution index in the repository
        solution: usize,
        /// Project index in the solution
        project: usize,
        /// Namespace index in the project
        namespace: usize,
    },
    /// Referenced but declared nowhere in the repository
    External,
    /// Referenced by a name that matched several declarations
    ///
    /// One placeholder exists per name and arity, so every site writing
    /// the name shares it, even a site whose own scope search found a
    /// different candidate set.
    Ambiguous {
        /// Handles of the candidates in the name's ambiguity log entry,
        /// which records the first site that found the name ambiguous
        candidates: Vec<TypeId>,
    },
    /// A generic parameter of a type or method
    TypeParameter {
        /// The declaring type or member
        owner: EntityId,
    },
}

/// Where a member entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberOrigin {
    /// Declared in the repository
    Declared,
    /// Synthesized for a call signature no declaration matched
    Synthesized,
}

/// A type reference whose every component is a handle.
///
/// Equality is structural, which is what overload matching compares:
/// `List<User>` and `List<User>` from different call sites are equal, while
/// `List<User>` and `List<User>[]` are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    /// The referenced type
    pub target: TypeId,
    /// Generic arguments in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeRef>,
    /// Array and nullable suffixes in source order
    #[serde(skip)]
    pub suffixes: Vec<Suffix>,
}

impl TypeRef {
    /// A plain reference to `target`.
    #[must_use]
    pub fn to(target: TypeId) -> Self {
        Self {
            target,
            arguments: Vec::new(),
            suffixes: Vec::new(),
        }
    }

    /// Every handle in the reference, outermost first.
    #[must_use]
    pub fn handles(&self) -> Vec<TypeId> {
        let mut handles = vec![self.target];
        for argument in &self.arguments {
            handles.extend(argument.handles());
        }
        handles
    }
}

/// A type entity: declared, external placeholder, ambiguous placeholder or
/// type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeEntity {
    /// This entity's handle
    pub id: TypeId,
    /// Simple name (placeholders carry the name as referenced)
    pub name: String,
    /// Fully-qualified name, unique among declared types
    pub full_name: String,
    /// Declaration kind; placeholders default to class
    pub kind: TypeKind,
    /// Provenance
    #[serde(flatten)]
    pub origin: TypeOrigin,
    /// Declaring type, for nested types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<TypeId>,
    /// Number of generic parameters
    pub arity: usize,
    /// Type-parameter entities declared by this type
    pub generic_parameters: Vec<TypeId>,
    /// Base class and interface references
    pub base_types: Vec<TypeRef>,
    /// Declared members, then synthesized members in discovery order
    pub members: Vec<MemberId>,
}

impl TypeEntity {
    pub(crate) fn placeholder(id: TypeId, name: &str, arity: usize, origin: TypeOrigin) -> Self {
        Self {
            id,
            name: name.rsplit('.').next().unwrap_or(name).to_string(),
            full_name: name.to_string(),
            kind: TypeKind::Class,
            origin,
            containing_type: None,
            arity,
            generic_parameters: Vec::new(),
            base_types: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Declared in the repository.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        matches!(self.origin, TypeOrigin::Declared { .. })
    }

    /// External or ambiguous placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.origin, TypeOrigin::External | TypeOrigin::Ambiguous { .. })
    }

    /// Generic parameter entity.
    #[must_use]
    pub fn is_type_parameter(&self) -> bool {
        matches!(self.origin, TypeOrigin::TypeParameter { .. })
    }
}

/// A bound call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRef {
    /// Receiver type
    pub receiver: TypeRef,
    /// The overload the call is bound to
    pub member: MemberId,
    /// Argument types as recorded
    pub arguments: Vec<TypeRef>,
}

/// A member entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberEntity {
    /// This entity's handle
    pub id: MemberId,
    /// Owning type
    pub owner: TypeId,
    /// Member name
    pub name: String,
    /// Member kind; synthesized members are methods
    pub kind: MemberKind,
    /// Provenance
    pub origin: MemberOrigin,
    /// Field or property type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
    /// Parameter types in order
    pub parameters: Vec<TypeRef>,
    /// Return type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    /// Method-level type-parameter entities
    pub generic_parameters: Vec<TypeId>,
    /// Local variable types
    pub local_variables: Vec<TypeRef>,
    /// Call sites in source order
    pub calls: Vec<CallRef>,
}

impl MemberEntity {
    pub(crate) fn synthesized(id: MemberId, owner: TypeId, name: &str, parameters: Vec<TypeRef>) -> Self {
        Self {
            id,
            owner,
            name: name.to_string(),
            kind: MemberKind::Method,
            origin: MemberOrigin::Synthesized,
            value_type: None,
            parameters,
            return_type: None,
            generic_parameters: Vec::new(),
            local_variables: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Synthesized for an unmatched call signature.
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.origin == MemberOrigin::Synthesized
    }
}

/// A namespace of the graph's container mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceNode {
    /// Namespace name
    pub name: String,
    /// Declared types in declaration order
    pub types: Vec<TypeId>,
}

/// A project of the graph's container mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectNode {
    /// Project name
    pub name: String,
    /// Namespaces in declaration order
    pub namespaces: Vec<NamespaceNode>,
}

/// A solution of the graph's container mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolutionNode {
    /// Solution name
    pub name: String,
    /// Projects in declaration order
    pub projects: Vec<ProjectNode>,
}

impl fmt::Display for TypeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared { .. } => write!(f, "declared"),
            Self::External => write!(f, "external"),
            Self::Ambiguous { candidates } => write!(f, "ambiguous ({} candidates)", candidates.len()),
            Self::TypeParameter { .. } => write!(f, "type parameter"),
        }
    }
}
