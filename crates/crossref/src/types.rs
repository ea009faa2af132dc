//! Shared identifiers and enums for the crossref pipeline.
//!
//! - **Ids**: `TypeId`, `MemberId`, `EntityId` (arena handles into a
//!   [`crate::ReferenceGraph`])
//! - **Kinds**: `TypeKind`, `MemberKind`, `RelationKind`
//! - **Results**: `Cycle`
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Handles | `u32` arena index | Identity comparison without pointer aliasing |
//! | Kinds | Enum not String | Exhaustive matches in the aggregator |
//! | Metric relations | `RelationKind::Metric(String)` | Upstream kinds are open-ended |

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

/// Handle to a type entity in a [`crate::ReferenceGraph`].
///
/// Two references that denote the same entity always carry the same
/// `TypeId`, so equality is identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Position of the entity in the graph's type arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Handle to a member entity in a [`crate::ReferenceGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl MemberId {
    /// Position of the entity in the graph's member arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for MemberId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Either kind of entity that can take part in a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityId {
    /// A type (declared, external or ambiguous placeholder)
    Type(TypeId),
    /// A member (declared or synthesized)
    Member(MemberId),
}

impl From<TypeId> for EntityId {
    fn from(id: TypeId) -> Self {
        Self::Type(id)
    }
}

impl From<MemberId> for EntityId {
    fn from(id: MemberId) -> Self {
        Self::Member(id)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Type declaration kinds. All are handled uniformly by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Class declaration
    #[default]
    Class,
    /// Interface declaration
    Interface,
    /// Struct declaration
    Struct,
    /// Record declaration
    Record,
    /// Enum declaration
    Enum,
    /// Delegate declaration
    Delegate,
}

impl TypeKind {
    /// Lowercase keyword for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Record => "record",
            Self::Enum => "enum",
            Self::Delegate => "delegate",
        }
    }
}

/// Member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Field with a value type
    Field,
    /// Property with a value type
    Property,
    /// Method with parameters and a return type
    #[default]
    Method,
    /// Constructor with parameters
    Constructor,
}

impl MemberKind {
    /// Whether members of this kind can be the target of a call site.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }

    /// Lowercase keyword for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Property => "property",
            Self::Method => "method",
            Self::Constructor => "constructor",
        }
    }
}

/// How one entity uses another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Base class or implemented interface
    Inherits,
    /// Type of a field
    FieldType,
    /// Type of a property
    PropertyType,
    /// Type of a method/constructor parameter
    Parameter,
    /// Return type of a method
    ReturnType,
    /// Type of a local variable
    LocalVariable,
    /// Method or constructor call
    Call,
    /// Relation ingested from an upstream metric payload
    Metric(String),
}

impl RelationKind {
    /// Stable string form used in reports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inherits => "inherits",
            Self::FieldType => "field_type",
            Self::PropertyType => "property_type",
            Self::Parameter => "parameter",
            Self::ReturnType => "return_type",
            Self::LocalVariable => "local_variable",
            Self::Call => "call",
            Self::Metric(name) => name,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency cycle among types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Types in the strongly connected component, ordered by handle
    pub types: Vec<TypeId>,
}
