//! Error types for crossref operations.
//!
//! Errors are split the same way the pipeline treats them:
//!
//! - **`Error`**: fatal failures that abort a run (broken containment,
//!   unreadable input, bad configuration)
//! - **`Diagnostic`**: recoverable conditions that are collected and counted
//!   but never stop the pipeline
//!
//! ## Error Philosophy
//!
//! Resolution is "best effort" for references and strict for structure:
//! - An ambiguous or unknown name must not prevent resolving the rest
//! - Recoverable conditions are logged and reported, not thrown
//! - Only structural invariant violations and I/O failures terminate a run

use std::fmt;

use thiserror::Error;

/// Result type for crossref operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for crossref operations.
///
/// These errors represent failures that prevent a run from completing.
/// No partial output is returned alongside them.
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied model breaks a containment invariant
    #[error("structural invariant violated ({invariant}) at {entity}")]
    Invariant {
        /// Which invariant failed
        invariant: Invariant,
        /// Path of the offending entity (e.g., `Repo/Sln/Proj/Ns/Type`)
        entity: String,
    },

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model file could not be decoded
    #[error("model decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (bug in crossref)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invariant violation for the entity at `entity`.
    #[must_use]
    pub fn invariant(invariant: Invariant, entity: impl Into<String>) -> Self {
        Self::Invariant {
            invariant,
            entity: entity.into(),
        }
    }

    /// Returns the violated invariant, if this is a structural failure.
    #[must_use]
    pub fn as_invariant(&self) -> Option<Invariant> {
        match self {
            Self::Invariant { invariant, .. } => Some(*invariant),
            _ => None,
        }
    }
}

/// Structural invariants every later stage relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// An entity has no name, so it cannot be addressed or qualified
    EmptyName,
    /// A nested type names a declaring type that does not exist in its namespace
    MissingParent,
    /// A type contains itself through its chain of declaring types
    ContainmentCycle,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty name"),
            Self::MissingParent => write!(f, "missing parent"),
            Self::ContainmentCycle => write!(f, "containment cycle"),
        }
    }
}

/// A recoverable condition encountered while resolving a reference.
///
/// Diagnostics are collected during a run and surfaced through
/// [`crate::ResolveStats`] and the stage outputs; they never halt a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category of the condition
    pub kind: DiagnosticKind,
    /// The name (or call signature) that triggered it
    pub name: String,
    /// Where it was found (fully-qualified name of the enclosing entity)
    pub context: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.context, self.name, self.kind)
    }
}

/// Categorization of recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Several equally-ranked candidates; the original name was kept
    Ambiguous,
    /// No declared candidate; treated as an external dependency
    Unresolved,
    /// A call matched no declared overload; a placeholder member was made
    OverloadMismatch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous => write!(f, "ambiguous reference"),
            Self::Unresolved => write!(f, "unresolved reference"),
            Self::OverloadMismatch => write!(f, "overload mismatch"),
        }
    }
}

impl DiagnosticKind {
    /// Returns `true` for conditions that point at a possible modelling
    /// problem in the repository rather than an expected external reference.
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Ambiguous | Self::OverloadMismatch)
    }
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, name: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create an overload mismatch diagnostic for a call signature.
    #[must_use]
    pub fn overload_mismatch(signature: impl Into<String>, context: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::OverloadMismatch, signature, context)
    }
}
