//! Structural validation of a Model Store.
//!
//! Every later stage assumes strict containment: named entities, nested
//! types whose declaring type exists in the same namespace, and no type that
//! contains itself through its chain of declaring types. A violation is
//! fatal and reported as [`Error::Invariant`] naming the offending entity.
//!
//! The nested-type layout computed here ([`TypeLayout`]) is shared by the
//! qualifier and the graph builder so both derive identical fully-qualified
//! names.

use tracing::debug;

use crate::error::{Error, Invariant, Result};
use crate::model::{Namespace, Repository};

/// Position of one type inside its namespace's containment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeLayout {
    /// Index of the declaring type in the namespace's `types`, if nested
    pub parent: Option<usize>,
    /// Dotted path from the namespace (e.g., `Outer.Inner`)
    pub relative_path: String,
}

/// Check every structural invariant of `repository`.
///
/// # Errors
///
/// Returns [`Error::Invariant`] for the first violation found, in declaration
/// order.
pub fn validate(repository: &Repository) -> Result<()> {
    let repo_path = display_name(&repository.name);
    if repository.name.is_empty() {
        return Err(Error::invariant(Invariant::EmptyName, repo_path));
    }

    let mut types_checked = 0usize;
    for solution in &repository.solutions {
        let sln_path = format!("{repo_path}/{}", display_name(&solution.name));
        if solution.name.is_empty() {
            return Err(Error::invariant(Invariant::EmptyName, sln_path));
        }
        for project in &solution.projects {
            let proj_path = format!("{sln_path}/{}", display_name(&project.name));
            if project.name.is_empty() {
                return Err(Error::invariant(Invariant::EmptyName, proj_path));
            }
            for namespace in &project.namespaces {
                // The global namespace is legitimately unnamed.
                let ns_path = format!("{proj_path}/{}", namespace_display(namespace));
                check_members(namespace, &ns_path)?;
                layout_namespace(namespace, &ns_path)?;
                types_checked += namespace.types.len();
            }
        }
    }

    debug!(types_checked, "Model structure validated");
    Ok(())
}

fn check_members(namespace: &Namespace, ns_path: &str) -> Result<()> {
    for ty in &namespace.types {
        let type_path = format!("{ns_path}/{}", display_name(&ty.name));
        if ty.name.is_empty() {
            return Err(Error::invariant(Invariant::EmptyName, type_path));
        }
        for member in &ty.members {
            if member.name.is_empty() {
                return Err(Error::invariant(
                    Invariant::EmptyName,
                    format!("{type_path}/{}", display_name(&member.name)),
                ));
            }
        }
    }
    Ok(())
}

/// Resolve declaring-type links and relative paths for a namespace.
///
/// A type's `containing_type` names its declaring type by simple name; the
/// first other type in declaration order with that name is the parent.
///
/// # Errors
///
/// [`Invariant::MissingParent`] if no such type exists,
/// [`Invariant::ContainmentCycle`] if following parents returns to the start.
pub(crate) fn layout_namespace(namespace: &Namespace, ns_path: &str) -> Result<Vec<TypeLayout>> {
    let types = &namespace.types;
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(types.len());

    for (index, ty) in types.iter().enumerate() {
        let Some(outer) = ty.containing_type.as_deref() else {
            parents.push(None);
            continue;
        };

        let parent = types
            .iter()
            .enumerate()
            .find(|(i, t)| *i != index && t.name == outer)
            .map(|(i, _)| i);

        match parent {
            Some(parent) => parents.push(Some(parent)),
            None if ty.name == outer => {
                return Err(Error::invariant(
                    Invariant::ContainmentCycle,
                    format!("{ns_path}/{}", ty.name),
                ));
            }
            None => {
                return Err(Error::invariant(
                    Invariant::MissingParent,
                    format!("{ns_path}/{}", ty.name),
                ));
            }
        }
    }

    let mut layouts = Vec::with_capacity(types.len());
    for (index, ty) in types.iter().enumerate() {
        let mut chain = vec![ty.name.as_str()];
        let mut current = parents[index];
        while let Some(parent) = current {
            // A chain longer than the namespace can only be a loop.
            if parent == index || chain.len() > types.len() {
                return Err(Error::invariant(
                    Invariant::ContainmentCycle,
                    format!("{ns_path}/{}", ty.name),
                ));
            }
            chain.push(types[parent].name.as_str());
            current = parents[parent];
        }
        chain.reverse();
        layouts.push(TypeLayout {
            parent: parents[index],
            relative_path: chain.join("."),
        });
    }

    Ok(layouts)
}

/// Path fragment for a namespace in error messages.
pub(crate) fn namespace_display(namespace: &Namespace) -> &str {
    if namespace.name.is_empty() {
        "<global>"
    } else {
        &namespace.name
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "<unnamed>" } else { name }
}
