//! Relation aggregation and coupling queries.
//!
//! The [`RelationMap`] counts directed relations between entities of a
//! [`ReferenceGraph`]:
//!
//! ```text
//! source entity → target entity → relation kind → count
//! ```
//!
//! Every type and member of the graph has an entry, possibly empty, so
//! "exists with no relations" and "not in the graph" are distinguishable.
//! Queries about unknown entities or names answer zero.
//!
//! ## Recorded edges
//!
//! | Reference | Type-level edge | Member-level edge |
//! |-----------|-----------------|-------------------|
//! | Base type | `Inherits` | |
//! | Field / property type | `FieldType` / `PropertyType` | |
//! | Parameter, return, local | `Parameter`, `ReturnType`, `LocalVariable` | |
//! | Call site | `Call` to the callee's owner | `Call` to the callee |
//!
//! Type-level edges go to every handle in the reference, generic arguments
//! included. Type parameters never take part.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, trace};

use crate::config::ResolveOptions;
use crate::graph::{ReferenceGraph, TypeRef};
use crate::types::{Cycle, EntityId, MemberKind, RelationKind, TypeId};

/// Per-kind counts between one source and one target.
pub type KindCounts = BTreeMap<RelationKind, u64>;

/// Targets of one source entity.
pub type Targets = BTreeMap<EntityId, KindCounts>;

/// Directed, per-kind relation counts between graph entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationMap {
    relations: BTreeMap<EntityId, Targets>,
    names: HashMap<String, EntityId>,
    include_self_relations: bool,
}

/// Count every relation in `graph`.
#[must_use]
pub fn aggregate(graph: &ReferenceGraph, options: &ResolveOptions) -> RelationMap {
    let mut map = RelationMap {
        include_self_relations: options.include_self_relations,
        ..RelationMap::default()
    };

    // Generic types claim their plain name only when no non-generic entity
    // already holds it.
    let mut generic_names = Vec::new();
    for entity in graph.relation_entities() {
        map.relations.insert(entity, Targets::new());
        let Some(name) = graph.entity_display(entity) else {
            continue;
        };
        match entity {
            EntityId::Type(id) => match graph.ty(id).map_or(0, |t| t.arity) {
                0 => {
                    map.names.entry(name).or_insert(entity);
                }
                arity => {
                    map.names.entry(format!("{name}`{arity}")).or_insert(entity);
                    generic_names.push((name, entity));
                }
            },
            EntityId::Member(_) => {
                map.names.entry(name).or_insert(entity);
            }
        }
    }
    for (name, entity) in generic_names {
        map.names.entry(name).or_insert(entity);
    }

    for ty in graph.types().iter().filter(|t| !t.is_type_parameter()) {
        for base in &ty.base_types {
            map.record_type_ref(graph, ty.id, base, &RelationKind::Inherits);
        }
    }

    for member in graph.members() {
        let owner = member.owner;
        if let Some(value_type) = &member.value_type {
            let kind = if member.kind == MemberKind::Property {
                RelationKind::PropertyType
            } else {
                RelationKind::FieldType
            };
            map.record_type_ref(graph, owner, value_type, &kind);
        }
        for parameter in &member.parameters {
            map.record_type_ref(graph, owner, parameter, &RelationKind::Parameter);
        }
        if let Some(return_type) = &member.return_type {
            map.record_type_ref(graph, owner, return_type, &RelationKind::ReturnType);
        }
        for local in &member.local_variables {
            map.record_type_ref(graph, owner, local, &RelationKind::LocalVariable);
        }
        for call in &member.calls {
            let Some(callee) = graph.member(call.member) else {
                continue;
            };
            map.add(owner.into(), callee.owner.into(), RelationKind::Call, 1);
            if options.member_relations {
                map.add(member.id.into(), callee.id.into(), RelationKind::Call, 1);
            }
        }
    }

    debug!(
        entities = map.len(),
        edges = map.edge_count(),
        "Relations aggregated"
    );

    map
}

impl RelationMap {
    fn record_type_ref(
        &mut self,
        graph: &ReferenceGraph,
        source: TypeId,
        reference: &TypeRef,
        kind: &RelationKind,
    ) {
        for target in reference.handles() {
            if graph.ty(target).is_some_and(|t| t.is_type_parameter()) {
                continue;
            }
            self.add(source.into(), target.into(), kind.clone(), 1);
        }
    }

    /// Add `count` relations of `kind` from `source` to `target`.
    ///
    /// Returns `false` if either entity is not in the map, or if this is a
    /// self relation and self relations are not counted.
    pub fn add(&mut self, source: EntityId, target: EntityId, kind: RelationKind, count: u64) -> bool {
        if source == target && !self.include_self_relations {
            return false;
        }
        if !self.relations.contains_key(&target) {
            return false;
        }
        let Some(targets) = self.relations.get_mut(&source) else {
            return false;
        };
        let slot = targets.entry(target).or_default().entry(kind).or_insert(0);
        *slot = slot.saturating_add(count);
        true
    }

    /// Add a relation reported by an upstream metric.
    ///
    /// Only unsigned integer payloads are counted; anything else is skipped
    /// and `false` is returned.
    pub fn ingest_metric(
        &mut self,
        source: EntityId,
        target: EntityId,
        kind: &str,
        payload: &serde_json::Value,
    ) -> bool {
        let Some(count) = payload.as_u64() else {
            trace!(kind, %payload, "Skipping non-numeric metric payload");
            return false;
        };
        self.add(source, target, RelationKind::Metric(kind.to_string()), count)
    }

    /// Entity for a display name: a type's fully-qualified name, or a member
    /// as `Owner.Name(Params)` (methods) or `Owner.Name` (fields, properties).
    ///
    /// Generic types are also reachable as ``Name`N`` (e.g. ``List`1``). A
    /// plain name shared by several entities resolves to a non-generic one
    /// if there is one, otherwise to the first in arena order; members with
    /// identical display names resolve to the first declared.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Sum of all relation counts from `source_name` to `target_name`.
    ///
    /// Unknown names answer zero.
    #[must_use]
    pub fn total_relation_count(&self, source_name: &str, target_name: &str) -> u64 {
        match (self.entity(source_name), self.entity(target_name)) {
            (Some(source), Some(target)) => self.total_between(source, target),
            _ => 0,
        }
    }

    /// Sum of all relation counts from `source` to `target`.
    #[must_use]
    pub fn total_between(&self, source: EntityId, target: EntityId) -> u64 {
        self.relations
            .get(&source)
            .and_then(|targets| targets.get(&target))
            .map_or(0, |kinds| kinds.values().fold(0, |total, &count| total.saturating_add(count)))
    }

    /// Count of one relation kind from `source` to `target`.
    #[must_use]
    pub fn count(&self, source: EntityId, target: EntityId, kind: &RelationKind) -> u64 {
        self.relations
            .get(&source)
            .and_then(|targets| targets.get(&target))
            .and_then(|kinds| kinds.get(kind))
            .copied()
            .unwrap_or(0)
    }

    /// Outgoing relations of `source`; `None` if it is not in the graph.
    #[must_use]
    pub fn relations_from(&self, source: EntityId) -> Option<&Targets> {
        self.relations.get(&source)
    }

    /// Whether `entity` has an entry.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.relations.contains_key(&entity)
    }

    /// Every `(source, target, kind, count)`, ordered by source, target, kind.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityId, &RelationKind, u64)> + '_ {
        self.relations.iter().flat_map(|(&source, targets)| {
            targets.iter().flat_map(move |(&target, kinds)| {
                kinds.iter().map(move |(kind, &count)| (source, target, kind, count))
            })
        })
    }

    /// Number of distinct entities `entity` depends on.
    #[must_use]
    pub fn efferent_coupling(&self, entity: EntityId) -> usize {
        self.relations.get(&entity).map_or(0, BTreeMap::len)
    }

    /// Number of distinct entities that depend on `entity`.
    #[must_use]
    pub fn afferent_coupling(&self, entity: EntityId) -> usize {
        self.relations
            .values()
            .filter(|targets| targets.contains_key(&entity))
            .count()
    }

    /// Strongly connected components of the type-level dependency graph.
    ///
    /// Only components of two or more types are cycles, except that a type
    /// with a counted self relation is a cycle of one.
    #[must_use]
    pub fn dependency_cycles(&self) -> Vec<Cycle> {
        let mut graph: DiGraph<TypeId, ()> = DiGraph::new();
        let mut nodes: HashMap<TypeId, NodeIndex> = HashMap::new();

        for &entity in self.relations.keys() {
            if let EntityId::Type(id) = entity {
                nodes.insert(id, graph.add_node(id));
            }
        }
        for (&source, targets) in &self.relations {
            let EntityId::Type(from) = source else { continue };
            for &target in targets.keys() {
                let EntityId::Type(to) = target else { continue };
                if let (Some(&a), Some(&b)) = (nodes.get(&from), nodes.get(&to)) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        let mut cycles: Vec<Cycle> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| graph.contains_edge(node, node))
            })
            .map(|component| {
                let mut types: Vec<TypeId> = component.into_iter().map(|node| graph[node]).collect();
                types.sort();
                Cycle { types }
            })
            .collect();
        cycles.sort_by(|a, b| a.types.cmp(&b.types));
        cycles
    }

    /// Number of entities with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the map has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Number of distinct `(source, target, kind)` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.relations
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }
}
