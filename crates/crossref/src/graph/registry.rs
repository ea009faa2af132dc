//! Registry of synthesized entities.
//!
//! External and ambiguous placeholder types, and placeholder members for
//! unmatched call signatures, are created at most once per key per run.
//! All creation goes through one mutex so concurrent discovery of the same
//! name from different namespaces still yields a single handle.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::graph::types::{MemberEntity, TypeEntity, TypeOrigin, TypeRef};
use crate::types::{MemberId, TypeId};

/// Key of a placeholder type: the name as referenced plus generic arity,
/// e.g. `List`1`.
pub(crate) fn placeholder_key(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}`{arity}")
    }
}

#[derive(Debug, Default)]
struct State {
    types: Vec<TypeEntity>,
    type_keys: HashMap<String, TypeId>,
    members: Vec<MemberEntity>,
    member_keys: HashMap<(TypeId, String, Vec<TypeRef>), MemberId>,
}

/// Owner of every synthesized entity.
///
/// Handles continue the graph's arenas: the first placeholder type gets
/// `type_base`, the first placeholder member gets `member_base`.
#[derive(Debug)]
pub(crate) struct PlaceholderRegistry {
    type_base: u32,
    member_base: u32,
    state: Mutex<State>,
}

/// A member handle and whether this call created it.
pub(crate) struct MemberSlot {
    pub id: MemberId,
    pub created: bool,
}

/// Entities synthesized during a build, in creation order.
pub(crate) struct Synthesized {
    pub types: Vec<TypeEntity>,
    pub members: Vec<MemberEntity>,
}

impl PlaceholderRegistry {
    pub fn new(type_base: u32, member_base: u32) -> Self {
        Self {
            type_base,
            member_base,
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::Internal(format!("placeholder registry mutex poisoned: {e}")))
    }

    /// Handle of the external placeholder for `name`, creating it on first use.
    pub fn external_type(&self, name: &str, arity: usize) -> Result<TypeId> {
        self.type_for(name, arity, || TypeOrigin::External)
    }

    /// Handle of the ambiguous placeholder for `name`, creating it on first use.
    pub fn ambiguous_type(&self, name: &str, arity: usize, candidates: &[TypeId]) -> Result<TypeId> {
        self.type_for(name, arity, || TypeOrigin::Ambiguous {
            candidates: candidates.to_vec(),
        })
    }

    fn type_for(&self, name: &str, arity: usize, origin: impl FnOnce() -> TypeOrigin) -> Result<TypeId> {
        let key = placeholder_key(name, arity);
        let mut state = self.lock()?;
        if let Some(&id) = state.type_keys.get(&key) {
            return Ok(id);
        }

        let id = TypeId(self.type_base + arena_len(state.types.len())?);
        state.types.push(TypeEntity::placeholder(id, name, arity, origin()));
        state.type_keys.insert(key, id);
        Ok(id)
    }

    /// Handle of the placeholder member `owner.name(parameters)`, creating it
    /// on first use.
    pub fn member(&self, owner: TypeId, name: &str, parameters: &[TypeRef]) -> Result<MemberSlot> {
        let key = (owner, name.to_string(), parameters.to_vec());
        let mut state = self.lock()?;
        if let Some(&id) = state.member_keys.get(&key) {
            return Ok(MemberSlot { id, created: false });
        }

        let id = MemberId(self.member_base + arena_len(state.members.len())?);
        state
            .members
            .push(MemberEntity::synthesized(id, owner, name, parameters.to_vec()));
        state.member_keys.insert(key, id);
        Ok(MemberSlot { id, created: true })
    }

    /// Consume the registry, returning everything it created.
    pub fn into_synthesized(self) -> Result<Synthesized> {
        let state = self
            .state
            .into_inner()
            .map_err(|e| Error::Internal(format!("placeholder registry mutex poisoned: {e}")))?;
        Ok(Synthesized {
            types: state.types,
            members: state.members,
        })
    }
}

/// Arena length as a handle offset.
pub(crate) fn arena_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Internal(format!("entity arena overflow ({len} entries)")))
}
