//! The identity dictionary and the three identity passes.
//!
//! Identities form an inheritance graph across modules via `base`
//! references. Resolution runs in strictly ordered passes over every
//! known (sub)module:
//!
//! 1. **Registration** — every identity is keyed `modulename:identityname`
//!    under its *owning* module (submodule identities key on the parent
//!    module).
//! 2. **Linking** — each `base` reference is resolved, either inside the
//!    owning module (no prefix, or the module's own prefix) or across an
//!    import, and the identity is appended to the base's derived set.
//! 3. **Closure** — every derived set is replaced by its transitive
//!    closure, ordered by identity name. The worklist tracks visited
//!    identities, so inheritance cycles terminate.

use crate::ast::{NodeArena, NodeId};
use crate::diagnostics::Diagnostic;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::modules::{import_by_prefix, local_prefix, owner_name};

/// `modulename:identityname` → identity node.
#[derive(Debug, Clone, Default)]
pub struct IdentityDict {
    map: IndexMap<String, NodeId>,
}

impl IdentityDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module: &str, identity: &str) -> Option<NodeId> {
        self.map.get(&format!("{module}:{identity}")).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.map.iter().map(|(k, &v)| (k.as_str(), v))
    }

    fn insert(&mut self, module: &str, identity: &str, id: NodeId) -> bool {
        self.map
            .insert(format!("{module}:{identity}"), id)
            .is_none()
    }
}

/// Pass 1: register the identities of every (sub)module.
pub fn register_identities(
    arena: &NodeArena,
    modules: &[NodeId],
    dict: &mut IdentityDict,
    errors: &mut Vec<Diagnostic>,
) {
    for &module in modules {
        let owner = owner_name(arena, module);
        let Some(shape) = arena[module].kind.as_module() else {
            continue;
        };
        for &identity in &shape.identity {
            let name = arena[identity].name.clone();
            if !dict.insert(&owner, &name, identity) {
                errors.push(Diagnostic::resolve(
                    arena[identity].loc.clone(),
                    format!("duplicate identity \"{name}\" in module \"{owner}\""),
                ));
            }
        }
    }
}

/// Pass 2: resolve `base` references and record direct derivations.
pub fn link_identities(
    arena: &mut NodeArena,
    modules: &[NodeId],
    dict: &IdentityDict,
    errors: &mut Vec<Diagnostic>,
) {
    // start from a clean slate so repeated processing stays idempotent
    for &module in modules {
        let identities = match arena[module].kind.as_module() {
            Some(shape) => shape.identity.clone(),
            None => continue,
        };
        for identity in identities {
            if let Some(node) = arena[identity].kind.as_identity_mut() {
                node.values.clear();
            }
        }
    }

    for &module in modules {
        let Some(shape) = arena[module].kind.as_module() else {
            continue;
        };
        let identities = shape.identity.clone();
        for identity in identities {
            let bases = arena[identity]
                .kind
                .as_identity()
                .expect("identity node")
                .base
                .clone();
            for base_ref in bases {
                let reference = arena[base_ref].name.to_string();
                match resolve_identity_ref(arena, dict, identity, &reference) {
                    Ok(base) => {
                        arena[base]
                            .kind
                            .as_identity_mut()
                            .expect("identity node")
                            .values
                            .push(identity);
                    }
                    Err(message) => {
                        errors.push(Diagnostic::resolve(arena[base_ref].loc.clone(), message));
                    }
                }
            }
        }
    }
}

/// Pass 3: replace each derived set with its transitive closure, ordered
/// by identity name.
pub fn close_identities(arena: &mut NodeArena, dict: &IdentityDict) {
    let direct: FxHashMap<NodeId, Vec<NodeId>> = dict
        .iter()
        .map(|(_, id)| {
            (
                id,
                arena[id].kind.as_identity().expect("identity node").values.clone(),
            )
        })
        .collect();

    for (_, id) in dict.iter() {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut worklist: Vec<NodeId> = direct.get(&id).cloned().unwrap_or_default();
        let mut transitive: Vec<NodeId> = Vec::new();
        while let Some(next) = worklist.pop() {
            if next == id || !visited.insert(next) {
                continue;
            }
            transitive.push(next);
            if let Some(derived) = direct.get(&next) {
                worklist.extend(derived.iter().copied());
            }
        }
        transitive.sort_by(|&a, &b| arena[a].name.cmp(&arena[b].name));
        arena[id].kind.as_identity_mut().expect("identity node").values = transitive;
    }
}

/// Resolve an identity reference (`name` or `prefix:name`) from the scope
/// of `from`: the owning module when the prefix is absent or the module's
/// own, an imported module otherwise.
pub fn resolve_identity_ref(
    arena: &NodeArena,
    dict: &IdentityDict,
    from: NodeId,
    reference: &str,
) -> Result<NodeId, String> {
    let module = arena
        .enclosing_module(from)
        .ok_or_else(|| format!("identity reference \"{reference}\" outside any module"))?;
    let (prefix, name) = match reference.split_once(':') {
        Some((p, n)) => (Some(p), n),
        None => (None, reference),
    };

    let own_prefix: Option<SmolStr> = local_prefix(arena, module);
    match prefix {
        None => lookup_local(arena, dict, module, name),
        Some(p) if own_prefix.as_deref() == Some(p) => lookup_local(arena, dict, module, name),
        Some(p) => {
            let Some(target) = import_by_prefix(arena, module, p) else {
                return Err(format!("unknown prefix \"{p}\""));
            };
            let owner = owner_name(arena, target);
            dict.get(&owner, name).ok_or_else(|| {
                format!("identity \"{name}\" not found in imported module \"{owner}\"")
            })
        }
    }
}

fn lookup_local(
    arena: &NodeArena,
    dict: &IdentityDict,
    module: NodeId,
    name: &str,
) -> Result<NodeId, String> {
    let owner = owner_name(arena, module);
    dict.get(&owner, name)
        .ok_or_else(|| format!("identity \"{name}\" not found in module \"{owner}\""))
}
