//! The scoped typedef dictionary.
//!
//! Maps `(enclosing node, name)` to the `typedef` node. Lookup walks the
//! scope chain from the use site outward; at module level it also searches
//! the included submodules, whose top-level definitions belong to the
//! including module.
//!
//! Built-in type names are resolved ahead of the dictionary and may not be
//! shadowed, which is enforced here at registration.

use crate::ast::{NodeArena, NodeId, NodeKind};
use crate::diagnostics::Diagnostic;
use crate::types::TypeKind;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::modules::included_submodules;

#[derive(Debug, Clone, Default)]
pub struct TypedefDict {
    map: FxHashMap<(NodeId, SmolStr), NodeId>,
}

impl TypedefDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every typedef declared directly under `scope`.
    pub fn register_scope(
        &mut self,
        arena: &NodeArena,
        scope: NodeId,
        errors: &mut Vec<Diagnostic>,
    ) {
        let Some(typedefs) = arena[scope].kind.typedefs() else {
            return;
        };
        for &typedef in typedefs {
            let name = arena[typedef].name.clone();
            if TypeKind::from_name(&name).is_some() {
                errors.push(Diagnostic::ast(
                    arena[typedef].loc.clone(),
                    format!("typedef \"{name}\" shadows a built-in type"),
                ));
                continue;
            }
            if self.map.insert((scope, name.clone()), typedef).is_some() {
                errors.push(Diagnostic::ast(
                    arena[typedef].loc.clone(),
                    format!("duplicate typedef \"{name}\""),
                ));
            }
        }
    }

    /// Direct lookup in one scope.
    pub fn get(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        self.map.get(&(scope, SmolStr::new(name))).copied()
    }

    /// Scope-walking lookup from `from` outward. Module scopes extend over
    /// their included submodules.
    pub fn lookup(&self, arena: &NodeArena, from: NodeId, name: &str) -> Option<NodeId> {
        for scope in arena.ancestors(from) {
            if let Some(found) = self.get(scope, name) {
                return Some(found);
            }
            if matches!(arena[scope].kind, NodeKind::Module(_)) {
                for submodule in included_submodules(arena, scope) {
                    if let Some(found) = self.get(submodule, name) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }
}
