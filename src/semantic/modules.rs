//! The module set: parsing entry points, import/include linking, and the
//! ordered processing pipeline.
//!
//! A [`ModuleSet`] owns the node arena, the registries of parsed modules
//! and submodules, the typedef and identity dictionaries, and (after
//! [`process`](ModuleSet::process)) the resolved schema tree. Resolution
//! phases are strictly ordered: include → import → identity registration →
//! identity linking → identity closure → type resolution → entry
//! expansion. Results are deterministic for the same inputs.
//!
//! One module set is single-threaded; independent sets share nothing.

use crate::ast::{Node, NodeArena, NodeId, NodeKind, build_root};
use crate::base::Location;
use crate::diagnostics::{Diagnostic, Errors};
use crate::parser;
use crate::project::SourceLoader;
use crate::schema::{EntryNode, SchemaTree};
use crate::types::resolve_all_types;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::path::Path;
use thiserror::Error;

use super::identities::{
    IdentityDict, close_identities, link_identities, register_identities,
};
use super::typedefs::TypedefDict;

/// Failures of the by-prefix/by-namespace/by-name lookups, which have no
/// source location to point at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no module with prefix {0:?}")]
    UnknownPrefix(String),
    #[error("prefix {0:?} is ambiguous")]
    AmbiguousPrefix(String),
    #[error("no module with namespace {0:?}")]
    UnknownNamespace(String),
    #[error("namespace {0:?} is ambiguous")]
    AmbiguousNamespace(String),
}

/// Caller-selectable processing options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleSetOptions {
    /// Short-circuit circular submodule inclusion instead of reporting it.
    pub ignore_submodule_circular_dependencies: bool,
    /// Keep nodes that a `deviate not-supported` would remove.
    pub ignore_deviate_not_supported: bool,
}

/// A set of YANG modules resolved together.
#[derive(Debug, Default)]
pub struct ModuleSet {
    pub(crate) arena: NodeArena,
    pub(crate) modules: IndexMap<SmolStr, NodeId>,
    pub(crate) submodules: IndexMap<SmolStr, NodeId>,
    pub(crate) typedefs: TypedefDict,
    pub(crate) identities: IdentityDict,
    pub(crate) options: ModuleSetOptions,
    loader: SourceLoader,
    errors: Vec<Diagnostic>,
    tree: Option<SchemaTree>,
    prefix_cache: RwLock<FxHashMap<SmolStr, NodeId>>,
    namespace_cache: RwLock<FxHashMap<SmolStr, NodeId>>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ModuleSetOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Add a directory searched by [`read`](Self::read). A trailing
    /// `/...` makes the search recursive.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        self.loader.add_path(path);
    }

    /// Lex, parse, and build one source blob. `name` is the file name
    /// recorded in diagnostics; the module registers under its own
    /// declared name.
    pub fn parse(&mut self, source: &str, name: &str) -> Result<(), Errors> {
        let parsed = parser::parse(source, name);
        let mut errors = parsed.errors;
        for statement in &parsed.statements {
            let Some(id) = build_root(&mut self.arena, statement, &mut errors) else {
                continue;
            };
            let declared = self.arena[id].name.clone();
            let registry = if self.arena[id].keyword == "submodule" {
                &mut self.submodules
            } else {
                &mut self.modules
            };
            if registry.insert(declared.clone(), id).is_some() {
                errors.push(Diagnostic::ast(
                    self.arena[id].loc.clone(),
                    format!("duplicate {} \"{declared}\"", self.arena[id].keyword),
                ));
            }
            // register typedef scopes for everything the build created
            let new_nodes: Vec<NodeId> = self
                .arena
                .ids()
                .filter(|n| n.index() >= id.index())
                .collect();
            for node in new_nodes {
                self.typedefs.register_scope(&self.arena, node, &mut errors);
            }
        }
        self.tree = None;
        Errors::from(errors).into_result(())
    }

    /// Load a module by logical name through the search paths.
    pub fn read(&mut self, name: &str) -> Result<(), Errors> {
        match self.loader.find(name) {
            Ok((path, source)) => self.parse(&source, &path.display().to_string()),
            Err(e) => {
                let errors = vec![Diagnostic::resolve(Location::none(name), e.to_string())];
                Err(Errors::from(errors))
            }
        }
    }

    /// Run every resolution and expansion phase. Returns the sorted,
    /// de-duplicated diagnostic stream; empty means success.
    pub fn process(&mut self) -> Errors {
        tracing::debug!(modules = self.modules.len(), "processing module set");
        self.errors.clear();
        self.tree = None;
        self.identities = IdentityDict::new();
        self.prefix_cache.write().clear();
        self.namespace_cache.write().clear();

        self.link_modules();

        let known = self.known_module_ids();
        register_identities(&self.arena, &known, &mut self.identities, &mut self.errors);
        link_identities(&mut self.arena, &known, &self.identities, &mut self.errors);
        close_identities(&mut self.arena, &self.identities);

        tracing::debug!("resolving types");
        resolve_all_types(
            &mut self.arena,
            &self.typedefs,
            &self.identities,
            &mut self.errors,
        );

        tracing::debug!("expanding schema tree");
        let tree = crate::schema::build_tree(
            &self.arena,
            &self.modules,
            &self.options,
            &mut self.errors,
        );
        self.tree = Some(tree);

        Errors::from(self.errors.clone())
    }

    /// The resolved entry for a top-level module, processing first if
    /// nothing has been processed (or sources changed) since.
    pub fn get_module(&mut self, name: &str) -> Result<EntryNode<'_>, Errors> {
        if self.tree.is_none() {
            self.process();
        }
        let tree = self.tree.as_ref().expect("process always builds a tree");
        match tree.root(name) {
            Some(id) => Ok(EntryNode::new(tree, id)),
            None => {
                let mut errors = self.errors.clone();
                errors.push(Diagnostic::resolve(
                    Location::none(name),
                    format!("unknown module \"{name}\""),
                ));
                Err(Errors::from(errors))
            }
        }
    }

    /// O(n) scan over the top-level modules, cached after the first hit.
    pub fn find_module_by_prefix(&self, prefix: &str) -> Result<&Node, LookupError> {
        if let Some(&id) = self.prefix_cache.read().get(prefix) {
            return Ok(&self.arena[id]);
        }
        let mut found = None;
        for &id in self.modules.values() {
            if local_prefix(&self.arena, id).as_deref() == Some(prefix) {
                if found.is_some() {
                    return Err(LookupError::AmbiguousPrefix(prefix.to_string()));
                }
                found = Some(id);
            }
        }
        match found {
            Some(id) => {
                self.prefix_cache.write().insert(SmolStr::new(prefix), id);
                Ok(&self.arena[id])
            }
            None => Err(LookupError::UnknownPrefix(prefix.to_string())),
        }
    }

    /// O(n) scan over the top-level modules, cached after the first hit.
    pub fn find_module_by_namespace(&self, namespace: &str) -> Result<&Node, LookupError> {
        if let Some(&id) = self.namespace_cache.read().get(namespace) {
            return Ok(&self.arena[id]);
        }
        let mut found = None;
        for &id in self.modules.values() {
            if module_namespace(&self.arena, id).as_deref() == Some(namespace) {
                if found.is_some() {
                    return Err(LookupError::AmbiguousNamespace(namespace.to_string()));
                }
                found = Some(id);
            }
        }
        match found {
            Some(id) => {
                self.namespace_cache
                    .write()
                    .insert(SmolStr::new(namespace), id);
                Ok(&self.arena[id])
            }
            None => Err(LookupError::UnknownNamespace(namespace.to_string())),
        }
    }

    /// The node arena backing this set.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// The identity dictionary, keyed `modulename:identityname`.
    pub fn identities(&self) -> &IdentityDict {
        &self.identities
    }

    /// The AST node of a parsed top-level module.
    pub fn module_node(&self, name: &str) -> Option<NodeId> {
        self.modules.get(name).copied()
    }

    /// Names of the parsed top-level modules, in parse order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|k| k.as_str())
    }

    /// Every parsed module and submodule.
    fn known_module_ids(&self) -> Vec<NodeId> {
        self.modules
            .values()
            .chain(self.submodules.values())
            .copied()
            .collect()
    }

    /// Resolve includes and imports for every (sub)module, reading
    /// missing ones through the loader. Newly read modules join the
    /// worklist until nothing is left to link.
    fn link_modules(&mut self) {
        let mut linked: FxHashSet<NodeId> = FxHashSet::default();
        loop {
            let todo: Vec<NodeId> = self
                .known_module_ids()
                .into_iter()
                .filter(|id| !linked.contains(id))
                .collect();
            if todo.is_empty() {
                return;
            }
            for id in todo {
                linked.insert(id);
                let mut stack = Vec::new();
                if self.arena[id].keyword == "submodule" {
                    stack.push(self.arena[id].name.clone());
                }
                self.resolve_includes(id, &mut stack);
                self.resolve_imports(id);
            }
        }
    }

    fn resolve_includes(&mut self, id: NodeId, stack: &mut Vec<SmolStr>) {
        let includes = match self.arena[id].kind.as_module() {
            Some(module) => module.include.clone(),
            None => return,
        };
        let owner = owner_name(&self.arena, id);
        for include in includes {
            let name = self.arena[include].name.clone();
            if stack.contains(&name) {
                if !self.options.ignore_submodule_circular_dependencies {
                    self.errors.push(Diagnostic::resolve(
                        self.arena[include].loc.clone(),
                        format!("circular include of submodule \"{name}\""),
                    ));
                }
                continue;
            }
            let Some(submodule) = self.find_or_read(&name, true) else {
                self.errors.push(Diagnostic::resolve(
                    self.arena[include].loc.clone(),
                    format!("no such submodule \"{name}\""),
                ));
                continue;
            };
            let sub_owner = owner_name(&self.arena, submodule);
            if sub_owner != owner {
                self.errors.push(Diagnostic::resolve(
                    self.arena[include].loc.clone(),
                    format!(
                        "submodule \"{name}\" belongs to \"{sub_owner}\", not \"{owner}\""
                    ),
                ));
            }
            self.check_revision_date(include, submodule);
            if let Some(node) = self.arena[include].kind.as_include_mut() {
                node.submodule = Some(submodule);
            }
            stack.push(name);
            self.resolve_includes(submodule, stack);
            stack.pop();
        }
    }

    fn resolve_imports(&mut self, id: NodeId) {
        let imports = match self.arena[id].kind.as_module() {
            Some(module) => module.import.clone(),
            None => return,
        };
        for import in imports {
            let name = self.arena[import].name.clone();
            let Some(target) = self.find_or_read(&name, false) else {
                self.errors.push(Diagnostic::resolve(
                    self.arena[import].loc.clone(),
                    format!("no such module \"{name}\""),
                ));
                continue;
            };
            self.check_revision_date(import, target);
            if let Some(node) = self.arena[import].kind.as_import_mut() {
                node.module = Some(target);
            }
        }
    }

    /// An `import`/`include` with a `revision-date` must match one of the
    /// target's declared revisions.
    fn check_revision_date(&mut self, link: NodeId, target: NodeId) {
        let revision_date = match &self.arena[link].kind {
            NodeKind::Import(i) => i.revision_date,
            NodeKind::Include(i) => i.revision_date,
            _ => None,
        };
        let Some(revision_date) = revision_date else {
            return;
        };
        let wanted = self.arena[revision_date].name.clone();
        let revisions = self.arena[target]
            .kind
            .as_module()
            .map(|m| m.revision.clone())
            .unwrap_or_default();
        let matched = revisions
            .iter()
            .any(|&r| self.arena[r].name == wanted);
        if !matched {
            self.errors.push(Diagnostic::resolve(
                self.arena[revision_date].loc.clone(),
                format!(
                    "no revision {} of \"{}\"",
                    wanted, self.arena[target].name
                ),
            ));
        }
    }

    /// Look up a (sub)module by name, falling back to the loader.
    fn find_or_read(&mut self, name: &str, submodule: bool) -> Option<NodeId> {
        let registry = if submodule {
            &self.submodules
        } else {
            &self.modules
        };
        if let Some(&id) = registry.get(name) {
            return Some(id);
        }
        let (path, source) = self.loader.find(name).ok()?;
        tracing::debug!(%name, path = %path.display(), "reading module on demand");
        if let Err(read_errors) = self.parse(&source, &path.display().to_string()) {
            self.errors.extend(read_errors);
        }
        let registry = if submodule {
            &self.submodules
        } else {
            &self.modules
        };
        registry.get(name).copied()
    }
}

/// The prefix a (sub)module uses for itself: its `prefix` statement, or
/// the `belongs-to` prefix for submodules.
pub fn local_prefix(arena: &NodeArena, module: NodeId) -> Option<SmolStr> {
    let shape = arena[module].kind.as_module()?;
    if arena[module].keyword == "submodule" {
        let belongs_to = shape.belongs_to?;
        let prefix = arena[belongs_to].kind.as_belongs_to()?.prefix?;
        Some(arena[prefix].name.clone())
    } else {
        shape.prefix.map(|p| arena[p].name.clone())
    }
}

/// The name of the module that owns definitions made here: the module
/// itself, or the `belongs-to` parent for submodules.
pub fn owner_name(arena: &NodeArena, module: NodeId) -> SmolStr {
    if arena[module].keyword == "submodule" {
        if let Some(belongs_to) = arena[module]
            .kind
            .as_module()
            .and_then(|m| m.belongs_to)
        {
            return arena[belongs_to].name.clone();
        }
    }
    arena[module].name.clone()
}

/// A module's `namespace` URI (submodules have none of their own).
pub fn module_namespace(arena: &NodeArena, module: NodeId) -> Option<SmolStr> {
    arena[module]
        .kind
        .as_module()?
        .namespace
        .map(|ns| arena[ns].name.clone())
}

/// The module imported under `prefix` by `module`, following the link the
/// resolver installed.
pub fn import_by_prefix(arena: &NodeArena, module: NodeId, prefix: &str) -> Option<NodeId> {
    let shape = arena[module].kind.as_module()?;
    for &import in &shape.import {
        let declared = arena[import]
            .kind
            .as_import()
            .and_then(|i| i.prefix)
            .map(|p| arena[p].name.clone());
        if declared.as_deref() == Some(prefix) {
            return arena[import].kind.as_import().and_then(|i| i.module);
        }
    }
    None
}

/// Transitively included submodules, diamond-safe.
pub fn included_submodules(arena: &NodeArena, module: NodeId) -> Vec<NodeId> {
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut out = Vec::new();
    let mut worklist = vec![module];
    while let Some(next) = worklist.pop() {
        let Some(shape) = arena[next].kind.as_module() else {
            continue;
        };
        for &include in &shape.include {
            if let Some(sub) = arena[include].kind.as_include().and_then(|i| i.submodule)
                && seen.insert(sub)
            {
                out.push(sub);
                worklist.push(sub);
            }
        }
    }
    out
}
