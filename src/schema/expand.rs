//! AST → Entry expansion.
//!
//! Converts typed nodes into the user-facing schema tree: `uses` inlines
//! a deep duplicate of its grouping (namespace stamped with the *using*
//! module, per RFC 6020 §7.12), refinements are applied to the duplicate,
//! augments queue on their module entry and resolve in a fixed-point
//! pass, and every direct non-case child of a `choice` gets an implicit
//! `case` wrapper. Deviations run last, in `deviation.rs`.
//!
//! The expander memoises grouping prototypes (`node → entry`) so shared
//! groupings expand once and diamond-shaped `uses` chains terminate; a
//! separate in-progress set breaks genuine cycles.

use super::entry::{Entry, EntryId, EntryKind, ListAttr, ModuleMeta, RpcEntry, SchemaTree, TriState};
use crate::ast::{NodeArena, NodeId, NodeKind};
use crate::base::Location;
use crate::diagnostics::Diagnostic;
use crate::semantic::{
    ModuleSetOptions, import_by_prefix, included_submodules, local_prefix, module_namespace,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

/// Expand every module of the set into one schema tree, then run the
/// augment fixed point, implicit-case insertion, and deviations.
pub(crate) fn build_tree(
    arena: &NodeArena,
    modules: &IndexMap<SmolStr, NodeId>,
    options: &ModuleSetOptions,
    errors: &mut Vec<Diagnostic>,
) -> SchemaTree {
    let mut expander = Expander {
        arena,
        options,
        errors,
        tree: SchemaTree::default(),
        memo: FxHashMap::default(),
        expanding: FxHashSet::default(),
    };

    for (name, &id) in modules {
        expander.tree.modinfo.insert(name.clone(), module_meta(arena, id, name));
    }
    for (name, &id) in modules {
        let root = expander.module_entry(id, name);
        expander.tree.roots.insert(name.clone(), root);
    }

    expander.apply_augments();
    expander.fix_choices();
    expander.check_tree();
    expander.apply_deviations();
    expander.tree
}

/// Collect the navigation facts for one module: namespace, prefix, and
/// the prefix → module map of its imports (submodule imports included,
/// since augments written in submodules use them).
fn module_meta(arena: &NodeArena, module: NodeId, name: &SmolStr) -> ModuleMeta {
    let mut meta = ModuleMeta {
        namespace: module_namespace(arena, module).unwrap_or_default(),
        prefix: local_prefix(arena, module).unwrap_or_default(),
        ..ModuleMeta::default()
    };
    meta.imports.insert(meta.prefix.clone(), name.clone());
    let mut sources = vec![module];
    sources.extend(included_submodules(arena, module));
    for source in sources {
        let Some(shape) = arena[source].kind.as_module() else {
            continue;
        };
        for &import in &shape.import {
            let target = arena[import].name.clone();
            if let Some(prefix) = arena[import]
                .kind
                .as_import()
                .and_then(|i| i.prefix)
                .map(|p| arena[p].name.clone())
            {
                meta.imports.insert(prefix, target);
            }
        }
    }
    meta
}

pub(crate) struct Expander<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) options: &'a ModuleSetOptions,
    pub(crate) errors: &'a mut Vec<Diagnostic>,
    pub(crate) tree: SchemaTree,
    memo: FxHashMap<NodeId, EntryId>,
    expanding: FxHashSet<NodeId>,
}

impl Expander<'_> {
    pub(crate) fn error(&mut self, node: NodeId, message: impl Into<String>) {
        self.errors
            .push(Diagnostic::expand(self.arena[node].loc.clone(), message));
    }

    fn text(&self, id: Option<NodeId>) -> Option<String> {
        id.map(|v| self.arena[v].name.to_string())
    }

    pub(crate) fn tri(&mut self, id: Option<NodeId>) -> TriState {
        let Some(value) = id else {
            return TriState::Unset;
        };
        match TriState::from_value(&self.arena[value].name) {
            Ok(state) => state,
            Err(message) => {
                self.error(value, message);
                TriState::Unset
            }
        }
    }

    pub(crate) fn entry_loc(&self, entry: EntryId) -> Location {
        match self.tree[entry].node {
            Some(node) => self.arena[node].loc.clone(),
            None => Location::none(""),
        }
    }

    // ------------------------------------------------------------------
    // module expansion
    // ------------------------------------------------------------------

    fn module_entry(&mut self, module: NodeId, name: &SmolStr) -> EntryId {
        tracing::debug!(module = %name, "expanding module");
        let mut entry = Entry::new(name.clone(), EntryKind::Directory);
        entry.module = name.clone();
        entry.prefix = self.prefix_of(name);
        entry.node = Some(module);
        entry.exts = self.arena[module].exts.clone();
        let root = self.tree.alloc(entry);

        self.module_body(module, root, name);
        // a submodule's top-level definitions merge into the including
        // module exactly once, whatever the inclusion paths look like
        for submodule in included_submodules(self.arena, module) {
            self.module_body(submodule, root, name);
        }
        root
    }

    fn module_body(&mut self, owner: NodeId, root: EntryId, module: &SmolStr) {
        let Some(shape) = self.arena[owner].kind.as_module().cloned() else {
            return;
        };
        if self.tree[root].description.is_none() {
            self.tree[root].description = self.text(shape.description);
        }
        if self.tree[root].organization.is_none() {
            self.tree[root].organization = self.text(shape.organization);
        }
        if self.tree[root].contact.is_none() {
            self.tree[root].contact = self.text(shape.contact);
        }
        if self.tree[root].yang_version.is_none() {
            self.tree[root].yang_version = self.text(shape.yang_version);
        }
        for child in data_children(&NodeKind::Module(shape.clone())) {
            self.add_node(child, root, module);
        }
        for &grouping in &shape.grouping {
            self.grouping_entry(grouping, module);
        }
        self.tree[root].identities.extend(shape.identity.iter().copied());
        for &augment in &shape.augment {
            let entry = self.augment_entry(augment, module);
            self.tree[root].augments.push(entry);
        }
        for &deviation in &shape.deviation {
            let mut entry = Entry::new(self.arena[deviation].name.clone(), EntryKind::Deviate);
            entry.module = module.clone();
            entry.node = Some(deviation);
            let id = self.tree.alloc(entry);
            self.tree[root].deviations.push(id);
        }
    }

    fn prefix_of(&self, module: &SmolStr) -> SmolStr {
        self.tree
            .modinfo
            .get(module.as_str())
            .map(|m| m.prefix.clone())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // per-node expansion
    // ------------------------------------------------------------------

    /// Expand one data node and hang it under `parent`. `uses` merges the
    /// grouping's children instead of adding a node of its own.
    fn add_node(&mut self, node: NodeId, parent: EntryId, module: &SmolStr) {
        if matches!(self.arena[node].kind, NodeKind::Uses(_)) {
            self.expand_uses(node, parent, module);
            return;
        }
        if let Some(entry) = self.to_entry(node, module) {
            self.insert_child(parent, entry);
        }
    }

    /// Expand one node into an (unparented) entry.
    fn to_entry(&mut self, node: NodeId, module: &SmolStr) -> Option<EntryId> {
        match self.arena[node].kind.clone() {
            NodeKind::Leaf(leaf) => {
                let mut entry = self.base_entry(node, module, EntryKind::Leaf);
                entry.config = self.tri(leaf.config);
                entry.mandatory = self.tri(leaf.mandatory);
                entry.description = self.text(leaf.description);
                entry.units = self.text(leaf.units);
                entry.when = self.text(leaf.when);
                entry.musts = self.must_texts(&leaf.must);
                entry.if_features = self.value_texts(&leaf.if_feature);
                entry.yang_type = self.resolved_type(leaf.type_stmt);
                entry.default = self.text(leaf.default);
                if entry.default.is_none() && entry.mandatory != TriState::True {
                    entry.default = entry.yang_type.as_ref().and_then(|t| t.default.clone());
                }
                if entry.units.is_none() {
                    entry.units = entry.yang_type.as_ref().and_then(|t| t.units.clone());
                }
                Some(self.tree.alloc(entry))
            }
            NodeKind::LeafList(leaf_list) => {
                let mut entry = self.base_entry(node, module, EntryKind::Leaf);
                entry.config = self.tri(leaf_list.config);
                entry.description = self.text(leaf_list.description);
                entry.units = self.text(leaf_list.units);
                entry.when = self.text(leaf_list.when);
                entry.musts = self.must_texts(&leaf_list.must);
                entry.if_features = self.value_texts(&leaf_list.if_feature);
                entry.yang_type = self.resolved_type(leaf_list.type_stmt);
                entry.default = leaf_list.default.first().map(|&d| self.arena[d].name.to_string());
                if entry.default.is_none() {
                    entry.default = entry.yang_type.as_ref().and_then(|t| t.default.clone());
                }
                if entry.units.is_none() {
                    entry.units = entry.yang_type.as_ref().and_then(|t| t.units.clone());
                }
                entry.list_attr = Some(self.list_attr(
                    leaf_list.min_elements,
                    leaf_list.max_elements,
                    leaf_list.ordered_by,
                ));
                Some(self.tree.alloc(entry))
            }
            NodeKind::Container(container) => {
                let mut entry = self.base_entry(node, module, EntryKind::Directory);
                entry.config = self.tri(container.config);
                entry.description = self.text(container.description);
                entry.presence = self.text(container.presence);
                entry.when = self.text(container.when);
                entry.musts = self.must_texts(&container.must);
                entry.if_features = self.value_texts(&container.if_feature);
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::List(list) => {
                let mut entry = self.base_entry(node, module, EntryKind::Directory);
                entry.config = self.tri(list.config);
                entry.description = self.text(list.description);
                entry.key = self.text(list.key);
                entry.when = self.text(list.when);
                entry.musts = self.must_texts(&list.must);
                entry.if_features = self.value_texts(&list.if_feature);
                entry.unique = self.value_texts(&list.unique);
                entry.list_attr =
                    Some(self.list_attr(list.min_elements, list.max_elements, list.ordered_by));
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::Choice(choice) => {
                let mut entry = self.base_entry(node, module, EntryKind::Choice);
                entry.config = self.tri(choice.config);
                entry.mandatory = self.tri(choice.mandatory);
                entry.description = self.text(choice.description);
                entry.default = self.text(choice.default);
                entry.when = self.text(choice.when);
                entry.if_features = self.value_texts(&choice.if_feature);
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::Case(case) => {
                let mut entry = self.base_entry(node, module, EntryKind::Case);
                entry.description = self.text(case.description);
                entry.when = self.text(case.when);
                entry.if_features = self.value_texts(&case.if_feature);
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::Input(_) | NodeKind::Output(_) => {
                let kind = if matches!(self.arena[node].kind, NodeKind::Input(_)) {
                    EntryKind::Input
                } else {
                    EntryKind::Output
                };
                let mut entry = self.base_entry(node, module, kind);
                entry.name = self.arena[node].keyword.to_string();
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::Notification(notification) => {
                let mut entry = self.base_entry(node, module, EntryKind::Notification);
                entry.description = self.text(notification.description);
                entry.if_features = self.value_texts(&notification.if_feature);
                let id = self.tree.alloc(entry);
                self.add_children(node, id, module);
                Some(id)
            }
            NodeKind::Rpc(rpc) => self.rpc_entry(node, module, rpc.input, rpc.output, rpc.description),
            NodeKind::Action(action) => {
                self.rpc_entry(node, module, action.input, action.output, action.description)
            }
            NodeKind::AnyXml(anyxml) => {
                let mut entry = self.base_entry(node, module, EntryKind::AnyXml);
                entry.config = self.tri(anyxml.config);
                entry.mandatory = self.tri(anyxml.mandatory);
                entry.description = self.text(anyxml.description);
                entry.when = self.text(anyxml.when);
                entry.musts = self.must_texts(&anyxml.must);
                entry.if_features = self.value_texts(&anyxml.if_feature);
                Some(self.tree.alloc(entry))
            }
            NodeKind::AnyData(anydata) => {
                let mut entry = self.base_entry(node, module, EntryKind::AnyData);
                entry.config = self.tri(anydata.config);
                entry.mandatory = self.tri(anydata.mandatory);
                entry.description = self.text(anydata.description);
                entry.when = self.text(anydata.when);
                entry.musts = self.must_texts(&anydata.must);
                entry.if_features = self.value_texts(&anydata.if_feature);
                Some(self.tree.alloc(entry))
            }
            NodeKind::Grouping(_) => {
                self.grouping_entry(node, module);
                None
            }
            _ => None,
        }
    }

    fn base_entry(&mut self, node: NodeId, module: &SmolStr, kind: EntryKind) -> Entry {
        let mut entry = Entry::new(self.arena[node].name.clone(), kind);
        entry.module = module.clone();
        entry.prefix = self.prefix_of(module);
        entry.node = Some(node);
        entry.exts = self.arena[node].exts.clone();
        entry
    }

    fn rpc_entry(
        &mut self,
        node: NodeId,
        module: &SmolStr,
        input: Option<NodeId>,
        output: Option<NodeId>,
        description: Option<NodeId>,
    ) -> Option<EntryId> {
        let mut entry = self.base_entry(node, module, EntryKind::Directory);
        entry.description = self.text(description);
        let id = self.tree.alloc(entry);
        let mut rpc = RpcEntry::default();
        if let Some(input) = input
            && let Some(wrapped) = self.to_entry(input, module)
        {
            self.tree[wrapped].parent = Some(id);
            rpc.input = Some(wrapped);
        }
        if let Some(output) = output
            && let Some(wrapped) = self.to_entry(output, module)
        {
            self.tree[wrapped].parent = Some(id);
            rpc.output = Some(wrapped);
        }
        self.tree[id].rpc = Some(rpc);
        Some(id)
    }

    fn add_children(&mut self, node: NodeId, entry: EntryId, module: &SmolStr) {
        for child in data_children(&self.arena[node].kind) {
            self.add_node(child, entry, module);
        }
        if let Some(groupings) = self.arena[node].kind.groupings() {
            for &grouping in groupings.clone().iter() {
                self.grouping_entry(grouping, module);
            }
        }
    }

    fn must_texts(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&m| self.arena[m].name.to_string()).collect()
    }

    fn value_texts(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&v| self.arena[v].name.to_string()).collect()
    }

    fn resolved_type(&mut self, type_stmt: Option<NodeId>) -> Option<crate::types::YangType> {
        let type_node = type_stmt?;
        self.arena[type_node]
            .kind
            .as_type()
            .and_then(|t| t.yang_type.as_deref())
            .cloned()
    }

    fn list_attr(
        &mut self,
        min: Option<NodeId>,
        max: Option<NodeId>,
        ordered_by: Option<NodeId>,
    ) -> ListAttr {
        let mut attr = ListAttr {
            ordered_by: ordered_by.map(|o| self.arena[o].name.clone()),
            ..ListAttr::default()
        };
        if let Some(min) = min {
            match self.arena[min].name.parse::<u64>() {
                Ok(n) => attr.min_elements = Some(n),
                Err(_) => {
                    let value = self.arena[min].name.clone();
                    self.error(min, format!("invalid min-elements {value:?}"));
                }
            }
        }
        if let Some(max) = max {
            let value = self.arena[max].name.clone();
            if value != "unbounded" {
                match value.parse::<u64>() {
                    Ok(n) => attr.max_elements = Some(n),
                    Err(_) => self.error(max, format!("invalid max-elements {value:?}")),
                }
            }
        }
        attr
    }

    // ------------------------------------------------------------------
    // uses and groupings
    // ------------------------------------------------------------------

    /// Expand a grouping into its prototype entry, memoised per node.
    fn grouping_entry(&mut self, grouping: NodeId, module: &SmolStr) -> Option<EntryId> {
        if let Some(&done) = self.memo.get(&grouping) {
            return Some(done);
        }
        if !self.expanding.insert(grouping) {
            // a uses chain re-entered this grouping while it is still
            // being expanded
            let name = self.arena[grouping].name.clone();
            self.error(grouping, format!("circular uses of grouping \"{name}\""));
            return None;
        }
        let entry = self.base_entry(grouping, module, EntryKind::Directory);
        let id = self.tree.alloc(entry);
        self.add_children(grouping, id, module);
        self.expanding.remove(&grouping);
        self.memo.insert(grouping, id);
        Some(id)
    }

    fn expand_uses(&mut self, uses: NodeId, parent: EntryId, module: &SmolStr) {
        let written = self.arena[uses].name.clone();
        let Some(grouping) = self.find_grouping(uses, &written) else {
            self.error(uses, format!("unknown grouping \"{written}\""));
            return;
        };
        let Some(proto) = self.grouping_entry(grouping, module) else {
            return;
        };
        let dup = self.dup(proto, None);
        self.stamp(dup, module);

        let shape = self.arena[uses].kind.as_uses().expect("uses node").clone();
        for &refine in &shape.refine {
            self.apply_refine(dup, refine);
        }
        // an augment under uses targets the grouping content just
        // duplicated, so it resolves immediately
        for &augment in &shape.augment {
            let path = self.arena[augment].name.clone();
            let entry = self.augment_entry(augment, module);
            match self.find_descendant(dup, &path) {
                Some(target) => self.merge_children(entry, target),
                None => self.error(augment, format!("augment target not found: \"{path}\"")),
            }
        }
        self.merge_children(dup, parent);
    }

    /// Resolve a grouping name from the scope of `from`: ancestors, their
    /// included submodules, or an imported module's top level.
    fn find_grouping(&self, from: NodeId, written: &str) -> Option<NodeId> {
        let (prefix, bare) = match written.split_once(':') {
            Some((p, n)) => (Some(p), n),
            None => (None, written),
        };
        let module = self.arena.enclosing_module(from)?;
        let own_prefix = local_prefix(self.arena, module);
        if let Some(p) = prefix
            && own_prefix.as_deref() != Some(p)
        {
            let target = import_by_prefix(self.arena, module, p)?;
            return self.grouping_in(target, bare);
        }
        for scope in self.arena.ancestors(from) {
            if let Some(found) = self.grouping_at(scope, bare) {
                return Some(found);
            }
            if matches!(self.arena[scope].kind, NodeKind::Module(_)) {
                for submodule in included_submodules(self.arena, scope) {
                    if let Some(found) = self.grouping_at(submodule, bare) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    fn grouping_in(&self, module: NodeId, bare: &str) -> Option<NodeId> {
        if let Some(found) = self.grouping_at(module, bare) {
            return Some(found);
        }
        for submodule in included_submodules(self.arena, module) {
            if let Some(found) = self.grouping_at(submodule, bare) {
                return Some(found);
            }
        }
        None
    }

    fn grouping_at(&self, scope: NodeId, bare: &str) -> Option<NodeId> {
        self.arena[scope]
            .kind
            .groupings()?
            .iter()
            .copied()
            .find(|&g| self.arena[g].name == bare)
    }

    /// Deep-duplicate an entry subtree, re-seating every parent pointer.
    fn dup(&mut self, source: EntryId, parent: Option<EntryId>) -> EntryId {
        let mut cloned = self.tree[source].clone();
        cloned.parent = parent;
        let dir = std::mem::take(&mut cloned.dir);
        let rpc = cloned.rpc.take();
        let id = self.tree.alloc(cloned);
        for (name, child) in dir {
            let child = self.dup(child, Some(id));
            self.tree[id].dir.insert(name, child);
        }
        if let Some(rpc) = rpc {
            let wrapper = RpcEntry {
                input: rpc.input.map(|i| self.dup(i, Some(id))),
                output: rpc.output.map(|o| self.dup(o, Some(id))),
            };
            self.tree[id].rpc = Some(wrapper);
        }
        id
    }

    /// Stamp a subtree with its instantiating module.
    fn stamp(&mut self, entry: EntryId, module: &SmolStr) {
        let prefix = self.prefix_of(module);
        let mut worklist = vec![entry];
        while let Some(id) = worklist.pop() {
            self.tree[id].module = module.clone();
            self.tree[id].prefix = prefix.clone();
            worklist.extend(self.tree[id].dir.values().copied());
            if let Some(rpc) = &self.tree[id].rpc {
                worklist.extend(rpc.input.iter().copied());
                worklist.extend(rpc.output.iter().copied());
            }
        }
    }

    fn apply_refine(&mut self, dup: EntryId, refine: NodeId) {
        let path = self.arena[refine].name.clone();
        let Some(target) = self.find_descendant(dup, &path) else {
            self.error(refine, format!("refine target not found: \"{path}\""));
            return;
        };
        let Some(shape) = self.arena[refine].kind.as_refine().cloned() else {
            return;
        };
        if let Some(description) = self.text(shape.description) {
            self.tree[target].description = Some(description);
        }
        if let Some(default) = self.text(shape.default) {
            self.tree[target].default = Some(default);
        }
        if let Some(units) = self.text(shape.units) {
            self.tree[target].units = Some(units);
        }
        if let Some(presence) = self.text(shape.presence) {
            self.tree[target].presence = Some(presence);
        }
        if shape.config.is_some() {
            let config = self.tri(shape.config);
            self.tree[target].config = config;
        }
        if shape.mandatory.is_some() {
            let mandatory = self.tri(shape.mandatory);
            self.tree[target].mandatory = mandatory;
        }
        if shape.min_elements.is_some() || shape.max_elements.is_some() {
            if self.tree[target].list_attr.is_none() {
                self.error(refine, format!("refine of min/max-elements on non-list \"{path}\""));
            } else {
                let refined = self.list_attr(shape.min_elements, shape.max_elements, None);
                let attr = self.tree[target].list_attr.as_mut().expect("checked above");
                if refined.min_elements.is_some() {
                    attr.min_elements = refined.min_elements;
                }
                if shape.max_elements.is_some() {
                    attr.max_elements = refined.max_elements;
                }
            }
        }
        for must in self.must_texts(&shape.must) {
            self.tree[target].musts.push(must);
        }
    }

    /// Walk `dir` children along a relative, possibly prefixed path.
    fn find_descendant(&self, base: EntryId, path: &str) -> Option<EntryId> {
        let mut cur = base;
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let name = segment.split_once(':').map_or(segment, |(_, n)| n);
            if let Some(rpc) = &self.tree[cur].rpc {
                let wrapped = match name {
                    "input" => rpc.input,
                    "output" => rpc.output,
                    _ => None,
                };
                if let Some(wrapped) = wrapped {
                    cur = wrapped;
                    continue;
                }
            }
            cur = self.tree[cur].dir.get(name).copied()?;
        }
        Some(cur)
    }

    // ------------------------------------------------------------------
    // augments
    // ------------------------------------------------------------------

    /// Build the (detached) entry for an augment statement; its children
    /// carry the augmenting module's namespace.
    fn augment_entry(&mut self, augment: NodeId, module: &SmolStr) -> EntryId {
        let entry = self.base_entry(augment, module, EntryKind::Directory);
        let id = self.tree.alloc(entry);
        self.add_children(augment, id, module);
        id
    }

    /// Repeat until fixed point: resolve each pending augment's target
    /// and merge its children. When a whole pass applies nothing, the
    /// remainder is unresolvable.
    fn apply_augments(&mut self) {
        loop {
            let roots: Vec<EntryId> = self.tree.roots.values().copied().collect();
            let mut pending: Vec<(EntryId, EntryId)> = Vec::new();
            for root in roots {
                for augment in std::mem::take(&mut self.tree[root].augments) {
                    pending.push((root, augment));
                }
            }
            if pending.is_empty() {
                return;
            }

            let mut applied = false;
            let mut unresolved: Vec<(EntryId, EntryId)> = Vec::new();
            for (root, augment) in pending {
                let path = self.tree[augment].name.clone();
                match self.tree.resolve_path(root, &path) {
                    Ok(target) => {
                        tracing::trace!(%path, "applying augment");
                        self.merge_children(augment, target);
                        applied = true;
                    }
                    Err(_) => unresolved.push((root, augment)),
                }
            }

            if !applied {
                tracing::warn!(
                    remaining = unresolved.len(),
                    "augment fixed point saturated with unresolved targets"
                );
                for (_, augment) in unresolved {
                    let path = self.tree[augment].name.clone();
                    let loc = self.entry_loc(augment);
                    self.errors.push(Diagnostic::expand(
                        loc,
                        format!("augment target not found: \"{path}\""),
                    ));
                }
                return;
            }
            for (root, augment) in unresolved {
                self.tree[root].augments.push(augment);
            }
        }
    }

    /// Move the children of `from` into `into`, keeping their module
    /// stamp (the mover's namespace survives, per RFC 7951 encoding
    /// needs).
    fn merge_children(&mut self, from: EntryId, into: EntryId) {
        let children: Vec<EntryId> = self.tree[from].dir.values().copied().collect();
        self.tree[from].dir.clear();
        for child in children {
            self.insert_child(into, child);
        }
    }

    /// Hang `child` under `parent`, rejecting duplicate names.
    fn insert_child(&mut self, parent: EntryId, child: EntryId) {
        let name = self.tree[child].name.clone();
        if self.tree[parent].dir.contains_key(&name) {
            let loc = self.entry_loc(child);
            let parent_name = self.tree[parent].name.clone();
            self.errors.push(Diagnostic::expand(
                loc,
                format!("duplicate node \"{name}\" in \"{parent_name}\""),
            ));
            return;
        }
        self.tree[child].parent = Some(parent);
        self.tree[parent].dir.insert(name, child);
    }

    // ------------------------------------------------------------------
    // implicit cases
    // ------------------------------------------------------------------

    /// Wrap every direct non-case child of a choice in an implicit case
    /// of the same name.
    fn fix_choices(&mut self) {
        let ids: Vec<EntryId> = self.tree.ids().collect();
        for id in ids {
            if self.tree[id].kind != EntryKind::Choice {
                continue;
            }
            let children: Vec<(String, EntryId)> = self.tree[id]
                .dir
                .iter()
                .map(|(n, &c)| (n.clone(), c))
                .collect();
            for (name, child) in children {
                if self.tree[child].kind == EntryKind::Case {
                    continue;
                }
                let mut case = Entry::new(name.clone(), EntryKind::Case);
                case.module = self.tree[child].module.clone();
                case.prefix = self.tree[child].prefix.clone();
                case.config = self.tree[child].config;
                case.node = self.tree[child].node;
                case.parent = Some(id);
                let case_id = self.tree.alloc(case);
                self.tree[case_id].dir.insert(name.clone(), child);
                self.tree[child].parent = Some(case_id);
                self.tree[id].dir.insert(name, case_id);
            }
        }
    }
}

impl Expander<'_> {
    /// Structural checks that need the final tree shape: config
    /// inheritance conflicts and missing list keys. Only entries
    /// reachable from a module root are checked, so grouping prototypes
    /// never yield spurious reports.
    fn check_tree(&mut self) {
        let roots: Vec<EntryId> = self.tree.roots.values().copied().collect();
        for root in roots {
            self.check_subtree(root, None);
        }
    }

    fn check_subtree(&mut self, entry: EntryId, inherited: Option<bool>) {
        let declared = self.tree[entry].config.as_bool();
        if declared == Some(true) && inherited == Some(false) {
            let loc = self.entry_loc(entry);
            let name = self.tree[entry].name.clone();
            self.errors.push(Diagnostic::expand(
                loc,
                format!("\"{name}\": config true under config false"),
            ));
        }
        let effective = declared.or(inherited);

        if self.tree[entry].is_list()
            && self.tree[entry].key.is_none()
            && effective.unwrap_or(true)
        {
            let loc = self.entry_loc(entry);
            let name = self.tree[entry].name.clone();
            self.errors
                .push(Diagnostic::expand(loc, format!("list \"{name}\" without a key")));
        }

        let children: Vec<EntryId> = self.tree[entry].dir.values().copied().collect();
        for child in children {
            self.check_subtree(child, effective);
        }
        if let Some(rpc) = self.tree[entry].rpc.clone() {
            for wrapped in rpc.input.into_iter().chain(rpc.output) {
                self.check_subtree(wrapped, None);
            }
        }
    }
}

/// Ordered data-definition children per node kind.
fn data_children(kind: &NodeKind) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut push = |lists: &[&Vec<NodeId>]| {
        for list in lists {
            out.extend(list.iter().copied());
        }
    };
    match kind {
        NodeKind::Module(n) => push(&[
            &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list, &n.list,
            &n.notification, &n.rpc, &n.uses,
        ]),
        NodeKind::Container(n) => push(&[
            &n.action, &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list,
            &n.list, &n.notification, &n.uses,
        ]),
        NodeKind::List(n) => push(&[
            &n.action, &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list,
            &n.list, &n.notification, &n.uses,
        ]),
        NodeKind::Grouping(n) => push(&[
            &n.action, &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list,
            &n.list, &n.notification, &n.uses,
        ]),
        NodeKind::Case(n) => push(&[
            &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list, &n.list,
            &n.uses,
        ]),
        NodeKind::Choice(n) => push(&[
            &n.anydata, &n.anyxml, &n.case, &n.choice, &n.container, &n.leaf, &n.leaf_list,
            &n.list,
        ]),
        NodeKind::Augment(n) => push(&[
            &n.action, &n.anydata, &n.anyxml, &n.case, &n.choice, &n.container, &n.leaf,
            &n.leaf_list, &n.list, &n.notification, &n.uses,
        ]),
        NodeKind::Input(n) => push(&[
            &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list, &n.list,
            &n.uses,
        ]),
        NodeKind::Output(n) => push(&[
            &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list, &n.list,
            &n.uses,
        ]),
        NodeKind::Notification(n) => push(&[
            &n.anydata, &n.anyxml, &n.choice, &n.container, &n.leaf, &n.leaf_list, &n.list,
            &n.uses,
        ]),
        _ => {}
    }
    out
}

