//! Entry navigation: path resolution and namespace queries.
//!
//! Paths are slash-separated. A leading `/` walks to the tree root (the
//! module entry) first. Prefixed segments resolve the prefix against the
//! current root module — its own prefix or one of its imports — and at
//! the root they may cross into another module's tree. `.` and `..` are
//! accepted, and under an rpc entry the segments `input`/`output`
//! dereference the rpc wrapper.

use super::entry::{Entry, EntryId, ModuleMeta, SchemaTree};

impl SchemaTree {
    /// Resolve `path` starting at `from`. Errors carry the reason, which
    /// the expander turns into diagnostics; the public
    /// [`EntryNode::find`] collapses them to `None`.
    pub(crate) fn resolve_path(&self, from: EntryId, path: &str) -> Result<EntryId, String> {
        let mut cur = from;
        if path.starts_with('/') {
            cur = self.root_of(from);
        }
        let mut meta = self.meta_of(cur);

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment {
                "." => continue,
                ".." => {
                    cur = self[cur]
                        .parent
                        .ok_or_else(|| format!("\"..\" above the root in \"{path}\""))?;
                    continue;
                }
                _ => {}
            }

            let (prefix, name) = match segment.split_once(':') {
                Some((p, n)) => (Some(p), n),
                None => (None, segment),
            };

            if let Some(p) = prefix {
                let at_root = self[cur].parent.is_none();
                let same = meta.as_ref().is_some_and(|m| m.prefix == p);
                if !same {
                    let target = meta
                        .as_ref()
                        .and_then(|m| m.imports.get(p))
                        .ok_or_else(|| format!("unknown prefix \"{p}\" in \"{path}\""))?;
                    if at_root {
                        cur = self
                            .root(target)
                            .ok_or_else(|| format!("module \"{target}\" is not in the tree"))?;
                        meta = self.meta_of(cur);
                    }
                    // below the root, augmented children are stored under
                    // their bare names; the prefix only had to resolve
                }
            } else if self[cur].parent.is_none() && !self[cur].dir.contains_key(name) {
                // a bare first segment may name a module itself
                if let Some(root) = self.root(name) {
                    cur = root;
                    meta = self.meta_of(cur);
                    continue;
                }
            }

            if let Some(rpc) = &self[cur].rpc {
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

            cur = self[cur]
                .dir
                .get(name)
                .copied()
                .ok_or_else(|| format!("\"{name}\" not found in \"{}\"", self[cur].name))?;
        }
        Ok(cur)
    }

    fn meta_of(&self, at: EntryId) -> Option<&ModuleMeta> {
        let root = self.root_of(at);
        self.modinfo.get(self[root].module.as_str())
    }
}

/// A borrow handle pairing an entry with its tree, giving navigation
/// without owning pointers inside entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryNode<'a> {
    tree: &'a SchemaTree,
    id: EntryId,
}

impl<'a> EntryNode<'a> {
    pub fn new(tree: &'a SchemaTree, id: EntryId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn entry(&self) -> &'a Entry {
        &self.tree[self.id]
    }

    pub fn parent(&self) -> Option<EntryNode<'a>> {
        self.tree[self.id]
            .parent
            .map(|p| EntryNode::new(self.tree, p))
    }

    /// A direct child by name.
    pub fn child(&self, name: &str) -> Option<EntryNode<'a>> {
        self.tree[self.id]
            .dir
            .get(name)
            .map(|&c| EntryNode::new(self.tree, c))
    }

    pub fn children(&self) -> impl Iterator<Item = EntryNode<'a>> + '_ {
        self.tree[self.id]
            .dir
            .values()
            .map(|&c| EntryNode::new(self.tree, c))
    }

    /// The rpc input/output wrappers, when this entry is an rpc or action.
    pub fn input(&self) -> Option<EntryNode<'a>> {
        self.entry()
            .rpc
            .as_ref()?
            .input
            .map(|id| EntryNode::new(self.tree, id))
    }

    pub fn output(&self) -> Option<EntryNode<'a>> {
        self.entry()
            .rpc
            .as_ref()?
            .output
            .map(|id| EntryNode::new(self.tree, id))
    }

    /// Resolve a slash-separated path from here. `None` when any segment
    /// fails to resolve.
    pub fn find(&self, path: &str) -> Option<EntryNode<'a>> {
        self.tree
            .resolve_path(self.id, path)
            .ok()
            .map(|id| EntryNode::new(self.tree, id))
    }

    /// The absolute path of this entry, `/module/…/name`.
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut cur = Some(self.id);
        while let Some(id) = cur {
            names.push(self.tree[id].name.clone());
            cur = self.tree[id].parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// The namespace URI in effect here: that of the instantiating
    /// module (the module that used the grouping, or the augmenting
    /// module).
    pub fn namespace(&self) -> Option<&'a str> {
        self.tree
            .modinfo
            .get(self.entry().module.as_str())
            .map(|m| m.namespace.as_str())
    }

    /// Name of the module that instantiated this entry.
    pub fn instantiating_module(&self) -> &'a str {
        self.entry().module.as_str()
    }

    /// The effective default: the entry's own, falling back to its
    /// type's.
    pub fn default_value(&self) -> Option<&'a str> {
        let entry = self.entry();
        entry
            .default
            .as_deref()
            .or_else(|| entry.yang_type.as_ref()?.default.as_deref())
    }
}

impl std::ops::Deref for EntryNode<'_> {
    type Target = Entry;

    fn deref(&self) -> &Entry {
        self.entry()
    }
}
