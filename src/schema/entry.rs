//! The user-facing schema tree.
//!
//! An [`Entry`] is the resolved form of a data node: groupings inlined,
//! augments applied, implicit cases inserted, deviations folded in.
//! Entries live in a [`SchemaTree`] arena and reference each other by
//! [`EntryId`]; parents are back-references, never ownership.

use crate::ast::NodeId;
use crate::parser::Statement;
use crate::types::YangType;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Handle to an entry in a [`SchemaTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

impl EntryId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A leaf or leaf-list.
    Leaf,
    /// A container, list, module, or other interior node.
    Directory,
    AnyXml,
    AnyData,
    Case,
    Choice,
    Input,
    Output,
    Notification,
    /// A pending deviation, queued on its module entry until applied.
    Deviate,
}

/// `config`/`mandatory` need three states: deviations can `delete` the
/// statement, returning it to unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    pub fn from_value(value: &str) -> Result<Self, String> {
        match value {
            "true" => Ok(Self::True),
            "false" => Ok(Self::False),
            other => Err(format!("invalid boolean {other:?}")),
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::True => Some(true),
            Self::False => Some(false),
        }
    }

    pub fn is_unset(self) -> bool {
        self == Self::Unset
    }
}

/// `min-elements`/`max-elements`/`ordered-by` of lists and leaf-lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAttr {
    pub min_elements: Option<u64>,
    /// `None` also covers `unbounded`.
    pub max_elements: Option<u64>,
    pub ordered_by: Option<SmolStr>,
}

/// The input/output wrapper of an rpc or action entry.
#[derive(Debug, Clone, Default)]
pub struct RpcEntry {
    pub input: Option<EntryId>,
    pub output: Option<EntryId>,
}

/// A resolved schema-tree node.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Back-reference only; the parent owns this entry through `dir`.
    pub parent: Option<EntryId>,
    /// The AST node this entry came from.
    pub node: Option<NodeId>,
    /// Name of the instantiating module: the module that used the
    /// grouping, or the augmenting module (RFC 6020 §7.12).
    pub module: SmolStr,
    /// Prefix of the instantiating module.
    pub prefix: SmolStr,
    pub config: TriState,
    pub mandatory: TriState,
    pub description: Option<String>,
    pub default: Option<String>,
    pub units: Option<String>,
    /// Resolved type, present on leaf entries.
    pub yang_type: Option<YangType>,
    pub list_attr: Option<ListAttr>,
    /// Space-separated key leaves of a list.
    pub key: Option<String>,
    pub presence: Option<String>,
    pub when: Option<String>,
    pub musts: Vec<String>,
    pub if_features: Vec<String>,
    pub unique: Vec<String>,
    /// Children by name. Insertion order is not semantically significant.
    pub dir: IndexMap<String, EntryId>,
    pub rpc: Option<RpcEntry>,
    /// Identities declared by this module (module entries only).
    pub identities: Vec<NodeId>,
    /// Module metadata (module entries only).
    pub organization: Option<String>,
    pub contact: Option<String>,
    pub yang_version: Option<String>,
    /// Augments awaiting a target (module entries only, drained by the
    /// fixed-point pass).
    pub augments: Vec<EntryId>,
    /// Deviations awaiting application (module entries only).
    pub deviations: Vec<EntryId>,
    /// Extension statements written on the source node.
    pub exts: Vec<Statement>,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            node: None,
            module: SmolStr::default(),
            prefix: SmolStr::default(),
            config: TriState::Unset,
            mandatory: TriState::Unset,
            description: None,
            default: None,
            units: None,
            yang_type: None,
            list_attr: None,
            key: None,
            presence: None,
            when: None,
            musts: Vec::new(),
            if_features: Vec::new(),
            unique: Vec::new(),
            dir: IndexMap::new(),
            rpc: None,
            identities: Vec::new(),
            organization: None,
            contact: None,
            yang_version: None,
            augments: Vec::new(),
            deviations: Vec::new(),
            exts: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == EntryKind::Leaf && self.list_attr.is_none()
    }

    pub fn is_leaf_list(&self) -> bool {
        self.kind == EntryKind::Leaf && self.list_attr.is_some()
    }

    pub fn is_dir(&self) -> bool {
        !matches!(self.kind, EntryKind::Leaf | EntryKind::AnyXml | EntryKind::AnyData)
    }

    pub fn is_list(&self) -> bool {
        self.kind == EntryKind::Directory && self.list_attr.is_some()
    }

    pub fn is_choice(&self) -> bool {
        self.kind == EntryKind::Choice
    }

    pub fn is_case(&self) -> bool {
        self.kind == EntryKind::Case
    }
}

/// Per-module facts the tree needs for navigation: namespace, prefix, and
/// the prefix → module mapping visible from that module (its own prefix
/// included).
#[derive(Debug, Clone, Default)]
pub struct ModuleMeta {
    pub namespace: SmolStr,
    pub prefix: SmolStr,
    pub imports: FxHashMap<SmolStr, SmolStr>,
}

/// Arena of resolved entries plus the per-module metadata.
#[derive(Debug, Clone, Default)]
pub struct SchemaTree {
    pub(crate) entries: Vec<Entry>,
    pub(crate) roots: IndexMap<SmolStr, EntryId>,
    pub(crate) modinfo: FxHashMap<SmolStr, ModuleMeta>,
}

impl SchemaTree {
    pub(crate) fn alloc(&mut self, entry: Entry) -> EntryId {
        let id = EntryId::new(self.entries.len());
        self.entries.push(entry);
        id
    }

    /// The root entry of a top-level module.
    pub fn root(&self, module: &str) -> Option<EntryId> {
        self.roots.get(module).copied()
    }

    /// Names of the modules in the tree, in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(|k| k.as_str())
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = EntryId> + use<> {
        (0..self.entries.len()).map(EntryId::new)
    }

    /// Walk to the tree root of `from`.
    pub(crate) fn root_of(&self, from: EntryId) -> EntryId {
        let mut cur = from;
        while let Some(parent) = self[cur].parent {
            cur = parent;
        }
        cur
    }
}

impl std::ops::Index<EntryId> for SchemaTree {
    type Output = Entry;

    fn index(&self, id: EntryId) -> &Entry {
        &self.entries[id.index()]
    }
}

impl std::ops::IndexMut<EntryId> for SchemaTree {
    fn index_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.index()]
    }
}
