//! The resolved schema tree and its expander.
//!
//! This is the layer callers consume: [`Entry`] nodes with groupings
//! inlined, augments merged, implicit cases inserted, and deviations
//! applied, navigated through the [`EntryNode`] handle.

mod deviation;
mod entry;
mod expand;
mod path;

pub use entry::{Entry, EntryId, EntryKind, ListAttr, ModuleMeta, RpcEntry, SchemaTree, TriState};
pub use path::EntryNode;

pub(crate) use expand::build_tree;
