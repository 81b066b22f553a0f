//! Semantic resolution: dictionaries, identity passes, and the module set.
//!
//! Everything between the typed AST and the schema tree lives here —
//! the scoped typedef dictionary, the cross-module identity resolver,
//! and [`ModuleSet`], which owns the pipeline.

mod identities;
mod modules;
mod typedefs;

pub use identities::{
    IdentityDict, close_identities, link_identities, register_identities, resolve_identity_ref,
};
pub use modules::{
    LookupError, ModuleSet, ModuleSetOptions, import_by_prefix, included_submodules, local_prefix,
    module_namespace, owner_name,
};
pub use typedefs::TypedefDict;
