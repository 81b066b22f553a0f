//! # yangtree
//!
//! Core library for YANG (RFC 6020 / RFC 7950) parsing, AST, and resolved
//! schema trees.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! schema    → resolved Entry tree (uses/augment/choice/deviation applied)
//!   ↓
//! semantic  → typedef/identity dictionaries, ModuleSet pipeline
//!   ↓
//! types     → built-in types, ranges, decimal64, type resolution
//!   ↓
//! ast       → typed nodes, statement-schema table, AST builder
//!   ↓
//! parser    → logos lexer, recursive-descent statement parser
//!   ↓
//! base      → primitives (Location, LineIndex)
//! ```
//!
//! The `project` module (source loading by module name) and
//! `diagnostics` (located, sorted, de-duplicated errors) sit alongside.
//!
//! ## Example
//!
//! ```
//! use yangtree::ModuleSet;
//!
//! let mut set = ModuleSet::new();
//! set.parse(
//!     r#"module example {
//!          namespace "urn:example";
//!          prefix ex;
//!          container state { leaf name { type string; } }
//!        }"#,
//!     "example.yang",
//! )
//! .unwrap();
//! let errors = set.process();
//! assert!(errors.is_empty(), "{errors}");
//! let module = set.get_module("example").unwrap();
//! let leaf = module.find("/example/state/name").unwrap();
//! assert_eq!(leaf.path(), "/example/state/name");
//! ```

/// Foundation types: Location, LineIndex
pub mod base;

/// Parser: logos lexer, recursive-descent statement parser
pub mod parser;

/// Typed AST: node kinds, statement-schema table, builder
pub mod ast;

/// Type system: built-ins, ranges, decimal64, resolution
pub mod types;

/// Semantic resolution: dictionaries, identity passes, ModuleSet
pub mod semantic;

/// Resolved schema tree: Entry, expansion, navigation
pub mod schema;

/// Project management: source loading by module name
pub mod project;

/// Located diagnostics, sorted and de-duplicated
pub mod diagnostics;

// Re-export the types almost every caller needs
pub use base::Location;
pub use diagnostics::{Diagnostic, DiagnosticKind, Errors};
pub use schema::{Entry, EntryKind, EntryNode, TriState};
pub use semantic::{ModuleSet, ModuleSetOptions};
pub use types::{TypeKind, YangType};
