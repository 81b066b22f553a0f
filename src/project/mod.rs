//! Project management: locating YANG sources on disk.
//!
//! The resolution core never touches the filesystem itself; it asks a
//! [`SourceLoader`] for `(path, text)` by logical module name.

mod source_loader;

pub use source_loader::{LoadError, SourceLoader};
