//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use yangtree::ModuleSet;
use yangtree::diagnostics::Errors;

/// Parse each `(file name, source)` pair into a fresh module set,
/// panicking on parse errors.
pub fn set_from(sources: &[(&str, &str)]) -> ModuleSet {
    let mut set = ModuleSet::new();
    for (name, source) in sources {
        set.parse(source, name)
            .unwrap_or_else(|e| panic!("parse {name} failed:\n{e}"));
    }
    set
}

/// Parse and process, asserting the whole pipeline is clean.
pub fn process_ok(sources: &[(&str, &str)]) -> ModuleSet {
    let mut set = set_from(sources);
    let errors = set.process();
    assert!(errors.is_empty(), "unexpected errors:\n{errors}");
    set
}

/// Parse and process, returning the diagnostics (which must be
/// non-empty).
pub fn process_err(sources: &[(&str, &str)]) -> (ModuleSet, Errors) {
    let mut set = set_from(sources);
    let errors = set.process();
    assert!(!errors.is_empty(), "expected processing errors");
    (set, errors)
}

/// True when some rendered diagnostic contains `needle`.
pub fn has_error(errors: &Errors, needle: &str) -> bool {
    errors.iter().any(|e| e.to_string().contains(needle))
}
