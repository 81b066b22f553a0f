//! Source loading: search paths, revision selection, on-demand reads.

mod helpers;

use std::fs;
use std::path::Path;
use yangtree::ModuleSet;
use yangtree::project::{LoadError, SourceLoader};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn finds_exact_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yang", "module a {}");
    let mut loader = SourceLoader::new();
    loader.add_path(dir.path());
    let (path, source) = loader.find("a").unwrap();
    assert!(path.ends_with("a.yang"));
    assert_eq!(source, "module a {}");
}

#[test]
fn missing_module_is_not_found() {
    let loader = SourceLoader::new();
    assert!(matches!(loader.find("ghost"), Err(LoadError::NotFound(_))));
}

#[test]
fn picks_greatest_revision() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "m@2020-01-01.yang", "old");
    write(dir.path(), "m@2023-12-31.yang", "new");
    write(dir.path(), "m@2021-06-15.yang", "middle");
    let mut loader = SourceLoader::new();
    loader.add_path(dir.path());
    let (path, source) = loader.find("m").unwrap();
    assert!(path.ends_with("m@2023-12-31.yang"));
    assert_eq!(source, "new");
}

#[test]
fn exact_name_wins_over_revisions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "m.yang", "plain");
    write(dir.path(), "m@2023-12-31.yang", "dated");
    let mut loader = SourceLoader::new();
    loader.add_path(dir.path());
    let (_, source) = loader.find("m").unwrap();
    assert_eq!(source, "plain");
}

#[test]
fn dot_dot_dot_recurses_into_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("vendor/acme")).unwrap();
    write(&dir.path().join("vendor/acme"), "deep.yang", "module deep {}");
    let mut loader = SourceLoader::new();
    loader.add_path(format!("{}/...", dir.path().display()));
    let (path, _) = loader.find("deep").unwrap();
    assert!(path.ends_with("deep.yang"));
}

#[test]
fn read_parses_from_search_path() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "mod-a.yang",
        r#"module mod-a {
             namespace "urn:mod-a";
             prefix a;
             leaf x { type string; }
           }"#,
    );
    let mut set = ModuleSet::new();
    set.add_search_path(dir.path());
    set.read("mod-a").unwrap();
    let errors = set.process();
    assert!(errors.is_empty(), "{errors}");
    let module = set.get_module("mod-a").unwrap();
    assert!(module.find("/mod-a/x").is_some());
}

#[test]
fn missing_read_is_an_error() {
    let mut set = ModuleSet::new();
    let err = set.read("absent").unwrap_err();
    assert!(err.to_string().contains("no YANG source found"));
}

#[test]
fn imports_are_read_on_demand_during_process() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "dep.yang",
        r#"module dep {
             namespace "urn:dep";
             prefix dep;
             typedef t { type uint8; }
           }"#,
    );
    let mut set = ModuleSet::new();
    set.add_search_path(dir.path());
    set.parse(
        r#"module top {
             namespace "urn:top";
             prefix t;
             import dep { prefix d; }
             leaf x { type d:t; }
           }"#,
        "top.yang",
    )
    .unwrap();
    let errors = set.process();
    assert!(errors.is_empty(), "{errors}");
    let module = set.get_module("top").unwrap();
    let x = module.find("/top/x").unwrap();
    assert_eq!(
        x.entry().yang_type.as_ref().unwrap().kind,
        yangtree::TypeKind::Uint8
    );
}

#[test]
fn includes_are_read_on_demand_during_process() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "part.yang",
        r#"submodule part {
             belongs-to whole { prefix w; }
             leaf from-part { type string; }
           }"#,
    );
    let mut set = ModuleSet::new();
    set.add_search_path(dir.path());
    set.parse(
        r#"module whole {
             namespace "urn:whole";
             prefix w;
             include part;
           }"#,
        "whole.yang",
    )
    .unwrap();
    let errors = set.process();
    assert!(errors.is_empty(), "{errors}");
    let module = set.get_module("whole").unwrap();
    assert!(module.find("/whole/from-part").is_some());
}
