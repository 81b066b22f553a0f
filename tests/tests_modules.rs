//! Module set linking: imports, includes, prefix/namespace lookup.

mod helpers;

use helpers::{has_error, process_err, process_ok, set_from};
use yangtree::semantic::LookupError;
use yangtree::{ModuleSet, ModuleSetOptions};

#[test]
fn import_links_and_prefix_lookup() {
    let set = process_ok(&[
        (
            "a.yang",
            r#"module a {
                 namespace "urn:a";
                 prefix aa;
               }"#,
        ),
        (
            "b.yang",
            r#"module b {
                 namespace "urn:b";
                 prefix bb;
                 import a { prefix other; }
               }"#,
        ),
    ]);

    let found = set.find_module_by_prefix("aa").expect("module a by prefix");
    assert_eq!(found.name, "a");
    // the cached path answers the same way
    assert_eq!(set.find_module_by_prefix("aa").unwrap().name, "a");
    assert_eq!(set.find_module_by_namespace("urn:b").unwrap().name, "b");

    assert!(matches!(
        set.find_module_by_prefix("nope"),
        Err(LookupError::UnknownPrefix(_))
    ));
    assert!(matches!(
        set.find_module_by_namespace("urn:none"),
        Err(LookupError::UnknownNamespace(_))
    ));
}

#[test]
fn module_entry_exposes_metadata() {
    let mut set = process_ok(&[(
        "m.yang",
        r#"module m {
             yang-version 1.1;
             namespace "urn:m";
             prefix m;
             organization "Example Networks";
             contact "netops@example.net";
             description "Device management.";
           }"#,
    )]);
    let module = set.get_module("m").unwrap();
    assert_eq!(module.yang_version.as_deref(), Some("1.1"));
    assert_eq!(module.organization.as_deref(), Some("Example Networks"));
    assert_eq!(module.contact.as_deref(), Some("netops@example.net"));
    assert_eq!(module.description.as_deref(), Some("Device management."));
}

#[test]
fn ambiguous_prefix_is_reported() {
    let set = process_ok(&[
        (
            "x.yang",
            r#"module x { namespace "urn:x"; prefix same; }"#,
        ),
        (
            "y.yang",
            r#"module y { namespace "urn:y"; prefix same; }"#,
        ),
    ]);
    assert!(matches!(
        set.find_module_by_prefix("same"),
        Err(LookupError::AmbiguousPrefix(_))
    ));
}

#[test]
fn missing_import_is_an_error() {
    let (_, errors) = process_err(&[(
        "m.yang",
        r#"module m {
             namespace "urn:m";
             prefix m;
             import ghost { prefix g; }
           }"#,
    )]);
    assert!(has_error(&errors, "no such module \"ghost\""));
}

#[test]
fn missing_include_is_an_error() {
    let (_, errors) = process_err(&[(
        "m.yang",
        r#"module m {
             namespace "urn:m";
             prefix m;
             include ghost;
           }"#,
    )]);
    assert!(has_error(&errors, "no such submodule \"ghost\""));
}

#[test]
fn include_merges_submodule_definitions() {
    let mut set = process_ok(&[
        (
            "main.yang",
            r#"module main {
                 namespace "urn:main";
                 prefix mn;
                 include sub;
                 leaf from-main { type string; }
               }"#,
        ),
        (
            "sub.yang",
            r#"submodule sub {
                 belongs-to main { prefix mn; }
                 leaf from-sub { type string; }
               }"#,
        ),
    ]);
    let module = set.get_module("main").unwrap();
    assert!(module.find("/main/from-main").is_some());
    assert!(module.find("/main/from-sub").is_some());
}

#[test]
fn submodule_typedef_visible_in_including_module() {
    let mut set = process_ok(&[
        (
            "main.yang",
            r#"module main {
                 namespace "urn:main";
                 prefix mn;
                 include sub;
                 leaf port { type port-number; }
               }"#,
        ),
        (
            "sub.yang",
            r#"submodule sub {
                 belongs-to main { prefix mn; }
                 typedef port-number { type uint16 { range "1..65535"; } }
               }"#,
        ),
    ]);
    let module = set.get_module("main").unwrap();
    let port = module.find("/main/port").unwrap();
    let yang_type = port.entry().yang_type.as_ref().unwrap();
    assert_eq!(yang_type.kind, yangtree::TypeKind::Uint16);
    assert_eq!(yang_type.range.as_ref().unwrap().to_string(), "1..65535");
}

#[test]
fn belongs_to_mismatch_is_reported() {
    let (_, errors) = process_err(&[
        (
            "main.yang",
            r#"module main {
                 namespace "urn:main";
                 prefix mn;
                 include sub;
               }"#,
        ),
        (
            "sub.yang",
            r#"submodule sub {
                 belongs-to other { prefix o; }
               }"#,
        ),
    ]);
    assert!(has_error(&errors, "belongs to \"other\", not \"main\""));
}

#[test]
fn circular_submodules_error_by_default() {
    let (_, errors) = process_err(&[
        (
            "a.yang",
            r#"module a {
                 namespace "urn:a";
                 prefix a;
                 include x;
               }"#,
        ),
        (
            "x.yang",
            r#"submodule x {
                 belongs-to a { prefix a; }
                 include y;
                 leaf from-x { type string; }
               }"#,
        ),
        (
            "y.yang",
            r#"submodule y {
                 belongs-to a { prefix a; }
                 include x;
                 leaf from-y { type string; }
               }"#,
        ),
    ]);
    assert!(has_error(&errors, "circular include of submodule"));
}

#[test]
fn circular_submodules_tolerated_with_option() {
    let mut set = ModuleSet::with_options(ModuleSetOptions {
        ignore_submodule_circular_dependencies: true,
        ..Default::default()
    });
    for (name, source) in [
        (
            "a.yang",
            r#"module a {
                 namespace "urn:a";
                 prefix a;
                 include x;
               }"#,
        ),
        (
            "x.yang",
            r#"submodule x {
                 belongs-to a { prefix a; }
                 include y;
                 leaf from-x { type string; }
               }"#,
        ),
        (
            "y.yang",
            r#"submodule y {
                 belongs-to a { prefix a; }
                 include x;
                 leaf from-y { type string; }
               }"#,
        ),
    ] {
        set.parse(source, name).unwrap();
    }
    let errors = set.process();
    assert!(errors.is_empty(), "unexpected errors:\n{errors}");

    let module = set.get_module("a").unwrap();
    // union of both submodules' definitions, each exactly once
    assert!(module.find("/a/from-x").is_some());
    assert!(module.find("/a/from-y").is_some());
    assert_eq!(module.children().count(), 2);
}

#[test]
fn diamond_inclusion_merges_once() {
    let mut set = process_ok(&[
        (
            "top.yang",
            r#"module top {
                 namespace "urn:top";
                 prefix t;
                 include left;
                 include right;
               }"#,
        ),
        (
            "left.yang",
            r#"submodule left {
                 belongs-to top { prefix t; }
                 include shared;
               }"#,
        ),
        (
            "right.yang",
            r#"submodule right {
                 belongs-to top { prefix t; }
                 include shared;
               }"#,
        ),
        (
            "shared.yang",
            r#"submodule shared {
                 belongs-to top { prefix t; }
                 leaf only-once { type string; }
               }"#,
        ),
    ]);
    let module = set.get_module("top").unwrap();
    assert!(module.find("/top/only-once").is_some());
    assert_eq!(module.children().count(), 1);
}

#[test]
fn import_revision_date_must_match() {
    let (_, errors) = process_err(&[
        (
            "dated.yang",
            r#"module dated {
                 namespace "urn:dated";
                 prefix d;
                 revision 2024-01-01;
               }"#,
        ),
        (
            "m.yang",
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 import dated { prefix d; revision-date 2020-06-06; }
               }"#,
        ),
    ]);
    assert!(has_error(&errors, "no revision 2020-06-06 of \"dated\""));
}

#[test]
fn duplicate_module_name_rejected_at_parse() {
    let mut set = ModuleSet::new();
    let source = r#"module m { namespace "urn:m"; prefix m; }"#;
    set.parse(source, "m1.yang").unwrap();
    let err = set.parse(source, "m2.yang").unwrap_err();
    assert!(err.to_string().contains("duplicate module \"m\""));
}

#[test]
fn unknown_module_from_get_module() {
    let mut set = set_from(&[(
        "m.yang",
        r#"module m { namespace "urn:m"; prefix m; }"#,
    )]);
    let err = set.get_module("ghost").unwrap_err();
    assert!(err.to_string().contains("unknown module \"ghost\""));
}
