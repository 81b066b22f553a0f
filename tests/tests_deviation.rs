//! Deviation semantics: not-supported, add, replace, delete.

mod helpers;

use helpers::{has_error, process_err, process_ok};
use yangtree::{ModuleSet, ModuleSetOptions, TriState, TypeKind};

const TARGET: (&str, &str) = (
    "base.yang",
    r#"module base {
         namespace "urn:base";
         prefix b;
         container a {
           leaf b { type string; default unchanged; units chars; }
           list l {
             key "name";
             leaf name { type string; }
           }
         }
       }"#,
);

#[test]
fn deviate_replace_type() {
    let mut set = process_ok(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:b {
                   deviate replace { type uint16; }
                 }
               }"#,
        ),
    ]);
    let base = set.get_module("base").unwrap();
    let leaf = base.find("/base/a/b").unwrap();
    let yang_type = leaf.entry().yang_type.as_ref().unwrap();
    assert_eq!(yang_type.name, "uint16");
    assert_eq!(yang_type.kind, TypeKind::Uint16);
}

#[test]
fn deviate_replace_type_resolves_in_deviation_scope() {
    let mut set = process_ok(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 typedef local-t { type int32 { range "0..99"; } }
                 deviation /b:a/b:b {
                   deviate replace { type local-t; }
                 }
               }"#,
        ),
    ]);
    let base = set.get_module("base").unwrap();
    let leaf = base.find("/base/a/b").unwrap();
    let yang_type = leaf.entry().yang_type.as_ref().unwrap();
    assert_eq!(yang_type.kind, TypeKind::Int32);
    assert_eq!(yang_type.range.as_ref().unwrap().to_string(), "0..99");
}

#[test]
fn deviate_not_supported_removes_node() {
    let mut set = process_ok(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:b {
                   deviate not-supported;
                 }
               }"#,
        ),
    ]);
    let base = set.get_module("base").unwrap();
    assert!(base.find("/base/a/b").is_none());
    assert!(base.find("/base/a/l").is_some());
}

#[test]
fn deviate_not_supported_ignored_with_option() {
    let mut set = ModuleSet::with_options(ModuleSetOptions {
        ignore_deviate_not_supported: true,
        ..Default::default()
    });
    set.parse(TARGET.1, TARGET.0).unwrap();
    set.parse(
        r#"module dev {
             namespace "urn:dev";
             prefix d;
             import base { prefix b; }
             deviation /b:a/b:b {
               deviate not-supported;
             }
           }"#,
        "dev.yang",
    )
    .unwrap();
    let errors = set.process();
    assert!(errors.is_empty(), "{errors}");
    let base = set.get_module("base").unwrap();
    assert!(base.find("/base/a/b").is_some());
}

#[test]
fn deviate_add_and_delete_attributes() {
    let mut set = process_ok(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:b {
                   deviate add { config false; mandatory true; }
                 }
                 deviation /b:a/b:l {
                   deviate add { min-elements 2; max-elements 10; }
                 }
               }"#,
        ),
    ]);
    let base = set.get_module("base").unwrap();
    let leaf = base.find("/base/a/b").unwrap();
    assert_eq!(leaf.config, TriState::False);
    assert_eq!(leaf.mandatory, TriState::True);
    let list = base.find("/base/a/l").unwrap();
    let attr = list.list_attr.as_ref().unwrap();
    assert_eq!(attr.min_elements, Some(2));
    assert_eq!(attr.max_elements, Some(10));
}

#[test]
fn deviate_delete_returns_attributes_to_unset() {
    let mut set = process_ok(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:b {
                   deviate delete { default unchanged; units chars; }
                 }
               }"#,
        ),
    ]);
    let base = set.get_module("base").unwrap();
    let leaf = base.find("/base/a/b").unwrap();
    assert_eq!(leaf.entry().default, None);
    assert_eq!(leaf.entry().units, None);
    assert_eq!(leaf.default_value(), None);
}

#[test]
fn deviate_delete_mandatory_clears_target() {
    let mut set = process_ok(&[
        (
            "m.yang",
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 leaf must-have { type string; mandatory true; }
                 deviation /must-have {
                   deviate delete { mandatory true; }
                 }
               }"#,
        ),
    ]);
    let module = set.get_module("m").unwrap();
    let leaf = module.find("/m/must-have").unwrap();
    assert_eq!(leaf.mandatory, TriState::Unset);
}

#[test]
fn min_elements_on_non_list_is_an_error() {
    let (_, errors) = process_err(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:b {
                   deviate add { min-elements 1; }
                 }
               }"#,
        ),
    ]);
    assert!(has_error(&errors, "not a list or leaf-list"));
}

#[test]
fn deviation_target_not_found() {
    let (_, errors) = process_err(&[
        TARGET,
        (
            "dev.yang",
            r#"module dev {
                 namespace "urn:dev";
                 prefix d;
                 import base { prefix b; }
                 deviation /b:a/b:missing {
                   deviate not-supported;
                 }
               }"#,
        ),
    ]);
    assert!(has_error(&errors, "deviation target not found"));
}
