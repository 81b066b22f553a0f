//! Identity registration, cross-module linking, and closure.

mod helpers;

use helpers::{has_error, process_err, process_ok};
use yangtree::ModuleSet;
use yangtree::types::TypeKind;

fn derived_names(set: &ModuleSet, module: &str, identity: &str) -> Vec<String> {
    let id = set
        .identities()
        .get(module, identity)
        .unwrap_or_else(|| panic!("identity {module}:{identity} not registered"));
    set.arena()[id]
        .kind
        .as_identity()
        .expect("identity node")
        .values
        .iter()
        .map(|&v| set.arena()[v].name.to_string())
        .collect()
}

#[test]
fn identity_derivation_across_modules() {
    let set = process_ok(&[
        (
            "remote.yang",
            r#"module remote {
                 namespace "urn:remote";
                 prefix rem;
                 identity REMOTE_BASE;
               }"#,
        ),
        (
            "base.yang",
            r#"module base {
                 namespace "urn:base";
                 prefix b;
                 import remote { prefix r; }
                 identity LOCAL { base r:REMOTE_BASE; }
               }"#,
        ),
    ]);

    assert_eq!(derived_names(&set, "remote", "REMOTE_BASE"), vec!["LOCAL"]);

    // LOCAL's base resolves to remote's REMOTE_BASE
    let local = set.identities().get("base", "LOCAL").unwrap();
    let base_refs = &set.arena()[local].kind.as_identity().unwrap().base;
    assert_eq!(base_refs.len(), 1);
    assert_eq!(set.arena()[base_refs[0]].name, "r:REMOTE_BASE");
}

#[test]
fn multi_level_closure_is_ordered_by_name() {
    let set = process_ok(&[(
        "fam.yang",
        r#"module fam {
             namespace "urn:fam";
             prefix fam;
             identity GGF;
             identity GF { base GGF; }
             identity F { base GF; }
             identity U { base GF; }
             identity S { base F; }
             identity B { base F; }
             identity GU { base GGF; }
           }"#,
    )]);

    assert_eq!(
        derived_names(&set, "fam", "GGF"),
        vec!["B", "F", "GF", "GU", "S", "U"]
    );
    assert_eq!(derived_names(&set, "fam", "GF"), vec!["B", "F", "S", "U"]);
    assert_eq!(derived_names(&set, "fam", "F"), vec!["B", "S"]);
    assert!(derived_names(&set, "fam", "S").is_empty());
}

#[test]
fn union_of_identityrefs() {
    let mut set = process_ok(&[(
        "u.yang",
        r#"module u {
             namespace "urn:u";
             prefix u;
             identity BASE5A;
             identity BASE5B;
             identity FIVE_ONE { base BASE5A; }
             identity FIVE_TWO { base BASE5B; }
             leaf five {
               type union {
                 type identityref { base BASE5A; }
                 type identityref { base BASE5B; }
               }
             }
           }"#,
    )]);

    let base_a = set.identities().get("u", "BASE5A").unwrap();
    let base_b = set.identities().get("u", "BASE5B").unwrap();

    let module = set.get_module("u").expect("module entry");
    let five = module.find("/u/five").expect("leaf five");
    let yang_type = five.entry().yang_type.as_ref().expect("resolved type");
    assert_eq!(yang_type.kind, TypeKind::Union);
    assert_eq!(yang_type.union.len(), 2);
    assert_eq!(yang_type.union[0].kind, TypeKind::Identityref);
    assert_eq!(yang_type.union[0].identity_base, vec![base_a]);
    assert_eq!(yang_type.union[1].identity_base, vec![base_b]);

    // the union's members report their derived identities
    assert_eq!(derived_names(&set, "u", "BASE5A"), vec!["FIVE_ONE"]);
    assert_eq!(derived_names(&set, "u", "BASE5B"), vec!["FIVE_TWO"]);
}

#[test]
fn identity_cycle_terminates() {
    // illegal but must not hang: closure uses a visited set
    let mut set = helpers::set_from(&[(
        "cyc.yang",
        r#"module cyc {
             namespace "urn:cyc";
             prefix c;
             identity A { base B; }
             identity B { base A; }
             leaf x { type identityref { base A; } }
           }"#,
    )]);
    let _ = set.process();
    // each identity sees the other through the cycle, itself excluded
    assert_eq!(derived_names(&set, "cyc", "A"), vec!["B"]);
    assert_eq!(derived_names(&set, "cyc", "B"), vec!["A"]);
}

#[test]
fn unknown_base_is_local_error() {
    let (_, errors) = process_err(&[(
        "m.yang",
        r#"module m {
             namespace "urn:m";
             prefix m;
             identity X { base NO_SUCH; }
           }"#,
    )]);
    assert!(has_error(&errors, "identity \"NO_SUCH\" not found in module \"m\""));
}

#[test]
fn unknown_prefix_on_base() {
    let (_, errors) = process_err(&[(
        "m.yang",
        r#"module m {
             namespace "urn:m";
             prefix m;
             identity X { base nope:THING; }
           }"#,
    )]);
    assert!(has_error(&errors, "unknown prefix \"nope\""));
}

#[test]
fn unknown_remote_base() {
    let (_, errors) = process_err(&[
        (
            "r.yang",
            r#"module r {
                 namespace "urn:r";
                 prefix r;
               }"#,
        ),
        (
            "m.yang",
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 import r { prefix rr; }
                 identity X { base rr:ABSENT; }
               }"#,
        ),
    ]);
    assert!(has_error(
        &errors,
        "identity \"ABSENT\" not found in imported module \"r\""
    ));
}

#[test]
fn own_prefix_resolves_locally() {
    let set = process_ok(&[(
        "m.yang",
        r#"module m {
             namespace "urn:m";
             prefix me;
             identity BASE;
             identity KID { base me:BASE; }
           }"#,
    )]);
    assert_eq!(derived_names(&set, "m", "BASE"), vec!["KID"]);
}

#[test]
fn submodule_identities_key_on_parent_module() {
    let set = process_ok(&[
        (
            "main.yang",
            r#"module main {
                 namespace "urn:main";
                 prefix mn;
                 include sub;
                 identity TOP;
               }"#,
        ),
        (
            "sub.yang",
            r#"submodule sub {
                 belongs-to main { prefix mn; }
                 identity FROM_SUB { base TOP; }
               }"#,
        ),
    ]);
    assert!(set.identities().get("main", "FROM_SUB").is_some());
    assert_eq!(derived_names(&set, "main", "TOP"), vec!["FROM_SUB"]);
}
