//! The AST builder: statement tree in, typed nodes out.
//!
//! Dispatch is entirely table-driven. For each statement the builder
//! instantiates the payload for its keyword, walks the substatements,
//! and installs each one through the parent's statement-schema table —
//! rejecting unknown keywords, duplicate single-valued fields, and
//! (afterwards) missing required fields. Unknown *prefixed* keywords are
//! extension statements and are retained verbatim instead.
//!
//! A failed substatement never aborts the build; the error is recorded
//! and later passes run on what was recognised.

use super::nodes::*;
use super::{Node, NodeArena, NodeId};
use crate::diagnostics::Diagnostic;
use crate::parser::Statement;

/// The payload shape a (non-root) keyword builds. Anything not structured
/// is a scalar `Value`; acceptance was already checked against the
/// parent's table, so the fallback can only be reached for scalars.
pub fn keyword_shape(keyword: &str) -> NodeKind {
    match keyword {
        "import" => NodeKind::Import(Default::default()),
        "include" => NodeKind::Include(Default::default()),
        "belongs-to" => NodeKind::BelongsTo(Default::default()),
        "revision" => NodeKind::Revision(Default::default()),
        "container" => NodeKind::Container(Default::default()),
        "list" => NodeKind::List(Default::default()),
        "leaf" => NodeKind::Leaf(Default::default()),
        "leaf-list" => NodeKind::LeafList(Default::default()),
        "choice" => NodeKind::Choice(Default::default()),
        "case" => NodeKind::Case(Default::default()),
        "grouping" => NodeKind::Grouping(Default::default()),
        "uses" => NodeKind::Uses(Default::default()),
        "refine" => NodeKind::Refine(Default::default()),
        "augment" => NodeKind::Augment(Default::default()),
        "typedef" => NodeKind::Typedef(Default::default()),
        "type" => NodeKind::Type(Default::default()),
        "identity" => NodeKind::Identity(Default::default()),
        "extension" => NodeKind::Extension(Default::default()),
        "argument" => NodeKind::Argument(Default::default()),
        "feature" => NodeKind::Feature(Default::default()),
        "must" => NodeKind::Must(Default::default()),
        "when" => NodeKind::When(Default::default()),
        "enum" => NodeKind::Enum(Default::default()),
        "bit" => NodeKind::Bit(Default::default()),
        "deviation" => NodeKind::Deviation(Default::default()),
        "deviate" => NodeKind::Deviate(Default::default()),
        "rpc" => NodeKind::Rpc(Default::default()),
        "action" => NodeKind::Action(Default::default()),
        "input" => NodeKind::Input(Default::default()),
        "output" => NodeKind::Output(Default::default()),
        "notification" => NodeKind::Notification(Default::default()),
        "anyxml" => NodeKind::AnyXml(Default::default()),
        "anydata" => NodeKind::AnyData(Default::default()),
        _ => NodeKind::Value(Default::default()),
    }
}

/// Build a top-level statement into the arena.
///
/// Only `module` and `submodule` are valid roots; `submodule` is an alias
/// for the module shape at the root and nowhere else.
pub fn build_root(
    arena: &mut NodeArena,
    statement: &Statement,
    errors: &mut Vec<Diagnostic>,
) -> Option<NodeId> {
    match statement.keyword.as_str() {
        "module" | "submodule" => {
            let mut builder = Builder { arena, errors };
            Some(builder.build(statement, NodeKind::Module(Default::default()), None))
        }
        other => {
            errors.push(Diagnostic::ast(
                statement.loc.clone(),
                format!("unknown statement at top level: \"{other}\""),
            ));
            None
        }
    }
}

struct Builder<'a> {
    arena: &'a mut NodeArena,
    errors: &'a mut Vec<Diagnostic>,
}

impl Builder<'_> {
    fn build(&mut self, statement: &Statement, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.arena.alloc(Node {
            name: statement.arg().into(),
            keyword: statement.keyword.clone(),
            loc: statement.loc.clone(),
            parent,
            exts: Vec::new(),
            kind,
        });

        for child in &statement.children {
            if child.is_extension() {
                self.arena[id].exts.push(child.clone());
                continue;
            }
            let accepted = self.arena[id]
                .kind
                .fields()
                .iter()
                .any(|f| f.keyword == child.keyword);
            if !accepted {
                self.errors.push(Diagnostic::ast(
                    child.loc.clone(),
                    format!(
                        "unknown substatement \"{}\" in \"{}\"",
                        child.keyword, statement.keyword
                    ),
                ));
                continue;
            }
            let child_id = self.build(child, keyword_shape(&child.keyword), Some(id));
            if self.arena[id].kind.install(&child.keyword, child_id) == Install::Duplicate {
                self.errors.push(Diagnostic::ast(
                    child.loc.clone(),
                    format!(
                        "duplicate substatement \"{}\" in \"{}\"",
                        child.keyword, statement.keyword
                    ),
                ));
            }
        }

        self.check_required(statement, id);
        id
    }

    fn check_required(&mut self, statement: &Statement, id: NodeId) {
        for spec in self.arena[id].kind.fields() {
            let present = self.arena[id].kind.has(spec.keyword);
            match spec.required {
                Required::No => {}
                Required::Always => {
                    if !present {
                        self.errors.push(Diagnostic::ast(
                            statement.loc.clone(),
                            format!(
                                "{} \"{}\": missing required substatement \"{}\"",
                                statement.keyword,
                                statement.arg(),
                                spec.keyword
                            ),
                        ));
                    }
                }
                Required::Under(written) => {
                    if statement.keyword == written && !present {
                        self.errors.push(Diagnostic::ast(
                            statement.loc.clone(),
                            format!(
                                "{} \"{}\": missing required substatement \"{}\"",
                                statement.keyword,
                                statement.arg(),
                                spec.keyword
                            ),
                        ));
                    } else if statement.keyword != written && present {
                        self.errors.push(Diagnostic::ast(
                            statement.loc.clone(),
                            format!(
                                "substatement \"{}\" is not allowed in \"{}\"",
                                spec.keyword, statement.keyword
                            ),
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn build(source: &str) -> (NodeArena, Option<NodeId>, Vec<Diagnostic>) {
        let parsed = parse(source, "test.yang");
        assert!(parsed.ok(), "parse errors: {:?}", parsed.errors);
        let mut arena = NodeArena::new();
        let mut errors = Vec::new();
        let id = build_root(&mut arena, &parsed.statements[0], &mut errors);
        (arena, id, errors)
    }

    #[test]
    fn builds_module_with_leaf() {
        let (arena, id, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 leaf x { type string; }
               }"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let module = arena[id.unwrap()].kind.as_module().unwrap();
        assert_eq!(module.leaf.len(), 1);
        let leaf = arena[module.leaf[0]].kind.as_leaf().unwrap();
        let type_node = leaf.type_stmt.unwrap();
        assert_eq!(arena[type_node].name, "string");
    }

    #[test]
    fn module_requires_namespace_and_prefix() {
        let (_, _, errors) = build("module m { }");
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("\"namespace\"")));
        assert!(messages.iter().any(|m| m.contains("\"prefix\"")));
    }

    #[test]
    fn submodule_requires_belongs_to_and_forbids_namespace() {
        let (_, _, errors) = build(
            r#"submodule s {
                 namespace "urn:s";
               }"#,
        );
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("\"belongs-to\"")));
        assert!(
            messages
                .iter()
                .any(|m| m.contains("\"namespace\" is not allowed"))
        );
    }

    #[test]
    fn unknown_substatement_is_reported() {
        let (_, _, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 leaf x { type string; frobnicate; }
               }"#,
        );
        assert!(errors.iter().any(|e| {
            e.to_string().contains("unknown substatement \"frobnicate\" in \"leaf\"")
        }));
    }

    #[test]
    fn duplicate_single_valued_field() {
        let (_, _, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 leaf x { type string; type int8; }
               }"#,
        );
        assert!(errors.iter().any(|e| e.to_string().contains("duplicate substatement \"type\"")));
    }

    #[test]
    fn missing_required_type() {
        let (_, _, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 leaf x { }
               }"#,
        );
        assert!(errors.iter().any(|e| e.to_string().contains("missing required substatement \"type\"")));
    }

    #[test]
    fn prefixed_keywords_are_extensions() {
        let (arena, id, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 ext:annotation "x";
                 leaf x { type string; ext:other; }
               }"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let root = &arena[id.unwrap()];
        assert_eq!(root.exts.len(), 1);
        assert_eq!(root.exts[0].keyword, "ext:annotation");
    }

    #[test]
    fn nested_module_statement_is_unknown() {
        let (_, _, errors) = build(
            r#"module m {
                 namespace "urn:m";
                 prefix m;
                 module inner { }
               }"#,
        );
        assert!(errors.iter().any(|e| e.to_string().contains("unknown substatement \"module\"")));
    }
}
