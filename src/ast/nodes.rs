//! Node kinds and their statement-schema tables.
//!
//! Each YANG keyword gets a payload struct declared through [`yang_node!`],
//! which generates the struct, its field table (`FIELDS`), the installer
//! used by the AST builder, and the presence check used for required-field
//! validation. The table is data: the builder never hard-codes keyword
//! dispatch for a particular node kind.
//!
//! Cardinality is `one` (at most once) or `many`; `[required]` marks a
//! mandatory substatement and `[required = "module"]` one that is
//! mandatory when the node was written with that keyword and forbidden
//! otherwise — which is how the `module`/`submodule` divergence
//! (`namespace`/`prefix` vs `belongs-to`) is enforced from one table.

use super::NodeId;
use crate::types::YangType;

/// How often a substatement may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Whether a substatement must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    No,
    Always,
    /// Required when the node's written keyword matches, forbidden when it
    /// does not (root `module` vs `submodule` aliasing).
    Under(&'static str),
}

/// One row of a node kind's statement-schema table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub keyword: &'static str,
    pub cardinality: Cardinality,
    pub required: Required,
}

/// Result of installing a substatement into a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Install {
    Installed,
    /// A single-valued field was already set.
    Duplicate,
    /// The keyword is not in this node's table.
    Unknown,
}

macro_rules! yang_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kw:literal) {
            $( $skw:literal => $field:ident : $card:ident $( [ $req:ident $( = $reqkw:literal )? ] )? ),* $(,)?
        }
        $( extra { $( $(#[$emeta:meta])* $efield:ident : $ety:ty ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            $( pub $field: yang_node!(@ty $card), )*
            $( $( $(#[$emeta])* pub $efield: $ety, )* )?
        }

        impl $name {
            pub const KEYWORD: &'static str = $kw;

            pub const FIELDS: &'static [FieldSpec] = &[
                $( FieldSpec {
                    keyword: $skw,
                    cardinality: yang_node!(@card $card),
                    required: yang_node!(@req $( $req $( $reqkw )? )?),
                }, )*
            ];

            pub fn install(&mut self, keyword: &str, child: NodeId) -> Install {
                match keyword {
                    $( $skw => yang_node!(@install $card, self.$field, child), )*
                    _ => Install::Unknown,
                }
            }

            pub fn has(&self, keyword: &str) -> bool {
                match keyword {
                    $( $skw => yang_node!(@has $card, self.$field), )*
                    _ => false,
                }
            }
        }
    };
    (@ty one) => { Option<NodeId> };
    (@ty many) => { Vec<NodeId> };
    (@card one) => { Cardinality::One };
    (@card many) => { Cardinality::Many };
    (@req) => { Required::No };
    (@req required) => { Required::Always };
    (@req required $kw:literal) => { Required::Under($kw) };
    (@install one, $slot:expr, $child:expr) => {{
        if $slot.is_some() {
            Install::Duplicate
        } else {
            $slot = Some($child);
            Install::Installed
        }
    }};
    (@install many, $slot:expr, $child:expr) => {{
        $slot.push($child);
        Install::Installed
    }};
    (@has one, $slot:expr) => { $slot.is_some() };
    (@has many, $slot:expr) => { !$slot.is_empty() };
}

yang_node! {
    /// Terminal node for scalar-valued substatements (`description`,
    /// `config`, `key`, ...). The scalar itself is the node's `name`.
    pub struct ValueNode("value") {
        "description" => description: one,
        "reference" => reference: one,
        "status" => status: one,
    }
}

yang_node! {
    /// A `module` or `submodule` statement. The two share one shape; the
    /// conditional-required rows keep them honest (`namespace`/`prefix`
    /// only on modules, `belongs-to` only on submodules).
    pub struct ModuleNode("module") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "augment" => augment: many,
        "belongs-to" => belongs_to: one [required = "submodule"],
        "choice" => choice: many,
        "contact" => contact: one,
        "container" => container: many,
        "description" => description: one,
        "deviation" => deviation: many,
        "extension" => extension: many,
        "feature" => feature: many,
        "grouping" => grouping: many,
        "identity" => identity: many,
        "import" => import: many,
        "include" => include: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "namespace" => namespace: one [required = "module"],
        "notification" => notification: many,
        "organization" => organization: one,
        "prefix" => prefix: one [required = "module"],
        "reference" => reference: one,
        "revision" => revision: many,
        "rpc" => rpc: many,
        "typedef" => typedef: many,
        "uses" => uses: many,
        "yang-version" => yang_version: one,
    }
}

yang_node! {
    pub struct ImportNode("import") {
        "description" => description: one,
        "prefix" => prefix: one [required],
        "reference" => reference: one,
        "revision-date" => revision_date: one,
    }
    extra {
        /// The imported module, linked by the module resolver.
        module: Option<NodeId>,
    }
}

yang_node! {
    pub struct IncludeNode("include") {
        "description" => description: one,
        "reference" => reference: one,
        "revision-date" => revision_date: one,
    }
    extra {
        /// The included submodule, linked by the module resolver.
        submodule: Option<NodeId>,
    }
}

yang_node! {
    pub struct BelongsToNode("belongs-to") {
        "prefix" => prefix: one [required],
    }
}

yang_node! {
    pub struct RevisionNode("revision") {
        "description" => description: one,
        "reference" => reference: one,
    }
}

yang_node! {
    pub struct ContainerNode("container") {
        "action" => action: many,
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "config" => config: one,
        "container" => container: many,
        "description" => description: one,
        "grouping" => grouping: many,
        "if-feature" => if_feature: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "must" => must: many,
        "notification" => notification: many,
        "presence" => presence: one,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
        "uses" => uses: many,
        "when" => when: one,
    }
}

yang_node! {
    pub struct ListNode("list") {
        "action" => action: many,
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "config" => config: one,
        "container" => container: many,
        "description" => description: one,
        "grouping" => grouping: many,
        "if-feature" => if_feature: many,
        "key" => key: one,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "max-elements" => max_elements: one,
        "min-elements" => min_elements: one,
        "must" => must: many,
        "notification" => notification: many,
        "ordered-by" => ordered_by: one,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
        "unique" => unique: many,
        "uses" => uses: many,
        "when" => when: one,
    }
}

yang_node! {
    pub struct LeafNode("leaf") {
        "config" => config: one,
        "default" => default: one,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "mandatory" => mandatory: one,
        "must" => must: many,
        "reference" => reference: one,
        "status" => status: one,
        "type" => type_stmt: one [required],
        "units" => units: one,
        "when" => when: one,
    }
}

yang_node! {
    pub struct LeafListNode("leaf-list") {
        "config" => config: one,
        "default" => default: many,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "max-elements" => max_elements: one,
        "min-elements" => min_elements: one,
        "must" => must: many,
        "ordered-by" => ordered_by: one,
        "reference" => reference: one,
        "status" => status: one,
        "type" => type_stmt: one [required],
        "units" => units: one,
        "when" => when: one,
    }
}

yang_node! {
    pub struct ChoiceNode("choice") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "case" => case: many,
        "choice" => choice: many,
        "config" => config: one,
        "container" => container: many,
        "default" => default: one,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "mandatory" => mandatory: one,
        "reference" => reference: one,
        "status" => status: one,
        "when" => when: one,
    }
}

yang_node! {
    pub struct CaseNode("case") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "container" => container: many,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "reference" => reference: one,
        "status" => status: one,
        "uses" => uses: many,
        "when" => when: one,
    }
}

yang_node! {
    pub struct GroupingNode("grouping") {
        "action" => action: many,
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "container" => container: many,
        "description" => description: one,
        "grouping" => grouping: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "notification" => notification: many,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
        "uses" => uses: many,
    }
}

yang_node! {
    pub struct UsesNode("uses") {
        "augment" => augment: many,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "refine" => refine: many,
        "reference" => reference: one,
        "status" => status: one,
        "when" => when: one,
    }
}

yang_node! {
    pub struct RefineNode("refine") {
        "config" => config: one,
        "default" => default: one,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "mandatory" => mandatory: one,
        "max-elements" => max_elements: one,
        "min-elements" => min_elements: one,
        "must" => must: many,
        "presence" => presence: one,
        "reference" => reference: one,
        "units" => units: one,
    }
}

yang_node! {
    pub struct AugmentNode("augment") {
        "action" => action: many,
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "case" => case: many,
        "choice" => choice: many,
        "container" => container: many,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "notification" => notification: many,
        "reference" => reference: one,
        "status" => status: one,
        "uses" => uses: many,
        "when" => when: one,
    }
}

yang_node! {
    pub struct TypedefNode("typedef") {
        "default" => default: one,
        "description" => description: one,
        "reference" => reference: one,
        "status" => status: one,
        "type" => type_stmt: one [required],
        "units" => units: one,
    }
    extra {
        /// Resolved type, filled in by type resolution.
        yang_type: Option<Box<YangType>>,
    }
}

yang_node! {
    pub struct TypeNode("type") {
        "base" => base: many,
        "bit" => bit: many,
        "enum" => enums: many,
        "fraction-digits" => fraction_digits: one,
        "length" => length: one,
        "path" => path: one,
        "pattern" => pattern: many,
        "range" => range: one,
        "require-instance" => require_instance: one,
        "type" => union: many,
    }
    extra {
        /// Resolved type, filled in by type resolution.
        yang_type: Option<Box<YangType>>,
    }
}

yang_node! {
    pub struct IdentityNode("identity") {
        "base" => base: many,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "reference" => reference: one,
        "status" => status: one,
    }
    extra {
        /// Identities derived from this one. Direct derivations after
        /// linking; the transitive, name-ordered closure after the
        /// closure pass.
        values: Vec<NodeId>,
    }
}

yang_node! {
    pub struct ExtensionNode("extension") {
        "argument" => argument: one,
        "description" => description: one,
        "reference" => reference: one,
        "status" => status: one,
    }
}

yang_node! {
    pub struct ArgumentNode("argument") {
        "yin-element" => yin_element: one,
    }
}

yang_node! {
    pub struct FeatureNode("feature") {
        "description" => description: one,
        "if-feature" => if_feature: many,
        "reference" => reference: one,
        "status" => status: one,
    }
}

yang_node! {
    pub struct MustNode("must") {
        "description" => description: one,
        "error-app-tag" => error_app_tag: one,
        "error-message" => error_message: one,
        "reference" => reference: one,
    }
}

yang_node! {
    pub struct WhenNode("when") {
        "description" => description: one,
        "reference" => reference: one,
    }
}

yang_node! {
    pub struct EnumNode("enum") {
        "description" => description: one,
        "if-feature" => if_feature: many,
        "reference" => reference: one,
        "status" => status: one,
        "value" => value: one,
    }
}

yang_node! {
    pub struct BitNode("bit") {
        "description" => description: one,
        "if-feature" => if_feature: many,
        "position" => position: one,
        "reference" => reference: one,
        "status" => status: one,
    }
}

yang_node! {
    pub struct DeviationNode("deviation") {
        "description" => description: one,
        "deviate" => deviate: many [required],
        "reference" => reference: one,
    }
}

yang_node! {
    /// The argument selects the aspect: `add`, `replace`, `delete`, or
    /// `not-supported`.
    pub struct DeviateNode("deviate") {
        "config" => config: one,
        "default" => default: one,
        "mandatory" => mandatory: one,
        "max-elements" => max_elements: one,
        "min-elements" => min_elements: one,
        "must" => must: many,
        "type" => type_stmt: one,
        "unique" => unique: many,
        "units" => units: one,
    }
}

yang_node! {
    pub struct RpcNode("rpc") {
        "description" => description: one,
        "grouping" => grouping: many,
        "if-feature" => if_feature: many,
        "input" => input: one,
        "output" => output: one,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
    }
}

yang_node! {
    pub struct ActionNode("action") {
        "description" => description: one,
        "grouping" => grouping: many,
        "if-feature" => if_feature: many,
        "input" => input: one,
        "output" => output: one,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
    }
}

yang_node! {
    pub struct InputNode("input") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "container" => container: many,
        "grouping" => grouping: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "must" => must: many,
        "typedef" => typedef: many,
        "uses" => uses: many,
    }
}

yang_node! {
    pub struct OutputNode("output") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "container" => container: many,
        "grouping" => grouping: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "must" => must: many,
        "typedef" => typedef: many,
        "uses" => uses: many,
    }
}

yang_node! {
    pub struct NotificationNode("notification") {
        "anydata" => anydata: many,
        "anyxml" => anyxml: many,
        "choice" => choice: many,
        "container" => container: many,
        "description" => description: one,
        "grouping" => grouping: many,
        "if-feature" => if_feature: many,
        "leaf" => leaf: many,
        "leaf-list" => leaf_list: many,
        "list" => list: many,
        "must" => must: many,
        "reference" => reference: one,
        "status" => status: one,
        "typedef" => typedef: many,
        "uses" => uses: many,
    }
}

yang_node! {
    pub struct AnyXmlNode("anyxml") {
        "config" => config: one,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "mandatory" => mandatory: one,
        "must" => must: many,
        "reference" => reference: one,
        "status" => status: one,
        "when" => when: one,
    }
}

yang_node! {
    pub struct AnyDataNode("anydata") {
        "config" => config: one,
        "description" => description: one,
        "if-feature" => if_feature: many,
        "mandatory" => mandatory: one,
        "must" => must: many,
        "reference" => reference: one,
        "status" => status: one,
        "when" => when: one,
    }
}

macro_rules! node_kinds {
    ( $( $variant:ident($struct:ident) => ($as_ref:ident, $as_mut:ident) ),* $(,)? ) => {
        /// The typed payload of a [`Node`](super::Node), one variant per
        /// YANG keyword.
        #[derive(Debug, Clone)]
        pub enum NodeKind {
            $( $variant($struct), )*
        }

        impl NodeKind {
            /// Dispatch a substatement keyword against this kind's table.
            pub fn install(&mut self, keyword: &str, child: NodeId) -> Install {
                match self {
                    $( NodeKind::$variant(node) => node.install(keyword, child), )*
                }
            }

            /// This kind's statement-schema table.
            pub fn fields(&self) -> &'static [FieldSpec] {
                match self {
                    $( NodeKind::$variant(_) => $struct::FIELDS, )*
                }
            }

            /// Whether a substatement with this keyword was installed.
            pub fn has(&self, keyword: &str) -> bool {
                match self {
                    $( NodeKind::$variant(node) => node.has(keyword), )*
                }
            }

            /// The canonical keyword for this kind.
            pub fn keyword(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant(_) => $struct::KEYWORD, )*
                }
            }

            $(
                pub fn $as_ref(&self) -> Option<&$struct> {
                    match self {
                        NodeKind::$variant(node) => Some(node),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $struct> {
                    match self {
                        NodeKind::$variant(node) => Some(node),
                        _ => None,
                    }
                }
            )*
        }
    };
}

node_kinds! {
    Module(ModuleNode) => (as_module, as_module_mut),
    Import(ImportNode) => (as_import, as_import_mut),
    Include(IncludeNode) => (as_include, as_include_mut),
    BelongsTo(BelongsToNode) => (as_belongs_to, as_belongs_to_mut),
    Revision(RevisionNode) => (as_revision, as_revision_mut),
    Container(ContainerNode) => (as_container, as_container_mut),
    List(ListNode) => (as_list, as_list_mut),
    Leaf(LeafNode) => (as_leaf, as_leaf_mut),
    LeafList(LeafListNode) => (as_leaf_list, as_leaf_list_mut),
    Choice(ChoiceNode) => (as_choice, as_choice_mut),
    Case(CaseNode) => (as_case, as_case_mut),
    Grouping(GroupingNode) => (as_grouping, as_grouping_mut),
    Uses(UsesNode) => (as_uses, as_uses_mut),
    Refine(RefineNode) => (as_refine, as_refine_mut),
    Augment(AugmentNode) => (as_augment, as_augment_mut),
    Typedef(TypedefNode) => (as_typedef, as_typedef_mut),
    Type(TypeNode) => (as_type, as_type_mut),
    Identity(IdentityNode) => (as_identity, as_identity_mut),
    Extension(ExtensionNode) => (as_extension, as_extension_mut),
    Argument(ArgumentNode) => (as_argument, as_argument_mut),
    Feature(FeatureNode) => (as_feature, as_feature_mut),
    Must(MustNode) => (as_must, as_must_mut),
    When(WhenNode) => (as_when, as_when_mut),
    Enum(EnumNode) => (as_enum, as_enum_mut),
    Bit(BitNode) => (as_bit, as_bit_mut),
    Deviation(DeviationNode) => (as_deviation, as_deviation_mut),
    Deviate(DeviateNode) => (as_deviate, as_deviate_mut),
    Rpc(RpcNode) => (as_rpc, as_rpc_mut),
    Action(ActionNode) => (as_action, as_action_mut),
    Input(InputNode) => (as_input, as_input_mut),
    Output(OutputNode) => (as_output, as_output_mut),
    Notification(NotificationNode) => (as_notification, as_notification_mut),
    AnyXml(AnyXmlNode) => (as_anyxml, as_anyxml_mut),
    AnyData(AnyDataNode) => (as_anydata, as_anydata_mut),
    Value(ValueNode) => (as_value, as_value_mut),
}

impl NodeKind {
    /// Typedef lists for the node kinds that may carry them.
    pub fn typedefs(&self) -> Option<&Vec<NodeId>> {
        match self {
            NodeKind::Module(n) => Some(&n.typedef),
            NodeKind::Container(n) => Some(&n.typedef),
            NodeKind::List(n) => Some(&n.typedef),
            NodeKind::Grouping(n) => Some(&n.typedef),
            NodeKind::Rpc(n) => Some(&n.typedef),
            NodeKind::Action(n) => Some(&n.typedef),
            NodeKind::Input(n) => Some(&n.typedef),
            NodeKind::Output(n) => Some(&n.typedef),
            NodeKind::Notification(n) => Some(&n.typedef),
            _ => None,
        }
    }

    /// Grouping lists for the node kinds that may carry them.
    pub fn groupings(&self) -> Option<&Vec<NodeId>> {
        match self {
            NodeKind::Module(n) => Some(&n.grouping),
            NodeKind::Container(n) => Some(&n.grouping),
            NodeKind::List(n) => Some(&n.grouping),
            NodeKind::Grouping(n) => Some(&n.grouping),
            NodeKind::Rpc(n) => Some(&n.grouping),
            NodeKind::Action(n) => Some(&n.grouping),
            NodeKind::Input(n) => Some(&n.grouping),
            NodeKind::Output(n) => Some(&n.grouping),
            NodeKind::Notification(n) => Some(&n.grouping),
            _ => None,
        }
    }
}
