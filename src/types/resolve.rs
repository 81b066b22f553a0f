//! Type resolution.
//!
//! Resolves every `type` statement to a [`YangType`]: built-in names get
//! their restrictions parsed directly, typedef references are chased
//! through the scoped typedef dictionary (walking outward from the use
//! site, crossing modules via import prefixes) and the unspecified fields
//! are inherited from the typedef chain. Narrowing restrictions must stay
//! inside the parent's; violations are resolution errors.

use super::{EnumType, TypeKind, YangRange, YangType};
use crate::ast::{NodeArena, NodeId, NodeKind};
use crate::diagnostics::Diagnostic;
use crate::semantic::{IdentityDict, TypedefDict, import_by_prefix, local_prefix, resolve_identity_ref};

/// Resolve every `type` node in the arena, populating `yang_type` on the
/// type nodes and the typedefs they chase. Errors accumulate; a type that
/// fails to resolve is left without a `yang_type`.
pub fn resolve_all_types(
    arena: &mut NodeArena,
    typedefs: &TypedefDict,
    identities: &IdentityDict,
    errors: &mut Vec<Diagnostic>,
) {
    let ids: Vec<NodeId> = arena.ids().collect();
    let mut resolver = TypeResolver {
        arena,
        typedefs,
        identities,
        errors,
    };
    for id in ids {
        if matches!(resolver.arena[id].kind, NodeKind::Type(_)) {
            resolver.resolve_type(id, &mut Vec::new());
        }
    }
}

struct TypeResolver<'a> {
    arena: &'a mut NodeArena,
    typedefs: &'a TypedefDict,
    identities: &'a IdentityDict,
    errors: &'a mut Vec<Diagnostic>,
}

impl TypeResolver<'_> {
    fn error(&mut self, id: NodeId, message: impl Into<String>) {
        self.errors
            .push(Diagnostic::resolve(self.arena[id].loc.clone(), message));
    }

    fn value(&self, id: NodeId) -> String {
        self.arena[id].name.to_string()
    }

    /// Resolve one `type` node, memoised on the node.
    fn resolve_type(&mut self, id: NodeId, visiting: &mut Vec<NodeId>) -> Option<YangType> {
        if let Some(yang_type) = &self.arena[id].kind.as_type()?.yang_type {
            return Some((**yang_type).clone());
        }
        if visiting.contains(&id) {
            let name = self.arena[id].name.clone();
            self.error(id, format!("typedef cycle involving \"{name}\""));
            return None;
        }
        visiting.push(id);
        let resolved = self.resolve_uncached(id, visiting);
        visiting.pop();
        if let Some(yang_type) = &resolved {
            self.arena[id].kind.as_type_mut().expect("type node").yang_type =
                Some(Box::new(yang_type.clone()));
        }
        resolved
    }

    fn resolve_uncached(&mut self, id: NodeId, visiting: &mut Vec<NodeId>) -> Option<YangType> {
        let written = self.arena[id].name.clone();
        let (prefix, bare) = match written.split_once(':') {
            Some((p, b)) => (Some(p.to_string()), b.to_string()),
            None => (None, written.to_string()),
        };

        if prefix.is_none()
            && let Some(kind) = TypeKind::from_name(&bare)
        {
            let base = YangType::new(written.clone(), kind);
            return self.apply_restrictions(id, base, true, visiting);
        }

        let Some(typedef) = self.find_typedef(id, prefix.as_deref(), &bare) else {
            self.error(id, format!("unknown type \"{written}\""));
            return None;
        };
        let mut base = self.resolve_typedef(typedef, visiting)?;
        base.name = written;
        self.apply_restrictions(id, base, false, visiting)
    }

    /// Resolve a typedef to its merged type (its `type` child plus the
    /// typedef-level `default`/`units`), memoised on the typedef.
    fn resolve_typedef(&mut self, id: NodeId, visiting: &mut Vec<NodeId>) -> Option<YangType> {
        let typedef = self.arena[id].kind.as_typedef().expect("typedef node");
        if let Some(yang_type) = &typedef.yang_type {
            return Some((**yang_type).clone());
        }
        let type_child = typedef.type_stmt?;
        let default = typedef.default;
        let units = typedef.units;

        let mut yang_type = self.resolve_type(type_child, visiting)?;
        if let Some(default) = default {
            yang_type.default = Some(self.value(default));
        }
        if let Some(units) = units {
            yang_type.units = Some(self.value(units));
        }

        self.arena[id].kind.as_typedef_mut().expect("typedef node").yang_type =
            Some(Box::new(yang_type.clone()));
        Some(yang_type)
    }

    /// Find the typedef a (possibly prefixed) name refers to, walking
    /// scopes outward from the use site or across an import.
    fn find_typedef(&mut self, id: NodeId, prefix: Option<&str>, bare: &str) -> Option<NodeId> {
        let module = self.arena.enclosing_module(id)?;
        let own_prefix = local_prefix(self.arena, module);
        match prefix {
            Some(p) if own_prefix.as_deref() != Some(p) => {
                let Some(target) = import_by_prefix(self.arena, module, p) else {
                    self.error(id, format!("unknown prefix \"{p}\""));
                    return None;
                };
                self.typedefs.lookup(self.arena, target, bare)
            }
            _ => self.typedefs.lookup(self.arena, id, bare),
        }
    }

    /// Merge the restrictions written on `type` node `id` into `base`.
    ///
    /// `initial` marks a direct built-in reference, where defining
    /// statements (fraction-digits, enum, bit, base, path, member types)
    /// are expected rather than restricted.
    fn apply_restrictions(
        &mut self,
        id: NodeId,
        mut base: YangType,
        initial: bool,
        visiting: &mut Vec<NodeId>,
    ) -> Option<YangType> {
        let node = self.arena[id].kind.as_type().expect("type node").clone();
        let kind = base.kind;

        // fraction-digits first: the quantum feeds range parsing
        match (node.fraction_digits, kind, initial) {
            (Some(fd), TypeKind::Decimal64, true) => {
                match self.value(fd).trim().parse::<u8>() {
                    Ok(n @ 1..=18) => base.fraction_digits = n,
                    _ => self.error(fd, "fraction-digits must be between 1 and 18"),
                }
            }
            (Some(fd), _, _) => {
                self.error(fd, "fraction-digits only allowed on a decimal64 definition");
            }
            (None, TypeKind::Decimal64, true) => {
                self.error(id, "decimal64 requires fraction-digits");
                base.fraction_digits = 18;
            }
            _ => {}
        }

        if let Some(range) = node.range {
            if !kind.is_numeric() {
                self.error(range, format!("range not allowed for type {kind}"));
            } else {
                let parent = base
                    .range
                    .clone()
                    .or_else(|| kind.default_range(base.fraction_digits))
                    .expect("numeric kinds have a default range");
                match YangRange::parse(&self.value(range), &parent, base.fraction_digits) {
                    Ok(parsed) if parent.contains_range(&parsed) => base.range = Some(parsed),
                    Ok(parsed) => self.error(
                        range,
                        format!("range \"{parsed}\" is not contained within \"{parent}\""),
                    ),
                    Err(e) => self.error(range, e),
                }
            }
        }

        if let Some(length) = node.length {
            if kind.default_length().is_none() {
                self.error(length, format!("length not allowed for type {kind}"));
            } else {
                let parent = base
                    .length
                    .clone()
                    .or_else(|| kind.default_length())
                    .expect("checked above");
                match YangRange::parse(&self.value(length), &parent, 0) {
                    Ok(parsed) if parsed.low().negative => {
                        self.error(length, "length values must be non-negative")
                    }
                    Ok(parsed) if parent.contains_range(&parsed) => base.length = Some(parsed),
                    Ok(parsed) => self.error(
                        length,
                        format!("length \"{parsed}\" is not contained within \"{parent}\""),
                    ),
                    Err(e) => self.error(length, e),
                }
            }
        }

        for pattern in &node.pattern {
            if kind == TypeKind::String {
                let value = self.value(*pattern);
                base.patterns.push(value);
            } else {
                self.error(*pattern, format!("pattern not allowed for type {kind}"));
            }
        }
        if kind == TypeKind::String {
            for ext in &self.arena[id].exts {
                if ext.keyword.ends_with(":posix-pattern") {
                    base.posix_patterns.push(ext.arg().to_string());
                }
            }
        }

        if !node.enums.is_empty() {
            if kind != TypeKind::Enumeration {
                self.error(id, format!("enum not allowed for type {kind}"));
            } else if initial || base.enums.is_empty() {
                base.enums = self.collect_enums(&node.enums, None);
            } else {
                // a derived enumeration may keep a subset of its base
                let inherited = base.enums.clone();
                base.enums = self.collect_enums(&node.enums, Some(&inherited));
            }
            if base.enums.is_empty() {
                self.error(id, "enumeration requires at least one enum");
            }
        } else if initial && kind == TypeKind::Enumeration {
            self.error(id, "enumeration requires at least one enum");
        }

        if !node.bit.is_empty() {
            if kind != TypeKind::Bits {
                self.error(id, format!("bit not allowed for type {kind}"));
            } else if initial || base.bits.is_empty() {
                base.bits = self.collect_bits(&node.bit, None);
            } else {
                let inherited = base.bits.clone();
                base.bits = self.collect_bits(&node.bit, Some(&inherited));
            }
        } else if initial && kind == TypeKind::Bits {
            self.error(id, "bits requires at least one bit");
        }

        if !node.base.is_empty() {
            if kind != TypeKind::Identityref {
                self.error(id, format!("base not allowed for type {kind}"));
            } else {
                for base_ref in &node.base {
                    let reference = self.value(*base_ref);
                    match resolve_identity_ref(self.arena, self.identities, id, &reference) {
                        Ok(identity) => base.identity_base.push(identity),
                        Err(message) => self.error(*base_ref, message),
                    }
                }
            }
        } else if initial && kind == TypeKind::Identityref {
            self.error(id, "identityref requires a base");
        }

        if let Some(path) = node.path {
            if kind == TypeKind::Leafref {
                base.path = Some(self.value(path));
            } else {
                self.error(path, format!("path not allowed for type {kind}"));
            }
        } else if initial && kind == TypeKind::Leafref {
            self.error(id, "leafref requires a path");
        }

        if !node.union.is_empty() {
            if kind != TypeKind::Union || !initial {
                self.error(id, "member types only allowed on a union definition");
            } else {
                for member in &node.union {
                    if let Some(resolved) = self.resolve_type(*member, visiting) {
                        base.union.push(resolved);
                    }
                }
            }
        } else if initial && kind == TypeKind::Union {
            self.error(id, "union requires at least one member type");
        }

        if let Some(require) = node.require_instance {
            match self.value(require).as_str() {
                "true" => base.require_instance = Some(true),
                "false" => base.require_instance = Some(false),
                other => self.error(require, format!("invalid require-instance {other:?}")),
            }
        }

        Some(base)
    }

    fn collect_enums(&mut self, ids: &[NodeId], inherited: Option<&EnumType>) -> EnumType {
        let mut into = EnumType::for_enums();
        for &enum_id in ids {
            let name = self.arena[enum_id].name.clone();
            let explicit = self.arena[enum_id]
                .kind
                .as_enum()
                .and_then(|e| e.value)
                .map(|v| self.value(v));
            if let Some(inherited) = inherited
                && inherited.value(&name).is_none()
            {
                self.error(enum_id, format!("enum \"{name}\" not found in base type"));
                continue;
            }
            let result = match explicit {
                Some(text) => match text.trim().parse::<i64>() {
                    Ok(value) => into.set(name, value),
                    Err(_) => Err(format!("invalid enum value {text:?}")),
                },
                None => match inherited.and_then(|i| i.value(&name)) {
                    Some(value) => into.set(name, value),
                    None => into.set_next(name),
                },
            };
            if let Err(message) = result {
                self.error(enum_id, message);
            }
        }
        into
    }

    fn collect_bits(&mut self, ids: &[NodeId], inherited: Option<&EnumType>) -> EnumType {
        let mut into = EnumType::for_bits();
        for &bit_id in ids {
            let name = self.arena[bit_id].name.clone();
            let explicit = self.arena[bit_id]
                .kind
                .as_bit()
                .and_then(|b| b.position)
                .map(|v| self.value(v));
            if let Some(inherited) = inherited
                && inherited.value(&name).is_none()
            {
                self.error(bit_id, format!("bit \"{name}\" not found in base type"));
                continue;
            }
            let result = match explicit {
                Some(text) => match text.trim().parse::<i64>() {
                    Ok(position) => into.set(name, position),
                    Err(_) => Err(format!("invalid bit position {text:?}")),
                },
                None => match inherited.and_then(|i| i.value(&name)) {
                    Some(position) => into.set(name, position),
                    None => into.set_next(name),
                },
            };
            if let Err(message) = result {
                self.error(bit_id, message);
            }
        }
        into
    }
}
