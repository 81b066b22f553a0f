//! The YANG type system.
//!
//! Built-in type kinds, the resolved [`YangType`] attached to every
//! `type` statement after resolution, and the range/length machinery.
//! Resolution itself (typedef chasing, restriction inheritance) lives in
//! [`resolve`].

mod number;
mod range;
mod resolve;

pub use number::Number;
pub use range::{RangeInterval, YangRange};
pub use resolve::resolve_all_types;

use crate::ast::NodeId;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// The YANG built-in types (RFC 7950 §4.2.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    String,
    Boolean,
    Enumeration,
    Bits,
    Binary,
    Leafref,
    Identityref,
    InstanceIdentifier,
    Empty,
    Union,
    Decimal64,
}

impl TypeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "enumeration" => Self::Enumeration,
            "bits" => Self::Bits,
            "binary" => Self::Binary,
            "leafref" => Self::Leafref,
            "identityref" => Self::Identityref,
            "instance-identifier" => Self::InstanceIdentifier,
            "empty" => Self::Empty,
            "union" => Self::Union,
            "decimal64" => Self::Decimal64,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Enumeration => "enumeration",
            Self::Bits => "bits",
            Self::Binary => "binary",
            Self::Leafref => "leafref",
            Self::Identityref => "identityref",
            Self::InstanceIdentifier => "instance-identifier",
            Self::Empty => "empty",
            Self::Union => "union",
            Self::Decimal64 => "decimal64",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self == Self::Decimal64
    }

    /// The full value range of a numeric kind; the `min`/`max` sentinels
    /// of a child range resolve against this when no narrower parent
    /// range exists. `fraction_digits` only matters for decimal64.
    pub fn default_range(self, fraction_digits: u8) -> Option<YangRange> {
        let (lo, hi) = match self {
            Self::Int8 => (Number::from_i64(-128), Number::from_i64(127)),
            Self::Int16 => (Number::from_i64(-32768), Number::from_i64(32767)),
            Self::Int32 => (Number::from_i64(-2147483648), Number::from_i64(2147483647)),
            Self::Int64 => (Number::from_i64(i64::MIN), Number::from_i64(i64::MAX)),
            Self::Uint8 => (Number::zero(), Number::from_u64(255)),
            Self::Uint16 => (Number::zero(), Number::from_u64(65535)),
            Self::Uint32 => (Number::zero(), Number::from_u64(4294967295)),
            Self::Uint64 => (Number::zero(), Number::from_u64(u64::MAX)),
            Self::Decimal64 => (
                Number::new(true, 9223372036854775808, fraction_digits),
                Number::new(false, 9223372036854775807, fraction_digits),
            ),
            _ => return None,
        };
        Some(YangRange::span(lo, hi))
    }

    /// The default length bound for string and binary.
    pub fn default_length(self) -> Option<YangRange> {
        match self {
            Self::String | Self::Binary => Some(YangRange::span(
                Number::zero(),
                Number::from_u64(u64::MAX),
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name/value maps for `enumeration` and `bits`.
///
/// Keeps both directions and tracks the highest assigned value so that
/// unnumbered entries get "previous value plus one" (starting at zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    by_name: IndexMap<SmolStr, i64>,
    min: i64,
    max: i64,
    last: Option<i64>,
}

impl EnumType {
    /// Value bounds of `enum` statements (a signed 32-bit value).
    pub fn for_enums() -> Self {
        Self::with_bounds(i32::MIN as i64, i32::MAX as i64)
    }

    /// Position bounds of `bit` statements (an unsigned 32-bit position).
    pub fn for_bits() -> Self {
        Self::with_bounds(0, u32::MAX as i64)
    }

    fn with_bounds(min: i64, max: i64) -> Self {
        Self {
            by_name: IndexMap::new(),
            min,
            max,
            last: None,
        }
    }

    /// Insert a name with an explicit value.
    pub fn set(&mut self, name: impl Into<SmolStr>, value: i64) -> Result<(), String> {
        let name = name.into();
        if value < self.min || value > self.max {
            return Err(format!("value {value} for {name:?} is out of range"));
        }
        if self.by_name.contains_key(&name) {
            return Err(format!("duplicate name {name:?}"));
        }
        if self.by_name.values().any(|&v| v == value) {
            return Err(format!("duplicate value {value} for {name:?}"));
        }
        self.by_name.insert(name, value);
        self.last = Some(self.last.map_or(value, |l| l.max(value)));
        Ok(())
    }

    /// Insert a name with the next auto-assigned value.
    pub fn set_next(&mut self, name: impl Into<SmolStr>) -> Result<(), String> {
        let next = match self.last {
            None => 0,
            Some(last) if last < self.max => last + 1,
            Some(_) => return Err("no value available for auto-assignment".to_string()),
        };
        self.set(name, next)
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, value: i64) -> Option<&str> {
        self.by_name
            .iter()
            .find(|&(_, &v)| v == value)
            .map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.by_name.iter().map(|(n, &v)| (n.as_str(), v))
    }
}

/// A fully resolved type.
///
/// Attached to `type` statements (and the typedefs they chase) after
/// resolution; every restriction has been checked against and merged with
/// its base type.
#[derive(Debug, Clone)]
pub struct YangType {
    /// The type name as written at the use site (a built-in name or a
    /// typedef reference, possibly prefixed).
    pub name: SmolStr,
    pub kind: TypeKind,
    pub range: Option<YangRange>,
    pub length: Option<YangRange>,
    /// XSD regular expressions, all of which must match.
    pub patterns: Vec<String>,
    /// POSIX regular expressions supplied through extension statements.
    pub posix_patterns: Vec<String>,
    /// 1-18 for decimal64, 0 elsewhere.
    pub fraction_digits: u8,
    /// The `path` of a leafref, kept opaque.
    pub path: Option<String>,
    /// Resolved `base` identities of an identityref.
    pub identity_base: Vec<NodeId>,
    pub enums: EnumType,
    pub bits: EnumType,
    pub default: Option<String>,
    pub units: Option<String>,
    /// Member types of a union, in declaration order.
    pub union: Vec<YangType>,
    pub require_instance: Option<bool>,
}

impl YangType {
    pub fn new(name: impl Into<SmolStr>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            range: None,
            length: None,
            patterns: Vec::new(),
            posix_patterns: Vec::new(),
            fraction_digits: 0,
            path: None,
            identity_base: Vec::new(),
            enums: EnumType::for_enums(),
            bits: EnumType::for_bits(),
            default: None,
            units: None,
            union: Vec::new(),
            require_instance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_auto_assignment() {
        let mut e = EnumType::for_enums();
        e.set_next("a").unwrap();
        e.set("b", 10).unwrap();
        e.set_next("c").unwrap();
        assert_eq!(e.value("a"), Some(0));
        assert_eq!(e.value("b"), Some(10));
        assert_eq!(e.value("c"), Some(11));
        assert_eq!(e.name(10), Some("b"));
    }

    #[test]
    fn enum_duplicates_rejected() {
        let mut e = EnumType::for_enums();
        e.set("a", 1).unwrap();
        assert!(e.set("a", 2).is_err());
        assert!(e.set("b", 1).is_err());
    }

    #[test]
    fn bit_positions_unsigned() {
        let mut b = EnumType::for_bits();
        assert!(b.set("x", -1).is_err());
        b.set("x", 0).unwrap();
    }
}
