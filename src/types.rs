use indexmap::IndexMap;
use num_bigint::BigInt;
use std::fmt;

use crate::constraint::Constraint;
use crate::oid::{OidPath, Symbol};

/// Base kind of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Integer,
    OctetString,
    BitString,
    Bits,
    ObjectIdentifier,
    Null,
    Sequence,
    SequenceOf,
    Choice,
    Referenced,
}

impl TypeKind {
    /// Canonical primitive-codec key for a builtin kind, if it has one.
    #[must_use]
    pub fn base_name(self) -> Option<&'static str> {
        match self {
            Self::Integer => Some("INTEGER"),
            Self::OctetString => Some("OctetString"),
            Self::BitString | Self::Bits => Some("BitString"),
            Self::ObjectIdentifier => Some("ObjectIdentifier"),
            Self::Null => Some("Null"),
            Self::Sequence | Self::SequenceOf | Self::Choice | Self::Referenced => None,
        }
    }
}

/// A type as declared in a module: a base kind plus the refinements the
/// declaration carried.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// `INTEGER { name(number) … }` enumeration, declaration order
    pub named_numbers: Option<IndexMap<i64, String>>,
    /// `BITS { name(position) … }`, declaration order
    pub named_bits: Option<IndexMap<String, u16>>,
    pub constraint: Option<Constraint>,
    /// Element type of a `SEQUENCE OF`
    pub element: Option<Box<TypeDescriptor>>,
    /// Field map of a `SEQUENCE` or `CHOICE`, declaration order
    pub fields: Option<IndexMap<String, TypeDescriptor>>,
    /// Referenced type name, present iff `kind` is [`TypeKind::Referenced`]
    pub reference: Option<Symbol>,
}

impl TypeDescriptor {
    /// Skeleton descriptor for a builtin kind; refinements are attached
    /// as the declaration is consumed.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            named_numbers: None,
            named_bits: None,
            constraint: None,
            element: None,
            fields: None,
            reference: None,
        }
    }

    pub fn referenced(symbol: Symbol) -> Self {
        let mut descriptor = Self::new(TypeKind::Referenced);
        descriptor.reference = Some(symbol);
        descriptor
    }
}

/// An integer literal fitted to the narrowest signed width that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Big(BigInt),
}

impl IntValue {
    /// Fit a value into the width progression.
    #[must_use]
    pub fn fit(value: i128) -> Self {
        if let Ok(v) = i8::try_from(value) {
            Self::I8(v)
        } else if let Ok(v) = i16::try_from(value) {
            Self::I16(v)
        } else if let Ok(v) = i32::try_from(value) {
            Self::I32(v)
        } else if let Ok(v) = i64::try_from(value) {
            Self::I64(v)
        } else {
            Self::Big(BigInt::from(value))
        }
    }

    /// Parse a decimal literal, optionally signed.
    #[must_use]
    pub fn from_decimal(text: &str) -> Option<Self> {
        match text.parse::<i128>() {
            Ok(value) => Some(Self::fit(value)),
            Err(_) => BigInt::parse_bytes(text.as_bytes(), 10).map(Self::Big),
        }
    }

    /// Parse the digit payload of a hex or binary literal. The payload is
    /// unsigned; an empty payload denotes zero.
    #[must_use]
    pub fn from_radix(payload: &str, radix: u32) -> Option<Self> {
        if payload.is_empty() {
            return Some(Self::I8(0));
        }
        match i128::from_str_radix(payload, radix) {
            Ok(value) => Some(Self::fit(value)),
            Err(_) => BigInt::parse_bytes(payload.as_bytes(), radix).map(Self::Big),
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::Big(_) => None,
        }
    }

    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Big(v) => i128::try_from(v).ok(),
            _ => self.as_i64().map(i128::from),
        }
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => v.fmt(f),
            Self::I16(v) => v.fmt(f),
            Self::I32(v) => v.fmt(f),
            Self::I64(v) => v.fmt(f),
            Self::Big(v) => v.fmt(f),
        }
    }
}

/// A value appearing on the right-hand side of an assignment or inside a
/// macro attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(IntValue),
    String(String),
    Boolean(bool),
    Oid(OidPath),
    Reference(Symbol),
}

/// Payload of one macro attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// SYNTAX, WRITE-SYNTAX
    Type(TypeDescriptor),
    /// DEFVAL, CREATION-REQUIRES
    Value(Value),
    /// OBJECTS
    Values(Vec<Value>),
    /// GROUP, OBJECT, SUPPORTS, VARIATION, ENTERPRISE, MODULE
    Symbol(Symbol),
    /// INDEX
    Symbols(Vec<Symbol>),
    /// INCLUDES, MANDATORY-GROUPS, VARIABLES, NOTIFICATIONS, AUGMENTS
    Names(Vec<String>),
    /// DESCRIPTION, STATUS, ACCESS and the other string/identifier attributes
    Text(String),
}

/// Macro attribute bag. Keys are the literal attribute keywords; a
/// repeated attribute overwrites the previous value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attrs {
    entries: IndexMap<String, AttrValue>,
}

impl Attrs {
    pub fn insert(&mut self, name: &str, value: AttrValue) {
        self.entries.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The SYNTAX attribute, when present and type-valued.
    #[must_use]
    pub fn syntax(&self) -> Option<&TypeDescriptor> {
        match self.get("SYNTAX") {
            Some(AttrValue::Type(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    /// The INDEX attribute, when present.
    #[must_use]
    pub fn index(&self) -> Option<&[Symbol]> {
        match self.get("INDEX") {
            Some(AttrValue::Symbols(symbols)) => Some(symbols),
            _ => None,
        }
    }

    /// The AUGMENTS attribute, when present.
    #[must_use]
    pub fn augments(&self) -> Option<&str> {
        match self.get("AUGMENTS") {
            Some(AttrValue::Names(names)) => names.first().map(String::as_str),
            _ => None,
        }
    }
}

#[test]
fn integer_fitting_progression() {
    assert_eq!(IntValue::fit(5), IntValue::I8(5));
    assert_eq!(IntValue::fit(-128), IntValue::I8(-128));
    assert_eq!(IntValue::fit(200), IntValue::I16(200));
    assert_eq!(IntValue::fit(70_000), IntValue::I32(70_000));
    assert_eq!(IntValue::fit(5_000_000_000), IntValue::I64(5_000_000_000));
    assert!(matches!(
        IntValue::fit(i128::from(i64::MAX) + 1),
        IntValue::Big(_)
    ));
}

#[test]
fn radix_literals_are_unsigned() {
    assert_eq!(IntValue::from_radix("", 16), Some(IntValue::I8(0)));
    assert_eq!(IntValue::from_radix("FF", 16), Some(IntValue::I16(255)));
    assert_eq!(IntValue::from_radix("101", 2), Some(IntValue::I8(5)));
    assert!(matches!(
        IntValue::from_radix("FFFFFFFFFFFFFFFF", 16),
        Some(IntValue::Big(_))
    ));
}

#[test]
fn repeated_attribute_wins_last() {
    let mut attrs = Attrs::default();
    attrs.insert("STATUS", AttrValue::Text("current".into()));
    attrs.insert("STATUS", AttrValue::Text("obsolete".into()));
    assert_eq!(
        attrs.get("STATUS"),
        Some(&AttrValue::Text("obsolete".into()))
    );
    assert_eq!(attrs.iter().count(), 1);
}
