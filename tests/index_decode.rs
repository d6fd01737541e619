use smicodec::{
    CodecRegistry, Constraint, Element, Error, MibStore, Result, SmiCodec, SmiValue, Symbol,
};

const INDEX_DEMO: &str = r#"
INDEX-DEMO-MIB DEFINITIONS ::= BEGIN

demoRoot OBJECT IDENTIFIER ::= { 1 3 6 1 4 1 77 }

demoTable OBJECT-TYPE
    SYNTAX      SEQUENCE OF DemoEntry
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "Demo rows."
    ::= { demoRoot 1 }

demoEntry OBJECT-TYPE
    SYNTAX      DemoEntry
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "One demo row."
    INDEX       { demoInt, demoStr }
    ::= { demoTable 1 }

DemoEntry ::= SEQUENCE {
    demoInt     INTEGER,
    demoStr     OCTET STRING,
    demoColor   INTEGER
}

demoInt OBJECT-TYPE
    SYNTAX      INTEGER
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Unconstrained integer key."
    ::= { demoEntry 1 }

demoStr OBJECT-TYPE
    SYNTAX      OCTET STRING (SIZE (0..8))
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Variable-length string key."
    ::= { demoEntry 2 }

demoColor OBJECT-TYPE
    SYNTAX      INTEGER { red(1), blue(2) }
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Enumerated key."
    ::= { demoEntry 3 }

Octet255 ::= INTEGER (0..255)

demoRangeEntry OBJECT-TYPE
    SYNTAX      INTEGER
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "Row keyed by a range-refined integer."
    INDEX       { demoRange }
    ::= { demoRoot 3 }

demoRange OBJECT-TYPE
    SYNTAX      Octet255
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Range-refined key."
    ::= { demoRangeEntry 1 }

demoExtEntry OBJECT-TYPE
    SYNTAX      INTEGER
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "Row sharing the demoEntry index."
    AUGMENTS    { demoEntry }
    ::= { demoRoot 4 }

demoColorEntry OBJECT-TYPE
    SYNTAX      INTEGER
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "Row keyed by the enumerated color."
    INDEX       { demoColor }
    ::= { demoRoot 5 }

demoAddrEntry OBJECT-TYPE
    SYNTAX      INTEGER
    MAX-ACCESS  not-accessible
    STATUS      current
    DESCRIPTION "Row keyed by an address."
    INDEX       { demoAddr }
    ::= { demoRoot 6 }

demoAddr OBJECT-TYPE
    SYNTAX      IpAddress
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Address key; IpAddress is supplied by the host."
    ::= { demoAddrEntry 1 }

END
"#;

struct IntegerCodec;

impl SmiCodec for IntegerCodec {
    fn decode(&self, sub_index: &[u32]) -> Result<SmiValue> {
        Ok(SmiValue::Integer(
            sub_index.first().copied().map(i64::from).unwrap_or(0),
        ))
    }
}

struct OctetStringCodec;

impl SmiCodec for OctetStringCodec {
    fn decode(&self, sub_index: &[u32]) -> Result<SmiValue> {
        Ok(SmiValue::Bytes(
            sub_index.iter().map(|v| *v as u8).collect(),
        ))
    }
}

struct IpAddressCodec;

impl SmiCodec for IpAddressCodec {
    fn decode(&self, sub_index: &[u32]) -> Result<SmiValue> {
        match sub_index {
            [a, b, c, d] => Ok(SmiValue::IpAddress([*a as u8, *b as u8, *c as u8, *d as u8])),
            _ => Err(Error::UnknownSmiType {
                name: "IpAddress".into(),
            }),
        }
    }

    fn constraint(&self) -> Option<Constraint> {
        Some(Constraint::with_elements(true, vec![Element::Single(4)]))
    }
}

fn registry() -> CodecRegistry {
    let mut codecs = CodecRegistry::new();
    codecs.register("INTEGER", IntegerCodec);
    codecs.register("OctetString", OctetStringCodec);
    codecs.register("IpAddress", IpAddressCodec);
    codecs
}

fn demo_store() -> MibStore {
    let mut store = MibStore::new();
    store.load(INDEX_DEMO, "INDEX-DEMO-MIB").unwrap();
    store
}

fn sym(name: &str) -> Symbol {
    Symbol::of("INDEX-DEMO-MIB", name)
}

#[test]
fn decodes_integer_and_sized_string() {
    let store = demo_store();
    let values = store
        .decode_index(&sym("demoEntry"), &[10, 2, 5, 6], &registry())
        .unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].symbol, sym("demoInt"));
    assert_eq!(values[0].value, SmiValue::Integer(10));
    assert_eq!(values[1].symbol, sym("demoStr"));
    assert_eq!(values[1].value, SmiValue::Bytes(vec![5, 6]));
}

#[test]
fn range_refined_syntax_consumes_one_element() {
    let store = demo_store();
    let values = store
        .decode_index(&sym("demoRangeEntry"), &[42], &registry())
        .unwrap();
    assert_eq!(values[0].value, SmiValue::Integer(42));

    // out-of-range key is rejected by the declared range
    assert!(matches!(
        store.decode_index(&sym("demoRangeEntry"), &[300], &registry()),
        Err(Error::ConstraintViolation { symbol }) if symbol == sym("demoRange")
    ));
}

#[test]
fn residual_elements_are_trailing_index() {
    let store = demo_store();
    assert!(matches!(
        store.decode_index(&sym("demoRangeEntry"), &[42, 9], &registry()),
        Err(Error::TrailingIndex { residue: 1 })
    ));
}

#[test]
fn string_longer_than_size_is_rejected() {
    let store = demo_store();
    // length prefix 9 exceeds SIZE (0..8)
    assert!(matches!(
        store.decode_index(&sym("demoEntry"), &[10, 9, 1], &registry()),
        Err(Error::ConstraintViolation { symbol }) if symbol == sym("demoStr")
    ));
    // length prefix larger than what is left
    assert!(matches!(
        store.decode_index(&sym("demoEntry"), &[10, 5, 1, 2], &registry()),
        Err(Error::ConstraintViolation { .. })
    ));
}

#[test]
fn enumerated_values_are_labelled() {
    let store = demo_store();
    let values = store
        .decode_index(&sym("demoColorEntry"), &[2], &registry())
        .unwrap();
    assert_eq!(values[0].value, SmiValue::Integer(2));
    assert_eq!(values[0].label.as_deref(), Some("blue"));
}

#[test]
fn augmenting_row_shares_the_base_index() {
    let store = demo_store();
    let values = store
        .decode_index(&sym("demoExtEntry"), &[10, 2, 5, 6], &registry())
        .unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].symbol, sym("demoInt"));
    assert_eq!(values[1].symbol, sym("demoStr"));
}

#[test]
fn codec_supplied_constraint_governs_extraction() {
    let store = demo_store();
    let values = store
        .decode_index(&sym("demoAddrEntry"), &[192, 0, 2, 1], &registry())
        .unwrap();
    assert_eq!(values[0].value, SmiValue::IpAddress([192, 0, 2, 1]));

    assert!(matches!(
        store.decode_index(&sym("demoAddrEntry"), &[192, 0], &registry()),
        Err(Error::ConstraintViolation { .. })
    ));
}

#[test]
fn missing_codec_is_reported_by_name() {
    let store = demo_store();
    let mut codecs = CodecRegistry::new();
    codecs.register("INTEGER", IntegerCodec);
    assert!(matches!(
        store.decode_index(&sym("demoEntry"), &[10, 2, 5, 6], &codecs),
        Err(Error::UnknownSmiType { name }) if name == "OctetString"
    ));
}
