use std::fs;

use smicodec::lex::Span;
use smicodec::listener::{AttrEvent, MacroKind, TypeEvent, ValueEvent};
use smicodec::{
    AttrValue, Definition, Error, IntValue, MibListener, MibStore, Result, Symbol, TypeKind, Value,
};

fn load_fixture(store: &mut MibStore, name: &str) {
    let source = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    store.load(&source, name).unwrap();
}

fn full_store() -> MibStore {
    let mut store = MibStore::new();
    for name in [
        "SNMPv2-SMI.mib",
        "SNMPv2-TC.mib",
        "IF-DEMO-MIB.mib",
        "TRAP-DEMO-MIB.mib",
    ] {
        load_fixture(&mut store, name);
    }
    store
}

#[test]
fn numeric_oids_resolve_before_link() {
    let mut store = MibStore::new();
    load_fixture(&mut store, "DEMO-OIDS.mib");

    let foo = Symbol::of("DEMO-OIDS", "foo");
    let bar = Symbol::of("DEMO-OIDS", "bar");
    let baz = Symbol::of("DEMO-OIDS", "baz");
    assert_eq!(store.numeric_oid(&foo).unwrap(), vec![1, 3, 6]);
    assert_eq!(store.numeric_oid(&bar).unwrap(), vec![1, 3, 6, 7]);
    assert_eq!(store.numeric_oid(&baz).unwrap(), vec![1, 3, 6, 1]);
    // lookup is idempotent
    assert_eq!(store.numeric_oid(&bar).unwrap(), vec![1, 3, 6, 7]);
}

#[test]
fn linked_catalogue_answers_queries() {
    let mut store = full_store();
    store.link().unwrap();

    let if_index = Symbol::of("IF-DEMO-MIB", "ifIndex");
    let expected = vec![1, 3, 6, 1, 4, 1, 54321, 1, 1, 1, 1];
    assert_eq!(store.numeric_oid(&if_index).unwrap(), expected);

    // child OID is the parent's plus the trailing arc
    let if_entry = Symbol::of("IF-DEMO-MIB", "ifEntry");
    let mut parent = store.numeric_oid(&if_entry).unwrap();
    parent.push(1);
    assert_eq!(parent, expected);

    // numeric → symbolic translation takes the longest prefix
    let oid = [1u32, 3, 6, 1, 4, 1, 54321, 1, 1, 1, 1, 33];
    let (symbol, rest) = store.symbol_for_oid(&oid).unwrap();
    assert_eq!(*symbol, if_index);
    assert_eq!(rest, &[33]);

    // every registered symbol is claimed by exactly one table
    for module in store.modules() {
        for symbol in module.assignments() {
            assert!(
                store.resolve(symbol).is_some(),
                "{symbol} has no table entry"
            );
        }
    }
}

#[test]
fn textual_convention_attributes_are_kept() {
    let store = full_store();
    let display_string = Symbol::of("SNMPv2-TC", "DisplayString");
    match store.resolve(&display_string) {
        Some(Definition::TextualConvention(attrs)) => {
            assert_eq!(
                attrs.get("DISPLAY-HINT"),
                Some(&AttrValue::Text("255a".into()))
            );
            assert_eq!(attrs.get("STATUS"), Some(&AttrValue::Text("current".into())));
            let syntax = attrs.syntax().unwrap();
            assert_eq!(syntax.kind, TypeKind::OctetString);
            assert!(syntax.constraint.as_ref().unwrap().is_size());
        }
        other => panic!("DisplayString resolved to {other:?}"),
    }
}

#[test]
fn object_type_carries_index_and_enums() {
    let store = full_store();

    let if_entry = Symbol::of("IF-DEMO-MIB", "ifEntry");
    match store.resolve(&if_entry) {
        Some(Definition::ObjectType(object)) => {
            let index = object.attributes.index().unwrap();
            assert_eq!(index, &[Symbol::of("IF-DEMO-MIB", "ifIndex")]);
        }
        other => panic!("ifEntry resolved to {other:?}"),
    }

    let if_kind = Symbol::of("IF-DEMO-MIB", "ifKind");
    match store.resolve(&if_kind) {
        Some(Definition::ObjectType(object)) => {
            let syntax = object.attributes.syntax().unwrap();
            let names = syntax.named_numbers.as_ref().unwrap();
            assert_eq!(names.get(&6).map(String::as_str), Some("ethernet"));
            assert_eq!(names.get(&131).map(String::as_str), Some("tunnel"));
            assert_eq!(
                object.attributes.get("DEFVAL"),
                Some(&AttrValue::Value(Value::Reference(Symbol::of(
                    "IF-DEMO-MIB",
                    "ethernet"
                ))))
            );
        }
        other => panic!("ifKind resolved to {other:?}"),
    }
}

#[test]
fn trap_type_keeps_number_and_enterprise() {
    let store = full_store();
    let link_flap = Symbol::of("TRAP-DEMO-MIB", "linkFlap");
    match store.resolve(&link_flap) {
        Some(Definition::TrapType(trap)) => {
            assert_eq!(trap.value, Value::Integer(IntValue::I8(7)));
            assert_eq!(
                trap.attributes.get("ENTERPRISE"),
                Some(&AttrValue::Symbol(Symbol::of("TRAP-DEMO-MIB", "acme")))
            );
            assert_eq!(
                trap.attributes.get("VARIABLES"),
                Some(&AttrValue::Names(vec!["ifIndex".into()]))
            );
        }
        other => panic!("linkFlap resolved to {other:?}"),
    }
}

#[test]
fn module_compliance_resolves_module_to_itself() {
    let store = full_store();
    let compliance = Symbol::of("IF-DEMO-MIB", "ifDemoCompliance");
    match store.resolve(&compliance) {
        Some(Definition::Macro(value)) => {
            assert_eq!(value.kind, MacroKind::ModuleCompliance);
            assert_eq!(
                value.attributes.get("MODULE"),
                Some(&AttrValue::Symbol(Symbol::of("IF-DEMO-MIB", "IF-DEMO-MIB")))
            );
            assert_eq!(
                value.attributes.get("MANDATORY-GROUPS"),
                Some(&AttrValue::Names(vec!["ifDemoGroup".into()]))
            );
        }
        other => panic!("ifDemoCompliance resolved to {other:?}"),
    }
}

#[test]
fn duplicate_assignment_keeps_the_first() {
    let source = "DUP-MIB DEFINITIONS ::= BEGIN x ::= INTEGER x ::= INTEGER END";
    let mut store = MibStore::new();
    let err = store.load(source, "DUP-MIB").unwrap_err();
    match err {
        Error::DuplicateSymbol { symbol } => assert_eq!(symbol.name(), "x"),
        other => panic!("expected DuplicateSymbol, got {other}"),
    }
    match store.resolve(&Symbol::of("DUP-MIB", "x")) {
        Some(Definition::Type(descriptor)) => assert_eq!(descriptor.kind, TypeKind::Integer),
        other => panic!("first definition lost: {other:?}"),
    }
}

#[test]
fn duplicate_module_is_rejected() {
    let mut store = MibStore::new();
    load_fixture(&mut store, "DEMO-OIDS.mib");
    let source = fs::read_to_string("tests/fixtures/DEMO-OIDS.mib").unwrap();
    assert!(matches!(
        store.load(&source, "again"),
        Err(Error::DuplicateModule { name }) if name == "DEMO-OIDS"
    ));
    // the first copy survives
    assert!(store.module("DEMO-OIDS").is_some());
}

#[test]
fn parse_errors_carry_source_location() {
    let source = "BAD-MIB DEFINITIONS ::= BEGIN\nfoo OBJECT ::= { 1 }\nEND";
    let mut store = MibStore::new();
    let err = store.load(source, "bad.mib").unwrap_err();
    match &err {
        Error::Parse { origin, span, .. } => {
            assert_eq!(origin, "bad.mib");
            assert_eq!(span.line, 2);
        }
        other => panic!("expected Parse, got {other}"),
    }
    assert!(err.to_string().starts_with("bad.mib:2:"));
}

#[test]
fn link_rejects_missing_modules() {
    let mut store = MibStore::new();
    load_fixture(&mut store, "IF-DEMO-MIB.mib");
    assert!(matches!(store.link(), Err(Error::UnresolvedImport { .. })));
}

#[test]
fn link_rejects_reference_cycles() {
    let source = "CYCLE-MIB DEFINITIONS ::= BEGIN A ::= B B ::= A END";
    let mut store = MibStore::new();
    store.load(source, "CYCLE-MIB").unwrap();
    assert!(matches!(store.link(), Err(Error::TypeCycle { .. })));
}

#[test]
fn listener_sees_enter_exit_events() {
    struct LoggingListener(Vec<String>);

    impl MibListener for LoggingListener {
        fn enter_module(&mut self, name: &str, _span: Span) -> Result<()> {
            self.0.push(format!("enter module {name}"));
            Ok(())
        }
        fn exit_module(&mut self) -> Result<()> {
            self.0.push("exit module".into());
            Ok(())
        }
        fn import(&mut self, names: &[&str], from: &str, _span: Span) -> Result<()> {
            self.0.push(format!("import {names:?} from {from}"));
            Ok(())
        }
        fn enter_assignment(&mut self, name: &str, _span: Span) -> Result<()> {
            self.0.push(format!("enter assignment {name}"));
            Ok(())
        }
        fn exit_type_assignment(&mut self, _span: Span) -> Result<()> {
            self.0.push("exit type assignment".into());
            Ok(())
        }
        fn exit_value_assignment(&mut self, _span: Span) -> Result<()> {
            self.0.push("exit value assignment".into());
            Ok(())
        }
        fn exit_macro_definition(&mut self) -> Result<()> {
            self.0.push("exit macro definition".into());
            Ok(())
        }
        fn enter_macro(&mut self, kind: MacroKind) -> Result<()> {
            self.0.push(format!("enter macro {}", kind.name()));
            Ok(())
        }
        fn exit_macro(&mut self, kind: MacroKind, _span: Span) -> Result<()> {
            self.0.push(format!("exit macro {}", kind.name()));
            Ok(())
        }
        fn attribute(&mut self, attr: AttrEvent<'_>, _span: Span) -> Result<()> {
            self.0.push(format!("attribute {attr:?}"));
            Ok(())
        }
        fn enter_type(&mut self, ty: TypeEvent<'_>, _span: Span) -> Result<()> {
            self.0.push(format!("enter type {ty:?}"));
            Ok(())
        }
        fn exit_type(&mut self, _span: Span) -> Result<()> {
            self.0.push("exit type".into());
            Ok(())
        }
        fn named_numbers(&mut self, pairs: &[(&str, i64)], _span: Span) -> Result<()> {
            self.0.push(format!("named numbers {pairs:?}"));
            Ok(())
        }
        fn named_bits(&mut self, pairs: &[(&str, u16)], _span: Span) -> Result<()> {
            self.0.push(format!("named bits {pairs:?}"));
            Ok(())
        }
        fn exit_sequence(&mut self, fields: &[&str], _span: Span) -> Result<()> {
            self.0.push(format!("exit sequence {fields:?}"));
            Ok(())
        }
        fn exit_choice(&mut self, fields: &[&str], _span: Span) -> Result<()> {
            self.0.push(format!("exit choice {fields:?}"));
            Ok(())
        }
        fn exit_sequence_of(&mut self, _span: Span) -> Result<()> {
            self.0.push("exit sequence of".into());
            Ok(())
        }
        fn enter_constraint(&mut self, is_size: bool) -> Result<()> {
            self.0.push(format!("enter constraint size={is_size}"));
            Ok(())
        }
        fn exit_elements(&mut self, is_range: bool, _span: Span) -> Result<()> {
            self.0.push(format!("exit elements range={is_range}"));
            Ok(())
        }
        fn exit_constraint(&mut self) -> Result<()> {
            self.0.push("exit constraint".into());
            Ok(())
        }
        fn value(&mut self, value: ValueEvent<'_>, _span: Span) -> Result<()> {
            self.0.push(format!("value {value:?}"));
            Ok(())
        }
    }

    let source = "M DEFINITIONS ::= BEGIN foo OBJECT IDENTIFIER ::= { 1 3 6 } END";
    let mut listener = LoggingListener(Vec::new());
    smicodec::parse(source, "m.mib", &mut listener).unwrap();
    assert_eq!(
        listener.0,
        vec![
            "enter module M",
            "enter assignment foo",
            "enter type Builtin(ObjectIdentifier)",
            "exit type",
            "value Oid([Number(1), Number(3), Number(6)])",
            "exit value assignment",
            "exit module",
        ]
    );
}
