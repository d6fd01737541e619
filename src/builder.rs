use indexmap::IndexMap;

use crate::constraint::{Constraint, Element};
use crate::error::{Error, Result};
use crate::lex::Span;
use crate::listener::{AttrEvent, MacroKind, MibListener, OidArc, TypeEvent, ValueEvent};
use crate::oid::{OidComponent, OidPath, Symbol};
use crate::store::MibStore;
use crate::types::{AttrValue, Attrs, IntValue, TypeDescriptor, TypeKind, Value};

/// One entry of the builder's value stack.
#[derive(Debug)]
enum Frame {
    Symbol(Symbol),
    Type(TypeDescriptor),
    Value(Value),
    Constraint(Constraint),
    Attrs(Attrs),
    /// Bounds the alternative run of a CHOICE
    ChoiceMark,
}

/// Semantic listener: folds parse events into the store through an
/// explicit stack of partially assembled results.
///
/// Assignments register as soon as they complete, so a failing module
/// keeps everything defined before the failure.
pub struct Builder<'s> {
    store: &'s mut MibStore,
    origin: String,
    module: Option<String>,
    imports: IndexMap<String, String>,
    stack: Vec<Frame>,
    loaded: Vec<String>,
}

impl<'s> Builder<'s> {
    pub fn new(store: &'s mut MibStore, origin: &str) -> Self {
        Self {
            store,
            origin: origin.to_owned(),
            module: None,
            imports: IndexMap::new(),
            stack: Vec::new(),
            loaded: Vec::new(),
        }
    }

    /// Names of the modules registered so far, in load order.
    #[must_use]
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    fn invalid(&self, span: Span, message: impl Into<String>) -> Error {
        Error::InvalidAssignment {
            origin: self.origin.clone(),
            span,
            message: message.into(),
        }
    }

    fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or_default()
    }

    /// Resolve a local name: imported names keep their source module,
    /// everything else belongs to the module being compiled.
    fn resolve_symbol(&mut self, name: &str) -> Symbol {
        let module = self
            .imports
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.module_name().to_owned());
        self.store.symbol(&module, name)
    }

    fn pop_symbol(&mut self, span: Span) -> Result<Symbol> {
        match self.stack.pop() {
            Some(Frame::Symbol(symbol)) => Ok(symbol),
            _ => Err(self.invalid(span, "assignment name missing")),
        }
    }

    fn pop_type(&mut self, span: Span) -> Result<TypeDescriptor> {
        match self.stack.pop() {
            Some(Frame::Type(descriptor)) => Ok(descriptor),
            _ => Err(self.invalid(span, "type missing")),
        }
    }

    fn pop_value(&mut self, span: Span) -> Result<Value> {
        match self.stack.pop() {
            Some(Frame::Value(value)) => Ok(value),
            _ => Err(self.invalid(span, "value missing")),
        }
    }

    fn pop_attrs(&mut self, span: Span) -> Result<Attrs> {
        match self.stack.pop() {
            Some(Frame::Attrs(attrs)) => Ok(attrs),
            _ => Err(self.invalid(span, "macro attributes missing")),
        }
    }

    fn pop_int(&mut self, span: Span) -> Result<i128> {
        match self.pop_value(span)? {
            Value::Integer(value) => value
                .as_i128()
                .ok_or_else(|| self.invalid(span, "constraint bound too large")),
            _ => Err(self.invalid(span, "constraint bound is not a number")),
        }
    }

    fn top_type(&mut self, span: Span) -> Result<&mut TypeDescriptor> {
        match self.stack.last_mut() {
            Some(Frame::Type(descriptor)) => Ok(descriptor),
            _ => Err(Error::InvalidAssignment {
                origin: self.origin.clone(),
                span,
                message: "type missing".into(),
            }),
        }
    }

    fn attrs_mut(&mut self, span: Span) -> Result<&mut Attrs> {
        match self.stack.last_mut() {
            Some(Frame::Attrs(attrs)) => Ok(attrs),
            _ => Err(Error::InvalidAssignment {
                origin: self.origin.clone(),
                span,
                message: "attribute outside of a macro".into(),
            }),
        }
    }

    /// Pop the trailing run of values, restoring declaration order.
    fn pop_value_run(&mut self) -> Vec<Value> {
        let mut values = Vec::new();
        while let Some(Frame::Value(_)) = self.stack.last() {
            match self.stack.pop() {
                Some(Frame::Value(value)) => values.push(value),
                _ => unreachable!(),
            }
        }
        values.reverse();
        values
    }

    /// Pop the trailing run of types, keeping the referenced ones.
    fn pop_reference_run(&mut self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        while let Some(Frame::Type(_)) = self.stack.last() {
            match self.stack.pop() {
                Some(Frame::Type(descriptor)) => {
                    if let Some(symbol) = descriptor.reference {
                        symbols.push(symbol);
                    }
                }
                _ => unreachable!(),
            }
        }
        symbols.reverse();
        symbols
    }
}

impl MibListener for Builder<'_> {
    fn enter_module(&mut self, name: &str, _span: Span) -> Result<()> {
        self.store.new_module(name)?;
        self.module = Some(name.to_owned());
        self.imports.clear();
        self.loaded.push(name.to_owned());
        Ok(())
    }

    fn exit_module(&mut self) -> Result<()> {
        self.module = None;
        self.imports.clear();
        self.stack.clear();
        Ok(())
    }

    fn import(&mut self, names: &[&str], from: &str, _span: Span) -> Result<()> {
        for name in names {
            self.imports.insert((*name).to_owned(), from.to_owned());
            let module = self.module_name().to_owned();
            self.store.add_import(&module, name, from);
        }
        Ok(())
    }

    fn enter_assignment(&mut self, name: &str, _span: Span) -> Result<()> {
        let symbol = self.resolve_symbol(name);
        self.stack.push(Frame::Symbol(symbol));
        Ok(())
    }

    fn exit_type_assignment(&mut self, span: Span) -> Result<()> {
        let descriptor = self.pop_type(span)?;
        let symbol = self.pop_symbol(span)?;
        self.store.add_type(symbol, descriptor)
    }

    fn exit_value_assignment(&mut self, span: Span) -> Result<()> {
        let value = self.pop_value(span)?;
        let descriptor = self.pop_type(span)?;
        let symbol = self.pop_symbol(span)?;
        self.store.add_value(symbol, descriptor, value)
    }

    fn exit_macro_definition(&mut self) -> Result<()> {
        self.stack.pop();
        Ok(())
    }

    fn enter_macro(&mut self, _kind: MacroKind) -> Result<()> {
        self.stack.push(Frame::Attrs(Attrs::default()));
        Ok(())
    }

    fn exit_macro(&mut self, kind: MacroKind, span: Span) -> Result<()> {
        match kind {
            MacroKind::TextualConvention => {
                let attrs = self.pop_attrs(span)?;
                let symbol = self.pop_symbol(span)?;
                self.store.add_textual_convention(symbol, attrs)
            }
            MacroKind::TrapType => {
                let value = self.pop_value(span)?;
                if !matches!(value, Value::Integer(_)) {
                    return Err(self.invalid(span, "trap value is not a number"));
                }
                let attrs = self.pop_attrs(span)?;
                let symbol = self.pop_symbol(span)?;
                self.store.add_trap_type(symbol, attrs, value)
            }
            MacroKind::ObjectType => {
                let oid = match self.pop_value(span)? {
                    Value::Oid(path) => path,
                    _ => return Err(self.invalid(span, "object type needs an object identifier")),
                };
                let attrs = self.pop_attrs(span)?;
                let symbol = self.pop_symbol(span)?;
                self.store.add_object_type(symbol, attrs, oid)
            }
            _ => {
                let oid = match self.pop_value(span)? {
                    Value::Oid(path) => path,
                    _ => return Err(self.invalid(span, "macro needs an object identifier")),
                };
                let attrs = self.pop_attrs(span)?;
                let symbol = self.pop_symbol(span)?;
                self.store.add_macro_value(symbol, kind, attrs, oid)
            }
        }
    }

    fn attribute(&mut self, attr: AttrEvent<'_>, span: Span) -> Result<()> {
        match attr {
            AttrEvent::Syntax => {
                let descriptor = self.pop_type(span)?;
                self.attrs_mut(span)?
                    .insert("SYNTAX", AttrValue::Type(descriptor));
            }
            AttrEvent::WriteSyntax => {
                let descriptor = self.pop_type(span)?;
                self.attrs_mut(span)?
                    .insert("WRITE-SYNTAX", AttrValue::Type(descriptor));
            }
            AttrEvent::Defval => {
                let value = self.pop_value(span)?;
                self.attrs_mut(span)?
                    .insert("DEFVAL", AttrValue::Value(value));
            }
            AttrEvent::CreationRequires => {
                let mut values = self.pop_value_run();
                let value = if values.len() == 1 {
                    AttrValue::Value(values.remove(0))
                } else {
                    AttrValue::Values(values)
                };
                self.attrs_mut(span)?.insert("CREATION-REQUIRES", value);
            }
            AttrEvent::Objects => {
                let values = self.pop_value_run();
                self.attrs_mut(span)?
                    .insert("OBJECTS", AttrValue::Values(values));
            }
            AttrEvent::Index => {
                let symbols = self.pop_reference_run();
                self.attrs_mut(span)?
                    .insert("INDEX", AttrValue::Symbols(symbols));
            }
            AttrEvent::Ident { name, value } => {
                // a MODULE clause without a name designates the module
                // being compiled
                let value = if value.is_empty() {
                    self.module_name().to_owned()
                } else {
                    value.to_owned()
                };
                let symbol = self.resolve_symbol(&value);
                self.attrs_mut(span)?.insert(name, AttrValue::Symbol(symbol));
            }
            AttrEvent::IdentList { name, values } => {
                let names = values.iter().map(|v| (*v).to_owned()).collect();
                self.attrs_mut(span)?.insert(name, AttrValue::Names(names));
            }
            AttrEvent::Text { name, value } => {
                self.attrs_mut(span)?.insert(name, AttrValue::Text(value));
            }
        }
        Ok(())
    }

    fn enter_type(&mut self, ty: TypeEvent<'_>, _span: Span) -> Result<()> {
        match ty {
            TypeEvent::Builtin(kind) => {
                self.stack.push(Frame::Type(TypeDescriptor::new(kind)));
                if kind == TypeKind::Choice {
                    self.stack.push(Frame::ChoiceMark);
                }
            }
            TypeEvent::Referenced(name) => {
                let symbol = self.resolve_symbol(name);
                self.stack.push(Frame::Type(TypeDescriptor::referenced(symbol)));
            }
        }
        Ok(())
    }

    fn exit_type(&mut self, span: Span) -> Result<()> {
        if let Some(Frame::Constraint(_)) = self.stack.last() {
            let constraint = match self.stack.pop() {
                Some(Frame::Constraint(constraint)) => constraint,
                _ => unreachable!(),
            };
            self.top_type(span)?.constraint = Some(constraint);
        }
        Ok(())
    }

    fn named_numbers(&mut self, pairs: &[(&str, i64)], span: Span) -> Result<()> {
        let mut names = IndexMap::with_capacity(pairs.len());
        for (name, number) in pairs {
            names.insert(*number, (*name).to_owned());
        }
        self.top_type(span)?.named_numbers = Some(names);
        Ok(())
    }

    fn named_bits(&mut self, pairs: &[(&str, u16)], span: Span) -> Result<()> {
        let mut bits = IndexMap::with_capacity(pairs.len());
        for (name, position) in pairs {
            bits.insert((*name).to_owned(), *position);
        }
        self.top_type(span)?.named_bits = Some(bits);
        Ok(())
    }

    fn exit_sequence(&mut self, fields: &[&str], span: Span) -> Result<()> {
        let mut types = Vec::with_capacity(fields.len());
        for _ in fields {
            types.push(self.pop_type(span)?);
        }
        types.reverse();
        let mut map = IndexMap::with_capacity(fields.len());
        for (name, descriptor) in fields.iter().zip(types) {
            map.insert((*name).to_owned(), descriptor);
        }
        self.top_type(span)?.fields = Some(map);
        Ok(())
    }

    fn exit_choice(&mut self, fields: &[&str], span: Span) -> Result<()> {
        let mut types = Vec::new();
        loop {
            match self.stack.pop() {
                Some(Frame::Type(descriptor)) => types.push(descriptor),
                Some(Frame::ChoiceMark) => break,
                _ => return Err(self.invalid(span, "malformed CHOICE")),
            }
        }
        if types.len() != fields.len() {
            return Err(self.invalid(span, "malformed CHOICE"));
        }
        types.reverse();
        let mut map = IndexMap::with_capacity(fields.len());
        for (name, descriptor) in fields.iter().zip(types) {
            map.insert((*name).to_owned(), descriptor);
        }
        self.top_type(span)?.fields = Some(map);
        Ok(())
    }

    fn exit_sequence_of(&mut self, span: Span) -> Result<()> {
        let element = self.pop_type(span)?;
        // a size constraint parsed before OF still sits above the
        // SEQUENCE OF skeleton; keep it there for exit_type to attach
        let constraint = match self.stack.last() {
            Some(Frame::Constraint(_)) => match self.stack.pop() {
                Some(Frame::Constraint(constraint)) => Some(constraint),
                _ => unreachable!(),
            },
            _ => None,
        };
        self.top_type(span)?.element = Some(Box::new(element));
        if let Some(constraint) = constraint {
            self.stack.push(Frame::Constraint(constraint));
        }
        Ok(())
    }

    fn enter_constraint(&mut self, is_size: bool) -> Result<()> {
        self.stack.push(Frame::Constraint(Constraint::new(is_size)));
        Ok(())
    }

    fn exit_elements(&mut self, is_range: bool, span: Span) -> Result<()> {
        let element = if is_range {
            let hi = self.pop_int(span)?;
            let lo = self.pop_int(span)?;
            Element::range(lo, hi)
        } else {
            Element::Single(self.pop_int(span)?)
        };
        let lo = match element {
            Element::Single(v) => v,
            Element::Range(lo, _) => lo,
        };
        match self.stack.last_mut() {
            Some(Frame::Constraint(constraint)) => {
                if constraint.is_size() && lo < 0 {
                    return Err(Error::InvalidAssignment {
                        origin: self.origin.clone(),
                        span,
                        message: "negative size constraint".into(),
                    });
                }
                constraint.push(element);
                Ok(())
            }
            _ => Err(Error::InvalidAssignment {
                origin: self.origin.clone(),
                span,
                message: "constraint element outside of a constraint".into(),
            }),
        }
    }

    fn exit_constraint(&mut self) -> Result<()> {
        if let Some(Frame::Constraint(constraint)) = self.stack.last_mut() {
            constraint.normalize();
        }
        Ok(())
    }

    fn value(&mut self, value: ValueEvent<'_>, span: Span) -> Result<()> {
        let value = match value {
            ValueEvent::Number { text, radix } => {
                let parsed = if radix == 10 {
                    IntValue::from_decimal(text)
                } else {
                    IntValue::from_radix(text, radix)
                };
                match parsed {
                    Some(v) => Value::Integer(v),
                    None => return Err(self.invalid(span, "bad integer literal")),
                }
            }
            ValueEvent::Text(text) => Value::String(text),
            ValueEvent::Bool(flag) => Value::Boolean(flag),
            ValueEvent::Reference(name) => Value::Reference(self.resolve_symbol(name)),
            ValueEvent::Oid(arcs) => {
                let mut components = Vec::with_capacity(arcs.len());
                for arc in arcs {
                    components.push(match arc {
                        OidArc::Number(n) => OidComponent::Number(n),
                        OidArc::Name(name) => OidComponent::Name(self.resolve_symbol(name)),
                        OidArc::NameAndNumber(name, n) => {
                            OidComponent::NameAndNumber(self.resolve_symbol(name), n)
                        }
                    });
                }
                Value::Oid(OidPath::new(components))
            }
        };
        self.stack.push(Frame::Value(value));
        Ok(())
    }
}
