use indexmap::IndexMap;
use num_enum::TryFromPrimitive;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::listener::MacroKind;
use crate::oid::{Interner, OidComponent, OidPath, Symbol};
use crate::parse;
use crate::types::{AttrValue, Attrs, TypeDescriptor, Value};

/// The pre-seeded roots of the object identifier tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum OidRoot {
    Ccitt = 0,
    Iso = 1,
    JointIsoCcitt = 2,
}

impl OidRoot {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ccitt => "ccitt",
            Self::Iso => "iso",
            Self::JointIsoCcitt => "joint-iso-ccitt",
        }
    }

    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "ccitt" => Some(Self::Ccitt),
            "iso" => Some(Self::Iso),
            "joint-iso-ccitt" => Some(Self::JointIsoCcitt),
            _ => None,
        }
    }

    #[must_use]
    pub fn arc(self) -> u32 {
        self as u32
    }
}

/// A compiled module: its import map and the symbols it contributed.
#[derive(Debug, Clone)]
pub struct Module {
    name: Arc<str>,
    imports: IndexMap<String, String>,
    assignments: Vec<Symbol>,
}

impl Module {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Imported local name → source module name.
    #[must_use]
    pub fn imports(&self) -> &IndexMap<String, String> {
        &self.imports
    }

    #[must_use]
    pub fn assignments(&self) -> &[Symbol] {
        &self.assignments
    }
}

/// Which table claims a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Type,
    TextualConvention,
    ObjectType,
    TrapType,
    Value,
    Macro,
}

/// An OBJECT-TYPE assignment: its attribute bag and declared path.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub attributes: Attrs,
    pub oid: OidPath,
}

/// A TRAP-TYPE assignment; the terminal value is the trap number.
#[derive(Debug, Clone)]
pub struct TrapType {
    pub attributes: Attrs,
    pub value: Value,
}

/// Any other OID-valued macro instance (MODULE-IDENTITY, OBJECT-GROUP, …).
#[derive(Debug, Clone)]
pub struct MacroValue {
    pub kind: MacroKind,
    pub attributes: Attrs,
    pub oid: OidPath,
}

/// Payload revealed by [`MibStore::resolve`].
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Type(&'a TypeDescriptor),
    TextualConvention(&'a Attrs),
    ObjectType(&'a ObjectType),
    TrapType(&'a TrapType),
    Value(&'a TypeDescriptor, &'a Value),
    Macro(&'a MacroValue),
}

enum LinkFail {
    Cycle(Symbol),
    Unresolved(Symbol),
}

impl From<LinkFail> for Error {
    fn from(fail: LinkFail) -> Self {
        match fail {
            LinkFail::Cycle(symbol) => Error::TypeCycle { symbol },
            LinkFail::Unresolved(symbol) => Error::UnresolvedImport { symbol },
        }
    }
}

/// The compiled catalogue. Modules are appended by [`load`](Self::load);
/// after [`link`](Self::link) the store is frozen for query.
#[derive(Debug, Default)]
pub struct MibStore {
    interner: Interner,
    modules: IndexMap<Arc<str>, Module>,
    kinds: HashMap<Symbol, SymbolKind>,
    types: HashMap<Symbol, TypeDescriptor>,
    textual_conventions: HashMap<Symbol, Attrs>,
    object_types: HashMap<Symbol, ObjectType>,
    trap_types: HashMap<Symbol, TrapType>,
    values: HashMap<Symbol, (TypeDescriptor, Value)>,
    macros: HashMap<Symbol, MacroValue>,
    /// Memoised numeric forms, filled by `link`
    numeric: HashMap<Symbol, Vec<u32>>,
    /// Reverse index numeric OID → symbol, filled by `link`
    oids: HashMap<Vec<u32>, Symbol>,
}

impl MibStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every module in `source` into the store. `origin` names
    /// the source in diagnostics. On error, modules and assignments
    /// registered before the failure remain.
    pub fn load(&mut self, source: &str, origin: &str) -> Result<Vec<String>> {
        let mut builder = Builder::new(self, origin);
        parse::parse(source, origin, &mut builder)?;
        Ok(builder.loaded().to_vec())
    }

    /// Intern a (module, name) pair.
    pub fn symbol(&mut self, module: &str, name: &str) -> Symbol {
        Symbol::new(self.interner.intern(module), self.interner.intern(name))
    }

    pub fn new_module(&mut self, name: &str) -> Result<()> {
        if self.modules.contains_key(name) {
            return Err(Error::DuplicateModule {
                name: name.to_owned(),
            });
        }
        let interned = self.interner.intern(name);
        self.modules.insert(
            interned.clone(),
            Module {
                name: interned,
                imports: IndexMap::new(),
                assignments: Vec::new(),
            },
        );
        debug!(module = name, "registered module");
        Ok(())
    }

    pub(crate) fn add_import(&mut self, module: &str, name: &str, from: &str) {
        if let Some(entry) = self.modules.get_mut(module) {
            entry.imports.insert(name.to_owned(), from.to_owned());
        }
    }

    fn claim(&mut self, symbol: &Symbol, kind: SymbolKind) -> Result<()> {
        if self.kinds.contains_key(symbol) {
            return Err(Error::DuplicateSymbol {
                symbol: symbol.clone(),
            });
        }
        self.kinds.insert(symbol.clone(), kind);
        if let Some(module) = self.modules.get_mut(symbol.module()) {
            module.assignments.push(symbol.clone());
        }
        trace!(symbol = %symbol, ?kind, "registered symbol");
        Ok(())
    }

    pub fn add_type(&mut self, symbol: Symbol, descriptor: TypeDescriptor) -> Result<()> {
        self.claim(&symbol, SymbolKind::Type)?;
        self.types.insert(symbol, descriptor);
        Ok(())
    }

    pub fn add_value(
        &mut self,
        symbol: Symbol,
        descriptor: TypeDescriptor,
        value: Value,
    ) -> Result<()> {
        self.claim(&symbol, SymbolKind::Value)?;
        self.values.insert(symbol, (descriptor, value));
        Ok(())
    }

    pub fn add_textual_convention(&mut self, symbol: Symbol, attributes: Attrs) -> Result<()> {
        self.claim(&symbol, SymbolKind::TextualConvention)?;
        self.textual_conventions.insert(symbol, attributes);
        Ok(())
    }

    pub fn add_object_type(
        &mut self,
        symbol: Symbol,
        attributes: Attrs,
        oid: OidPath,
    ) -> Result<()> {
        self.claim(&symbol, SymbolKind::ObjectType)?;
        self.object_types
            .insert(symbol, ObjectType { attributes, oid });
        Ok(())
    }

    pub fn add_trap_type(&mut self, symbol: Symbol, attributes: Attrs, value: Value) -> Result<()> {
        self.claim(&symbol, SymbolKind::TrapType)?;
        self.trap_types
            .insert(symbol, TrapType { attributes, value });
        Ok(())
    }

    pub fn add_macro_value(
        &mut self,
        symbol: Symbol,
        kind: MacroKind,
        attributes: Attrs,
        oid: OidPath,
    ) -> Result<()> {
        self.claim(&symbol, SymbolKind::Macro)?;
        self.macros.insert(
            symbol,
            MacroValue {
                kind,
                attributes,
                oid,
            },
        );
        Ok(())
    }

    /// Which table holds `symbol`, and its payload.
    #[must_use]
    pub fn resolve(&self, symbol: &Symbol) -> Option<Definition<'_>> {
        Some(match self.kinds.get(symbol)? {
            SymbolKind::Type => Definition::Type(self.types.get(symbol)?),
            SymbolKind::TextualConvention => {
                Definition::TextualConvention(self.textual_conventions.get(symbol)?)
            }
            SymbolKind::ObjectType => Definition::ObjectType(self.object_types.get(symbol)?),
            SymbolKind::TrapType => Definition::TrapType(self.trap_types.get(symbol)?),
            SymbolKind::Value => {
                let (descriptor, value) = self.values.get(symbol)?;
                Definition::Value(descriptor, value)
            }
            SymbolKind::Macro => Definition::Macro(self.macros.get(symbol)?),
        })
    }

    #[must_use]
    pub fn kind(&self, symbol: &Symbol) -> Option<SymbolKind> {
        self.kinds.get(symbol).copied()
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    #[must_use]
    pub fn type_of(&self, symbol: &Symbol) -> Option<&TypeDescriptor> {
        self.types.get(symbol)
    }

    #[must_use]
    pub fn textual_convention(&self, symbol: &Symbol) -> Option<&Attrs> {
        self.textual_conventions.get(symbol)
    }

    #[must_use]
    pub fn object_type(&self, symbol: &Symbol) -> Option<&ObjectType> {
        self.object_types.get(symbol)
    }

    /// Resolve `name` the way source text inside `module` would: through
    /// the module's import list, else locally.
    #[must_use]
    pub fn resolve_in(&self, module: &str, name: &str) -> Symbol {
        if let Some(entry) = self.modules.get(module) {
            if let Some(source) = entry.imports.get(name) {
                return Symbol::of(source, name);
            }
        }
        Symbol::of(module, name)
    }

    /// The declared OID path of `symbol`, whatever table holds it.
    #[must_use]
    pub fn oid_path(&self, symbol: &Symbol) -> Option<&OidPath> {
        match self.kinds.get(symbol)? {
            SymbolKind::ObjectType => Some(&self.object_types.get(symbol)?.oid),
            SymbolKind::Macro => Some(&self.macros.get(symbol)?.oid),
            SymbolKind::Value => match self.values.get(symbol)? {
                (_, Value::Oid(path)) => Some(path),
                _ => None,
            },
            _ => None,
        }
    }

    /// The purely numeric form of the symbol's declared path. `None` when
    /// the symbol has no path or the path does not resolve.
    #[must_use]
    pub fn numeric_oid(&self, symbol: &Symbol) -> Option<Vec<u32>> {
        let mut visited = HashSet::new();
        self.resolve_numeric(symbol, &mut visited).ok()
    }

    fn resolve_numeric(
        &self,
        symbol: &Symbol,
        visited: &mut HashSet<Symbol>,
    ) -> std::result::Result<Vec<u32>, LinkFail> {
        if let Some(memo) = self.numeric.get(symbol) {
            return Ok(memo.clone());
        }
        if !visited.insert(symbol.clone()) {
            return Err(LinkFail::Cycle(symbol.clone()));
        }
        let path = if self.kinds.contains_key(symbol) {
            self.oid_path(symbol)
                .ok_or_else(|| LinkFail::Unresolved(symbol.clone()))?
        } else {
            // undefined name: only the well-known roots are implied
            let root =
                OidRoot::by_name(symbol.name()).ok_or_else(|| LinkFail::Unresolved(symbol.clone()))?;
            return Ok(vec![root.arc()]);
        };
        let mut out = Vec::new();
        for (position, component) in path.components().iter().enumerate() {
            match component {
                OidComponent::Number(n) => out.push(*n),
                OidComponent::NameAndNumber(parent, n) => {
                    if position == 0 {
                        match self.resolve_numeric(parent, visited) {
                            Ok(prefix) => out.extend(prefix),
                            Err(LinkFail::Cycle(s)) => return Err(LinkFail::Cycle(s)),
                            // the arc number is authoritative
                            Err(LinkFail::Unresolved(_)) => out.push(*n),
                        }
                    } else {
                        out.push(*n);
                    }
                }
                OidComponent::Name(parent) => {
                    if position == 0 {
                        out.extend(self.resolve_numeric(parent, visited)?);
                    } else {
                        // a bare name past the head has nothing to anchor it
                        return Err(LinkFail::Unresolved(parent.clone()));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Longest-prefix translation of a numeric OID back to a symbol.
    /// Populated by [`link`](Self::link); returns the matched symbol and
    /// the unconsumed suffix.
    #[must_use]
    pub fn symbol_for_oid<'a>(&self, oid: &'a [u32]) -> Option<(&Symbol, &'a [u32])> {
        for length in (1..=oid.len()).rev() {
            if let Some(symbol) = self.oids.get(&oid[..length]) {
                return Some((symbol, &oid[length..]));
            }
        }
        None
    }

    /// Freeze the store: resolve every declared path to its numeric form,
    /// verify that referenced types terminate, and build the reverse OID
    /// index. Fails on reference cycles and on names whose defining
    /// module never arrived.
    pub fn link(&mut self) -> Result<()> {
        let with_paths: Vec<Symbol> = self
            .kinds
            .keys()
            .filter(|symbol| self.oid_path(symbol).is_some())
            .cloned()
            .collect();
        for symbol in with_paths {
            let mut visited = HashSet::new();
            let numeric = self.resolve_numeric(&symbol, &mut visited).map_err(Error::from)?;
            self.oids.entry(numeric.clone()).or_insert_with(|| symbol.clone());
            self.numeric.insert(symbol, numeric);
        }

        let mut in_progress = HashSet::new();
        let mut done = HashSet::new();
        let symbols: Vec<Symbol> = self.kinds.keys().cloned().collect();
        for symbol in &symbols {
            self.check_symbol(symbol, &mut in_progress, &mut done)?;
        }
        let anonymous: Vec<TypeDescriptor> = self
            .values
            .values()
            .map(|(descriptor, _)| descriptor.clone())
            .chain(self.attribute_types())
            .collect();
        for descriptor in &anonymous {
            self.check_descriptor(descriptor, &mut in_progress, &mut done)?;
        }

        debug!(
            modules = self.modules.len(),
            symbols = self.kinds.len(),
            oids = self.oids.len(),
            "linked store"
        );
        Ok(())
    }

    fn attribute_types(&self) -> Vec<TypeDescriptor> {
        let bags = self
            .textual_conventions
            .values()
            .chain(self.object_types.values().map(|o| &o.attributes))
            .chain(self.trap_types.values().map(|t| &t.attributes))
            .chain(self.macros.values().map(|m| &m.attributes));
        let mut out = Vec::new();
        for bag in bags {
            for (_, value) in bag.iter() {
                if let AttrValue::Type(descriptor) = value {
                    out.push(descriptor.clone());
                }
            }
        }
        out
    }

    /// Depth-first check that every referenced chain reachable from
    /// `symbol` lands on a definition and terminates.
    fn check_symbol(
        &self,
        symbol: &Symbol,
        in_progress: &mut HashSet<Symbol>,
        done: &mut HashSet<Symbol>,
    ) -> Result<()> {
        if done.contains(symbol) {
            return Ok(());
        }
        if !in_progress.insert(symbol.clone()) {
            return Err(Error::TypeCycle {
                symbol: symbol.clone(),
            });
        }
        let descriptor = match self.kinds.get(symbol) {
            Some(SymbolKind::Type) => self.types.get(symbol),
            Some(SymbolKind::TextualConvention) => self.textual_conventions[symbol].syntax(),
            Some(_) => None,
            None => {
                in_progress.remove(symbol);
                return Err(Error::UnresolvedImport {
                    symbol: symbol.clone(),
                });
            }
        };
        if let Some(descriptor) = descriptor {
            self.check_descriptor(descriptor, in_progress, done)?;
        }
        in_progress.remove(symbol);
        done.insert(symbol.clone());
        Ok(())
    }

    fn check_descriptor(
        &self,
        descriptor: &TypeDescriptor,
        in_progress: &mut HashSet<Symbol>,
        done: &mut HashSet<Symbol>,
    ) -> Result<()> {
        if let Some(target) = &descriptor.reference {
            self.check_symbol(target, in_progress, done)?;
        }
        if let Some(element) = &descriptor.element {
            self.check_descriptor(element, in_progress, done)?;
        }
        if let Some(fields) = &descriptor.fields {
            for field in fields.values() {
                self.check_descriptor(field, in_progress, done)?;
            }
        }
        Ok(())
    }
}
