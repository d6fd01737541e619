use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A (module, name) pair identifying one MIB assignment.
///
/// Symbols compare pairwise by content. The backing strings are interned
/// by the store, so cloning a symbol is two reference-count bumps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    module: Arc<str>,
    name: Arc<str>,
}

impl Symbol {
    pub fn new(module: Arc<str>, name: Arc<str>) -> Self {
        Self { module, name }
    }

    /// Build a symbol outside the store's interner; equality and hashing
    /// still compare content, so it looks up interned symbols.
    #[must_use]
    pub fn of(module: &str, name: &str) -> Self {
        Self {
            module: Arc::from(module),
            name: Arc::from(name),
        }
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// One component of an object identifier path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidComponent {
    /// A bare sub-identifier, `6`
    Number(u32),
    /// A bare name, `iso`
    Name(Symbol),
    /// The `name(n)` form, `org(3)`
    NameAndNumber(Symbol, u32),
}

/// An ordered object identifier path as written in the source.
///
/// The numeric form is obtained by resolving named components against
/// their declarations; see [`MibStore::numeric_oid`](crate::MibStore::numeric_oid).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OidPath {
    components: Vec<OidComponent>,
}

impl OidPath {
    pub fn new(components: Vec<OidComponent>) -> Self {
        Self { components }
    }

    #[must_use]
    pub fn components(&self) -> &[OidComponent] {
        &self.components
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for OidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for component in &self.components {
            match component {
                OidComponent::Number(n) => write!(f, " {n}")?,
                OidComponent::Name(sym) => write!(f, " {}", sym.name())?,
                OidComponent::NameAndNumber(sym, n) => write!(f, " {}({n})", sym.name())?,
            }
        }
        f.write_str(" }")
    }
}

/// String interner backing [`Symbol`].
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: HashSet<Arc<str>>,
}

impl Interner {
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(interned) = self.strings.get(s) {
            return interned.clone();
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(interned.clone());
        interned
    }
}

#[test]
fn symbol_equality_is_pairwise() {
    let mut interner = Interner::default();
    let a = Symbol::new(interner.intern("MOD-A"), interner.intern("foo"));
    let b = Symbol::new(interner.intern("MOD-A"), interner.intern("foo"));
    let c = Symbol::new(interner.intern("MOD-B"), interner.intern("foo"));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn interner_reuses_storage() {
    let mut interner = Interner::default();
    let first = interner.intern("ifIndex");
    let second = interner.intern("ifIndex");
    assert!(Arc::ptr_eq(&first, &second));
}
