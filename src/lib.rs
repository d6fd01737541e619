//! SMI/SMIv2 MIB compiler and SNMP index codec

/// Semantic listener assembling store entries
pub mod builder;
/// Primitive codec capability table
pub mod codec;
/// Size and value-range constraints
pub mod constraint;
/// Error model
pub mod error;
/// Row index decoding
pub mod index;
/// Tokenizer
pub mod lex;
/// Parse event surface
pub mod listener;
/// Symbols and object identifier paths
pub mod oid;
/// Grammar recogniser
pub mod parse;
/// The compiled catalogue
pub mod store;
/// Type descriptors and values
pub mod types;

pub use self::builder::Builder;
pub use self::codec::{CodecRegistry, SmiCodec, SmiValue};
pub use self::constraint::{Constraint, Element, Split};
pub use self::error::{Error, Result};
pub use self::index::IndexValue;
pub use self::lex::{Keyword, Lexer, Span, Token, TokenKind};
pub use self::listener::{MacroKind, MibListener};
pub use self::oid::{OidComponent, OidPath, Symbol};
pub use self::parse::parse;
pub use self::store::{Definition, MibStore, Module, OidRoot, SymbolKind};
pub use self::types::{AttrValue, Attrs, IntValue, TypeDescriptor, TypeKind, Value};
