use crate::lex::Span;
use crate::oid::Symbol;

pub type Result<T> = std::result::Result<T, Error>;

/// Compile-time and query-time errors.
///
/// Compile-time variants carry the origin name handed to
/// [`MibStore::load`](crate::MibStore::load) and the source span of the
/// offending token. Query-time variants identify the symbol or index
/// component that failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("{origin}:{span}: {message}")]
    Lex {
        origin: String,
        span: Span,
        message: String,
    },
    #[error("{origin}:{span}: expected {expected}, found {found}")]
    Parse {
        origin: String,
        span: Span,
        expected: &'static str,
        found: String,
    },
    #[error("{origin}:{span}: invalid assignment: {message}")]
    InvalidAssignment {
        origin: String,
        span: Span,
        message: String,
    },
    #[error("module `{name}` is already registered")]
    DuplicateModule { name: String },
    #[error("symbol `{symbol}` is already defined")]
    DuplicateSymbol { symbol: Symbol },
    #[error("`{symbol}` has no defining module")]
    UnresolvedImport { symbol: Symbol },
    #[error("type reference cycle through `{symbol}`")]
    TypeCycle { symbol: Symbol },
    #[error("constraint of `{symbol}` cannot be satisfied by the object identifier")]
    ConstraintViolation { symbol: Symbol },
    #[error("{residue} object identifier elements left after the last index")]
    TrailingIndex { residue: usize },
    #[error("no primitive codec for SMI type `{name}`")]
    UnknownSmiType { name: String },
}
