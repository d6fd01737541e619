use crate::error::Result;
use crate::lex::{Keyword, Span, Token};
use crate::types::TypeKind;

/// The SMIv2 macros recognised on the right-hand side of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    ObjectType,
    TrapType,
    ModuleIdentity,
    ObjectIdentity,
    ObjectGroup,
    ModuleCompliance,
    NotificationType,
    TextualConvention,
    NotificationGroup,
    AgentCapabilities,
}

impl MacroKind {
    #[must_use]
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        Some(match keyword {
            Keyword::ObjectType => Self::ObjectType,
            Keyword::TrapType => Self::TrapType,
            Keyword::ModuleIdentity => Self::ModuleIdentity,
            Keyword::ObjectIdentity => Self::ObjectIdentity,
            Keyword::ObjectGroup => Self::ObjectGroup,
            Keyword::ModuleCompliance => Self::ModuleCompliance,
            Keyword::NotificationType => Self::NotificationType,
            Keyword::TextualConvention => Self::TextualConvention,
            Keyword::NotificationGroup => Self::NotificationGroup,
            Keyword::AgentCapabilities => Self::AgentCapabilities,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ObjectType => "OBJECT-TYPE",
            Self::TrapType => "TRAP-TYPE",
            Self::ModuleIdentity => "MODULE-IDENTITY",
            Self::ObjectIdentity => "OBJECT-IDENTITY",
            Self::ObjectGroup => "OBJECT-GROUP",
            Self::ModuleCompliance => "MODULE-COMPLIANCE",
            Self::NotificationType => "NOTIFICATION-TYPE",
            Self::TextualConvention => "TEXTUAL-CONVENTION",
            Self::NotificationGroup => "NOTIFICATION-GROUP",
            Self::AgentCapabilities => "AGENT-CAPABILITIES",
        }
    }
}

/// One raw arc of an `objectIdentifierValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidArc<'a> {
    Number(u32),
    Name(&'a str),
    NameAndNumber(&'a str, u32),
}

/// A terminal value the parser recognised.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEvent<'a> {
    /// Decimal literal text (possibly signed), or the digit payload of a
    /// hex/binary literal together with its radix
    Number { text: &'a str, radix: u32 },
    Text(String),
    Bool(bool),
    Oid(Vec<OidArc<'a>>),
    Reference(&'a str),
}

/// The sub-rule that introduced a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeEvent<'a> {
    Builtin(TypeKind),
    Referenced(&'a str),
}

/// One macro attribute leaving the parser. Variants without payload take
/// their value from what the preceding events left on the builder stack.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrEvent<'a> {
    /// Pop a type descriptor (`SYNTAX`)
    Syntax,
    /// Pop a type descriptor (`WRITE-SYNTAX`)
    WriteSyntax,
    /// Pop one value (`DEFVAL`)
    Defval,
    /// Pop the trailing run of values (`CREATION-REQUIRES`)
    CreationRequires,
    /// Pop the trailing run of values (`OBJECTS`)
    Objects,
    /// Pop the trailing run of referenced types (`INDEX`)
    Index,
    /// Single-identifier attribute, resolved to a symbol
    Ident { name: &'a str, value: &'a str },
    /// Identifier-list attribute, kept raw
    IdentList { name: &'a str, values: Vec<&'a str> },
    /// String-valued attribute
    Text { name: &'a str, value: String },
}

/// Callbacks the parser drives while recognising a module. The builder is
/// the real implementation; tests use recording listeners.
///
/// Events mirror the grammar: every composite rule has an enter/exit
/// pair, terminals arrive through [`value`](Self::value) and the list
/// payloads. Any callback may fail; the parser aborts the module and
/// propagates the error.
pub trait MibListener {
    fn enter_module(&mut self, name: &str, span: Span) -> Result<()>;
    fn exit_module(&mut self) -> Result<()>;
    fn import(&mut self, names: &[&str], from: &str, span: Span) -> Result<()>;

    fn enter_assignment(&mut self, name: &str, span: Span) -> Result<()>;
    fn exit_type_assignment(&mut self, span: Span) -> Result<()>;
    fn exit_value_assignment(&mut self, span: Span) -> Result<()>;
    /// `NAME MACRO ::= BEGIN … END`; the body is not interpreted.
    fn exit_macro_definition(&mut self) -> Result<()>;

    fn enter_macro(&mut self, kind: MacroKind) -> Result<()>;
    fn exit_macro(&mut self, kind: MacroKind, span: Span) -> Result<()>;
    fn attribute(&mut self, attr: AttrEvent<'_>, span: Span) -> Result<()>;

    fn enter_type(&mut self, ty: TypeEvent<'_>, span: Span) -> Result<()>;
    fn exit_type(&mut self, span: Span) -> Result<()>;
    fn named_numbers(&mut self, pairs: &[(&str, i64)], span: Span) -> Result<()>;
    fn named_bits(&mut self, pairs: &[(&str, u16)], span: Span) -> Result<()>;
    fn exit_sequence(&mut self, fields: &[&str], span: Span) -> Result<()>;
    fn exit_choice(&mut self, fields: &[&str], span: Span) -> Result<()>;
    fn exit_sequence_of(&mut self, span: Span) -> Result<()>;

    fn enter_constraint(&mut self, is_size: bool) -> Result<()>;
    fn exit_elements(&mut self, is_range: bool, span: Span) -> Result<()>;
    fn exit_constraint(&mut self) -> Result<()>;

    fn value(&mut self, value: ValueEvent<'_>, span: Span) -> Result<()>;

    /// A malformed token inside an assignment, reported just before the
    /// parser aborts the module.
    fn error_node(&mut self, _token: &Token<'_>) -> Result<()> {
        Ok(())
    }
}
