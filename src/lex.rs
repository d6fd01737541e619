use std::fmt;

use crate::error::{Error, Result};

/// Source position of a token: 1-based line and column plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reserved words of the SMIv2 dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Begin,
    End,
    Definitions,
    Imports,
    Exports,
    From,
    Sequence,
    Set,
    Of,
    Choice,
    Integer,
    Octet,
    String,
    Bit,
    Bits,
    Null,
    Object,
    Identifier,
    True,
    False,
    Optional,
    Default,
    Implicit,
    Explicit,
    Tags,
    Automatic,
    Extensibility,
    Implied,
    Application,
    Universal,
    Class,
    Unique,
    With,
    Syntax,
    TextualConvention,
    ObjectType,
    ObjectIdentity,
    ObjectGroup,
    ModuleIdentity,
    ModuleCompliance,
    NotificationType,
    NotificationGroup,
    AgentCapabilities,
    TrapType,
    Macro,
}

impl Keyword {
    #[must_use]
    pub fn from_str(text: &str) -> Option<Self> {
        Some(match text {
            "BEGIN" => Self::Begin,
            "END" => Self::End,
            "DEFINITIONS" => Self::Definitions,
            "IMPORTS" => Self::Imports,
            "EXPORTS" => Self::Exports,
            "FROM" => Self::From,
            "SEQUENCE" => Self::Sequence,
            "SET" => Self::Set,
            "OF" => Self::Of,
            "CHOICE" => Self::Choice,
            "INTEGER" => Self::Integer,
            "OCTET" => Self::Octet,
            "STRING" => Self::String,
            "BIT" => Self::Bit,
            "BITS" => Self::Bits,
            "NULL" => Self::Null,
            "OBJECT" => Self::Object,
            "IDENTIFIER" => Self::Identifier,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            "OPTIONAL" => Self::Optional,
            "DEFAULT" => Self::Default,
            "IMPLICIT" => Self::Implicit,
            "EXPLICIT" => Self::Explicit,
            "TAGS" => Self::Tags,
            "AUTOMATIC" => Self::Automatic,
            "EXTENSIBILITY" => Self::Extensibility,
            "IMPLIED" => Self::Implied,
            "APPLICATION" => Self::Application,
            "UNIVERSAL" => Self::Universal,
            "CLASS" => Self::Class,
            "UNIQUE" => Self::Unique,
            "WITH" => Self::With,
            "SYNTAX" => Self::Syntax,
            "TEXTUAL-CONVENTION" => Self::TextualConvention,
            "OBJECT-TYPE" => Self::ObjectType,
            "OBJECT-IDENTITY" => Self::ObjectIdentity,
            "OBJECT-GROUP" => Self::ObjectGroup,
            "MODULE-IDENTITY" => Self::ModuleIdentity,
            "MODULE-COMPLIANCE" => Self::ModuleCompliance,
            "NOTIFICATION-TYPE" => Self::NotificationType,
            "NOTIFICATION-GROUP" => Self::NotificationGroup,
            "AGENT-CAPABILITIES" => Self::AgentCapabilities,
            "TRAP-TYPE" => Self::TrapType,
            "MACRO" => Self::Macro,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    HexNumber,
    BinNumber,
    CString,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LLBracket,
    RRBracket,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Assign,
    Dot,
    DotDot,
    Ellipsis,
    Amp,
    At,
    AtDot,
    Pipe,
    Less,
    Greater,
    Bang,
    Keyword(Keyword),
    Eof,
}

/// One token. `text` borrows the source: the identifier or literal text,
/// the digit payload of a hex/binary literal, or the raw (still escaped)
/// body of a quoted string.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

/// Replace the backslash escapes of a quoted-string body. The lexer has
/// already rejected any escape outside this set.
#[must_use]
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn is_letter(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '$'
        | '\u{00C0}'..='\u{00FF}'
        | '\u{0100}'..='\u{1FFF}'
        | '\u{3040}'..='\u{318F}'
        | '\u{3300}'..='\u{337F}'
        | '\u{3400}'..='\u{3D2D}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}')
}

fn is_ident_continue(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit() || c == '-'
}

/// Tokenizer over MIB source text.
pub struct Lexer<'a> {
    src: &'a str,
    origin: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, origin: &'a str) -> Self {
        Self {
            src,
            origin,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input, appending a final [`TokenKind::Eof`].
    pub fn tokenize(src: &'a str, origin: &'a str) -> Result<Vec<Token<'a>>> {
        let mut lexer = Self::new(src, origin);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, span: Span, message: impl Into<String>) -> Error {
        Error::Lex {
            origin: self.origin.to_owned(),
            span,
            message: message.into(),
        }
    }

    /// Skip whitespace and `--` comments. A comment ends at end of line
    /// or at a second `--` on the same line.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek2() == Some('-') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => break,
                            Some('\n') => {
                                self.bump();
                                break;
                            }
                            Some('-') if self.peek2() == Some('-') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize, span: Span) -> Token<'a> {
        Token {
            kind,
            text: &self.src[start..self.pos],
            span,
        }
    }

    pub fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_trivia();
        let span = self.span();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                span,
            });
        };

        if is_letter(c) {
            return Ok(self.lex_ident(start, span));
        }
        if c.is_ascii_digit() {
            return Ok(self.lex_number(start, span));
        }

        match c {
            '-' => {
                // not a comment (skip_trivia ran), so it must sign a number
                if self.peek2().is_some_and(|d| d.is_ascii_digit()) {
                    self.bump();
                    Ok(self.lex_number(start, span))
                } else {
                    Err(self.error(span, "unexpected character `-`"))
                }
            }
            '\'' => self.lex_quoted_number(span),
            '"' => self.lex_cstring(span),
            '{' => self.punct(TokenKind::LBrace, start, span),
            '}' => self.punct(TokenKind::RBrace, start, span),
            '(' => self.punct(TokenKind::LParen, start, span),
            ')' => self.punct(TokenKind::RParen, start, span),
            '[' => {
                self.bump();
                if self.peek() == Some('[') {
                    self.bump();
                    Ok(self.token(TokenKind::LLBracket, start, span))
                } else {
                    Ok(self.token(TokenKind::LBracket, start, span))
                }
            }
            ']' => {
                self.bump();
                if self.peek() == Some(']') {
                    self.bump();
                    Ok(self.token(TokenKind::RRBracket, start, span))
                } else {
                    Ok(self.token(TokenKind::RBracket, start, span))
                }
            }
            ',' => self.punct(TokenKind::Comma, start, span),
            ';' => self.punct(TokenKind::Semicolon, start, span),
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        Ok(self.token(TokenKind::Assign, start, span))
                    } else {
                        Ok(self.token(TokenKind::ColonColon, start, span))
                    }
                } else {
                    Ok(self.token(TokenKind::Colon, start, span))
                }
            }
            '.' => {
                self.bump();
                if self.peek() == Some('.') {
                    self.bump();
                    if self.peek() == Some('.') {
                        self.bump();
                        Ok(self.token(TokenKind::Ellipsis, start, span))
                    } else {
                        Ok(self.token(TokenKind::DotDot, start, span))
                    }
                } else {
                    Ok(self.token(TokenKind::Dot, start, span))
                }
            }
            '&' => self.punct(TokenKind::Amp, start, span),
            '@' => {
                self.bump();
                if self.peek() == Some('.') {
                    self.bump();
                    Ok(self.token(TokenKind::AtDot, start, span))
                } else {
                    Ok(self.token(TokenKind::At, start, span))
                }
            }
            '|' => self.punct(TokenKind::Pipe, start, span),
            '<' => self.punct(TokenKind::Less, start, span),
            '>' => self.punct(TokenKind::Greater, start, span),
            '!' => self.punct(TokenKind::Bang, start, span),
            other => Err(self.error(span, format!("unexpected character `{other}`"))),
        }
    }

    fn punct(&mut self, kind: TokenKind, start: usize, span: Span) -> Result<Token<'a>> {
        self.bump();
        Ok(self.token(kind, start, span))
    }

    fn lex_ident(&mut self, start: usize, span: Span) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c == '-' && self.peek2() == Some('-') {
                break; // comment, not part of the identifier
            }
            if !is_ident_continue(c) {
                break;
            }
            self.bump();
        }
        let text = &self.src[start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => Token {
                kind: TokenKind::Keyword(keyword),
                text,
                span,
            },
            None => Token {
                kind: TokenKind::Ident,
                text,
                span,
            },
        }
    }

    fn lex_number(&mut self, start: usize, span: Span) -> Token<'a> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.token(TokenKind::Number, start, span)
    }

    /// `'hexdigits'H` or `'01'B`; the token text is the digit payload.
    fn lex_quoted_number(&mut self, span: Span) -> Result<Token<'a>> {
        self.bump(); // opening quote
        let payload_start = self.pos;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(span, "unterminated quoted number"));
                }
                Some('\'') => break,
                Some(_) => {
                    self.bump();
                }
            }
        }
        let payload = &self.src[payload_start..self.pos];
        self.bump(); // closing quote
        let (kind, valid): (TokenKind, fn(char) -> bool) = match self.peek() {
            Some('H' | 'h') => (TokenKind::HexNumber, |c| c.is_ascii_hexdigit()),
            Some('B' | 'b') => (TokenKind::BinNumber, |c| c == '0' || c == '1'),
            _ => return Err(self.error(span, "quoted number needs an H or B suffix")),
        };
        self.bump();
        if let Some(bad) = payload.chars().find(|&c| !valid(c)) {
            return Err(self.error(span, format!("bad digit `{bad}` in quoted number")));
        }
        Ok(Token {
            kind,
            text: payload,
            span,
        })
    }

    /// Double-quoted string; the token text is the raw body, escapes
    /// validated but not yet replaced.
    fn lex_cstring(&mut self, span: Span) -> Result<Token<'a>> {
        self.bump(); // opening quote
        let body_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error(span, "unterminated string")),
                Some('"') => break,
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('n' | 't' | 'r' | '"' | '\\') => {
                            self.bump();
                        }
                        Some(other) => {
                            let at = self.span();
                            return Err(self.error(at, format!("bad escape `\\{other}`")));
                        }
                        None => return Err(self.error(span, "unterminated string")),
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let body = &self.src[body_start..self.pos];
        self.bump(); // closing quote
        Ok(Token {
            kind: TokenKind::CString,
            text: body,
            span,
        })
    }
}

#[test]
fn lex_basic_tokens() {
    let toks = Lexer::tokenize("demo OBJECT IDENTIFIER ::= { iso 3 }", "t").unwrap();
    let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::Keyword(Keyword::Object),
            TokenKind::Keyword(Keyword::Identifier),
            TokenKind::Assign,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::Number,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
    assert_eq!(toks[0].text, "demo");
    assert_eq!(toks[0].span.line, 1);
    assert_eq!(toks[0].span.column, 1);
    assert_eq!(toks[5].text, "iso");
}

#[test]
fn lex_comments_end_at_newline_or_double_dash() {
    let toks = Lexer::tokenize("a -- comment\nb -- x -- c", "t").unwrap();
    let texts: Vec<&str> = toks
        .iter()
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[test]
fn lex_numbers_and_radix_literals() {
    let toks = Lexer::tokenize("-42 'FF'H '101'B ''H", "t").unwrap();
    assert_eq!(toks[0].kind, TokenKind::Number);
    assert_eq!(toks[0].text, "-42");
    assert_eq!(toks[1].kind, TokenKind::HexNumber);
    assert_eq!(toks[1].text, "FF");
    assert_eq!(toks[2].kind, TokenKind::BinNumber);
    assert_eq!(toks[2].text, "101");
    assert_eq!(toks[3].kind, TokenKind::HexNumber);
    assert_eq!(toks[3].text, "");
}

#[test]
fn lex_string_escapes_and_spans() {
    let toks = Lexer::tokenize("\"line one\nline two\" x", "t").unwrap();
    assert_eq!(toks[0].kind, TokenKind::CString);
    assert!(toks[0].text.contains('\n'));
    // the identifier after the two-line string sits on line 2
    assert_eq!(toks[1].span.line, 2);

    assert_eq!(unescape("a\\\"b\\n"), "a\"b\n");
    assert!(Lexer::tokenize("\"bad \\q escape\"", "t").is_err());
    assert!(Lexer::tokenize("\"unterminated", "t").is_err());
}

#[test]
fn lex_hyphenated_keywords_and_idents() {
    let toks = Lexer::tokenize("ifEntry OBJECT-TYPE mib-2", "t").unwrap();
    assert_eq!(toks[0].kind, TokenKind::Ident);
    assert_eq!(toks[1].kind, TokenKind::Keyword(Keyword::ObjectType));
    assert_eq!(toks[2].kind, TokenKind::Ident);
    assert_eq!(toks[2].text, "mib-2");
}

#[test]
fn lex_punctuation_ladder() {
    let toks = Lexer::tokenize("::= :: : ... .. . [[ ]] [ ] @. @", "t").unwrap();
    let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Assign,
            TokenKind::ColonColon,
            TokenKind::Colon,
            TokenKind::Ellipsis,
            TokenKind::DotDot,
            TokenKind::Dot,
            TokenKind::LLBracket,
            TokenKind::RRBracket,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::AtDot,
            TokenKind::At,
            TokenKind::Eof,
        ]
    );
}
