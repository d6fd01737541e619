use tracing::debug;

use crate::error::{Error, Result};
use crate::lex::{self, Keyword, Lexer, Span, Token, TokenKind};
use crate::listener::{AttrEvent, MacroKind, MibListener, OidArc, TypeEvent, ValueEvent};
use crate::types::TypeKind;

/// The recognised macro attribute keywords. Anything else appearing where
/// an attribute is expected is skipped silently.
const ATTRIBUTES: &[&str] = &[
    "MAX-ACCESS",
    "ACCESS",
    "MIN-ACCESS",
    "STATUS",
    "ENTERPRISE",
    "GROUP",
    "OBJECT",
    "SUPPORTS",
    "VARIATION",
    "SYNTAX",
    "REVISION",
    "CONTACT-INFO",
    "ORGANIZATION",
    "LAST-UPDATED",
    "UNITS",
    "REFERENCE",
    "DESCRIPTION",
    "MODULE",
    "INCLUDES",
    "MANDATORY-GROUPS",
    "OBJECTS",
    "VARIABLES",
    "INDEX",
    "DEFVAL",
    "DISPLAY-HINT",
    "NOTIFICATIONS",
    "AUGMENTS",
    "WRITE-SYNTAX",
    "PRODUCT-RELEASE",
    "CREATION-REQUIRES",
];

/// Parse every module definition in `source`, driving `listener` with
/// enter/exit events. Stops at the first error; assignments already
/// delivered to the listener stay delivered.
pub fn parse<L: MibListener>(source: &str, origin: &str, listener: &mut L) -> Result<()> {
    let tokens = Lexer::tokenize(source, origin)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        origin,
        listener,
    };
    while !parser.at(TokenKind::Eof) {
        parser.module_definition()?;
    }
    Ok(())
}

struct Parser<'a, 'l, L> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    origin: &'a str,
    listener: &'l mut L,
}

impl<'a, L: MibListener> Parser<'a, '_, L> {
    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.pos]
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn bump(&mut self) -> Token<'a> {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_kw(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, keyword: Keyword) -> bool {
        if self.at_kw(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'a>> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_kw(&mut self, keyword: Keyword, expected: &'static str) -> Result<Token<'a>> {
        if self.at_kw(keyword) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Report the current token as unexpected; the listener sees the
    /// error node first, then the module aborts.
    fn unexpected(&mut self, expected: &'static str) -> Error {
        let token = self.peek().clone();
        let _ = self.listener.error_node(&token);
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_owned(),
            TokenKind::CString => "a quoted string".to_owned(),
            _ => format!("`{}`", token.text),
        };
        Error::Parse {
            origin: self.origin.to_owned(),
            span: token.span,
            expected,
            found,
        }
    }

    fn invalid(&self, span: Span, message: impl Into<String>) -> Error {
        Error::InvalidAssignment {
            origin: self.origin.to_owned(),
            span,
            message: message.into(),
        }
    }

    /// An identifier or any reserved word, as allowed in import lists.
    fn name_token(&mut self, expected: &'static str) -> Result<Token<'a>> {
        match self.peek().kind {
            TokenKind::Ident | TokenKind::Keyword(_) => Ok(self.bump()),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn skip_balanced_braces(&mut self) -> Result<()> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut depth = 1usize;
        loop {
            match self.peek().kind {
                TokenKind::LBrace => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenKind::Eof => return Err(self.unexpected("`}`")),
                _ => {
                    self.bump();
                }
            }
        }
    }

    // moduleDefinition := name [oid] DEFINITIONS tagDefault extensionDefault
    //                     ::= BEGIN moduleBody END
    fn module_definition(&mut self) -> Result<()> {
        let name = self.expect(TokenKind::Ident, "a module name")?;
        if self.at(TokenKind::LBrace) {
            self.skip_balanced_braces()?;
        }
        self.expect_kw(Keyword::Definitions, "DEFINITIONS")?;
        if self.eat_kw(Keyword::Explicit)
            || self.eat_kw(Keyword::Implicit)
            || self.eat_kw(Keyword::Automatic)
        {
            self.expect_kw(Keyword::Tags, "TAGS")?;
        }
        if self.eat_kw(Keyword::Extensibility) {
            self.expect_kw(Keyword::Implied, "IMPLIED")?;
        }
        self.expect(TokenKind::Assign, "`::=`")?;
        self.expect_kw(Keyword::Begin, "BEGIN")?;
        self.listener.enter_module(name.text, name.span)?;

        if self.eat_kw(Keyword::Exports) {
            while !self.eat(TokenKind::Semicolon) {
                if self.at(TokenKind::Eof) {
                    return Err(self.unexpected("`;`"));
                }
                self.bump();
            }
        }
        if self.at_kw(Keyword::Imports) {
            self.imports()?;
        }
        while !self.at_kw(Keyword::End) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("END"));
            }
            self.assignment()?;
        }
        self.bump(); // END
        self.listener.exit_module()?;
        debug!(module = name.text, origin = self.origin, "compiled module");
        Ok(())
    }

    // imports := IMPORTS (symbol-list FROM module)+ ;
    fn imports(&mut self) -> Result<()> {
        self.bump(); // IMPORTS
        loop {
            if self.eat(TokenKind::Semicolon) {
                return Ok(());
            }
            let mut names: Vec<&str> = Vec::new();
            while !self.at_kw(Keyword::From) {
                if self.at(TokenKind::Semicolon) || self.at(TokenKind::Eof) {
                    return Err(self.unexpected("FROM"));
                }
                let token = self.name_token("an imported symbol")?;
                names.push(token.text);
                self.eat(TokenKind::Comma);
            }
            self.bump(); // FROM
            let module = self.expect(TokenKind::Ident, "a module name")?;
            self.listener.import(&names, module.text, module.span)?;
        }
    }

    // assignment := name (macro-tag | MACRO | ::= …) assignmentType
    fn assignment(&mut self) -> Result<()> {
        // macro definitions are named by the keyword they define,
        // `OBJECT-TYPE MACRO ::= BEGIN … END`
        let name = if matches!(self.peek().kind, TokenKind::Keyword(_))
            && self.tokens[self.pos + 1].kind == TokenKind::Keyword(Keyword::Macro)
        {
            self.bump()
        } else {
            self.expect(TokenKind::Ident, "an assignment name")?
        };
        self.listener.enter_assignment(name.text, name.span)?;

        if let TokenKind::Keyword(keyword) = self.peek().kind {
            if let Some(kind) = MacroKind::from_keyword(keyword) {
                if kind != MacroKind::TextualConvention {
                    self.bump();
                    return self.macro_instance(kind);
                }
            }
            if keyword == Keyword::Macro {
                return self.macro_definition();
            }
        }

        if self.eat(TokenKind::Assign) {
            if self.at_kw(Keyword::TextualConvention) {
                self.bump();
                self.listener.enter_macro(MacroKind::TextualConvention)?;
                self.macro_attributes(MacroKind::TextualConvention)?;
                let span = self.prev_span();
                return self.listener.exit_macro(MacroKind::TextualConvention, span);
            }
            self.parse_type()?;
            return self.listener.exit_type_assignment(self.prev_span());
        }

        // value assignment: name type ::= value
        self.parse_type()?;
        let assign = self.expect(TokenKind::Assign, "`::=`")?;
        self.parse_value()?;
        self.listener.exit_value_assignment(assign.span)
    }

    fn macro_instance(&mut self, kind: MacroKind) -> Result<()> {
        self.listener.enter_macro(kind)?;
        self.macro_attributes(kind)?;
        let assign = self.expect(TokenKind::Assign, "`::=`")?;
        match kind {
            MacroKind::TrapType => {
                let radix = match self.peek().kind {
                    TokenKind::Number => 10,
                    TokenKind::HexNumber => 16,
                    TokenKind::BinNumber => 2,
                    _ => return Err(self.unexpected("a trap number")),
                };
                let token = self.bump();
                self.listener.value(
                    ValueEvent::Number {
                        text: token.text,
                        radix,
                    },
                    token.span,
                )?;
            }
            _ => self.oid_value()?,
        }
        self.listener.exit_macro(kind, assign.span)
    }

    // NAME MACRO ::= BEGIN … END; only the surface is recognised
    fn macro_definition(&mut self) -> Result<()> {
        self.bump(); // MACRO
        self.expect(TokenKind::Assign, "`::=`")?;
        self.expect_kw(Keyword::Begin, "BEGIN")?;
        while !self.at_kw(Keyword::End) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("END"));
            }
            self.bump();
        }
        self.bump(); // END
        self.listener.exit_macro_definition()
    }

    fn is_attribute_start(&self) -> bool {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Syntax) => true,
            TokenKind::Ident => ATTRIBUTES.contains(&self.peek().text),
            _ => false,
        }
    }

    fn macro_attributes(&mut self, kind: MacroKind) -> Result<()> {
        // a TEXTUAL-CONVENTION has no `::=` terminal; its attribute run
        // ends at the first token that cannot start an attribute
        let bounded = kind != MacroKind::TextualConvention;
        loop {
            let span = self.peek().span;
            if self.at_kw(Keyword::Syntax) {
                self.bump();
                self.parse_type()?;
                self.listener.attribute(AttrEvent::Syntax, span)?;
                continue;
            }
            if self.at(TokenKind::Assign) && bounded {
                return Ok(());
            }
            if !self.at(TokenKind::Ident) {
                if bounded {
                    return Err(self.unexpected("a macro attribute or `::=`"));
                }
                return Ok(());
            }
            let attr = self.peek().text;
            match attr {
                "WRITE-SYNTAX" => {
                    self.bump();
                    self.parse_type()?;
                    self.listener.attribute(AttrEvent::WriteSyntax, span)?;
                }
                "UNITS" | "DESCRIPTION" | "REFERENCE" | "DISPLAY-HINT" | "CONTACT-INFO"
                | "ORGANIZATION" | "LAST-UPDATED" | "REVISION" | "PRODUCT-RELEASE" => {
                    let name = self.bump().text;
                    let value = self.expect(TokenKind::CString, "a quoted string")?;
                    self.listener.attribute(
                        AttrEvent::Text {
                            name,
                            value: lex::unescape(value.text),
                        },
                        span,
                    )?;
                }
                "STATUS" | "MAX-ACCESS" | "ACCESS" | "MIN-ACCESS" => {
                    let name = self.bump().text;
                    let value = self.expect(TokenKind::Ident, "an identifier")?;
                    self.listener.attribute(
                        AttrEvent::Text {
                            name,
                            value: value.text.to_owned(),
                        },
                        span,
                    )?;
                }
                "ENTERPRISE" | "GROUP" | "OBJECT" | "SUPPORTS" | "VARIATION" => {
                    let name = self.bump().text;
                    let value = self.expect(TokenKind::Ident, "an identifier")?;
                    self.listener.attribute(
                        AttrEvent::Ident {
                            name,
                            value: value.text,
                        },
                        span,
                    )?;
                }
                "MODULE" => {
                    let name = self.bump().text;
                    // the module name is optional: the compliance module
                    // may describe the defining module itself
                    let value = if self.at(TokenKind::Ident) && !self.is_attribute_start() {
                        self.bump().text
                    } else {
                        ""
                    };
                    self.listener
                        .attribute(AttrEvent::Ident { name, value }, span)?;
                }
                "INCLUDES" | "MANDATORY-GROUPS" | "VARIABLES" | "NOTIFICATIONS" | "AUGMENTS" => {
                    let name = self.bump().text;
                    let values = self.brace_ident_list()?;
                    self.listener
                        .attribute(AttrEvent::IdentList { name, values }, span)?;
                }
                "OBJECTS" => {
                    self.bump();
                    self.brace_value_list()?;
                    self.listener.attribute(AttrEvent::Objects, span)?;
                }
                "CREATION-REQUIRES" => {
                    self.bump();
                    self.brace_value_list()?;
                    self.listener.attribute(AttrEvent::CreationRequires, span)?;
                }
                "INDEX" => {
                    self.bump();
                    self.expect(TokenKind::LBrace, "`{`")?;
                    loop {
                        if self.eat(TokenKind::RBrace) {
                            break;
                        }
                        if self.at(TokenKind::Eof) {
                            return Err(self.unexpected("`}`"));
                        }
                        self.eat_kw(Keyword::Implied);
                        self.parse_type()?;
                        self.eat(TokenKind::Comma);
                    }
                    self.listener.attribute(AttrEvent::Index, span)?;
                }
                "DEFVAL" => {
                    self.bump();
                    self.expect(TokenKind::LBrace, "`{`")?;
                    self.parse_value()?;
                    self.expect(TokenKind::RBrace, "`}`")?;
                    self.listener.attribute(AttrEvent::Defval, span)?;
                }
                _ if bounded => self.skip_unknown_attribute()?,
                _ => return Ok(()),
            }
        }
    }

    /// Unknown attribute inside a macro instance: drop tokens up to the
    /// next recognised attribute or the terminal `::=`.
    fn skip_unknown_attribute(&mut self) -> Result<()> {
        self.bump(); // the unknown keyword
        loop {
            if self.at(TokenKind::Assign) || self.is_attribute_start() {
                return Ok(());
            }
            match self.peek().kind {
                TokenKind::Eof => return Err(self.unexpected("`::=`")),
                TokenKind::LBrace => self.skip_balanced_braces()?,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn brace_ident_list(&mut self) -> Result<Vec<&'a str>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut values = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                return Ok(values);
            }
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            let token = self.name_token("an identifier")?;
            values.push(token.text);
            self.eat(TokenKind::Comma);
        }
    }

    fn brace_value_list(&mut self) -> Result<()> {
        self.expect(TokenKind::LBrace, "`{`")?;
        loop {
            if self.eat(TokenKind::RBrace) {
                return Ok(());
            }
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            self.parse_value()?;
            self.eat(TokenKind::Comma);
        }
    }

    // type := [tag] (builtinType | referencedType) [constraint]
    fn parse_type(&mut self) -> Result<()> {
        if self.at(TokenKind::LBracket) {
            // tag prefix, `[APPLICATION 4] IMPLICIT`; encoding tags are
            // recognised but carry no meaning here
            self.bump();
            if !self.eat_kw(Keyword::Application) && !self.eat_kw(Keyword::Universal) {
                self.eat(TokenKind::Ident);
            }
            self.expect(TokenKind::Number, "a tag number")?;
            self.expect(TokenKind::RBracket, "`]`")?;
            if !self.eat_kw(Keyword::Implicit) {
                self.eat_kw(Keyword::Explicit);
            }
        }

        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Integer) => {
                self.bump();
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::Integer), span)?;
                if self.at(TokenKind::LBrace) {
                    self.named_number_list(span)?;
                }
            }
            TokenKind::Keyword(Keyword::Octet) => {
                self.bump();
                self.expect_kw(Keyword::String, "STRING")?;
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::OctetString), span)?;
            }
            TokenKind::Keyword(Keyword::Bit) => {
                self.bump();
                self.expect_kw(Keyword::String, "STRING")?;
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::BitString), span)?;
                if self.at(TokenKind::LBrace) {
                    self.named_bit_list(span)?;
                }
            }
            TokenKind::Keyword(Keyword::Bits) => {
                self.bump();
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::Bits), span)?;
                if self.at(TokenKind::LBrace) {
                    self.named_bit_list(span)?;
                }
            }
            TokenKind::Keyword(Keyword::Object) => {
                self.bump();
                self.expect_kw(Keyword::Identifier, "IDENTIFIER")?;
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::ObjectIdentifier), span)?;
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.bump();
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::Null), span)?;
            }
            TokenKind::Keyword(Keyword::Sequence | Keyword::Set) => {
                self.bump();
                if self.at(TokenKind::LBrace) {
                    self.listener
                        .enter_type(TypeEvent::Builtin(TypeKind::Sequence), span)?;
                    let fields = self.field_list()?;
                    self.listener.exit_sequence(&fields, self.prev_span())?;
                } else {
                    self.listener
                        .enter_type(TypeEvent::Builtin(TypeKind::SequenceOf), span)?;
                    if self.at(TokenKind::LParen) {
                        self.parse_constraint()?;
                    }
                    self.expect_kw(Keyword::Of, "OF")?;
                    self.parse_type()?;
                    self.listener.exit_sequence_of(self.prev_span())?;
                }
            }
            TokenKind::Keyword(Keyword::Choice) => {
                self.bump();
                self.listener
                    .enter_type(TypeEvent::Builtin(TypeKind::Choice), span)?;
                let fields = self.field_list()?;
                self.listener.exit_choice(&fields, self.prev_span())?;
            }
            TokenKind::Ident => {
                let name = self.bump();
                self.listener
                    .enter_type(TypeEvent::Referenced(name.text), span)?;
                if self.at(TokenKind::LBrace) {
                    self.named_number_list(span)?;
                }
            }
            _ => return Err(self.unexpected("a type")),
        }

        if self.at(TokenKind::LParen) {
            self.parse_constraint()?;
        }
        self.listener.exit_type(self.prev_span())
    }

    fn field_list(&mut self) -> Result<Vec<&'a str>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut fields = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                return Ok(fields);
            }
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            let field = self.expect(TokenKind::Ident, "a field name")?;
            fields.push(field.text);
            self.parse_type()?;
            self.eat(TokenKind::Comma); // commas are tolerated, not required
        }
    }

    fn named_number_list(&mut self, span: Span) -> Result<()> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut pairs: Vec<(&str, i64)> = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            let name = self.expect(TokenKind::Ident, "a name")?;
            self.expect(TokenKind::LParen, "`(`")?;
            let number = self.expect(TokenKind::Number, "a number")?;
            let value = number
                .text
                .parse::<i64>()
                .map_err(|_| self.invalid(number.span, "named number out of range"))?;
            self.expect(TokenKind::RParen, "`)`")?;
            pairs.push((name.text, value));
            self.eat(TokenKind::Comma);
        }
        self.listener.named_numbers(&pairs, span)
    }

    fn named_bit_list(&mut self, span: Span) -> Result<()> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut pairs: Vec<(&str, u16)> = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            let name = self.expect(TokenKind::Ident, "a name")?;
            self.expect(TokenKind::LParen, "`(`")?;
            let number = self.expect(TokenKind::Number, "a bit position")?;
            let value = number
                .text
                .parse::<u16>()
                .map_err(|_| self.invalid(number.span, "bit position out of range"))?;
            self.expect(TokenKind::RParen, "`)`")?;
            pairs.push((name.text, value));
            self.eat(TokenKind::Comma);
        }
        self.listener.named_bits(&pairs, span)
    }

    // constraint := ( elements (| elements)* )
    //             | ( SIZE ( elements (| elements)* ) )
    fn parse_constraint(&mut self) -> Result<()> {
        self.expect(TokenKind::LParen, "`(`")?;
        let is_size = self.at(TokenKind::Ident) && self.peek().text == "SIZE";
        if is_size {
            self.bump();
            self.expect(TokenKind::LParen, "`(`")?;
        }
        self.listener.enter_constraint(is_size)?;
        loop {
            self.constraint_element()?;
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        if is_size {
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.listener.exit_constraint()
    }

    fn constraint_element(&mut self) -> Result<()> {
        self.constraint_bound()?;
        let is_range = self.eat(TokenKind::DotDot);
        if is_range {
            self.constraint_bound()?;
        }
        self.listener.exit_elements(is_range, self.prev_span())
    }

    fn constraint_bound(&mut self) -> Result<()> {
        let radix = match self.peek().kind {
            TokenKind::Number => 10,
            TokenKind::HexNumber => 16,
            TokenKind::BinNumber => 2,
            _ => return Err(self.unexpected("a number")),
        };
        let token = self.bump();
        self.listener.value(
            ValueEvent::Number {
                text: token.text,
                radix,
            },
            token.span,
        )
    }

    /// A terminal value; emits exactly one value event.
    fn parse_value(&mut self) -> Result<()> {
        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.bump();
                self.listener.value(
                    ValueEvent::Number {
                        text: token.text,
                        radix: 10,
                    },
                    span,
                )
            }
            TokenKind::HexNumber => {
                let token = self.bump();
                self.listener.value(
                    ValueEvent::Number {
                        text: token.text,
                        radix: 16,
                    },
                    span,
                )
            }
            TokenKind::BinNumber => {
                let token = self.bump();
                self.listener.value(
                    ValueEvent::Number {
                        text: token.text,
                        radix: 2,
                    },
                    span,
                )
            }
            TokenKind::CString => {
                let token = self.bump();
                self.listener
                    .value(ValueEvent::Text(lex::unescape(token.text)), span)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump();
                self.listener.value(ValueEvent::Bool(true), span)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump();
                self.listener.value(ValueEvent::Bool(false), span)
            }
            TokenKind::LBrace => self.oid_value(),
            TokenKind::Ident => {
                let token = self.bump();
                self.listener.value(ValueEvent::Reference(token.text), span)
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    // objectIdentifierValue := { (NUMBER | name | name(NUMBER))+ }
    fn oid_value(&mut self) -> Result<()> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut arcs: Vec<OidArc<'a>> = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            match self.peek().kind {
                TokenKind::Number => {
                    let token = self.bump();
                    let number = token
                        .text
                        .parse::<u32>()
                        .map_err(|_| self.invalid(token.span, "object identifier arc out of range"))?;
                    arcs.push(OidArc::Number(number));
                }
                TokenKind::Ident => {
                    let name = self.bump();
                    if self.eat(TokenKind::LParen) {
                        let number = self.expect(TokenKind::Number, "a number")?;
                        let value = number.text.parse::<u32>().map_err(|_| {
                            self.invalid(number.span, "object identifier arc out of range")
                        })?;
                        self.expect(TokenKind::RParen, "`)`")?;
                        arcs.push(OidArc::NameAndNumber(name.text, value));
                    } else {
                        arcs.push(OidArc::Name(name.text));
                    }
                }
                TokenKind::Comma => {
                    self.bump();
                }
                _ => return Err(self.unexpected("an object identifier component")),
            }
        }
        self.listener.value(ValueEvent::Oid(arcs), open.span)
    }
}
