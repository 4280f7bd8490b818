//! Recursive-descent parser for Ryot.
//!
//! The parser keeps two tokens of lookahead (`cur` and `peek`). Every
//! sub-parser starts with `cur` on the first token of its construct and
//! returns with `cur` on the construct's last token (`;` or `}` for
//! declarations), so the enclosing loop can decide whether to continue by
//! looking at `peek` alone.
//!
//! Errors come in two flavours:
//!
//! - fatal ones (lexer errors, a token that cannot start an expression) are
//!   returned as `Err` and abort the parse;
//! - missing or unexpected tokens are recorded as diagnostics and the
//!   affected declaration yields `None`. The parser then skips ahead to the
//!   next declaration or statement and keeps collecting diagnostics.

use std::collections::HashSet;

use log::debug;

use crate::ast::{Expr, Identifier, Param, Program, Statement};
use crate::error::CoreError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parse a complete source unit. Any recorded diagnostic turns into
/// `CoreError::Parse`.
pub fn parse(source: &str) -> Result<Program, CoreError> {
    let mut parser = Parser::new(Lexer::new(source))?;
    let program = parser.parse_program()?;
    if !parser.errors().is_empty() {
        return Err(CoreError::Parse(parser.errors().to_vec()));
    }
    Ok(program)
}

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    cur: Token,
    peek: Token,
    errors: Vec<String>,
    /// Storage maps declared in the class being parsed.
    storages: HashSet<String>,
}

impl<'src> Parser<'src> {
    pub fn new(lexer: Lexer<'src>) -> Result<Self, CoreError> {
        let mut parser = Parser {
            lexer,
            cur: Token::eof(),
            peek: Token::eof(),
            errors: Vec::new(),
            storages: HashSet::new(),
        };
        parser.next_token()?;
        parser.next_token()?;
        Ok(parser)
    }

    /// Diagnostics collected so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Result<Program, CoreError> {
        let mut program = Program::default();

        while !self.cur_is(TokenKind::Eof) {
            let statement = match self.cur.kind {
                TokenKind::Pragma => self.parse_pragma()?,
                TokenKind::Class => self.parse_class()?,
                other => {
                    self.errors.push(format!(
                        "unexpected top-level token {other} ({:?})",
                        self.cur.literal
                    ));
                    None
                }
            };
            match statement {
                Some(statement) => program.statements.push(statement),
                None => self.synchronize_top_level()?,
            }
            self.next_token()?;
        }

        debug!(
            "parsed {} top-level statements with {} diagnostics",
            program.statements.len(),
            self.errors.len()
        );
        Ok(program)
    }

    // -----------------------------------------------------------------
    // Token plumbing
    // -----------------------------------------------------------------

    fn next_token(&mut self) -> Result<(), CoreError> {
        let next = self.lexer.next_token()?;
        self.cur = std::mem::replace(&mut self.peek, next);
        Ok(())
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if `peek` has the expected kind; otherwise record a
    /// diagnostic and stay put.
    fn expect_peek(&mut self, kind: TokenKind) -> Result<bool, CoreError> {
        if self.peek_is(kind) {
            self.next_token()?;
            Ok(true)
        } else {
            self.peek_error(kind);
            Ok(false)
        }
    }

    fn peek_error(&mut self, kind: TokenKind) {
        self.errors.push(format!(
            "expected next token to be {kind}, got {}",
            self.peek.kind
        ));
    }

    fn cur_error(&mut self, expected: &str) {
        self.errors.push(format!(
            "expected {expected}, got {} ({:?})",
            self.cur.kind, self.cur.literal
        ));
    }

    /// Skip to just before the next `pragma` / `class` (or the end).
    fn synchronize_top_level(&mut self) -> Result<(), CoreError> {
        while !self.peek_is(TokenKind::Pragma)
            && !self.peek_is(TokenKind::Class)
            && !self.peek_is(TokenKind::Eof)
        {
            self.next_token()?;
        }
        Ok(())
    }

    /// Skip the rest of a broken member or statement: stop on a `;` or on
    /// the `}` that closes a block opened after the failure point, or right
    /// before the `}` of the enclosing block.
    fn synchronize(&mut self) -> Result<(), CoreError> {
        let mut depth = 0usize;
        loop {
            match self.cur.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Semicolon if depth == 0 => return Ok(()),
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
            if depth == 0 && (self.peek_is(TokenKind::RBrace) || self.peek_is(TokenKind::Eof)) {
                return Ok(());
            }
            self.next_token()?;
        }
    }

    // -----------------------------------------------------------------
    // Top-level declarations
    // -----------------------------------------------------------------

    fn parse_pragma(&mut self) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::Colon)? {
            return Ok(None);
        }
        if !self.expect_peek(TokenKind::StringLiteral)? {
            return Ok(None);
        }
        let version = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::Semicolon)? {
            return Ok(None);
        }
        Ok(Some(Statement::Pragma { token, version }))
    }

    fn parse_class(&mut self) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();

        let mut is_interface = false;
        if self.peek_is(TokenKind::Interface) {
            is_interface = true;
            self.next_token()?;
        } else if self.peek_is(TokenKind::Contract) {
            self.next_token()?;
        }

        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::LBrace)? {
            return Ok(None);
        }

        self.storages.clear();
        let mut body = Vec::new();
        while !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            self.next_token()?;
            match self.parse_member()? {
                Some(member) => body.push(member),
                None => self.synchronize()?,
            }
        }
        if !self.expect_peek(TokenKind::RBrace)? {
            return Ok(None);
        }
        self.resolve_storage_reads(&mut body);

        debug!("parsed class {name} with {} members", body.len());
        Ok(Some(Statement::Class {
            token,
            name,
            is_interface,
            body,
        }))
    }

    fn parse_member(&mut self) -> Result<Option<Statement>, CoreError> {
        let mut public = false;
        if self.cur_is(TokenKind::Pub) {
            public = true;
            self.next_token()?;
        } else if self.cur_is(TokenKind::Priv) {
            self.next_token()?;
        }

        match self.cur.kind {
            TokenKind::Enum => self.parse_enum(),
            TokenKind::Struct => self.parse_struct(),
            TokenKind::Storage => self.parse_storage(public),
            TokenKind::Func => self.parse_func(public),
            kind if kind.is_scalar_type() || kind == TokenKind::LBracket => {
                self.parse_field(public)
            }
            _ => {
                self.cur_error("a class member");
                Ok(None)
            }
        }
    }

    fn parse_enum(&mut self) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if self.peek_is(TokenKind::Colon) {
            self.next_token()?;
        }
        if !self.expect_peek(TokenKind::LBrace)? {
            return Ok(None);
        }

        let mut values: Vec<String> = Vec::new();
        while !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            if !self.expect_peek(TokenKind::Ident)? {
                return Ok(None);
            }
            let value = self.cur.literal.clone();
            if values.contains(&value) {
                self.errors
                    .push(format!("duplicate value {value} in enum {name}"));
            }
            values.push(value);
            if self.peek_is(TokenKind::Semicolon) || self.peek_is(TokenKind::Comma) {
                self.next_token()?;
            }
        }
        if !self.expect_peek(TokenKind::RBrace)? {
            return Ok(None);
        }

        Ok(Some(Statement::Enum {
            token,
            name,
            values,
        }))
    }

    fn parse_struct(&mut self) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if self.peek_is(TokenKind::Colon) {
            self.next_token()?;
        }
        if !self.expect_peek(TokenKind::LBrace)? {
            return Ok(None);
        }

        let mut fields = Vec::new();
        while !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            if !self.expect_peek(TokenKind::Ident)? {
                return Ok(None);
            }
            let field_token = self.cur.clone();
            if !self.expect_peek(TokenKind::Colon)? {
                return Ok(None);
            }
            self.next_token()?;
            let Some(type_name) = self.parse_type(true)? else {
                return Ok(None);
            };
            if !self.expect_peek(TokenKind::Semicolon)? {
                return Ok(None);
            }
            fields.push(Param {
                name: field_token.literal.clone(),
                token: field_token,
                type_name,
            });
        }
        if !self.expect_peek(TokenKind::RBrace)? {
            return Ok(None);
        }

        Ok(Some(Statement::Struct {
            token,
            name,
            fields,
        }))
    }

    fn parse_storage(&mut self, public: bool) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::LParen)? {
            return Ok(None);
        }
        let Some(keys) = self.parse_params()? else {
            return Ok(None);
        };
        if !self.expect_peek(TokenKind::Colon)? {
            return Ok(None);
        }
        self.next_token()?;
        let Some(value_type) = self.parse_type(false)? else {
            return Ok(None);
        };
        if !self.expect_peek(TokenKind::Semicolon)? {
            return Ok(None);
        }

        debug!("parsed storage {name} with {} keys", keys.len());
        self.storages.insert(name.clone());
        Ok(Some(Statement::Storage {
            token,
            name,
            public,
            keys,
            value_type,
        }))
    }

    fn parse_func(&mut self, public: bool) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::LParen)? {
            return Ok(None);
        }
        let Some(params) = self.parse_params()? else {
            return Ok(None);
        };
        if !self.expect_peek(TokenKind::Colon)? {
            return Ok(None);
        }
        self.next_token()?;
        let return_type = if self.cur_is(TokenKind::Void) {
            "void".to_string()
        } else {
            match self.parse_type(false)? {
                Some(ty) => ty,
                None => return Ok(None),
            }
        };
        if !self.expect_peek(TokenKind::LBrace)? {
            return Ok(None);
        }

        let mut body = Vec::new();
        while !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            self.next_token()?;
            match self.parse_statement()? {
                Some(statement) => body.push(statement),
                None => self.synchronize()?,
            }
        }
        if !self.expect_peek(TokenKind::RBrace)? {
            return Ok(None);
        }

        debug!("parsed func {name} ({} statements)", body.len());
        Ok(Some(Statement::Func {
            token,
            name,
            public,
            params,
            return_type,
            body,
        }))
    }

    fn parse_field(&mut self, public: bool) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        let Some(type_name) = self.parse_type(false)? else {
            return Ok(None);
        };
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();

        let mut value = None;
        if self.peek_is(TokenKind::Colon) {
            self.next_token()?;
            self.next_token()?;
            match self.parse_expression()? {
                Some(expr) => value = Some(expr),
                None => return Ok(None),
            }
        }
        if !self.expect_peek(TokenKind::Semicolon)? {
            return Ok(None);
        }

        Ok(Some(Statement::Field {
            token,
            name,
            public,
            type_name,
            value,
        }))
    }

    /// `cur` is `(`; reads `name: type, ...` and stops on `)`.
    fn parse_params(&mut self) -> Result<Option<Vec<Param>>, CoreError> {
        let mut params = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token()?;
            return Ok(Some(params));
        }
        loop {
            if !self.expect_peek(TokenKind::Ident)? {
                return Ok(None);
            }
            let token = self.cur.clone();
            if !self.expect_peek(TokenKind::Colon)? {
                return Ok(None);
            }
            self.next_token()?;
            let Some(type_name) = self.parse_type(false)? else {
                return Ok(None);
            };
            params.push(Param {
                name: token.literal.clone(),
                token,
                type_name,
            });

            if self.peek_is(TokenKind::Comma) {
                self.next_token()?;
                continue;
            }
            if !self.expect_peek(TokenKind::RParen)? {
                return Ok(None);
            }
            return Ok(Some(params));
        }
    }

    /// Read a type starting at `cur`. `allow_named` also accepts a bare
    /// identifier (user-defined types in struct fields).
    fn parse_type(&mut self, allow_named: bool) -> Result<Option<String>, CoreError> {
        match self.cur.kind {
            kind if kind.is_scalar_type() => Ok(Some(self.cur.literal.clone())),
            TokenKind::Ident if allow_named => Ok(Some(self.cur.literal.clone())),
            TokenKind::LBracket => {
                if !self.expect_peek(TokenKind::RBracket)? {
                    return Ok(None);
                }
                self.next_token()?;
                Ok(self
                    .parse_type(allow_named)?
                    .map(|inner| format!("[]{inner}")))
            }
            _ => {
                self.cur_error("a type");
                Ok(None)
            }
        }
    }

    // -----------------------------------------------------------------
    // Function bodies
    // -----------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Option<Statement>, CoreError> {
        let token = self.cur.clone();
        let statement = match self.cur.kind {
            TokenKind::Return => {
                if self.peek_is(TokenKind::Semicolon) {
                    Statement::Return { token, value: None }
                } else {
                    self.next_token()?;
                    let Some(value) = self.parse_expression()? else {
                        return Ok(None);
                    };
                    Statement::Return {
                        token,
                        value: Some(value),
                    }
                }
            }
            TokenKind::New => {
                let Some((name, keys)) = self.parse_keyed_target()? else {
                    return Ok(None);
                };
                if !self.expect_peek(TokenKind::Colon)? {
                    return Ok(None);
                }
                self.next_token()?;
                let Some(value) = self.parse_expression()? else {
                    return Ok(None);
                };
                Statement::New {
                    token,
                    name,
                    keys,
                    value,
                }
            }
            TokenKind::Delete => {
                let Some((name, keys)) = self.parse_keyed_target()? else {
                    return Ok(None);
                };
                Statement::Delete { token, name, keys }
            }
            _ => {
                let Some(expr) = self.parse_expression()? else {
                    return Ok(None);
                };
                Statement::Expression { token, expr }
            }
        };

        if !self.expect_peek(TokenKind::Semicolon)? {
            return Ok(None);
        }
        Ok(Some(statement))
    }

    /// `name(key, ...)` following `new` / `delete`; stops on `)`.
    fn parse_keyed_target(&mut self) -> Result<Option<(String, Vec<Identifier>)>, CoreError> {
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::LParen)? {
            return Ok(None);
        }

        let mut keys = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token()?;
            return Ok(Some((name, keys)));
        }
        loop {
            if !self.expect_peek(TokenKind::Ident)? {
                return Ok(None);
            }
            keys.push(Identifier::new(self.cur.clone()));
            if self.peek_is(TokenKind::Comma) {
                self.next_token()?;
                continue;
            }
            if !self.expect_peek(TokenKind::RParen)? {
                return Ok(None);
            }
            return Ok(Some((name, keys)));
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    /// Flat expression grammar: a primary, optionally followed by a binary
    /// operator and another (recursively parsed) expression. There is no
    /// precedence table; `a * b + c` groups as `a * (b + c)`.
    fn parse_expression(&mut self) -> Result<Option<Expr>, CoreError> {
        let Some(left) = self.parse_primary()? else {
            return Ok(None);
        };
        if !self.peek.kind.is_binary_operator() {
            return Ok(Some(left));
        }

        self.next_token()?;
        let token = self.cur.clone();
        let operator = token.literal.clone();
        self.next_token()?;
        let Some(right) = self.parse_expression()? else {
            return Ok(None);
        };
        Ok(Some(Expr::Binary {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_primary(&mut self) -> Result<Option<Expr>, CoreError> {
        let token = self.cur.clone();
        let expr = match self.cur.kind {
            TokenKind::Ident if self.peek_is(TokenKind::LParen) => {
                return self.parse_call_or_storage();
            }
            TokenKind::Ident => Expr::Identifier(Identifier::new(token)),
            TokenKind::Int => {
                let Some(value) = parse_u64(&token.literal) else {
                    self.errors
                        .push(format!("could not parse {:?} as uint64", token.literal));
                    return Ok(None);
                };
                Expr::Integer { token, value }
            }
            TokenKind::StringLiteral => Expr::String {
                value: token.literal.clone(),
                token,
            },
            TokenKind::BoolLiteral => Expr::Boolean {
                value: token.literal == "true",
                token,
            },
            TokenKind::AddressLiteral => Expr::Address {
                value: token.literal.clone(),
                token,
            },
            TokenKind::HashLiteral => Expr::Hash {
                value: token.literal.clone(),
                token,
            },
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LParen => {
                self.next_token()?;
                let Some(inner) = self.parse_expression()? else {
                    return Ok(None);
                };
                if !self.expect_peek(TokenKind::RParen)? {
                    return Ok(None);
                }
                inner
            }
            kind if kind.is_scalar_type() => return self.parse_const(),
            TokenKind::Check => return self.parse_err_check(),
            TokenKind::Err => {
                if !self.expect_peek(TokenKind::Colon)? {
                    return Ok(None);
                }
                self.next_token()?;
                let Some(value) = self.parse_expression()? else {
                    return Ok(None);
                };
                Expr::ErrValue {
                    token,
                    value: Box::new(value),
                }
            }
            _ => return Err(CoreError::UnexpectedToken { token }),
        };
        Ok(Some(expr))
    }

    fn parse_array(&mut self) -> Result<Option<Expr>, CoreError> {
        let token = self.cur.clone();
        let mut elements = Vec::new();
        if self.peek_is(TokenKind::RBracket) {
            self.next_token()?;
            return Ok(Some(Expr::Array { token, elements }));
        }
        loop {
            self.next_token()?;
            let Some(element) = self.parse_expression()? else {
                return Ok(None);
            };
            elements.push(element);
            if self.peek_is(TokenKind::Comma) {
                self.next_token()?;
                continue;
            }
            if !self.expect_peek(TokenKind::RBracket)? {
                return Ok(None);
            }
            return Ok(Some(Expr::Array { token, elements }));
        }
    }

    /// `type name: value`
    fn parse_const(&mut self) -> Result<Option<Expr>, CoreError> {
        let token = self.cur.clone();
        let type_name = token.literal.clone();
        if !self.expect_peek(TokenKind::Ident)? {
            return Ok(None);
        }
        let name = self.cur.literal.clone();
        if !self.expect_peek(TokenKind::Colon)? {
            return Ok(None);
        }
        self.next_token()?;
        let Some(value) = self.parse_expression()? else {
            return Ok(None);
        };
        Ok(Some(Expr::Const {
            token,
            type_name,
            name,
            value: Box::new(value),
        }))
    }

    /// `check(condition)` or `check(condition, on_success)`
    fn parse_err_check(&mut self) -> Result<Option<Expr>, CoreError> {
        let token = self.cur.clone();
        if !self.expect_peek(TokenKind::LParen)? {
            return Ok(None);
        }
        self.next_token()?;
        let Some(condition) = self.parse_expression()? else {
            return Ok(None);
        };

        let mut on_success = None;
        if self.peek_is(TokenKind::Comma) {
            self.next_token()?;
            self.next_token()?;
            let Some(value) = self.parse_expression()? else {
                return Ok(None);
            };
            on_success = Some(Box::new(value));
        }
        if !self.expect_peek(TokenKind::RParen)? {
            return Ok(None);
        }

        Ok(Some(Expr::ErrCheck {
            token,
            condition: Box::new(condition),
            on_success,
        }))
    }

    /// `name(args)` is a storage write when followed by `:` and a call
    /// otherwise. Calls naming a storage map become reads once the whole
    /// class is known, see `resolve_storage_reads`.
    fn parse_call_or_storage(&mut self) -> Result<Option<Expr>, CoreError> {
        let token = self.cur.clone();
        let name = token.literal.clone();
        self.next_token()?; // '('

        let mut args = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token()?;
        } else {
            loop {
                self.next_token()?;
                let Some(arg) = self.parse_expression()? else {
                    return Ok(None);
                };
                args.push(arg);
                if self.peek_is(TokenKind::Comma) {
                    self.next_token()?;
                    continue;
                }
                if !self.expect_peek(TokenKind::RParen)? {
                    return Ok(None);
                }
                break;
            }
        }

        if self.peek_is(TokenKind::Colon) {
            let Some(keys) = self.storage_keys(&name, &args) else {
                return Ok(None);
            };
            self.next_token()?; // ':'
            self.next_token()?;
            let Some(value) = self.parse_expression()? else {
                return Ok(None);
            };
            return Ok(Some(Expr::StorageWrite {
                token,
                name,
                keys,
                value: Box::new(value),
            }));
        }

        Ok(Some(Expr::Call {
            function: Identifier::new(token.clone()),
            token,
            args,
        }))
    }

    /// Storage keys must be plain identifiers.
    fn storage_keys(&mut self, name: &str, args: &[Expr]) -> Option<Vec<Identifier>> {
        let mut keys = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Expr::Identifier(ident) => keys.push(ident.clone()),
                other => {
                    self.errors.push(format!(
                        "storage {name} must be keyed by identifiers, got {other}"
                    ));
                    return None;
                }
            }
        }
        Some(keys)
    }

    /// Rewrite calls that name a storage map of this class into storage
    /// reads, wherever the map is declared.
    fn resolve_storage_reads(&mut self, body: &mut [Statement]) {
        if self.storages.is_empty() {
            return;
        }
        for member in body {
            match member {
                Statement::Func { body, .. } => {
                    for statement in body {
                        match statement {
                            Statement::Return {
                                value: Some(expr), ..
                            }
                            | Statement::New { value: expr, .. }
                            | Statement::Expression { expr, .. } => self.resolve_expr(expr),
                            _ => {}
                        }
                    }
                }
                Statement::Field {
                    value: Some(expr), ..
                } => self.resolve_expr(expr),
                _ => {}
            }
        }
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Array { elements, .. } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Call { args, .. } => {
                for arg in args.iter_mut() {
                    self.resolve_expr(arg);
                }
            }
            Expr::Const { value, .. }
            | Expr::StorageWrite { value, .. }
            | Expr::ErrValue { value, .. } => self.resolve_expr(value),
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::ErrCheck {
                condition,
                on_success,
                ..
            } => {
                self.resolve_expr(condition);
                if let Some(success) = on_success {
                    self.resolve_expr(success);
                }
            }
            _ => {}
        }

        let Expr::Call {
            token,
            function,
            args,
        } = expr
        else {
            return;
        };
        if !self.storages.contains(&function.name) {
            return;
        }
        let name = function.name.clone();
        let token = token.clone();
        if let Some(keys) = self.storage_keys(&name, args) {
            *expr = Expr::StorageRead { token, name, keys };
        }
    }
}

fn parse_u64(literal: &str) -> Option<u64> {
    match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => literal.parse().ok(),
    }
}
