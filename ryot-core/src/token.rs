//! Token model shared by the lexer and the parser.

use std::fmt;

/// Kind of a token produced by the lexer.
///
/// The set is closed: every byte sequence the lexer accepts maps to exactly
/// one of these kinds, and the parser dispatches on them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Ident,
    Int,
    StringLiteral,
    AddressLiteral,
    HashLiteral,
    BoolLiteral,

    // Operators
    Assign,   // =
    Plus,     // +
    Minus,    // -
    Asterisk, // *
    Slash,    // /
    Mod,      // %
    Bang,     // !
    Eq,       // ==
    NotEq,    // !=
    Lt,       // <
    Gt,       // >
    Lte,      // <=
    Gte,      // >=
    And,      // &&
    Or,       // ||

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Class,
    Struct,
    Enum,
    Pragma,
    Pub,
    Priv,
    Storage,
    Func,
    Delete,
    Return,
    New,
    Contract,
    Interface,
    Void,
    Check,
    Err,

    // Type keywords
    Uint64,
    Address,
    Bool,
    Byte,
    Hash,
    String,
}

impl TokenKind {
    /// Name used in parser diagnostics, e.g. `IDENT` or `LBRACE`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::AddressLiteral => "ADDRESS_LITERAL",
            TokenKind::HashLiteral => "HASH_LITERAL",
            TokenKind::BoolLiteral => "BOOL_LITERAL",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Mod => "%",
            TokenKind::Bang => "!",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Class => "CLASS",
            TokenKind::Struct => "STRUCT",
            TokenKind::Enum => "ENUM",
            TokenKind::Pragma => "PRAGMA",
            TokenKind::Pub => "PUB",
            TokenKind::Priv => "PRIV",
            TokenKind::Storage => "STORAGE",
            TokenKind::Func => "FUNC",
            TokenKind::Delete => "DELETE",
            TokenKind::Return => "RETURN",
            TokenKind::New => "NEW",
            TokenKind::Contract => "CONTRACT",
            TokenKind::Interface => "INTERFACE",
            TokenKind::Void => "VOID",
            TokenKind::Check => "CHECK",
            TokenKind::Err => "ERR",
            TokenKind::Uint64 => "UINT64",
            TokenKind::Address => "ADDRESS",
            TokenKind::Bool => "BOOL",
            TokenKind::Byte => "BYTE",
            TokenKind::Hash => "HASH",
            TokenKind::String => "STRING",
        }
    }

    /// True for the scalar type keywords (`uint64`, `address`, ...).
    pub fn is_scalar_type(self) -> bool {
        matches!(
            self,
            TokenKind::Uint64
                | TokenKind::Address
                | TokenKind::Bool
                | TokenKind::Byte
                | TokenKind::Hash
                | TokenKind::String
        )
    }

    /// True for tokens that may sit between two operands of a binary expression.
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Mod
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Lte
                | TokenKind::Gte
                | TokenKind::And
                | TokenKind::Or
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token: its kind plus the exact source text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}, {})", self.kind, self.literal)
    }
}

/// Map an identifier-shaped word to its keyword kind, or `Ident`.
pub fn lookup_ident(word: &str) -> TokenKind {
    match word {
        "class" => TokenKind::Class,
        "struct" => TokenKind::Struct,
        "enum" => TokenKind::Enum,
        "pragma" => TokenKind::Pragma,
        "pub" => TokenKind::Pub,
        "priv" => TokenKind::Priv,
        "storage" => TokenKind::Storage,
        "func" => TokenKind::Func,
        "delete" => TokenKind::Delete,
        "return" => TokenKind::Return,
        "new" => TokenKind::New,
        "contract" => TokenKind::Contract,
        "interface" => TokenKind::Interface,
        "void" | "null" => TokenKind::Void,
        "check" => TokenKind::Check,
        "err" => TokenKind::Err,
        "uint64" => TokenKind::Uint64,
        "address" => TokenKind::Address,
        "bool" => TokenKind::Bool,
        "byte" => TokenKind::Byte,
        "hash" => TokenKind::Hash,
        "string" => TokenKind::String,
        "true" | "false" => TokenKind::BoolLiteral,
        _ => TokenKind::Ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_types_are_recognized() {
        assert_eq!(lookup_ident("contract"), TokenKind::Contract);
        assert_eq!(lookup_ident("uint64"), TokenKind::Uint64);
        assert_eq!(lookup_ident("null"), TokenKind::Void);
        assert_eq!(lookup_ident("true"), TokenKind::BoolLiteral);
        assert_eq!(lookup_ident("counter"), TokenKind::Ident);
    }

    #[test]
    fn diagnostic_names_match_upper_case_form() {
        assert_eq!(TokenKind::Ident.to_string(), "IDENT");
        assert_eq!(TokenKind::LBrace.to_string(), "LBRACE");
        assert_eq!(TokenKind::Lte.to_string(), "<=");
    }
}
