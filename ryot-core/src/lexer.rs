//! Lexer for Ryot source text.
//!
//! The lexer works byte-wise and hands out one token per call. Whitespace
//! and `//` line comments are skipped before every token. Two literal
//! forms have a fixed shape and are recognised by looking ahead without
//! moving the cursor:
//!
//! - address literals: `1cx` followed by exactly 30 hex digits
//! - hash literals:    `0x` followed by exactly 64 hex digits
//!
//! Anything that does not match one of those falls back to the ordinary
//! number / identifier readers.

use log::trace;

use crate::error::CoreError;
use crate::token::{Token, TokenKind, lookup_ident};

pub const ADDRESS_PREFIX: &str = "1cx";
pub const ADDRESS_HEX_DIGITS: usize = 30;
pub const HASH_PREFIX: &str = "0x";
pub const HASH_HEX_DIGITS: usize = 64;

/// Lex a whole source string, including the trailing `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

pub struct Lexer<'src> {
    source: &'src str,
    chars: &'src [u8],
    index: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            chars: source.as_bytes(),
            index: 0,
        }
    }

    /// Produce the next token. Once the input is exhausted this keeps
    /// returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token, CoreError> {
        self.skip_trivia();

        let Some(ch) = self.peek_char() else {
            return Ok(Token::eof());
        };

        let start = self.index;
        let token = match ch {
            b'"' => self.lex_string(),
            b'=' => self.one_or_two(TokenKind::Assign, b'=', TokenKind::Eq),
            b'!' => self.one_or_two(TokenKind::Bang, b'=', TokenKind::NotEq),
            b'<' => self.one_or_two(TokenKind::Lt, b'=', TokenKind::Lte),
            b'>' => self.one_or_two(TokenKind::Gt, b'=', TokenKind::Gte),
            b'&' if self.peek_next() == Some(b'&') => self.fixed(TokenKind::And, 2),
            b'|' if self.peek_next() == Some(b'|') => self.fixed(TokenKind::Or, 2),
            b'+' => self.fixed(TokenKind::Plus, 1),
            b'-' => self.fixed(TokenKind::Minus, 1),
            b'*' => self.fixed(TokenKind::Asterisk, 1),
            b'/' => self.fixed(TokenKind::Slash, 1),
            b'%' => self.fixed(TokenKind::Mod, 1),
            b',' => self.fixed(TokenKind::Comma, 1),
            b';' => self.fixed(TokenKind::Semicolon, 1),
            b':' => self.fixed(TokenKind::Colon, 1),
            b'(' => self.fixed(TokenKind::LParen, 1),
            b')' => self.fixed(TokenKind::RParen, 1),
            b'{' => self.fixed(TokenKind::LBrace, 1),
            b'}' => self.fixed(TokenKind::RBrace, 1),
            b'[' => self.fixed(TokenKind::LBracket, 1),
            b']' => self.fixed(TokenKind::RBracket, 1),
            b'0'..=b'9' => self.lex_numeric(),
            _ if is_ident_start(ch) => self.lex_ident_or_keyword(),
            _ => return Err(self.unexpected_char(start)),
        };

        trace!("lexed {token} at byte {start}");
        Ok(token)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(ch) if is_whitespace(ch) => self.consume_char(),
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch == b'\n' {
                            break;
                        }
                        self.consume_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn fixed(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.index;
        for _ in 0..len {
            self.consume_char();
        }
        Token::new(kind, &self.source[start..self.index])
    }

    fn one_or_two(&mut self, single: TokenKind, second: u8, double: TokenKind) -> Token {
        if self.peek_next() == Some(second) {
            self.fixed(double, 2)
        } else {
            self.fixed(single, 1)
        }
    }

    fn unexpected_char(&self, start: usize) -> CoreError {
        let found = self.source[start..].chars().next().unwrap_or('\0');
        CoreError::Lex {
            position: start,
            found,
        }
    }

    fn lex_string(&mut self) -> Token {
        // Opening quote
        self.consume_char();

        let content_start = self.index;
        while let Some(ch) = self.peek_char() {
            if ch == b'"' {
                let content = &self.source[content_start..self.index];
                self.consume_char();
                return Token::new(TokenKind::StringLiteral, content);
            }
            self.consume_char();
        }

        // Unterminated: the literal runs to the end of the input.
        Token::new(TokenKind::StringLiteral, &self.source[content_start..])
    }

    fn lex_numeric(&mut self) -> Token {
        if let Some(len) = self.try_match(ADDRESS_PREFIX, ADDRESS_HEX_DIGITS) {
            return self.fixed(TokenKind::AddressLiteral, len);
        }
        if let Some(len) = self.try_match(HASH_PREFIX, HASH_HEX_DIGITS) {
            return self.fixed(TokenKind::HashLiteral, len);
        }
        self.lex_number()
    }

    /// Check whether the input at the cursor is `prefix` followed by exactly
    /// `hex_digits` hex characters and no further identifier character.
    /// Returns the total length of the match. Never moves the cursor.
    fn try_match(&self, prefix: &str, hex_digits: usize) -> Option<usize> {
        let rest = &self.chars[self.index..];
        let body = rest.strip_prefix(prefix.as_bytes())?;
        if body.len() < hex_digits || !body[..hex_digits].iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        match body.get(hex_digits) {
            Some(&next) if is_ident_continue(next) => None,
            _ => Some(prefix.len() + hex_digits),
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.index;
        if self.peek_char() == Some(b'0') && matches!(self.peek_next(), Some(b'x' | b'X')) {
            self.consume_char(); // '0'
            self.consume_char(); // 'x'
            while self.peek_char().is_some_and(|ch| ch.is_ascii_hexdigit()) {
                self.consume_char();
            }
        } else {
            while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
                self.consume_char();
            }
        }
        Token::new(TokenKind::Int, &self.source[start..self.index])
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.index;
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }
        let text = &self.source[start..self.index];
        Token::new(lookup_ident(text), text)
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if self.index < self.chars.len() {
            self.index += 1;
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .expect("lex")
            .into_iter()
            .map(|t| (t.kind, t.literal))
            .collect()
    }

    #[test]
    fn lexes_function_declaration() {
        let input = r#"
            class contract MyContract {
                pub func add(a: uint64, b: uint64): uint64 {
                    return (a + b);
                }
            }
        "#;
        let expected = [
            (TokenKind::Class, "class"),
            (TokenKind::Contract, "contract"),
            (TokenKind::Ident, "MyContract"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Pub, "pub"),
            (TokenKind::Func, "func"),
            (TokenKind::Ident, "add"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "a"),
            (TokenKind::Colon, ":"),
            (TokenKind::Uint64, "uint64"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "b"),
            (TokenKind::Colon, ":"),
            (TokenKind::Uint64, "uint64"),
            (TokenKind::RParen, ")"),
            (TokenKind::Colon, ":"),
            (TokenKind::Uint64, "uint64"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "a"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "b"),
            (TokenKind::RParen, ")"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Eof, ""),
        ];
        let actual = kinds(input);
        assert_eq!(actual.len(), expected.len());
        for (i, ((kind, literal), (want_kind, want_literal))) in
            actual.iter().zip(expected.iter()).enumerate()
        {
            assert_eq!(kind, want_kind, "token {i}");
            assert_eq!(literal, want_literal, "token {i}");
        }
    }

    #[test]
    fn lexes_two_character_operators() {
        let tokens = kinds("== != <= >= && || < > = !");
        let got: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            got,
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments_between_tokens() {
        let tokens = kinds("// header\n  // another\nfoo // trailing\n 12");
        assert_eq!(tokens[0], (TokenKind::Ident, "foo".to_string()));
        assert_eq!(tokens[1], (TokenKind::Int, "12".to_string()));
        assert_eq!(tokens[2].0, TokenKind::Eof);
    }

    #[test]
    fn string_literals_keep_raw_content() {
        let tokens = kinds(r#""hello \n world""#);
        assert_eq!(
            tokens[0],
            (TokenKind::StringLiteral, r"hello \n world".to_string())
        );
    }

    #[test]
    fn recognizes_address_literal() {
        let address = format!("1cx{}", "a".repeat(30));
        let tokens = kinds(&format!("{address};"));
        assert_eq!(tokens[0], (TokenKind::AddressLiteral, address));
        assert_eq!(tokens[1].0, TokenKind::Semicolon);
    }

    #[test]
    fn recognizes_hash_literal() {
        let hash = format!("0x{}", "f0".repeat(32));
        let tokens = kinds(&format!("{hash} "));
        assert_eq!(tokens[0], (TokenKind::HashLiteral, hash));
    }

    #[test]
    fn short_address_falls_back_to_number_and_identifier() {
        let tokens = kinds("1cx12");
        assert_eq!(tokens[0], (TokenKind::Int, "1".to_string()));
        assert_eq!(tokens[1], (TokenKind::Ident, "cx12".to_string()));
    }

    #[test]
    fn short_hex_is_an_integer() {
        let tokens = kinds("0xff 42");
        assert_eq!(tokens[0], (TokenKind::Int, "0xff".to_string()));
        assert_eq!(tokens[1], (TokenKind::Int, "42".to_string()));
    }

    #[test]
    fn eof_repeats_after_end_of_input() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn rejects_unexpected_character() {
        let err = tokenize("foo $").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Lex {
                position: 4,
                found: '$'
            }
        ));
    }

    #[test]
    fn unknown_bytes_are_lex_errors_not_tokens() {
        for (source, found) in [("a @", '@'), ("a #", '#'), ("a ~", '~')] {
            let err = tokenize(source).unwrap_err();
            assert!(
                matches!(err, CoreError::Lex { position: 2, found: f } if f == found),
                "{source}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_lone_ampersand() {
        let err = tokenize("a & b").unwrap_err();
        assert!(matches!(err, CoreError::Lex { found: '&', .. }));
    }
}
