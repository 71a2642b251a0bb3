//! Core lexer implementation: cursor ownership, whitespace/comment skipping,
//! and the per-character dispatch table that hands off to the specialized
//! sub-lexers in sibling modules.

use rillc_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{Position, Token, TokenKind};
use crate::unicode::is_ascii_ident_start;

/// Converts source text into a stream of [`Token`]s.
///
/// The lexer owns a [`Cursor`] over the source and a reference to a
/// diagnostic [`Handler`]; lexical errors (unterminated strings, unexpected
/// characters) are emitted to the handler rather than aborting tokenization.
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) handler: &'a Handler,
    pub(crate) token_start: usize,
    pub(crate) token_start_line: u32,
    pub(crate) token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token in the source, or `TokenKind::Eof` once exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return self.finish(TokenKind::Eof);
        }

        match self.cursor.current_char() {
            '(' => self.simple(TokenKind::LParen),
            ')' => self.simple(TokenKind::RParen),
            '{' => self.simple(TokenKind::LBrace),
            '}' => self.simple(TokenKind::RBrace),
            '[' => self.simple(TokenKind::LBracket),
            ']' => self.simple(TokenKind::RBracket),
            ',' => self.simple(TokenKind::Comma),
            ';' => self.simple(TokenKind::Semicolon),
            ':' => self.simple(TokenKind::Colon),
            '+' => {
                let kind = self.lex_plus();
                self.finish(kind)
            },
            '-' => {
                let kind = self.lex_minus();
                self.finish(kind)
            },
            '*' => {
                let kind = self.lex_star();
                self.finish(kind)
            },
            '/' => {
                let kind = self.lex_slash();
                self.finish(kind)
            },
            '%' => {
                let kind = self.lex_percent();
                self.finish(kind)
            },
            '=' => {
                let kind = self.lex_equals();
                self.finish(kind)
            },
            '!' => {
                let kind = self.lex_bang();
                self.finish(kind)
            },
            '<' => {
                let kind = self.lex_less();
                self.finish(kind)
            },
            '>' => {
                let kind = self.lex_greater();
                self.finish(kind)
            },
            '&' => {
                let kind = self.lex_ampersand();
                self.finish(kind)
            },
            '|' => {
                let kind = self.lex_pipe();
                self.finish(kind)
            },
            '"' | '\'' => self.lex_string(),
            'f' if self.cursor.peek_char(1) == '"' => self.lex_fstring(),
            c if is_ascii_ident_start(c) => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_number(),
            '.' if self.cursor.peek_char(1).is_ascii_digit() => self.lex_number(),
            '.' => self.simple(TokenKind::Dot),
            c => {
                self.report_error(format!("unexpected character '{}'", c));
                self.cursor.advance();
                self.finish(TokenKind::Illegal)
            },
        }
    }

    /// Consumes a single fixed-width delimiter and wraps it as a token.
    fn simple(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.finish(kind)
    }

    /// Builds the final token from `token_start` to the cursor's current
    /// position, using the raw source slice as the literal.
    pub(crate) fn finish(&mut self, kind: TokenKind) -> Token {
        let literal = self.cursor.slice_from(self.token_start).to_string();
        self.finish_with(kind, literal)
    }

    /// Builds the final token with an explicit literal (used when the
    /// literal is a decoded value rather than the raw source slice, e.g.
    /// an escaped string body).
    pub(crate) fn finish_with(&mut self, kind: TokenKind, literal: String) -> Token {
        Token::new(kind, literal, self.end_position(kind))
    }

    /// Position of the token's final character. Column numbering is
    /// post-advance: the cursor's column counter points one past the last
    /// consumed character, so we report `column - 1`.
    fn end_position(&self, kind: TokenKind) -> Position {
        let line = self.cursor.line();
        let column = if kind == TokenKind::Eof {
            self.cursor.column()
        } else {
            self.cursor.column().saturating_sub(1).max(1)
        };
        Position::new(line, column)
    }

    /// Reports a lexical error spanning the current token.
    pub(crate) fn report_error(&self, message: String) {
        let span = Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        );
        self.handler.error(message, span);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
