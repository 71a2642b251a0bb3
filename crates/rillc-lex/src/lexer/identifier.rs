//! Identifier and keyword lexing.

use crate::token::{lookup_keyword, Token, TokenKind};
use crate::unicode::is_ascii_ident_continue;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword: a letter/underscore followed by
    /// alphanumerics/underscores, checked against the reserved word table.
    pub fn lex_identifier(&mut self) -> Token {
        while is_ascii_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start).to_string();
        let kind = lookup_keyword(&text).unwrap_or(TokenKind::Ident);
        self.finish_with(kind, text)
    }
}

#[cfg(test)]
mod tests {
    use rillc_util::Handler;

    use super::*;

    fn lex_ident(source: &str) -> Token {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.lex_identifier()
    }

    #[test]
    fn plain_identifier() {
        let token = lex_ident("foo");
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.literal, "foo");
    }

    #[test]
    fn identifier_with_underscore_and_digits() {
        let token = lex_ident("foo_bar_123");
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.literal, "foo_bar_123");
    }

    #[test]
    fn keywords_resolve_to_dedicated_kinds() {
        for (text, kind) in [
            ("let", TokenKind::Let),
            ("const", TokenKind::Const),
            ("if", TokenKind::If),
            ("elif", TokenKind::Elif),
            ("else", TokenKind::Else),
            ("while", TokenKind::While),
            ("for", TokenKind::For),
            ("fn", TokenKind::Fn),
            ("return", TokenKind::Return),
            ("break", TokenKind::Break),
            ("continue", TokenKind::Continue),
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("null", TokenKind::Null),
            ("class", TokenKind::Class),
            ("extends", TokenKind::Extends),
            ("super", TokenKind::Super),
            ("this", TokenKind::This),
            ("new", TokenKind::New),
        ] {
            assert_eq!(lex_ident(text).kind, kind, "keyword {}", text);
        }
    }

    #[test]
    fn identifier_that_merely_starts_with_a_keyword() {
        let token = lex_ident("letters");
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.literal, "letters");
    }
}
