//! Lexical analysis: turns source text into a stream of [`Token`]s.
//!
//! The lexer is a single-pass, hand-written scanner built from a character
//! [`cursor::Cursor`] plus a dispatch table in [`lexer::Lexer::next_token`].
//! It never fails outright: lexical errors (unterminated strings, illegal
//! characters) are reported to a `rillc_util::Handler` and an `Illegal`
//! token is produced so the parser can recover and keep going.

pub mod cursor;
mod lexer;
pub mod token;
pub mod unicode;

pub use lexer::Lexer;
pub use token::{lookup_keyword, Position, Token, TokenKind};

#[cfg(test)]
mod tests {
    use rillc_util::Handler;

    use super::*;

    #[test]
    fn tokenizes_a_small_program() {
        let source = "fn add(a, b) { return a + b; }";
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        let kinds: Vec<TokenKind> = (&mut lexer).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn iterator_stops_at_eof_without_yielding_it() {
        let handler = Handler::new();
        let lexer = Lexer::new("let", &handler);
        let tokens: Vec<Token> = lexer.collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Let);
    }
}
