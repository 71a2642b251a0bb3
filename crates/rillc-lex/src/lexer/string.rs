//! String literal lexing.
//!
//! A string is delimited by either `"` or `'`; whichever opens it must also
//! close it. Escape sequences are resolved eagerly so the token's literal is
//! already the decoded string value.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a `"..."` or `'...'` string literal, resolving escapes as it goes.
    pub fn lex_string(&mut self) -> Token {
        let quote = self.cursor.current_char();
        self.cursor.advance();

        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() {
                self.report_error("unterminated string literal".to_string());
                break;
            }

            let c = self.cursor.current_char();

            if c == quote {
                self.cursor.advance();
                break;
            }

            if c == '\n' {
                self.report_error("unterminated string literal".to_string());
                break;
            }

            if c == '\\' {
                self.cursor.advance();
                if let Some(escaped) = self.parse_escape() {
                    content.push(escaped);
                }
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        self.finish_with(TokenKind::Str, content)
    }

    /// Resolves a single escape sequence: `\n \t \r \f \b \' \" \\`.
    pub fn parse_escape(&mut self) -> Option<char> {
        if self.cursor.is_at_end() {
            self.report_error("unterminated escape sequence".to_string());
            return None;
        }

        let c = self.cursor.current_char();
        self.cursor.advance();

        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'f' => Some('\u{000C}'),
            'b' => Some('\u{0008}'),
            '\'' => Some('\''),
            '"' => Some('"'),
            '\\' => Some('\\'),
            _ => {
                self.report_error(format!("unknown escape sequence: \\{}", c));
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rillc_util::Handler;

    use super::*;

    fn lex_str(source: &str) -> Token {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.lex_string()
    }

    #[test]
    fn double_quoted_string() {
        let token = lex_str("\"hello\"");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.literal, "hello");
    }

    #[test]
    fn single_quoted_string() {
        let token = lex_str("'hello'");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.literal, "hello");
    }

    #[test]
    fn newline_and_tab_escapes() {
        let token = lex_str("\"a\\nb\\tc\"");
        assert_eq!(token.literal, "a\nb\tc");
    }

    #[test]
    fn form_feed_and_backspace_escapes() {
        let token = lex_str("\"a\\fb\\bc\"");
        assert_eq!(token.literal, "a\u{000C}b\u{0008}c");
    }

    #[test]
    fn escaped_quote_matching_the_delimiter() {
        let token = lex_str("\"say \\\"hi\\\"\"");
        assert_eq!(token.literal, "say \"hi\"");
    }

    #[test]
    fn unterminated_string_reports_error() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("\"no closing quote", &handler);
        lexer.lex_string();
        assert!(handler.has_errors());
    }

    #[test]
    fn string_cannot_span_a_newline() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("\"broken\nstring\"", &handler);
        lexer.lex_string();
        assert!(handler.has_errors());
    }
}
