//! Number literal lexing: decimal integers and floats, including floats
//! with a leading or trailing dot and a scientific-notation exponent.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an integer or float literal.
    ///
    /// Formats: `42`, `3.14`, `.5`, `5.`, `1e10`, `2.5e-3`. Only decimal
    /// digits are recognized; there is no hex/octal/binary literal syntax.
    pub fn lex_number(&mut self) -> Token {
        let mut is_float = false;

        if self.cursor.current_char() == '.' {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        } else {
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }

            if self.cursor.current_char() == '.' {
                is_float = true;
                self.cursor.advance();
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            }
        }

        if self.cursor.current_char() == 'e' || self.cursor.current_char() == 'E' {
            let snapshot = self.cursor.snapshot();
            self.cursor.advance();
            if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                self.cursor.advance();
            }
            if self.cursor.current_char().is_ascii_digit() {
                is_float = true;
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            } else {
                self.report_error("no digits in float exponent".to_string());
                self.cursor.restore(snapshot);
            }
        }

        let literal = self.cursor.slice_from(self.token_start).to_string();
        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        self.finish_with(kind, literal)
    }
}
