//! Operator and punctuation lexing: one sub-lexer per leading character,
//! each doing its own greedy longest-match against the following character.

use crate::token::TokenKind;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// `+`, `+=`
    pub fn lex_plus(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    /// `-`, `-=`
    pub fn lex_minus(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    /// `*`, `*=`
    pub fn lex_star(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::StarEq
        } else {
            TokenKind::Star
        }
    }

    /// `/`, `//` (floor division), `/=`. Line and block comments are
    /// stripped earlier by `skip_whitespace_and_comments`, so a bare `/`
    /// reaching here is always the division operator.
    pub fn lex_slash(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('/') {
            TokenKind::SlashSlash
        } else if self.cursor.match_char('=') {
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    /// `%`, `%=`
    pub fn lex_percent(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    /// `=`, `==`
    pub fn lex_equals(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::Eq
        } else {
            TokenKind::Assign
        }
    }

    /// `!`, `!=`
    pub fn lex_bang(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::NotEq
        } else {
            TokenKind::Bang
        }
    }

    /// `<`, `<=`, `<<`
    pub fn lex_less(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::LtEq
        } else if self.cursor.match_char('<') {
            TokenKind::Shl
        } else {
            TokenKind::Lt
        }
    }

    /// `>`, `>=`, `>>`
    pub fn lex_greater(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::GtEq
        } else if self.cursor.match_char('>') {
            TokenKind::Shr
        } else {
            TokenKind::Gt
        }
    }

    /// `&&`. A lone `&` is not a valid operator in this language.
    pub fn lex_ampersand(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            TokenKind::And
        } else {
            self.report_error("unexpected character '&'".to_string());
            TokenKind::Illegal
        }
    }

    /// `||`. A lone `|` is not a valid operator in this language.
    pub fn lex_pipe(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            TokenKind::Or
        } else {
            self.report_error("unexpected character '|'".to_string());
            TokenKind::Illegal
        }
    }
}

#[cfg(test)]
mod tests {
    use rillc_util::Handler;

    use super::*;
    use crate::Lexer;

    fn lex_op(source: &str) -> TokenKind {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.next_token().kind
    }

    #[test]
    fn arithmetic_operators() {
        assert_eq!(lex_op("+"), TokenKind::Plus);
        assert_eq!(lex_op("+="), TokenKind::PlusEq);
        assert_eq!(lex_op("-"), TokenKind::Minus);
        assert_eq!(lex_op("-="), TokenKind::MinusEq);
        assert_eq!(lex_op("*"), TokenKind::Star);
        assert_eq!(lex_op("*="), TokenKind::StarEq);
        assert_eq!(lex_op("/"), TokenKind::Slash);
        assert_eq!(lex_op("/="), TokenKind::SlashEq);
        assert_eq!(lex_op("//"), TokenKind::SlashSlash);
        assert_eq!(lex_op("%"), TokenKind::Percent);
        assert_eq!(lex_op("%="), TokenKind::PercentEq);
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(lex_op("="), TokenKind::Assign);
        assert_eq!(lex_op("=="), TokenKind::Eq);
        assert_eq!(lex_op("!"), TokenKind::Bang);
        assert_eq!(lex_op("!="), TokenKind::NotEq);
        assert_eq!(lex_op("<"), TokenKind::Lt);
        assert_eq!(lex_op("<="), TokenKind::LtEq);
        assert_eq!(lex_op(">"), TokenKind::Gt);
        assert_eq!(lex_op(">="), TokenKind::GtEq);
        assert_eq!(lex_op("<<"), TokenKind::Shl);
        assert_eq!(lex_op(">>"), TokenKind::Shr);
    }

    #[test]
    fn logical_operators_require_doubling() {
        assert_eq!(lex_op("&&"), TokenKind::And);
        assert_eq!(lex_op("||"), TokenKind::Or);

        let handler = Handler::new();
        let mut lexer = Lexer::new("&", &handler);
        assert_eq!(lexer.next_token().kind, TokenKind::Illegal);
        assert!(handler.has_errors());
    }

    #[test]
    fn floor_division_does_not_start_a_comment() {
        assert_eq!(lex_op("// 2"), TokenKind::SlashSlash);
    }
}
