//! Comment skipping: line comments and nested block comments.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips a nested `/* ... */` block comment. Assumes the cursor sits on
    /// the opening `/`.
    pub fn skip_block_comment(&mut self) {
        const MAX_COMMENT_DEPTH: u32 = 100;

        self.cursor.advance();
        self.cursor.advance();
        let mut depth = 1;

        while depth > 0 && !self.cursor.is_at_end() {
            if depth > MAX_COMMENT_DEPTH {
                self.report_error(format!(
                    "block comment nesting too deep (maximum is {} levels)",
                    MAX_COMMENT_DEPTH
                ));
                return;
            }

            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }

        if depth > 0 {
            self.report_error("unterminated block comment".to_string());
        }
    }

    /// Skips whitespace, `#` line comments, and `/* */` block comments.
    /// Called before lexing each token.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.cursor.is_at_end() {
                return;
            }

            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                },
                '#' => self.skip_line_comment(),
                '/' if self.cursor.peek_char(1) == '*' => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    /// Skips a line comment, from `#` to end of line.
    fn skip_line_comment(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use rillc_util::Handler;

    use crate::token::TokenKind;
    use crate::Lexer;

    fn next_kind(source: &str) -> TokenKind {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.next_token().kind
    }

    #[test]
    fn skips_leading_whitespace() {
        assert_eq!(next_kind("   hello"), TokenKind::Ident);
    }

    #[test]
    fn skips_hash_line_comment() {
        assert_eq!(next_kind("# comment\nhello"), TokenKind::Ident);
    }

    #[test]
    fn skips_block_comment() {
        assert_eq!(next_kind("/* comment */hello"), TokenKind::Ident);
    }

    #[test]
    fn skips_nested_block_comment() {
        assert_eq!(next_kind("/* outer /* inner */ outer */hello"), TokenKind::Ident);
    }

    #[test]
    fn reports_unterminated_block_comment() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("/* never closed", &handler);
        lexer.next_token();
        assert!(handler.has_errors());
    }
}
