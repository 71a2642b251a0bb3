//! Syntactic analysis: turns a token stream into a [`Program`] AST.
//!
//! The parser pairs a **statement dispatch table** (one handler per leading
//! keyword, in [`stmt`]) with a **Pratt expression parser** (prefix/infix
//! dispatch keyed on [`TokenKind`], in [`expr`]). Like the lexer, it never
//! aborts on error: a failed statement is recorded on the `Handler` and the
//! parser resynchronizes at the next statement boundary so the rest of the
//! source is still checked.

pub mod ast;
mod expr;
mod fstring;
mod stmt;

use rillc_lex::{Lexer, Position, Token, TokenKind};
use rillc_util::{Handler, Span};

pub use ast::{Expr, Program, Stmt};

/// Keywords that begin a new top-level statement, used as resynchronization
/// points after a parse error.
const STATEMENT_STARTS: &[TokenKind] = &[
    TokenKind::Class,
    TokenKind::Let,
    TokenKind::Const,
    TokenKind::For,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Return,
];

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a Handler,
    loop_depth: usize,
}

/// Parses a complete source file, returning every statement the parser could
/// recover to produce. Errors are recorded on `handler`; check
/// `handler.has_errors()` to know whether the program is well-formed.
pub fn parse(source: &str, handler: &Handler) -> Program {
    let tokens: Vec<Token> = Lexer::new(source, handler).collect();
    let mut parser = Parser::new(tokens, handler);
    parser.parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            pos: 0,
            handler,
            loop_depth: 0,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.parse_stmt() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        statements
    }

    // -- token stream cursor -------------------------------------------

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn current_position(&self) -> Position {
        self.current().position
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Consumes and returns the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it matches `kind`.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` or reports an error and returns `None`.
    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error(format!(
                "expected {} ({:?}), found {:?}",
                context,
                kind,
                self.current_kind()
            ));
            None
        }
    }

    /// Consumes an optional trailing `;`, per the grammar's liberal use of
    /// `';'?` at statement ends.
    pub(crate) fn skip_optional_semicolon(&mut self) {
        self.match_kind(TokenKind::Semicolon);
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        let position = self.current_position();
        self.handler
            .error(message, Span::point(position.line, position.column));
    }

    pub(crate) fn error_at(&self, message: impl Into<String>, position: Position) {
        self.handler
            .error(message, Span::point(position.line, position.column));
    }

    /// Skips tokens until a statement terminator or the start of a new
    /// top-level statement, so one bad statement doesn't cascade into
    /// spurious follow-on errors.
    fn synchronize(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.advance();
        while !self.is_at_end() {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if STATEMENT_STARTS.contains(&self.current_kind()) {
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Program {
        let handler = Handler::new();
        let program = parse(source, &handler);
        assert!(!handler.has_errors(), "unexpected parse errors in {:?}", source);
        program
    }

    #[test]
    fn parses_empty_program() {
        let program = parse_ok("");
        assert!(program.is_empty());
    }

    #[test]
    fn recovers_after_a_bad_statement() {
        let handler = Handler::new();
        let program = parse("let; let y = 2;", &handler);
        assert!(handler.has_errors());
        assert_eq!(program.len(), 1);
        assert!(matches!(program[0], Stmt::Let(_)));
    }

    #[test]
    fn parses_a_small_program() {
        let program = parse_ok("let x = 1; let y = 2; return x + y;");
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn break_inside_a_function_nested_in_a_loop_is_still_an_error() {
        let handler = Handler::new();
        parse("while (true) { let f = fn() { break; }; f(); break; }", &handler);
        assert!(handler.has_errors());
    }

    #[test]
    fn continue_inside_a_method_nested_in_a_loop_is_still_an_error() {
        let handler = Handler::new();
        parse(
            "while (true) { class C { m() { continue; } } break; }",
            &handler,
        );
        assert!(handler.has_errors());
    }

    #[test]
    fn break_is_fine_once_the_loop_resumes_after_a_nested_function() {
        let program = parse_ok("while (true) { let f = fn() { return 1; }; f(); break; }");
        assert_eq!(program.len(), 1);
    }
}
