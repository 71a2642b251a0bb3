//! Statement dispatch: one handler per leading keyword, falling through to
//! an expression statement (which covers plain expressions, assignment, and
//! compound assignment via `expr::parse_expression`).

use rillc_lex::TokenKind;

use crate::ast::{
    BlockStmt, ClassStmt, ForInit, ForStmt, LetStmt, MethodDef, ReturnStmt, Stmt, WhileStmt,
};
use crate::Parser;

impl<'a> Parser<'a> {
    pub fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.current_kind() {
            TokenKind::Let => self.parse_let_stmt(false),
            TokenKind::Const => self.parse_let_stmt(true),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Break => self.parse_break_stmt(),
            TokenKind::Continue => self.parse_continue_stmt(),
            TokenKind::Class => self.parse_class_stmt(),
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_let_stmt(&mut self, is_const: bool) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        let name = self.expect(TokenKind::Ident, "binding name")?;
        self.expect(TokenKind::Assign, "`=`")?;
        let value = self.parse_expression()?;
        self.skip_optional_semicolon();

        let stmt = LetStmt {
            name: name.literal,
            value,
            position,
        };
        Some(if is_const {
            Stmt::Const(stmt)
        } else {
            Stmt::Let(stmt)
        })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();

        let value = if self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RBrace)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.skip_optional_semicolon();

        Some(Stmt::Return(ReturnStmt { value, position }))
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        self.expect(TokenKind::LParen, "`(`")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;

        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;

        Some(Stmt::While(WhileStmt {
            condition,
            body: body?,
            position,
        }))
    }

    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        self.expect(TokenKind::LParen, "`(`")?;

        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else if self.check(TokenKind::Let) {
            let Stmt::Let(let_stmt) = self.parse_let_stmt(false)? else {
                unreachable!("parse_let_stmt(false) always returns Stmt::Let");
            };
            Some(Box::new(ForInit::Let(let_stmt)))
        } else {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            Some(Box::new(ForInit::Expr(expr)))
        };

        let condition = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        let update = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;

        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;

        Some(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body: body?,
            position,
        }))
    }

    fn parse_break_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        if self.loop_depth == 0 {
            self.error_at("`break` outside of a loop", position);
        }
        self.skip_optional_semicolon();
        Some(Stmt::Break(position))
    }

    fn parse_continue_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        if self.loop_depth == 0 {
            self.error_at("`continue` outside of a loop", position);
        }
        self.skip_optional_semicolon();
        Some(Stmt::Continue(position))
    }

    fn parse_class_stmt(&mut self) -> Option<Stmt> {
        let position = self.current_position();
        self.advance();
        let name = self.expect(TokenKind::Ident, "class name")?.literal;

        let parent = if self.match_kind(TokenKind::Extends) {
            Some(self.expect(TokenKind::Ident, "parent class name")?.literal)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "`{`")?;

        let mut constructor = None;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let method = self.parse_method_def()?;
            if method.name == "constructor" {
                constructor = Some(method);
            } else {
                methods.push(method);
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;

        Some(Stmt::Class(ClassStmt {
            name,
            parent,
            constructor,
            methods,
            position,
        }))
    }

    fn parse_method_def(&mut self) -> Option<MethodDef> {
        let position = self.current_position();
        let name = self.expect(TokenKind::Ident, "method name")?.literal;
        self.expect(TokenKind::LParen, "`(`")?;
        let params = self.parse_param_list()?;

        // Same reasoning as function literals: a method body is never
        // inside the loop (if any) that lexically surrounds the class.
        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.parse_block();
        self.loop_depth = outer_loop_depth;

        Some(MethodDef {
            name,
            params,
            body: body?,
            position,
        })
    }

    pub(crate) fn parse_block(&mut self) -> Option<BlockStmt> {
        let position = self.current_position();
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_stmt() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize_in_block(),
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;

        Some(BlockStmt {
            statements,
            position,
        })
    }

    /// Like the top-level `synchronize`, but also stops at a closing `}` so
    /// recovery never escapes the block being parsed.
    fn synchronize_in_block(&mut self) {
        if self.is_at_end() || self.check(TokenKind::RBrace) {
            return;
        }
        self.advance();
        while !self.is_at_end() && !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if crate::STATEMENT_STARTS.contains(&self.current_kind()) {
                return;
            }
            self.advance();
        }
    }

    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        self.skip_optional_semicolon();
        Some(Stmt::Expr(expr))
    }
}
