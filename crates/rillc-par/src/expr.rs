//! Pratt expression parsing: prefix dispatch for atoms/unary operators,
//! infix dispatch (looped while the next token's precedence beats the
//! current minimum) for binary operators, calls, indexing, and property
//! access.

use rillc_lex::TokenKind;

use crate::ast::{
    ArrayLit, AssignExpr, CallExpr, Expr, FunctionLit, HashLit, Ident, IfExpr, IndexExpr, InfixExpr,
    InfixOp, NewExpr, PrefixExpr, PrefixOp, PropertyExpr, SuperExpr,
};
use crate::Parser;

/// Binding power levels, lowest to highest. Only relative order matters.
#[doc(hidden)]
pub mod bp {
    pub const LOWEST: u8 = 0;
    pub const LOGICAL_OR: u8 = 1;
    pub const LOGICAL_AND: u8 = 2;
    pub const EQUALS: u8 = 3;
    pub const LESS_GREATER: u8 = 4;
    pub const SUM: u8 = 5;
    pub const PRODUCT: u8 = 6;
    pub const PREFIX: u8 = 7;
    pub const CALL: u8 = 8;
    pub const INDEX: u8 = 9;
}

fn infix_precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Or => bp::LOGICAL_OR,
        TokenKind::And => bp::LOGICAL_AND,
        TokenKind::Eq | TokenKind::NotEq => bp::EQUALS,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => bp::LESS_GREATER,
        TokenKind::Plus | TokenKind::Minus => bp::SUM,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::SlashSlash => {
            bp::PRODUCT
        }
        TokenKind::LParen => bp::CALL,
        TokenKind::LBracket | TokenKind::Dot => bp::INDEX,
        _ => bp::LOWEST,
    }
}

/// `+= -= *= /= %=` desugar to `lhs = lhs <op> rhs` at parse time.
fn compound_assign_op(kind: TokenKind) -> Option<InfixOp> {
    Some(match kind {
        TokenKind::PlusEq => InfixOp::Add,
        TokenKind::MinusEq => InfixOp::Sub,
        TokenKind::StarEq => InfixOp::Mul,
        TokenKind::SlashEq => InfixOp::Div,
        TokenKind::PercentEq => InfixOp::Mod,
        _ => return None,
    })
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    Some(match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Star => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::SlashSlash => InfixOp::FloorDiv,
        TokenKind::Percent => InfixOp::Mod,
        TokenKind::Eq => InfixOp::Eq,
        TokenKind::NotEq => InfixOp::NotEq,
        TokenKind::Lt => InfixOp::Lt,
        TokenKind::Gt => InfixOp::Gt,
        TokenKind::LtEq => InfixOp::LtEq,
        TokenKind::GtEq => InfixOp::GtEq,
        TokenKind::And => InfixOp::And,
        TokenKind::Or => InfixOp::Or,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Top-level expression entry point. Parses at `bp::LOWEST`, then
    /// handles a trailing `=` as an assignment wrapping around the parsed
    /// left-hand side, per the left-to-right assignment transform.
    pub fn parse_expression(&mut self) -> Option<Expr> {
        let left = self.parse_expr_bp(bp::LOWEST)?;

        if self.check(TokenKind::Assign) {
            let position = self.current_position();
            self.advance();
            if !matches!(left, Expr::Identifier(_) | Expr::Index(_) | Expr::Property(_)) {
                self.error_at("invalid assignment target", left.position());
                return None;
            }
            let value = self.parse_expression()?;
            return Some(Expr::Assign(AssignExpr {
                target: Box::new(left),
                value: Box::new(value),
                position,
            }));
        }

        if let Some(op) = compound_assign_op(self.current_kind()) {
            let position = self.current_position();
            self.advance();
            if !matches!(left, Expr::Identifier(_) | Expr::Index(_) | Expr::Property(_)) {
                self.error_at("invalid assignment target", left.position());
                return None;
            }
            let rhs = self.parse_expression()?;
            let combined = Expr::Infix(InfixExpr {
                left: Box::new(left.clone()),
                op,
                right: Box::new(rhs),
                position,
            });
            return Some(Expr::Assign(AssignExpr {
                target: Box::new(left),
                value: Box::new(combined),
                position,
            }));
        }

        Some(left)
    }

    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::Eof)
            && min_bp < infix_precedence(self.current_kind())
        {
            left = match self.current_kind() {
                TokenKind::LParen => self.parse_call(left)?,
                TokenKind::LBracket => self.parse_index(left)?,
                TokenKind::Dot => self.parse_property(left)?,
                _ => self.parse_infix(left)?,
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.current_kind() {
            TokenKind::Ident => {
                let token = self.advance();
                Some(Expr::Identifier(Ident {
                    name: token.literal,
                    position: token.position,
                }))
            }
            TokenKind::Int => {
                let token = self.advance();
                match token.literal.parse::<i64>() {
                    Ok(value) => Some(Expr::Integer(value, token.position)),
                    Err(_) => {
                        self.error_at(
                            format!("integer literal out of range: {}", token.literal),
                            token.position,
                        );
                        None
                    }
                }
            }
            TokenKind::Float => {
                let token = self.advance();
                match token.literal.parse::<f64>() {
                    Ok(value) => Some(Expr::Float(value, token.position)),
                    Err(_) => {
                        self.error_at(
                            format!("malformed float literal: {}", token.literal),
                            token.position,
                        );
                        None
                    }
                }
            }
            TokenKind::Str => {
                let token = self.advance();
                Some(Expr::String(token.literal, token.position))
            }
            TokenKind::FString => {
                let token = self.advance();
                Some(Expr::FString(self.parse_fstring_body(
                    &token.literal,
                    token.position,
                )))
            }
            TokenKind::True => {
                let token = self.advance();
                Some(Expr::Boolean(true, token.position))
            }
            TokenKind::False => {
                let token = self.advance();
                Some(Expr::Boolean(false, token.position))
            }
            TokenKind::Null => {
                let token = self.advance();
                Some(Expr::Null(token.position))
            }
            TokenKind::This => {
                let token = self.advance();
                Some(Expr::This(token.position))
            }
            TokenKind::Bang => self.parse_prefix_op(PrefixOp::Not),
            TokenKind::Minus => self.parse_prefix_op(PrefixOp::Neg),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Fn => self.parse_function_literal(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::New => self.parse_new_expr(),
            TokenKind::Super => self.parse_super_expr(),
            other => {
                self.error(format!("no prefix parse function for {:?}", other));
                None
            }
        }
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let right = self.parse_expr_bp(bp::PREFIX)?;
        Some(Expr::Prefix(PrefixExpr {
            op,
            right: Box::new(right),
            position,
        }))
    }

    fn parse_grouped(&mut self) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;
        Some(expr)
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let elements = self.parse_expr_list(TokenKind::RBracket)?;
        Some(Expr::ArrayLit(ArrayLit { elements, position }))
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let mut pairs = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let key = self.parse_expression()?;
            self.expect(TokenKind::Colon, "`:`")?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Some(Expr::HashLit(HashLit { pairs, position }))
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        self.expect(TokenKind::LParen, "`(`")?;
        let params = self.parse_param_list()?;

        // A function body starts its own loop nesting: `break`/`continue`
        // from an enclosing loop must not parse as valid inside it.
        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.parse_block();
        self.loop_depth = outer_loop_depth;

        Some(Expr::FunctionLit(FunctionLit {
            params,
            body: body?,
            position,
        }))
    }

    fn parse_if_expr(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();

        let mut conditions = Vec::new();
        let mut consequences = Vec::new();

        self.expect(TokenKind::LParen, "`(`")?;
        conditions.push(self.parse_expression()?);
        self.expect(TokenKind::RParen, "`)`")?;
        consequences.push(self.parse_block()?);

        while self.check(TokenKind::Elif) {
            self.advance();
            self.expect(TokenKind::LParen, "`(`")?;
            conditions.push(self.parse_expression()?);
            self.expect(TokenKind::RParen, "`)`")?;
            consequences.push(self.parse_block()?);
        }

        let alternative = if self.match_kind(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Some(Expr::If(IfExpr {
            conditions,
            consequences,
            alternative,
            position,
        }))
    }

    fn parse_new_expr(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        // Parse below CALL so a trailing `(...)` is consumed as the
        // constructor call rather than left dangling.
        let class = self.parse_expr_bp(bp::PREFIX)?;
        let (class, args) = if let Expr::Call(call) = class {
            (*call.callee, call.args)
        } else {
            (class, Vec::new())
        };
        Some(Expr::New(NewExpr {
            class: Box::new(class),
            args,
            position,
        }))
    }

    fn parse_super_expr(&mut self) -> Option<Expr> {
        let position = self.current_position();
        self.advance();

        let method = if self.match_kind(TokenKind::Dot) {
            let name = self.expect(TokenKind::Ident, "method name")?;
            Some(name.literal)
        } else {
            None
        };

        self.expect(TokenKind::LParen, "`(`")?;
        let args = self.parse_expr_list(TokenKind::RParen)?;
        Some(Expr::Super(SuperExpr {
            method,
            args,
            position,
        }))
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let position = self.current_position();
        let kind = self.current_kind();
        let precedence = infix_precedence(kind);
        self.advance();
        let op = infix_op(kind)?;
        let right = self.parse_expr_bp(precedence)?;
        Some(Expr::Infix(InfixExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
            position,
        }))
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let args = self.parse_expr_list(TokenKind::RParen)?;
        Some(Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
            position,
        }))
    }

    fn parse_index(&mut self, target: Expr) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let index = self.parse_expression()?;
        self.expect(TokenKind::RBracket, "`]`")?;
        Some(Expr::Index(IndexExpr {
            target: Box::new(target),
            index: Box::new(index),
            position,
        }))
    }

    fn parse_property(&mut self, object: Expr) -> Option<Expr> {
        let position = self.current_position();
        self.advance();
        let name = self.expect(TokenKind::Ident, "property name")?;
        Some(Expr::Property(PropertyExpr {
            object: Box::new(object),
            property: name.literal,
            position,
        }))
    }

    /// Parses a comma-separated expression list terminated by `end`.
    fn parse_expr_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if self.check(end) {
            self.advance();
            return Some(items);
        }
        items.push(self.parse_expression()?);
        while self.match_kind(TokenKind::Comma) {
            items.push(self.parse_expression()?);
        }
        self.expect(end, "closing delimiter")?;
        Some(items)
    }

    /// Parses a comma-separated parameter-name list terminated by `)`.
    pub(crate) fn parse_param_list(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            self.advance();
            return Some(params);
        }
        let first = self.expect(TokenKind::Ident, "parameter name")?;
        params.push(first.literal);
        while self.match_kind(TokenKind::Comma) {
            let param = self.expect(TokenKind::Ident, "parameter name")?;
            params.push(param.literal);
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use rillc_util::Handler;

    fn parse_expr(source: &str) -> (Option<Expr>, Handler) {
        let handler = Handler::new();
        let tokens: Vec<_> = rillc_lex::Lexer::new(source, &handler).collect();
        let mut parser = Parser::new(tokens, &handler);
        (parser.parse_expression(), handler)
    }

    fn assert_infix(expr: &Expr, op: InfixOp) {
        match expr {
            Expr::Infix(i) => assert_eq!(i.op, op),
            _ => panic!("expected infix expression, got {:?}", expr),
        }
    }

    #[test]
    fn integer_and_float_literals() {
        let (expr, handler) = parse_expr("42");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Integer(42, _))));

        let (expr, handler) = parse_expr("3.5");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Float(f, _)) if (f - 3.5).abs() < 1e-9));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (expr, handler) = parse_expr("a + b * c");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_infix(&expr, InfixOp::Add);
        if let Expr::Infix(i) = &expr {
            assert_infix(&i.right, InfixOp::Mul);
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        let (expr, handler) = parse_expr("a - b - c");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_infix(&expr, InfixOp::Sub);
        if let Expr::Infix(i) = &expr {
            assert_infix(&i.left, InfixOp::Sub);
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let (expr, handler) = parse_expr("a && b || c");
        assert!(!handler.has_errors());
        assert_infix(&expr.unwrap(), InfixOp::Or);
    }

    #[test]
    fn unary_minus_binds_tighter_than_addition() {
        let (expr, handler) = parse_expr("-a + b");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_infix(&expr, InfixOp::Add);
        if let Expr::Infix(i) = &expr {
            assert!(matches!(*i.left, Expr::Prefix(_)));
        }
    }

    #[test]
    fn call_binds_tighter_than_addition() {
        let (expr, handler) = parse_expr("foo(a) + 1");
        assert!(!handler.has_errors());
        assert_infix(&expr.unwrap(), InfixOp::Add);
    }

    #[test]
    fn call_with_args() {
        let (expr, handler) = parse_expr("foo(1, 2, 3)");
        assert!(!handler.has_errors());
        if let Some(Expr::Call(c)) = expr {
            assert_eq!(c.args.len(), 3);
        } else {
            panic!("expected call expression");
        }
    }

    #[test]
    fn chained_index_and_property() {
        let (expr, handler) = parse_expr("obj.list[0].name");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Property(_))));
    }

    #[test]
    fn assignment_to_identifier() {
        let (expr, handler) = parse_expr("x = 5");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Assign(_))));
    }

    #[test]
    fn assignment_to_index() {
        let (expr, handler) = parse_expr("arr[0] = 5");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Assign(_))));
    }

    #[test]
    fn assignment_target_must_be_a_place() {
        let (_expr, handler) = parse_expr("1 + 2 = 3");
        assert!(handler.has_errors());
    }

    #[test]
    fn array_literal() {
        let (expr, handler) = parse_expr("[1, 2, 3]");
        assert!(!handler.has_errors());
        if let Some(Expr::ArrayLit(a)) = expr {
            assert_eq!(a.elements.len(), 3);
        } else {
            panic!("expected array literal");
        }
    }

    #[test]
    fn empty_array_literal() {
        let (expr, handler) = parse_expr("[]");
        assert!(!handler.has_errors());
        if let Some(Expr::ArrayLit(a)) = expr {
            assert!(a.elements.is_empty());
        } else {
            panic!("expected array literal");
        }
    }

    #[test]
    fn hash_literal() {
        let (expr, handler) = parse_expr("{\"a\": 1, \"b\": 2}");
        assert!(!handler.has_errors());
        if let Some(Expr::HashLit(h)) = expr {
            assert_eq!(h.pairs.len(), 2);
        } else {
            panic!("expected hash literal");
        }
    }

    #[test]
    fn if_expression_with_elif_and_else() {
        let (expr, handler) = parse_expr("if (a) { 1 } elif (b) { 2 } else { 3 }");
        assert!(!handler.has_errors());
        if let Some(Expr::If(i)) = expr {
            assert_eq!(i.conditions.len(), 2);
            assert_eq!(i.consequences.len(), 2);
            assert!(i.alternative.is_some());
        } else {
            panic!("expected if expression");
        }
    }

    #[test]
    fn function_literal() {
        let (expr, handler) = parse_expr("fn(a, b) { return a + b; }");
        assert!(!handler.has_errors());
        if let Some(Expr::FunctionLit(f)) = expr {
            assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
        } else {
            panic!("expected function literal");
        }
    }

    #[test]
    fn new_expression() {
        let (expr, handler) = parse_expr("new Circle(1, 2)");
        assert!(!handler.has_errors());
        if let Some(Expr::New(n)) = expr {
            assert_eq!(n.args.len(), 2);
        } else {
            panic!("expected new expression");
        }
    }

    #[test]
    fn super_constructor_call() {
        let (expr, handler) = parse_expr("super(1)");
        assert!(!handler.has_errors());
        if let Some(Expr::Super(s)) = expr {
            assert!(s.method.is_none());
        } else {
            panic!("expected super expression");
        }
    }

    #[test]
    fn super_method_call() {
        let (expr, handler) = parse_expr("super.area()");
        assert!(!handler.has_errors());
        if let Some(Expr::Super(s)) = expr {
            assert_eq!(s.method.as_deref(), Some("area"));
        } else {
            panic!("expected super expression");
        }
    }

    #[test]
    fn floor_division_and_modulo_at_product_precedence() {
        let (expr, handler) = parse_expr("a + b // c % d");
        assert!(!handler.has_errors());
        assert_infix(&expr.unwrap(), InfixOp::Add);
    }

    #[test]
    fn compound_assignment_desugars_to_assign_of_infix() {
        let (expr, handler) = parse_expr("a += 1");
        assert!(!handler.has_errors());
        if let Some(Expr::Assign(a)) = expr {
            assert!(matches!(*a.target, Expr::Identifier(_)));
            assert_infix(&a.value, InfixOp::Add);
        } else {
            panic!("expected assignment expression");
        }
    }

    #[test]
    fn missing_operand_reports_error() {
        let (_expr, handler) = parse_expr("1 +");
        assert!(handler.has_errors());
    }
}
