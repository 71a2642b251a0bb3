//! AST node definitions.
//!
//! Every node carries the `Position` of the token it was parsed from, so
//! diagnostics and the evaluator's error reporting can always point back at
//! source. Nodes are produced once by the parser and never mutated.

use rillc_lex::Position;

/// A parsed program: a flat sequence of top-level statements.
pub type Program = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Const(LetStmt),
    Return(ReturnStmt),
    Expr(Expr),
    Block(BlockStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(Position),
    Continue(Position),
    Class(ClassStmt),
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::Let(s) | Stmt::Const(s) => s.position,
            Stmt::Return(s) => s.position,
            Stmt::Expr(e) => e.position(),
            Stmt::Block(b) => b.position,
            Stmt::While(s) => s.position,
            Stmt::For(s) => s.position,
            Stmt::Break(p) | Stmt::Continue(p) => *p,
            Stmt::Class(s) => s.position,
        }
    }
}

/// Shared shape of `let` and `const` (the latter only differs in mutability,
/// recorded by which `Stmt` variant wraps it).
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: String,
    pub value: Expr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub position: Position,
}

/// The initializer of a `for` loop is restricted to a `let` binding or a
/// bare expression statement; see DESIGN.md for why broader statement forms
/// are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Let(LetStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<ForInit>>,
    pub condition: Expr,
    pub update: Expr,
    pub body: BlockStmt,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: BlockStmt,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassStmt {
    pub name: String,
    pub parent: Option<String>,
    pub constructor: Option<MethodDef>,
    pub methods: Vec<MethodDef>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Ident),
    Prefix(PrefixExpr),
    Infix(InfixExpr),
    Boolean(bool, Position),
    Integer(i64, Position),
    Float(f64, Position),
    String(String, Position),
    FString(FStringExpr),
    Null(Position),
    ArrayLit(ArrayLit),
    HashLit(HashLit),
    FunctionLit(FunctionLit),
    If(IfExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Assign(AssignExpr),
    Property(PropertyExpr),
    New(NewExpr),
    This(Position),
    Super(SuperExpr),
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Identifier(i) => i.position,
            Expr::Prefix(e) => e.position,
            Expr::Infix(e) => e.position,
            Expr::Boolean(_, p) | Expr::Integer(_, p) | Expr::Float(_, p) | Expr::String(_, p) => {
                *p
            }
            Expr::FString(e) => e.position,
            Expr::Null(p) => *p,
            Expr::ArrayLit(e) => e.position,
            Expr::HashLit(e) => e.position,
            Expr::FunctionLit(e) => e.position,
            Expr::If(e) => e.position,
            Expr::Call(e) => e.position,
            Expr::Index(e) => e.position,
            Expr::Assign(e) => e.position,
            Expr::Property(e) => e.position,
            Expr::New(e) => e.position,
            Expr::This(p) => *p,
            Expr::Super(e) => e.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub op: PrefixOp,
    pub right: Box<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpr {
    pub left: Box<Expr>,
    pub op: InfixOp,
    pub right: Box<Expr>,
    pub position: Position,
}

/// `len(static_parts) == len(expressions) + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FStringExpr {
    pub static_parts: Vec<String>,
    pub expressions: Vec<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub elements: Vec<Expr>,
    pub position: Position,
}

/// Insertion-ordered key/value pairs; keys are always string-valued.
#[derive(Debug, Clone, PartialEq)]
pub struct HashLit {
    pub pairs: Vec<(Expr, Expr)>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub params: Vec<String>,
    pub body: BlockStmt,
    pub position: Position,
}

/// `len(conditions) == len(consequences) >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub conditions: Vec<Expr>,
    pub consequences: Vec<BlockStmt>,
    pub alternative: Option<BlockStmt>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub position: Position,
}

/// `target` is restricted to `Identifier`, `Index`, or `Property`; any other
/// shape is an assignment-target parse error (never constructed).
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpr {
    pub object: Box<Expr>,
    pub property: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub class: Box<Expr>,
    pub args: Vec<Expr>,
    pub position: Position,
}

/// `method` absent means a call to the parent constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperExpr {
    pub method: Option<String>,
    pub args: Vec<Expr>,
    pub position: Position,
}
