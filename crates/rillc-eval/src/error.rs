//! Runtime error taxonomy and rendering.
//!
//! Mirrors the parser/lexer's use of `rillc_util`'s diagnostic machinery:
//! a tagged `thiserror` enum carries the message text, `RuntimeError`
//! additionally carries position, an optional stack snapshot, and renders
//! through `DiagnosticBuilder`/`SourceSnippet` rather than ad hoc
//! `Display` formatting.

use rillc_lex::Position;
use rillc_util::{DiagnosticBuilder, DiagnosticCode, Handler, SourceSnippet, Span};
use thiserror::Error;

use crate::stack::Frame;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("expected {expected} argument(s), got {got}")]
    ArgumentCountMismatch { expected: String, got: usize },
    #[error("argument type mismatch: {0}")]
    ArgumentTypeMismatch(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot assign to constant '{0}'")]
    ConstantReassignment(String),
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("class '{0}' is already defined")]
    ClassAlreadyDefined(String),
    #[error("parent class '{0}' not found")]
    ParentClassNotFound(String),
    #[error("'{0}' is not a class")]
    NotAClass(String),
    #[error("circular inheritance involving class '{0}'")]
    CircularInheritance(String),
    #[error("property '{0}' not found")]
    PropertyNotFound(String),
    #[error("'this' is not available outside a method")]
    ThisNotAvailable,
    #[error("'super' used outside a method")]
    SuperNotInMethod,
    #[error("class '{0}' has no parent class")]
    SuperNoParent(String),
    #[error("'{0}' is not instantiable")]
    NotInstantiable(String),
    #[error("constructor expects {expected} argument(s), got {got}")]
    ConstructorArityMismatch { expected: usize, got: usize },
    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),
    #[error("loop exceeded maximum iteration count of {0}")]
    MaxIterationsExceeded(usize),
    #[error("{0}")]
    NotCallable(String),
    #[error("'{0}' is already declared in this scope")]
    NameAlreadyBound(String),
    #[error("`{0}` outside of a loop")]
    LoopControlOutsideLoop(&'static str),
}

impl ErrorKind {
    fn code(&self) -> DiagnosticCode {
        match self {
            ErrorKind::IdentifierNotFound(_) => DiagnosticCode::E_RUNTIME_NAME_ERROR,
            ErrorKind::ArgumentCountMismatch { .. } | ErrorKind::ConstructorArityMismatch { .. } => {
                DiagnosticCode::E_RUNTIME_ARITY
            }
            ErrorKind::ArgumentTypeMismatch(_) | ErrorKind::TypeMismatch(_) => {
                DiagnosticCode::E_RUNTIME_TYPE_MISMATCH
            }
            ErrorKind::IndexOutOfBounds(_) => DiagnosticCode::E_RUNTIME_INDEX,
            ErrorKind::DivisionByZero => DiagnosticCode::E_RUNTIME_DIV_BY_ZERO,
            ErrorKind::ConstantReassignment(_) => DiagnosticCode::E_RUNTIME_CONST_ASSIGN,
            ErrorKind::InvalidAssignmentTarget => DiagnosticCode::E_RUNTIME_BAD_ASSIGN_TARGET,
            ErrorKind::ClassAlreadyDefined(_)
            | ErrorKind::ParentClassNotFound(_)
            | ErrorKind::NotAClass(_)
            | ErrorKind::CircularInheritance(_) => DiagnosticCode::E_RUNTIME_CLASS,
            ErrorKind::PropertyNotFound(_) => DiagnosticCode::E_RUNTIME_PROPERTY,
            ErrorKind::ThisNotAvailable => DiagnosticCode::E_RUNTIME_THIS,
            ErrorKind::SuperNotInMethod | ErrorKind::SuperNoParent(_) => {
                DiagnosticCode::E_RUNTIME_SUPER
            }
            ErrorKind::NotInstantiable(_) | ErrorKind::NotCallable(_) => {
                DiagnosticCode::E_RUNTIME_NOT_CALLABLE
            }
            ErrorKind::StackOverflow(_) => DiagnosticCode::E_RUNTIME_STACK_OVERFLOW,
            ErrorKind::MaxIterationsExceeded(_) => DiagnosticCode::E_RUNTIME_MAX_ITERATIONS,
            ErrorKind::NameAlreadyBound(_) => DiagnosticCode::E_RUNTIME_ALREADY_BOUND,
            ErrorKind::LoopControlOutsideLoop(_) => DiagnosticCode::E_RUNTIME_LOOP_CONTROL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub position: Position,
    pub stack: Vec<Frame>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        Self {
            kind,
            position,
            stack: Vec::new(),
        }
    }

    pub fn with_stack(mut self, stack: Vec<Frame>) -> Self {
        self.stack = stack;
        self
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Renders the error through the shared `DiagnosticBuilder`, with the
    /// source line as a snippet and the stack trace (if any) as notes.
    pub fn emit(&self, handler: &Handler, source_line: &str) {
        let mut builder = DiagnosticBuilder::error(self.message())
            .code(self.kind.code())
            .span(Span::point(self.position.line, self.position.column))
            .snippet(SourceSnippet::point(
                source_line,
                self.position.line as usize,
                self.position.column as usize,
            ));

        for frame in self.stack.iter().rev() {
            builder = builder.note(format!(
                "in {} at {}:{}",
                frame.name, frame.position.line, frame.position.column
            ));
        }
        builder = builder.note("in <global>");

        builder.emit(handler);
    }
}
