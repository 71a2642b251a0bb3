//! Tree-walking evaluator for parsed programs.
//!
//! Mirrors the embedding contract described by the language's external
//! interface: `evaluate(program, env)` runs a parsed [`rillc_par::ast::Program`]
//! against an [`Environment`], with builtins pre-registered and resource
//! bounds (max loop iterations, max call-stack depth) configurable via
//! [`EvalConfig`].

pub mod builtins;
pub mod environment;
pub mod error;
pub mod stack;
pub mod value;

mod evaluator;

use std::cell::RefCell;
use std::rc::Rc;

use rillc_par::ast::Program;

pub use environment::Environment;
pub use error::{ErrorKind, RuntimeError};
pub use evaluator::{EvalConfig, Evaluator};
pub use stack::{CallStack, Frame, FrameKind};
pub use value::Value;

/// Creates a fresh global environment. The evaluator consults its own
/// builtin registry only after a plain scope lookup misses here, so
/// builtins never need to be pre-declared into this environment.
pub fn new_environment(parent: Option<&Rc<RefCell<Environment>>>) -> Rc<RefCell<Environment>> {
    match parent {
        Some(p) => Environment::child(p),
        None => Environment::new(),
    }
}

/// Evaluates a parsed program against `env` using default resource bounds.
pub fn evaluate(program: &Program, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
    Evaluator::new(EvalConfig::default()).eval_program(program, env)
}

/// Evaluates a parsed program against `env` with caller-supplied resource
/// bounds, for embedding contexts that configure these from a CLI flag or
/// config file.
pub fn evaluate_with_config(
    program: &Program,
    env: &Rc<RefCell<Environment>>,
    config: EvalConfig,
) -> Result<Value, RuntimeError> {
    Evaluator::new(config).eval_program(program, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_par::parse;
    use rillc_util::Handler;

    fn run(source: &str) -> Value {
        let handler = Handler::new();
        let program = parse(source, &handler);
        assert!(!handler.has_errors(), "unexpected parse errors for: {}", source);
        let env = new_environment(None);
        evaluate(&program, &env).unwrap_or_else(|e| panic!("eval error for `{}`: {}", source, e.message()))
    }

    fn run_err(source: &str) -> RuntimeError {
        let handler = Handler::new();
        let program = parse(source, &handler);
        assert!(!handler.has_errors(), "unexpected parse errors for: {}", source);
        let env = new_environment(None);
        evaluate(&program, &env).expect_err("expected a runtime error")
    }

    #[test]
    fn empty_program_evaluates_to_null() {
        assert!(matches!(run(""), Value::Null));
    }

    #[test]
    fn variables_and_arithmetic_with_compound_assignment() {
        let result = run("let a = 1; a += 1; a;");
        assert!(matches!(result, Value::Int(2)));
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let result = run(
            r#"
            let make_counter = fn() {
                let count = 0;
                return fn() {
                    count = count + 1;
                    return count;
                };
            };
            let counter = make_counter();
            counter();
            counter();
            counter();
            "#,
        );
        assert!(matches!(result, Value::Int(3)));
    }

    #[test]
    fn class_inheritance_and_super_calls() {
        let result = run(
            r#"
            class Animal {
                constructor(name) {
                    this.name = name;
                }
                speak() {
                    return this.name + " makes a sound";
                }
            }
            class Dog extends Animal {
                constructor(name) {
                    super(name);
                }
                speak() {
                    return super.speak() + ", specifically a bark";
                }
            }
            let d = new Dog("Rex");
            d.speak();
            "#,
        );
        assert!(matches!(result, Value::Str(s) if s.as_str() == "Rex makes a sound, specifically a bark"));
    }

    #[test]
    fn f_string_interpolates_embedded_expressions() {
        let result = run(r#"let x = 2; let y = 3; f"{x} + {y} = {x + y}";"#);
        assert!(matches!(result, Value::Str(s) if s.as_str() == "2 + 3 = 5"));
    }

    #[test]
    fn loop_with_break_stops_early() {
        let result = run(
            r#"
            let i = 0;
            let sum = 0;
            while (true) {
                if (i >= 5) {
                    break;
                }
                sum = sum + i;
                i = i + 1;
            }
            sum;
            "#,
        );
        assert!(matches!(result, Value::Int(10)));
    }

    #[test]
    fn unknown_identifier_is_a_runtime_error() {
        let err = run_err("missing_name;");
        assert!(matches!(err.kind, ErrorKind::IdentifierNotFound(ref n) if n == "missing_name"));
    }

    #[test]
    fn short_circuit_or_does_not_invoke_the_right_operand() {
        let result = run(r#"let calls = 0; true || (calls = calls + 1 == 1); calls;"#);
        assert!(matches!(result, Value::Int(0)));
    }

    #[test]
    fn truthiness_laws_hold() {
        assert!(matches!(run("!0;"), Value::Bool(true)));
        assert!(matches!(run(r#"!"";"#), Value::Bool(true)));
        assert!(matches!(run(r#"!"x";"#), Value::Bool(false)));
    }

    #[test]
    fn integer_and_float_promotion() {
        assert!(matches!(run("1 + 1;"), Value::Int(2)));
        assert!(matches!(run("1 + 1.0;"), Value::Float(f) if f == 2.0));
    }

    #[test]
    fn arithmetic_is_left_associative_with_correct_precedence() {
        assert!(matches!(run("1 + 2 * 3;"), Value::Int(7)));
        assert!(matches!(run("(1 + 2) * 3;"), Value::Int(9)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = run_err("1 / 0;");
        assert!(matches!(err.kind, ErrorKind::DivisionByZero));
    }

    #[test]
    fn negative_array_index_is_out_of_bounds() {
        let err = run_err("let a = [1, 2, 3]; a[-1];");
        assert!(matches!(err.kind, ErrorKind::IndexOutOfBounds(_)));
    }

    #[test]
    fn missing_hash_key_returns_null_not_an_error() {
        assert!(matches!(run(r#"let h = {"a": 1}; h["missing"];"#), Value::Null));
    }

    #[test]
    fn deep_recursion_hits_the_stack_overflow_guard() {
        let err = run_err(
            r#"
            let recurse = fn(n) {
                return recurse(n + 1);
            };
            recurse(0);
            "#,
        );
        assert!(matches!(err.kind, ErrorKind::StackOverflow(_)));
    }

    #[test]
    fn array_and_hash_literals_can_be_empty() {
        assert!(matches!(run("[];"), Value::Array(a) if a.borrow().is_empty()));
        assert!(matches!(run("{};"), Value::Hash(h) if h.borrow().is_empty()));
    }
}
