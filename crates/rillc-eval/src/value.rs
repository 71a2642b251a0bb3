//! Runtime value model: the sum type every expression evaluates to.
//!
//! Values that need shared, mutable identity (arrays, hashes, instances)
//! are wrapped in `Rc<RefCell<_>>` so aliasing one binding and mutating it
//! through another is visible everywhere, matching a single-threaded,
//! reference-semantics scripting language.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rillc_par::ast::{BlockStmt, MethodDef};

use crate::environment::Environment;

pub type BuiltinFn = dyn Fn(&[Value]) -> Result<Value, String>;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Rc<String>),
    Bool(bool),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Hash(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<FunctionValue>),
    Class(Rc<ClassValue>),
    Instance(Rc<RefCell<InstanceValue>>),
    BoundMethod(Rc<BoundMethodValue>),
    Builtin(Rc<BuiltinValue>),
}

pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: BlockStmt,
    pub env: Rc<RefCell<Environment>>,
}

pub struct ClassValue {
    pub name: String,
    pub parent: Option<Rc<ClassValue>>,
    pub constructor: Option<MethodDef>,
    pub methods: Vec<MethodDef>,
    pub env: Rc<RefCell<Environment>>,
}

impl ClassValue {
    /// Walks from `self_rc` up through `parent` looking for a method named
    /// `name`, returning the first match (most-derived wins) along with the
    /// class that declared it, needed so a `super` call inside that method
    /// body resolves against the declaring class's parent, not the
    /// instance's own class.
    pub fn resolve_method(
        self_rc: &Rc<ClassValue>,
        name: &str,
    ) -> Option<(MethodDef, Rc<RefCell<Environment>>, Rc<ClassValue>)> {
        if let Some(method) = self_rc.methods.iter().find(|m| m.name == name) {
            return Some((method.clone(), self_rc.env.clone(), self_rc.clone()));
        }
        ClassValue::resolve_method(self_rc.parent.as_ref()?, name)
    }

    /// Walks from `self_rc` up through `parent` looking for the nearest
    /// declared constructor (the most-derived one).
    pub fn resolve_constructor(
        self_rc: &Rc<ClassValue>,
    ) -> Option<(MethodDef, Rc<RefCell<Environment>>, Rc<ClassValue>)> {
        if let Some(ctor) = &self_rc.constructor {
            return Some((ctor.clone(), self_rc.env.clone(), self_rc.clone()));
        }
        ClassValue::resolve_constructor(self_rc.parent.as_ref()?)
    }
}

pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    pub properties: IndexMap<String, Value>,
}

pub struct BoundMethodValue {
    pub instance: Value,
    pub method: MethodDef,
    pub defining_class_env: Rc<RefCell<Environment>>,
    /// The class whose `parent` is used when the method body calls `super`.
    pub defining_class: Rc<ClassValue>,
}

pub struct BuiltinValue {
    pub name: String,
    pub func: Box<BuiltinFn>,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::BoundMethod(_) => "bound_method",
            Value::Builtin(_) => "builtin",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.borrow().is_empty(),
            Value::Hash(h) => !h.borrow().is_empty(),
            _ => true,
        }
    }

    /// The `str()`/f-string display form, as distinct from a debug dump.
    pub fn display(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.as_str().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(a) => {
                let items: Vec<String> = a.borrow().iter().map(Value::inspect).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Hash(h) => {
                let items: Vec<String> = h
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{:?}: {}", k, v.inspect()))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            Value::Function(_) => "<function>".to_string(),
            Value::Class(c) => format!("<class {}>", c.name),
            Value::Instance(i) => format!("<instance of {}>", i.borrow().class.name),
            Value::BoundMethod(_) => "<bound method>".to_string(),
            Value::Builtin(b) => format!("<builtin {}>", b.name),
        }
    }

    /// The `inspect()` form used inside array/hash element rendering
    /// (quotes strings), per the evaluator's nested-display rule.
    pub fn inspect(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", s.as_str()),
            other => other.display(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_infinite() {
        if f > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        }
    } else if f.fract() == 0.0 && f.is_finite() {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}
