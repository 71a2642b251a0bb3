//! Tree-walking evaluator: one exhaustive `match` per statement/expression
//! kind, dispatched directly over the parser's closed AST enums rather than
//! through a runtime type tag.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rillc_lex::Position;
use rillc_par::ast::{
    AssignExpr, CallExpr, ClassStmt, Expr, ForInit, ForStmt, IfExpr, IndexExpr, InfixExpr,
    InfixOp, LetStmt, NewExpr, PrefixExpr, PrefixOp, Program, PropertyExpr, Stmt, SuperExpr,
    WhileStmt,
};

use crate::builtins::default_builtins;
use crate::environment::Environment;
use crate::error::{ErrorKind, RuntimeError};
use crate::stack::{CallStack, FrameKind};
use crate::value::{BoundMethodValue, BuiltinValue, ClassValue, FunctionValue, InstanceValue, Value};

/// Resource bounds, overridable from the embedding CLI's configuration.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    pub max_iterations: usize,
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            max_call_depth: 1000,
        }
    }
}

/// What evaluating a statement or expression produced: a plain value, or
/// one of the sentinels that must bypass normal sequencing (a `return`
/// propagating out of nested blocks, a `break`/`continue` propagating out
/// to its owning loop).
enum Signal {
    Value(Value),
    Return(Value),
    Break,
    Continue,
}

impl Signal {
    /// Collapses any sentinel down to the value it carries. Used at
    /// operand position, where a `return`/`break` nested inside a value
    /// producing `if`-expression contributes only its block's value rather
    /// than unwinding the enclosing call or loop; statement position
    /// (`Stmt::Expr`) preserves the sentinel instead, see `eval_stmt`.
    fn into_value(self) -> Value {
        match self {
            Signal::Value(v) | Signal::Return(v) => v,
            Signal::Break | Signal::Continue => Value::Null,
        }
    }
}

/// Resolves a function/method body's final signal into its call-level
/// result. Unlike `Signal::into_value`, `Break`/`Continue` here are a
/// parser invariant violation rather than a normal operand collapse: a
/// loop body the function was lexically nested inside must never let its
/// own `break`/`continue` reach past the function boundary, so seeing one
/// here means it escaped, and that is reported as a runtime error rather
/// than silently becoming `Value::Null`.
fn signal_to_return_value(signal: Signal, position: Position) -> Result<Value, RuntimeError> {
    match signal {
        Signal::Value(v) | Signal::Return(v) => Ok(v),
        Signal::Break => Err(RuntimeError::new(
            ErrorKind::LoopControlOutsideLoop("break"),
            position,
        )),
        Signal::Continue => Err(RuntimeError::new(
            ErrorKind::LoopControlOutsideLoop("continue"),
            position,
        )),
    }
}

pub struct Evaluator {
    builtins: IndexMap<String, Rc<BuiltinValue>>,
    stack: CallStack,
    iterations: usize,
    max_iterations: usize,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            builtins: default_builtins(),
            stack: CallStack::new(config.max_call_depth),
            iterations: 0,
            max_iterations: config.max_iterations,
        }
    }

    /// Registers an additional builtin, or overrides one of the default
    /// fourteen under the same name.
    pub fn register_builtin(&mut self, builtin: BuiltinValue) {
        self.builtins.insert(builtin.name.clone(), Rc::new(builtin));
    }

    pub fn eval_program(
        &mut self,
        program: &Program,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut result = Value::Null;
        for stmt in program {
            match self.eval_stmt(stmt, env)? {
                Signal::Value(v) => result = v,
                Signal::Return(v) => return Ok(v),
                Signal::Break | Signal::Continue => {
                    unreachable!("break/continue outside a loop is rejected at parse time")
                }
            }
        }
        Ok(result)
    }

    fn tick(&mut self, position: Position) -> Result<(), RuntimeError> {
        self.iterations += 1;
        if self.iterations > self.max_iterations {
            return Err(RuntimeError::new(
                ErrorKind::MaxIterationsExceeded(self.max_iterations),
                position,
            ));
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Let(s) => {
                self.eval_let(s, env, false)?;
                Ok(Signal::Value(Value::Null))
            }
            Stmt::Const(s) => {
                self.eval_let(s, env, true)?;
                Ok(Signal::Value(Value::Null))
            }
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(e) => self.eval_value(e, env)?,
                    None => Value::Null,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Expr(e) => self.eval_expr(e, env),
            Stmt::Block(b) => self.eval_block(b, env),
            Stmt::While(s) => self.eval_while(s, env),
            Stmt::For(s) => self.eval_for(s, env),
            Stmt::Break(_) => Ok(Signal::Break),
            Stmt::Continue(_) => Ok(Signal::Continue),
            Stmt::Class(s) => {
                self.eval_class_stmt(s, env)?;
                Ok(Signal::Value(Value::Null))
            }
        }
    }

    fn eval_let(
        &mut self,
        s: &LetStmt,
        env: &Rc<RefCell<Environment>>,
        is_const: bool,
    ) -> Result<(), RuntimeError> {
        let value = self.eval_value(&s.value, env)?;
        if !env.borrow_mut().declare(&s.name, value, is_const) {
            return Err(RuntimeError::new(
                ErrorKind::NameAlreadyBound(s.name.clone()),
                s.position,
            ));
        }
        Ok(())
    }

    fn eval_block(
        &mut self,
        block: &rillc_par::ast::BlockStmt,
        parent_env: &Rc<RefCell<Environment>>,
    ) -> Result<Signal, RuntimeError> {
        let env = Environment::child(parent_env);
        let mut result = Value::Null;
        for stmt in &block.statements {
            match self.eval_stmt(stmt, &env)? {
                Signal::Value(v) => result = v,
                other => return Ok(other),
            }
        }
        Ok(Signal::Value(result))
    }

    fn eval_while(&mut self, s: &WhileStmt, env: &Rc<RefCell<Environment>>) -> Result<Signal, RuntimeError> {
        loop {
            self.tick(s.position)?;
            if !self.eval_value(&s.condition, env)?.is_truthy() {
                break;
            }
            match self.eval_block(&s.body, env)? {
                Signal::Break => break,
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::Continue | Signal::Value(_) => {}
            }
        }
        Ok(Signal::Value(Value::Null))
    }

    fn eval_for(&mut self, s: &ForStmt, parent_env: &Rc<RefCell<Environment>>) -> Result<Signal, RuntimeError> {
        let for_env = Environment::child(parent_env);
        if let Some(init) = &s.init {
            match init.as_ref() {
                ForInit::Let(let_stmt) => self.eval_let(let_stmt, &for_env, false)?,
                ForInit::Expr(e) => {
                    self.eval_value(e, &for_env)?;
                }
            }
        }
        loop {
            self.tick(s.position)?;
            if !self.eval_value(&s.condition, &for_env)?.is_truthy() {
                break;
            }
            match self.eval_block(&s.body, &for_env)? {
                Signal::Break => break,
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::Continue | Signal::Value(_) => {}
            }
            self.eval_value(&s.update, &for_env)?;
        }
        Ok(Signal::Value(Value::Null))
    }

    fn eval_class_stmt(&mut self, s: &ClassStmt, env: &Rc<RefCell<Environment>>) -> Result<(), RuntimeError> {
        if s.parent.as_deref() == Some(s.name.as_str()) {
            return Err(RuntimeError::new(
                ErrorKind::CircularInheritance(s.name.clone()),
                s.position,
            ));
        }
        let parent = match &s.parent {
            Some(name) => {
                let value = env
                    .borrow()
                    .get(name)
                    .ok_or_else(|| RuntimeError::new(ErrorKind::ParentClassNotFound(name.clone()), s.position))?;
                match value {
                    Value::Class(c) => Some(c),
                    other => {
                        return Err(RuntimeError::new(
                            ErrorKind::NotAClass(format!("'{}' is {}", name, other.type_name())),
                            s.position,
                        ))
                    }
                }
            }
            None => None,
        };
        let class = Rc::new(ClassValue {
            name: s.name.clone(),
            parent,
            constructor: s.constructor.clone(),
            methods: s.methods.clone(),
            env: env.clone(),
        });
        if !env.borrow_mut().declare(&s.name, Value::Class(class), false) {
            return Err(RuntimeError::new(
                ErrorKind::ClassAlreadyDefined(s.name.clone()),
                s.position,
            ));
        }
        Ok(())
    }

    /// Evaluates `expr` for its plain value, collapsing any control-flow
    /// sentinel it may carry (see `Signal::into_value`).
    fn eval_value(&mut self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        Ok(self.eval_expr(expr, env)?.into_value())
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Signal, RuntimeError> {
        match expr {
            Expr::If(e) => self.eval_if(e, env),
            Expr::Identifier(ident) => {
                if let Some(v) = env.borrow().get(&ident.name) {
                    return Ok(Signal::Value(v));
                }
                if let Some(b) = self.builtins.get(&ident.name) {
                    return Ok(Signal::Value(Value::Builtin(b.clone())));
                }
                Err(RuntimeError::new(
                    ErrorKind::IdentifierNotFound(ident.name.clone()),
                    ident.position,
                ))
            }
            Expr::Prefix(e) => self.eval_prefix(e, env).map(Signal::Value),
            Expr::Infix(e) => self.eval_infix(e, env).map(Signal::Value),
            Expr::Boolean(b, _) => Ok(Signal::Value(Value::Bool(*b))),
            Expr::Integer(i, _) => Ok(Signal::Value(Value::Int(*i))),
            Expr::Float(f, _) => Ok(Signal::Value(Value::Float(*f))),
            Expr::String(s, _) => Ok(Signal::Value(Value::Str(Rc::new(s.clone())))),
            Expr::Null(_) => Ok(Signal::Value(Value::Null)),
            Expr::FString(e) => self.eval_fstring(e, env).map(Signal::Value),
            Expr::ArrayLit(e) => {
                let mut items = Vec::with_capacity(e.elements.len());
                for el in &e.elements {
                    items.push(self.eval_value(el, env)?);
                }
                Ok(Signal::Value(Value::Array(Rc::new(RefCell::new(items)))))
            }
            Expr::HashLit(e) => {
                let mut map = IndexMap::new();
                for (k, v) in &e.pairs {
                    let key = match self.eval_value(k, env)? {
                        Value::Str(s) => s.as_str().to_string(),
                        other => {
                            return Err(RuntimeError::new(
                                ErrorKind::TypeMismatch(format!(
                                    "hash keys must be strings, got {}",
                                    other.type_name()
                                )),
                                e.position,
                            ))
                        }
                    };
                    let value = self.eval_value(v, env)?;
                    map.insert(key, value);
                }
                Ok(Signal::Value(Value::Hash(Rc::new(RefCell::new(map)))))
            }
            Expr::FunctionLit(e) => Ok(Signal::Value(Value::Function(Rc::new(FunctionValue {
                params: e.params.clone(),
                body: e.body.clone(),
                env: env.clone(),
            })))),
            Expr::Call(e) => self.eval_call(e, env).map(Signal::Value),
            Expr::Index(e) => self.eval_index(e, env).map(Signal::Value),
            Expr::Assign(e) => self.eval_assign(e, env).map(Signal::Value),
            Expr::Property(e) => self.eval_property(e, env).map(Signal::Value),
            Expr::New(e) => self.eval_new(e, env).map(Signal::Value),
            Expr::This(p) => env
                .borrow()
                .get("this")
                .map(Signal::Value)
                .ok_or_else(|| RuntimeError::new(ErrorKind::ThisNotAvailable, *p)),
            Expr::Super(e) => self.eval_super(e, env).map(Signal::Value),
        }
    }

    fn eval_if(&mut self, e: &IfExpr, env: &Rc<RefCell<Environment>>) -> Result<Signal, RuntimeError> {
        for (cond, consequence) in e.conditions.iter().zip(&e.consequences) {
            if self.eval_value(cond, env)?.is_truthy() {
                return self.eval_block(consequence, env);
            }
        }
        match &e.alternative {
            Some(alt) => self.eval_block(alt, env),
            None => Ok(Signal::Value(Value::Null)),
        }
    }

    fn eval_prefix(&mut self, e: &PrefixExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let right = self.eval_value(&e.right, env)?;
        match e.op {
            PrefixOp::Not => Ok(Value::Bool(!right.is_truthy())),
            PrefixOp::Neg => match right {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(RuntimeError::new(
                    ErrorKind::TypeMismatch(format!("cannot negate {}", other.type_name())),
                    e.position,
                )),
            },
        }
    }

    fn eval_infix(&mut self, e: &InfixExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        if matches!(e.op, InfixOp::And) {
            let left = self.eval_value(&e.left, env)?;
            if !left.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(self.eval_value(&e.right, env)?.is_truthy()));
        }
        if matches!(e.op, InfixOp::Or) {
            let left = self.eval_value(&e.left, env)?;
            if left.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(self.eval_value(&e.right, env)?.is_truthy()));
        }
        let left = self.eval_value(&e.left, env)?;
        let right = self.eval_value(&e.right, env)?;
        apply_infix(e.op, left, right, e.position)
    }

    fn eval_fstring(
        &mut self,
        e: &rillc_par::ast::FStringExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut out = String::new();
        for (i, part) in e.static_parts.iter().enumerate() {
            out.push_str(part);
            if let Some(expr) = e.expressions.get(i) {
                let value = self.eval_value(expr, env)?;
                out.push_str(&value.display());
            }
        }
        Ok(Value::Str(Rc::new(out)))
    }

    fn eval_call(&mut self, e: &CallExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let callee = self.eval_value(&e.callee, env)?;
        let mut args = Vec::with_capacity(e.args.len());
        for a in &e.args {
            args.push(self.eval_value(a, env)?);
        }
        self.call_value(callee, args, e.position)
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, position: Position) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(f) => self.call_function(&f, args, position),
            Value::Builtin(b) => {
                if !self.stack.push(b.name.clone(), position, FrameKind::Builtin) {
                    return Err(self.stack_overflow(position));
                }
                let result = (b.func)(&args)
                    .map_err(|msg| RuntimeError::new(ErrorKind::ArgumentTypeMismatch(msg), position));
                self.stack.pop();
                result
            }
            Value::BoundMethod(bm) => self.invoke_method(
                &bm.method,
                &bm.defining_class_env,
                &bm.defining_class,
                bm.instance.clone(),
                args,
                position,
            ),
            Value::Class(c) => self.instantiate(&c, args, position),
            other => Err(RuntimeError::new(
                ErrorKind::NotCallable(format!("'{}' is not callable", other.type_name())),
                position,
            )),
        }
    }

    fn stack_overflow(&self, position: Position) -> RuntimeError {
        RuntimeError::new(ErrorKind::StackOverflow(self.stack.depth()), position)
            .with_stack(self.stack.frames().to_vec())
    }

    fn call_function(
        &mut self,
        f: &Rc<FunctionValue>,
        args: Vec<Value>,
        position: Position,
    ) -> Result<Value, RuntimeError> {
        if args.len() != f.params.len() {
            return Err(RuntimeError::new(
                ErrorKind::ArgumentCountMismatch {
                    expected: f.params.len().to_string(),
                    got: args.len(),
                },
                position,
            ));
        }
        if !self.stack.push("<function>", position, FrameKind::UserFunction) {
            return Err(self.stack_overflow(position));
        }
        let call_env = Environment::child(&f.env);
        for (param, arg) in f.params.iter().zip(args) {
            call_env.borrow_mut().declare(param, arg, false);
        }
        let result = self.eval_block(&f.body, &call_env);
        self.stack.pop();
        signal_to_return_value(result?, position)
    }

    fn invoke_method(
        &mut self,
        method: &rillc_par::ast::MethodDef,
        defining_env: &Rc<RefCell<Environment>>,
        defining_class: &Rc<ClassValue>,
        this: Value,
        args: Vec<Value>,
        position: Position,
    ) -> Result<Value, RuntimeError> {
        if args.len() != method.params.len() {
            return Err(RuntimeError::new(
                ErrorKind::ArgumentCountMismatch {
                    expected: method.params.len().to_string(),
                    got: args.len(),
                },
                position,
            ));
        }
        if !self.stack.push(method.name.clone(), position, FrameKind::UserFunction) {
            return Err(self.stack_overflow(position));
        }
        let call_env = Environment::child(defining_env);
        call_env.borrow_mut().declare("this", this, true);
        call_env
            .borrow_mut()
            .declare("__class__", Value::Class(defining_class.clone()), true);
        for (param, arg) in method.params.iter().zip(args) {
            call_env.borrow_mut().declare(param, arg, false);
        }
        let result = self.eval_block(&method.body, &call_env);
        self.stack.pop();
        signal_to_return_value(result?, position)
    }

    fn instantiate(
        &mut self,
        class: &Rc<ClassValue>,
        args: Vec<Value>,
        position: Position,
    ) -> Result<Value, RuntimeError> {
        let instance = Rc::new(RefCell::new(InstanceValue {
            class: class.clone(),
            properties: IndexMap::new(),
        }));
        match ClassValue::resolve_constructor(class) {
            Some((ctor, ctor_env, ctor_class)) => {
                self.invoke_method(
                    &ctor,
                    &ctor_env,
                    &ctor_class,
                    Value::Instance(instance.clone()),
                    args,
                    position,
                )?;
            }
            None if args.is_empty() => {}
            None => {
                return Err(RuntimeError::new(
                    ErrorKind::ConstructorArityMismatch {
                        expected: 0,
                        got: args.len(),
                    },
                    position,
                ))
            }
        }
        Ok(Value::Instance(instance))
    }

    fn eval_index(&mut self, e: &IndexExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let target = self.eval_value(&e.target, env)?;
        let index = self.eval_value(&e.index, env)?;
        match &target {
            Value::Array(a) => {
                let i = expect_int(&index, e.position)?;
                let items = a.borrow();
                if i < 0 || i as usize >= items.len() {
                    return Err(RuntimeError::new(
                        ErrorKind::IndexOutOfBounds(format!(
                            "index {} out of bounds for array of length {}",
                            i,
                            items.len()
                        )),
                        e.position,
                    ));
                }
                Ok(items[i as usize].clone())
            }
            Value::Hash(h) => {
                let key = hash_key(&index);
                Ok(h.borrow().get(&key).cloned().unwrap_or(Value::Null))
            }
            Value::Str(s) => {
                let i = expect_int(&index, e.position)?;
                let chars: Vec<char> = s.chars().collect();
                if i < 0 || i as usize >= chars.len() {
                    return Err(RuntimeError::new(
                        ErrorKind::IndexOutOfBounds(format!(
                            "index {} out of bounds for string of length {}",
                            i,
                            chars.len()
                        )),
                        e.position,
                    ));
                }
                Ok(Value::Str(Rc::new(chars[i as usize].to_string())))
            }
            other => Err(RuntimeError::new(
                ErrorKind::TypeMismatch(format!("cannot index into {}", other.type_name())),
                e.position,
            )),
        }
    }

    fn eval_assign(&mut self, e: &AssignExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let value = self.eval_value(&e.value, env)?;
        match e.target.as_ref() {
            Expr::Identifier(ident) => match env.borrow_mut().assign(&ident.name, value.clone()) {
                Ok(()) => Ok(value),
                Err(true) => Err(RuntimeError::new(
                    ErrorKind::ConstantReassignment(ident.name.clone()),
                    e.position,
                )),
                Err(false) => Err(RuntimeError::new(
                    ErrorKind::IdentifierNotFound(ident.name.clone()),
                    e.position,
                )),
            },
            Expr::Index(idx) => {
                let target = self.eval_value(&idx.target, env)?;
                let index = self.eval_value(&idx.index, env)?;
                match &target {
                    Value::Array(a) => {
                        let i = expect_int(&index, e.position)?;
                        let mut items = a.borrow_mut();
                        if i < 0 || i as usize >= items.len() {
                            return Err(RuntimeError::new(
                                ErrorKind::IndexOutOfBounds(format!(
                                    "index {} out of bounds for array of length {}",
                                    i,
                                    items.len()
                                )),
                                e.position,
                            ));
                        }
                        items[i as usize] = value.clone();
                        Ok(value)
                    }
                    Value::Hash(h) => {
                        let key = hash_key(&index);
                        h.borrow_mut().insert(key, value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::new(
                        ErrorKind::TypeMismatch(format!("cannot index-assign into {}", other.type_name())),
                        e.position,
                    )),
                }
            }
            Expr::Property(p) => {
                let obj = self.eval_value(&p.object, env)?;
                match &obj {
                    Value::Instance(inst) => {
                        inst.borrow_mut().properties.insert(p.property.clone(), value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::new(
                        ErrorKind::TypeMismatch(format!("cannot set a property on {}", other.type_name())),
                        e.position,
                    )),
                }
            }
            _ => unreachable!("assignment targets are restricted to identifier/index/property at parse time"),
        }
    }

    fn eval_property(&mut self, e: &PropertyExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let obj = self.eval_value(&e.object, env)?;
        match &obj {
            Value::Instance(inst) => {
                let (existing, class) = {
                    let borrowed = inst.borrow();
                    (borrowed.properties.get(&e.property).cloned(), borrowed.class.clone())
                };
                if let Some(v) = existing {
                    return Ok(v);
                }
                if let Some((method, defining_env, defining_class)) = ClassValue::resolve_method(&class, &e.property)
                {
                    return Ok(Value::BoundMethod(Rc::new(BoundMethodValue {
                        instance: obj.clone(),
                        method,
                        defining_class_env: defining_env,
                        defining_class,
                    })));
                }
                Err(RuntimeError::new(
                    ErrorKind::PropertyNotFound(e.property.clone()),
                    e.position,
                ))
            }
            Value::Hash(h) => Ok(h.borrow().get(&e.property).cloned().unwrap_or(Value::Null)),
            other => Err(RuntimeError::new(
                ErrorKind::PropertyNotFound(format!(
                    "'{}' has no property '{}'",
                    other.type_name(),
                    e.property
                )),
                e.position,
            )),
        }
    }

    fn eval_new(&mut self, e: &NewExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let class_value = self.eval_value(&e.class, env)?;
        let class = match class_value {
            Value::Class(c) => c,
            other => {
                return Err(RuntimeError::new(
                    ErrorKind::NotInstantiable(other.type_name().to_string()),
                    e.position,
                ))
            }
        };
        let mut args = Vec::with_capacity(e.args.len());
        for a in &e.args {
            args.push(self.eval_value(a, env)?);
        }
        self.instantiate(&class, args, e.position)
    }

    fn eval_super(&mut self, e: &SuperExpr, env: &Rc<RefCell<Environment>>) -> Result<Value, RuntimeError> {
        let this = env
            .borrow()
            .get("this")
            .ok_or_else(|| RuntimeError::new(ErrorKind::SuperNotInMethod, e.position))?;
        let defining_class = match env.borrow().get("__class__") {
            Some(Value::Class(c)) => c,
            _ => return Err(RuntimeError::new(ErrorKind::SuperNotInMethod, e.position)),
        };
        let parent = defining_class
            .parent
            .clone()
            .ok_or_else(|| RuntimeError::new(ErrorKind::SuperNoParent(defining_class.name.clone()), e.position))?;

        let mut args = Vec::with_capacity(e.args.len());
        for a in &e.args {
            args.push(self.eval_value(a, env)?);
        }

        match &e.method {
            None => match ClassValue::resolve_constructor(&parent) {
                Some((ctor, ctor_env, ctor_class)) => {
                    self.invoke_method(&ctor, &ctor_env, &ctor_class, this, args, e.position)
                }
                None if args.is_empty() => Ok(Value::Null),
                None => Err(RuntimeError::new(
                    ErrorKind::ConstructorArityMismatch {
                        expected: 0,
                        got: args.len(),
                    },
                    e.position,
                )),
            },
            Some(name) => {
                let (method, method_env, method_class) = ClassValue::resolve_method(&parent, name)
                    .ok_or_else(|| RuntimeError::new(ErrorKind::PropertyNotFound(name.clone()), e.position))?;
                self.invoke_method(&method, &method_env, &method_class, this, args, e.position)
            }
        }
    }
}

fn expect_int(value: &Value, position: Position) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(RuntimeError::new(
            ErrorKind::TypeMismatch(format!("expected an int index, got {}", other.type_name())),
            position,
        )),
    }
}

/// Hash indices coerce any key to its display string, per the "string
/// coerced key lookup" rule.
fn hash_key(value: &Value) -> String {
    match value {
        Value::Str(s) => s.as_str().to_string(),
        other => other.display(),
    }
}

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::Float(_))
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => unreachable!("as_f64 called on a non-numeric value"),
    }
}

fn floor_div_i64(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn apply_infix(op: InfixOp, left: Value, right: Value, position: Position) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => apply_int_infix(op, *a, *b, position),
        (Value::Str(a), Value::Str(b)) => apply_string_infix(op, a, b, position),
        (Value::Bool(a), Value::Bool(b)) => apply_bool_infix(op, *a, *b, position),
        _ if is_numeric(&left) && is_numeric(&right) => {
            apply_float_infix(op, as_f64(&left), as_f64(&right), position)
        }
        _ => Err(RuntimeError::new(
            ErrorKind::TypeMismatch(format!(
                "cannot apply operator to {} and {}",
                left.type_name(),
                right.type_name()
            )),
            position,
        )),
    }
}

fn apply_int_infix(op: InfixOp, a: i64, b: i64, position: Position) -> Result<Value, RuntimeError> {
    use InfixOp::*;
    Ok(match op {
        Add => Value::Int(a + b),
        Sub => Value::Int(a - b),
        Mul => Value::Int(a * b),
        Div => {
            if b == 0 {
                return Err(RuntimeError::new(ErrorKind::DivisionByZero, position));
            }
            Value::Int(a / b)
        }
        FloorDiv => {
            if b == 0 {
                return Err(RuntimeError::new(ErrorKind::DivisionByZero, position));
            }
            Value::Int(floor_div_i64(a, b))
        }
        Mod => {
            if b == 0 {
                return Err(RuntimeError::new(ErrorKind::DivisionByZero, position));
            }
            Value::Int(a % b)
        }
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        Lt => Value::Bool(a < b),
        Gt => Value::Bool(a > b),
        LtEq => Value::Bool(a <= b),
        GtEq => Value::Bool(a >= b),
        And | Or => unreachable!("&&/|| are intercepted before type dispatch"),
    })
}

fn apply_float_infix(op: InfixOp, a: f64, b: f64, position: Position) -> Result<Value, RuntimeError> {
    use InfixOp::*;
    Ok(match op {
        Add => Value::Float(a + b),
        Sub => Value::Float(a - b),
        Mul => Value::Float(a * b),
        Div => Value::Float(a / b),
        FloorDiv => Value::Float((a / b).floor()),
        Mod => {
            if b == 0.0 {
                return Err(RuntimeError::new(ErrorKind::DivisionByZero, position));
            }
            Value::Float(a % b)
        }
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        Lt => Value::Bool(a < b),
        Gt => Value::Bool(a > b),
        LtEq => Value::Bool(a <= b),
        GtEq => Value::Bool(a >= b),
        And | Or => unreachable!("&&/|| are intercepted before type dispatch"),
    })
}

fn apply_string_infix(op: InfixOp, a: &Rc<String>, b: &Rc<String>, position: Position) -> Result<Value, RuntimeError> {
    use InfixOp::*;
    Ok(match op {
        Add => Value::Str(Rc::new(format!("{}{}", a, b))),
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        Lt => Value::Bool(a.as_str() < b.as_str()),
        Gt => Value::Bool(a.as_str() > b.as_str()),
        LtEq => Value::Bool(a.as_str() <= b.as_str()),
        GtEq => Value::Bool(a.as_str() >= b.as_str()),
        _ => {
            return Err(RuntimeError::new(
                ErrorKind::TypeMismatch("operator not supported between strings".to_string()),
                position,
            ))
        }
    })
}

fn apply_bool_infix(op: InfixOp, a: bool, b: bool, position: Position) -> Result<Value, RuntimeError> {
    use InfixOp::*;
    Ok(match op {
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        And | Or => unreachable!("&&/|| are intercepted before type dispatch"),
        _ => {
            return Err(RuntimeError::new(
                ErrorKind::TypeMismatch("operator not supported between booleans".to_string()),
                position,
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_plain_value_signal_passes_through() {
        let result = signal_to_return_value(Signal::Value(Value::Int(3)), Position::new(1, 1));
        assert!(matches!(result, Ok(Value::Int(3))));
    }

    #[test]
    fn a_return_signal_unwraps_its_value() {
        let result = signal_to_return_value(Signal::Return(Value::Bool(true)), Position::new(1, 1));
        assert!(matches!(result, Ok(Value::Bool(true))));
    }

    #[test]
    fn a_break_signal_reaching_the_call_boundary_is_an_error() {
        let result = signal_to_return_value(Signal::Break, Position::new(1, 1));
        assert!(matches!(result, Err(e) if matches!(e.kind, ErrorKind::LoopControlOutsideLoop("break"))));
    }

    #[test]
    fn a_continue_signal_reaching_the_call_boundary_is_an_error() {
        let result = signal_to_return_value(Signal::Continue, Position::new(1, 1));
        assert!(matches!(result, Err(e) if matches!(e.kind, ErrorKind::LoopControlOutsideLoop("continue"))));
    }
}
