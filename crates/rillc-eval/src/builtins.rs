//! Default builtin functions, registered into the global environment
//! the same way a host embedding this interpreter would call
//! `registerBuiltin`.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{BuiltinValue, Value};

fn err(msg: impl Into<String>) -> Result<Value, String> {
    Err(msg.into())
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() != expected {
        return err(format!(
            "{} expects {} argument(s), got {}",
            name,
            expected,
            args.len()
        ));
    }
    Ok(())
}

fn builtin_len(args: &[Value]) -> Result<Value, String> {
    arity("len", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.len() as i64)),
        Value::Array(a) => Ok(Value::Int(a.borrow().len() as i64)),
        Value::Hash(h) => Ok(Value::Int(h.borrow().len() as i64)),
        other => err(format!("len: unsupported argument type '{}'", other.type_name())),
    }
}

fn builtin_print(args: &[Value]) -> Result<Value, String> {
    let parts: Vec<String> = args.iter().map(Value::display).collect();
    print!("{}", parts.join(" "));
    Ok(Value::Null)
}

fn builtin_println(args: &[Value]) -> Result<Value, String> {
    let parts: Vec<String> = args.iter().map(Value::display).collect();
    println!("{}", parts.join(" "));
    Ok(Value::Null)
}

fn builtin_type(args: &[Value]) -> Result<Value, String> {
    arity("type", args, 1)?;
    Ok(Value::Str(Rc::new(args[0].type_name().to_string())))
}

fn builtin_str(args: &[Value]) -> Result<Value, String> {
    arity("str", args, 1)?;
    Ok(Value::Str(Rc::new(args[0].display())))
}

fn builtin_int(args: &[Value]) -> Result<Value, String> {
    arity("int", args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(*f as i64)),
        Value::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("int: cannot convert '{}' to int", s)),
        other => err(format!("int: cannot convert {} to int", other.type_name())),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, String> {
    arity("float", args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("float: cannot convert '{}' to float", s)),
        other => err(format!("float: cannot convert {} to float", other.type_name())),
    }
}

fn builtin_push(args: &[Value]) -> Result<Value, String> {
    arity("push", args, 2)?;
    match &args[0] {
        Value::Array(a) => {
            let mut items = a.borrow().clone();
            items.push(args[1].clone());
            Ok(Value::Array(Rc::new(RefCell::new(items))))
        }
        other => err(format!("push: first argument must be an array, got {}", other.type_name())),
    }
}

fn builtin_pop(args: &[Value]) -> Result<Value, String> {
    arity("pop", args, 1)?;
    match &args[0] {
        Value::Array(a) => {
            let mut items = a.borrow().clone();
            items.pop();
            Ok(Value::Array(Rc::new(RefCell::new(items))))
        }
        other => err(format!("pop: argument must be an array, got {}", other.type_name())),
    }
}

fn builtin_first(args: &[Value]) -> Result<Value, String> {
    arity("first", args, 1)?;
    match &args[0] {
        Value::Array(a) => Ok(a.borrow().first().cloned().unwrap_or(Value::Null)),
        other => err(format!("first: argument must be an array, got {}", other.type_name())),
    }
}

fn builtin_last(args: &[Value]) -> Result<Value, String> {
    arity("last", args, 1)?;
    match &args[0] {
        Value::Array(a) => Ok(a.borrow().last().cloned().unwrap_or(Value::Null)),
        other => err(format!("last: argument must be an array, got {}", other.type_name())),
    }
}

fn builtin_rest(args: &[Value]) -> Result<Value, String> {
    arity("rest", args, 1)?;
    match &args[0] {
        Value::Array(a) => {
            let items = a.borrow();
            let rest = if items.is_empty() { Vec::new() } else { items[1..].to_vec() };
            Ok(Value::Array(Rc::new(RefCell::new(rest))))
        }
        other => err(format!("rest: argument must be an array, got {}", other.type_name())),
    }
}

fn builtin_keys(args: &[Value]) -> Result<Value, String> {
    arity("keys", args, 1)?;
    match &args[0] {
        Value::Hash(h) => {
            let keys: Vec<Value> = h.borrow().keys().map(|k| Value::Str(Rc::new(k.clone()))).collect();
            Ok(Value::Array(Rc::new(RefCell::new(keys))))
        }
        other => err(format!("keys: argument must be a hash, got {}", other.type_name())),
    }
}

fn builtin_values(args: &[Value]) -> Result<Value, String> {
    arity("values", args, 1)?;
    match &args[0] {
        Value::Hash(h) => {
            let values: Vec<Value> = h.borrow().values().cloned().collect();
            Ok(Value::Array(Rc::new(RefCell::new(values))))
        }
        other => err(format!("values: argument must be a hash, got {}", other.type_name())),
    }
}

fn as_int(v: &Value, name: &str) -> Result<i64, String> {
    match v {
        Value::Int(i) => Ok(*i),
        other => Err(format!("{}: expected int argument, got {}", name, other.type_name())),
    }
}

fn builtin_range(args: &[Value]) -> Result<Value, String> {
    let (start, stop, step) = match args.len() {
        1 => (0, as_int(&args[0], "range")?, 1),
        2 => (as_int(&args[0], "range")?, as_int(&args[1], "range")?, 1),
        3 => (
            as_int(&args[0], "range")?,
            as_int(&args[1], "range")?,
            as_int(&args[2], "range")?,
        ),
        n => return err(format!("range expects 1 to 3 arguments, got {}", n)),
    };
    if step == 0 {
        return err("range: step must not be zero");
    }
    let mut items = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            items.push(Value::Int(i));
            i += step;
        }
    } else {
        while i > stop {
            items.push(Value::Int(i));
            i += step;
        }
    }
    Ok(Value::Array(Rc::new(RefCell::new(items))))
}

/// Returns the default builtin set, keyed by name, ready to be consulted
/// by the evaluator once a plain identifier lookup misses every scope.
pub fn default_builtins() -> IndexMap<String, Rc<BuiltinValue>> {
    let mut map = IndexMap::new();
    let entries: Vec<(&str, Box<dyn Fn(&[Value]) -> Result<Value, String>>)> = vec![
        ("len", Box::new(builtin_len)),
        ("print", Box::new(builtin_print)),
        ("println", Box::new(builtin_println)),
        ("type", Box::new(builtin_type)),
        ("str", Box::new(builtin_str)),
        ("int", Box::new(builtin_int)),
        ("float", Box::new(builtin_float)),
        ("push", Box::new(builtin_push)),
        ("pop", Box::new(builtin_pop)),
        ("first", Box::new(builtin_first)),
        ("last", Box::new(builtin_last)),
        ("rest", Box::new(builtin_rest)),
        ("keys", Box::new(builtin_keys)),
        ("values", Box::new(builtin_values)),
        ("range", Box::new(builtin_range)),
    ];
    for (name, func) in entries {
        map.insert(
            name.to_string(),
            Rc::new(BuiltinValue {
                name: name.to_string(),
                func,
            }),
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value, String> {
        let builtins = default_builtins();
        (builtins[name].func)(args)
    }

    #[test]
    fn len_reports_string_array_and_hash_sizes() {
        assert!(matches!(call("len", &[Value::Str(Rc::new("abc".into()))]), Ok(Value::Int(3))));
        let arr = Value::Array(Rc::new(RefCell::new(vec![Value::Int(1), Value::Int(2)])));
        assert!(matches!(call("len", &[arr]), Ok(Value::Int(2))));
    }

    #[test]
    fn push_and_pop_return_new_arrays_without_mutating_the_original() {
        let original = Rc::new(RefCell::new(vec![Value::Int(1)]));
        let arr = Value::Array(original.clone());
        let pushed = call("push", &[arr, Value::Int(2)]).unwrap();
        if let Value::Array(a) = pushed {
            assert_eq!(a.borrow().len(), 2);
        } else {
            panic!("expected array");
        }
        assert_eq!(original.borrow().len(), 1);
    }

    #[test]
    fn pop_on_empty_array_is_not_an_error() {
        let arr = Value::Array(Rc::new(RefCell::new(Vec::new())));
        let result = call("pop", &[arr]).unwrap();
        assert!(matches!(result, Value::Array(a) if a.borrow().is_empty()));
    }

    #[test]
    fn first_and_last_return_null_on_empty_array() {
        let arr = Value::Array(Rc::new(RefCell::new(Vec::new())));
        assert!(matches!(call("first", &[arr.clone()]), Ok(Value::Null)));
        assert!(matches!(call("last", &[arr]), Ok(Value::Null)));
    }

    #[test]
    fn range_supports_one_two_and_three_argument_forms() {
        let a = call("range", &[Value::Int(3)]).unwrap();
        let b = call("range", &[Value::Int(1), Value::Int(4)]).unwrap();
        let c = call("range", &[Value::Int(0), Value::Int(10), Value::Int(2)]).unwrap();
        if let (Value::Array(a), Value::Array(b), Value::Array(c)) = (a, b, c) {
            assert_eq!(a.borrow().len(), 3);
            assert_eq!(b.borrow().len(), 3);
            assert_eq!(c.borrow().len(), 5);
        } else {
            panic!("expected arrays");
        }
    }

    #[test]
    fn int_parses_strings_and_converts_floats() {
        assert!(matches!(call("int", &[Value::Str(Rc::new("42".into()))]), Ok(Value::Int(42))));
        assert!(matches!(call("int", &[Value::Float(3.9)]), Ok(Value::Int(3))));
    }

    #[test]
    fn keys_and_values_preserve_insertion_order() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Int(1));
        let hash = Value::Hash(Rc::new(RefCell::new(map)));
        let keys = call("keys", &[hash.clone()]).unwrap();
        if let Value::Array(a) = keys {
            let names: Vec<String> = a.borrow().iter().map(Value::display).collect();
            assert_eq!(names, vec!["b", "a"]);
        } else {
            panic!("expected array");
        }
    }
}
