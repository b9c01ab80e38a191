//! The dynamic [`Value`] type.

use core::fmt;
use std::rc::Rc;

use ecow::{EcoString, eco_format};
use indexmap::IndexMap;

use super::host::{HostObject, Invocable, NativeFunction};
use crate::evaluator::EvalError;
use crate::expressions::DeferWrapper;
use crate::iterator::{self, SharedIterator};

/// Insertion-ordered mapping from names to values.
pub type ValueMap = IndexMap<EcoString, Value>;

/// Boxed iterator over values, as produced by repeat sequences.
pub type ValueIter = Box<dyn Iterator<Item = Value>>;

/// A dynamically typed value.
///
/// Cloning is cheap: aggregates and host objects are reference counted.
#[derive(Debug, Clone)]
pub enum Value {
    /// The `nothing` sentinel.
    Null,
    /// The default marker: "no explicit value, keep the host's default".
    Default,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(EcoString),
    List(Rc<[Value]>),
    Map(Rc<ValueMap>),
    Object(Rc<dyn HostObject>),
    Callable(Rc<dyn Invocable>),
    /// A live repeat iterator, as found under `repeat/<name>`.
    Iterator(SharedIterator),
    /// The result of a `defer:`/`lazy:` expression.
    Deferred(DeferWrapper),
}

impl Value {
    pub fn str(value: impl Into<EcoString>) -> Self {
        Value::Str(value.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn map<K: Into<EcoString>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn object(object: impl HostObject + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Wrap a closure as a zero-argument callable.
    pub fn function<F>(name: impl Into<EcoString>, func: F) -> Self
    where
        F: Fn() -> Result<Value, EvalError> + 'static,
    {
        Value::Callable(Rc::new(NativeFunction::new(name, func)))
    }

    /// Name of the value's kind, for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "nothing",
            Value::Default => "default",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(object) => object.type_name(),
            Value::Callable(_) => "callable",
            Value::Iterator(_) => "iterator",
            Value::Deferred(_) => "deferred",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Value::Default)
    }

    /// Standard truthiness: empty, zero and null-like values are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object(object) => object.is_truthy(),
            Value::Default | Value::Callable(_) | Value::Iterator(_) | Value::Deferred(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Member access used by the default traverser.
    ///
    /// Only host objects and repeat iterators have attributes; everything
    /// else is reached through [`Value::item`].
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(object) => object.attribute(name),
            Value::Iterator(it) => iterator::bind_query(it, name),
            _ => None,
        }
    }

    /// Subscript access: mapping keys, list/text indices, host items.
    pub fn item(&self, key: &str) -> Result<Value, EvalError> {
        match self {
            Value::Map(map) => map
                .get(key)
                .cloned()
                .ok_or_else(|| EvalError::KeyNotFound { key: key.into() }),
            Value::List(items) => {
                let index = resolve_index(key, items.len())?;
                Ok(items[index].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let index = resolve_index(key, chars.len())?;
                Ok(Value::Str(chars[index].into()))
            }
            Value::Object(object) => object.item(key),
            _ => Err(EvalError::NotTraversable {
                type_name: self.type_name().into(),
                segment: key.into(),
            }),
        }
    }

    /// Invoke the value if it has the zero-argument call capability.
    ///
    /// Returns `None` for values that are not invocable.
    pub fn try_invoke(&self) -> Option<Result<Value, EvalError>> {
        match self {
            Value::Callable(func) => Some(func.invoke()),
            Value::Object(object) => object.as_invocable().map(|func| func.invoke()),
            Value::Deferred(wrapper) => Some(wrapper.force()),
            _ => None,
        }
    }

    pub fn is_invocable(&self) -> bool {
        match self {
            Value::Callable(_) | Value::Deferred(_) => true,
            Value::Object(object) => object.as_invocable().is_some(),
            _ => false,
        }
    }

    /// Iterate the value as a sequence: list elements, mapping keys, text
    /// characters, or whatever a host object yields.
    pub fn iter_items(&self) -> Result<ValueIter, EvalError> {
        match self {
            Value::List(items) => {
                let items = Rc::clone(items);
                Ok(Box::new((0..items.len()).map(move |i| items[i].clone())))
            }
            Value::Map(map) => {
                let keys: Vec<Value> = map.keys().cloned().map(Value::Str).collect();
                Ok(Box::new(keys.into_iter()))
            }
            Value::Str(s) => {
                let chars: Vec<Value> = s.chars().map(|c| Value::Str(c.into())).collect();
                Ok(Box::new(chars.into_iter()))
            }
            Value::Object(object) => object.iterate().ok_or_else(|| EvalError::NotIterable {
                type_name: object.type_name().into(),
            }),
            _ => Err(EvalError::NotIterable {
                type_name: self.type_name().into(),
            }),
        }
    }

    /// Size of the value as a sequence, if it can report one.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            Value::Str(s) => Some(s.chars().count()),
            Value::Object(object) => object.length(),
            _ => None,
        }
    }

    /// Text form used by string interpolation and `evaluate_text`.
    ///
    /// Deferred wrappers are forced first; everything else uses `Display`.
    pub fn to_text(&self) -> Result<EcoString, EvalError> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            Value::Deferred(wrapper) => wrapper.force()?.to_text(),
            other => Ok(eco_format!("{other}")),
        }
    }

    fn fmt_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s.as_str()),
            other => write!(f, "{other}"),
        }
    }
}

fn resolve_index(key: &str, len: usize) -> Result<usize, EvalError> {
    let index: i64 = key.parse().map_err(|_| EvalError::TypeMismatch {
        message: eco_format!("sequence indices must be integers, not \"{key}\""),
    })?;
    let resolved = if index < 0 { index + len as i64 } else { index };
    if (0..len as i64).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(EvalError::IndexOutOfRange { index, len })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nothing"),
            Value::Default => write!(f, "default"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_repr(f)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: ", key.as_str())?;
                    value.fmt_repr(f)?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => object.fmt_text(f),
            Value::Callable(_) => write!(f, "<callable>"),
            Value::Iterator(it) => write!(f, "<iterator {}>", it.borrow().name()),
            Value::Deferred(wrapper) => write!(f, "<deferred {}>", wrapper.expression()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Default, Value::Default) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (Value::Callable(a), Value::Callable(b)) => {
                core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (Value::Iterator(a), Value::Iterator(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<EcoString> for Value {
    fn from(value: EcoString) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(Rc::new(map))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
