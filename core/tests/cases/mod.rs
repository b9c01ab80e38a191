//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tales_core::api::Engine;
use tales_core::errors::CompileError;
use tales_core::evaluator::{Context, EvalError};
use tales_core::expressions::{CompiledExpression, Expression};
use tales_core::values::{HostObject, Value, ValueMap};

pub static ENGINE: Lazy<Arc<Engine>> = Lazy::new(|| Arc::new(Engine::with_standard_types()));

/// Attribute bag that prints as its `name` attribute, if it has one.
#[derive(Debug, Default)]
pub struct Data(pub ValueMap);

impl Data {
    pub fn new<K: Into<ecow::EcoString>>(attrs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::object(Data(attrs.into_iter().map(|(k, v)| (k.into(), v)).collect()))
    }
}

impl HostObject for Data {
    fn type_name(&self) -> &str {
        "Data"
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }

    fn fmt_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get("name") {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "<Data>"),
        }
    }
}

/// The variables of the classic expression tests.
pub fn classic_context() -> Context {
    let z = Data::new([("name", Value::from("zope"))]);
    let y = Data::new([("name", Value::from("yikes")), ("z", z)]);
    let x = Data::new([("name", Value::from("xander")), ("y", y)]);
    ENGINE
        .context()
        .root("x", x)
        .root("y", Data::new([("z", Value::Int(3))]))
        .root("b", "boot")
        .root("B", 2)
        .build()
}

/// Evaluates to `[type_name, text]`, so tests can see how it was compiled.
#[derive(Debug)]
pub struct SimpleExpr {
    type_name: ecow::EcoString,
    text: ecow::EcoString,
}

impl SimpleExpr {
    pub fn compile(
        type_name: &str,
        text: &str,
        _engine: &Engine,
    ) -> Result<CompiledExpression, CompileError> {
        Ok(CompiledExpression::new(SimpleExpr {
            type_name: type_name.into(),
            text: text.into(),
        }))
    }
}

impl Expression for SimpleExpr {
    fn evaluate(&self, _context: &Context) -> Result<Value, EvalError> {
        Ok(Value::list([
            Value::Str(self.type_name.clone()),
            Value::Str(self.text.clone()),
        ]))
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn source(&self) -> &str {
        &self.text
    }
}
