//! Expression types and their compiled form.
//!
//! Every expression type is a factory registered on the [`Engine`] under a
//! name. Compiling `name:rest` calls the factory with the name, the remainder
//! and the engine, so factories can compile nested expressions (`not:`,
//! `defer:`, path alternatives with their own prefix, interpolation sites).
//!
//! The standard set:
//!
//! | name                                  | type          |
//! |---------------------------------------|---------------|
//! | `standard`, `path`, `exists`, `nocall`| [`PathExpr`]  |
//! | `string`                              | [`StringExpr`]|
//! | `not`                                 | [`NotExpr`]   |
//! | `defer`, `lazy`                       | [`DeferExpr`] |

mod defer;
mod not;
mod path;
mod string;
mod traverse;


use core::fmt;
use std::sync::Arc;

pub use defer::{DeferExpr, DeferWrapper};
pub use not::NotExpr;
pub use path::{PathExpr, PathMode};
pub use string::StringExpr;
pub use traverse::{DefaultTraverser, Traverser};

use crate::api::Engine;
use crate::errors::CompileError;
use crate::evaluator::{Context, EvalError};
use crate::values::Value;

/// A compiled expression node.
///
/// Implementations are immutable once built and shared across threads.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Evaluate against `context`.
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError>;

    /// Registered type name the expression was compiled under.
    fn type_name(&self) -> &str;

    /// Expression text after the type prefix.
    fn source(&self) -> &str;
}

/// Handle to a compiled expression. Cloning shares the compiled tree.
#[derive(Clone)]
pub struct CompiledExpression(Arc<dyn Expression>);

impl CompiledExpression {
    pub fn new(expression: impl Expression + 'static) -> Self {
        CompiledExpression(Arc::new(expression))
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn source(&self) -> &str {
        self.0.source()
    }

    /// Run the expression directly, bypassing the context's depth guard.
    /// Callers go through [`Context::evaluate`].
    pub(crate) fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        self.0.evaluate(context)
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} expression ({:?})", self.type_name(), self.source())
    }
}

/// Either raw expression text or an already compiled expression.
///
/// Evaluation entry points on [`Context`] accept both.
#[derive(Debug, Clone, Copy)]
pub enum ExpressionRef<'a> {
    Text(&'a str),
    Compiled(&'a CompiledExpression),
}

impl<'a> From<&'a str> for ExpressionRef<'a> {
    fn from(text: &'a str) -> Self {
        ExpressionRef::Text(text)
    }
}

impl<'a> From<&'a String> for ExpressionRef<'a> {
    fn from(text: &'a String) -> Self {
        ExpressionRef::Text(text)
    }
}

impl<'a> From<&'a CompiledExpression> for ExpressionRef<'a> {
    fn from(expression: &'a CompiledExpression) -> Self {
        ExpressionRef::Compiled(expression)
    }
}

/// Builds a compiled expression from `(type_name, text, engine)`.
pub type ExpressionFactory =
    Arc<dyn Fn(&str, &str, &Engine) -> Result<CompiledExpression, CompileError> + Send + Sync>;

/// The standard expression types, in registration order.
pub(crate) fn standard_types() -> Vec<(&'static str, ExpressionFactory)> {
    let path: ExpressionFactory = Arc::new(PathExpr::factory(Arc::new(DefaultTraverser)));
    let string: ExpressionFactory = Arc::new(StringExpr::compile);
    let not: ExpressionFactory = Arc::new(NotExpr::compile);
    let defer: ExpressionFactory = Arc::new(DeferExpr::compile);
    vec![
        ("standard", path.clone()),
        ("path", path.clone()),
        ("exists", path.clone()),
        ("nocall", path),
        ("string", string),
        ("not", not),
        ("defer", defer.clone()),
        ("lazy", defer),
    ]
}
