//! Deferred evaluation: `defer:` and `lazy:`.

use ecow::EcoString;

use super::{CompiledExpression, Expression};
use crate::api::Engine;
use crate::errors::CompileError;
use crate::evaluator::{Context, EvalError, WeakContext};
use crate::values::Value;

/// Compiles its operand without evaluating it.
///
/// Evaluation yields a [`Value::Deferred`] that re-runs the operand against
/// the same context every time it is forced.
#[derive(Debug)]
pub struct DeferExpr {
    type_name: EcoString,
    source: EcoString,
    operand: CompiledExpression,
}

impl DeferExpr {
    pub fn compile(
        type_name: &str,
        text: &str,
        engine: &Engine,
    ) -> Result<CompiledExpression, CompileError> {
        let text = text.trim_start();
        Ok(CompiledExpression::new(DeferExpr {
            type_name: type_name.into(),
            source: text.into(),
            operand: engine.compile(text)?,
        }))
    }
}

impl Expression for DeferExpr {
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        Ok(Value::Deferred(DeferWrapper {
            expression: self.operand.clone(),
            context: context.downgrade(),
        }))
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// A compiled expression bound to the context it was deferred in.
#[derive(Debug, Clone)]
pub struct DeferWrapper {
    expression: CompiledExpression,
    context: WeakContext,
}

impl DeferWrapper {
    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }

    /// Evaluate the bound expression now. Results are not cached.
    pub fn force(&self) -> Result<Value, EvalError> {
        let context = self.context.upgrade().ok_or(EvalError::ContextDropped)?;
        context.evaluate(&self.expression)
    }
}
