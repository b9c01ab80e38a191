//! Boolean negation: `not:exists:request/form/id`.

use ecow::EcoString;

use super::{CompiledExpression, Expression};
use crate::api::Engine;
use crate::errors::CompileError;
use crate::evaluator::{Context, EvalError};
use crate::values::Value;

#[derive(Debug)]
pub struct NotExpr {
    type_name: EcoString,
    source: EcoString,
    operand: CompiledExpression,
}

impl NotExpr {
    /// Compile the left-trimmed remainder as a full expression, prefix and all.
    pub fn compile(
        type_name: &str,
        text: &str,
        engine: &Engine,
    ) -> Result<CompiledExpression, CompileError> {
        let text = text.trim_start();
        Ok(CompiledExpression::new(NotExpr {
            type_name: type_name.into(),
            source: text.into(),
            operand: engine.compile(text)?,
        }))
    }
}

impl Expression for NotExpr {
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        Ok(Value::Bool(!context.evaluate_boolean(&self.operand)?))
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn source(&self) -> &str {
        &self.source
    }
}
