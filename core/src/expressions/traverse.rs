//! Path traversal.

use core::fmt;

use ecow::EcoString;

use crate::evaluator::{Context, EvalError};
use crate::values::Value;

/// Walks the segments after a path's base name.
///
/// Register a path factory with a custom traverser to restrict or extend
/// what paths can reach; see [`super::PathExpr::factory`].
pub trait Traverser: fmt::Debug + Send + Sync {
    fn traverse(
        &self,
        object: Value,
        segments: &[EcoString],
        context: &Context,
    ) -> Result<Value, EvalError>;
}

/// Attribute access first, then item access, for each segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTraverser;

impl Traverser for DefaultTraverser {
    fn traverse(
        &self,
        mut object: Value,
        segments: &[EcoString],
        _context: &Context,
    ) -> Result<Value, EvalError> {
        for segment in segments {
            object = match object.attribute(segment) {
                Some(next) => next,
                None => object.item(segment)?,
            };
        }
        Ok(object)
    }
}
