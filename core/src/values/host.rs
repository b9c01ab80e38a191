//! Traits through which host objects take part in traversal and invocation.

use core::fmt;

use ecow::EcoString;

use super::{Value, ValueIter};
use crate::evaluator::EvalError;

/// An object supplied by the embedding application.
///
/// Path traversal asks for an attribute first and falls back to item access,
/// so a host type only needs to implement whichever of the two fits it.
/// Failures should use the undefined-class variants of [`EvalError`] so that
/// path alternation can fall through them.
pub trait HostObject: fmt::Debug {
    /// Name used in error messages.
    fn type_name(&self) -> &str;

    /// Member access. `None` means "no such attribute", not a failure.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Subscript access, used when [`HostObject::attribute`] returns `None`.
    fn item(&self, key: &str) -> Result<Value, EvalError> {
        Err(EvalError::NotTraversable {
            type_name: self.type_name().into(),
            segment: key.into(),
        })
    }

    /// Items produced when the object is used as a repeat sequence.
    fn iterate(&self) -> Option<ValueIter> {
        None
    }

    /// Size of the sequence, if the object can report one.
    fn length(&self) -> Option<usize> {
        None
    }

    /// Truthiness; sized objects are false when empty.
    fn is_truthy(&self) -> bool {
        self.length().is_none_or(|len| len > 0)
    }

    /// The zero-argument call capability, if the object has one.
    fn as_invocable(&self) -> Option<&dyn Invocable> {
        None
    }

    /// Text form used by `evaluate_text` and string interpolation.
    fn fmt_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.type_name())
    }
}

/// A value that can be called with no arguments.
///
/// `standard` path expressions invoke an invocable result exactly once;
/// `nocall` returns it untouched.
pub trait Invocable: fmt::Debug {
    fn invoke(&self) -> Result<Value, EvalError>;
}

/// An [`Invocable`] backed by a Rust closure.
pub struct NativeFunction<F> {
    name: EcoString,
    func: F,
}

impl<F> NativeFunction<F>
where
    F: Fn() -> Result<Value, EvalError>,
{
    pub fn new(name: impl Into<EcoString>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Invocable for NativeFunction<F>
where
    F: Fn() -> Result<Value, EvalError>,
{
    fn invoke(&self) -> Result<Value, EvalError> {
        (self.func)()
    }
}

impl<F> fmt::Debug for NativeFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFunction").field(&self.name).finish()
    }
}
