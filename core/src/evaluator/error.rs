//! Evaluation errors.
//!
//! # Error Categories
//!
//! - **Undefined-class errors**: a name, attribute, key or index could not be
//!   resolved, or a value had the wrong shape for traversal or iteration.
//!   Path alternation (`a | b`) falls through these and `exists:` turns them
//!   into `false`. See [`EvalError::is_undefined`].
//!
//! - **Everything else**: iterator and scope misuse, dropped contexts, the
//!   depth limit, host failures and compile errors of text evaluated on the
//!   fly. These always propagate.

use core::fmt;

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Position;
use crate::errors::CompileError;
use crate::iterator::IteratorError;
use crate::scope_stack::ScopeError;

/// Error raised while evaluating an expression.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum EvalError {
    #[error("undefined: {name}")]
    #[diagnostic(code(tales::eval::undefined))]
    Undefined { name: EcoString },

    #[error("name \"{name}\" is not defined")]
    #[diagnostic(code(tales::eval::name_not_found))]
    NameNotFound { name: EcoString },

    #[error("{type_name} has no attribute \"{name}\"")]
    #[diagnostic(code(tales::eval::attribute_not_found))]
    AttributeNotFound { type_name: EcoString, name: EcoString },

    #[error("key \"{key}\" not found")]
    #[diagnostic(code(tales::eval::key_not_found))]
    KeyNotFound { key: EcoString },

    #[error("index {index} out of range (length: {len})")]
    #[diagnostic(code(tales::eval::index_out_of_range))]
    IndexOutOfRange { index: i64, len: usize },

    #[error("type mismatch: {message}")]
    #[diagnostic(code(tales::eval::type_mismatch))]
    TypeMismatch { message: EcoString },

    #[error("cannot traverse \"{segment}\" on a value of type {type_name}")]
    #[diagnostic(code(tales::eval::not_traversable))]
    NotTraversable {
        type_name: EcoString,
        segment: EcoString,
    },

    #[error("a value of type {type_name} is not iterable")]
    #[diagnostic(code(tales::eval::not_iterable))]
    NotIterable { type_name: EcoString },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Iterator(#[from] IteratorError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scope(#[from] ScopeError),

    #[error("the evaluation context has been dropped")]
    #[diagnostic(
        code(tales::eval::context_dropped),
        help("deferred values and iterators cannot outlive the context that created them")
    )]
    ContextDropped,

    #[error("evaluation depth {depth} exceeds maximum of {max_depth}")]
    #[diagnostic(
        code(tales::eval::depth_exceeded),
        help("raise ExecutionOptions::max_depth or break the nesting chain")
    )]
    DepthExceeded { depth: usize, max_depth: usize },

    #[error("{message}")]
    #[diagnostic(code(tales::eval::host))]
    Host { message: EcoString },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),
}

impl EvalError {
    /// Whether path alternation and `exists:` may recover from this error.
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            EvalError::Undefined { .. }
                | EvalError::NameNotFound { .. }
                | EvalError::AttributeNotFound { .. }
                | EvalError::KeyNotFound { .. }
                | EvalError::IndexOutOfRange { .. }
                | EvalError::TypeMismatch { .. }
                | EvalError::NotTraversable { .. }
                | EvalError::NotIterable { .. }
        )
    }

    /// Failure raised by host code.
    pub fn host(message: impl Into<EcoString>) -> Self {
        EvalError::Host {
            message: message.into(),
        }
    }
}

/// An error together with where in the template it happened.
///
/// Built by [`super::Context::create_error_info`] for drivers that report
/// errors after the fact.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub error: EvalError,
    pub position: Position,
    pub source_file: Option<EcoString>,
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(file) = &self.source_file {
            write!(f, ", in {file}")?;
        }
        if let Some(line) = self.position.line {
            write!(f, ", at line {line}")?;
            if let Some(column) = self.position.column {
                write!(f, ", column {column}")?;
            }
        }
        Ok(())
    }
}
