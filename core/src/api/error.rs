//! Unified error type for embedding applications.

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::errors::{CompileError, RegistrationError};
use crate::evaluator::{Context, ErrorInfo, EvalError};

/// Any failure the engine reports to its host.
///
/// Compile errors carry their own source text. Evaluation errors keep the
/// expression they were raised for so renderers can show it.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compilation(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registration(#[from] RegistrationError),

    #[error("{info}")]
    #[diagnostic(code(tales::evaluation))]
    Evaluation {
        info: ErrorInfo,
        expression: EcoString,
    },
}

impl Error {
    /// Wrap a failure of `expression` evaluated in `context`.
    ///
    /// Compile errors of text evaluated on the fly are unwrapped so they
    /// keep their span.
    pub fn evaluation(context: &Context, expression: &str, error: EvalError) -> Self {
        match error {
            EvalError::Compile(err) => Error::Compilation(err),
            other => Error::Evaluation {
                info: context.create_error_info(other),
                expression: expression.into(),
            },
        }
    }
}
