//! Setup-time and compile-time errors.
//!
//! Both are authoring mistakes: they are raised while building the engine or
//! compiling expression text, and nothing inside the engine recovers from
//! them. Evaluation failures live in [`crate::evaluator::EvalError`].

use core::fmt;
use core::ops::Range;

use ecow::EcoString;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Error raised when expression text cannot be compiled.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CompileError {
    #[error("unrecognized expression type \"{type_name}\"")]
    #[diagnostic(
        code(tales::compile::unknown_type),
        help("register the type on the engine, or drop the prefix to use the default type")
    )]
    UnknownType {
        type_name: EcoString,
        #[source_code]
        src: String,
        #[label("not a registered expression type")]
        span: SourceSpan,
    },

    #[error("invalid variable name \"{name}\"")]
    #[diagnostic(
        code(tales::compile::invalid_name),
        help("a path must start with a letter followed by letters, digits or underscores")
    )]
    InvalidVariableName {
        name: EcoString,
        #[source_code]
        src: String,
        #[label("invalid base name")]
        span: SourceSpan,
    },

    #[error("$ must be doubled or followed by a simple path")]
    #[diagnostic(
        code(tales::compile::interpolation),
        help("write $$ for a literal dollar sign")
    )]
    InvalidInterpolation {
        #[source_code]
        src: String,
        #[label("unexpected $")]
        span: SourceSpan,
    },
}

impl CompileError {
    pub(crate) fn unknown_type(type_name: &str, src: &str) -> Self {
        CompileError::UnknownType {
            type_name: type_name.into(),
            src: src.into(),
            span: (0, type_name.len()).into(),
        }
    }

    /// The expression text the error was raised for.
    pub fn source_text(&self) -> &str {
        match self {
            CompileError::UnknownType { src, .. }
            | CompileError::InvalidVariableName { src, .. }
            | CompileError::InvalidInterpolation { src, .. } => src,
        }
    }

    /// Byte range of the offending text within [`CompileError::source_text`].
    pub fn span(&self) -> Range<usize> {
        let span = match self {
            CompileError::UnknownType { span, .. }
            | CompileError::InvalidVariableName { span, .. }
            | CompileError::InvalidInterpolation { span, .. } => span,
        };
        span.offset()..span.offset() + span.len()
    }
}

/// Which registry table a registration targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    ExpressionType,
    BaseName,
    FunctionNamespace,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::ExpressionType => write!(f, "expression type"),
            RegistryKind::BaseName => write!(f, "base name"),
            RegistryKind::FunctionNamespace => write!(f, "function namespace"),
        }
    }
}

/// Error raised by the engine's registration calls.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RegistrationError {
    #[error("invalid {kind} name \"{name}\"")]
    #[diagnostic(code(tales::registration::invalid_name))]
    InvalidName { kind: RegistryKind, name: EcoString },

    #[error("multiple registrations for {kind} \"{name}\"")]
    #[diagnostic(code(tales::registration::duplicate))]
    Duplicate { kind: RegistryKind, name: EcoString },
}
