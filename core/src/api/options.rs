//! Configuration options for the TALES engine.

use ecow::EcoString;

/// Configuration options for expression evaluation.
///
/// These options control resource limits during evaluation.
///
/// # Example
///
/// ```
/// use tales_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions { max_depth: 500 };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum nesting of evaluations (`not:not:...`, string sites, deferred
    /// values forcing each other).
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// Configuration options for the TALES engine.
///
/// # Example
///
/// ```
/// use tales_core::api::{EngineOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     default_type: "path".into(),
///     default_execution_options: ExecutionOptions { max_depth: 200 },
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Expression type used for text without an `identifier:` prefix.
    ///
    /// Default: `standard`
    pub default_type: EcoString,

    /// Execution options every new context starts with.
    ///
    /// These can be overridden with `ContextBuilder::execution_options()`.
    pub default_execution_options: ExecutionOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_type: "standard".into(),
            default_execution_options: ExecutionOptions::default(),
        }
    }
}
