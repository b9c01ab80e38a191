//! Core of the TALES expression engine.
//!
//! Expressions are short strings such as `user/name`, `string:Hello ${user/name}`
//! or `not:exists:request/form/id`. An [`api::Engine`] holds the registry of
//! expression types and compiles text into [`expressions::CompiledExpression`]s;
//! an [`evaluator::Context`] holds the scoped variables a template driver
//! manipulates while it walks a document, and evaluates compiled expressions
//! against them.

pub mod api;
pub mod errors;
pub mod evaluator;
pub mod expressions;
pub mod iterator;
pub mod scope_stack;
pub mod syntax;
pub mod values;

pub use api::{Engine, EngineOptions, Error, ExecutionOptions};
pub use errors::{CompileError, RegistrationError};
pub use evaluator::{Context, EvalError};
pub use expressions::CompiledExpression;
pub use values::Value;

// Compiled expressions and the registry are shared across threads; values,
// contexts and iterators are not.
static_assertions::assert_impl_all!(api::Engine: Send, Sync);
static_assertions::assert_impl_all!(expressions::CompiledExpression: Send, Sync, Clone);
static_assertions::assert_not_impl_any!(evaluator::Context: Send, Sync);

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_alternation() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
