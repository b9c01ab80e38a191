//! Evaluation state and errors.
//!
//! A [`Context`] is created per template run. The driver walking the
//! document opens and closes scopes on it, binds variables, installs repeat
//! iterators, and asks it to evaluate compiled expressions (or raw text,
//! compiled on the fly).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tales_core::{Engine, Value};
//!
//! let engine = Arc::new(Engine::with_standard_types());
//! let context = engine.context().root("user", Value::map([("name", "Ada".into())])).build();
//!
//! context.begin_scope();
//! context.set_local("greeting", "Hello");
//! let text = context.evaluate_text("string:$greeting, ${user/name}!")?;
//! assert_eq!(text, Value::from("Hello, Ada!"));
//! context.end_scope()?;
//! ```

mod context;
mod error;
mod translate;

#[cfg(test)]
mod context_test;

pub use context::{Context, Position, WeakContext};
pub use error::{ErrorInfo, EvalError};
pub use translate::{IdentityTranslator, Translator};
