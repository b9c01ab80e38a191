//! TALES - the Template Attribute Language Expression Syntax
//!
//! # Overview
//!
//! TALES expressions are the small strings a page template evaluates to fill
//! in attributes and content: `user/name`, `string:Hello ${user/name}`,
//! `not:exists:request/form/id`. This crate bundles the engine from
//! [`tales_core`] with error rendering for terminals and logs.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tales::{Engine, Value};
//!
//! // Build the registry once and share it.
//! let engine = Arc::new(Engine::with_standard_types());
//! let greeting = engine.compile("string:Hello ${user/name | default}!").unwrap();
//!
//! // One context per template run.
//! let context = engine
//!     .context()
//!     .root("user", Value::map([("name", Value::from("Ada"))]))
//!     .build();
//! assert_eq!(context.evaluate(&greeting).unwrap(), Value::from("Hello Ada!"));
//! ```
//!
//! # Driving templates
//!
//! A template driver opens a scope per element, binds variables with
//! [`Context::set_local`] and [`Context::set_global`], and installs loop
//! iterators with [`Context::set_repeat`]:
//!
//! ```
//! use std::sync::Arc;
//! use tales::{Engine, Value};
//!
//! let engine = Arc::new(Engine::with_standard_types());
//! let context = engine
//!     .context()
//!     .root("items", Value::list([Value::from("a"), Value::from("b")]))
//!     .build();
//!
//! context.begin_scope();
//! let items = context.set_repeat("item", "items").unwrap();
//! let mut out = Vec::new();
//! while items.borrow_mut().advance().unwrap() {
//!     let line = context.evaluate("string:${repeat/item/number}. $item").unwrap();
//!     out.push(line.to_text().unwrap().to_string());
//! }
//! context.end_scope().unwrap();
//! assert_eq!(out, ["1. a", "2. b"]);
//! ```
//!
//! # Errors
//!
//! Compile errors point at the offending text. Render them, or any other
//! [`Error`], with [`render_error`] and friends.

pub mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from tales_core
pub use tales_core::api::{ContextBuilder, Engine, EngineOptions, Error, ExecutionOptions};
pub use tales_core::errors::{CompileError, RegistrationError};
pub use tales_core::evaluator::{Context, ErrorInfo, EvalError, Position, Translator};
pub use tales_core::expressions::{self, CompiledExpression, Expression};
pub use tales_core::iterator::{RepeatIterator, SharedIterator};
pub use tales_core::values::{self, HostObject, NativeFunction, Value, ValueMap};
