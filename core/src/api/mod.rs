//! Public API for the TALES expression engine.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tales_core::api::Engine;
//! use tales_core::values::Value;
//!
//! let engine = Arc::new(Engine::with_standard_types());
//! let expr = engine.compile("user/name | string:anonymous").unwrap();
//!
//! let context = engine
//!     .context()
//!     .root("user", Value::map([("name", Value::from("Ada"))]))
//!     .build();
//! assert_eq!(context.evaluate(&expr).unwrap(), Value::from("Ada"));
//! ```

pub mod context_builder;
pub mod engine;
pub mod error;
pub mod options;

pub use context_builder::ContextBuilder;
pub use engine::{Engine, NamespaceFactory};
pub use error::Error;
pub use options::{EngineOptions, ExecutionOptions};
