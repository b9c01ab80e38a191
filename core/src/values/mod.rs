//! Dynamic values flowing through expressions.
//!
//! Templates traverse whatever the host application hands them, so values
//! are dynamically typed: a handful of built-in shapes (text, numbers, lists,
//! mappings) plus host objects reached through the [`HostObject`] trait and
//! zero-argument callables through [`Invocable`].

mod host;
mod value;

pub use host::{HostObject, Invocable, NativeFunction};
pub use value::{Value, ValueIter, ValueMap};
