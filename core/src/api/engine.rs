//! The TALES expression engine.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use ecow::EcoString;
use hashbrown::HashMap;
use indexmap::IndexMap;
use tracing::trace;

use super::{ContextBuilder, EngineOptions};
use crate::errors::{CompileError, RegistrationError, RegistryKind};
use crate::evaluator::Context;
use crate::expressions::{self, CompiledExpression, ExpressionFactory};
use crate::syntax::{is_valid_name, split_type_prefix};
use crate::values::{Value, ValueMap};

/// Builds a function namespace object around the value it is applied to.
pub type NamespaceFactory = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The expression-type registry and compiler.
///
/// The engine manages:
/// - Expression types: name → factory, dispatched on by [`Engine::compile`]
/// - Base names and function namespaces: side tables for host code
/// - Defaults for new contexts (EngineOptions)
///
/// Registrations are permanent. Build the engine once, wrap it in an
/// [`Arc`], and share it between threads; each template run gets its own
/// [`Context`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tales_core::api::Engine;
/// use tales_core::expressions::StringExpr;
/// use tales_core::values::Value;
///
/// let mut engine = Engine::with_standard_types();
/// engine
///     .register_type("upper", |name, text, engine| {
///         StringExpr::compile(name, &text.to_uppercase(), engine)
///     })
///     .unwrap();
///
/// let engine = Arc::new(engine);
/// let context = engine.context().build();
/// assert_eq!(context.evaluate("upper:hello").unwrap(), Value::from("HELLO"));
/// ```
pub struct Engine {
    types: IndexMap<EcoString, ExpressionFactory>,
    base_names: HashMap<EcoString, Arc<dyn Any + Send + Sync>>,
    namespaces: HashMap<EcoString, NamespaceFactory>,
    options: EngineOptions,
}

impl Engine {
    /// Create an engine with no expression types registered.
    pub fn new(options: EngineOptions) -> Self {
        Self {
            types: IndexMap::new(),
            base_names: HashMap::new(),
            namespaces: HashMap::new(),
            options,
        }
    }

    /// Create an engine with the standard expression types and default
    /// options.
    pub fn with_standard_types() -> Self {
        Self::standard(EngineOptions::default())
    }

    /// Create an engine with the standard expression types: `standard`,
    /// `path`, `exists`, `nocall`, `string`, `not`, `defer` and `lazy`.
    pub fn standard(options: EngineOptions) -> Self {
        let mut engine = Self::new(options);
        engine.types.extend(
            expressions::standard_types()
                .into_iter()
                .map(|(name, factory)| (EcoString::from(name), factory)),
        );
        engine
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // Registration

    /// Register an expression type.
    ///
    /// Fails if `name` is not an identifier or is already registered.
    pub fn register_type<F>(&mut self, name: &str, factory: F) -> Result<(), RegistrationError>
    where
        F: Fn(&str, &str, &Engine) -> Result<CompiledExpression, CompileError>
            + Send
            + Sync
            + 'static,
    {
        let name = check_name(RegistryKind::ExpressionType, name, |n| {
            self.types.contains_key(n)
        })?;
        self.types.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Registered expression types, in registration order.
    pub fn types(&self) -> &IndexMap<EcoString, ExpressionFactory> {
        &self.types
    }

    /// The factory registered under `name`.
    pub fn factory(&self, name: &str) -> Option<ExpressionFactory> {
        self.types.get(name).cloned()
    }

    /// Register a host object under a base name.
    pub fn register_base_name<T>(&mut self, name: &str, object: T) -> Result<(), RegistrationError>
    where
        T: Any + Send + Sync,
    {
        let name = check_name(RegistryKind::BaseName, name, |n| {
            self.base_names.contains_key(n)
        })?;
        self.base_names.insert(name, Arc::new(object));
        Ok(())
    }

    pub fn base_name(&self, name: &str) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.base_names.get(name)
    }

    pub fn base_names(&self) -> &HashMap<EcoString, Arc<dyn Any + Send + Sync>> {
        &self.base_names
    }

    /// Register a function namespace factory.
    pub fn register_function_namespace<F>(
        &mut self,
        name: &str,
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let name = check_name(RegistryKind::FunctionNamespace, name, |n| {
            self.namespaces.contains_key(n)
        })?;
        self.namespaces.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn function_namespace(&self, name: &str) -> Option<&NamespaceFactory> {
        self.namespaces.get(name)
    }

    // Compilation

    /// Compile expression text.
    ///
    /// A leading `identifier:` selects the expression type; without one the
    /// engine's default type (`standard`) is used. Nothing is cached.
    pub fn compile(&self, text: &str) -> Result<CompiledExpression, CompileError> {
        let (type_name, rest) =
            split_type_prefix(text).unwrap_or((self.options.default_type.as_str(), text));
        let factory = self
            .types
            .get(type_name)
            .ok_or_else(|| CompileError::unknown_type(type_name, text))?;
        trace!(type_name, rest, "compile");
        factory(type_name, rest, self)
    }

    // Contexts

    /// Start building an evaluation context.
    pub fn context(self: &Arc<Self>) -> ContextBuilder {
        ContextBuilder::new(Arc::clone(self))
    }

    /// Build a context from named roots and a mapping; mapping entries win.
    pub fn get_context<K>(
        self: &Arc<Self>,
        mapping: Option<ValueMap>,
        named: impl IntoIterator<Item = (K, Value)>,
    ) -> Context
    where
        K: Into<EcoString>,
    {
        let mut builder = self.context();
        for (name, value) in named {
            builder = builder.root(name, value);
        }
        if let Some(mapping) = mapping {
            builder = builder.roots(mapping);
        }
        builder.build()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_standard_types()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("base_names", &self.base_names.keys().collect::<Vec<_>>())
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

fn check_name(
    kind: RegistryKind,
    name: &str,
    taken: impl FnOnce(&str) -> bool,
) -> Result<EcoString, RegistrationError> {
    if !is_valid_name(name) {
        return Err(RegistrationError::InvalidName {
            kind,
            name: name.into(),
        });
    }
    if taken(name) {
        return Err(RegistrationError::Duplicate {
            kind,
            name: name.into(),
        });
    }
    Ok(name.into())
}
