//! Builder for evaluation contexts.

use std::sync::Arc;

use ecow::EcoString;

use super::{Engine, ExecutionOptions};
use crate::evaluator::{Context, IdentityTranslator, Translator};
use crate::values::{Value, ValueMap};

/// Builder returned by [`Engine::context`].
///
/// Roots added with [`ContextBuilder::roots`] win over same-named roots
/// added with [`ContextBuilder::root`], whatever the call order. The fixed
/// roots `nothing`, `default`, `repeat` and `loop` win over both.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tales_core::api::{Engine, ExecutionOptions};
/// use tales_core::values::Value;
///
/// let engine = Arc::new(Engine::with_standard_types());
/// let context = engine
///     .context()
///     .root("x", Value::from(1))
///     .roots([("x", Value::from(2))])
///     .execution_options(ExecutionOptions { max_depth: 64 })
///     .build();
/// assert_eq!(context.evaluate("x").unwrap(), Value::from(2));
/// ```
pub struct ContextBuilder {
    engine: Arc<Engine>,
    named: ValueMap,
    mapping: ValueMap,
    options: ExecutionOptions,
    translator: Box<dyn Translator>,
}

impl ContextBuilder {
    pub(crate) fn new(engine: Arc<Engine>) -> Self {
        let options = engine.options().default_execution_options.clone();
        Self {
            engine,
            named: ValueMap::new(),
            mapping: ValueMap::new(),
            options,
            translator: Box::new(IdentityTranslator),
        }
    }

    /// Add one named root.
    pub fn root(mut self, name: impl Into<EcoString>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Add a mapping of roots.
    pub fn roots<K, V>(mut self, mapping: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<EcoString>,
        V: Into<Value>,
    {
        self.mapping
            .extend(mapping.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the engine's default execution options.
    pub fn execution_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `translator` for [`Context::translate`].
    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn build(self) -> Context {
        let mut roots = self.named;
        roots.extend(self.mapping);
        Context::new(self.engine, roots, self.options, self.translator)
    }
}
