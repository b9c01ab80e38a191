//! The evaluation context.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use ecow::EcoString;
use tracing::debug;

use super::{ErrorInfo, EvalError, Translator};
use crate::api::{Engine, ExecutionOptions};
use crate::expressions::{CompiledExpression, ExpressionRef};
use crate::iterator::{RepeatIterator, RepeatVars, SharedIterator};
use crate::scope_stack::{Frame, ScopeError, ScopeStack, Shadowed};
use crate::values::{Value, ValueMap};

/// Line and column of the template construct being evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
        }
    }
}

struct ContextState {
    engine: Arc<Engine>,
    options: ExecutionOptions,
    contexts: Rc<ValueMap>,
    repeat_vars: RepeatVars,
    scopes: RefCell<ScopeStack>,
    position: Cell<Position>,
    source_file: RefCell<Option<EcoString>>,
    translator: Box<dyn Translator>,
    depth: Cell<usize>,
}

/// Scoped variable environment that expressions are evaluated against.
///
/// `Context` is a cheap handle; clones share the same state. Deferred values
/// and repeat iterators keep a [`WeakContext`] back to it.
#[derive(Clone)]
pub struct Context(Rc<ContextState>);

/// Non-owning reference to a [`Context`].
#[derive(Clone)]
pub struct WeakContext(Weak<ContextState>);

impl WeakContext {
    /// The context, if it is still alive.
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }
}

impl fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.strong_count() > 0 { "live" } else { "dropped" };
        write!(f, "WeakContext({state})")
    }
}

/// Decrements the evaluation depth when an evaluation returns.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Context {
    /// Build a context over `roots`.
    ///
    /// `nothing`, `default`, `repeat` and `loop` are always present and win
    /// over same-named roots; `repeat` and `loop` share one registry.
    pub(crate) fn new(
        engine: Arc<Engine>,
        mut roots: ValueMap,
        options: ExecutionOptions,
        translator: Box<dyn Translator>,
    ) -> Self {
        let repeat_vars = RepeatVars::default();
        let registry = Value::Object(Rc::new(repeat_vars.clone()));
        roots.insert("nothing".into(), Value::Null);
        roots.insert("default".into(), Value::Default);
        roots.insert("repeat".into(), registry.clone());
        roots.insert("loop".into(), registry);

        let vars: Frame = roots.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Context(Rc::new(ContextState {
            engine,
            options,
            contexts: Rc::new(roots),
            repeat_vars,
            scopes: RefCell::new(ScopeStack::new(vars)),
            position: Cell::new(Position::default()),
            source_file: RefCell::new(None),
            translator,
            depth: Cell::new(0),
        }))
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.0.engine
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.0.options
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    // Scopes

    /// Open a scope: later local bindings are dropped by the matching
    /// [`Context::end_scope`].
    pub fn begin_scope(&self) {
        let mut scopes = self.0.scopes.borrow_mut();
        scopes.push();
        debug!(depth = scopes.depth(), "begin scope");
    }

    /// Close the innermost scope and restore the repeat iterators it shadowed.
    pub fn end_scope(&self) -> Result<(), ScopeError> {
        let undo = {
            let mut scopes = self.0.scopes.borrow_mut();
            let undo = scopes.pop()?;
            debug!(depth = scopes.depth(), restored = undo.len(), "end scope");
            undo
        };
        for (name, prior) in undo.into_iter().rev() {
            match prior {
                Shadowed::Absent => {
                    self.0.repeat_vars.remove(&name);
                }
                Shadowed::Iterator(it) => {
                    self.0.repeat_vars.insert(name, it);
                }
            }
        }
        Ok(())
    }

    /// Number of open scopes, not counting the root frame.
    pub fn scope_depth(&self) -> usize {
        self.0.scopes.borrow().depth()
    }

    /// Bind `name` in the innermost scope only.
    pub fn set_local(&self, name: impl Into<EcoString>, value: impl Into<Value>) {
        self.0
            .scopes
            .borrow_mut()
            .bind_local(name.into(), value.into());
    }

    /// Bind `name` in every open scope and the root frame.
    pub fn set_global(&self, name: impl Into<EcoString>, value: impl Into<Value>) {
        self.0
            .scopes
            .borrow_mut()
            .bind_global(name.into(), value.into());
    }

    /// Current binding of `name`.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.0.scopes.borrow().lookup(name).cloned()
    }

    /// Snapshot of the current bindings.
    pub fn vars(&self) -> Frame {
        self.0.scopes.borrow().current().clone()
    }

    /// The root mapping, reachable from paths as `CONTEXTS`.
    pub fn contexts(&self) -> Value {
        Value::Map(Rc::clone(&self.0.contexts))
    }

    // Repeat

    /// The active iterator named `name`.
    pub fn repeat(&self, name: &str) -> Option<SharedIterator> {
        self.0.repeat_vars.get(name)
    }

    pub fn repeat_vars(&self) -> &RepeatVars {
        &self.0.repeat_vars
    }

    /// Evaluate `expression` to a sequence and install an iterator over it.
    ///
    /// A falsy sequence yields an empty iterator that is not installed.
    /// Otherwise the iterator shadows any same-named one until the innermost
    /// scope ends, which requires a scope to be open.
    pub fn set_repeat<'a>(
        &self,
        name: impl Into<EcoString>,
        expression: impl Into<ExpressionRef<'a>>,
    ) -> Result<SharedIterator, EvalError> {
        let name = name.into();
        let sequence = self.evaluate(expression)?;
        if !sequence.is_truthy() {
            return Ok(Rc::new(RefCell::new(RepeatIterator::empty(name, self))));
        }
        if self.scope_depth() == 0 {
            return Err(ScopeError::NoOpenScope.into());
        }

        let iterator = Rc::new(RefCell::new(RepeatIterator::new(name.clone(), sequence, self)?));
        let prior = match self.0.repeat_vars.insert(name.clone(), Rc::clone(&iterator)) {
            Some(it) => Shadowed::Iterator(it),
            None => Shadowed::Absent,
        };
        self.0.scopes.borrow_mut().record_shadowed(name.clone(), prior)?;
        debug!(name = %name, "repeat installed");
        Ok(iterator)
    }

    // Evaluation

    /// Evaluate a compiled expression, or compile and evaluate raw text.
    ///
    /// Text is compiled on every call.
    pub fn evaluate<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<Value, EvalError> {
        let result = match expression.into() {
            ExpressionRef::Text(text) => self
                .0
                .engine
                .compile(text)
                .map_err(EvalError::from)
                .and_then(|compiled| self.eval_compiled(&compiled)),
            ExpressionRef::Compiled(compiled) => self.eval_compiled(compiled),
        };
        // Nested evaluations fail through their parent; log once at the top.
        if self.0.depth.get() == 0 {
            if let Err(err) = &result {
                let position = self.position();
                debug!(
                    line = ?position.line,
                    column = ?position.column,
                    file = ?self.source_file(),
                    error = %err,
                    "evaluation failed"
                );
            }
        }
        result
    }

    fn eval_compiled(&self, expression: &CompiledExpression) -> Result<Value, EvalError> {
        let depth = self.0.depth.get() + 1;
        let max_depth = self.0.options.max_depth;
        if depth > max_depth {
            return Err(EvalError::DepthExceeded { depth, max_depth });
        }
        self.0.depth.set(depth);
        let _guard = DepthGuard(&self.0.depth);
        expression.evaluate(self)
    }

    pub fn evaluate_value<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<Value, EvalError> {
        self.evaluate(expression)
    }

    /// Evaluate and apply standard truthiness.
    pub fn evaluate_boolean<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<bool, EvalError> {
        Ok(self.evaluate(expression)?.is_truthy())
    }

    /// Evaluate for text output.
    ///
    /// The default marker and `nothing` come back unchanged so the driver
    /// can tell them apart; text is returned as is; anything else is
    /// converted to [`Value::Str`].
    pub fn evaluate_text<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<Value, EvalError> {
        let value = self.evaluate(expression)?;
        match value {
            Value::Default | Value::Null | Value::Str(_) => Ok(value),
            other => Ok(Value::Str(other.to_text()?)),
        }
    }

    pub fn evaluate_structure<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<Value, EvalError> {
        self.evaluate(expression)
    }

    pub fn evaluate_macro<'a>(&self, expression: impl Into<ExpressionRef<'a>>) -> Result<Value, EvalError> {
        self.evaluate(expression)
    }

    /// The default marker.
    pub fn get_default(&self) -> Value {
        Value::Default
    }

    // Diagnostics

    pub fn position(&self) -> Position {
        self.0.position.get()
    }

    pub fn set_position(&self, position: Position) {
        self.0.position.set(position);
    }

    pub fn source_file(&self) -> Option<EcoString> {
        self.0.source_file.borrow().clone()
    }

    pub fn set_source_file(&self, source_file: Option<EcoString>) {
        *self.0.source_file.borrow_mut() = source_file;
    }

    /// Attach the current position and source file to `error`.
    pub fn create_error_info(&self, error: EvalError) -> ErrorInfo {
        ErrorInfo {
            error,
            position: self.position(),
            source_file: self.source_file(),
        }
    }

    pub fn translate(
        &self,
        msgid: &str,
        domain: Option<&str>,
        mapping: Option<&ValueMap>,
        default: Option<&Value>,
    ) -> EcoString {
        self.0.translator.translate(msgid, domain, mapping, default)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scope_depth", &self.scope_depth())
            .field("repeat", &self.0.repeat_vars.names())
            .field("position", &self.position())
            .field("source_file", &self.source_file())
            .finish_non_exhaustive()
    }
}
