//! Path expressions: `a/b/c | d/?e | string:fallback`.

use std::sync::Arc;

use ecow::EcoString;
use smallvec::SmallVec;
use tracing::trace;

use super::{CompiledExpression, Expression, Traverser};
use crate::api::Engine;
use crate::errors::CompileError;
use crate::evaluator::{Context, EvalError};
use crate::syntax::{CONTEXTS_BASE, has_type_prefix, is_valid_name};
use crate::values::Value;

/// How a path expression treats its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// `standard:` / `path:`: fall through undefined alternatives, then
    /// invoke an invocable result once.
    Standard,
    /// `exists:`: whether any alternative resolves.
    Exists,
    /// `nocall:`: like `Standard`, without invoking the result.
    NoCall,
}

impl PathMode {
    /// The mode a path factory uses for a registered type name.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "exists" => PathMode::Exists,
            "nocall" => PathMode::NoCall,
            _ => PathMode::Standard,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Static(EcoString),
    /// `?name`: replaced by the variable's value at evaluation time.
    Dynamic(EcoString),
}

/// One `/`-separated path.
#[derive(Debug)]
struct SubPath {
    base: EcoString,
    segments: Vec<Segment>,
    has_dynamic: bool,
    traverser: Arc<dyn Traverser>,
}

impl SubPath {
    /// Parse `text`, located at byte `offset` of `src`.
    fn parse(
        text: &str,
        offset: usize,
        src: &str,
        traverser: Arc<dyn Traverser>,
    ) -> Result<Self, CompileError> {
        let lead = text.len() - text.trim_start().len();
        let mut parts = text.trim().split('/');
        let base = parts.next().unwrap_or_default();
        if !is_valid_name(base) {
            return Err(CompileError::InvalidVariableName {
                name: base.into(),
                src: src.into(),
                span: (offset + lead, base.len()).into(),
            });
        }

        let segments: Vec<Segment> = parts
            .map(|part| match part.strip_prefix('?') {
                Some(name) if is_valid_name(name) => Segment::Dynamic(name.into()),
                _ => Segment::Static(part.into()),
            })
            .collect();
        Ok(Self {
            base: base.into(),
            has_dynamic: segments.iter().any(|s| matches!(s, Segment::Dynamic(_))),
            segments,
            traverser,
        })
    }

    fn expand_segments(&self, context: &Context) -> Result<Vec<EcoString>, EvalError> {
        let mut out = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(name) => out.push(name.clone()),
                Segment::Dynamic(var) => {
                    let value = context
                        .get_value(var)
                        .ok_or_else(|| EvalError::NameNotFound { name: var.clone() })?;
                    if let Value::Str(text) = value {
                        out.push(text);
                        continue;
                    }
                    for item in value.iter_items()? {
                        match item {
                            Value::Str(text) => out.push(text),
                            Value::Int(i) => out.push(ecow::eco_format!("{i}")),
                            other => {
                                return Err(EvalError::TypeMismatch {
                                    message: ecow::eco_format!(
                                        "path segments from ?{var} must be text or integers, not {}",
                                        other.type_name()
                                    ),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        let segments = if self.has_dynamic {
            self.expand_segments(context)?
        } else {
            self.segments
                .iter()
                .map(|s| match s {
                    Segment::Static(name) | Segment::Dynamic(name) => name.clone(),
                })
                .collect()
        };

        let mut object = if self.base == CONTEXTS_BASE {
            context.contexts()
        } else {
            context
                .get_value(&self.base)
                .ok_or_else(|| EvalError::NameNotFound {
                    name: self.base.clone(),
                })?
        };
        if let Value::Deferred(wrapper) = &object {
            object = wrapper.force()?;
        }
        if segments.is_empty() {
            return Ok(object);
        }
        self.traverser.traverse(object, &segments, context)
    }
}

#[derive(Debug)]
enum Alternative {
    Path(SubPath),
    /// An alternative carrying its own type prefix; it swallows the rest of
    /// the text.
    Nested(CompiledExpression),
}

impl Alternative {
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        match self {
            Alternative::Path(path) => path.evaluate(context),
            Alternative::Nested(expression) => context.evaluate(expression),
        }
    }
}

/// One or more `|`-separated alternatives.
#[derive(Debug)]
pub struct PathExpr {
    type_name: EcoString,
    source: EcoString,
    mode: PathMode,
    alternatives: SmallVec<[Alternative; 2]>,
}

impl PathExpr {
    /// Compile with attribute-then-item traversal.
    pub fn compile(
        type_name: &str,
        text: &str,
        engine: &Engine,
    ) -> Result<CompiledExpression, CompileError> {
        Self::compile_with(type_name, text, engine, Arc::new(super::DefaultTraverser))
    }

    pub fn compile_with(
        type_name: &str,
        text: &str,
        engine: &Engine,
        traverser: Arc<dyn Traverser>,
    ) -> Result<CompiledExpression, CompileError> {
        let parts: Vec<&str> = text.split('|').collect();
        let mut alternatives = SmallVec::new();
        let mut offset = 0;
        for (i, part) in parts.iter().enumerate() {
            if has_type_prefix(part.trim_start()) {
                let rest = parts[i..].join("|");
                trace!(rest = %rest, "path alternative with its own type");
                let nested = engine.compile(rest.trim_start())?;
                alternatives.push(Alternative::Nested(nested));
                break;
            }
            alternatives.push(Alternative::Path(SubPath::parse(
                part,
                offset,
                text,
                Arc::clone(&traverser),
            )?));
            offset += part.len() + 1;
        }

        Ok(CompiledExpression::new(PathExpr {
            type_name: type_name.into(),
            source: text.into(),
            mode: PathMode::from_type_name(type_name),
            alternatives,
        }))
    }

    /// A factory for registering path types with a custom traverser.
    pub fn factory(
        traverser: Arc<dyn Traverser>,
    ) -> impl Fn(&str, &str, &Engine) -> Result<CompiledExpression, CompileError> + Send + Sync + 'static
    {
        move |type_name: &str, text: &str, engine: &Engine| {
            Self::compile_with(type_name, text, engine, Arc::clone(&traverser))
        }
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    fn exists(&self, context: &Context) -> Result<Value, EvalError> {
        for alternative in &self.alternatives {
            match alternative.evaluate(context) {
                Ok(_) => return Ok(Value::Bool(true)),
                Err(err) if err.is_undefined() => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(Value::Bool(false))
    }

    fn resolve(&self, context: &Context) -> Result<Value, EvalError> {
        let (last, init) = self
            .alternatives
            .split_last()
            .ok_or_else(|| EvalError::Undefined {
                name: self.source.clone(),
            })?;
        for alternative in init {
            match alternative.evaluate(context) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_undefined() => {
                    trace!(error = %err, "alternative undefined, trying next");
                }
                Err(err) => return Err(err),
            }
        }
        last.evaluate(context)
    }
}

impl Expression for PathExpr {
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        match self.mode {
            PathMode::Exists => self.exists(context),
            PathMode::NoCall => self.resolve(context),
            PathMode::Standard => {
                let value = self.resolve(context)?;
                match value.try_invoke() {
                    Some(result) => result,
                    None => Ok(value),
                }
            }
        }
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn source(&self) -> &str {
        &self.source
    }
}
