//! String expressions: `string:Hello ${user/name}, you owe $$$amount`.

use ecow::EcoString;
use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;

use super::{CompiledExpression, Expression};
use crate::api::Engine;
use crate::errors::CompileError;
use crate::evaluator::{Context, EvalError};
use crate::values::Value;

#[derive(Parser)]
#[grammar = "expressions/template.pest"]
struct TemplateParser;

#[derive(Debug)]
enum Piece {
    Literal(EcoString),
    /// Compiled with the engine's `path` type.
    Site(CompiledExpression),
}

/// A template with interpolation sites.
#[derive(Debug)]
pub struct StringExpr {
    type_name: EcoString,
    source: EcoString,
    pieces: Vec<Piece>,
}

impl StringExpr {
    pub fn compile(
        type_name: &str,
        text: &str,
        engine: &Engine,
    ) -> Result<CompiledExpression, CompileError> {
        let pieces = if text.contains('$') {
            parse_template(text, engine)?
        } else {
            vec![Piece::Literal(text.into())]
        };
        Ok(CompiledExpression::new(StringExpr {
            type_name: type_name.into(),
            source: text.into(),
            pieces,
        }))
    }
}

fn parse_template(text: &str, engine: &Engine) -> Result<Vec<Piece>, CompileError> {
    let template = TemplateParser::parse(Rule::template, text)
        .map_err(|err| {
            let failed_at = match err.location {
                InputLocation::Pos(pos) => pos,
                InputLocation::Span((start, _)) => start,
            };
            // Point at the `$` that started the failed site.
            let offset = text
                .char_indices()
                .filter(|&(i, c)| c == '$' && i <= failed_at)
                .map(|(i, _)| i)
                .last()
                .unwrap_or(failed_at);
            CompileError::InvalidInterpolation {
                src: text.into(),
                span: (offset, 1).into(),
            }
        })?
        .next()
        .map(|pair| pair.into_inner())
        .into_iter()
        .flatten();

    let path_factory = engine
        .factory("path")
        .ok_or_else(|| CompileError::unknown_type("path", text))?;

    let mut pieces = Vec::new();
    let mut literal = EcoString::new();
    for pair in template {
        let site = match pair.as_rule() {
            Rule::literal => {
                literal.push_str(pair.as_str());
                continue;
            }
            Rule::escaped => {
                literal.push('$');
                continue;
            }
            Rule::braced | Rule::simple => pair
                .into_inner()
                .next()
                .map(|inner| inner.as_str())
                .unwrap_or_default(),
            _ => continue,
        };
        if !literal.is_empty() {
            pieces.push(Piece::Literal(core::mem::take(&mut literal)));
        }
        pieces.push(Piece::Site(path_factory("path", site, engine)?));
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

impl Expression for StringExpr {
    fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        let mut out = EcoString::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Site(site) => out.push_str(&context.evaluate(site)?.to_text()?),
            }
        }
        Ok(Value::Str(out))
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn source(&self) -> &str {
        &self.source
    }
}
