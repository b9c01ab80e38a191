//! Command-line values given as JSON.

use std::str::FromStr;

use ecow::EcoString;
use tales::{Value, ValueMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("expected NAME=VALUE, got {0:?}")]
    MissingEquals(String),
    #[error("invalid variable name {0:?}")]
    InvalidName(String),
}

/// A `NAME=JSON` root variable. Values that are not valid JSON are taken as
/// plain text, so `--root who=world` works without quoting.
#[derive(Debug, Clone)]
pub struct Root {
    pub name: EcoString,
    pub value: serde_json::Value,
}

impl FromStr for Root {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, raw) = split_binding(s)?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()));
        Ok(Root { name, value })
    }
}

/// A `NAME=EXPRESSION` repeat: the expression is evaluated and iterated,
/// binding each item to `NAME`.
#[derive(Debug, Clone)]
pub struct Repeat {
    pub name: EcoString,
    pub expression: String,
}

impl FromStr for Repeat {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, expression) = split_binding(s)?;
        Ok(Repeat {
            name,
            expression: expression.to_owned(),
        })
    }
}

fn split_binding(s: &str) -> Result<(EcoString, &str), BindingError> {
    let (name, rest) = s
        .split_once('=')
        .ok_or_else(|| BindingError::MissingEquals(s.to_owned()))?;
    if !tales_core::syntax::is_valid_name(name) {
        return Err(BindingError::InvalidName(name.to_owned()));
    }
    Ok((name.into(), rest))
}

/// Convert parsed JSON into an engine value.
pub fn to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => Value::list(items.iter().map(to_value)),
        serde_json::Value::Object(fields) => {
            let map: ValueMap = fields
                .iter()
                .map(|(k, v)| (EcoString::from(k.as_str()), to_value(v)))
                .collect();
            Value::from(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_root_json() {
        let root: Root = r#"user={"name": "Ada", "langs": ["en", 2, 1.5, null]}"#
            .parse()
            .unwrap();
        assert_eq!(root.name.as_str(), "user");
        assert_eq!(
            to_value(&root.value),
            Value::map([
                ("name", Value::from("Ada")),
                (
                    "langs",
                    Value::list([
                        Value::from("en"),
                        Value::Int(2),
                        Value::Float(1.5),
                        Value::Null
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_root_plain_text() {
        let root: Root = "who=world".parse().unwrap();
        assert_eq!(to_value(&root.value), Value::from("world"));

        let root: Root = "empty=".parse().unwrap();
        assert_eq!(to_value(&root.value), Value::from(""));
    }

    #[test]
    fn test_bad_bindings() {
        assert!(matches!(
            "nope".parse::<Root>(),
            Err(BindingError::MissingEquals(_))
        ));
        assert!(matches!(
            "1x=2".parse::<Root>(),
            Err(BindingError::InvalidName(_))
        ));
    }

    #[test]
    fn test_repeat_binding() {
        let repeat: Repeat = "row=rows | nothing".parse().unwrap();
        assert_eq!(repeat.name.as_str(), "row");
        assert_eq!(repeat.expression, "rows | nothing");
    }
}
