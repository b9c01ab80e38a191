//! Unit tests for the evaluation context.

use std::rc::Rc;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::api::{Engine, ExecutionOptions};
use crate::scope_stack::ScopeError;
use crate::test_utils::init_test_logging;
use crate::values::{Value, ValueMap};

fn engine() -> Arc<Engine> {
    Arc::new(Engine::with_standard_types())
}

fn context() -> Context {
    engine().context().build()
}

#[test]
fn test_scoping() {
    init_test_logging();
    let context = context();

    context.begin_scope();
    context.set_local("v", 1);
    context.set_local("v2", 2);

    context.begin_scope();
    context.set_local("v", 3);
    context.set_global("g", 1);

    assert_eq!(context.get_value("v"), Some(Value::Int(3)));
    assert_eq!(context.get_value("v2"), Some(Value::Int(2)));
    assert_eq!(context.get_value("g"), Some(Value::Int(1)));

    context.end_scope().unwrap();
    assert_eq!(context.get_value("v"), Some(Value::Int(1)));
    assert_eq!(context.get_value("g"), Some(Value::Int(1)));

    context.end_scope().unwrap();
    assert_eq!(context.get_value("v"), None);
    assert_eq!(context.get_value("g"), Some(Value::Int(1)));
}

#[test]
fn test_end_root_scope_fails() {
    let context = context();
    assert_eq!(context.end_scope(), Err(ScopeError::NoOpenScope));

    context.begin_scope();
    assert_eq!(context.scope_depth(), 1);
    assert_eq!(context.end_scope(), Ok(()));
    assert_eq!(context.end_scope(), Err(ScopeError::NoOpenScope));
}

#[test]
fn test_fixed_roots() {
    let context = engine()
        .context()
        .root("nothing", Value::from("shadowed?"))
        .root("x", 1)
        .build();

    assert_eq!(context.get_value("nothing"), Some(Value::Null));
    assert_eq!(context.get_value("default"), Some(Value::Default));
    assert_eq!(context.get_value("x"), Some(Value::Int(1)));
    assert_eq!(
        context.get_value("repeat").map(|v| v.type_name().to_owned()),
        Some("repeat".to_owned())
    );
    assert_eq!(context.get_value("repeat"), context.get_value("loop"));
    assert_eq!(context.evaluate("nothing").unwrap(), Value::Null);
}

#[test]
fn test_mapping_roots_win_over_named() {
    let mut mapping = ValueMap::new();
    mapping.insert("a".into(), Value::from("mapping"));

    let context = engine().get_context(
        Some(mapping),
        [("a", Value::from("named")), ("b", Value::from("named"))],
    );
    assert_eq!(context.get_value("a"), Some(Value::from("mapping")));
    assert_eq!(context.get_value("b"), Some(Value::from("named")));
}

#[test]
fn test_contexts_are_not_scoped() {
    let context = engine().context().root("a", 1).build();
    context.begin_scope();
    context.set_local("a", 2);

    assert_eq!(context.evaluate("a").unwrap(), Value::Int(2));
    assert_eq!(context.evaluate("CONTEXTS/a").unwrap(), Value::Int(1));
}

#[test]
fn test_set_repeat_installs_and_restores() {
    let context = engine()
        .context()
        .root("rows", Value::list([Value::from("r1"), Value::from("r2")]))
        .root("cols", Value::list([Value::from("c1")]))
        .build();

    context.begin_scope();
    let outer = context.set_repeat("item", "rows").unwrap();
    assert!(outer.borrow_mut().advance().unwrap());
    assert_eq!(context.get_value("item"), Some(Value::from("r1")));

    context.begin_scope();
    let inner = context.set_repeat("item", "cols").unwrap();
    assert!(Rc::ptr_eq(&context.repeat("item").unwrap(), &inner));
    inner.borrow_mut().advance().unwrap();
    assert_eq!(context.evaluate("repeat/item/item").unwrap(), Value::from("c1"));

    context.end_scope().unwrap();
    assert!(Rc::ptr_eq(&context.repeat("item").unwrap(), &outer));
    assert_eq!(context.evaluate("item").unwrap(), Value::from("r1"));

    context.end_scope().unwrap();
    assert!(context.repeat("item").is_none());
    assert!(!context.evaluate_boolean("exists:repeat/item").unwrap());
}

#[test]
fn test_set_repeat_on_falsy_sequence() {
    let context = engine().context().root("empty", Value::list([])).build();

    // No scope needed: the empty iterator is not installed.
    let it = context.set_repeat("item", "empty").unwrap();
    assert!(!it.borrow_mut().advance().unwrap());
    assert!(context.repeat("item").is_none());
}

#[test]
fn test_set_repeat_without_scope() {
    let context = engine().context().root("rows", Value::list([Value::Int(1)])).build();
    let err = context.set_repeat("item", "rows").unwrap_err();
    assert!(matches!(err, EvalError::Scope(ScopeError::NoOpenScope)));
}

#[test]
fn test_set_repeat_propagates_failures() {
    let context = context();
    context.begin_scope();

    let err = context.set_repeat("item", "missing").unwrap_err();
    assert!(matches!(err, EvalError::NameNotFound { .. }));

    let it = context.set_repeat("item", "string:abc").unwrap();
    assert_eq!(it.borrow().length(), Ok(3));

    context.set_local("n", 5);
    let err = context.set_repeat("count", "n").unwrap_err();
    assert!(matches!(err, EvalError::NotIterable { .. }));
}

#[test]
fn test_evaluate_text() {
    let context = engine()
        .context()
        .root("n", 42)
        .root("s", "text")
        .root("l", Value::list([Value::from("a")]))
        .build();

    assert_eq!(context.evaluate_text("n").unwrap(), Value::from("42"));
    assert_eq!(context.evaluate_text("s").unwrap(), Value::from("text"));
    assert_eq!(context.evaluate_text("l").unwrap(), Value::from(r#"["a"]"#));
    // The default marker and nothing pass through untouched.
    assert_eq!(context.evaluate_text("default").unwrap(), Value::Default);
    assert_eq!(context.evaluate_text("nothing").unwrap(), Value::Null);
}

#[test]
fn test_evaluate_boolean() {
    let context = engine().context().root("zero", 0).root("one", 1).build();

    assert!(!context.evaluate_boolean("zero").unwrap());
    assert!(context.evaluate_boolean("one").unwrap());
    assert!(!context.evaluate_boolean("nothing").unwrap());
    assert!(context.evaluate_boolean("default").unwrap());
}

#[test]
fn test_evaluate_aliases() {
    let context = engine().context().root("x", "v").build();
    let expr = context.engine().compile("x").unwrap();

    for result in [
        context.evaluate(&expr),
        context.evaluate_value(&expr),
        context.evaluate_structure(&expr),
        context.evaluate_macro(&expr),
    ] {
        assert_eq!(result.unwrap(), Value::from("v"));
    }
    assert_eq!(context.get_default(), Value::Default);
}

#[test]
fn test_compile_errors_surface_from_evaluate() {
    let context = context();
    let err = context.evaluate("bogus:x").unwrap_err();
    assert!(matches!(err, EvalError::Compile(_)));
    assert!(!err.is_undefined());
}

#[test]
fn test_depth_limit() {
    let context = engine()
        .context()
        .root("x", 1)
        .execution_options(ExecutionOptions { max_depth: 3 })
        .build();

    assert_eq!(context.evaluate("not:not:x").unwrap(), Value::Bool(true));
    let err = context.evaluate("not:not:not:x").unwrap_err();
    assert!(matches!(
        err,
        EvalError::DepthExceeded {
            depth: 4,
            max_depth: 3
        }
    ));
    // The counter unwinds after a failure.
    assert_eq!(context.evaluate("not:x").unwrap(), Value::Bool(false));
}

#[test]
fn test_error_info() {
    let context = context();
    context.set_position(Position::new(3, 14));
    context.set_source_file(Some("page.pt".into()));

    let err = context.evaluate("missing").unwrap_err();
    let info = context.create_error_info(err);
    assert_eq!(info.position, Position::new(3, 14));
    assert_eq!(info.source_file.as_deref(), Some("page.pt"));
    assert_eq!(
        info.to_string(),
        "name \"missing\" is not defined, in page.pt, at line 3, column 14"
    );
}

#[test]
fn test_translate() {
    let context = context();
    assert_eq!(context.translate("hello", None, None, None), "hello");

    let context = engine()
        .context()
        .translator(|msgid: &str, domain: Option<&str>, _: Option<&ValueMap>, _: Option<&Value>| {
            ecow::eco_format!("{}:{msgid}", domain.unwrap_or("-"))
        })
        .build();
    assert_eq!(context.translate("hello", Some("site"), None, None), "site:hello");
}

#[test]
fn test_weak_context() {
    let context = context();
    let weak = context.downgrade();
    assert!(weak.upgrade().is_some());
    drop(context);
    assert!(weak.upgrade().is_none());
}
