mod cases;

use std::sync::Arc;

use cases::{ENGINE, SimpleExpr};
use pretty_assertions::assert_eq;
use tales_core::api::{Engine, EngineOptions};
use tales_core::errors::{CompileError, RegistrationError, RegistryKind};
use tales_core::values::{Value, ValueMap};

fn engine_with_simple() -> Arc<Engine> {
    let mut engine = Engine::with_standard_types();
    engine.register_type("simple", SimpleExpr::compile).unwrap();
    Arc::new(engine)
}

#[test]
fn test_register_type() {
    let engine = engine_with_simple();
    assert!(engine.types().contains_key("simple"));
    assert!(engine.factory("simple").is_some());
    assert_eq!(
        engine.types().keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        vec!["standard", "path", "exists", "nocall", "string", "not", "defer", "lazy", "simple"]
    );
}

#[test]
fn test_register_type_unique() {
    let mut engine = Engine::with_standard_types();
    engine.register_type("simple", SimpleExpr::compile).unwrap();
    let err = engine
        .register_type("simple", SimpleExpr::compile)
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::Duplicate {
            kind: RegistryKind::ExpressionType,
            name: "simple".into(),
        }
    );

    let err = engine.register_type("string", SimpleExpr::compile).unwrap_err();
    assert!(matches!(err, RegistrationError::Duplicate { .. }));
}

#[test]
fn test_register_type_name_constraints() {
    let mut engine = Engine::new(EngineOptions::default());
    for name in ["1A", "A!", "AB ", "", "_a", "a-b"] {
        let err = engine.register_type(name, SimpleExpr::compile).unwrap_err();
        assert!(
            matches!(err, RegistrationError::InvalidName { .. }),
            "{name:?} should be rejected"
        );
    }
    for name in ["a", "A1", "snake_case"] {
        engine.register_type(name, SimpleExpr::compile).unwrap();
    }
}

#[test]
fn test_compile_dispatches_on_prefix() {
    let engine = engine_with_simple();
    let context = engine.context().build();

    let expr = engine.compile("simple:x").unwrap();
    assert_eq!(expr.type_name(), "simple");
    assert_eq!(
        context.evaluate(&expr).unwrap(),
        Value::list([Value::from("simple"), Value::from("x")])
    );

    // Only the first colon splits.
    let expr = engine.compile("simple:a:b: c").unwrap();
    assert_eq!(expr.source(), "a:b: c");

    let expr = engine.compile("simple:").unwrap();
    assert_eq!(expr.source(), "");
}

#[test]
fn test_compile_without_prefix_uses_default_type() {
    let expr = ENGINE.compile("a/b").unwrap();
    assert_eq!(expr.type_name(), "standard");

    // Not an identifier, so not a prefix.
    let err = ENGINE.compile("1x:y").unwrap_err();
    assert!(matches!(err, CompileError::InvalidVariableName { .. }));
}

#[test]
fn test_custom_default_type() {
    let mut engine = Engine::standard(EngineOptions {
        default_type: "string".into(),
        ..EngineOptions::default()
    });
    engine.register_type("simple", SimpleExpr::compile).unwrap();
    let engine = Arc::new(engine);
    let context = engine.context().root("who", "world").build();

    assert_eq!(context.evaluate("hello $who").unwrap(), Value::from("hello world"));
    assert_eq!(context.evaluate("path:who").unwrap(), Value::from("world"));
}

#[test]
fn test_empty_engine_knows_no_types() {
    let engine = Engine::new(EngineOptions::default());
    let err = engine.compile("x").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnknownType { ref type_name, .. } if type_name == "standard"
    ));
}

#[test]
fn test_base_names_and_namespaces() {
    let mut engine = Engine::with_standard_types();
    engine.register_base_name("modules", vec!["os", "re"]).unwrap();
    engine
        .register_function_namespace("upper", |value: Value| {
            Value::from(value.to_text().unwrap_or_default().to_uppercase())
        })
        .unwrap();

    let err = engine.register_base_name("modules", 1).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Duplicate { kind: RegistryKind::BaseName, .. }
    ));
    let err = engine
        .register_function_namespace("9", |value: Value| value)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::InvalidName { kind: RegistryKind::FunctionNamespace, .. }
    ));

    let modules = engine.base_name("modules").unwrap();
    assert_eq!(
        modules.downcast_ref::<Vec<&'static str>>(),
        Some(&vec!["os", "re"])
    );
    assert!(engine.base_name("missing").is_none());
    assert_eq!(engine.base_names().len(), 1);

    let upper = engine.function_namespace("upper").unwrap();
    assert_eq!(upper(Value::from("abc")), Value::from("ABC"));
    assert!(engine.function_namespace("lower").is_none());
}

#[test]
fn test_get_context() {
    let engine = Arc::new(Engine::with_standard_types());
    let mut mapping = ValueMap::new();
    mapping.insert("a".into(), Value::Int(1));
    mapping.insert("b".into(), Value::Int(2));

    let context = engine.get_context(
        Some(mapping),
        [("b", Value::Int(20)), ("c", Value::Int(30))],
    );
    assert_eq!(context.get_value("a"), Some(Value::Int(1)));
    assert_eq!(context.get_value("b"), Some(Value::Int(2)));
    assert_eq!(context.get_value("c"), Some(Value::Int(30)));
    assert_eq!(context.get_value("nothing"), Some(Value::Null));
    assert_eq!(context.get_value("default"), Some(Value::Default));
    assert!(Arc::ptr_eq(context.engine(), &engine));

    let empty = engine.get_context(None, std::iter::empty::<(&str, Value)>());
    assert_eq!(empty.get_value("a"), None);
}

#[test]
fn test_independent_engines() {
    let first = engine_with_simple();
    let second = Arc::new(Engine::with_standard_types());

    assert!(first.compile("simple:x").is_ok());
    assert!(matches!(
        second.compile("simple:x"),
        Err(CompileError::UnknownType { .. })
    ));
}

#[test]
fn test_engine_shared_between_threads() {
    let engine = engine_with_simple();
    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let context = engine.context().root("i", i).build();
                context.evaluate_text("string:thread $i").unwrap().to_text().unwrap().to_string()
            })
        })
        .collect();
    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec!["thread 0", "thread 1", "thread 2", "thread 3"]);
}
