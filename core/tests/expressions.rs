mod cases;

use cases::{ENGINE, classic_context};
use indoc::indoc;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use tales_core::{EvalError, Value};

struct Case {
    name: &'static str,
    expr: &'static str,
    expected: &'static str,
}

/// Expressions against the classic variables, compared by their text form.
static CASES: Lazy<Vec<Case>> = Lazy::new(|| {
    vec![
        Case { name: "simple", expr: "x", expected: "xander" },
        Case { name: "path", expr: "x/y", expected: "yikes" },
        Case { name: "long_path", expr: "x/y/z", expected: "zope" },
        Case { name: "attribute", expr: "x/y/z/name", expected: "zope" },
        Case { name: "or_path", expr: "path:a|b|c/d/e", expected: "boot" },
        Case { name: "string", expr: "string:Fred", expected: "Fred" },
        Case { name: "string_sub", expr: "string:A$B", expected: "A2" },
        Case {
            name: "string_sub_complex",
            expr: "string:a ${x/y} b ${y/z} c",
            expected: "a yikes b 3 c",
        },
        Case { name: "not_true", expr: "not:b", expected: "false" },
        Case { name: "not_missing", expr: "not:exists:a", expected: "true" },
        Case { name: "not_string", expr: "not: string:", expected: "true" },
        Case { name: "exists", expr: "exists:x/y/z", expected: "true" },
        Case { name: "exists_missing", expr: "exists:x/q", expected: "false" },
        Case { name: "nothing", expr: "nothing | b", expected: "nothing" },
        Case { name: "text_index", expr: "b/0", expected: "b" },
    ]
});

#[test]
fn test_classic_expressions() {
    let context = classic_context();
    for case in CASES.iter() {
        let compiled = ENGINE
            .compile(case.expr)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));
        let value = context
            .evaluate(&compiled)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));
        assert_eq!(value.to_text().unwrap(), case.expected, "{}", case.name);
    }
}

#[test]
fn test_multiline_string() {
    let context = classic_context();
    let text = context
        .evaluate(indoc! {"
            string:Dear ${x},
            your $$${y/z} refund is on its way.
        "})
        .unwrap();
    assert_eq!(
        text,
        Value::from("Dear xander,\nyour $3 refund is on its way.\n")
    );
}

#[test]
fn test_compiled_expressions_are_reusable() {
    let expr = ENGINE.compile("string:$b-$B").unwrap();
    let first = classic_context();
    let second = ENGINE.context().root("b", "bee").root("B", 0).build();

    assert_eq!(first.evaluate(&expr).unwrap(), Value::from("boot-2"));
    assert_eq!(second.evaluate(&expr).unwrap(), Value::from("bee-0"));
}

#[test]
fn test_compiled_expressions_cross_threads() {
    let expr = ENGINE.compile("string:${x/y/z}!").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let expr = expr.clone();
            std::thread::spawn(move || {
                let context = classic_context();
                context.evaluate(&expr).unwrap().to_text().unwrap().to_string()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "zope!");
    }
}

#[test]
fn test_not_compiles_nested_prefix() {
    let context = classic_context();
    let expr = ENGINE.compile("not:  exists:x/q").unwrap();
    assert_eq!(expr.to_string(), r#"not expression ("exists:x/q")"#);
    assert_eq!(context.evaluate(&expr).unwrap(), Value::Bool(true));
}

#[test]
fn test_not_propagates_failures() {
    let context = classic_context();
    let err = context.evaluate("not:missing").unwrap_err();
    assert!(matches!(err, EvalError::NameNotFound { .. }));
}

#[test]
fn test_defer_and_lazy_are_not_memoized() {
    for prefix in ["defer", "lazy"] {
        let context = classic_context();
        context.begin_scope();
        context.set_local("n", 1);

        let deferred = context.evaluate(format!("{prefix}: string:n=$n").as_str()).unwrap();
        let Value::Deferred(wrapper) = &deferred else {
            panic!("{prefix}: expected a deferred value, got {deferred:?}");
        };
        assert_eq!(wrapper.expression().type_name(), "string");
        assert_eq!(wrapper.force().unwrap(), Value::from("n=1"));

        context.set_local("n", 2);
        assert_eq!(wrapper.force().unwrap(), Value::from("n=2"));

        context.set_local("d", deferred.clone());
        assert_eq!(context.evaluate("d").unwrap(), Value::from("n=2"));
        assert_eq!(context.evaluate_text("nocall:d").unwrap(), Value::from("n=2"));
    }
}

#[test]
fn test_defer_does_not_evaluate_eagerly() {
    let context = classic_context();
    let deferred = context.evaluate("defer:missing").unwrap();
    assert!(matches!(deferred, Value::Deferred(_)));

    context.set_local("d", deferred);
    assert!(matches!(
        context.evaluate("d"),
        Err(EvalError::NameNotFound { .. })
    ));
}

#[test]
fn test_deferred_outliving_context() {
    let deferred = classic_context().evaluate("defer:b").unwrap();
    let Value::Deferred(wrapper) = deferred else {
        panic!("expected a deferred value");
    };
    assert!(matches!(wrapper.force(), Err(EvalError::ContextDropped)));
}

#[test]
fn test_unknown_type() {
    let err = ENGINE.compile("bogus:stuff").unwrap_err();
    assert_eq!(err.to_string(), r#"unrecognized expression type "bogus""#);
    assert_eq!(err.span(), 0..5);
}
