use std::sync::Arc;

use once_cell::sync::Lazy;
use tales::{Engine, Value, ValueMap};

pub static ENGINE: Lazy<Arc<Engine>> = Lazy::new(|| Arc::new(Engine::with_standard_types()));

/// A page with a title, an author and a list of sections.
pub fn page() -> Value {
    let section = |title: &str, words: i64| {
        Value::map([("title", Value::from(title)), ("words", Value::Int(words))])
    };
    let mut page = ValueMap::new();
    page.insert("title".into(), Value::from("Release notes"));
    page.insert(
        "author".into(),
        Value::map([("name", Value::from("Ada")), ("email", Value::Null)]),
    );
    page.insert(
        "sections".into(),
        Value::list([section("Fixes", 120), section("Features", 300), section("Thanks", 40)]),
    );
    Value::from(page)
}
