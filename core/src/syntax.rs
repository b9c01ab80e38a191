//! Lexical rules shared by the engine and the expression types.
//!
//! Names (expression types, variables, base names) follow one rule: an ASCII
//! letter followed by ASCII letters, digits or underscores.

/// Base name that resolves to the context-root mapping instead of a variable.
pub const CONTEXTS_BASE: &str = "CONTEXTS";

/// Check whether `name` is a valid identifier.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Split a leading `identifier:` prefix off `text`.
///
/// Returns the type name and the remainder after the colon, or `None` when
/// the text does not start with a prefix. No whitespace is skipped.
pub fn split_type_prefix(text: &str) -> Option<(&str, &str)> {
    let colon = text.find(':')?;
    let (name, rest) = text.split_at(colon);
    is_valid_name(name).then(|| (name, &rest[1..]))
}

/// Whether `text` starts with an `identifier:` prefix.
pub fn has_type_prefix(text: &str) -> bool {
    split_type_prefix(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["a", "A", "abc", "a1", "a_b", "standard", "Zz_9"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1A", "A!", "AB ", "_a", " a", "a-b", "é"] {
            assert!(!is_valid_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_split_type_prefix() {
        assert_eq!(split_type_prefix("path:a/b"), Some(("path", "a/b")));
        assert_eq!(split_type_prefix("string:"), Some(("string", "")));
        assert_eq!(split_type_prefix("not: x"), Some(("not", " x")));
        assert_eq!(split_type_prefix("a/b:c"), None);
        assert_eq!(split_type_prefix(" path:a"), None);
        assert_eq!(split_type_prefix("a/b"), None);
    }
}
