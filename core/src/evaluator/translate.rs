//! Message translation hook.

use ecow::EcoString;

use crate::values::{Value, ValueMap};

/// Translates message ids for a context.
///
/// Localization backends are provided by the embedding application; the
/// engine only routes `Context::translate` calls here.
pub trait Translator {
    fn translate(
        &self,
        msgid: &str,
        domain: Option<&str>,
        mapping: Option<&ValueMap>,
        default: Option<&Value>,
    ) -> EcoString;
}

/// Returns the message id unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(
        &self,
        msgid: &str,
        _domain: Option<&str>,
        _mapping: Option<&ValueMap>,
        _default: Option<&Value>,
    ) -> EcoString {
        msgid.into()
    }
}

impl<F> Translator for F
where
    F: Fn(&str, Option<&str>, Option<&ValueMap>, Option<&Value>) -> EcoString,
{
    fn translate(
        &self,
        msgid: &str,
        domain: Option<&str>,
        mapping: Option<&ValueMap>,
        default: Option<&Value>,
    ) -> EcoString {
        self(msgid, domain, mapping, default)
    }
}
