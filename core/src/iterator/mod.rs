//! Repeat iterators.
//!
//! A [`RepeatIterator`] walks a sequence on behalf of a repeat construct. It
//! is not a Rust [`Iterator`]: the driver calls [`RepeatIterator::advance`]
//! once per pass, and each successful advance binds the current item under
//! the iterator's name in the innermost scope of the owning context.
//!
//! Position queries (`index`, `number`, `letter`, ...) describe the item most
//! recently advanced to and fail until the first advance.

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use ecow::EcoString;
use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

use crate::evaluator::{Context, EvalError, WeakContext};
use crate::values::{HostObject, Invocable, Value, ValueIter};

/// Iterators are shared between the repeat registry, the undo lists of the
/// scope stack and any value that captured them.
pub type SharedIterator = Rc<RefCell<RepeatIterator>>;

/// Misuse of an iterator query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum IteratorError {
    #[error("no iteration position")]
    #[diagnostic(
        code(tales::iterator::no_position),
        help("position queries are only available after the iterator has advanced")
    )]
    NoPosition,

    #[error("a sequence of type {type_name} has no length")]
    #[diagnostic(code(tales::iterator::unsized_sequence))]
    Unsized { type_name: EcoString },
}

pub struct RepeatIterator {
    name: EcoString,
    sequence: Value,
    items: ValueIter,
    /// Number of successful advances; the 1-based position of `current`.
    position: usize,
    current: Option<Value>,
    lookahead: Option<Value>,
    last: bool,
    context: WeakContext,
}

impl RepeatIterator {
    /// Create an iterator over `sequence`, bound to `context`.
    ///
    /// The first item is looked ahead immediately. Fails with
    /// [`EvalError::NotIterable`] when the value is not a sequence.
    pub fn new(
        name: impl Into<EcoString>,
        sequence: Value,
        context: &Context,
    ) -> Result<Self, EvalError> {
        let mut items = sequence.iter_items()?;
        let lookahead = items.next();
        Ok(Self {
            name: name.into(),
            sequence,
            items,
            position: 0,
            current: None,
            lookahead,
            last: false,
            context: context.downgrade(),
        })
    }

    /// An iterator over nothing; `advance` always returns `false`.
    pub fn empty(name: impl Into<EcoString>, context: &Context) -> Self {
        Self {
            name: name.into(),
            sequence: Value::List(Rc::from([])),
            items: Box::new(core::iter::empty()),
            position: 0,
            current: None,
            lookahead: None,
            last: false,
            context: context.downgrade(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &Value {
        &self.sequence
    }

    /// Move to the next item and bind it as a local of the owning context.
    ///
    /// Returns `Ok(false)` without side effects once the sequence is
    /// exhausted.
    pub fn advance(&mut self) -> Result<bool, EvalError> {
        if self.lookahead.is_none() {
            return Ok(false);
        }
        let context = self.context.upgrade().ok_or(EvalError::ContextDropped)?;
        let Some(value) = self.lookahead.take() else {
            return Ok(false);
        };

        self.lookahead = self.items.next();
        self.last = self.lookahead.is_none();
        self.position += 1;
        self.current = Some(value.clone());
        context.set_local(self.name.clone(), value);
        Ok(true)
    }

    fn position(&self) -> Result<usize, IteratorError> {
        match self.position {
            0 => Err(IteratorError::NoPosition),
            n => Ok(n),
        }
    }

    /// 0-based position.
    pub fn index(&self) -> Result<usize, IteratorError> {
        Ok(self.position()? - 1)
    }

    /// 1-based position.
    pub fn number(&self) -> Result<usize, IteratorError> {
        self.position()
    }

    pub fn even(&self) -> Result<bool, IteratorError> {
        Ok(self.index()? % 2 == 0)
    }

    pub fn odd(&self) -> Result<bool, IteratorError> {
        Ok(self.index()? % 2 == 1)
    }

    /// `"odd"` or `"even"`, by 1-based position: the first row is odd.
    pub fn parity(&self) -> Result<&'static str, IteratorError> {
        Ok(if self.number()? % 2 == 1 { "odd" } else { "even" })
    }

    /// The index as a lowercase letter numeral: a, b, ..., z, aa, ab, ...
    pub fn letter(&self) -> Result<EcoString, IteratorError> {
        Ok(letters(self.index()?, b'a'))
    }

    /// Uppercase counterpart of [`RepeatIterator::letter`].
    pub fn upper_letter(&self) -> Result<EcoString, IteratorError> {
        Ok(letters(self.index()?, b'A'))
    }

    /// The 1-based position as a lowercase Roman numeral.
    pub fn roman(&self) -> Result<EcoString, IteratorError> {
        Ok(self.upper_roman()?.to_lowercase().into())
    }

    /// The 1-based position as an uppercase Roman numeral.
    pub fn upper_roman(&self) -> Result<EcoString, IteratorError> {
        Ok(roman_numeral(self.number()?))
    }

    /// Whether the current item is the first one.
    pub fn start(&self) -> bool {
        self.position == 1
    }

    /// Whether the current item is the last one.
    pub fn end(&self) -> bool {
        self.last
    }

    /// The current item.
    pub fn item(&self) -> Result<Value, IteratorError> {
        self.current.clone().ok_or(IteratorError::NoPosition)
    }

    /// Size of the backing sequence, if it reports one.
    pub fn length(&self) -> Result<usize, IteratorError> {
        self.sequence.length().ok_or_else(|| IteratorError::Unsized {
            type_name: self.sequence.type_name().into(),
        })
    }
}

impl fmt::Debug for RepeatIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatIterator")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("current", &self.current)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

/// Bijective base-26 rendering of a 0-based index.
fn letters(index: usize, base: u8) -> EcoString {
    let mut digits = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        digits.push((base + (n % 26) as u8) as char);
        n /= 26;
    }
    digits.into_iter().rev().collect()
}

const ROMAN_VALUES: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

fn roman_numeral(mut n: usize) -> EcoString {
    let mut out = EcoString::new();
    for (value, digits) in ROMAN_VALUES {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// An iterator query reachable from a path, e.g. `repeat/item/number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Index,
    Number,
    Even,
    Odd,
    Parity,
    Letter,
    UpperLetter,
    Roman,
    UpperRoman,
    Start,
    End,
    Item,
    Length,
}

impl Query {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "index" => Query::Index,
            "number" => Query::Number,
            "even" => Query::Even,
            "odd" => Query::Odd,
            "parity" => Query::Parity,
            "letter" => Query::Letter,
            "Letter" => Query::UpperLetter,
            "roman" => Query::Roman,
            "Roman" => Query::UpperRoman,
            "start" => Query::Start,
            "end" => Query::End,
            "item" => Query::Item,
            "length" => Query::Length,
            _ => return None,
        })
    }
}

/// A query bound to its iterator, invoked by `standard` path evaluation.
struct IteratorMethod {
    iterator: SharedIterator,
    query: Query,
}

impl Invocable for IteratorMethod {
    fn invoke(&self) -> Result<Value, EvalError> {
        let it = self.iterator.borrow();
        let to_int = |n: usize| Value::Int(n as i64);
        Ok(match self.query {
            Query::Index => to_int(it.index()?),
            Query::Number => to_int(it.number()?),
            Query::Even => Value::Bool(it.even()?),
            Query::Odd => Value::Bool(it.odd()?),
            Query::Parity => Value::str(it.parity()?),
            Query::Letter => Value::Str(it.letter()?),
            Query::UpperLetter => Value::Str(it.upper_letter()?),
            Query::Roman => Value::Str(it.roman()?),
            Query::UpperRoman => Value::Str(it.upper_roman()?),
            Query::Start => Value::Bool(it.start()),
            Query::End => Value::Bool(it.end()),
            Query::Item => it.item()?,
            Query::Length => to_int(it.length()?),
        })
    }
}

impl fmt::Debug for IteratorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IteratorMethod({:?})", self.query)
    }
}

/// Look up an iterator query by its path name.
pub(crate) fn bind_query(iterator: &SharedIterator, name: &str) -> Option<Value> {
    let query = Query::from_name(name)?;
    Some(Value::Callable(Rc::new(IteratorMethod {
        iterator: Rc::clone(iterator),
        query,
    })))
}

/// The live registry of active repeat iterators.
///
/// Exposed to expressions under both `repeat` and `loop`.
#[derive(Debug, Clone, Default)]
pub struct RepeatVars(Rc<RefCell<IndexMap<EcoString, SharedIterator>>>);

impl RepeatVars {
    pub fn get(&self, name: &str) -> Option<SharedIterator> {
        self.0.borrow().get(name).cloned()
    }

    /// Install `iterator` under `name`, returning the one it replaced.
    pub(crate) fn insert(&self, name: EcoString, iterator: SharedIterator) -> Option<SharedIterator> {
        self.0.borrow_mut().insert(name, iterator)
    }

    pub(crate) fn remove(&self, name: &str) -> Option<SharedIterator> {
        self.0.borrow_mut().shift_remove(name)
    }

    pub fn names(&self) -> Vec<EcoString> {
        self.0.borrow().keys().cloned().collect()
    }
}

impl HostObject for RepeatVars {
    fn type_name(&self) -> &str {
        "repeat"
    }

    fn item(&self, key: &str) -> Result<Value, EvalError> {
        self.get(key)
            .map(Value::Iterator)
            .ok_or_else(|| EvalError::KeyNotFound { key: key.into() })
    }

    fn iterate(&self) -> Option<ValueIter> {
        let names: Vec<Value> = self.names().into_iter().map(Value::Str).collect();
        Some(Box::new(names.into_iter()))
    }

    fn length(&self) -> Option<usize> {
        Some(self.0.borrow().len())
    }

    fn fmt_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<repeat {:?}>", self.names())
    }
}
