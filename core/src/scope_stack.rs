//! Scope stack for variable bindings.
//!
//! The evaluation context keeps one binding frame per open scope. Entering a
//! scope pushes a shallow copy of the current frame, so lookups only ever
//! consult the top frame:
//! - **Local bindings** write the top frame and vanish when the scope ends.
//! - **Global bindings** write every frame, so they survive scope exits.
//!
//! Alongside each scope frame sits an undo list recording the repeat
//! iterators that scope replaced. Ending the scope hands the list back so the
//! caller can restore them in reverse order.

use ecow::EcoString;
use hashbrown::HashMap;
use miette::Diagnostic;
use thiserror::Error;

use crate::iterator::SharedIterator;
use crate::values::Value;

/// One binding frame.
pub type Frame = HashMap<EcoString, Value>;

/// What a repeat name was bound to before a scope replaced it.
#[derive(Debug, Clone)]
pub enum Shadowed {
    /// The name had no iterator; restoring removes the binding.
    Absent,
    /// The iterator to reinstate.
    Iterator(SharedIterator),
}

/// Undo list of a single scope, in recording order.
pub type UndoList = Vec<(EcoString, Shadowed)>;

/// A stack of binding frames with per-scope undo lists.
///
/// The root frame is always present; `frames.len() == undo.len() + 1`.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    undo: Vec<UndoList>,
}

impl ScopeStack {
    /// Create a stack holding only the root frame.
    pub fn new(root: Frame) -> Self {
        Self {
            frames: vec![root],
            undo: Vec::new(),
        }
    }

    /// Open a scope: push a copy of the current frame and an empty undo list.
    pub fn push(&mut self) {
        let top = self.current().clone();
        self.frames.push(top);
        self.undo.push(UndoList::new());
    }

    /// Close the innermost scope, returning its undo list.
    ///
    /// Returns an error if only the root frame is left.
    pub fn pop(&mut self) -> Result<UndoList, ScopeError> {
        let undo = self.undo.pop().ok_or(ScopeError::NoOpenScope)?;
        self.frames.pop();
        Ok(undo)
    }

    /// The frame lookups read from.
    pub fn current(&self) -> &Frame {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    /// Look up a name in the current frame.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.current().get(name)
    }

    /// Bind a name in the current frame only.
    pub fn bind_local(&mut self, name: EcoString, value: Value) {
        let last = self.frames.len() - 1;
        self.frames[last].insert(name, value);
    }

    /// Bind a name in every frame on the stack.
    pub fn bind_global(&mut self, name: EcoString, value: Value) {
        for frame in &mut self.frames {
            frame.insert(name.clone(), value.clone());
        }
    }

    /// Record what `name` was bound to before the innermost scope replaced it.
    ///
    /// Returns an error when no scope is open.
    pub fn record_shadowed(&mut self, name: EcoString, prior: Shadowed) -> Result<(), ScopeError> {
        self.undo
            .last_mut()
            .ok_or(ScopeError::NoOpenScope)?
            .push((name, prior));
        Ok(())
    }

    /// Number of open scopes, not counting the root frame.
    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}

/// Misuse of the scope protocol by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ScopeError {
    /// `end_scope` or `set_repeat` with only the root frame present.
    #[error("no open scope")]
    #[diagnostic(
        code(tales::scope::no_open_scope),
        help("begin_scope and end_scope calls must be balanced")
    )]
    NoOpenScope,
}
