//! Stack of formatting scopes mirroring RTF group nesting.

use super::format::FormatState;
use crate::common::{Error, Result};

/// Explicit stack of [`FormatState`] frames.
///
/// A freshly created stack holds one root frame, which can never be popped:
/// the stack is never empty while tokens remain.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<FormatState>,
    max_depth: usize,
}

impl ScopeStack {
    /// Create a stack holding only `root`.
    pub fn new(root: FormatState, max_depth: usize) -> Self {
        let mut frames = Vec::with_capacity(16);
        frames.push(root);
        Self { frames, max_depth }
    }

    /// Push a copy of the top frame.
    ///
    /// Fails once the nesting reaches the configured maximum depth.
    pub fn push(&mut self) -> Result<&mut FormatState> {
        if self.frames.len() > self.max_depth {
            return Err(Error::Structural(format!(
                "Group nesting deeper than {}",
                self.max_depth
            )));
        }
        let child = match self.frames.last() {
            Some(top) => {
                let mut child = top.child();
                child.destination = top.destination.child_group();
                child
            },
            None => FormatState::root(),
        };
        self.frames.push(child);
        Ok(self.top_mut())
    }

    /// Remove and return the top frame.
    ///
    /// Popping the root frame means the input closed more groups than it
    /// opened.
    pub fn pop(&mut self) -> Result<FormatState> {
        if self.frames.len() <= 1 {
            return Err(Error::Structural("Unbalanced group end".into()));
        }
        self.frames
            .pop()
            .ok_or_else(|| Error::Structural("Unbalanced group end".into()))
    }

    /// Peek at the top frame.
    #[inline]
    pub fn top(&self) -> &FormatState {
        // The root frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    /// Mutable access to the top frame.
    #[inline]
    pub fn top_mut(&mut self) -> &mut FormatState {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Frame `depth` levels below the top; `peek_at(0)` is the top.
    #[inline]
    pub fn peek_at(&self, depth: usize) -> Option<&FormatState> {
        self.frames.len().checked_sub(depth + 1).map(|i| &self.frames[i])
    }

    /// Number of frames, including the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::destination::Destination;

    #[test]
    fn test_push_inherits_and_pop_restores() {
        let mut stack = ScopeStack::new(FormatState::root(), 8);
        stack.top_mut().chars.bold = true;

        stack.push().unwrap().chars.italic = true;
        assert!(stack.top().chars.bold);
        assert!(stack.top().chars.italic);
        assert_eq!(stack.depth(), 2);
        assert!(stack.peek_at(1).is_some_and(|f| !f.chars.italic));
        assert!(stack.peek_at(2).is_none());

        let popped = stack.pop().unwrap();
        assert!(popped.chars.italic);
        assert!(!stack.top().chars.italic);
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let mut stack = ScopeStack::new(FormatState::root(), 8);
        let err = stack.pop().unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = ScopeStack::new(FormatState::root(), 2);
        stack.push().unwrap();
        stack.push().unwrap();
        assert!(stack.push().is_err());
    }

    #[test]
    fn test_font_table_children_read_names() {
        let mut stack = ScopeStack::new(FormatState::root(), 8);
        stack.top_mut().destination = Destination::FontTable;
        assert_eq!(stack.push().unwrap().destination, Destination::FontName);
    }
}
