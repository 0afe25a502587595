use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// A movable read position over a non-empty, owned sequence.
#[derive(Debug, Clone)]
pub struct Cursor<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Cursor<T> {
    pub fn new(items: Vec<T>) -> Result<Self, Diagnostic> {
        if items.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticKind::EmptySource,
                "cannot set up a cursor over an empty sequence",
            ));
        }
        Ok(Self { items, index: 0 })
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current(&self) -> &T {
        &self.items[self.index]
    }

    pub fn peek_previous(&self) -> Option<&T> {
        self.index.checked_sub(1).and_then(|idx| self.items.get(idx))
    }

    pub fn peek_next(&self) -> Option<&T> {
        self.items.get(self.index + 1)
    }

    pub fn move_next(&mut self) -> bool {
        let can_move = self.index + 1 < self.items.len();
        if can_move {
            self.index += 1;
        }
        can_move
    }

    pub fn move_previous(&mut self) -> bool {
        let can_move = self.index > 0;
        if can_move {
            self.index -= 1;
        }
        can_move
    }

    pub fn move_first(&mut self) {
        self.index = 0;
    }

    pub fn move_last(&mut self) {
        self.index = self.items.len() - 1;
    }

    /// Repositions to an absolute index; returns `false` and stays put when
    /// the index is out of range.
    pub fn jump_to(&mut self, position: usize) -> bool {
        let in_range = position < self.items.len();
        if in_range {
            self.index = position;
        }
        in_range
    }
}
