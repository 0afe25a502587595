use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// The numeric runtime stack.
///
/// Indices are absolute from the bottom when non-negative and relative to the
/// top when negative, so `-1` addresses the top element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    values: Vec<f64>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: i64) -> Result<f64, Diagnostic> {
        let idx = self.resolve(index)?;
        Ok(self.values[idx])
    }

    pub fn top(&self) -> Result<f64, Diagnostic> {
        self.get(-1)
    }

    pub fn set(&mut self, index: i64, value: f64) -> Result<(), Diagnostic> {
        let idx = self.resolve(index)?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<f64, Diagnostic> {
        self.values.pop().ok_or_else(|| {
            Diagnostic::new(DiagnosticKind::StackUnderflow, "cannot pop from an empty stack")
        })
    }

    fn resolve(&self, index: i64) -> Result<usize, Diagnostic> {
        let len = self.values.len() as i64;
        let absolute = if index >= 0 { index } else { len + index };
        if (0..len).contains(&absolute) {
            Ok(absolute as usize)
        } else {
            Err(Diagnostic::new(
                DiagnosticKind::StackUnderflow,
                format!("stack index {index} is out of range"),
            )
            .with_note(format!("stack holds {len} value(s)")))
        }
    }
}

impl From<Vec<f64>> for Stack {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_number(*value))?;
        }
        write!(f, "]")
    }
}

/// Renders a number the way `print` shows it.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
