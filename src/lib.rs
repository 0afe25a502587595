//! Core library for the stackio language: a lexer, a compile step that
//! resolves tokens into instructions, and a stack-machine runner.

pub mod cursor;
pub mod diagnostics;
pub mod lexer;
pub mod program;
pub mod repl;
pub mod runtime;
pub mod stack;

pub use diagnostics::{Diagnostic, DiagnosticKind, Result, SourceSpan, StackioError};
pub use lexer::{Token, TokenKind};
pub use repl::Repl;
pub use runtime::{Runner, RunnerConfig};
pub use stack::Stack;

/// Runs `source` with the default configuration, sending program output to `sink`.
pub fn run<F>(source: &str, sink: F) -> Result<Stack>
where
    F: FnMut(&str),
{
    Runner::new().run(source, sink)
}
