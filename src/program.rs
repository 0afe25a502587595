use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Token, TokenKind},
};

/// Built-in stack operations named by symbol tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Print,
    Pop,
    Swap,
    Take,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IfZero,
    IfPos,
    IfNeg,
    Halt,
}

impl Opcode {
    /// Looks an opcode up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let opcode = match name.to_ascii_lowercase().as_str() {
            "print" => Opcode::Print,
            "pop" => Opcode::Pop,
            "swap" => Opcode::Swap,
            "take" => Opcode::Take,
            "add" => Opcode::Add,
            "sub" => Opcode::Sub,
            "mul" => Opcode::Mul,
            "div" => Opcode::Div,
            "mod" => Opcode::Mod,
            "if_zero" => Opcode::IfZero,
            "if_pos" => Opcode::IfPos,
            "if_neg" => Opcode::IfNeg,
            "halt" => Opcode::Halt,
            _ => return None,
        };
        Some(opcode)
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Print => "print",
            Opcode::Pop => "pop",
            Opcode::Swap => "swap",
            Opcode::Take => "take",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::IfZero => "if_zero",
            Opcode::IfPos => "if_pos",
            Opcode::IfNeg => "if_neg",
            Opcode::Halt => "halt",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum InstructionKind {
    Push(f64),
    Emit(String),
    Op(Opcode),
    Mark(String),
    Jump { label: String, target: usize },
    /// A token that could not be resolved. Raised only when execution
    /// reaches it, so earlier output is still produced.
    Fault(Diagnostic),
}

#[derive(Debug, Clone)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub span: SourceSpan,
}

/// A resolved token sequence ready for execution.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: IndexMap<String, usize>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

pub fn compile(tokens: Vec<Token>) -> Result<Program, Diagnostic> {
    let labels = collect_labels(&tokens)?;
    let instructions = tokens
        .into_iter()
        .map(|token| resolve(token, &labels))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        instructions = instructions.len(),
        labels = labels.len(),
        "compiled program"
    );
    Ok(Program {
        instructions,
        labels,
    })
}

fn collect_labels(tokens: &[Token]) -> Result<IndexMap<String, usize>, Diagnostic> {
    let mut labels: IndexMap<String, usize> = IndexMap::new();
    for (position, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Label {
            continue;
        }
        if let Some(&first) = labels.get(&token.lexeme) {
            return Err(Diagnostic::new(
                DiagnosticKind::DuplicateLabel,
                format!("label `{}` is defined more than once", token.lexeme),
            )
            .with_span(token.span)
            .with_note(format!("first defined at instruction {first}")));
        }
        labels.insert(token.lexeme.clone(), position);
    }
    Ok(labels)
}

fn resolve(token: Token, labels: &IndexMap<String, usize>) -> Result<Instruction, Diagnostic> {
    let span = token.span;
    let kind = match token.kind {
        TokenKind::Number => match token.lexeme.parse::<f64>() {
            Ok(value) => InstructionKind::Push(value),
            Err(_) => InstructionKind::Fault(
                Diagnostic::new(
                    DiagnosticKind::UnexpectedToken,
                    format!("malformed number `{}`", token.lexeme),
                )
                .with_span(span),
            ),
        },
        TokenKind::String => InstructionKind::Emit(token.lexeme),
        TokenKind::Symbol => match Opcode::from_name(&token.lexeme) {
            Some(opcode) => InstructionKind::Op(opcode),
            None => InstructionKind::Fault(
                Diagnostic::new(
                    DiagnosticKind::UnexpectedToken,
                    format!("unknown symbol `{}`", token.lexeme),
                )
                .with_span(span),
            ),
        },
        TokenKind::Label => InstructionKind::Mark(token.lexeme),
        TokenKind::Jump => match labels.get(&token.lexeme) {
            Some(&target) => InstructionKind::Jump {
                label: token.lexeme,
                target,
            },
            None => {
                return Err(Diagnostic::new(
                    DiagnosticKind::UndefinedLabel,
                    format!("jump to undefined label `{}`", token.lexeme),
                )
                .with_span(span));
            }
        },
    };
    Ok(Instruction { kind, span })
}
