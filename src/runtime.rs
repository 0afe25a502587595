use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::{
    cursor::Cursor,
    diagnostics::{Diagnostic, DiagnosticKind, Result, StackioError},
    lexer,
    program::{self, Instruction, InstructionKind, Opcode, Program},
    stack::{Stack, format_number},
};

/// Execution policy for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Wall-clock budget; `None` runs to completion however long it takes.
    pub max_execution_time: Option<Duration>,
}

impl RunnerConfig {
    pub fn with_max_execution_time(mut self, limit: Duration) -> Self {
        self.max_execution_time = Some(limit);
        self
    }
}

/// How the cursor moves after an instruction.
enum Flow {
    Next,
    JumpTo(usize),
    SkipNext,
    Halt,
}

#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Lexes, compiles and executes `source`, writing program output to `sink`.
    /// Returns the final stack.
    pub fn run<F>(&self, source: &str, mut sink: F) -> Result<Stack>
    where
        F: FnMut(&str),
    {
        let tokens = lexer::tokenize(source).map_err(StackioError::from)?;
        let program = program::compile(tokens).map_err(StackioError::from)?;
        self.execute(program, &mut sink)
    }

    pub fn execute(&self, program: Program, sink: &mut dyn FnMut(&str)) -> Result<Stack> {
        let mut stack = Stack::new();
        if program.is_empty() {
            return Ok(stack);
        }
        debug!(instructions = program.len(), "starting run");

        let mut cursor = Cursor::new(program.instructions)?;
        let started = Instant::now();
        let mut steps: u64 = 0;
        loop {
            if let Some(limit) = self.config.max_execution_time {
                if started.elapsed() > limit {
                    warn!(steps, ?limit, "execution budget exceeded");
                    return Err(StackioError::from(
                        Diagnostic::new(
                            DiagnosticKind::Timeout,
                            format!("execution exceeded {} ms", limit.as_millis()),
                        )
                        .with_span(cursor.current().span)
                        .with_note(format!("{steps} instruction(s) executed")),
                    ));
                }
            }

            let instruction = cursor.current();
            trace!(position = cursor.position(), kind = ?instruction.kind, "step");
            let flow = step(instruction, &mut stack, sink)
                .map_err(|diag| StackioError::from(diag.or_span(instruction.span)))?;
            steps += 1;

            match flow {
                Flow::Next => {}
                Flow::JumpTo(target) => {
                    cursor.jump_to(target);
                }
                Flow::SkipNext => {
                    cursor.move_next();
                }
                Flow::Halt => cursor.move_last(),
            }
            if !cursor.move_next() {
                break;
            }
        }

        debug!(steps, depth = stack.len(), "run finished");
        Ok(stack)
    }
}

fn step(
    instruction: &Instruction,
    stack: &mut Stack,
    sink: &mut dyn FnMut(&str),
) -> std::result::Result<Flow, Diagnostic> {
    match &instruction.kind {
        InstructionKind::Push(value) => {
            stack.push(*value);
            Ok(Flow::Next)
        }
        InstructionKind::Emit(text) => {
            sink(text.as_str());
            Ok(Flow::Next)
        }
        InstructionKind::Op(opcode) => apply(*opcode, stack, sink),
        InstructionKind::Mark(_) => Ok(Flow::Next),
        InstructionKind::Jump { target, .. } => Ok(Flow::JumpTo(*target)),
        InstructionKind::Fault(diag) => Err(diag.clone()),
    }
}

fn apply(
    opcode: Opcode,
    stack: &mut Stack,
    sink: &mut dyn FnMut(&str),
) -> std::result::Result<Flow, Diagnostic> {
    match opcode {
        Opcode::Print => sink(format_number(stack.top()?).as_str()),
        Opcode::Pop => {
            stack.pop()?;
        }
        Opcode::Swap => {
            let a = stack.pop()?;
            let b = stack.pop()?;
            stack.push(a);
            stack.push(b);
        }
        Opcode::Take => {
            let n = stack.pop()?;
            let value = stack.get(stack_index(n)?)?;
            stack.push(value);
        }
        Opcode::Add => arithmetic(stack, |a, b| a + b)?,
        Opcode::Sub => arithmetic(stack, |a, b| a - b)?,
        Opcode::Mul => arithmetic(stack, |a, b| a * b)?,
        Opcode::Div => arithmetic(stack, |a, b| a / b)?,
        Opcode::Mod => arithmetic(stack, |a, b| a % b)?,
        Opcode::IfZero => return condition(stack, |v| v == 0.0),
        Opcode::IfPos => return condition(stack, |v| v > 0.0),
        Opcode::IfNeg => return condition(stack, |v| v < 0.0),
        Opcode::Halt => return Ok(Flow::Halt),
    }
    Ok(Flow::Next)
}

/// Pops `top`, then `bottom`, and pushes `bottom OP top`.
fn arithmetic<F>(stack: &mut Stack, op: F) -> std::result::Result<(), Diagnostic>
where
    F: Fn(f64, f64) -> f64,
{
    let top = stack.pop()?;
    let bottom = stack.pop()?;
    stack.push(op(bottom, top));
    Ok(())
}

fn condition<F>(stack: &Stack, holds: F) -> std::result::Result<Flow, Diagnostic>
where
    F: Fn(f64) -> bool,
{
    if holds(stack.top()?) {
        Ok(Flow::Next)
    } else {
        Ok(Flow::SkipNext)
    }
}

fn stack_index(value: f64) -> std::result::Result<i64, Diagnostic> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(Diagnostic::new(
            DiagnosticKind::StackUnderflow,
            format!("stack index must be an integer, found {}", format_number(value)),
        ))
    }
}
