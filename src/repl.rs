use std::io::{self, Write};

use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    diagnostics::{Result, StackioError},
    runtime::Runner,
};

/// Line-at-a-time session; every line is a fresh program run.
pub struct Repl {
    runner: Runner,
}

impl Repl {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor =
            DefaultEditor::new().map_err(|err| StackioError::from(io::Error::other(err)))?;
        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    let mut stdout = io::stdout();
                    let mut wrote = false;
                    let outcome = self.runner.run(trimmed, |text| {
                        wrote |= !text.is_empty();
                        let _ = stdout.write_all(text.as_bytes());
                    });
                    if wrote {
                        println!();
                    }
                    match outcome {
                        Ok(stack) if !stack.is_empty() => println!("stack: {stack}"),
                        Ok(_) => {}
                        Err(StackioError::Diagnostic(diag)) => {
                            eprintln!("{:?}: {}", diag.kind, diag.message);
                        }
                        Err(other) => eprintln!("error: {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(StackioError::from(io::Error::other(err))),
            }
        }
        Ok(())
    }
}
