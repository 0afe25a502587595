use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackio::{Repl, Runner, RunnerConfig, StackioError, lexer};

#[derive(Parser)]
#[command(author, version, about = "stackio stack-machine interpreter")]
struct Args {
    /// Abort a run after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a stackio script file
    Run { script: PathBuf },
    /// Evaluate a snippet of stackio code
    Eval { source: String },
    /// Print the tokens of a script file
    Tokens { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackio=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match dispatch(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Args) -> Result<(), StackioError> {
    let mut config = RunnerConfig::default();
    if let Some(ms) = args.timeout_ms {
        config = config.with_max_execution_time(Duration::from_millis(ms));
    }
    let runner = Runner::with_config(config);

    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => run_script(&runner, &script),
        Command::Eval { source } => run_source(&runner, &source),
        Command::Tokens { script } => print_tokens(&script),
        Command::Repl => Repl::new(runner).run(),
    }
}

fn run_script(runner: &Runner, path: &Path) -> Result<(), StackioError> {
    info!(script = %path.display(), "running script");
    let source = fs::read_to_string(path)?;
    run_source(runner, &source)
}

fn run_source(runner: &Runner, source: &str) -> Result<(), StackioError> {
    let mut stdout = io::stdout().lock();
    let mut write_err = None;
    let outcome = runner.run(source, |text| {
        if write_err.is_none() {
            if let Err(err) = stdout.write_all(text.as_bytes()) {
                write_err = Some(err);
            }
        }
    });
    stdout.flush()?;
    outcome?;
    match write_err {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_tokens(path: &Path) -> Result<(), StackioError> {
    let source = fs::read_to_string(path)?;
    let tokens = lexer::tokenize(&source)?;
    for token in tokens {
        println!(
            "{:>4}..{:<4} {:<7} {:?}",
            token.span.start, token.span.end, token.kind, token.lexeme
        );
    }
    Ok(())
}
