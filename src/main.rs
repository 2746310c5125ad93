use argh::FromArgs;
use mini_file_explorer::io_adapters::{EditorTerminal, LineTerminal};
use mini_file_explorer::{Interpreter, Session, StartupError, logging};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::warn;

#[derive(FromArgs)]
/// Interactive command-line file explorer.
struct Cli {
    #[argh(positional)]
    /// directory to start in; defaults to the current working directory.
    directory: Option<String>,
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli: Cli = argh::from_env();

    let session = match Session::start(cli.directory.as_deref()) {
        Ok(session) => session,
        Err(err @ StartupError::DirectoryNotFound(_)) => {
            println!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    println!("Current Directory: {}", session.current_dir.display());

    match run(Interpreter::with_default_commands(session)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut interpreter: Interpreter) -> anyhow::Result<()> {
    if io::stdin().is_terminal() {
        match EditorTerminal::new() {
            Ok(mut term) => return interpreter.repl(&mut term),
            Err(err) => warn!(error = %err, "line editor unavailable, reading plain lines"),
        }
    }
    let mut term = LineTerminal::new(io::stdin().lock(), io::stdout());
    interpreter.repl(&mut term)
}
