use crate::command::{BuiltinCommand, Terminal};
use crate::env::Session;
use crate::error::CommandError;
use crate::lexer::{self, join_tokens};
use anyhow::Context;
use std::io::Write;
use tracing::debug;

/// Shown before every command line is read.
pub const PROMPT: &str = "Enter command (type 'help' for all commands): ";

/// The explorer's read-eval-print loop.
///
/// The interpreter owns the [`Session`] and a table of [`BuiltinCommand`]s
/// looked up by name. See [`Interpreter::with_default_commands`] for the table
/// the binary uses.
///
/// Example
/// ```
/// use mini_file_explorer::{Interpreter, ScriptedTerminal, Session};
/// let mut explorer = Interpreter::with_default_commands(Session::new(std::env::temp_dir()));
/// let mut term = ScriptedTerminal::scripted("help\nexit\n");
/// explorer.repl(&mut term).unwrap();
/// assert!(term.transcript().ends_with("MiniFileExplorer closed successfully\n"));
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn BuiltinCommand>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of commands.
    pub fn new(session: Session, commands: Vec<Box<dyn BuiltinCommand>>) -> Self {
        Self { session, commands }
    }

    /// Create an interpreter with every explorer command.
    pub fn with_default_commands(session: Session) -> Self {
        use crate::builtin::*;
        Self::new(
            session,
            vec![
                Box::new(Cd),
                Box::new(Ls),
                Box::new(Touch),
                Box::new(Mkdir),
                Box::new(Rm),
                Box::new(Rmdir),
                Box::new(Stat),
                Box::new(Search),
                Box::new(Cp),
                Box::new(Mv),
                Box::new(Du),
                Box::new(Help),
                Box::new(Exit),
            ],
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one already tokenized command; `argv[0]` selects the command.
    pub fn run(&mut self, argv: &[String], term: &mut dyn Terminal) -> Result<(), CommandError> {
        let Some(name) = argv.first() else {
            return Ok(());
        };
        let cmd = self
            .commands
            .iter()
            .find(|cmd| cmd.name() == name)
            .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;
        cmd.execute(argv, term, &mut self.session)
    }

    /// Tokenize and run one input line, printing any failure as a single line.
    ///
    /// Only a failing terminal is returned as an error.
    pub fn execute_line(&mut self, line: &str, term: &mut dyn Terminal) -> anyhow::Result<()> {
        let result = match lexer::split_into_tokens(line) {
            Ok(argv) if argv.is_empty() => return Ok(()),
            Ok(argv) => {
                debug!(command = %argv[0], line = %join_tokens(&argv), "dispatching");
                self.run(&argv, term)
            }
            Err(err) => {
                debug!(error = %err, "rejected input line");
                Err(CommandError::InvalidCommand)
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => Err(err).context("command aborted"),
            Err(err) => {
                writeln!(term, "{err}").context("failed to write to terminal")?;
                Ok(())
            }
        }
    }

    /// Prompt, read and execute lines until `exit` or end of input.
    pub fn repl(&mut self, term: &mut dyn Terminal) -> anyhow::Result<()> {
        while !self.session.should_exit {
            let Some(line) = term
                .read_line(PROMPT)
                .context("failed to read command line")?
            else {
                debug!("end of input");
                break;
            };
            self.execute_line(&line, term)?;
        }
        Ok(())
    }
}
