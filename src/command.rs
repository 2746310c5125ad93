use crate::env::Session;
use crate::error::CommandError;
use std::io::{self, Write};

/// Line-based channel between the explorer and its user.
///
/// Output goes through the [`Write`] supertrait; input is read one line at a
/// time after showing a prompt. Implementations live in [`crate::io_adapters`].
pub trait Terminal: Write {
    /// Show `prompt` (without a newline) and block until one line is entered.
    ///
    /// Returns `Ok(None)` at end of input. The line terminator is stripped.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Read the answer to a question asked by a command, as opposed to a
    /// command line. Terminals with history keep answers out of it.
    fn read_answer(&mut self, question: &str) -> io::Result<Option<String>> {
        self.read_line(question)
    }

    /// Ask a yes/no question. Only an answer of exactly `y` counts as yes;
    /// end of input counts as no.
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.read_answer(question)?.as_deref() == Some("y"))
    }
}

/// One command of the explorer, known at compile time.
pub trait BuiltinCommand {
    /// Name typed by the user to invoke the command, e.g. "ls" or "cd".
    fn name(&self) -> &'static str;

    /// Executes the command.
    ///
    /// `argv` is the full token sequence, `argv[0]` being the command name.
    /// Failures are returned as [`CommandError`] and shown to the user as a
    /// single line by the interpreter.
    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError>;
}
