use crate::command::Terminal;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Cursor, Write};
use tracing::warn;

/// Terminal over any buffered reader and writer.
///
/// Used for piped (non-TTY) standard input and, wrapped around in-memory
/// buffers, as a scripted terminal in tests.
pub struct LineTerminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineTerminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Write for LineTerminal<R, W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.output.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Terminal for LineTerminal<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        strip_line_ending(&mut line);
        Ok(Some(line))
    }
}

/// Memory-backed terminal that answers prompts from a fixed script.
pub type ScriptedTerminal = LineTerminal<Cursor<Vec<u8>>, Vec<u8>>;

impl ScriptedTerminal {
    /// Each line of `script` is one answer to one prompt.
    pub fn scripted(script: &str) -> Self {
        LineTerminal::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    /// Everything written so far, prompts included.
    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Interactive terminal backed by the `rustyline` line editor.
pub struct EditorTerminal {
    editor: DefaultEditor,
    stdout: io::Stdout,
}

impl EditorTerminal {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            stdout: io::stdout(),
        })
    }
}

impl Write for EditorTerminal {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stdout.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl EditorTerminal {
    fn read_entry(&mut self, prompt: &str, remember: bool) -> io::Result<Option<String>> {
        self.stdout.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => {
                if remember && is_history_worthy(&line) {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!(error = %err, "failed to record history entry");
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-C ends the session the same way Ctrl-D does.
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }
}

impl Terminal for EditorTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.read_entry(prompt, true)
    }

    fn read_answer(&mut self, question: &str) -> io::Result<Option<String>> {
        self.read_entry(question, false)
    }
}

fn is_history_worthy(line: &str) -> bool {
    !line.trim().is_empty()
}

fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
