//! Lexical analysis of explorer command lines.
//!
//! A line is split into plain argument strings. Whitespace separates arguments,
//! single and double quotes group characters (the other quote kind is literal
//! inside them), and a backslash takes the next character literally everywhere,
//! including inside quotes.

use thiserror::Error;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unmatched quote")]
    UnfinishedQuote,
    /// The line ended right after a backslash.
    #[error("dangling escape at end of line")]
    DanglingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole line.
    ///
    /// Fails if the line ends inside a quoted region or right after a backslash.
    fn make_tokens(&mut self) -> Result<Vec<String>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch, &mut out)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_quoted(ch, '\'')?,
                LexingState::ReadingDoubleQuote => self.handle_quoted(ch, '"')?,
            }
        }

        if matches!(
            self.state,
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote
        ) {
            return Err(LexingError::UnfinishedQuote);
        }

        self.finish_word(&mut out);
        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        if is_separator(ch) {
            return Ok(());
        }
        self.state = LexingState::ReadingWord;
        self.handle_word(ch, out)
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        match ch {
            c if is_separator(c) => {
                self.finish_word(out);
                self.state = LexingState::Start;
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => self.take_escaped()?,
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn handle_quoted(&mut self, ch: char, closing: char) -> Result<(), LexingError> {
        match ch {
            c if c == closing => self.state = LexingState::ReadingWord,
            '\\' => self.take_escaped()?,
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn take_escaped(&mut self) -> Result<(), LexingError> {
        let next = self.read_char().ok_or(LexingError::DanglingEscape)?;
        self.buffer.push(next);
        Ok(())
    }

    // Quotes that enclose nothing leave the buffer empty, so they never yield a token.
    fn finish_word(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() {
            out.push(std::mem::take(&mut self.buffer));
        }
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn needs_escape(ch: char) -> bool {
    is_separator(ch) || matches!(ch, '\'' | '"' | '\\')
}

/// Splits one input line into its argument strings.
///
/// A blank line gives an empty vector.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    LexingFSM::new(line).make_tokens()
}

/// Renders tokens back into a line that [`split_into_tokens`] turns into the same tokens.
///
/// Empty tokens cannot be represented and vanish on the way back.
pub fn join_tokens(tokens: &[String]) -> String {
    let mut line = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        for ch in token.chars() {
            if needs_escape(ch) {
                line.push('\\');
            }
            line.push(ch);
        }
    }
    line
}
