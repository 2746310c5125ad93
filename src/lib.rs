//! A small interactive file explorer.
//!
//! The explorer reads one command per line, splits it into words with shell-like
//! quoting rules and dispatches it to a built-in command that inspects or changes
//! the filesystem relative to the session's current directory.
//!
//! The main entry point is [`Interpreter`], which owns the [`Session`] and runs the
//! prompt loop against any [`command::Terminal`]. The binary drives it with a
//! line editor; tests drive it with a [`ScriptedTerminal`].

pub mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod listing;
pub mod logging;
pub mod probe;

pub use env::Session;
pub use error::{CommandError, StartupError};
pub use interpreter::{Interpreter, PROMPT};
pub use io_adapters::ScriptedTerminal;
