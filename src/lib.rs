//! A tiny interactive shell for basic filesystem work.
//!
//! A line of input is split on `|` into independent segments. Each segment is
//! tokenized on spaces, stripped of a `>`/`>>` redirection, and dispatched by
//! name to one of a fixed set of built-ins (`echo`, `ls`, `cat`, `pwd`, `cd`,
//! `mkdir`, `rmdir`, `rm`, `mv`, `touch`, `help`). Nothing ever aborts the
//! session: failures are printed as `Error: ...` lines and the next segment
//! runs.
//!
//! The main entry point is [`Interpreter`]. Parsing lives in [`parser`] and
//! never touches the filesystem; commands reach the filesystem only through
//! the [`filesystem::FileSystem`] trait, with the working directory held in a
//! per-session [`Environment`] rather than in process-wide state.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod filesystem;
mod interpreter;
pub mod io_adapters;
pub mod options;
pub mod parser;

pub use env::Environment;
pub use error::ShellError;
/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, PROMPT, is_exit};
