use crate::env::Environment;
use crate::error::ShellError;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// The two sinks a command may write to.
///
/// `output` receives the command's content (the text that `>`/`>>` divert
/// to a file); the dispatcher decides where it ends up once the command has
/// finished. `console` receives status and diagnostic lines and is always
/// the terminal.
pub struct Streams<'a> {
    pub output: &'a mut dyn Write,
    pub console: &'a mut dyn Write,
}

impl Streams<'_> {
    /// Print `err` to the console as an `Error: ...` line.
    pub fn report(&mut self, err: &ShellError) -> Result<(), ShellError> {
        writeln!(self.console, "Error: {err}")?;
        Ok(())
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl.
pub trait ExecutableCommand {
    /// Whether `output` should be routed through the redirection, if any.
    ///
    /// Commands that answer `false` write to the console and any redirection
    /// on their segment is ignored.
    fn honors_redirection(&self) -> bool;

    /// Executes the command.
    ///
    /// An `Err` is reported by the dispatcher as a single `Error: ...` line.
    fn execute(
        self: Box<Self>,
        io: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError>;
}

/// Factory that creates a command from its arguments.
///
/// Factories are registered under [`CommandFactory::name`]; the dispatcher
/// looks them up by the first token of a segment.
pub trait CommandFactory {
    /// The name the command is invoked by.
    fn name(&self) -> &'static str;

    /// Build a command instance for the provided arguments.
    ///
    /// Argument validation happens here, before anything touches the
    /// filesystem; invalid arguments yield a command that only reports usage.
    fn create(&self, args: &[String]) -> Box<dyn ExecutableCommand>;
}
