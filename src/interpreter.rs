use crate::command::{CommandFactory, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::{self, ParsedCommand, Redirection};
use anyhow::Context;
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate (see `BuiltinCommand`).
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Prompt printed before each interactive line.
pub const PROMPT: &str = "> ";

/// A minimal shell-like interpreter for basic filesystem commands.
///
/// The interpreter owns an [`Environment`] (the session's working directory),
/// a table of [`CommandFactory`] objects keyed by command name, and the
/// console sink every status and error line is printed to.
///
/// Example
/// ```
/// use cli_shell::Interpreter;
/// use cli_shell::io_adapters::MemWriter;
///
/// let console = MemWriter::new();
/// let mut sh = Interpreter::default().with_console(Box::new(console.clone()));
/// let code = sh.execute("echo hello world");
/// assert_eq!(code, 0);
/// assert_eq!(console.contents(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: HashMap<&'static str, Box<dyn CommandFactory>>,
    console: Box<dyn Write>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    ///
    /// Output goes to the process stdout until [`Interpreter::with_console`]
    /// replaces it.
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        let mut interpreter = Self {
            env,
            commands: HashMap::new(),
            console: Box::new(std::io::stdout()),
        };
        for factory in commands {
            interpreter.register(factory);
        }
        interpreter
    }

    /// Replace the console sink.
    pub fn with_console(mut self, console: Box<dyn Write>) -> Self {
        self.console = console;
        self
    }

    /// Add a command, replacing any command registered under the same name.
    pub fn register(&mut self, factory: Box<dyn CommandFactory>) {
        self.commands.insert(factory.name(), factory);
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Execute one raw input line.
    ///
    /// Segments separated by `|` run one after another and independently:
    /// nothing flows from one segment to the next, and a failing segment
    /// does not stop the ones after it. Failures are printed to the console
    /// as `Error: ...` lines and never returned.
    ///
    /// Returns the exit code of the last segment (0 for a blank line).
    pub fn execute(&mut self, line: &str) -> ExitCode {
        let mut last = 0;
        for parsed in parser::parse_line(line) {
            let outcome = parsed.and_then(|command| self.run(&command));
            last = match outcome {
                Ok(code) => code,
                Err(err) => {
                    debug!("segment failed: {err:?}");
                    if let Err(console_err) = writeln!(self.console, "Error: {err}") {
                        warn!("could not report error to console: {console_err}");
                    }
                    1
                }
            };
        }
        if let Err(err) = self.console.flush() {
            warn!("could not flush console: {err}");
        }
        last
    }

    /// Dispatch a single parsed command.
    pub fn run(&mut self, command: &ParsedCommand) -> Result<ExitCode, ShellError> {
        debug!("dispatching {command:?}");
        let factory = self
            .commands
            .get(command.name.as_str())
            .ok_or_else(|| ShellError::UnknownCommand(command.name.clone()))?;
        let cmd = factory.create(&command.args);

        if cmd.honors_redirection() {
            let mut output = Vec::new();
            let code = cmd.execute(
                &mut Streams {
                    output: &mut output,
                    console: &mut self.console,
                },
                &mut self.env,
            )?;
            self.write_output(&output, &command.redirection)?;
            Ok(code)
        } else {
            if command.redirection != Redirection::None {
                warn!(
                    "{} does not support redirection; {:?} ignored",
                    command.name, command.redirection
                );
            }
            let console = &mut self.console;
            cmd.execute(
                &mut Streams {
                    output: &mut std::io::sink(),
                    console,
                },
                &mut self.env,
            )
        }
    }

    /// Send a command's output to the console or to its redirect target.
    ///
    /// The content is written as-is; no newline is added.
    fn write_output(&mut self, content: &[u8], redirection: &Redirection) -> Result<(), ShellError> {
        let (target, append) = match redirection {
            Redirection::None => {
                self.console.write_all(content)?;
                return Ok(());
            }
            Redirection::Overwrite(target) => (target, false),
            Redirection::Append(target) => (target, true),
        };
        let path = self.env.resolve(target);
        debug!(
            "writing {} bytes to {} (append: {append})",
            content.len(),
            path.display()
        );
        let mut file = self
            .env
            .fs()
            .open_for_write(&path, append)
            .map_err(ShellError::io("Error writing to file"))?;
        file.write_all(content)
            .and_then(|()| file.flush())
            .map_err(ShellError::io("Error writing to file"))
    }

    /// Read-Eval-Print Loop on the terminal.
    ///
    /// Prints [`PROMPT`], reads a line with line editing and hands it to
    /// [`Interpreter::execute`]. `exit` (any case) or end of input ends the
    /// loop; Ctrl-C discards the current line. When `history` is given it is
    /// loaded first and saved on the way out.
    pub fn repl(&mut self, history: Option<&Path>) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
        if let Some(path) = history {
            if let Err(err) = editor.load_history(path) {
                warn!("could not load history from {}: {err}", path.display());
            }
        }

        loop {
            let line = match editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read line"),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            editor.add_history_entry(line)?;
            if is_exit(line) {
                writeln!(self.console, "Exiting the command line interpreter.")?;
                break;
            }
            self.execute(line);
        }

        if let Some(path) = history {
            if let Err(err) = editor.save_history(path) {
                warn!("could not save history to {}: {err}", path.display());
            }
        }
        Ok(())
    }
}

/// Whether a trimmed input line asks the loop to stop.
pub fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}

impl Default for Interpreter {
    /// Create an interpreter in the process working directory with every
    /// built-in: `echo`, `ls`, `cat`, `pwd`, `cd`, `mkdir`, `rmdir`, `rm`,
    /// `mv`, `touch` and `help`.
    fn default() -> Self {
        Self::with_builtins(Environment::new())
    }
}

impl Interpreter {
    /// Create an interpreter for `env` with every built-in registered.
    pub fn with_builtins(env: Environment) -> Self {
        use crate::builtin::*;
        Self::new(
            env,
            vec![
                Box::new(Factory::<Echo>::default()),
                Box::new(Factory::<Ls>::default()),
                Box::new(Factory::<Cat>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Mkdir>::default()),
                Box::new(Factory::<Rmdir>::default()),
                Box::new(Factory::<Rm>::default()),
                Box::new(Factory::<Mv>::default()),
                Box::new(Factory::<Touch>::default()),
                Box::new(Factory::<Help>::default()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ExecutableCommand;
    use crate::io_adapters::MemWriter;
    use std::fs;
    use tempfile::TempDir;

    fn shell() -> (TempDir, Interpreter, MemWriter) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let console = MemWriter::new();
        let sh = Interpreter::with_builtins(Environment::in_dir(dir.path()))
            .with_console(Box::new(console.clone()));
        (dir, sh, console)
    }

    #[test]
    fn test_echo_to_console() {
        let (_dir, mut sh, console) = shell();
        assert_eq!(sh.execute("echo hello"), 0);
        assert_eq!(console.contents(), "hello\n");
    }

    #[test]
    fn test_echo_redirect_writes_file_not_console() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("echo hello > out.txt"), 0);
        assert_eq!(console.contents(), "");
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello\n");

        sh.execute("echo again >> out.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "hello\nagain\n"
        );

        sh.execute("echo fresh > out.txt");
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "fresh\n");
    }

    #[test]
    fn test_redirect_target_follows_working_directory() {
        let (dir, mut sh, _console) = shell();
        fs::create_dir(dir.path().join("sub")).unwrap();
        sh.execute("cd sub");
        sh.execute("echo inside > note.txt");
        assert!(dir.path().join("sub/note.txt").exists());
        assert!(!dir.path().join("note.txt").exists());
    }

    #[test]
    fn test_ls_and_cat_redirect() {
        let (dir, mut sh, console) = shell();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "alpha\n").unwrap();

        sh.execute("ls -r > listing");
        assert_eq!(console.contents(), "");
        assert_eq!(
            fs::read_to_string(dir.path().join("listing")).unwrap(),
            "b.txt\na.txt\n"
        );

        sh.execute("cat a.txt a.txt >> listing");
        assert_eq!(
            fs::read_to_string(dir.path().join("listing")).unwrap(),
            "b.txt\na.txt\nalpha\nalpha\n"
        );
    }

    #[test]
    fn test_usage_error_with_redirection_creates_no_file() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("echo > f.txt"), 1);
        assert_eq!(
            console.contents(),
            "Error: Usage: echo <message> [> file | >> file]\n"
        );
        assert!(!dir.path().join("f.txt").exists());
    }

    #[test]
    fn test_failed_redirect_write_is_reported_and_pipeline_continues() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("echo hi > missing/out.txt | echo after"), 0);

        let out = console.contents();
        assert!(out.starts_with("Error: Error writing to file: "), "{out}");
        assert!(out.ends_with("\nafter\n"), "{out}");
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_failed_ls_creates_no_redirect_file() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("ls missing > out.txt"), 1);
        assert_eq!(console.contents(), "Error: Invalid directory: missing\n");
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn test_status_commands_ignore_redirection() {
        let (dir, mut sh, console) = shell();
        sh.execute("touch f.txt > log.txt");
        assert_eq!(console.contents(), "File created: f.txt\n");
        assert!(!dir.path().join("log.txt").exists());
    }

    #[test]
    fn test_unknown_command_does_not_abort_pipeline() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("foo | pwd"), 0);
        assert_eq!(
            console.contents(),
            format!("Error: Unknown command: foo\n{}\n", dir.path().display())
        );
    }

    #[test]
    fn test_segments_run_in_order_without_piping() {
        let (dir, mut sh, console) = shell();
        fs::write(dir.path().join("a.txt"), "data\n").unwrap();
        sh.execute("cat a.txt | echo done");
        assert_eq!(console.contents(), "data\ndone\n");
    }

    #[test]
    fn test_usage_and_missing_redirect_target_are_reported() {
        let (_dir, mut sh, console) = shell();
        assert_eq!(sh.execute("mv onlyone"), 1);
        assert_eq!(console.take(), "Error: Usage: mv <source> <destination>\n");

        assert_eq!(sh.execute("echo hi > | echo after"), 0);
        assert_eq!(
            console.take(),
            "Error: Missing file name after '>'\nafter\n"
        );
    }

    #[test]
    fn test_mkdir_rmdir_leaves_state_unchanged() {
        let (dir, mut sh, console) = shell();
        let before: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(sh.execute("mkdir d | rmdir d"), 0);
        let after: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(before.len(), after.len());

        let out = console.contents();
        assert!(out.contains("Directory created successfully"));
        assert!(out.contains("Directory removed successfully"));
    }

    #[test]
    fn test_touch_twice_reports_and_keeps_file_empty() {
        let (dir, mut sh, console) = shell();
        assert_eq!(sh.execute("touch f"), 0);
        assert_eq!(sh.execute("touch f"), 1);
        assert_eq!(
            console.contents(),
            "File created: f\nError: File already exists: f\n"
        );
        assert_eq!(fs::metadata(dir.path().join("f")).unwrap().len(), 0);
    }

    #[test]
    fn test_cd_changes_session_dir_only() {
        let (dir, mut sh, console) = shell();
        let process_cwd = std::env::current_dir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        sh.execute("cd sub");
        assert_eq!(sh.env().current_dir, dir.path().join("sub"));
        sh.execute("cd ..");
        assert_eq!(sh.env().current_dir, dir.path());
        assert_eq!(sh.execute("cd nonexistent"), 1);
        assert_eq!(sh.env().current_dir, dir.path());

        assert_eq!(std::env::current_dir().unwrap(), process_cwd);
        assert!(console.contents().ends_with("Error: Invalid path: No such directory: nonexistent\n"));
    }

    #[test]
    fn test_blank_line_does_nothing() {
        let (_dir, mut sh, console) = shell();
        assert_eq!(sh.execute("   "), 0);
        assert_eq!(console.contents(), "");
    }

    #[test]
    fn test_is_exit_ignores_case() {
        assert!(is_exit("exit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("Exit"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
    }

    struct Shout;

    impl ExecutableCommand for Shout {
        fn honors_redirection(&self) -> bool {
            true
        }

        fn execute(
            self: Box<Self>,
            io: &mut Streams<'_>,
            _env: &mut Environment,
        ) -> Result<ExitCode, ShellError> {
            writeln!(io.output, "HEY")?;
            Ok(0)
        }
    }

    struct ShoutFactory;

    impl CommandFactory for ShoutFactory {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn create(&self, _args: &[String]) -> Box<dyn ExecutableCommand> {
            Box::new(Shout)
        }
    }

    #[test]
    fn test_registered_command_is_dispatched() {
        let (dir, mut sh, console) = shell();
        sh.register(Box::new(ShoutFactory));
        sh.execute("shout | shout > loud.txt");
        assert_eq!(console.contents(), "HEY\n");
        assert_eq!(fs::read_to_string(dir.path().join("loud.txt")).unwrap(), "HEY\n");
    }
}
