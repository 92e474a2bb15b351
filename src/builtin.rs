use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use log::{debug, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Built-in commands known to the shell at compile time.
///
/// Argument handling is split in two: [`BuiltinCommand::from_args`] is pure and
/// validates the argument count, [`BuiltinCommand::execute`] does the
/// filesystem work.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Whether the command's output goes through `>`/`>>`.
    fn redirectable() -> bool {
        false
    }

    /// Build the command from the arguments left after redirection extraction.
    fn from_args(args: &[String]) -> Result<Self, ShellError>;

    /// Executes the command using provided streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn honors_redirection(&self) -> bool {
        <T as BuiltinCommand>::redirectable()
    }

    fn execute(
        self: Box<Self>,
        io: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        <T as BuiltinCommand>::execute(*self, io, env)
    }
}

/// Stand-in for a command whose arguments did not validate.
///
/// Keeps the real command's redirection support so the dispatcher treats its
/// segment the same way.
struct InvalidArgs {
    error: ShellError,
    redirectable: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn honors_redirection(&self) -> bool {
        self.redirectable
    }

    fn execute(
        self: Box<Self>,
        _io: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        Err(self.error)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn create(&self, args: &[String]) -> Box<dyn ExecutableCommand> {
        match T::from_args(args) {
            Ok(cmd) => Box::new(cmd),
            Err(error) => Box::new(InvalidArgs {
                error,
                redirectable: T::redirectable(),
            }),
        }
    }
}

/// First argument, or the command's usage error.
fn required(args: &[String], usage: &'static str) -> Result<String, ShellError> {
    args.first().cloned().ok_or(ShellError::Usage(usage))
}

/// Write the arguments to the output, separated by spaces, with one trailing newline.
pub struct Echo {
    pub message: String,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn redirectable() -> bool {
        true
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        if args.is_empty() {
            return Err(ShellError::Usage("echo <message> [> file | >> file]"));
        }
        Ok(Self {
            message: args.join(" "),
        })
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode, ShellError> {
        writeln!(io.output, "{}", self.message)?;
        Ok(0)
    }
}

/// List the immediate entries of a directory, one name per line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Ls {
    /// `-a`: include entries whose name starts with `.`.
    pub show_hidden: bool,
    /// `-r`: descending instead of ascending name order.
    pub reverse: bool,
    /// Directory to list; the working directory when absent.
    pub path: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn redirectable() -> bool {
        true
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        let mut ls = Self::default();
        for arg in args {
            match arg.as_str() {
                "-a" => ls.show_hidden = true,
                "-r" => ls.reverse = true,
                // Last positional wins.
                _ => ls.path = Some(arg.clone()),
            }
        }
        Ok(ls)
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let (dir, label) = match &self.path {
            Some(path) => (env.resolve(path), path.clone()),
            None => (
                env.current_dir.clone(),
                env.current_dir.display().to_string(),
            ),
        };
        if !env.fs().is_dir(&dir) {
            return Err(ShellError::InvalidDirectory(label));
        }

        let mut names: Vec<String> = env
            .fs()
            .list_entries(&dir)
            .map_err(ShellError::io("Unable to list files"))?
            .into_iter()
            .filter(|name| self.show_hidden || !name.starts_with('.'))
            .collect();
        names.sort();
        if self.reverse {
            names.reverse();
        }

        for name in names {
            writeln!(io.output, "{}", name)?;
        }
        Ok(0)
    }
}

/// Concatenate files line by line.
pub struct Cat {
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn redirectable() -> bool {
        true
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        if args.is_empty() {
            return Err(ShellError::Usage("cat <file1> <file2> ... [> file | >> file]"));
        }
        Ok(Self {
            files: args.to_vec(),
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let mut content = String::new();
        let mut status = 0;

        for name in &self.files {
            let path = env.resolve(name);
            if !env.fs().exists(&path) {
                io.report(&ShellError::FileNotFound(name.clone()))?;
                status = 1;
                continue;
            }
            let lines = match env.fs().read_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    io.report(&ShellError::io("Error reading file")(e))?;
                    status = 1;
                    continue;
                }
            };
            // Lines read before a failure are kept.
            for line in lines {
                match line {
                    Ok(line) => {
                        content.push_str(&line);
                        content.push('\n');
                    }
                    Err(e) => {
                        io.report(&ShellError::io("Error reading file")(e))?;
                        status = 1;
                        break;
                    }
                }
            }
        }

        io.output.write_all(content.as_bytes())?;
        Ok(status)
    }
}

/// Print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_args(_args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {})
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        writeln!(io.console, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the current working directory.
pub struct Cd {
    /// Absolute path, `..`, or a path relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {
            target: required(args, "cd <path>")?,
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let new_dir = if self.target == ".." {
            env.current_dir.parent().map(Path::to_path_buf).ok_or_else(|| {
                ShellError::NoParentDirectory(env.current_dir.display().to_string())
            })?
        } else {
            env.resolve(&self.target)
        };

        if !env.fs().is_dir(&new_dir) {
            return Err(ShellError::NoSuchDirectory(self.target));
        }

        info!(
            "working directory: {} -> {}",
            env.current_dir.display(),
            new_dir.display()
        );
        writeln!(io.console, "Changed directory to: {}", new_dir.display())?;
        env.current_dir = new_dir;
        Ok(0)
    }
}

/// Create a single directory level.
pub struct Mkdir {
    pub dir: String,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {
            dir: required(args, "mkdir <directory>")?,
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let path = env.resolve(&self.dir);
        env.fs().create_dir(&path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ShellError::DirectoryExists(self.dir.clone()),
            ErrorKind::NotFound => ShellError::MissingParent(self.dir.clone()),
            _ => ShellError::io("Could not create directory")(e),
        })?;
        writeln!(io.console, "Directory created successfully: {}", path.display())?;
        Ok(0)
    }
}

/// Remove an empty directory.
pub struct Rmdir {
    pub dir: String,
}

impl BuiltinCommand for Rmdir {
    fn name() -> &'static str {
        "rmdir"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {
            dir: required(args, "rmdir <directory>")?,
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let path = env.resolve(&self.dir);
        let fs = env.fs();
        if !fs.exists(&path) {
            return Err(ShellError::NotFound(self.dir));
        }
        if !fs.is_dir(&path) {
            return Err(ShellError::NotADirectory(self.dir));
        }
        let entries = fs
            .list_entries(&path)
            .map_err(ShellError::io("Failed to read the directory"))?;
        if !entries.is_empty() {
            return Err(ShellError::DirectoryNotEmpty(self.dir));
        }
        fs.remove_empty_dir(&path)
            .map_err(ShellError::io("Failed to delete the directory"))?;
        writeln!(io.console, "Directory removed successfully: {}", path.display())?;
        Ok(0)
    }
}

/// Remove a regular file.
pub struct Rm {
    pub file: String,
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "rm"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {
            file: required(args, "rm <file>")?,
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let path = env.resolve(&self.file);
        let fs = env.fs();
        if !fs.exists(&path) {
            return Err(ShellError::NotFound(self.file));
        }
        if fs.is_dir(&path) {
            return Err(ShellError::IsADirectory(self.file));
        }
        fs.remove_file(&path)
            .map_err(ShellError::io("Failed to delete the file"))?;
        writeln!(io.console, "File deleted successfully: {}", self.file)?;
        Ok(0)
    }
}

/// Move or rename a file, replacing an existing destination file.
pub struct Mv {
    pub source: String,
    /// An existing directory here receives the source under its own name.
    pub destination: String,
}

impl BuiltinCommand for Mv {
    fn name() -> &'static str {
        "mv"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        match args {
            [source, destination, ..] => Ok(Self {
                source: source.clone(),
                destination: destination.clone(),
            }),
            _ => Err(ShellError::Usage("mv <source> <destination>")),
        }
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let source = env.resolve(&self.source);
        let fs = env.fs();
        if !fs.exists(&source) {
            return Err(ShellError::SourceNotFound(self.source));
        }

        let mut destination: PathBuf = env.resolve(&self.destination);
        if fs.is_dir(&destination) {
            if let Some(base) = source.file_name() {
                destination.push(base);
            }
        }
        debug!("mv {} -> {}", source.display(), destination.display());

        fs.rename(&source, &destination)
            .map_err(ShellError::io("Failed to move or rename"))?;
        writeln!(
            io.console,
            "Moved/Renamed successfully: {} to {}",
            self.source,
            destination.display()
        )?;
        Ok(0)
    }
}

/// Create a new empty file; an existing file is left alone and reported.
pub struct Touch {
    pub file: String,
}

impl BuiltinCommand for Touch {
    fn name() -> &'static str {
        "touch"
    }

    fn from_args(args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {
            file: required(args, "touch <filename>")?,
        })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let path = env.resolve(&self.file);
        env.fs().create_new_file(&path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ShellError::FileExists(self.file.clone()),
            ErrorKind::NotFound => ShellError::MissingParent(self.file.clone()),
            _ => ShellError::io("Failed to create file")(e),
        })?;
        writeln!(io.console, "File created: {}", self.file)?;
        Ok(0)
    }
}

pub(crate) const HELP_TEXT: &str = "\
Supported commands:
pwd - Print the current directory
cd <path> - Change directory (absolute, relative or ..)
cat <file1> <file2> ... [> <file> | >> <file>] - Display file contents
mkdir <directory> - Create a new directory
rmdir <directory> - Remove an empty directory
rm <file> - Remove a file
mv <source> <destination> - Move or rename a file
touch <filename> - Create a new empty file
echo <message> [> <file> | >> <file>] - Write a message to the console or a file
ls [<directory>] [-a] [-r] [> <file> | >> <file>] - List directory entries
exit - Exit the shell
help - Display available commands
";

/// Print the list of supported commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn from_args(_args: &[String]) -> Result<Self, ShellError> {
        Ok(Self {})
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode, ShellError> {
        io.console.write_all(HELP_TEXT.as_bytes())?;
        Ok(0)
    }
}
