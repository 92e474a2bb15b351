//! Errors reported by commands and the dispatcher.

use std::io;
use thiserror::Error;

/// Everything that can go wrong while running one pipeline segment.
///
/// The `Display` text is the detail printed after `Error: ` on the console.
/// None of these are fatal: the dispatcher reports them and moves on to the
/// next segment.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Wrong number of arguments; carries the command's usage line.
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// `>` or `>>` was the last token of a segment.
    #[error("Missing file name after '{0}'")]
    MissingRedirectTarget(&'static str),

    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("File does not exist: {0}")]
    FileNotFound(String),

    #[error("Parent directory does not exist: {0}")]
    MissingParent(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Cannot delete directory: {0}. Use rmdir instead.")]
    IsADirectory(String),

    #[error("Directory is not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Directory already exists: {0}")]
    DirectoryExists(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("Invalid directory: {0}")]
    InvalidDirectory(String),

    #[error("Source file does not exist: {0}")]
    SourceNotFound(String),

    #[error("Invalid path: No such directory: {0}")]
    NoSuchDirectory(String),

    #[error("Invalid path: {0} has no parent directory")]
    NoParentDirectory(String),

    /// A filesystem primitive failed; `action` describes what was attempted.
    #[error("{action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    /// Writing to the console sink itself failed.
    #[error("Console write failed: {0}")]
    Console(#[from] io::Error),
}

impl ShellError {
    pub(crate) fn io(action: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| ShellError::Io { action, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_console_detail() {
        assert_eq!(
            ShellError::UnknownCommand("foo".into()).to_string(),
            "Unknown command: foo"
        );
        assert_eq!(
            ShellError::Usage("cd <path>").to_string(),
            "Usage: cd <path>"
        );
        assert_eq!(
            ShellError::IsADirectory("dir".into()).to_string(),
            "Cannot delete directory: dir. Use rmdir instead."
        );
    }

    #[test]
    fn test_io_error_keeps_underlying_message() {
        let err = ShellError::io("Failed to move or rename")(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert_eq!(err.to_string(), "Failed to move or rename: permission denied");
    }
}
