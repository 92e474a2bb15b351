use crate::filesystem::{FileSystem, HostFileSystem};
use std::env as stdenv;
use std::path::{Component, Path, PathBuf};

/// Per-session state threaded through every command.
///
/// The environment contains:
/// - `current_dir`: the working directory relative paths are resolved against.
///   Only `cd` changes it; the process working directory is never touched.
/// - the [`FileSystem`] the commands operate on.
#[derive(Debug)]
pub struct Environment {
    /// The current working directory, always absolute.
    pub current_dir: PathBuf,
    fs: Box<dyn FileSystem>,
}

impl Environment {
    /// Start a session in the process working directory on the host filesystem.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::in_dir(current_dir)
    }

    /// Start a session in `dir` on the host filesystem.
    ///
    /// A relative `dir` is taken relative to the process working directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_system(dir, Box::new(HostFileSystem))
    }

    /// Start a session in `dir` on a custom filesystem.
    pub fn with_file_system(dir: impl Into<PathBuf>, fs: Box<dyn FileSystem>) -> Self {
        let dir = dir.into();
        let dir = if dir.is_absolute() {
            dir
        } else {
            stdenv::current_dir()
                .map(|cwd| cwd.join(&dir))
                .unwrap_or(dir)
        };
        Self {
            current_dir: normalize(&dir),
            fs,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Resolve a command argument against the working directory.
    ///
    /// Absolute arguments are used as-is. The result is lexically normalized
    /// (`.` dropped, `..` folded) but symlinks are not followed.
    pub fn resolve(&self, arg: &str) -> PathBuf {
        normalize(&self.current_dir.join(arg))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}
