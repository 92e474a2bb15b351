use log::debug;
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::path::Path;

/// Lazily read lines of a text file.
pub type Lines = Box<dyn Iterator<Item = io::Result<String>>>;

/// Narrow view of the filesystem used by the built-in commands.
///
/// Every path handed to these methods is already resolved against the
/// session's working directory. Implementations perform exactly one
/// primitive per call and never print anything.
pub trait FileSystem: Debug {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the immediate entries of `path`, in no particular order.
    fn list_entries(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Create a single directory level; the parent must already exist.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory that is already empty.
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Move or rename `from` to `to`, replacing `to` if it is a file.
    ///
    /// Works across filesystems for regular files.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create an empty file, failing with `AlreadyExists` if `path` exists.
    fn create_new_file(&self, path: &Path) -> io::Result<()>;

    /// Lines without their `\n` or `\r\n`; invalid UTF-8 is replaced, not an error.
    fn read_lines(&self, path: &Path) -> io::Result<Lines>;

    /// Open `path` for writing, truncating it unless `append` is set.
    fn open_for_write(&self, path: &Path, append: bool) -> io::Result<Box<dyn Write>>;
}

/// [`FileSystem`] backed by the host operating system through `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFileSystem;

impl FileSystem for HostFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<String>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        move_path(from, to, |from, to| fs::rename(from, to))
    }

    fn create_new_file(&self, path: &Path) -> io::Result<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Lines> {
        let file = File::open(path)?;
        Ok(Box::new(LossyLines {
            reader: BufReader::new(file),
        }))
    }

    fn open_for_write(&self, path: &Path, append: bool) -> io::Result<Box<dyn Write>> {
        let mut options = OpenOptions::new();
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options.create(true).open(path)?;
        Ok(Box::new(file))
    }
}

/// Rename, falling back to copy-then-delete when `from` and `to` live on
/// different filesystems. Directories are never copied.
fn move_path(
    from: &Path,
    to: &Path,
    rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> io::Result<()> {
    match rename(from, to) {
        Err(err) if err.kind() == ErrorKind::CrossesDevices && from.is_file() => {
            debug!(
                "{} -> {} crosses filesystems, copying",
                from.display(),
                to.display()
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        other => other,
    }
}

/// Byte-oriented line reader that decodes each line lossily.
struct LossyLines<R> {
    reader: R,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
