use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug, PartialEq)]
/// Minimal interactive shell for basic file and directory operations.
pub struct Options {
    #[argh(option, short = 'C')]
    /// start in this directory instead of the current one
    pub directory: Option<PathBuf>,

    #[argh(option, short = 'c')]
    /// run one line and exit with the status of its last command
    pub command: Option<String>,

    #[argh(option)]
    /// file to load line history from and save it to
    pub history: Option<PathBuf>,

    #[argh(switch, short = 'v')]
    /// log debug details to stderr
    pub verbose: bool,
}

impl Options {
    /// Default log filter, overridden by `RUST_LOG`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}
