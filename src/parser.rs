//! Turns one raw input line into parsed commands, without touching the filesystem.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! line     := segment ('|' segment)*
//! segment  := WS* command (WS+ arg)* WS*
//! arg      := redirect | flag | positional
//! redirect := '>' WS+ filename | '>>' WS+ filename
//! ```
//!
//! There is no quoting, escaping or expansion. A `|` always separates
//! segments and a space always separates tokens, so file names and messages
//! containing either cannot be expressed.
use crate::error::ShellError;

/// Where a command's textual output goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Redirection {
    /// Print to the console.
    #[default]
    None,
    /// `> file`: truncate (or create) the file and write to it.
    Overwrite(String),
    /// `>> file`: append to (or create) the file.
    Append(String),
}

/// A single command invocation, ready to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    /// Arguments with the redirection operator and everything after it removed.
    pub args: Vec<String>,
    pub redirection: Redirection,
}

/// Split a raw line into pipeline segments on every `|`.
///
/// Segments are returned untrimmed, empty ones included.
pub fn split_pipeline(line: &str) -> Vec<&str> {
    line.split('|').collect()
}

/// Parse one segment.
///
/// Returns `Ok(None)` for a segment that holds only whitespace.
pub fn parse_segment(segment: &str) -> Result<Option<ParsedCommand>, ShellError> {
    let mut tokens = segment
        .trim()
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let mut args: Vec<String> = tokens.collect();
    let redirection = extract_redirection(&mut args)?;

    Ok(Some(ParsedCommand {
        name,
        args,
        redirection,
    }))
}

/// Parse every segment of a line.
///
/// Each segment succeeds or fails on its own so one bad segment never hides
/// the others. Blank segments are dropped.
pub fn parse_line(line: &str) -> Vec<Result<ParsedCommand, ShellError>> {
    split_pipeline(line)
        .into_iter()
        .filter_map(|segment| parse_segment(segment).transpose())
        .collect()
}

/// Checked in this order.
const REDIRECT_OPERATORS: [(&str, fn(String) -> Redirection); 2] = [
    (">", Redirection::Overwrite),
    (">>", Redirection::Append),
];

/// Pull the redirection out of `args`, truncating them at the operator.
///
/// A bare `>` anywhere wins over `>>`, even when `>>` comes first; only the
/// winning operator truncates the list.
fn extract_redirection(args: &mut Vec<String>) -> Result<Redirection, ShellError> {
    for (op, make) in REDIRECT_OPERATORS {
        if let Some(index) = args.iter().position(|arg| arg == op) {
            let target = args
                .get(index + 1)
                .cloned()
                .ok_or(ShellError::MissingRedirectTarget(op))?;
            args.truncate(index);
            return Ok(make(target));
        }
    }
    Ok(Redirection::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(segment: &str) -> ParsedCommand {
        parse_segment(segment).unwrap().unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_pipeline_keeps_every_segment() {
        assert_eq!(split_pipeline("foo | pwd"), vec!["foo ", " pwd"]);
        assert_eq!(split_pipeline("a||b"), vec!["a", "", "b"]);
        assert_eq!(split_pipeline("ls"), vec!["ls"]);
    }

    #[test]
    fn test_segment_name_and_args() {
        let cmd = parse_one("  mv  a.txt   b/ ");
        assert_eq!(cmd.name, "mv");
        assert_eq!(cmd.args, strings(&["a.txt", "b/"]));
        assert_eq!(cmd.redirection, Redirection::None);
    }

    #[test]
    fn test_blank_segment_is_none() {
        assert!(parse_segment("   ").unwrap().is_none());
        assert!(parse_segment("").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_redirection_truncates_args() {
        let cmd = parse_one("echo hello > out.txt trailing");
        assert_eq!(cmd.args, strings(&["hello"]));
        assert_eq!(cmd.redirection, Redirection::Overwrite("out.txt".into()));
    }

    #[test]
    fn test_append_redirection() {
        let cmd = parse_one("ls -a >> listing.txt");
        assert_eq!(cmd.args, strings(&["-a"]));
        assert_eq!(cmd.redirection, Redirection::Append("listing.txt".into()));
    }

    #[test]
    fn test_overwrite_wins_over_append_regardless_of_position() {
        let cmd = parse_one("echo a >> first.txt > second.txt");
        assert_eq!(cmd.args, strings(&["a", ">>", "first.txt"]));
        assert_eq!(cmd.redirection, Redirection::Overwrite("second.txt".into()));
    }

    #[test]
    fn test_operator_glued_to_word_is_not_a_redirection() {
        let cmd = parse_one("echo a>b");
        assert_eq!(cmd.args, strings(&["a>b"]));
        assert_eq!(cmd.redirection, Redirection::None);
    }

    #[test]
    fn test_missing_redirect_target_is_an_error() {
        let err = parse_segment("echo hi >").unwrap_err();
        assert!(matches!(err, ShellError::MissingRedirectTarget(">")));

        let err = parse_segment("cat a.txt >>").unwrap_err();
        assert!(matches!(err, ShellError::MissingRedirectTarget(">>")));
    }

    #[test]
    fn test_parse_line_isolates_failing_segments() {
        let parsed = parse_line("echo x > | pwd |  | ls -r");
        assert_eq!(parsed.len(), 3);
        assert!(parsed[0].is_err());
        assert_eq!(parsed[1].as_ref().unwrap().name, "pwd");
        assert_eq!(parsed[2].as_ref().unwrap().args, strings(&["-r"]));
    }

    #[test]
    fn test_parse_line_blank_is_empty() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("   ").is_empty());
    }
}
