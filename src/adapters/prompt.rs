use crate::domain::ports::TruncateDecider;
use std::io::{self, BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};

pub const TRUNCATE_QUESTION: &str =
    "Table is currently filled would you like to run the truncate command";

/// 表格已有資料時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncatePolicy {
    /// `--force`
    Always,
    /// `--no-interaction`
    Never,
    /// Ask on stdin.
    Prompt,
}

impl TruncatePolicy {
    pub fn from_flags(force: bool, no_interaction: bool) -> Self {
        if force {
            TruncatePolicy::Always
        } else if no_interaction {
            TruncatePolicy::Never
        } else {
            TruncatePolicy::Prompt
        }
    }
}

impl TruncateDecider for TruncatePolicy {
    fn confirm_truncate(&self, existing_rows: u64) -> bool {
        match self {
            TruncatePolicy::Always => true,
            TruncatePolicy::Never => false,
            TruncatePolicy::Prompt => blocking_io(|| {
                let stdin = io::stdin();
                let stdout = io::stdout();
                confirm(
                    &format!("{} ({} rows)?", TRUNCATE_QUESTION, existing_rows),
                    &mut stdin.lock(),
                    &mut stdout.lock(),
                )
            })
            .unwrap_or_else(|e| {
                tracing::warn!("Could not read an answer, treating it as 'no': {}", e);
                false
            }),
        }
    }
}

/// Runs a blocking terminal read. On a multi-threaded tokio runtime the worker
/// is handed over with `block_in_place`; elsewhere `f` runs directly.
pub fn blocking_io<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// Writes `question [y/N] ` and reads one line; only `y`/`yes` confirm.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Writes `question: ` and returns the trimmed line.
pub fn ask<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<String> {
    write!(output, "{}: ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_confirm_accepts_yes_variants() {
        for answer in ["y\n", "yes\n", "YES\n", "  Y  \n"] {
            let mut input = Cursor::new(answer.as_bytes());
            let mut output = Vec::new();
            assert!(confirm("Truncate?", &mut input, &mut output).unwrap(), "{:?}", answer);
        }
    }

    #[test]
    fn test_confirm_defaults_to_no() {
        for answer in ["\n", "n\n", "no\n", "maybe\n", ""] {
            let mut input = Cursor::new(answer.as_bytes());
            let mut output = Vec::new();
            assert!(!confirm("Truncate?", &mut input, &mut output).unwrap(), "{:?}", answer);
        }
    }

    #[test]
    fn test_confirm_writes_question() {
        let mut input = Cursor::new("y\n".as_bytes());
        let mut output = Vec::new();
        confirm(TRUNCATE_QUESTION, &mut input, &mut output).unwrap();
        let written = String::from_utf8(output).unwrap();
        assert!(written.starts_with(TRUNCATE_QUESTION));
        assert!(written.ends_with("[y/N] "));
    }

    #[test]
    fn test_ask_trims_answer() {
        let mut input = Cursor::new(" 2015 \n".as_bytes());
        let mut output = Vec::new();
        let answer = ask("Please enter a starting year", &mut input, &mut output).unwrap();
        assert_eq!(answer, "2015");
        assert_eq!(String::from_utf8(output).unwrap(), "Please enter a starting year: ");
    }

    #[test]
    fn test_policy_from_flags() {
        assert_eq!(TruncatePolicy::from_flags(true, false), TruncatePolicy::Always);
        assert_eq!(TruncatePolicy::from_flags(false, true), TruncatePolicy::Never);
        assert_eq!(TruncatePolicy::from_flags(false, false), TruncatePolicy::Prompt);
        assert!(TruncatePolicy::Always.confirm_truncate(10));
        assert!(!TruncatePolicy::Never.confirm_truncate(10));
    }

    #[test]
    fn test_blocking_io_outside_runtime() {
        assert_eq!(blocking_io(|| 7), 7);
    }

    #[tokio::test]
    async fn test_blocking_io_on_current_thread_runtime() {
        let mut input = Cursor::new("yes\n".as_bytes());
        let mut output = Vec::new();
        assert!(blocking_io(|| confirm("Truncate?", &mut input, &mut output)).unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_io_on_multi_thread_runtime() {
        let mut input = Cursor::new("n\n".as_bytes());
        let mut output = Vec::new();
        assert!(!blocking_io(|| confirm("Truncate?", &mut input, &mut output)).unwrap());
        assert_eq!(String::from_utf8(output).unwrap(), "Truncate? [y/N] ");
    }
}
