//! Severity-tagged status lines.
//!
//! Every line starts with `[ok]`, `[hint]`, `[warn]`, or `[error]` so output
//! can be filtered with grep. Errors go to stderr, everything else to stdout.

use std::fmt;

/// Status line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A step completed.
    Ok,
    /// Something the user may want to act on.
    Hint,
    /// A non-fatal problem.
    Warn,
    /// A fatal problem.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Ok => "ok",
            Self::Hint => "hint",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        write!(f, "[{tag}]")
    }
}

/// Formats one status line.
#[must_use]
pub fn status_line(severity: Severity, message: &str) -> String {
    format!("{severity} {message}")
}

#[allow(clippy::print_stdout)]
fn emit(severity: Severity, message: &str) {
    println!("{}", status_line(severity, message));
}

/// Prints an `[ok]` line.
pub fn ok(message: &str) {
    emit(Severity::Ok, message);
}

/// Prints a `[hint]` line.
pub fn hint(message: &str) {
    emit(Severity::Hint, message);
}

/// Prints a `[warn]` line.
pub fn warn(message: &str) {
    emit(Severity::Warn, message);
}

/// Prints an `[error]` line to stderr.
#[allow(clippy::print_stderr)]
pub fn error(message: &str) {
    eprintln!("{}", status_line(Severity::Error, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_prefixes_severity() {
        assert_eq!(status_line(Severity::Ok, "done"), "[ok] done");
        assert_eq!(status_line(Severity::Hint, "look"), "[hint] look");
        assert_eq!(status_line(Severity::Warn, "careful"), "[warn] careful");
        assert_eq!(status_line(Severity::Error, "boom"), "[error] boom");
    }
}
