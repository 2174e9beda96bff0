use std::fmt;
use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Broad classification of an interpreter failure
///
/// Callers match on this rather than on the rendered message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Reserved for a source-text lexer; the JSON front end never produces it
    InvalidCharacter,
    InvalidSyntax,
    InvalidCalculation,
    UndefinedVariable,
    UndefinedFunction,
    ArityMismatch,
    StackOverflow,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidCharacter => "InvalidCharacter",
            ErrorKind::InvalidSyntax => "InvalidSyntax",
            ErrorKind::InvalidCalculation => "InvalidCalculation",
            ErrorKind::UndefinedVariable => "UndefinedVariable",
            ErrorKind::UndefinedFunction => "UndefinedFunction",
            ErrorKind::ArityMismatch => "ArityMismatch",
            ErrorKind::StackOverflow => "StackOverflow",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    /// Unknown when the error was found after the document was read
    pub line: Option<usize>,
}

#[derive(Debug, PartialEq, Clone, ThisError)]
#[error("{kind}: {details}{}", render_location(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub details: String,
    pub location: Option<Location>,
}

fn render_location(location: &Option<Location>) -> String {
    match location {
        Some(Location {
            file,
            line: Some(line),
        }) => format!("\nFile {}, line {}", file.display(), line),
        Some(Location { file, line: None }) => format!("\nFile {}", file.display()),
        None => String::new(),
    }
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, details: S) -> Self {
        Self {
            kind,
            details: details.into(),
            location: None,
        }
    }

    pub fn with_location<P: Into<PathBuf>>(mut self, file: P, line: Option<usize>) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
        });
        self
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Return early with an [`Error`] of the given kind
///
/// Works like `anyhow::bail!` but carries an [`ErrorKind`].
#[macro_export]
macro_rules! fail {
    ($kind:ident, $($arg:tt)+) => {
        return Err($crate::lang::error::Error::new(
            $crate::lang::error::ErrorKind::$kind,
            format!($($arg)+),
        ))
    };
}

#[test]
fn test_display() {
    let e = Error::new(ErrorKind::InvalidSyntax, "Expected program start token");
    assert_eq!(e.to_string(), "InvalidSyntax: Expected program start token");

    let e = Error::new(ErrorKind::InvalidSyntax, "EOF while parsing an object")
        .with_location("prog.json", Some(3));
    assert_eq!(
        e.to_string(),
        "InvalidSyntax: EOF while parsing an object\nFile prog.json, line 3"
    );

    let e = Error::new(ErrorKind::InvalidSyntax, "Unknown node type 'whilex'")
        .with_location("prog.json", None);
    assert_eq!(
        e.to_string(),
        "InvalidSyntax: Unknown node type 'whilex'\nFile prog.json"
    );
}

#[test]
fn test_fail_macro() {
    fn arity(expected: usize, got: usize) -> Result<()> {
        if expected != got {
            fail!(ArityMismatch, "expected {}, got {}", expected, got);
        }
        Ok(())
    }

    assert!(arity(2, 2).is_ok());
    let e = arity(2, 1).unwrap_err();
    assert_eq!(e.kind, ErrorKind::ArityMismatch);
    assert_eq!(e.details, "expected 2, got 1");
}
