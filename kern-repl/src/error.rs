use kern_core::MalformedRule;
use rustyline::error::ReadlineError;
use std::{fmt, io};

/// Utility enum to package errors that end a session.
///
/// Errors in an individual input, such as a syntax error, are reported and the session continues;
/// they never become an [`Error`].
#[derive(Debug)]
pub enum Error {
    /// The built-in rules could not be registered.
    Rules(MalformedRule),

    /// The input could not be read, or the output could not be written.
    Io(io::Error),

    /// The line editor failed.
    Readline(ReadlineError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "{}", err),
            Self::Readline(err) => write!(f, "{}", err),
        }
    }
}

impl From<MalformedRule> for Error {
    fn from(err: MalformedRule) -> Self {
        Self::Rules(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ReadlineError> for Error {
    fn from(err: ReadlineError) -> Self {
        Self::Readline(err)
    }
}
