//! Error type shared by the representation engine.
use std::{io, result};
use std::path::PathBuf;

/// Coarse classification of an [`Error`](enum.Error.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A quantity was not of the required kind (e.g. not an integer).
    Type,
    /// A quantity was of the right kind but out of range.
    Value,
    /// Stored data could not be read or parsed.
    Data,
    /// A numerical procedure failed or produced non-finite values.
    Numeric,
    /// A configuration document was invalid.
    Config,
}

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Type { name: String, value: String } {
            display("{} must be an integer (got {})", name, value)
        }
        Value { name: String, value: String, reason: &'static str } {
            display("invalid {} = {}: {}", name, value, reason)
        }
        Io { path: PathBuf, err: io::Error } {
            display("{}: {}", path.display(), err)
            source(err)
        }
        Parse { path: PathBuf, line: usize, msg: String } {
            display("{}:{}: {}", path.display(), line, msg)
        }
        Numeric(msg: String) {
            display("numerical failure: {}", msg)
        }
        Config(msg: String) {
            display("invalid configuration: {}", msg)
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::Type { .. } => ErrorKind::Type,
            Error::Value { .. } => ErrorKind::Value,
            Error::Io { .. } | Error::Parse { .. } => ErrorKind::Data,
            Error::Numeric(_) => ErrorKind::Numeric,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for constructing a `Value` error.
    pub fn value<T: ToString>(
        name: &str,
        value: T,
        reason: &'static str,
    ) -> Self {
        Error::Value {
            name: name.to_owned(),
            value: value.to_string(),
            reason,
        }
    }

    pub fn numeric<T: Into<String>>(msg: T) -> Self {
        Error::Numeric(msg.into())
    }
}

pub type Result<T> = result::Result<T, Error>;
