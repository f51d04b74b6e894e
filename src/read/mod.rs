//! Interface for reading archive files.

use core::fmt;
use std::error;
use std::io;

mod archive;
pub use archive::*;

/// The error type used within the read module.
#[derive(Debug)]
pub enum Error {
    /// The stream violates the archive format, such as bad magic bytes or
    /// a malformed member header.
    ///
    /// Decoding cannot continue past this point because the offset of the
    /// next member is unknown.
    Format(&'static str),
    /// An error from the underlying stream, propagated verbatim.
    Io(io::Error),
}

impl Clone for Error {
    fn clone(&self) -> Self {
        // `io::Error` is not `Clone`; preserve the kind and message so
        // that a terminal error can be returned again on later calls.
        match self {
            Error::Format(error) => Error::Format(error),
            Error::Io(error) => Error::Io(io::Error::new(error.kind(), error.to_string())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(error) => f.write_str(error),
            Error::Io(error) => error.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Format(_) => None,
            Error::Io(error) => Some(error),
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Error::Io(error)
    }
}

/// The result type used within the read module.
pub type Result<T> = core::result::Result<T, Error>;

pub(crate) trait ReadError<T> {
    fn read_error(self, error: &'static str) -> Result<T>;
}

impl<T> ReadError<T> for Option<T> {
    fn read_error(self, error: &'static str) -> Result<T> {
        self.ok_or(Error::Format(error))
    }
}
