//! Interface for writing archive files.

use core::fmt;
use std::error;
use std::io;

mod archive;
pub use archive::*;

/// The error type used within the write module.
#[derive(Debug)]
pub enum Error {
    /// A member name does not fit in the 16 byte name field.
    NameTooLong(String),
    /// A numeric value does not fit in its header field.
    FieldOverflow(&'static str),
    /// A member's data ended before the declared size was reached.
    SizeMismatch {
        /// The size declared in the member header.
        expected: u64,
        /// The number of data bytes actually copied.
        actual: u64,
    },
    /// An error from the underlying writer or the filesystem, propagated
    /// verbatim.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NameTooLong(name) => {
                write!(f, "Archive member name `{}` is longer than 16 bytes", name)
            }
            Error::FieldOverflow(field) => {
                write!(f, "Archive member {} does not fit in its header field", field)
            }
            Error::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Archive member data ended after {} of {} bytes",
                    actual, expected
                )
            }
            Error::Io(error) => error.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Error::Io(error)
    }
}

/// The result type used within the write module.
pub type Result<T> = core::result::Result<T, Error>;
