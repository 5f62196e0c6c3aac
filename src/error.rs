use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// Operand dimensions are incompatible for the requested operation.
    ShapeMismatch(String),
    /// Input outside the domain of a numeric function (e.g. `ln` of a non-positive value).
    Domain(String),
    /// Row access or slicing beyond the bounds of a matrix.
    IndexOutOfRange(String),
    /// A matrix that cannot exist: zero rows/cols or ragged rows.
    InvalidShape(String),
    InvalidConfig(String),
    InvalidData(String),
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            Error::Domain(msg) => write!(f, "domain error: {msg}"),
            Error::IndexOutOfRange(msg) => write!(f, "index out of range: {msg}"),
            Error::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
