
pub type Result<T> = std::result::Result<T, Error>;
pub type UnitResult = Result<()>;

pub use std::io::Error as IoError;


/// The error taxonomy of the core read path (see the specification's error handling
/// section). Every fallible operation in this crate returns one of these variants.
#[derive(Debug)] // TODO derive Display?
pub enum Error {
    /// A requested hyperslab violates a section invariant:
    /// out of bounds, rank mismatch, or a non-positive stride.
    InvalidSection(String),

    /// A byte source ended before the enumerator's demand was met,
    /// for example a truncated DEFLATE stream or a short segment.
    Truncated(String),

    /// A compression kind outside {NONE, DEFLATE}, or a chunked structure variable.
    Unsupported(String),

    /// A cancellation token was tripped mid-read.
    Cancelled,

    /// An invariant that should never be violated on a well-formed file was violated
    /// anyway (unknown storage tag, misaligned chunk origin, ...).
    Internal(String),

    /// Propagated I/O failure from the underlying random-access file.
    Io(IoError),
}

impl Error {
    pub fn invalid_section(message: impl Into<String>) -> Self {
        Error::InvalidSection(message.into())
    }

    pub fn truncated(message: impl Into<String>) -> Self {
        Error::Truncated(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

/// Enable using the `?` operator on io::Result.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}
