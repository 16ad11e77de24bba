use core::fmt;

/// Errors surfaced by metric evaluation, index construction, queries and
/// artifact loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two point sequences of different lengths were compared, or a query's
    /// length differs from the reference set's fixed sequence length.
    LengthMismatch { expected: usize, actual: usize },
    /// A point sequence whose length is odd or zero.
    InvalidSequenceLength(usize),
    /// The reference set is empty.
    EmptyInput,
    /// Leaf capacity must be at least 1.
    InvalidLeafCapacity,
    /// `k` must be at least 1.
    InvalidK,
    /// A persisted index failed structural validation and cannot be served.
    MalformedArtifact(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "point sequence length mismatch: expected {expected}, got {actual}"
                )
            }
            Error::InvalidSequenceLength(len) => {
                write!(f, "point sequence length {len} must be even and non-zero")
            }
            Error::EmptyInput => write!(f, "reference set cannot be empty"),
            Error::InvalidLeafCapacity => write!(f, "leaf capacity must be greater than 0"),
            Error::InvalidK => write!(f, "k must be greater than 0"),
            Error::MalformedArtifact(reason) => write!(f, "malformed artifact: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
