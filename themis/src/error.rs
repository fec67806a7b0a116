//! Error handling.

use crate::parse::PosError as ParserError;

/// Type alias for `Result` with default `Error`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that are raised by this crate.
///
/// Semantic failure of a builtin or a proof is _not_ an error; it is an
/// empty result set. The variants here are reserved for invalid input,
/// failed dereferences and the inference fuse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The given IRI is invalid.
    #[error("The text {0} is not a valid IRI")]
    InvalidIri(String),
    /// The given prefix is invalid.
    #[error("The text {0} is not a valid Prefix")]
    InvalidPrefix(String),
    /// Error from parsing.
    #[error("Parser: {0}")]
    Parser(String),
    /// A dereferencer could not resolve an IRI.
    #[error("Dereference of <{0}> failed: {1}")]
    Deref(String, String),
    /// An inference fuse (`{{…}} => false`) fired. Carries the diagnostic
    /// built from the fuse rule's instantiated premise.
    #[error("** inference fuse **\n{0}")]
    Fuse(String),
}

impl Error {
    /// The process exit code a front-end should terminate with.
    ///
    /// A fired inference fuse terminates with 2, every other error with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Fuse(_) => 2,
            _ => 1,
        }
    }
}

impl<'a> From<ParserError<'a>> for Error {
    /// Clones the parser error's context. Removes the lifetime in turn.
    fn from(pe: ParserError<'a>) -> Self {
        Error::Parser(pe.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fuse_exits_with_2() {
        assert_eq!(Error::Fuse("boom".into()).exit_code(), 2);
        assert_eq!(Error::InvalidIri("x".into()).exit_code(), 1);
    }
}
