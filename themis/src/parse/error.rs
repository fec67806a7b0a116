//! Custom errors for parsing N3.

use nom::error::{ErrorKind, ParseError};
use nom::{Err as NErr, IResult};
use std::fmt;

/// Maximal length of context given for errors.
pub const MAX_CTX_LEN: usize = 48;

/// Errors raised at parsing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The prefix of a prefixed name is not declared.
    #[error("The prefix {0} is not declared")]
    UnknownPrefix(String),
    /// The text is not a valid prefix.
    #[error("The text {0} is not a valid Prefix")]
    InvalidPrefix(String),
    /// The text is not a valid IRI.
    #[error("The text {0} is not a valid IRI")]
    InvalidIri(String),
    /// Error from a `nom` parser.
    #[error("Parser failed: {0:?}")]
    Kind(ErrorKind),
    /// Returned if no valid rule matches.
    #[error("No parser rule matched")]
    NoMatch,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<crate::error::Error> for Error {
    fn from(err: crate::error::Error) -> Self {
        match err {
            crate::error::Error::InvalidPrefix(p) => Error::InvalidPrefix(p),
            crate::error::Error::InvalidIri(iri) => Error::InvalidIri(iri),
            _ => Error::Kind(ErrorKind::Verify),
        }
    }
}

/// An error with information where it occurred.
#[derive(Debug)]
pub struct PosError<'a>(&'a str, Error);

impl<'a> std::error::Error for PosError<'a> {}

impl<'a> PosError<'a> {
    /// Wraps an error with the input it occurred at.
    pub fn new(i: &'a str, err: impl Into<Error>) -> Self {
        PosError(i, err.into())
    }
    /// A recoverable `nom` error at the given input.
    pub fn err(i: &'a str, err: impl Into<Error>) -> NErr<Self> {
        NErr::Error(Self::new(i, err))
    }
    /// A fatal `nom` failure at the given input.
    pub fn failed(i: &'a str, err: impl Into<Error>) -> NErr<Self> {
        NErr::Failure(Self::new(i, err))
    }
}

impl<'a> fmt::Display for PosError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error at: ")?;
        if self.0.len() > MAX_CTX_LEN {
            let cut = self
                .0
                .char_indices()
                .take_while(|(idx, _)| *idx <= MAX_CTX_LEN)
                .last()
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            write!(f, "{}...", &self.0[..cut])
        } else {
            write!(f, "{}", self.0)
        }?;
        write!(f, " => {}", self.1)
    }
}

impl<'a> ParseError<&'a str> for PosError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        PosError(input, kind.into())
    }
    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> From<(&'a str, ErrorKind)> for PosError<'a> {
    /// This allows to use `?` on `IResult` in functions returning `PResult`.
    fn from((i, kind): (&'a str, ErrorKind)) -> Self {
        Self::new(i, kind)
    }
}

/// Parser result using own error type.
pub type PResult<'a, O> = IResult<&'a str, O, PosError<'a>>;

/// Extension trait for `IResult`.
pub trait MapPR<'a, O> {
    /// Lifts the default `nom` error into a [`PosError`](struct.PosError.html).
    fn map_pr(self) -> PResult<'a, O>;
}

impl<'a, O> MapPR<'a, O> for IResult<&'a str, O> {
    fn map_pr(self) -> PResult<'a, O> {
        self.map_err(|nerr| match nerr {
            NErr::Error((i, kind)) => NErr::Error(PosError::from_error_kind(i, kind)),
            NErr::Failure((i, kind)) => NErr::Failure(PosError::from_error_kind(i, kind)),
            _ => unimplemented!(),
        })
    }
}

/// Extension trait for `std::result::Result`.
pub trait IntoPR<'a, O> {
    /// Build a `PResult` with a given context.
    fn into_pr(self, before: &'a str, after: &'a str) -> PResult<'a, O>;
}

impl<'a, T, E> IntoPR<'a, T> for Result<T, E>
where
    E: Into<Error>,
{
    /// This implementation returns in the error-case a `nom::Err::Failure(_)`
    /// as validation usually means an invalid document.
    fn into_pr(self, before: &'a str, after: &'a str) -> PResult<'a, T> {
        self.map(|t| (after, t))
            .map_err(|err| PosError::failed(before, err))
    }
}

/// Extension trait for `Option`.
pub trait OrIntoPR<'a, O> {
    /// Build a `PResult` with a given context.
    fn or_into_pr(self, before: &'a str, err: Error, after: &'a str) -> PResult<'a, O>;
}

impl<'a, T> OrIntoPR<'a, T> for Option<T> {
    /// This implementation returns in the error-case a `nom::Err::Failure(_)`
    /// as validation usually means an invalid document.
    fn or_into_pr(self, before: &'a str, err: Error, after: &'a str) -> PResult<'a, T> {
        self.map(|t| (after, t))
            .ok_or_else(|| PosError::failed(before, err))
    }
}
