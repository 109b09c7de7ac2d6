//! Definition of errors.

use std::error::Error;
use std::fmt;

use crate::ngram::TagId;

pub type Result<T, E = TritagError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum TritagError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    InvalidCorpus(InvalidCorpusError),
    UnknownTag(UnknownTagError),
    Untaggable(UntaggableError),
    ParseIntError(std::num::ParseIntError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl TritagError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_corpus<S>(line: usize, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidCorpus(InvalidCorpusError {
            line,
            msg: msg.into(),
        })
    }

    pub(crate) const fn unknown_tag(tag: TagId) -> Self {
        Self::UnknownTag(UnknownTagError { tag })
    }

    pub(crate) fn untaggable<S>(position: usize, token: S) -> Self
    where
        S: Into<String>,
    {
        Self::Untaggable(UntaggableError {
            position,
            token: token.into(),
        })
    }

    /// Returns `true` if the error only concerns the sentence that was being tagged.
    pub const fn is_untaggable(&self) -> bool {
        matches!(self, Self::Untaggable(_))
    }
}

impl fmt::Display for TritagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidCorpus(e) => e.fmt(f),
            Self::UnknownTag(e) => e.fmt(f),
            Self::Untaggable(e) => e.fmt(f),
            Self::ParseIntError(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for TritagError {}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a corpus record cannot be parsed.
#[derive(Debug)]
pub struct InvalidCorpusError {
    /// Line number, starting from 1.
    pub(crate) line: usize,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidCorpusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidCorpusError: line {}: {}", self.line, self.msg)
    }
}

impl Error for InvalidCorpusError {}

/// Error used when the language model is asked about a tag that it has never seen.
///
/// This only happens with a corrupted model, or when the tables of two different models are
/// mixed up.
#[derive(Debug)]
pub struct UnknownTagError {
    /// The offending tag.
    pub(crate) tag: TagId,
}

impl UnknownTagError {
    /// Gets the offending tag.
    pub const fn tag(&self) -> TagId {
        self.tag
    }
}

impl fmt::Display for UnknownTagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "UnknownTagError: tag {} has no unigram frequency in the model",
            self.tag
        )
    }
}

impl Error for UnknownTagError {}

/// Error used when no tag sequence can be assigned to a sentence.
#[derive(Debug)]
pub struct UntaggableError {
    /// Position of the token that has no candidate tags, starting from 0.
    pub(crate) position: usize,

    /// The token.
    pub(crate) token: String,
}

impl UntaggableError {
    /// Gets the position of the token.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Gets the token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for UntaggableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "UntaggableError: no candidate tags for token {:?} at position {}",
            self.token, self.position
        )
    }
}

impl Error for UntaggableError {}

impl From<std::num::ParseIntError> for TritagError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseIntError(error)
    }
}

impl From<bincode::error::DecodeError> for TritagError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for TritagError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for TritagError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parse_int_error() {
        let e: TritagError = "x".parse::<u32>().unwrap_err().into();
        assert!(matches!(e, TritagError::ParseIntError(_)));
    }

    #[test]
    fn test_from_io_error() {
        let e: TritagError = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad").into();
        assert!(matches!(e, TritagError::IOError(_)));
        assert_eq!("bad", e.to_string());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "InvalidCorpusError: line 3: tag is missing",
            TritagError::invalid_corpus(3, "tag is missing").to_string()
        );
        assert_eq!(
            "UntaggableError: no candidate tags for token \"xyz\" at position 1",
            TritagError::untaggable(1, "xyz").to_string()
        );
        assert!(TritagError::untaggable(0, "a").is_untaggable());
        assert!(!TritagError::unknown_tag(0).is_untaggable());
    }
}
