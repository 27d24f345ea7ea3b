//
// Errors
//
use std::error;
use std::fmt;
use std::io;
use std::result;

/// Type alias for vertical errors
pub type Result<X> = result::Result<X, Error>;

/// Wrapper for many kinds of errors occuring while reading or searching a vertical
#[derive(Debug)]
pub enum Error {
    Format(FormatError),
    Domain(String),
    Query(String),
    IOError(io::Error),
    Other(String),
}

/// A line of the vertical that can't be trusted. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number
    pub line: u64,
    /// The offending line, without its line terminator
    pub content: String,
    pub kind: FormatErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    MalformedTag,
    MalformedAttributes,
    /// Closing tag found `found` but the innermost open structure was `expected`
    UnbalancedClose { expected: Option<String>, found: String },
    /// Input ended while this structure was still open
    UnclosedStructure(String),
    FieldCount { expected: usize, found: usize },
    UnknownStructure(String),
    FieldValue { field: String, reason: String },
    ZipMismatch { expected: String, found: String, input: usize },
}

impl FormatError {
    pub fn new<S: Into<String>>(line: u64, content: S, kind: FormatErrorKind) -> Self {
        FormatError {
            line,
            content: content.into(),
            kind,
        }
    }
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FormatErrorKind::MalformedTag => write!(f, "malformed structure tag"),
            FormatErrorKind::MalformedAttributes => {
                write!(f, "malformed attributes, expected key=\"value\" pairs")
            }
            FormatErrorKind::UnbalancedClose {
                expected: Some(ref open),
                ref found,
            } => write!(f, "closing </{}> but the innermost open structure is <{}>", found, open),
            FormatErrorKind::UnbalancedClose {
                expected: None,
                ref found,
            } => write!(f, "closing </{}> but no structure is open", found),
            FormatErrorKind::UnclosedStructure(ref name) => {
                write!(f, "<{}> opened here was never closed", name)
            }
            FormatErrorKind::FieldCount { expected, found } => {
                write!(f, "expected {} tab-separated fields, found {}", expected, found)
            }
            FormatErrorKind::UnknownStructure(ref name) => {
                write!(f, "<{}> is not a structure of this corpus", name)
            }
            FormatErrorKind::FieldValue {
                ref field,
                ref reason,
            } => write!(f, "can't parse field {:?}: {}", field, reason),
            FormatErrorKind::ZipMismatch {
                ref expected,
                ref found,
                input,
            } => write!(
                f,
                "expected first attribute {:?} but got {:?} in vertical #{}. \
                 Are you sure the verticals represent the same corpus?",
                expected, found, input
            ),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {} in {:?}", self.line, self.kind, self.content)
    }
}

impl error::Error for FormatError {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Format(ref err) => write!(f, "Vertical format error: {}", err),
            Error::Domain(ref info) => write!(f, "Domain error: {}", info),
            Error::Query(ref info) => write!(f, "Query error: {}", info),
            Error::IOError(ref err) => write!(f, "IO error: {}", err),
            Error::Other(ref info) => write!(f, "{}", info),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Format(ref err) => Some(err),
            Error::IOError(ref err) => Some(err),
            Error::Domain(_) | Error::Query(_) | Error::Other(_) => None,
        }
    }
}

impl Error {
    /// The format error behind this error, if that's what it is
    pub fn format(&self) -> Option<&FormatError> {
        match *self {
            Error::Format(ref err) => Some(err),
            _ => None,
        }
    }
}

//
// Convert everything else into Error
//
impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}
impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Query(err.to_string())
    }
}

//
// Convert Error into a general io Error
//
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::IOError(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
