use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CndError {
    #[error("io error in stream '{stream}': {source}")]
    Io {
        stream: String,
        #[source]
        source: io::Error,
    },
    #[error("short read from stream '{stream}': wanted {expected} bytes, got {actual}")]
    ShortRead {
        stream: String,
        expected: u64,
        actual: u64,
    },
    #[error("short write to stream '{stream}': wanted {expected} bytes, wrote {actual}")]
    ShortWrite {
        stream: String,
        expected: u64,
        actual: u64,
    },
    #[error("{function}: {message}")]
    Format {
        function: &'static str,
        message: String,
    },
    #[error("{function}: {message}")]
    Codec {
        function: &'static str,
        message: String,
    },
    #[error("{function}: {message}")]
    Logic {
        function: &'static str,
        message: String,
    },
    #[error("{function}: range [{offset}, {offset}+{len}) is out of bounds for size {size}")]
    Range {
        function: &'static str,
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error(transparent)]
    String(#[from] StringError),
    #[error("{function}: error in section '{section}'")]
    Section {
        function: &'static str,
        section: &'static str,
        #[source]
        source: Box<CndError>,
    },
}

impl CndError {
    pub(crate) fn format(function: &'static str, message: impl Into<String>) -> Self {
        CndError::Format {
            function,
            message: message.into(),
        }
    }

    pub(crate) fn codec(function: &'static str, message: impl Into<String>) -> Self {
        CndError::Codec {
            function,
            message: message.into(),
        }
    }

    pub(crate) fn logic(function: &'static str, message: impl Into<String>) -> Self {
        CndError::Logic {
            function,
            message: message.into(),
        }
    }

    /// Wraps an error with the section parser/writer it surfaced in, keeping the cause chain.
    pub(crate) fn in_section(self, function: &'static str, section: &'static str) -> Self {
        CndError::Section {
            function,
            section,
            source: Box::new(self),
        }
    }

    /// The name of the function the error originated in, if it carries one.
    pub fn function(&self) -> Option<&'static str> {
        match self {
            CndError::Format { function, .. }
            | CndError::Codec { function, .. }
            | CndError::Logic { function, .. }
            | CndError::Range { function, .. }
            | CndError::Section { function, .. } => Some(function),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StringError {
    #[error(transparent)]
    NonUtf8(#[from] std::str::Utf8Error),
    #[error("string of {len} bytes does not fit a {capacity} byte field")]
    TooLong { len: usize, capacity: usize },
}

impl From<FromUtf8Error> for CndError {
    fn from(value: FromUtf8Error) -> Self {
        StringError::NonUtf8(value.utf8_error()).into()
    }
}

pub type Result<T> = std::result::Result<T, CndError>;
