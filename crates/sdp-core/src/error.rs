//! Error handling for SDP parsing and munging
//!
//! Structural parse failures are hard errors. Unrecognised content is never an
//! error: it lands in the opaque bucket of the scope it was found in.

use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the SDP core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input contained no non-empty lines
    #[error("Invalid empty SDP")]
    EmptyDocument,

    /// A line is shorter than two characters or has no `=` at index 1
    #[error("Invalid SDP line {line_number}: {line:?}")]
    MalformedLine { line_number: usize, line: String },

    /// A line has the right shape but lacks a field the munging pass needs
    #[error("Missing {field} on SDP line {line_number}")]
    MissingField { line_number: usize, field: &'static str },

    /// Bitrate lookup for a codec that has no table
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    /// Envelope type string that is not offer/answer/pranswer
    #[error("Invalid SDP type: {0}")]
    InvalidSdpType(String),

    /// Munging configuration could not be loaded
    #[error("Invalid munging configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a new malformed line error
    pub fn malformed_line(line_number: usize, line: impl Into<String>) -> Self {
        Self::MalformedLine {
            line_number,
            line: line.into(),
        }
    }

    /// Create a new missing field error
    pub fn missing_field(line_number: usize, field: &'static str) -> Self {
        Self::MissingField { line_number, field }
    }

    /// Whether the error comes from the shape of the SDP text itself
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::EmptyDocument | Self::MalformedLine { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
