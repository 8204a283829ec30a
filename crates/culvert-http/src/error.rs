//! Error types for the protocol engine.
//!
//! Every failure surfaces as a typed value; the engine never panics on
//! wire input. Parse errors are terminal for the connection that raised
//! them.

use culvert_core::StatusCode;
use std::fmt;

/// A violation of the HTTP/1.x wire grammar or of a configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A header or start line exceeded `max_line_length`.
    LineTooLong,
    /// A bare LF (or stray CR) where CRLF was required.
    InvalidCrlf,
    /// More consecutive whitespace than `max_whitespace` allows.
    WhitespaceTooLong,
    /// The request or status line does not match its grammar.
    MalformedStartLine,
    /// A header field line does not match its grammar, or carries an
    /// unusable Content-Length.
    MalformedHeader,
    /// More distinct header fields than `max_header_number`.
    TooManyHeaders,
    /// Cumulative header bytes exceeded `max_header_length`.
    HeadersTooLarge,
    /// A chunk header that is not valid hex framing.
    InvalidChunkSize,
    /// Body bytes (sized, chunked, or a single chunk) exceeded a limit.
    BodyTooLarge,
    /// An encoder was handed a header whose serialized form would embed
    /// a CR or LF.
    SplitHeadersRejected,
    /// An HTTP version outside the accepted major/minor range.
    UnsupportedVersion,
}

impl ParseError {
    /// The response status a server would send for this error.
    ///
    /// Limit violations map onto their specific 4xx/5xx codes; plain
    /// grammar violations are a generic 400.
    #[must_use]
    pub fn suggested_status(self) -> StatusCode {
        match self {
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::TooManyHeaders | Self::HeadersTooLarge | Self::LineTooLong => {
                StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE
            }
            Self::UnsupportedVersion => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            Self::InvalidCrlf
            | Self::WhitespaceTooLong
            | Self::MalformedStartLine
            | Self::MalformedHeader
            | Self::InvalidChunkSize
            | Self::SplitHeadersRejected => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineTooLong => write!(f, "line too long"),
            Self::InvalidCrlf => write!(f, "invalid line terminator"),
            Self::WhitespaceTooLong => write!(f, "too much consecutive whitespace"),
            Self::MalformedStartLine => write!(f, "malformed start line"),
            Self::MalformedHeader => write!(f, "malformed header field"),
            Self::TooManyHeaders => write!(f, "too many header fields"),
            Self::HeadersTooLarge => write!(f, "header block too large"),
            Self::InvalidChunkSize => write!(f, "invalid chunk size"),
            Self::BodyTooLarge => write!(f, "body too large"),
            Self::SplitHeadersRejected => write!(f, "header value would split the message"),
            Self::UnsupportedVersion => write!(f, "unsupported HTTP version"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A well-formed message that violates protocol policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// An HTTP/1.1 request without a `Host` header while the connection
    /// requires one.
    MissingHost,
    /// `continue_response` was invoked with no 100-continue gate open.
    ExpectContinueConflict,
}

impl ProtocolError {
    /// The response status a server would send for this violation.
    #[must_use]
    pub fn suggested_status(self) -> StatusCode {
        match self {
            Self::MissingHost => StatusCode::BAD_REQUEST,
            Self::ExpectContinueConflict => StatusCode::EXPECTATION_FAILED,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHost => write!(f, "HTTP/1.1 request without Host header"),
            Self::ExpectContinueConflict => write!(f, "no 100-continue expectation is pending"),
        }
    }
}

impl std::error::Error for ProtocolError {}
