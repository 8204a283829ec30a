//! Message encoders.
//!
//! [`RequestEncoder`] and [`ResponseEncoder`] build a start line and a
//! header block; [`ChunkEncoder`] frames chunked bodies. Header names
//! and values go out with the case the caller supplied. Any value that
//! would embed a CR or LF is rejected when it is added, so encoder
//! output can never split into a second message.

use std::time::SystemTime;

use culvert_core::{Headers, HttpVersion, Method, StatusCode};

use crate::chars::is_token_char;
use crate::error::ParseError;

/// Validate a header for transmission.
///
/// Names must be non-empty tokens; values must be CR/LF-free.
fn check_header(name: &str, value: &str) -> Result<(), ParseError> {
    if name.is_empty() || !name.bytes().all(is_token_char) {
        return Err(ParseError::MalformedHeader);
    }
    if value.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(ParseError::SplitHeadersRejected);
    }
    Ok(())
}

fn write_field(out: &mut Vec<u8>, name: &str, value: &str) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn has_field(fields: &[(String, String)], name: &str) -> bool {
    fields.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}

// ============================================================================
// Request encoder
// ============================================================================

/// Builder for an outgoing HTTP request.
///
/// The target is taken as raw bytes and emitted verbatim.
#[derive(Debug)]
pub struct RequestEncoder {
    method: Method,
    target: Vec<u8>,
    version: HttpVersion,
    fields: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    chunked: bool,
}

impl RequestEncoder {
    /// Start a request with the default HTTP/1.1 version.
    #[must_use]
    pub fn new(method: Method, target: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            target: target.into(),
            version: HttpVersion::default(),
            fields: Vec::new(),
            body: None,
            chunked: false,
        }
    }

    /// Override the HTTP version.
    #[must_use]
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Add a header field, sent with the given case.
    ///
    /// # Errors
    ///
    /// [`ParseError::SplitHeadersRejected`] if the value contains CR or
    /// LF; [`ParseError::MalformedHeader`] if the name is not a token.
    pub fn add_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParseError> {
        let (name, value) = (name.into(), value.into());
        check_header(&name, &value)?;
        self.fields.push((name, value));
        Ok(())
    }

    /// Attach a sized body; `Content-Length` is emitted automatically.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = Some(body.into());
        self.chunked = false;
    }

    /// Switch to chunked framing; the body is sent afterwards with
    /// [`ChunkEncoder`] and `Transfer-Encoding: chunked` is emitted.
    pub fn set_chunked(&mut self) {
        self.chunked = true;
        self.body = None;
    }

    /// True if the encoded request asks for `Connection: close`.
    #[must_use]
    pub fn closes_connection(&self) -> bool {
        self.fields
            .iter()
            .any(|(n, v)| n.eq_ignore_ascii_case("connection") && v.to_ascii_lowercase().contains("close"))
    }

    /// Serialize the request head plus any sized body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.extend_from_slice(self.method.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(&self.target);
        out.push(b' ');
        out.extend_from_slice(self.version.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");

        for (name, value) in &self.fields {
            write_field(&mut out, name, value);
        }
        if self.chunked {
            if !has_field(&self.fields, "transfer-encoding") {
                write_field(&mut out, "Transfer-Encoding", "chunked");
            }
        } else if let Some(body) = &self.body {
            if !has_field(&self.fields, "content-length") {
                write_field(&mut out, "Content-Length", &body.len().to_string());
            }
        }
        out.extend_from_slice(b"\r\n");

        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        out
    }
}

// ============================================================================
// Response encoder
// ============================================================================

/// Builder for an outgoing HTTP response.
#[derive(Debug)]
pub struct ResponseEncoder {
    status: StatusCode,
    reason: Option<String>,
    version: HttpVersion,
    fields: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    chunked: bool,
}

impl ResponseEncoder {
    /// Start a response; the reason phrase defaults to the canonical one.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: None,
            version: HttpVersion::default(),
            fields: Vec::new(),
            body: None,
            chunked: false,
        }
    }

    /// Override the reason phrase.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Override the HTTP version.
    #[must_use]
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Add a header field, sent with the given case.
    ///
    /// # Errors
    ///
    /// [`ParseError::SplitHeadersRejected`] if the value contains CR or
    /// LF; [`ParseError::MalformedHeader`] if the name is not a token.
    pub fn add_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParseError> {
        let (name, value) = (name.into(), value.into());
        check_header(&name, &value)?;
        self.fields.push((name, value));
        Ok(())
    }

    /// Attach a sized body; `Content-Length` is emitted automatically.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = Some(body.into());
        self.chunked = false;
    }

    /// Switch to chunked framing.
    pub fn set_chunked(&mut self) {
        self.chunked = true;
        self.body = None;
    }

    /// True if the encoded response asks for `Connection: close`.
    #[must_use]
    pub fn closes_connection(&self) -> bool {
        self.fields
            .iter()
            .any(|(n, v)| n.eq_ignore_ascii_case("connection") && v.to_ascii_lowercase().contains("close"))
    }

    /// Serialize the response head plus any sized body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.encode_head();
        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        out
    }

    /// Serialize the head only, keeping the framing headers.
    ///
    /// Used for responses to HEAD requests: `Content-Length` still
    /// describes the body that a GET would have returned, but no body
    /// bytes follow.
    #[must_use]
    pub fn encode_head(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.extend_from_slice(self.version.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.status.to_string().as_bytes());
        out.push(b' ');
        let reason = self
            .reason
            .as_deref()
            .unwrap_or_else(|| self.status.canonical_reason());
        out.extend_from_slice(reason.as_bytes());
        out.extend_from_slice(b"\r\n");

        for (name, value) in &self.fields {
            write_field(&mut out, name, value);
        }
        if !self.status.is_informational() && !has_field(&self.fields, "date") {
            write_field(&mut out, "Date", &httpdate::fmt_http_date(SystemTime::now()));
        }
        if self.chunked {
            if !has_field(&self.fields, "transfer-encoding") {
                write_field(&mut out, "Transfer-Encoding", "chunked");
            }
        } else if let Some(body) = &self.body {
            if !has_field(&self.fields, "content-length") {
                write_field(&mut out, "Content-Length", &body.len().to_string());
            }
        }
        out.extend_from_slice(b"\r\n");
        out
    }
}

// ============================================================================
// Chunk framing
// ============================================================================

/// Chunked transfer coding frames.
#[derive(Debug)]
pub struct ChunkEncoder;

impl ChunkEncoder {
    /// Frame one chunk of data: `HEXSIZE CRLF data CRLF`.
    ///
    /// Empty data produces an empty frame, never a terminator; use
    /// [`ChunkEncoder::last`] to end the body.
    #[must_use]
    pub fn chunk(data: &[u8]) -> Vec<u8> {
        if data.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(data.len() + 16);
        out.extend_from_slice(format!("{:x}", data.len()).as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(data);
        out.extend_from_slice(b"\r\n");
        out
    }

    /// Frame the terminating chunk, with optional trailer fields.
    ///
    /// # Errors
    ///
    /// [`ParseError::SplitHeadersRejected`] if a trailer value contains
    /// CR or LF; [`ParseError::MalformedHeader`] for a non-token name.
    pub fn last(trailers: &Headers) -> Result<Vec<u8>, ParseError> {
        let mut out = Vec::with_capacity(32);
        out.extend_from_slice(b"0\r\n");
        for (name, value) in trailers.iter() {
            check_header(name, value)?;
            write_field(&mut out, name, value);
        }
        out.extend_from_slice(b"\r\n");
        Ok(out)
    }
}
