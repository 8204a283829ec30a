//! Incremental start-line and chunk-header parsers.
//!
//! Three small state machines: the request line, the status line, and
//! the chunk-size line. Like the field-line parser they consume one
//! byte at a time and resume cleanly at any buffer boundary.

use culvert_core::{HttpVersion, Method, StatusCode};

use crate::chars::{hex_value, is_ctl, is_space_or_tab, is_token_char};
use crate::error::ParseError;
use crate::limits::ParserLimits;

const HTTP_SLASH: &[u8] = b"HTTP/";

fn version_major(byte: u8) -> Result<u8, ParseError> {
    match byte {
        b'0'..=b'2' => Ok(byte - b'0'),
        b'3'..=b'9' => Err(ParseError::UnsupportedVersion),
        _ => Err(ParseError::MalformedStartLine),
    }
}

// ============================================================================
// Request line
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReqState {
    Method,
    WsBeforeTarget,
    Target,
    WsBeforeVersion,
    HttpLiteral(u8),
    Major,
    Dot,
    Minor,
    AfterVersion,
    Lf,
    Valid,
}

/// Parser for `METHOD SP request-target SP HTTP/maj.min CRLF`.
///
/// The request target is an opaque byte range: any non-control,
/// non-space byte is kept exactly as received.
#[derive(Debug)]
pub struct RequestLineParser {
    method: String,
    target: Vec<u8>,
    major: u8,
    minor: u8,
    length: usize,
    ws_count: usize,
    state: ReqState,
}

impl Default for RequestLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLineParser {
    /// Create a parser in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: String::new(),
            target: Vec::new(),
            major: 0,
            minor: 0,
            length: 0,
            ws_count: 0,
            state: ReqState::Method,
        }
    }

    /// Reset to the initial state, keeping allocations.
    pub fn clear(&mut self) {
        self.method.clear();
        self.target.clear();
        self.major = 0;
        self.minor = 0;
        self.length = 0;
        self.ws_count = 0;
        self.state = ReqState::Method;
    }

    /// True if no byte has been consumed since the last `clear`.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.length == 0
    }

    /// Consume bytes; `Ok(true)` when the line is complete.
    pub fn parse(
        &mut self,
        limits: &ParserLimits,
        buf: &[u8],
        cursor: &mut usize,
    ) -> Result<bool, ParseError> {
        while self.state != ReqState::Valid {
            let Some(&byte) = buf.get(*cursor) else {
                return Ok(false);
            };
            *cursor += 1;
            self.length += 1;
            if self.length > limits.max_line_length() {
                return Err(ParseError::LineTooLong);
            }
            self.consume(limits, byte)?;
        }
        Ok(true)
    }

    fn consume(&mut self, limits: &ParserLimits, byte: u8) -> Result<(), ParseError> {
        match self.state {
            ReqState::Method => {
                if is_token_char(byte) {
                    self.method.push(byte as char);
                } else if byte == b' ' && !self.method.is_empty() {
                    self.ws_count = 1;
                    self.state = ReqState::WsBeforeTarget;
                } else {
                    return Err(ParseError::MalformedStartLine);
                }
            }
            ReqState::WsBeforeTarget => {
                if byte == b' ' {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                } else if !is_ctl(byte) {
                    self.target.push(byte);
                    self.state = ReqState::Target;
                } else {
                    return Err(ParseError::MalformedStartLine);
                }
            }
            ReqState::Target => {
                if byte == b' ' {
                    self.ws_count = 1;
                    self.state = ReqState::WsBeforeVersion;
                } else if !is_ctl(byte) {
                    self.target.push(byte);
                } else {
                    return Err(ParseError::MalformedStartLine);
                }
            }
            ReqState::WsBeforeVersion => {
                if byte == b' ' {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                } else if byte == HTTP_SLASH[0] {
                    self.state = ReqState::HttpLiteral(1);
                } else {
                    return Err(ParseError::MalformedStartLine);
                }
            }
            ReqState::HttpLiteral(index) => {
                if byte != HTTP_SLASH[index as usize] {
                    return Err(ParseError::MalformedStartLine);
                }
                self.state = if usize::from(index) + 1 == HTTP_SLASH.len() {
                    ReqState::Major
                } else {
                    ReqState::HttpLiteral(index + 1)
                };
            }
            ReqState::Major => {
                self.major = version_major(byte)?;
                self.state = ReqState::Dot;
            }
            ReqState::Dot => {
                if byte != b'.' {
                    return Err(ParseError::MalformedStartLine);
                }
                self.state = ReqState::Minor;
            }
            ReqState::Minor => {
                if !byte.is_ascii_digit() {
                    return Err(ParseError::MalformedStartLine);
                }
                self.minor = byte - b'0';
                self.state = ReqState::AfterVersion;
            }
            ReqState::AfterVersion => match byte {
                b'\r' => self.state = ReqState::Lf,
                b'\n' if !limits.strict_crlf() => self.state = ReqState::Valid,
                b'\n' => return Err(ParseError::InvalidCrlf),
                _ => return Err(ParseError::MalformedStartLine),
            },
            ReqState::Lf => {
                if byte != b'\n' {
                    return Err(ParseError::InvalidCrlf);
                }
                self.state = ReqState::Valid;
            }
            ReqState::Valid => unreachable!("handled by parse loop"),
        }
        Ok(())
    }

    /// Take the parsed method, target bytes and version.
    #[must_use]
    pub fn take(&mut self) -> (Method, Vec<u8>, HttpVersion) {
        let method = Method::from_token(&self.method).unwrap_or(Method::Get);
        self.method.clear();
        let target = std::mem::take(&mut self.target);
        (method, target, HttpVersion::new(self.major, self.minor))
    }
}

// ============================================================================
// Status line
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatState {
    HttpLiteral(u8),
    Major,
    Dot,
    Minor,
    WsBeforeCode,
    Code,
    AfterCode,
    WsBeforeReason,
    Reason,
    Lf,
    Valid,
}

/// Parser for `HTTP/maj.min SP 3DIGIT SP reason CRLF`.
///
/// The reason phrase may be empty; a status line ending right after the
/// code (with or without the trailing space) is accepted. Reason bytes
/// are kept exactly as received.
#[derive(Debug)]
pub struct StatusLineParser {
    major: u8,
    minor: u8,
    code: u16,
    code_digits: u8,
    reason: Vec<u8>,
    length: usize,
    ws_count: usize,
    state: StatState,
}

impl Default for StatusLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLineParser {
    /// Create a parser in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            major: 0,
            minor: 0,
            code: 0,
            code_digits: 0,
            reason: Vec::new(),
            length: 0,
            ws_count: 0,
            state: StatState::HttpLiteral(0),
        }
    }

    /// Reset to the initial state, keeping allocations.
    pub fn clear(&mut self) {
        self.major = 0;
        self.minor = 0;
        self.code = 0;
        self.code_digits = 0;
        self.reason.clear();
        self.length = 0;
        self.ws_count = 0;
        self.state = StatState::HttpLiteral(0);
    }

    /// True if no byte has been consumed since the last `clear`.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.length == 0
    }

    /// Consume bytes; `Ok(true)` when the line is complete.
    pub fn parse(
        &mut self,
        limits: &ParserLimits,
        buf: &[u8],
        cursor: &mut usize,
    ) -> Result<bool, ParseError> {
        while self.state != StatState::Valid {
            let Some(&byte) = buf.get(*cursor) else {
                return Ok(false);
            };
            *cursor += 1;
            self.length += 1;
            if self.length > limits.max_line_length() {
                return Err(ParseError::LineTooLong);
            }
            self.consume(limits, byte)?;
        }
        Ok(true)
    }

    fn consume(&mut self, limits: &ParserLimits, byte: u8) -> Result<(), ParseError> {
        match self.state {
            StatState::HttpLiteral(index) => {
                if byte != HTTP_SLASH[index as usize] {
                    return Err(ParseError::MalformedStartLine);
                }
                self.state = if usize::from(index) + 1 == HTTP_SLASH.len() {
                    StatState::Major
                } else {
                    StatState::HttpLiteral(index + 1)
                };
            }
            StatState::Major => {
                self.major = version_major(byte)?;
                self.state = StatState::Dot;
            }
            StatState::Dot => {
                if byte != b'.' {
                    return Err(ParseError::MalformedStartLine);
                }
                self.state = StatState::Minor;
            }
            StatState::Minor => {
                if !byte.is_ascii_digit() {
                    return Err(ParseError::MalformedStartLine);
                }
                self.minor = byte - b'0';
                self.ws_count = 0;
                self.state = StatState::WsBeforeCode;
            }
            StatState::WsBeforeCode => {
                if byte == b' ' {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                } else if byte.is_ascii_digit() {
                    if self.ws_count == 0 {
                        return Err(ParseError::MalformedStartLine);
                    }
                    self.code = u16::from(byte - b'0');
                    self.code_digits = 1;
                    self.state = StatState::Code;
                } else {
                    return Err(ParseError::MalformedStartLine);
                }
            }
            StatState::Code => {
                if !byte.is_ascii_digit() {
                    return Err(ParseError::MalformedStartLine);
                }
                self.code = self.code * 10 + u16::from(byte - b'0');
                self.code_digits += 1;
                if self.code_digits == 3 {
                    self.state = StatState::AfterCode;
                }
            }
            StatState::AfterCode => match byte {
                b' ' => {
                    self.ws_count = 1;
                    self.state = StatState::WsBeforeReason;
                }
                b'\r' => self.state = StatState::Lf,
                b'\n' if !limits.strict_crlf() => self.state = StatState::Valid,
                b'\n' => return Err(ParseError::InvalidCrlf),
                _ => return Err(ParseError::MalformedStartLine),
            },
            StatState::WsBeforeReason => match byte {
                b' ' => {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                }
                b'\r' => self.state = StatState::Lf,
                b'\n' if !limits.strict_crlf() => self.state = StatState::Valid,
                b'\n' => return Err(ParseError::InvalidCrlf),
                byte if byte == b'\t' || !is_ctl(byte) => {
                    self.reason.push(byte);
                    self.state = StatState::Reason;
                }
                _ => return Err(ParseError::MalformedStartLine),
            },
            StatState::Reason => match byte {
                b'\r' => self.state = StatState::Lf,
                b'\n' if !limits.strict_crlf() => self.state = StatState::Valid,
                b'\n' => return Err(ParseError::InvalidCrlf),
                byte if byte == b'\t' || !is_ctl(byte) => self.reason.push(byte),
                _ => return Err(ParseError::MalformedStartLine),
            },
            StatState::Lf => {
                if byte != b'\n' {
                    return Err(ParseError::InvalidCrlf);
                }
                self.state = StatState::Valid;
            }
            StatState::Valid => unreachable!("handled by parse loop"),
        }
        Ok(())
    }

    /// Take the parsed version, status and reason-phrase bytes.
    #[must_use]
    pub fn take(&mut self) -> (HttpVersion, StatusCode, Vec<u8>) {
        let reason = std::mem::take(&mut self.reason);
        (
            HttpVersion::new(self.major, self.minor),
            StatusCode::from_u16(self.code),
            reason,
        )
    }
}

// ============================================================================
// Chunk header
// ============================================================================

/// The header of one chunk in a chunked body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHead {
    size: u64,
    extension: Option<Vec<u8>>,
}

impl ChunkHead {
    /// Create a chunk head without an extension.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            extension: None,
        }
    }

    /// The chunk size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The chunk extension bytes, verbatim, if one was present.
    #[must_use]
    pub fn extension(&self) -> Option<&[u8]> {
        self.extension.as_deref()
    }

    /// A size-zero chunk terminates the body.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.size == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    WsAfterSize,
    Extension,
    Lf,
    Valid,
}

/// Parser for `HEXSIZE [";" extension] CRLF`.
#[derive(Debug)]
pub struct ChunkHeadParser {
    size: u64,
    digits: u8,
    extension: Vec<u8>,
    length: usize,
    ws_count: usize,
    state: ChunkState,
}

impl Default for ChunkHeadParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkHeadParser {
    /// Create a parser in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: 0,
            digits: 0,
            extension: Vec::new(),
            length: 0,
            ws_count: 0,
            state: ChunkState::Size,
        }
    }

    /// Reset to the initial state, keeping allocations.
    pub fn clear(&mut self) {
        self.size = 0;
        self.digits = 0;
        self.extension.clear();
        self.length = 0;
        self.ws_count = 0;
        self.state = ChunkState::Size;
    }

    /// Consume bytes; `Ok(true)` when the chunk header is complete.
    pub fn parse(
        &mut self,
        limits: &ParserLimits,
        buf: &[u8],
        cursor: &mut usize,
    ) -> Result<bool, ParseError> {
        while self.state != ChunkState::Valid {
            let Some(&byte) = buf.get(*cursor) else {
                return Ok(false);
            };
            *cursor += 1;
            self.length += 1;
            if self.length > limits.max_line_length() {
                return Err(ParseError::LineTooLong);
            }
            self.consume(limits, byte)?;
        }
        Ok(true)
    }

    fn consume(&mut self, limits: &ParserLimits, byte: u8) -> Result<(), ParseError> {
        match self.state {
            ChunkState::Size => {
                if let Some(digit) = hex_value(byte) {
                    self.size = self
                        .size
                        .checked_mul(16)
                        .and_then(|s| s.checked_add(u64::from(digit)))
                        .ok_or(ParseError::InvalidChunkSize)?;
                    if self.size > limits.max_chunk_size() {
                        return Err(ParseError::BodyTooLarge);
                    }
                    self.digits += 1;
                } else if self.digits == 0 {
                    return Err(ParseError::InvalidChunkSize);
                } else {
                    self.after_size(limits, byte)?;
                }
            }
            ChunkState::WsAfterSize => {
                if is_space_or_tab(byte) {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                } else {
                    self.after_size(limits, byte)?;
                }
            }
            ChunkState::Extension => match byte {
                b'\r' => self.state = ChunkState::Lf,
                b'\n' if !limits.strict_crlf() => self.state = ChunkState::Valid,
                b'\n' => return Err(ParseError::InvalidCrlf),
                byte if !is_ctl(byte) => self.extension.push(byte),
                _ => return Err(ParseError::InvalidChunkSize),
            },
            ChunkState::Lf => {
                if byte != b'\n' {
                    return Err(ParseError::InvalidCrlf);
                }
                self.state = ChunkState::Valid;
            }
            ChunkState::Valid => unreachable!("handled by parse loop"),
        }
        Ok(())
    }

    fn after_size(&mut self, limits: &ParserLimits, byte: u8) -> Result<(), ParseError> {
        match byte {
            b';' => self.state = ChunkState::Extension,
            b'\r' => self.state = ChunkState::Lf,
            b'\n' if !limits.strict_crlf() => self.state = ChunkState::Valid,
            b'\n' => return Err(ParseError::InvalidCrlf),
            byte if is_space_or_tab(byte) => {
                self.ws_count += 1;
                if self.ws_count > limits.max_whitespace() {
                    return Err(ParseError::WhitespaceTooLong);
                }
                self.state = ChunkState::WsAfterSize;
            }
            _ => return Err(ParseError::InvalidChunkSize),
        }
        Ok(())
    }

    /// Take the parsed chunk head.
    #[must_use]
    pub fn take(&mut self) -> ChunkHead {
        let extension = if self.extension.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.extension))
        };
        ChunkHead {
            size: self.size,
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ParserLimits {
        ParserLimits::default()
    }

    // ------------------------------------------------------------------------
    // Request line
    // ------------------------------------------------------------------------

    fn parse_request_line(input: &[u8]) -> Result<(Method, Vec<u8>, HttpVersion), ParseError> {
        let mut parser = RequestLineParser::new();
        let mut cursor = 0;
        assert!(parser.parse(&limits(), input, &mut cursor)?, "incomplete");
        Ok(parser.take())
    }

    #[test]
    fn request_line_simple() {
        let (method, target, version) = parse_request_line(b"GET / HTTP/1.1\r\n").unwrap();
        assert_eq!(method, Method::Get);
        assert_eq!(target, b"/");
        assert_eq!(version, HttpVersion::HTTP_1_1);
    }

    #[test]
    fn request_line_custom_method() {
        let (method, _, _) = parse_request_line(b"PURGE /cache HTTP/1.1\r\n").unwrap();
        assert_eq!(method, Method::Custom("PURGE".to_string()));
    }

    #[test]
    fn request_line_http10() {
        let (_, _, version) = parse_request_line(b"GET /legacy HTTP/1.0\r\n").unwrap();
        assert_eq!(version, HttpVersion::HTTP_1_0);
    }

    #[test]
    fn request_line_query_target_kept_opaque() {
        let (_, target, _) = parse_request_line(b"GET /a?b=c%20d HTTP/1.1\r\n").unwrap();
        assert_eq!(target, b"/a?b=c%20d");
    }

    #[test]
    fn request_line_target_preserves_high_bytes() {
        let (_, target, _) = parse_request_line(b"GET /caf\xc3\xa9/\xff HTTP/1.1\r\n").unwrap();
        assert_eq!(target, b"/caf\xc3\xa9/\xff");
    }

    #[test]
    fn request_line_extra_spaces_tolerated() {
        let (method, target, _) = parse_request_line(b"GET   /x   HTTP/1.1\r\n").unwrap();
        assert_eq!(method, Method::Get);
        assert_eq!(target, b"/x");
    }

    #[test]
    fn request_line_rejects_http09_form() {
        assert_eq!(
            parse_request_line(b"GET /\r\n"),
            Err(ParseError::MalformedStartLine)
        );
    }

    #[test]
    fn request_line_rejects_future_version() {
        assert_eq!(
            parse_request_line(b"GET / HTTP/3.0\r\n"),
            Err(ParseError::UnsupportedVersion)
        );
    }

    #[test]
    fn request_line_rejects_ctl_in_target() {
        assert_eq!(
            parse_request_line(b"GET /\x01 HTTP/1.1\r\n"),
            Err(ParseError::MalformedStartLine)
        );
    }

    #[test]
    fn request_line_length_limit() {
        let limits = ParserLimits::new().with_max_line_length(16);
        let mut parser = RequestLineParser::new();
        let mut cursor = 0;
        let err = parser
            .parse(&limits, b"GET /a/very/long/target HTTP/1.1\r\n", &mut cursor)
            .unwrap_err();
        assert_eq!(err, ParseError::LineTooLong);
    }

    #[test]
    fn request_line_incremental() {
        let mut parser = RequestLineParser::new();
        let mut done = false;
        for piece in [&b"GE"[..], b"T /pa", b"th HTT", b"P/1.", b"1\r", b"\n"] {
            let mut cursor = 0;
            done = parser.parse(&limits(), piece, &mut cursor).unwrap();
        }
        assert!(done);
        let (method, target, version) = parser.take();
        assert_eq!(method, Method::Get);
        assert_eq!(target, b"/path");
        assert_eq!(version, HttpVersion::HTTP_1_1);
    }

    // ------------------------------------------------------------------------
    // Status line
    // ------------------------------------------------------------------------

    fn parse_status_line(input: &[u8]) -> Result<(HttpVersion, StatusCode, Vec<u8>), ParseError> {
        let mut parser = StatusLineParser::new();
        let mut cursor = 0;
        assert!(parser.parse(&limits(), input, &mut cursor)?, "incomplete");
        Ok(parser.take())
    }

    #[test]
    fn status_line_simple() {
        let (version, status, reason) = parse_status_line(b"HTTP/1.1 200 OK\r\n").unwrap();
        assert_eq!(version, HttpVersion::HTTP_1_1);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, b"OK");
    }

    #[test]
    fn status_line_multiword_reason() {
        let (_, status, reason) = parse_status_line(b"HTTP/1.1 404 Not Found\r\n").unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(reason, b"Not Found");
    }

    #[test]
    fn status_line_empty_reason_with_space() {
        let (_, status, reason) = parse_status_line(b"HTTP/1.1 200 \r\n").unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, b"");
    }

    #[test]
    fn status_line_empty_reason_without_space() {
        let (_, status, reason) = parse_status_line(b"HTTP/1.1 204\r\n").unwrap();
        assert_eq!(status.as_u16(), 204);
        assert_eq!(reason, b"");
    }

    #[test]
    fn status_line_reason_preserves_high_bytes() {
        let (_, status, reason) = parse_status_line(b"HTTP/1.1 200 d\xe9j\xe0 vu\r\n").unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, b"d\xe9j\xe0 vu");
    }

    #[test]
    fn status_line_rejects_two_digit_code() {
        assert_eq!(
            parse_status_line(b"HTTP/1.1 99 Short\r\n"),
            Err(ParseError::MalformedStartLine)
        );
    }

    #[test]
    fn status_line_rejects_four_digit_code() {
        assert_eq!(
            parse_status_line(b"HTTP/1.1 2000 Long\r\n"),
            Err(ParseError::MalformedStartLine)
        );
    }

    #[test]
    fn status_line_reason_allows_tab() {
        let (_, _, reason) = parse_status_line(b"HTTP/1.1 200 a\tb\r\n").unwrap();
        assert_eq!(reason, b"a\tb");
    }

    #[test]
    fn status_line_incremental() {
        let mut parser = StatusLineParser::new();
        let mut done = false;
        for piece in [&b"HTT"[..], b"P/1.1 2", b"00 O", b"K\r\n"] {
            let mut cursor = 0;
            done = parser.parse(&limits(), piece, &mut cursor).unwrap();
        }
        assert!(done);
        let (_, status, reason) = parser.take();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason, b"OK");
    }

    // ------------------------------------------------------------------------
    // Chunk header
    // ------------------------------------------------------------------------

    fn parse_chunk_head(input: &[u8]) -> Result<ChunkHead, ParseError> {
        let mut parser = ChunkHeadParser::new();
        let mut cursor = 0;
        assert!(parser.parse(&limits(), input, &mut cursor)?, "incomplete");
        Ok(parser.take())
    }

    #[test]
    fn chunk_head_simple() {
        let head = parse_chunk_head(b"5\r\n").unwrap();
        assert_eq!(head.size(), 5);
        assert!(head.extension().is_none());
        assert!(!head.is_last());
    }

    #[test]
    fn chunk_head_hex_size() {
        let head = parse_chunk_head(b"1E240\r\n").unwrap();
        assert_eq!(head.size(), 123456);
    }

    #[test]
    fn chunk_head_last() {
        let head = parse_chunk_head(b"0\r\n").unwrap();
        assert!(head.is_last());
    }

    #[test]
    fn chunk_head_extension_preserved() {
        let head = parse_chunk_head(b"a;name=value\r\n").unwrap();
        assert_eq!(head.size(), 10);
        assert_eq!(head.extension(), Some(&b"name=value"[..]));
    }

    #[test]
    fn chunk_head_extension_preserves_high_bytes() {
        let head = parse_chunk_head(b"5;tag=\xc3\xa9\xff\r\n").unwrap();
        assert_eq!(head.size(), 5);
        assert_eq!(head.extension(), Some(&b"tag=\xc3\xa9\xff"[..]));
    }

    #[test]
    fn chunk_head_rejects_non_hex() {
        assert_eq!(parse_chunk_head(b"xyz\r\n"), Err(ParseError::InvalidChunkSize));
    }

    #[test]
    fn chunk_head_rejects_empty_size() {
        assert_eq!(parse_chunk_head(b"\r\n"), Err(ParseError::InvalidChunkSize));
    }

    #[test]
    fn chunk_head_size_limit() {
        let limits = ParserLimits::new().with_max_chunk_size(0xff);
        let mut parser = ChunkHeadParser::new();
        let mut cursor = 0;
        let err = parser.parse(&limits, b"100\r\n", &mut cursor).unwrap_err();
        assert_eq!(err, ParseError::BodyTooLarge);
    }

    #[test]
    fn chunk_head_overflow_rejected() {
        let limits = ParserLimits::new().with_max_chunk_size(u64::MAX);
        let mut parser = ChunkHeadParser::new();
        let mut cursor = 0;
        let err = parser
            .parse(&limits, b"ffffffffffffffffff\r\n", &mut cursor)
            .unwrap_err();
        assert_eq!(err, ParseError::InvalidChunkSize);
    }
}
