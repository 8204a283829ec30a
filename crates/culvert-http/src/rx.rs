//! Message receivers.
//!
//! [`RequestReceiver`] and [`ResponseReceiver`] compose a start-line
//! parser, a headers parser, and a body collector into the per-message
//! receive state machine:
//!
//! ```text
//! StartLine → Headers → { Body | ChunkHead ⇄ ChunkData | UntilClose } → Complete
//!                                       ↘ Trailers → Complete
//! ```
//!
//! `receive` consumes bytes from a caller-supplied slice through an
//! in/out cursor and reports progress as an [`RxStatus`]. Receivers are
//! `clear`-ed and reused across messages on a kept-alive connection.

use culvert_core::{Headers, RequestHead, ResponseHead};

use crate::chars::from_dec_string;
use crate::error::ParseError;
use crate::headers::HeadersParser;
use crate::limits::ParserLimits;
use crate::line::{ChunkHead, ChunkHeadParser, RequestLineParser, StatusLineParser};

/// Progress report from a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxStatus {
    /// All fed bytes consumed; the message needs more data.
    Incomplete,
    /// Start line and headers are valid; the head is now available.
    /// Reported exactly once per message.
    Headers,
    /// The message asked for `100 Continue` and the receiver is holding
    /// before the body until [`RequestReceiver::allow_continue`].
    ExpectContinue,
    /// One chunk of a chunked body completed; for the last chunk the
    /// trailers are available too.
    Chunk,
    /// The message is complete.
    Complete,
}

/// How the body of the current message is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    None,
    ContentLength(u64),
    Chunked,
    UntilClose,
}

/// Decide the framing for a parsed head, validating Content-Length.
///
/// Chunked transfer coding takes precedence over any Content-Length; a
/// malformed or over-limit Content-Length is rejected here, before the
/// head is surfaced.
fn framing_for(
    headers: &Headers,
    limits: &ParserLimits,
    is_response: bool,
) -> Result<Framing, ParseError> {
    if headers.is_chunked() {
        return Ok(Framing::Chunked);
    }
    if let Some(raw) = headers.get("content-length") {
        let value = from_dec_string(raw.trim().as_bytes());
        if value < 0 {
            return Err(ParseError::MalformedHeader);
        }
        let length = value as u64;
        if length > limits.max_body_length() {
            return Err(ParseError::BodyTooLarge);
        }
        return Ok(Framing::ContentLength(length));
    }
    if is_response {
        Ok(Framing::UntilClose)
    } else {
        Ok(Framing::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    StartLine,
    Headers,
    ExpectContinue(u64),
    Body(u64),
    UntilClose,
    ChunkHead,
    ChunkData(u64),
    ChunkDataCr,
    ChunkDataLf,
    Trailers,
    Complete,
    Invalid,
}

// ============================================================================
// Request receiver
// ============================================================================

/// Receiver for HTTP requests (server side).
#[derive(Debug)]
pub struct RequestReceiver {
    limits: ParserLimits,
    line: RequestLineParser,
    headers: HeadersParser,
    trailers: HeadersParser,
    chunk_line: ChunkHeadParser,
    state: RxState,
    head: Option<RequestHead>,
    body: Vec<u8>,
    body_length: u64,
    chunk: Option<ChunkHead>,
    chunk_data: Vec<u8>,
    continue_granted: bool,
    error: Option<ParseError>,
    failed_in_start_line: bool,
}

impl RequestReceiver {
    /// Create a receiver with the given limits.
    #[must_use]
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            limits,
            line: RequestLineParser::new(),
            headers: HeadersParser::new(),
            trailers: HeadersParser::new(),
            chunk_line: ChunkHeadParser::new(),
            state: RxState::StartLine,
            head: None,
            body: Vec::new(),
            body_length: 0,
            chunk: None,
            chunk_data: Vec::new(),
            continue_granted: false,
            error: None,
            failed_in_start_line: false,
        }
    }

    /// Reset for the next message on a kept-alive connection.
    pub fn clear(&mut self) {
        self.line.clear();
        self.headers.clear();
        self.trailers.clear();
        self.chunk_line.clear();
        self.state = RxState::StartLine;
        self.head = None;
        self.body.clear();
        self.body_length = 0;
        self.chunk = None;
        self.chunk_data.clear();
        self.continue_granted = false;
        self.error = None;
        self.failed_in_start_line = false;
    }

    /// True if the terminal error was raised while parsing the start
    /// line (an over-long request target rather than an over-long
    /// header, say).
    #[must_use]
    pub fn failed_in_start_line(&self) -> bool {
        self.failed_in_start_line
    }

    /// True if no byte of the current message has been consumed.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        matches!(self.state, RxState::StartLine) && self.line.is_pristine()
    }

    /// True once the head has been parsed.
    #[must_use]
    pub fn headers_done(&self) -> bool {
        self.head.is_some()
    }

    /// The request head, once [`RxStatus::Headers`] has been reported.
    #[must_use]
    pub fn head(&self) -> Option<&RequestHead> {
        self.head.as_ref()
    }

    /// The accumulated body of a sized message.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The most recently completed chunk head.
    #[must_use]
    pub fn chunk(&self) -> Option<&ChunkHead> {
        self.chunk.as_ref()
    }

    /// The data of the most recently completed chunk.
    #[must_use]
    pub fn chunk_data(&self) -> &[u8] {
        &self.chunk_data
    }

    /// Trailer headers of a chunked message, once the last chunk has
    /// been reported.
    #[must_use]
    pub fn trailers(&self) -> &Headers {
        self.trailers.headers()
    }

    /// Release the 100-continue gate and let the body be read.
    pub fn allow_continue(&mut self) {
        self.continue_granted = true;
        if let RxState::ExpectContinue(remaining) = self.state {
            self.state = RxState::Body(remaining);
        }
    }

    /// True while the receiver is holding for a continue grant.
    #[must_use]
    pub fn awaiting_continue(&self) -> bool {
        matches!(self.state, RxState::ExpectContinue(_))
    }

    /// Consume bytes from `buf` starting at `*cursor` and report
    /// progress. A returned error is terminal: every later call returns
    /// the same error without consuming anything.
    pub fn receive(&mut self, buf: &[u8], cursor: &mut usize) -> Result<RxStatus, ParseError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.drive(buf, cursor) {
            Ok(status) => Ok(status),
            Err(error) => {
                self.failed_in_start_line = matches!(self.state, RxState::StartLine);
                self.state = RxState::Invalid;
                self.error = Some(error);
                Err(error)
            }
        }
    }

    fn drive(&mut self, buf: &[u8], cursor: &mut usize) -> Result<RxStatus, ParseError> {
        loop {
            match self.state {
                RxState::StartLine => {
                    if !self.line.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    self.state = RxState::Headers;
                }
                RxState::Headers => {
                    if !self.headers.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    let (method, target, version) = self.line.take();
                    let mut head = RequestHead::with_version(method, target, version);
                    *head.headers_mut() = self.headers.take_headers();

                    let framing = framing_for(head.headers(), &self.limits, false)?;
                    self.state = match framing {
                        Framing::Chunked => RxState::ChunkHead,
                        Framing::ContentLength(0) | Framing::None | Framing::UntilClose => {
                            RxState::Complete
                        }
                        Framing::ContentLength(length) => {
                            if head.headers().expect_continue() && !self.continue_granted {
                                RxState::ExpectContinue(length)
                            } else {
                                RxState::Body(length)
                            }
                        }
                    };
                    self.head = Some(head);
                    return Ok(RxStatus::Headers);
                }
                RxState::ExpectContinue(_) => return Ok(RxStatus::ExpectContinue),
                RxState::Body(remaining) => {
                    let available = &buf[*cursor..];
                    if available.is_empty() {
                        return Ok(RxStatus::Incomplete);
                    }
                    let take = available.len().min(remaining as usize);
                    self.body.extend_from_slice(&available[..take]);
                    *cursor += take;
                    let remaining = remaining - take as u64;
                    if remaining == 0 {
                        self.state = RxState::Complete;
                    } else {
                        self.state = RxState::Body(remaining);
                        return Ok(RxStatus::Incomplete);
                    }
                }
                RxState::ChunkHead => {
                    if !self.chunk_line.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    let head = self.chunk_line.take();
                    self.chunk_line.clear();
                    if self
                        .body_length
                        .checked_add(head.size())
                        .map_or(true, |total| total > self.limits.max_body_length())
                    {
                        return Err(ParseError::BodyTooLarge);
                    }
                    if head.is_last() {
                        self.chunk = Some(head);
                        self.chunk_data.clear();
                        self.state = RxState::Trailers;
                    } else {
                        let size = head.size();
                        self.chunk = Some(head);
                        self.chunk_data.clear();
                        self.state = RxState::ChunkData(size);
                    }
                }
                RxState::ChunkData(remaining) => {
                    let available = &buf[*cursor..];
                    if available.is_empty() {
                        return Ok(RxStatus::Incomplete);
                    }
                    let take = available.len().min(remaining as usize);
                    self.chunk_data.extend_from_slice(&available[..take]);
                    *cursor += take;
                    let remaining = remaining - take as u64;
                    if remaining == 0 {
                        self.state = RxState::ChunkDataCr;
                    } else {
                        self.state = RxState::ChunkData(remaining);
                        return Ok(RxStatus::Incomplete);
                    }
                }
                RxState::ChunkDataCr => {
                    let Some(&byte) = buf.get(*cursor) else {
                        return Ok(RxStatus::Incomplete);
                    };
                    *cursor += 1;
                    match byte {
                        b'\r' => self.state = RxState::ChunkDataLf,
                        b'\n' if !self.limits.strict_crlf() => {
                            self.body_length += self.chunk_data.len() as u64;
                            self.state = RxState::ChunkHead;
                            return Ok(RxStatus::Chunk);
                        }
                        _ => return Err(ParseError::InvalidCrlf),
                    }
                }
                RxState::ChunkDataLf => {
                    let Some(&byte) = buf.get(*cursor) else {
                        return Ok(RxStatus::Incomplete);
                    };
                    *cursor += 1;
                    if byte != b'\n' {
                        return Err(ParseError::InvalidCrlf);
                    }
                    self.body_length += self.chunk_data.len() as u64;
                    self.state = RxState::ChunkHead;
                    return Ok(RxStatus::Chunk);
                }
                RxState::Trailers => {
                    if !self.trailers.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    self.state = RxState::Complete;
                    return Ok(RxStatus::Chunk);
                }
                RxState::UntilClose => unreachable!("requests have no until-close body"),
                RxState::Complete => return Ok(RxStatus::Complete),
                RxState::Invalid => unreachable!("checked in receive"),
            }
        }
    }
}

// ============================================================================
// Response receiver
// ============================================================================

/// Receiver for HTTP responses (client side).
#[derive(Debug)]
pub struct ResponseReceiver {
    limits: ParserLimits,
    line: StatusLineParser,
    headers: HeadersParser,
    trailers: HeadersParser,
    chunk_line: ChunkHeadParser,
    state: RxState,
    head: Option<ResponseHead>,
    body: Vec<u8>,
    body_length: u64,
    chunk: Option<ChunkHead>,
    chunk_data: Vec<u8>,
    head_request: bool,
    error: Option<ParseError>,
}

impl ResponseReceiver {
    /// Create a receiver with the given limits.
    #[must_use]
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            limits,
            line: StatusLineParser::new(),
            headers: HeadersParser::new(),
            trailers: HeadersParser::new(),
            chunk_line: ChunkHeadParser::new(),
            state: RxState::StartLine,
            head: None,
            body: Vec::new(),
            body_length: 0,
            chunk: None,
            chunk_data: Vec::new(),
            head_request: false,
            error: None,
        }
    }

    /// Reset for the next message on a kept-alive connection.
    ///
    /// The HEAD flag is cleared too; set it again before the next
    /// response arrives.
    pub fn clear(&mut self) {
        self.line.clear();
        self.headers.clear();
        self.trailers.clear();
        self.chunk_line.clear();
        self.state = RxState::StartLine;
        self.head = None;
        self.body.clear();
        self.body_length = 0;
        self.chunk = None;
        self.chunk_data.clear();
        self.head_request = false;
        self.error = None;
    }

    /// Mark the next response as answering a HEAD request: its framing
    /// headers describe a body that will not be sent.
    pub fn set_head_request(&mut self, head_request: bool) {
        self.head_request = head_request;
    }

    /// True if no byte of the current message has been consumed.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        matches!(self.state, RxState::StartLine) && self.line.is_pristine()
    }

    /// True once the head has been parsed.
    #[must_use]
    pub fn headers_done(&self) -> bool {
        self.head.is_some()
    }

    /// The response head, once [`RxStatus::Headers`] has been reported.
    #[must_use]
    pub fn head(&self) -> Option<&ResponseHead> {
        self.head.as_ref()
    }

    /// The accumulated body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The most recently completed chunk head.
    #[must_use]
    pub fn chunk(&self) -> Option<&ChunkHead> {
        self.chunk.as_ref()
    }

    /// The data of the most recently completed chunk.
    #[must_use]
    pub fn chunk_data(&self) -> &[u8] {
        &self.chunk_data
    }

    /// Trailer headers of a chunked message.
    #[must_use]
    pub fn trailers(&self) -> &Headers {
        self.trailers.headers()
    }

    /// True while the body is delimited by connection close.
    #[must_use]
    pub fn reading_until_close(&self) -> bool {
        matches!(self.state, RxState::UntilClose)
    }

    /// The transport reached EOF.
    ///
    /// Completes an until-close body. Returns `Some(RxStatus::Complete)`
    /// if EOF finished the current message, `None` if the receiver was
    /// between messages (a clean close) or mid-message (the connection
    /// layer reports the disconnect).
    pub fn finish(&mut self) -> Option<RxStatus> {
        if matches!(self.state, RxState::UntilClose) {
            self.state = RxState::Complete;
            return Some(RxStatus::Complete);
        }
        None
    }

    /// Consume bytes from `buf` starting at `*cursor` and report
    /// progress. A returned error is terminal.
    pub fn receive(&mut self, buf: &[u8], cursor: &mut usize) -> Result<RxStatus, ParseError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.drive(buf, cursor) {
            Ok(status) => Ok(status),
            Err(error) => {
                self.state = RxState::Invalid;
                self.error = Some(error);
                Err(error)
            }
        }
    }

    fn drive(&mut self, buf: &[u8], cursor: &mut usize) -> Result<RxStatus, ParseError> {
        loop {
            match self.state {
                RxState::StartLine => {
                    if !self.line.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    self.state = RxState::Headers;
                }
                RxState::Headers => {
                    if !self.headers.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    let (version, status, reason) = self.line.take();
                    let mut head = ResponseHead::with_reason(status, reason);
                    head.set_version(version);
                    *head.headers_mut() = self.headers.take_headers();

                    self.state = if self.head_request || !status.allows_body() {
                        RxState::Complete
                    } else {
                        match framing_for(head.headers(), &self.limits, true)? {
                            Framing::Chunked => RxState::ChunkHead,
                            Framing::ContentLength(0) => RxState::Complete,
                            Framing::ContentLength(length) => RxState::Body(length),
                            Framing::UntilClose => RxState::UntilClose,
                            Framing::None => RxState::Complete,
                        }
                    };
                    self.head = Some(head);
                    return Ok(RxStatus::Headers);
                }
                RxState::ExpectContinue(_) => unreachable!("responses have no continue gate"),
                RxState::Body(remaining) => {
                    let available = &buf[*cursor..];
                    if available.is_empty() {
                        return Ok(RxStatus::Incomplete);
                    }
                    let take = available.len().min(remaining as usize);
                    self.body.extend_from_slice(&available[..take]);
                    *cursor += take;
                    let remaining = remaining - take as u64;
                    if remaining == 0 {
                        self.state = RxState::Complete;
                    } else {
                        self.state = RxState::Body(remaining);
                        return Ok(RxStatus::Incomplete);
                    }
                }
                RxState::UntilClose => {
                    let available = &buf[*cursor..];
                    if available.is_empty() {
                        return Ok(RxStatus::Incomplete);
                    }
                    if self.body.len() as u64 + available.len() as u64
                        > self.limits.max_body_length()
                    {
                        return Err(ParseError::BodyTooLarge);
                    }
                    self.body.extend_from_slice(available);
                    *cursor += available.len();
                    return Ok(RxStatus::Incomplete);
                }
                RxState::ChunkHead => {
                    if !self.chunk_line.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    let head = self.chunk_line.take();
                    self.chunk_line.clear();
                    if self
                        .body_length
                        .checked_add(head.size())
                        .map_or(true, |total| total > self.limits.max_body_length())
                    {
                        return Err(ParseError::BodyTooLarge);
                    }
                    if head.is_last() {
                        self.chunk = Some(head);
                        self.chunk_data.clear();
                        self.state = RxState::Trailers;
                    } else {
                        let size = head.size();
                        self.chunk = Some(head);
                        self.chunk_data.clear();
                        self.state = RxState::ChunkData(size);
                    }
                }
                RxState::ChunkData(remaining) => {
                    let available = &buf[*cursor..];
                    if available.is_empty() {
                        return Ok(RxStatus::Incomplete);
                    }
                    let take = available.len().min(remaining as usize);
                    self.chunk_data.extend_from_slice(&available[..take]);
                    *cursor += take;
                    let remaining = remaining - take as u64;
                    if remaining == 0 {
                        self.state = RxState::ChunkDataCr;
                    } else {
                        self.state = RxState::ChunkData(remaining);
                        return Ok(RxStatus::Incomplete);
                    }
                }
                RxState::ChunkDataCr => {
                    let Some(&byte) = buf.get(*cursor) else {
                        return Ok(RxStatus::Incomplete);
                    };
                    *cursor += 1;
                    match byte {
                        b'\r' => self.state = RxState::ChunkDataLf,
                        b'\n' if !self.limits.strict_crlf() => {
                            self.body_length += self.chunk_data.len() as u64;
                            self.state = RxState::ChunkHead;
                            return Ok(RxStatus::Chunk);
                        }
                        _ => return Err(ParseError::InvalidCrlf),
                    }
                }
                RxState::ChunkDataLf => {
                    let Some(&byte) = buf.get(*cursor) else {
                        return Ok(RxStatus::Incomplete);
                    };
                    *cursor += 1;
                    if byte != b'\n' {
                        return Err(ParseError::InvalidCrlf);
                    }
                    self.body_length += self.chunk_data.len() as u64;
                    self.state = RxState::ChunkHead;
                    return Ok(RxStatus::Chunk);
                }
                RxState::Trailers => {
                    if !self.trailers.parse(&self.limits, buf, cursor)? {
                        return Ok(RxStatus::Incomplete);
                    }
                    self.state = RxState::Complete;
                    return Ok(RxStatus::Chunk);
                }
                RxState::Complete => return Ok(RxStatus::Complete),
                RxState::Invalid => unreachable!("checked in receive"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use culvert_core::Method;

    fn run_request(input: &[u8]) -> (RequestReceiver, Vec<RxStatus>) {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let statuses = collect_statuses(|buf, cursor| rx.receive(buf, cursor), input);
        (rx, statuses)
    }

    fn collect_statuses(
        mut receive: impl FnMut(&[u8], &mut usize) -> Result<RxStatus, ParseError>,
        input: &[u8],
    ) -> Vec<RxStatus> {
        let mut statuses = Vec::new();
        let mut cursor = 0;
        loop {
            let status = receive(input, &mut cursor).expect("parse error");
            statuses.push(status);
            match status {
                RxStatus::Incomplete | RxStatus::Complete | RxStatus::ExpectContinue => {
                    return statuses
                }
                _ => {}
            }
        }
    }

    #[test]
    fn minimal_get() {
        let (rx, statuses) = run_request(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
        assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
        let head = rx.head().unwrap();
        assert_eq!(*head.method(), Method::Get);
        assert_eq!(head.target(), b"/");
        assert!(head.version().is_http11());
        assert_eq!(head.headers().get("host"), Some("a"));
        assert!(rx.body().is_empty());
    }

    #[test]
    fn sized_body() {
        let (rx, statuses) =
            run_request(b"POST /u HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
        assert_eq!(rx.body(), b"hello");
    }

    #[test]
    fn zero_length_body_completes_immediately() {
        let (rx, statuses) =
            run_request(b"POST /u HTTP/1.1\r\nHost: a\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
        assert!(rx.body().is_empty());
    }

    #[test]
    fn body_across_feeds() {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let mut cursor = 0;
        let part = b"POST /u HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel";
        assert_eq!(rx.receive(part, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(rx.receive(part, &mut cursor).unwrap(), RxStatus::Incomplete);

        let mut cursor = 0;
        assert_eq!(rx.receive(b"lo", &mut cursor).unwrap(), RxStatus::Complete);
        assert_eq!(rx.body(), b"hello");
    }

    #[test]
    fn chunked_request() {
        let (rx, statuses) = run_request(
            b"POST /u HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        );
        assert_eq!(
            statuses,
            [
                RxStatus::Headers,
                RxStatus::Chunk,
                RxStatus::Chunk,
                RxStatus::Complete
            ]
        );
        assert!(rx.chunk().unwrap().is_last());
        assert!(rx.trailers().is_empty());
    }

    #[test]
    fn chunked_with_trailers() {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let input: &[u8] =
            b"POST /u HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\nX-Trace: abc\r\n\r\n";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Chunk);
        assert_eq!(rx.chunk().unwrap().size(), 5);
        assert_eq!(rx.chunk_data(), b"hello");
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Chunk);
        assert!(rx.chunk().unwrap().is_last());
        assert_eq!(rx.trailers().get("x-trace"), Some("abc"));
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Complete);
    }

    #[test]
    fn chunked_precedence_over_content_length() {
        let (rx, statuses) = run_request(
            b"POST /u HTTP/1.1\r\nContent-Length: 9999\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
        );
        assert_eq!(
            statuses,
            [RxStatus::Headers, RxStatus::Chunk, RxStatus::Complete]
        );
        assert!(rx.chunk().unwrap().is_last());
    }

    #[test]
    fn expect_continue_gate() {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let input: &[u8] =
            b"PUT /big HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 5\r\n\r\nhello";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(
            rx.receive(input, &mut cursor).unwrap(),
            RxStatus::ExpectContinue
        );
        // Holding: the body bytes stay unconsumed.
        assert!(rx.awaiting_continue());
        assert_eq!(
            rx.receive(input, &mut cursor).unwrap(),
            RxStatus::ExpectContinue
        );

        rx.allow_continue();
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Complete);
        assert_eq!(rx.body(), b"hello");
    }

    #[test]
    fn expect_continue_skipped_without_body() {
        let (_, statuses) =
            run_request(b"GET / HTTP/1.1\r\nHost: a\r\nExpect: 100-continue\r\n\r\n");
        assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
    }

    #[test]
    fn malformed_content_length_rejected() {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let mut cursor = 0;
        let err = rx
            .receive(b"POST / HTTP/1.1\r\nContent-Length: 12x\r\n\r\n", &mut cursor)
            .unwrap_err();
        assert_eq!(err, ParseError::MalformedHeader);
    }

    #[test]
    fn oversized_declared_body_rejected_at_headers() {
        let limits = ParserLimits::new().with_max_body_length(4);
        let mut rx = RequestReceiver::new(limits);
        let mut cursor = 0;
        let err = rx
            .receive(
                b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
                &mut cursor,
            )
            .unwrap_err();
        assert_eq!(err, ParseError::BodyTooLarge);
    }

    #[test]
    fn errors_are_terminal() {
        let mut rx = RequestReceiver::new(ParserLimits::default());
        let mut cursor = 0;
        let err = rx.receive(b"BAD\x01 / HTTP/1.1\r\n", &mut cursor).unwrap_err();
        assert_eq!(err, ParseError::MalformedStartLine);

        let mut cursor = 0;
        let again = rx.receive(b"GET / HTTP/1.1\r\n\r\n", &mut cursor).unwrap_err();
        assert_eq!(again, err);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn clear_resets_for_next_message() {
        let (mut rx, _) =
            run_request(b"POST /u HTTP/1.1\r\nHost: a\r\nContent-Length: 3\r\n\r\nabc");
        rx.clear();
        assert!(rx.is_pristine());
        let mut cursor = 0;
        assert_eq!(
            rx.receive(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n", &mut cursor)
                .unwrap(),
            RxStatus::Headers
        );
    }

    // ------------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------------

    fn run_response(input: &[u8]) -> (ResponseReceiver, Vec<RxStatus>) {
        let mut rx = ResponseReceiver::new(ParserLimits::default());
        let statuses = collect_statuses(|buf, cursor| rx.receive(buf, cursor), input);
        (rx, statuses)
    }

    #[test]
    fn sized_response() {
        let (rx, statuses) = run_response(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
        assert_eq!(rx.head().unwrap().status().as_u16(), 200);
        assert_eq!(rx.body(), b"hello");
    }

    #[test]
    fn response_fragmented_across_feeds() {
        let mut rx = ResponseReceiver::new(ParserLimits::default());

        let mut cursor = 0;
        assert_eq!(
            rx.receive(b"HTTP/1.1 200 OK\r\nContent-Len", &mut cursor).unwrap(),
            RxStatus::Incomplete
        );

        let mut cursor = 0;
        assert_eq!(
            rx.receive(b"gth: 5\r\n\r\nhel", &mut cursor).unwrap(),
            RxStatus::Headers
        );
        assert_eq!(
            rx.receive(b"gth: 5\r\n\r\nhel", &mut cursor).unwrap(),
            RxStatus::Incomplete
        );

        let mut cursor = 0;
        assert_eq!(rx.receive(b"lo", &mut cursor).unwrap(), RxStatus::Complete);
        assert_eq!(rx.body(), b"hello");
    }

    #[test]
    fn until_close_response() {
        let mut rx = ResponseReceiver::new(ParserLimits::default());
        let input: &[u8] = b"HTTP/1.0 200 OK\r\n\r\nall the bytes";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Incomplete);
        assert!(rx.reading_until_close());

        assert_eq!(rx.finish(), Some(RxStatus::Complete));
        assert_eq!(rx.body(), b"all the bytes");
    }

    #[test]
    fn no_body_statuses() {
        for input in [
            &b"HTTP/1.1 204 No Content\r\nContent-Length: 10\r\n\r\n"[..],
            b"HTTP/1.1 304 Not Modified\r\n\r\n",
            b"HTTP/1.1 100 Continue\r\n\r\n",
        ] {
            let (rx, statuses) = run_response(input);
            assert_eq!(statuses, [RxStatus::Headers, RxStatus::Complete]);
            assert!(rx.body().is_empty());
        }
    }

    #[test]
    fn head_response_has_no_body() {
        let mut rx = ResponseReceiver::new(ParserLimits::default());
        rx.set_head_request(true);
        let input: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 123\r\n\r\n";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Complete);
        assert!(rx.body().is_empty());
    }

    #[test]
    fn chunked_response_with_trailers() {
        let mut rx = ResponseReceiver::new(ParserLimits::default());
        let input: &[u8] = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\nX-Trace: abc\r\n\r\n";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Chunk);
        assert_eq!(rx.chunk_data(), b"hello");
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Chunk);
        assert_eq!(rx.trailers().get("x-trace"), Some("abc"));
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Complete);
    }

    #[test]
    fn until_close_body_bounded() {
        let limits = ParserLimits::new().with_max_body_length(4);
        let mut rx = ResponseReceiver::new(limits);
        let input: &[u8] = b"HTTP/1.0 200 OK\r\n\r\ntoo many bytes";
        let mut cursor = 0;
        assert_eq!(rx.receive(input, &mut cursor).unwrap(), RxStatus::Headers);
        let err = rx.receive(input, &mut cursor).unwrap_err();
        assert_eq!(err, ParseError::BodyTooLarge);
    }
}
