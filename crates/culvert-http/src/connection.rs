//! Server-side connection state machine.
//!
//! [`ServerConnection`] owns one [`RequestReceiver`] and an outbound
//! byte queue, turning fed transport bytes into a stream of [`Event`]s
//! and application responses into wire bytes. It performs no I/O: the
//! transport feeds it buffers and drains [`take_output`].
//!
//! [`take_output`]: ServerConnection::take_output
//!
//! Events for one connection arrive in strict order: the head event,
//! then body or chunk events, then [`Event::MessageComplete`]. Any
//! parse error is fatal; the connection refuses further input and the
//! caller is expected to flush the outbound queue and close.

use log::{debug, trace};

use culvert_core::{Headers, Method, RequestHead, ResponseHead, StatusCode};

use crate::error::{ParseError, ProtocolError};
use crate::limits::ConnectionConfig;
use crate::line::ChunkHead;
use crate::rx::{RequestReceiver, RxStatus};
use crate::tx::{ChunkEncoder, ResponseEncoder};

/// The interim response released by [`ServerConnection::continue_response`].
pub const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Everything a connection can tell its owner.
///
/// Borrowed payloads are valid only for the duration of the sink call;
/// callers that need them longer copy them out.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A request head was received (server side).
    RequestHeaders(&'a RequestHead),
    /// A response head was received (client side).
    ResponseHeaders(&'a ResponseHead),
    /// The complete body of a sized or until-close message.
    Body(&'a [u8]),
    /// One chunk of a chunked body; the last chunk carries trailers.
    Chunk {
        /// The parsed chunk header.
        head: &'a ChunkHead,
        /// The chunk payload.
        data: &'a [u8],
        /// Trailer headers, present on the last chunk only.
        trailers: Option<&'a Headers>,
    },
    /// The current message is complete.
    MessageComplete,
    /// The peer asked for `100 Continue` before sending its body.
    ExpectContinue,
    /// The inbound byte stream violated the grammar or a limit.
    ParseError(ParseError),
    /// A well-formed message violated protocol policy.
    ProtocolError(ProtocolError),
    /// The transport reached EOF.
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Open,
    // Current exchange will be the last; close once output drains.
    Closing,
    // A parse or protocol error latched; inbound bytes are refused.
    Invalid,
    Closed,
}

/// Per-connection server driver.
pub struct ServerConnection {
    config: ConnectionConfig,
    rx: RequestReceiver,
    buffer: Vec<u8>,
    output: Vec<u8>,
    keep_alive: bool,
    continue_announced: bool,
    head_request: bool,
    error_status: Option<StatusCode>,
    state: ConnState,
}

impl ServerConnection {
    /// Create a connection driver.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        let rx = RequestReceiver::new(config.limits().clone());
        Self {
            config,
            rx,
            buffer: Vec::new(),
            output: Vec::new(),
            keep_alive: true,
            continue_announced: false,
            head_request: false,
            error_status: None,
            state: ConnState::Open,
        }
    }

    /// Feed transport bytes and emit the resulting events.
    pub fn feed(&mut self, bytes: &[u8], sink: &mut impl FnMut(Event<'_>)) {
        if self.state != ConnState::Open {
            debug!("dropping {} bytes fed to a finished connection", bytes.len());
            return;
        }
        trace!("feed: {} bytes", bytes.len());
        self.buffer.extend_from_slice(bytes);
        self.drive(sink);
    }

    /// The transport read side closed.
    pub fn eof(&mut self, sink: &mut impl FnMut(Event<'_>)) {
        if self.state == ConnState::Closed {
            return;
        }
        if !self.rx.is_pristine() && !matches!(self.state, ConnState::Invalid) {
            debug!("eof mid-message; discarding partial request");
        }
        self.state = ConnState::Closed;
        sink(Event::Disconnect);
    }

    /// Grant the pending `Expect: 100-continue`, queue the interim
    /// response, and resume reading the body.
    pub fn continue_response(&mut self, sink: &mut impl FnMut(Event<'_>)) {
        if !self.rx.awaiting_continue() {
            debug!("continue_response with no pending expectation");
            sink(Event::ProtocolError(ProtocolError::ExpectContinueConflict));
            return;
        }
        self.output.extend_from_slice(CONTINUE_RESPONSE);
        self.rx.allow_continue();
        self.drive(sink);
    }

    /// Queue a response for transmission.
    ///
    /// When `translate_head` is configured and the request being
    /// answered was HEAD, the body bytes are suppressed while the
    /// framing headers stay.
    pub fn send_response(&mut self, response: &ResponseEncoder) {
        let bytes = if self.head_request && self.config.translate_head() {
            response.encode_head()
        } else {
            response.encode()
        };
        trace!("queueing {} response bytes", bytes.len());
        self.output.extend_from_slice(&bytes);
        if response.closes_connection() && self.state == ConnState::Open {
            self.keep_alive = false;
            self.state = ConnState::Closing;
        }
    }

    /// Queue one chunk of a chunked response body.
    pub fn send_chunk(&mut self, data: &[u8]) {
        if self.head_request && self.config.translate_head() {
            return;
        }
        self.output.extend_from_slice(&ChunkEncoder::chunk(data));
    }

    /// Queue the terminating chunk, with optional trailers.
    ///
    /// # Errors
    ///
    /// Rejects trailer fields that would split the message.
    pub fn send_last_chunk(&mut self, trailers: &Headers) -> Result<(), ParseError> {
        let frame = ChunkEncoder::last(trailers)?;
        if !(self.head_request && self.config.translate_head()) {
            self.output.extend_from_slice(&frame);
        }
        Ok(())
    }

    /// Take the queued outbound bytes for transmission.
    #[must_use]
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// True if outbound bytes are waiting.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// True once the connection should be closed after the outbound
    /// queue drains.
    #[must_use]
    pub fn should_close(&self) -> bool {
        matches!(
            self.state,
            ConnState::Closing | ConnState::Invalid | ConnState::Closed
        )
    }

    /// The response status suggested for the error that invalidated the
    /// connection, if any.
    #[must_use]
    pub fn error_status(&self) -> Option<StatusCode> {
        self.error_status
    }

    fn drive(&mut self, sink: &mut impl FnMut(Event<'_>)) {
        let mut cursor = 0;
        loop {
            match self.rx.receive(&self.buffer, &mut cursor) {
                Err(error) => {
                    debug!("parse error: {error}");
                    // A request target that blew the line limit is a URI
                    // problem, not a header problem.
                    self.error_status = Some(
                        if error == ParseError::LineTooLong && self.rx.failed_in_start_line() {
                            StatusCode::URI_TOO_LONG
                        } else {
                            error.suggested_status()
                        },
                    );
                    self.keep_alive = false;
                    self.state = ConnState::Invalid;
                    sink(Event::ParseError(error));
                    break;
                }
                Ok(RxStatus::Incomplete) => break,
                Ok(RxStatus::Headers) => {
                    let head = self.rx.head().expect("head available after Headers");
                    trace!(
                        "request head: {} {}",
                        head.method(),
                        String::from_utf8_lossy(head.target())
                    );
                    if self.config.require_host()
                        && head.version().is_http11()
                        && !head.headers().contains("host")
                    {
                        self.error_status = Some(ProtocolError::MissingHost.suggested_status());
                        self.keep_alive = false;
                        self.state = ConnState::Invalid;
                        sink(Event::ProtocolError(ProtocolError::MissingHost));
                        break;
                    }
                    self.keep_alive = head.is_keep_alive();
                    self.head_request = matches!(head.method(), Method::Head);
                    sink(Event::RequestHeaders(head));
                }
                Ok(RxStatus::ExpectContinue) => {
                    if !self.continue_announced {
                        self.continue_announced = true;
                        sink(Event::ExpectContinue);
                    }
                    break;
                }
                Ok(RxStatus::Chunk) => {
                    let head = self.rx.chunk().expect("chunk available after Chunk");
                    let trailers = if head.is_last() {
                        Some(self.rx.trailers())
                    } else {
                        None
                    };
                    sink(Event::Chunk {
                        head,
                        data: self.rx.chunk_data(),
                        trailers,
                    });
                }
                Ok(RxStatus::Complete) => {
                    if !self.rx.body().is_empty() {
                        sink(Event::Body(self.rx.body()));
                    }
                    sink(Event::MessageComplete);
                    if self.keep_alive {
                        trace!("keep-alive: recycling receiver");
                        self.rx.clear();
                        self.continue_announced = false;
                    } else {
                        self.state = ConnState::Closing;
                        break;
                    }
                }
            }
        }
        self.buffer.drain(..cursor);
    }
}

impl std::fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConnection")
            .field("state", &self.state)
            .field("keep_alive", &self.keep_alive)
            .field("buffered", &self.buffer.len())
            .field("queued_output", &self.output.len())
            .finish_non_exhaustive()
    }
}
