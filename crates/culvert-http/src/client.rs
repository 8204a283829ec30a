//! Client-side connection state machine.
//!
//! [`ClientConnection`] mirrors the server driver: requests are encoded
//! into the outbound queue, response bytes are fed in, and events come
//! out through the same [`Event`] sink. Responses to HEAD requests and
//! interim `1xx` responses are framed correctly without application
//! involvement.

use std::collections::VecDeque;

use log::{debug, trace};

use culvert_core::{Headers, Method, StatusCode};

use crate::connection::Event;
use crate::error::ParseError;
use crate::limits::ParserLimits;
use crate::rx::{ResponseReceiver, RxStatus};
use crate::tx::{ChunkEncoder, RequestEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Open,
    Closing,
    Invalid,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct SentRequest {
    is_head: bool,
    wants_close: bool,
}

/// Per-connection client driver.
pub struct ClientConnection {
    rx: ResponseReceiver,
    buffer: Vec<u8>,
    output: Vec<u8>,
    sent: VecDeque<SentRequest>,
    state: ConnState,
}

impl ClientConnection {
    /// Create a connection driver.
    #[must_use]
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            rx: ResponseReceiver::new(limits),
            buffer: Vec::new(),
            output: Vec::new(),
            sent: VecDeque::new(),
            state: ConnState::Open,
        }
    }

    /// Queue a request for transmission.
    pub fn send_request(&mut self, request: &RequestEncoder) {
        let bytes = request.encode();
        trace!("queueing {} request bytes", bytes.len());
        self.output.extend_from_slice(&bytes);
        self.sent.push_back(SentRequest {
            is_head: matches!(request.method(), Method::Head),
            wants_close: request.closes_connection(),
        });
    }

    /// Queue one chunk of a chunked request body.
    pub fn send_chunk(&mut self, data: &[u8]) {
        self.output.extend_from_slice(&ChunkEncoder::chunk(data));
    }

    /// Queue the terminating chunk of a chunked request body.
    ///
    /// # Errors
    ///
    /// Rejects trailer fields that would split the message.
    pub fn send_last_chunk(&mut self, trailers: &Headers) -> Result<(), ParseError> {
        let frame = ChunkEncoder::last(trailers)?;
        self.output.extend_from_slice(&frame);
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
    ///
    /// Completes an until-close response body first, then reports the
    /// disconnect.
    pub fn eof(&mut self, sink: &mut impl FnMut(Event<'_>)) {
        if self.state == ConnState::Closed {
            return;
        }
        if self.rx.finish() == Some(RxStatus::Complete) {
            if !self.rx.body().is_empty() {
                sink(Event::Body(self.rx.body()));
            }
            sink(Event::MessageComplete);
        } else if !self.rx.is_pristine() && self.state != ConnState::Invalid {
            debug!("eof mid-response; discarding partial message");
        }
        self.state = ConnState::Closed;
        sink(Event::Disconnect);
    }

    fn drive(&mut self, sink: &mut impl FnMut(Event<'_>)) {
        let mut cursor = 0;
        loop {
            if self.rx.is_pristine() {
                let is_head = self.sent.front().is_some_and(|sent| sent.is_head);
                self.rx.set_head_request(is_head);
            }
            match self.rx.receive(&self.buffer, &mut cursor) {
                Err(error) => {
                    debug!("parse error: {error}");
                    self.state = ConnState::Invalid;
                    sink(Event::ParseError(error));
                    break;
                }
                Ok(RxStatus::Incomplete) => break,
                Ok(RxStatus::Headers) => {
                    let head = self.rx.head().expect("head available after Headers");
                    trace!("response head: {}", head.status());
                    sink(Event::ResponseHeaders(head));
                }
                Ok(RxStatus::ExpectContinue) => {
                    unreachable!("response receivers have no continue gate")
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
                    let status = self
                        .rx
                        .head()
                        .map(culvert_core::ResponseHead::status)
                        .expect("head available at completion");
                    if status.is_informational() && status != StatusCode::SWITCHING_PROTOCOLS {
                        // Interim response: the real one is still coming.
                        trace!("interim {status} response; continuing");
                        self.rx.clear();
                        continue;
                    }

                    if !self.rx.body().is_empty() {
                        sink(Event::Body(self.rx.body()));
                    }
                    sink(Event::MessageComplete);

                    let sent = self.sent.pop_front();
                    let response_keep_alive = self
                        .rx
                        .head()
                        .is_some_and(culvert_core::ResponseHead::is_keep_alive);
                    let keep_alive = response_keep_alive
                        && !sent.is_some_and(|sent| sent.wants_close)
                        && status != StatusCode::SWITCHING_PROTOCOLS;
                    if keep_alive {
                        trace!("keep-alive: recycling receiver");
                        self.rx.clear();
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

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("state", &self.state)
            .field("in_flight", &self.sent.len())
            .field("buffered", &self.buffer.len())
            .field("queued_output", &self.output.len())
            .finish_non_exhaustive()
    }
}
