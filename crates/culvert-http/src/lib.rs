//! Incremental HTTP/1.x protocol engine.
//!
//! This crate parses and encodes HTTP/1.0 and HTTP/1.1 requests,
//! responses, headers, and chunked bodies without performing any I/O.
//! Bytes go in through [`ServerConnection::feed`] /
//! [`ClientConnection::feed`], typed [`Event`]s come out through a
//! sink, and outbound wire bytes are drained with `take_output`. The
//! engine can be driven by a blocking socket loop, an async reactor,
//! or a test harness feeding one byte at a time.
//!
//! # Layers
//!
//! - [`chars`] — byte classifiers and decimal/hex parsing
//! - [`FieldLineParser`] — one `name: value` line
//! - [`HeadersParser`] — a header or trailer block
//! - [`RequestLineParser`] / [`StatusLineParser`] / [`ChunkHeadParser`]
//! - [`RequestReceiver`] / [`ResponseReceiver`] — whole messages
//! - [`RequestEncoder`] / [`ResponseEncoder`] / [`ChunkEncoder`]
//! - [`ServerConnection`] / [`ClientConnection`] — per-connection driver
//!
//! All parsers are restartable at any buffer boundary, and every
//! growable structure is bounded by [`ParserLimits`].
//!
//! # Example
//!
//! ```
//! use culvert_http::{ConnectionConfig, ServerConnection};
//!
//! let mut conn = ServerConnection::new(ConnectionConfig::new());
//! let mut events = Vec::new();
//! conn.feed(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n", &mut |event| {
//!     events.push(format!("{event:?}"));
//! });
//! assert_eq!(events.len(), 2); // head, completion
//! ```

#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]

pub mod chars;
mod client;
mod connection;
mod error;
mod field;
mod headers;
mod limits;
mod line;
mod rx;
mod tx;

pub use client::ClientConnection;
pub use connection::{Event, ServerConnection, CONTINUE_RESPONSE};
pub use error::{ParseError, ProtocolError};
pub use field::FieldLineParser;
pub use headers::HeadersParser;
pub use limits::{ConnectionConfig, ParserLimits};
pub use line::{ChunkHead, ChunkHeadParser, RequestLineParser, StatusLineParser};
pub use rx::{RequestReceiver, ResponseReceiver, RxStatus};
pub use tx::{ChunkEncoder, RequestEncoder, ResponseEncoder};
