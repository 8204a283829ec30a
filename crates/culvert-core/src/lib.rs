//! Message model for the culvert HTTP/1.x engine.
//!
//! This crate holds the owned, I/O-free types that parsed messages are
//! assembled into: methods, versions, status codes, header collections,
//! and message heads. The wire-level parsers and encoders live in the
//! `culvert-http` crate; everything here is plain data.

#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]

mod headers;
mod request;
mod response;

pub use headers::{are_headers_split, Headers};
pub use request::{HttpVersion, Method, RequestHead};
pub use response::{ResponseHead, StatusCode};
