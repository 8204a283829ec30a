//! HTTP request types.

use std::fmt;

use crate::headers::Headers;

/// HTTP version as a major/minor pair.
///
/// HTTP/1.0 and HTTP/1.1 are the versions this engine speaks; parsers
/// additionally tolerate 0.9 and 2.0 version digits on the wire so that
/// the caller can reject them with a meaningful status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    /// Major version digit.
    pub major: u8,
    /// Minor version digit.
    pub minor: u8,
}

impl HttpVersion {
    /// HTTP/1.0
    pub const HTTP_1_0: Self = Self { major: 1, minor: 0 };
    /// HTTP/1.1
    pub const HTTP_1_1: Self = Self { major: 1, minor: 1 };

    /// Create a version from major/minor digits.
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Returns true if this is HTTP/1.1 or later.
    #[must_use]
    pub const fn is_http11(self) -> bool {
        self.major == 1 && self.minor >= 1
    }

    /// Returns true if this is HTTP/1.0.
    #[must_use]
    pub const fn is_http10(self) -> bool {
        self.major == 1 && self.minor == 0
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// HTTP request method.
///
/// The registered methods are enumerated; any other token received on a
/// request line is carried verbatim as [`Method::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
    /// PATCH method.
    Patch,
    /// OPTIONS method.
    Options,
    /// HEAD method.
    Head,
    /// TRACE method.
    Trace,
    /// CONNECT method.
    Connect,
    /// Any other token.
    Custom(String),
}

impl Method {
    /// Parse a method token.
    ///
    /// Returns `None` only for an empty token; unknown tokens become
    /// [`Method::Custom`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" => None,
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "OPTIONS" => Some(Self::Options),
            "HEAD" => Some(Self::Head),
            "TRACE" => Some(Self::Trace),
            "CONNECT" => Some(Self::Connect),
            other => Some(Self::Custom(other.to_string())),
        }
    }

    /// Return the method name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
            Self::Custom(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The head of a received or outgoing HTTP request: request line plus
/// headers. The body is carried separately by the receivers.
///
/// The request target is an opaque byte range; URI interpretation is
/// the caller's concern.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: Vec<u8>,
    version: HttpVersion,
    headers: Headers,
}

impl RequestHead {
    /// Create a request head with the default HTTP/1.1 version.
    #[must_use]
    pub fn new(method: Method, target: impl Into<Vec<u8>>) -> Self {
        Self::with_version(method, target, HttpVersion::default())
    }

    /// Create a request head with an explicit HTTP version.
    #[must_use]
    pub fn with_version(
        method: Method,
        target: impl Into<Vec<u8>>,
        version: HttpVersion,
    ) -> Self {
        Self {
            method,
            target: target.into(),
            version,
            headers: Headers::new(),
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target bytes, exactly as received.
    #[must_use]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// The request target as a string, if it is valid UTF-8.
    #[must_use]
    pub fn target_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.target).ok()
    }

    /// The HTTP version.
    #[must_use]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Whether this exchange should keep the connection open afterwards.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close`;
    /// HTTP/1.0 requires an explicit `Connection: keep-alive`.
    #[must_use]
    pub fn is_keep_alive(&self) -> bool {
        if self.headers.close_connection() {
            return false;
        }
        if self.version.is_http11() {
            true
        } else {
            self.headers.keep_alive()
        }
    }
}
