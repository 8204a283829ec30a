//! Parser limits and connection configuration.
//!
//! Every growable structure in the engine is bounded by one of these
//! values; exceeding a bound is a parse error, never an allocation
//! failure. Limits are fixed at construction.

/// Bounds applied while parsing a message.
#[derive(Debug, Clone)]
pub struct ParserLimits {
    strict_crlf: bool,
    max_whitespace: usize,
    max_line_length: usize,
    max_header_number: usize,
    max_header_length: u64,
    max_body_length: u64,
    max_chunk_size: u64,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            strict_crlf: false,
            max_whitespace: 8,
            max_line_length: 8 * 1024, // covers long request targets
            max_header_number: 100,
            max_header_length: 64 * 1024,
            max_body_length: 1024 * 1024,
            max_chunk_size: 1024 * 1024,
        }
    }
}

impl ParserLimits {
    /// Create limits with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject bare LF as a line terminator.
    #[must_use]
    pub fn with_strict_crlf(mut self, strict: bool) -> Self {
        self.strict_crlf = strict;
        self
    }

    /// Maximum consecutive whitespace bytes within a line (clamped to 1–254).
    #[must_use]
    pub fn with_max_whitespace(mut self, max: usize) -> Self {
        self.max_whitespace = max.clamp(1, 254);
        self
    }

    /// Maximum bytes in any single header or start line (clamped to ≤ 65534).
    #[must_use]
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max.clamp(1, 65534);
        self
    }

    /// Maximum distinct header fields per message (clamped to ≤ 65534).
    #[must_use]
    pub fn with_max_header_number(mut self, max: usize) -> Self {
        self.max_header_number = max.clamp(1, 65534);
        self
    }

    /// Maximum cumulative header bytes (clamped to ≤ `u32::MAX`).
    #[must_use]
    pub fn with_max_header_length(mut self, max: u64) -> Self {
        self.max_header_length = max.min(u64::from(u32::MAX));
        self
    }

    /// Maximum body bytes, whether sized or chunked.
    #[must_use]
    pub fn with_max_body_length(mut self, max: u64) -> Self {
        self.max_body_length = max;
        self
    }

    /// Maximum size of a single chunk.
    #[must_use]
    pub fn with_max_chunk_size(mut self, max: u64) -> Self {
        self.max_chunk_size = max;
        self
    }

    /// Whether bare LF is rejected.
    #[must_use]
    pub fn strict_crlf(&self) -> bool {
        self.strict_crlf
    }

    /// Maximum consecutive whitespace bytes.
    #[must_use]
    pub fn max_whitespace(&self) -> usize {
        self.max_whitespace
    }

    /// Maximum line length in bytes.
    #[must_use]
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Maximum number of distinct header fields.
    #[must_use]
    pub fn max_header_number(&self) -> usize {
        self.max_header_number
    }

    /// Maximum cumulative header bytes.
    #[must_use]
    pub fn max_header_length(&self) -> u64 {
        self.max_header_length
    }

    /// Maximum body length in bytes.
    #[must_use]
    pub fn max_body_length(&self) -> u64 {
        self.max_body_length
    }

    /// Maximum single chunk size in bytes.
    #[must_use]
    pub fn max_chunk_size(&self) -> u64 {
        self.max_chunk_size
    }
}

/// Server-side connection options on top of [`ParserLimits`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    limits: ParserLimits,
    require_host: bool,
    translate_head: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionConfig {
    /// Create a configuration with default limits, Host enforcement and
    /// HEAD translation enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: ParserLimits::default(),
            require_host: true,
            translate_head: true,
        }
    }

    /// Replace the parser limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Require a `Host` header on HTTP/1.1 requests.
    #[must_use]
    pub fn with_require_host(mut self, require: bool) -> Self {
        self.require_host = require;
        self
    }

    /// Suppress body bytes on responses to HEAD requests.
    #[must_use]
    pub fn with_translate_head(mut self, translate: bool) -> Self {
        self.translate_head = translate;
        self
    }

    /// The parser limits.
    #[must_use]
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Whether HTTP/1.1 requests must carry `Host`.
    #[must_use]
    pub fn require_host(&self) -> bool {
        self.require_host
    }

    /// Whether HEAD responses have their body suppressed.
    #[must_use]
    pub fn translate_head(&self) -> bool {
        self.translate_head
    }
}
