//! HTTP header collection.
//!
//! Header names are stored ASCII-lowercased; values keep the case they
//! were received in, trimmed of leading and trailing whitespace. A
//! duplicate name merges into the existing value with a `,` separator,
//! or `;` for cookie headers (RFC 6265 pairs are `;`-joined).

use std::collections::HashMap;

/// Case-insensitive header name → value mapping.
///
/// Insertion order is not preserved; HTTP header semantics do not
/// require it once duplicates have been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header field, merging duplicates.
    ///
    /// The name is lowercased for storage. A repeated name appends to
    /// the stored value: `,`-separated, or `;`-separated when the name
    /// contains `cookie`.
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.fields.get_mut(&name) {
            Some(existing) => {
                let separator = if name.contains("cookie") { ';' } else { ',' };
                existing.push(separator);
                existing.push_str(&value);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    /// Replace a header field, discarding any previous value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.fields.get(&name.to_ascii_lowercase()).map(String::as_str);
        }
        self.fields.get(name).map(String::as_str)
    }

    /// Check whether a header is present (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&name.to_ascii_lowercase())
    }

    /// Iterate over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop all fields.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// The value of `Content-Length`, if present and well-formed.
    ///
    /// `None` means the header is absent or not a plain decimal; the
    /// wire parsers reject malformed values before a message head is
    /// ever surfaced, so on received messages this is `None` only for
    /// genuine absence.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        let value = self.get("content-length")?;
        let value = value.trim();
        if value.is_empty() || value.bytes().any(|b| !b.is_ascii_digit()) {
            return None;
        }
        value.parse().ok()
    }

    /// Whether chunked transfer coding applies.
    ///
    /// True if `Transfer-Encoding` is present and, lowercased, does not
    /// contain `identity` (RFC 2616 §4.4: any non-identity coding means
    /// the body is delimited by chunked framing).
    #[must_use]
    pub fn is_chunked(&self) -> bool {
        match self.get("transfer-encoding") {
            Some(value) => !value.to_ascii_lowercase().contains("identity"),
            None => false,
        }
    }

    /// Whether `Connection` asks to close after this message.
    #[must_use]
    pub fn close_connection(&self) -> bool {
        match self.get("connection") {
            Some(value) => value.to_ascii_lowercase().contains("close"),
            None => false,
        }
    }

    /// Whether `Connection` asks to keep an HTTP/1.0 connection open.
    #[must_use]
    pub fn keep_alive(&self) -> bool {
        match self.get("connection") {
            Some(value) => value.to_ascii_lowercase().contains("keep-alive"),
            None => false,
        }
    }

    /// Whether the client expects a `100 Continue` interim response.
    #[must_use]
    pub fn expect_continue(&self) -> bool {
        match self.get("expect") {
            Some(value) => value.to_ascii_lowercase().contains("100-continue"),
            None => false,
        }
    }
}

/// Detect an embedded blank line in header text.
///
/// Returns true iff the text contains `\n\n` or `\n\r\n` — the
/// sequences that would terminate a header block early and let an
/// attacker smuggle a second message. Encoder output is checked with
/// this before anything reaches the wire.
#[must_use]
pub fn are_headers_split(headers: &str) -> bool {
    let mut prev = b'\0';
    let mut prev2 = b'\0';
    for byte in headers.bytes() {
        if byte == b'\n' {
            if prev == b'\n' {
                return true;
            }
            if prev == b'\r' && prev2 == b'\n' {
                return true;
            }
        }
        prev2 = prev;
        prev = byte;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Host", "example.com");
        assert_eq!(headers.get("host"), Some("example.com"));
        assert_eq!(headers.get("HOST"), Some("example.com"));
        assert_eq!(headers.get("Host"), Some("example.com"));
        assert!(headers.get("content-length").is_none());
    }

    #[test]
    fn duplicate_names_merge_with_comma() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/html");
        headers.add("accept", "application/json");
        assert_eq!(headers.get("accept"), Some("text/html,application/json"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn cookie_names_merge_with_semicolon() {
        let mut headers = Headers::new();
        headers.add("Cookie", "a=1");
        headers.add("Cookie", "b=2");
        assert_eq!(headers.get("cookie"), Some("a=1;b=2"));

        let mut headers = Headers::new();
        headers.add("Set-Cookie", "x=1");
        headers.add("Set-Cookie", "y=2");
        assert_eq!(headers.get("set-cookie"), Some("x=1;y=2"));
    }

    #[test]
    fn set_replaces() {
        let mut headers = Headers::new();
        headers.add("x-trace", "one");
        headers.set("X-Trace", "two");
        assert_eq!(headers.get("x-trace"), Some("two"));
    }

    #[test]
    fn content_length_absent_vs_present() {
        let mut headers = Headers::new();
        assert_eq!(headers.content_length(), None);

        headers.set("content-length", "0");
        assert_eq!(headers.content_length(), Some(0));

        headers.set("content-length", "1234");
        assert_eq!(headers.content_length(), Some(1234));

        headers.set("content-length", "12x4");
        assert_eq!(headers.content_length(), None);

        headers.set("content-length", "-5");
        assert_eq!(headers.content_length(), None);
    }

    #[test]
    fn chunked_identity_rule() {
        let mut headers = Headers::new();
        assert!(!headers.is_chunked());

        headers.set("transfer-encoding", "chunked");
        assert!(headers.is_chunked());

        headers.set("transfer-encoding", "Chunked");
        assert!(headers.is_chunked());

        headers.set("transfer-encoding", "identity");
        assert!(!headers.is_chunked());

        headers.set("transfer-encoding", "gzip, chunked");
        assert!(headers.is_chunked());
    }

    #[test]
    fn connection_probes() {
        let mut headers = Headers::new();
        assert!(!headers.close_connection());
        assert!(!headers.keep_alive());

        headers.set("connection", "Close");
        assert!(headers.close_connection());

        headers.set("connection", "Keep-Alive");
        assert!(headers.keep_alive());
        assert!(!headers.close_connection());
    }

    #[test]
    fn expect_continue_probe() {
        let mut headers = Headers::new();
        assert!(!headers.expect_continue());
        headers.set("expect", "100-Continue");
        assert!(headers.expect_continue());
    }

    #[test]
    fn split_detection() {
        assert!(!are_headers_split(""));
        assert!(!are_headers_split("Host: a\r\n"));
        assert!(!are_headers_split("Host: a\r\nAccept: b\r\n"));
        assert!(are_headers_split("Host: a\n\nGET /evil HTTP/1.1"));
        assert!(are_headers_split("Host: a\n\r\nGET /evil HTTP/1.1"));
        assert!(are_headers_split("a\r\n\r\nb"));
    }
}
