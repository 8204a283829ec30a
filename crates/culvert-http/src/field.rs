//! Incremental parser for a single header field line.
//!
//! Consumes one byte at a time and can stop and resume at any buffer
//! boundary, including in the middle of the CRLF or of an obs-fold
//! continuation decision. Field names are lowercased as they arrive;
//! values keep their received case and are trimmed of surrounding
//! whitespace when the line completes.

use crate::chars::is_space_or_tab;
use crate::error::ParseError;
use crate::limits::ParserLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Name,
    ValueLeadingWs,
    Value,
    Lf,
    // Line terminator seen; the next byte decides whether an obs-fold
    // continuation follows.
    Fold,
    Valid,
}

/// Parser for one `name: value` line.
#[derive(Debug)]
pub struct FieldLineParser {
    name: String,
    value: Vec<u8>,
    length: usize,
    ws_count: usize,
    state: FieldState,
}

impl Default for FieldLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldLineParser {
    /// Create a parser in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            value: Vec::new(),
            length: 0,
            ws_count: 0,
            state: FieldState::Name,
        }
    }

    /// Reset to the initial state, keeping allocations.
    pub fn clear(&mut self) {
        self.name.clear();
        self.value.clear();
        self.length = 0;
        self.ws_count = 0;
        self.state = FieldState::Name;
    }

    /// True if no byte has been consumed since the last `clear`.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.length == 0
    }

    /// Consume bytes from `buf` starting at `*cursor`.
    ///
    /// Advances the cursor past every byte it reads. Returns `Ok(true)`
    /// when a complete field line (including any folded continuation)
    /// has been read, `Ok(false)` when more input is needed.
    pub fn parse(
        &mut self,
        limits: &ParserLimits,
        buf: &[u8],
        cursor: &mut usize,
    ) -> Result<bool, ParseError> {
        while self.state != FieldState::Valid {
            if self.state == FieldState::Fold {
                // Peek without consuming: the whitespace byte (if any)
                // belongs to the continuation line.
                let Some(&next) = buf.get(*cursor) else {
                    return Ok(false);
                };
                if is_space_or_tab(next) {
                    self.value.push(b' ');
                    self.state = FieldState::ValueLeadingWs;
                } else {
                    self.state = FieldState::Valid;
                }
                continue;
            }

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
            FieldState::Name => {
                if byte.is_ascii_alphabetic() || byte == b'-' {
                    self.name.push(byte.to_ascii_lowercase() as char);
                } else if byte == b':' && !self.name.is_empty() {
                    self.state = FieldState::ValueLeadingWs;
                } else {
                    return Err(ParseError::MalformedHeader);
                }
            }
            FieldState::ValueLeadingWs => {
                if is_space_or_tab(byte) {
                    self.ws_count += 1;
                    if self.ws_count > limits.max_whitespace() {
                        return Err(ParseError::WhitespaceTooLong);
                    }
                } else {
                    self.state = FieldState::Value;
                    self.value_byte(limits, byte)?;
                }
            }
            FieldState::Value => self.value_byte(limits, byte)?,
            FieldState::Lf => {
                if byte == b'\n' {
                    self.state = FieldState::Fold;
                } else {
                    return Err(ParseError::InvalidCrlf);
                }
            }
            FieldState::Fold | FieldState::Valid => unreachable!("handled by parse loop"),
        }
        Ok(())
    }

    fn value_byte(&mut self, limits: &ParserLimits, byte: u8) -> Result<(), ParseError> {
        match byte {
            b'\r' => self.state = FieldState::Lf,
            b'\n' => {
                if limits.strict_crlf() {
                    return Err(ParseError::InvalidCrlf);
                }
                self.state = FieldState::Fold;
            }
            other => self.value.push(other),
        }
        Ok(())
    }

    /// Take the parsed name and value, leaving the parser ready for
    /// `clear`. The value is trimmed of trailing whitespace; leading
    /// whitespace was never stored.
    #[must_use]
    pub fn take(&mut self) -> (String, String) {
        let mut end = self.value.len();
        while end > 0 && is_space_or_tab(self.value[end - 1]) {
            end -= 1;
        }
        self.value.truncate(end);
        let name = std::mem::take(&mut self.name);
        let value = String::from_utf8_lossy(&self.value).into_owned();
        self.value.clear();
        (name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8]) -> Result<Option<(String, String)>, ParseError> {
        let limits = ParserLimits::default();
        let mut parser = FieldLineParser::new();
        let mut cursor = 0;
        if parser.parse(&limits, input, &mut cursor)? {
            Ok(Some(parser.take()))
        } else {
            Ok(None)
        }
    }

    #[test]
    fn simple_field() {
        let (name, value) = parse_all(b"Host: example.com\r\nX").unwrap().unwrap();
        assert_eq!(name, "host");
        assert_eq!(value, "example.com");
    }

    #[test]
    fn name_is_lowercased_value_case_kept() {
        let (name, value) = parse_all(b"Content-Type: Text/HTML\r\nX").unwrap().unwrap();
        assert_eq!(name, "content-type");
        assert_eq!(value, "Text/HTML");
    }

    #[test]
    fn leading_and_trailing_whitespace_trimmed() {
        let (_, value) = parse_all(b"a:   spaced out  \r\nX").unwrap().unwrap();
        assert_eq!(value, "spaced out");
    }

    #[test]
    fn bare_lf_accepted_when_lenient() {
        let (name, value) = parse_all(b"a: b\nX").unwrap().unwrap();
        assert_eq!(name, "a");
        assert_eq!(value, "b");
    }

    #[test]
    fn bare_lf_rejected_when_strict() {
        let limits = ParserLimits::new().with_strict_crlf(true);
        let mut parser = FieldLineParser::new();
        let mut cursor = 0;
        let err = parser.parse(&limits, b"a: b\nX", &mut cursor).unwrap_err();
        assert_eq!(err, ParseError::InvalidCrlf);
    }

    #[test]
    fn cr_without_lf_rejected() {
        assert_eq!(parse_all(b"a: b\rX"), Err(ParseError::InvalidCrlf));
    }

    #[test]
    fn empty_name_rejected() {
        assert_eq!(parse_all(b": b\r\nX"), Err(ParseError::MalformedHeader));
    }

    #[test]
    fn non_token_name_rejected() {
        assert_eq!(parse_all(b"a b: c\r\nX"), Err(ParseError::MalformedHeader));
    }

    #[test]
    fn folded_value_normalized_to_single_space() {
        let (name, value) = parse_all(b"a: one\r\n  two\r\nX").unwrap().unwrap();
        assert_eq!(name, "a");
        assert_eq!(value, "one two");
    }

    #[test]
    fn fold_decision_survives_buffer_cut() {
        let limits = ParserLimits::default();
        let mut parser = FieldLineParser::new();

        let mut cursor = 0;
        assert!(!parser.parse(&limits, b"a: one\r\n", &mut cursor).unwrap());

        let mut cursor = 0;
        assert!(parser.parse(&limits, b" two\r\nX", &mut cursor).unwrap());
        let (_, value) = parser.take();
        assert_eq!(value, "one two");
    }

    #[test]
    fn line_length_limit() {
        let limits = ParserLimits::new().with_max_line_length(10);
        let mut parser = FieldLineParser::new();
        let mut cursor = 0;
        let err = parser
            .parse(&limits, b"abcdefgh: too long\r\n", &mut cursor)
            .unwrap_err();
        assert_eq!(err, ParseError::LineTooLong);
    }

    #[test]
    fn whitespace_limit() {
        let limits = ParserLimits::new().with_max_whitespace(2);
        let mut parser = FieldLineParser::new();
        let mut cursor = 0;
        let err = parser.parse(&limits, b"a:    b\r\n", &mut cursor).unwrap_err();
        assert_eq!(err, ParseError::WhitespaceTooLong);
    }

    #[test]
    fn resumes_mid_name_and_mid_crlf() {
        let limits = ParserLimits::default();
        let mut parser = FieldLineParser::new();
        for piece in [&b"Ho"[..], b"st", b": exam", b"ple\r", b"\n", b"X"] {
            let mut cursor = 0;
            if parser.parse(&limits, piece, &mut cursor).unwrap() {
                break;
            }
        }
        let (name, value) = parser.take();
        assert_eq!(name, "host");
        assert_eq!(value, "example");
    }
}
