//! Strict recursive-descent parser from text to [`Value`].

use knit_value::{Object, Value};

use crate::error::{ParseError, ParseErrorKind};
use crate::{debug, trace};

/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// What to do with a backslash followed by a character that is not a known escape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UnknownEscape {
    /// Keep both the backslash and the character (`"\q"` parses to `\q`)
    #[default]
    Preserve,
    /// Fail with [`ParseErrorKind::InvalidEscape`]
    Reject,
}

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum number of nested arrays/objects (default: 512)
    pub max_depth: usize,

    /// Policy for unrecognized `\X` escapes (default: preserve)
    pub unknown_escapes: UnknownEscape,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unknown_escapes: UnknownEscape::Preserve,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the policy for unrecognized escapes.
    pub const fn unknown_escapes(mut self, policy: UnknownEscape) -> Self {
        self.unknown_escapes = policy;
        self
    }
}

/// Parse a JSON document.
///
/// ```
/// let v = knit_json::from_str(r#"{"pi": 3.14, "n": [1, 2]}"#).unwrap();
/// assert_eq!(v.get("n").and_then(|n| n.at(1)).and_then(|x| x.as_i64()), Some(2));
/// ```
pub fn from_str(input: &str) -> Result<Value, ParseError> {
    from_str_with_options(input, &ParseOptions::default())
}

/// Parse a JSON document with custom options.
pub fn from_str_with_options(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    trace!(len = input.len(), "parsing document");
    Parser::new(input, options)
        .parse_document()
        .map_err(|err| {
            debug!(%err, "parse failed");
            err.with_source(input)
        })
}

/// Parse a JSON document from bytes, which must be UTF-8.
pub fn from_slice(input: &[u8]) -> Result<Value, ParseError> {
    from_slice_with_options(input, &ParseOptions::default())
}

/// Parse a JSON document from bytes with custom options.
pub fn from_slice_with_options(input: &[u8], options: &ParseOptions) -> Result<Value, ParseError> {
    match core::str::from_utf8(input) {
        Ok(text) => from_str_with_options(text, options),
        Err(err) => {
            // the lossy copy keeps every byte before the failure in place
            let err = ParseError::at(ParseErrorKind::InvalidUtf8, input, err.valid_up_to());
            Err(err.with_source(&String::from_utf8_lossy(input)))
        }
    }
}

/// A parsed value and the offset just past it.
struct Parsed {
    value: Value,
    next: usize,
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, options: &'a ParseOptions) -> Self {
        Parser {
            text,
            bytes: text.as_bytes(),
            options,
        }
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::at(kind, self.bytes, offset)
    }

    fn eof(&self, expected: &'static str) -> ParseError {
        self.error(ParseErrorKind::UnexpectedEof { expected }, self.bytes.len())
    }

    /// The full character starting at `offset`, for error messages.
    fn char_at(&self, offset: usize) -> char {
        self.text
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn skip_whitespace(&self, mut offset: usize) -> usize {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.bytes.get(offset) {
            offset += 1;
        }
        offset
    }

    fn parse_document(&self) -> Result<Value, ParseError> {
        let Parsed { value, next } = self.parse_at(0, 0)?;
        let end = self.skip_whitespace(next);
        if end < self.bytes.len() {
            return Err(self.error(
                ParseErrorKind::TrailingCharacters(self.char_at(end)),
                end,
            ));
        }
        Ok(value)
    }

    /// Parses the value starting at or after `offset` (leading whitespace is skipped).
    fn parse_at(&self, offset: usize, depth: usize) -> Result<Parsed, ParseError> {
        let start = self.skip_whitespace(offset);
        match self.bytes.get(start) {
            None => Err(self.eof("a value")),
            Some(b'"') => {
                let (text, next) = self.parse_string(start)?;
                Ok(Parsed {
                    value: Value::String(text),
                    next,
                })
            }
            Some(b'[') => self.parse_array(start, depth),
            Some(b'{') => self.parse_object(start, depth),
            Some(b'-' | b'0'..=b'9') => self.parse_number(start),
            Some(b't') => self.parse_literal(start, "true", Value::Bool(true)),
            Some(b'f') => self.parse_literal(start, "false", Value::Bool(false)),
            Some(b'n') => self.parse_literal(start, "null", Value::Null),
            Some(b',' | b':') => Err(self.error(
                ParseErrorKind::UnexpectedSeparator(self.char_at(start)),
                start,
            )),
            Some(_) => Err(self.error(
                ParseErrorKind::UnexpectedChar(self.char_at(start)),
                start,
            )),
        }
    }

    fn parse_literal(
        &self,
        start: usize,
        word: &'static str,
        value: Value,
    ) -> Result<Parsed, ParseError> {
        for (i, expected) in word.bytes().enumerate() {
            let offset = start + i;
            match self.bytes.get(offset) {
                Some(&b) if b == expected => {}
                Some(_) => {
                    return Err(self.error(
                        ParseErrorKind::UnexpectedChar(self.char_at(offset)),
                        offset,
                    ));
                }
                None => return Err(self.eof(word)),
            }
        }
        Ok(Parsed {
            value,
            next: start + word.len(),
        })
    }

    /// Parses a quoted string whose opening quote is at `open`.
    ///
    /// Returns the unescaped text and the offset after the closing quote.
    fn parse_string(&self, open: usize) -> Result<(String, usize), ParseError> {
        let mut out = String::new();
        let mut run_start = open + 1;
        let mut i = run_start;
        loop {
            match self.bytes.get(i) {
                None => return Err(self.eof("closing '\"'")),
                Some(b'"') => {
                    self.push_run(&mut out, run_start, i)?;
                    return Ok((out, i + 1));
                }
                Some(b'\\') => {
                    self.push_run(&mut out, run_start, i)?;
                    let unescaped = match self.bytes.get(i + 1) {
                        None => return Err(self.eof("an escape character")),
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'b') => '\u{8}',
                        Some(b'f') => '\u{c}',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'u') => {
                            return Err(self.error(ParseErrorKind::UnicodeEscape, i));
                        }
                        Some(_) => match self.options.unknown_escapes {
                            UnknownEscape::Reject => {
                                return Err(self.error(
                                    ParseErrorKind::InvalidEscape(self.char_at(i + 1)),
                                    i,
                                ));
                            }
                            UnknownEscape::Preserve => {
                                // the escaped character is copied with the next run
                                self.push_char(&mut out, '\\', i)?;
                                i += 1;
                                run_start = i;
                                continue;
                            }
                        },
                    };
                    self.push_char(&mut out, unescaped, i)?;
                    i += 2;
                    run_start = i;
                }
                Some(&b @ (0x08 | 0x0c | b'\n' | b'\r' | b'\t')) => {
                    return Err(self.error(ParseErrorKind::ControlCharacter(b), i));
                }
                Some(_) => i += 1,
            }
        }
    }

    fn push_run(&self, out: &mut String, from: usize, to: usize) -> Result<(), ParseError> {
        // both ends sit on ASCII bytes, so they are char boundaries
        let run = self.text.get(from..to).unwrap_or_default();
        out.try_reserve(run.len())
            .map_err(|_| self.error(ParseErrorKind::AllocationFailure, from))?;
        out.push_str(run);
        Ok(())
    }

    fn push_char(&self, out: &mut String, c: char, at: usize) -> Result<(), ParseError> {
        out.try_reserve(c.len_utf8())
            .map_err(|_| self.error(ParseErrorKind::AllocationFailure, at))?;
        out.push(c);
        Ok(())
    }

    /// Parses a number token starting at `start`.
    ///
    /// The token runs over `-` and digits; a `.`, `e` or `E` makes it a real,
    /// after which `+` is accepted as well. Any other byte ends the token.
    fn parse_number(&self, start: usize) -> Result<Parsed, ParseError> {
        let mut end = start;
        let mut real = false;
        while let Some(&b) = self.bytes.get(end) {
            match b {
                b'-' | b'0'..=b'9' => {}
                b'.' | b'e' | b'E' => real = true,
                b'+' if real => {}
                _ => break,
            }
            end += 1;
        }
        let token = &self.text[start..end];

        let valid = if real {
            real_prefix_len(token.as_bytes())
        } else {
            integer_prefix_len(token.as_bytes())
        };
        if valid < token.len() {
            let offset = start + valid;
            return Err(self.error(
                ParseErrorKind::InvalidNumber(self.char_at(offset)),
                offset,
            ));
        }

        let out_of_range = || {
            self.error(
                ParseErrorKind::NumberOutOfRange {
                    literal: token.to_owned(),
                },
                start,
            )
        };
        let value = if real {
            match token.parse::<f64>() {
                Ok(r) if r.is_finite() => Value::Real(r),
                _ => return Err(out_of_range()),
            }
        } else {
            Value::Integer(token.parse::<i64>().map_err(|_| out_of_range())?)
        };
        Ok(Parsed { value, next: end })
    }

    fn parse_array(&self, open: usize, depth: usize) -> Result<Parsed, ParseError> {
        self.check_depth(open, depth)?;
        let mut items = Vec::new();
        // true while a value is allowed: at the start and after a comma
        let mut ready = true;
        let mut after_comma = false;
        let mut i = open + 1;
        loop {
            i = self.skip_whitespace(i);
            match self.bytes.get(i) {
                None => return Err(self.eof("']'")),
                Some(b']') => {
                    if after_comma {
                        return Err(self.error(ParseErrorKind::TrailingComma, i));
                    }
                    return Ok(Parsed {
                        value: Value::Array(items),
                        next: i + 1,
                    });
                }
                Some(b'}') => {
                    return Err(self.error(
                        ParseErrorKind::WrongBracket {
                            expected: ']',
                            found: '}',
                        },
                        i,
                    ));
                }
                Some(b',') if !ready => {
                    ready = true;
                    after_comma = true;
                    i += 1;
                }
                Some(b',' | b':') => {
                    return Err(self.error(
                        ParseErrorKind::UnexpectedSeparator(self.char_at(i)),
                        i,
                    ));
                }
                Some(_) if !ready => {
                    return Err(self.error(
                        ParseErrorKind::ExpectedSeparator {
                            found: self.char_at(i),
                            close: ']',
                        },
                        i,
                    ));
                }
                Some(_) => {
                    let parsed = self.parse_at(i, depth + 1).inspect_err(|_| {
                        trace!(discarded = items.len(), "dropping partial array");
                    })?;
                    items
                        .try_reserve(1)
                        .map_err(|_| self.error(ParseErrorKind::AllocationFailure, i))?;
                    items.push(parsed.value);
                    ready = false;
                    after_comma = false;
                    i = parsed.next;
                }
            }
        }
    }

    fn parse_object(&self, open: usize, depth: usize) -> Result<Parsed, ParseError> {
        self.check_depth(open, depth)?;
        let mut object = Object::new();
        // a key waiting for its value
        let mut pending_key: Option<String> = None;
        // with no pending key: a key is allowed; with one: its value is allowed
        let mut ready = true;
        let mut after_comma = false;
        let mut i = open + 1;
        loop {
            i = self.skip_whitespace(i);
            let Some(&b) = self.bytes.get(i) else {
                return Err(self.eof("'}'"));
            };
            let found = self.char_at(i);
            match (b, pending_key.take(), ready) {
                (b'}', None, _) => {
                    if after_comma {
                        return Err(self.error(ParseErrorKind::TrailingComma, i));
                    }
                    return Ok(Parsed {
                        value: Value::Object(object),
                        next: i + 1,
                    });
                }
                (b']', _, _) => {
                    return Err(self.error(
                        ParseErrorKind::WrongBracket {
                            expected: '}',
                            found: ']',
                        },
                        i,
                    ));
                }
                (b',', None, false) => {
                    ready = true;
                    after_comma = true;
                    i += 1;
                }
                (b':', Some(key), false) => {
                    pending_key = Some(key);
                    ready = true;
                    i += 1;
                }
                (b':', None, true) => {
                    return Err(self.error(ParseErrorKind::MissingKey { found }, i));
                }
                (b',', Some(key), true) => {
                    return Err(self.error(ParseErrorKind::MissingValue { key }, i));
                }
                (b',', None, true) | (b':', Some(_), true) => {
                    return Err(self.error(ParseErrorKind::UnexpectedSeparator(found), i));
                }
                (_, None, false) => {
                    return Err(self.error(
                        ParseErrorKind::ExpectedSeparator { found, close: '}' },
                        i,
                    ));
                }
                (_, Some(_), false) => {
                    return Err(self.error(ParseErrorKind::ExpectedColon { found }, i));
                }
                (b'}', Some(key), true) => {
                    return Err(self.error(ParseErrorKind::MissingValue { key }, i));
                }
                (b'"', None, true) => {
                    let (key, next) = self.parse_string(i)?;
                    pending_key = Some(key);
                    ready = false;
                    after_comma = false;
                    i = next;
                }
                (_, None, true) => {
                    return Err(self.error(ParseErrorKind::MissingKey { found }, i));
                }
                (_, Some(key), true) => {
                    let parsed = self.parse_at(i, depth + 1).inspect_err(|_| {
                        trace!(discarded = object.len(), "dropping partial object");
                    })?;
                    object
                        .try_reserve(1)
                        .map_err(|_| self.error(ParseErrorKind::AllocationFailure, i))?;
                    object.push(key, parsed.value);
                    ready = false;
                    i = parsed.next;
                }
            }
        }
    }

    fn check_depth(&self, open: usize, depth: usize) -> Result<(), ParseError> {
        let limit = self.options.max_depth;
        if depth >= limit {
            return Err(self.error(ParseErrorKind::DepthLimitExceeded { limit }, open));
        }
        Ok(())
    }
}

/// Length of the longest prefix of `token` that reads as an integer.
fn integer_prefix_len(token: &[u8]) -> usize {
    let sign = usize::from(token.first() == Some(&b'-'));
    let digits = token[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 { 0 } else { sign + digits }
}

/// Length of the longest prefix of `token` that reads as a real, following
/// the usual `strtod` grammar: sign, digits, optional fraction, optional
/// exponent. A dangling exponent marker is not part of the prefix.
fn real_prefix_len(token: &[u8]) -> usize {
    let count_digits = |from: usize| {
        token
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut i = usize::from(matches!(token.first(), Some(b'-' | b'+')));
    let int_digits = count_digits(i);
    i += int_digits;
    let mut frac_digits = 0;
    if token.get(i) == Some(&b'.') {
        frac_digits = count_digits(i + 1);
        i += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }
    if let Some(b'e' | b'E') = token.get(i) {
        let mut j = i + 1;
        if let Some(b'+' | b'-') = token.get(j) {
            j += 1;
        }
        let exp_digits = count_digits(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(input: &str) -> ParseErrorKind {
        from_str(input).unwrap_err().kind
    }

    #[test]
    fn number_prefixes() {
        assert_eq!(integer_prefix_len(b"12"), 2);
        assert_eq!(integer_prefix_len(b"-"), 0);
        assert_eq!(integer_prefix_len(b"1-2"), 1);
        assert_eq!(real_prefix_len(b"3.14"), 4);
        assert_eq!(real_prefix_len(b"1e"), 1);
        assert_eq!(real_prefix_len(b"1e+5"), 4);
        assert_eq!(real_prefix_len(b"1.5.2"), 3);
        assert_eq!(real_prefix_len(b"-.e"), 0);
    }

    #[test]
    fn object_state_errors() {
        assert_eq!(kind(r#"{"a" 1}"#), ParseErrorKind::ExpectedColon { found: '1' });
        assert_eq!(
            kind(r#"{"a":}"#),
            ParseErrorKind::MissingValue { key: "a".into() }
        );
        assert_eq!(
            kind(r#"{"a":,}"#),
            ParseErrorKind::MissingValue { key: "a".into() }
        );
        assert_eq!(kind(r#"{"a"::1}"#), ParseErrorKind::UnexpectedSeparator(':'));
        assert_eq!(kind(r#"{:1}"#), ParseErrorKind::MissingKey { found: ':' });
        assert_eq!(kind(r#"{1:1}"#), ParseErrorKind::MissingKey { found: '1' });
        assert_eq!(kind(r#"{"a":1,}"#), ParseErrorKind::TrailingComma);
        assert_eq!(kind(r#"{,}"#), ParseErrorKind::UnexpectedSeparator(','));
        assert_eq!(
            kind(r#"{"a":1 "b":2}"#),
            ParseErrorKind::ExpectedSeparator {
                found: '"',
                close: '}'
            }
        );
        assert_eq!(
            kind(r#"{"a":1]"#),
            ParseErrorKind::WrongBracket {
                expected: '}',
                found: ']'
            }
        );
        assert_eq!(kind(r#"{"a"}"#), ParseErrorKind::ExpectedColon { found: '}' });
    }

    #[test]
    fn array_state_errors() {
        assert_eq!(kind("[1,]"), ParseErrorKind::TrailingComma);
        assert_eq!(kind("[,1]"), ParseErrorKind::UnexpectedSeparator(','));
        assert_eq!(kind("[1,,2]"), ParseErrorKind::UnexpectedSeparator(','));
        assert_eq!(kind("[1:2]"), ParseErrorKind::UnexpectedSeparator(':'));
        assert_eq!(
            kind("[1 2]"),
            ParseErrorKind::ExpectedSeparator {
                found: '2',
                close: ']'
            }
        );
        assert_eq!(
            kind("[1}"),
            ParseErrorKind::WrongBracket {
                expected: ']',
                found: '}'
            }
        );
        assert_eq!(kind("[1"), ParseErrorKind::UnexpectedEof { expected: "']'" });
    }

    #[test]
    fn depth_limit() {
        let options = ParseOptions::new().max_depth(2);
        assert!(from_str_with_options("[[1]]", &options).is_ok());
        let err = from_str_with_options("[[[1]]]", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DepthLimitExceeded { limit: 2 });
        assert_eq!(err.offset, 2);
    }
}
