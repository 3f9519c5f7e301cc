//! Error types for parsing and querying.

use core::fmt::{self, Display};

/// Error returned when text is not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The specific kind of error
    pub kind: ParseErrorKind,
    /// Byte offset of the offending input
    pub offset: usize,
    /// 1-based line of `offset`
    pub line: usize,
    /// 1-based column of `offset`, counted in characters
    pub column: usize,
    /// The source input (for diagnostics)
    pub source_code: Option<String>,
}

impl ParseError {
    /// Creates an error at `offset` in `input`, computing its line and column.
    pub fn at(kind: ParseErrorKind, input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
        // continuation bytes do not start a character
        let column = 1 + before[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count();
        ParseError {
            kind,
            offset,
            line,
            column,
            source_code: None,
        }
    }

    /// Attach source code for rich diagnostics
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_code = Some(source.to_owned());
        self
    }

    /// Length of the highlighted span: one character, or zero at end of input.
    fn span_len(&self) -> usize {
        match &self.source_code {
            Some(src) => src
                .get(self.offset..)
                .and_then(|rest| rest.chars().next())
                .map_or(0, char::len_utf8),
            None => 1,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.kind
        )
    }
}

impl std::error::Error for ParseError {}

impl miette::Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let label = miette::LabeledSpan::new(Some(self.kind.label()), self.offset, self.span_len());
        Some(Box::new(core::iter::once(label)))
    }
}

/// Specific error kinds for parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A byte that cannot start a value
    UnexpectedChar(char),
    /// Input ended early
    UnexpectedEof {
        /// What was expected before the end
        expected: &'static str,
    },
    /// `\u` escapes are not supported
    UnicodeEscape,
    /// An escape other than `\" \\ \/ \b \f \n \r \t`, in strict mode
    InvalidEscape(char),
    /// A raw backspace, form feed, newline, carriage return or tab inside a string
    ControlCharacter(u8),
    /// A number literal stopped being valid at this character
    InvalidNumber(char),
    /// A number literal that does not fit the target type
    NumberOutOfRange {
        /// The literal as written
        literal: String,
    },
    /// A `,` or `:` where none was allowed
    UnexpectedSeparator(char),
    /// A value where a `,` or closing bracket was required
    ExpectedSeparator {
        /// What was found
        found: char,
        /// The bracket that would have closed the container
        close: char,
    },
    /// A closing bracket of the wrong kind
    WrongBracket {
        /// The bracket that would have closed the container
        expected: char,
        /// What was found
        found: char,
    },
    /// Something other than a string where an object key was required
    MissingKey {
        /// What was found
        found: char,
    },
    /// Something other than `:` after an object key
    ExpectedColon {
        /// What was found
        found: char,
    },
    /// An object key with no value after its colon
    MissingValue {
        /// The key left without a value
        key: String,
    },
    /// A `,` directly before a closing bracket
    TrailingComma,
    /// Input continues after the top-level value
    TrailingCharacters(char),
    /// Containers nested deeper than the configured limit
    DepthLimitExceeded {
        /// The configured limit
        limit: usize,
    },
    /// Byte input was not UTF-8
    InvalidUtf8,
    /// A buffer could not grow
    AllocationFailure,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedChar(c) => write!(f, "illegal character {c:?}"),
            ParseErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            ParseErrorKind::UnicodeEscape => write!(f, "\\u escapes are not supported"),
            ParseErrorKind::InvalidEscape(c) => write!(f, "unknown escape sequence \\{c}"),
            ParseErrorKind::ControlCharacter(b) => {
                write!(f, "control character 0x{b:02x} in string")
            }
            ParseErrorKind::InvalidNumber(c) => write!(f, "illegal character {c:?} in number"),
            ParseErrorKind::NumberOutOfRange { literal } => {
                write!(f, "number `{literal}` out of range")
            }
            ParseErrorKind::UnexpectedSeparator(c) => write!(f, "unexpected separator {c:?}"),
            ParseErrorKind::ExpectedSeparator { found, close } => {
                write!(f, "expected ',' or {close:?}, got {found:?}")
            }
            ParseErrorKind::WrongBracket { expected, found } => {
                write!(f, "mismatched bracket: expected {expected:?}, got {found:?}")
            }
            ParseErrorKind::MissingKey { found } => {
                write!(f, "expected a string key, got {found:?}")
            }
            ParseErrorKind::ExpectedColon { found } => {
                write!(f, "expected ':' after key, got {found:?}")
            }
            ParseErrorKind::MissingValue { key } => write!(f, "key `{key}` has no value"),
            ParseErrorKind::TrailingComma => write!(f, "trailing comma"),
            ParseErrorKind::TrailingCharacters(c) => {
                write!(f, "trailing character {c:?} after value")
            }
            ParseErrorKind::DepthLimitExceeded { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
            ParseErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            ParseErrorKind::AllocationFailure => write!(f, "out of memory"),
        }
    }
}

impl ParseErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedChar(_) => "json::unexpected_char",
            ParseErrorKind::UnexpectedEof { .. } => "json::unexpected_eof",
            ParseErrorKind::UnicodeEscape => "json::unicode_escape",
            ParseErrorKind::InvalidEscape(_) => "json::invalid_escape",
            ParseErrorKind::ControlCharacter(_) => "json::control_character",
            ParseErrorKind::InvalidNumber(_) => "json::invalid_number",
            ParseErrorKind::NumberOutOfRange { .. } => "json::number_out_of_range",
            ParseErrorKind::UnexpectedSeparator(_) => "json::unexpected_separator",
            ParseErrorKind::ExpectedSeparator { .. } => "json::expected_separator",
            ParseErrorKind::WrongBracket { .. } => "json::wrong_bracket",
            ParseErrorKind::MissingKey { .. } => "json::missing_key",
            ParseErrorKind::ExpectedColon { .. } => "json::expected_colon",
            ParseErrorKind::MissingValue { .. } => "json::missing_value",
            ParseErrorKind::TrailingComma => "json::trailing_comma",
            ParseErrorKind::TrailingCharacters(_) => "json::trailing_characters",
            ParseErrorKind::DepthLimitExceeded { .. } => "json::depth_limit",
            ParseErrorKind::InvalidUtf8 => "json::invalid_utf8",
            ParseErrorKind::AllocationFailure => "json::allocation_failure",
        }
    }

    /// Get a label describing where/what the error points to.
    pub fn label(&self) -> String {
        match self {
            ParseErrorKind::UnexpectedChar(c) => format!("unexpected {c:?}"),
            ParseErrorKind::UnexpectedEof { expected } => format!("expected {expected}"),
            ParseErrorKind::UnicodeEscape => "unsupported escape".into(),
            ParseErrorKind::InvalidEscape(_) => "unknown escape".into(),
            ParseErrorKind::ControlCharacter(_) => "escape this character".into(),
            ParseErrorKind::InvalidNumber(_) => "number ends badly here".into(),
            ParseErrorKind::NumberOutOfRange { .. } => "out of range".into(),
            ParseErrorKind::UnexpectedSeparator(_) => "unexpected separator".into(),
            ParseErrorKind::ExpectedSeparator { close, .. } => format!("expected ',' or {close:?}"),
            ParseErrorKind::WrongBracket { expected, .. } => format!("expected {expected:?}"),
            ParseErrorKind::MissingKey { .. } => "expected a string key".into(),
            ParseErrorKind::ExpectedColon { .. } => "expected ':'".into(),
            ParseErrorKind::MissingValue { key } => format!("value for `{key}` missing"),
            ParseErrorKind::TrailingComma => "remove this comma".into(),
            ParseErrorKind::TrailingCharacters(_) => "unexpected input after value".into(),
            ParseErrorKind::DepthLimitExceeded { .. } => "too deeply nested".into(),
            ParseErrorKind::InvalidUtf8 => "invalid UTF-8".into(),
            ParseErrorKind::AllocationFailure => "allocation failed here".into(),
        }
    }
}

/// Error returned by path queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The specific kind of error
    pub kind: QueryErrorKind,
}

impl QueryError {
    pub(crate) const fn new(kind: QueryErrorKind) -> Self {
        QueryError { kind }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for QueryError {}

/// Specific error kinds for path queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The path text does not follow the `.key."key".[N]` grammar
    MalformedPath {
        /// Byte offset in the path text
        offset: usize,
        /// What went wrong
        reason: &'static str,
    },
    /// A segment was applied to a value of the wrong type
    TypeMismatch {
        /// Zero-based index of the failing segment
        step: usize,
        /// The failing segment, rendered
        segment: String,
        /// The type of the value it was applied to
        found: &'static str,
    },
}

impl Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::MalformedPath { offset, reason } => {
                write!(f, "malformed query path at byte {offset}: {reason}")
            }
            QueryErrorKind::TypeMismatch {
                step,
                segment,
                found,
            } => write!(f, "cannot apply `{segment}` (step {step}) to {found}"),
        }
    }
}

impl QueryErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            QueryErrorKind::MalformedPath { .. } => "query::malformed_path",
            QueryErrorKind::TypeMismatch { .. } => "query::type_mismatch",
        }
    }

    /// Get a short label for this kind of error.
    pub fn label(&self) -> String {
        match self {
            QueryErrorKind::MalformedPath { reason, .. } => (*reason).into(),
            QueryErrorKind::TypeMismatch { found, .. } => format!("not applicable to {found}"),
        }
    }
}
