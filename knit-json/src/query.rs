//! Dotted path queries: `.key`, `."quoted.key"`, `.[index]`.
//!
//! A missing key or an out-of-range index yields `null`. Applying a segment
//! to a value of the wrong type is an error, so callers can tell "absent"
//! apart from "wrong shape".

use core::fmt;
use core::str::FromStr;

use knit_value::{NULL, Value};

use crate::error::{QueryError, QueryErrorKind};
use crate::trace;

/// One step of a query path.
///
/// Quoted keys have no escape syntax. A key is written bare unless it is
/// empty, contains a `.`, or starts with `"` or `[`; such a key that also
/// contains a `"` has no path text, and its `Display` output will not parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Look up a key in an object
    Key(String),
    /// Look up an element in an array
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(n) => write!(f, ".[{n}]"),
            Segment::Key(key) if needs_quotes(key) => write!(f, ".\"{key}\""),
            Segment::Key(key) => write!(f, ".{key}"),
        }
    }
}

fn needs_quotes(key: &str) -> bool {
    key.is_empty() || key.contains('.') || key.starts_with(['"', '['])
}

/// A parsed query path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPath {
    segments: Vec<Segment>,
}

impl QueryPath {
    /// Parses path text. The empty path and `.` select the root.
    pub fn parse(path: &str) -> Result<Self, QueryError> {
        let bytes = path.as_bytes();
        let malformed =
            |offset, reason| QueryError::new(QueryErrorKind::MalformedPath { offset, reason });
        let segment_end = |from: usize| path[from..].find('.').map_or(path.len(), |n| from + n);

        let mut segments = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'.' {
                return Err(malformed(i, "expected '.'"));
            }
            i += 1;
            match bytes.get(i) {
                None | Some(b'.') => {}
                Some(b'"') => {
                    let close = path[i + 1..]
                        .find('"')
                        .map(|n| i + 1 + n)
                        .ok_or_else(|| malformed(i, "unterminated quoted key"))?;
                    segments.push(Segment::Key(path[i + 1..close].to_owned()));
                    i = close + 1;
                    if i < bytes.len() && bytes[i] != b'.' {
                        return Err(malformed(i, "expected '.' after quoted key"));
                    }
                }
                Some(b'[') => {
                    let end = segment_end(i);
                    let digits = path[i + 1..end]
                        .strip_suffix(']')
                        .ok_or_else(|| malformed(end, "expected ']'"))?;
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(malformed(i + 1, "index must be a non-negative integer"));
                    }
                    // too large to address anything, so it resolves to null
                    let index = digits.parse::<usize>().unwrap_or(usize::MAX);
                    segments.push(Segment::Index(index));
                    i = end;
                }
                Some(_) => {
                    let end = segment_end(i);
                    segments.push(Segment::Key(path[i..end].to_owned()));
                    i = end;
                }
            }
        }
        Ok(QueryPath { segments })
    }

    /// The steps of this path, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Follows the path from `root` and returns a borrow of the target.
    pub fn resolve_ref<'v>(&self, root: &'v Value) -> Result<&'v Value, QueryError> {
        let mut current = root;
        for (step, segment) in self.segments.iter().enumerate() {
            current = match (segment, current) {
                (Segment::Index(n), Value::Array(items)) => items.get(*n).unwrap_or(&NULL),
                (Segment::Key(key), Value::Object(object)) => object.get(key).unwrap_or(&NULL),
                (segment, other) => {
                    return Err(QueryError::new(QueryErrorKind::TypeMismatch {
                        step,
                        segment: segment.to_string(),
                        found: other.value_type().as_str(),
                    }));
                }
            };
            trace!(step, %segment, found = %current.value_type(), "query step");
        }
        Ok(current)
    }

    /// Follows the path from `root` and returns an independent copy of the target.
    pub fn resolve(&self, root: &Value) -> Result<Value, QueryError> {
        self.resolve_ref(root).cloned()
    }
}

impl FromStr for QueryPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryPath::parse(s)
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(".");
        }
        self.segments.iter().try_for_each(|s| write!(f, "{s}"))
    }
}

impl From<Vec<Segment>> for QueryPath {
    fn from(segments: Vec<Segment>) -> Self {
        QueryPath { segments }
    }
}

/// Runs a query and returns a copy of the selected value.
///
/// ```
/// let doc = knit_json::from_str(r#"["Hello","World",null,{"okay":true}]"#).unwrap();
/// assert_eq!(knit_json::query(&doc, ".[3].okay").unwrap().as_bool(), Some(true));
/// assert!(knit_json::query(&doc, ".[4]").unwrap().is_null());
/// ```
pub fn query(root: &Value, path: &str) -> Result<Value, QueryError> {
    QueryPath::parse(path)?.resolve(root)
}

/// Copies the first value under `key`, or `null` if there is none.
pub fn object_get(value: &Value, key: &str) -> Result<Value, QueryError> {
    QueryPath::from(vec![Segment::Key(key.to_owned())]).resolve(value)
}

/// Copies element `index`, or `null` if it is out of range.
pub fn array_get(value: &Value, index: usize) -> Result<Value, QueryError> {
    QueryPath::from(vec![Segment::Index(index)]).resolve(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed_at(path: &str) -> usize {
        match QueryPath::parse(path).unwrap_err().kind {
            QueryErrorKind::MalformedPath { offset, .. } => offset,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_segments() {
        let path = QueryPath::parse(r#".a..[2]."b.c".[10]"#).unwrap();
        assert_eq!(
            path.segments(),
            [
                Segment::Key("a".into()),
                Segment::Index(2),
                Segment::Key("b.c".into()),
                Segment::Index(10),
            ]
        );
        assert_eq!(path.to_string(), r#".a.[2]."b.c".[10]"#);
    }

    #[test]
    fn empty_paths_select_root() {
        assert!(QueryPath::parse("").unwrap().segments().is_empty());
        assert!(QueryPath::parse(".").unwrap().segments().is_empty());
        assert_eq!(QueryPath::parse("").unwrap().to_string(), ".");
    }

    #[test]
    fn keys_with_quotes_display_bare() {
        let segment = Segment::Key(r#"a"b"#.into());
        assert_eq!(segment.to_string(), r#".a"b"#);
        let path = QueryPath::parse(&segment.to_string()).unwrap();
        assert_eq!(path.segments(), [segment]);
    }

    #[test]
    fn oversized_index_saturates() {
        let path = QueryPath::parse(".[99999999999999999999999]").unwrap();
        assert_eq!(path.segments(), [Segment::Index(usize::MAX)]);
    }

    #[test]
    fn malformed_paths() {
        assert_eq!(malformed_at("a"), 0);
        assert_eq!(malformed_at(r#"."open"#), 1);
        assert_eq!(malformed_at(r#"."k"x"#), 4);
        assert_eq!(malformed_at(".[1"), 3);
        assert_eq!(malformed_at(".[-1]"), 2);
        assert_eq!(malformed_at(".[]"), 2);
    }
}
