//! Compact serialization in two passes: measure, then write.

use core::fmt;
use std::io;

use knit_value::Value;

use crate::trace;

/// Number of bytes [`to_string`] will produce for `value`.
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Null => 4,
        Value::Bool(true) => 4,
        Value::Bool(false) => 5,
        Value::Integer(i) => itoa::Buffer::new().format(*i).len(),
        Value::Real(r) => {
            let mut counter = ByteCounter(0);
            // writing into a counter cannot fail
            let _ = write_real(&mut counter, *r);
            counter.0
        }
        Value::String(s) => escaped_len(s),
        Value::Array(items) => {
            let separators = items.len().saturating_sub(1);
            2 + separators + items.iter().map(encoded_len).sum::<usize>()
        }
        Value::Object(object) => {
            let separators = object.len().saturating_sub(1);
            2 + separators
                + object
                    .iter()
                    .map(|(key, item)| escaped_len(key) + 1 + encoded_len(item))
                    .sum::<usize>()
        }
    }
}

/// Serialize a value to a compact JSON string.
///
/// The buffer is sized with [`encoded_len`] up front and never grows.
///
/// ```
/// use knit_value::Value;
///
/// let v = Value::array([Value::from("a\"b\\c"), Value::from(1.0)]);
/// assert_eq!(knit_json::to_string(&v), r#"["a\"b\\c",1.0]"#);
/// ```
pub fn to_string(value: &Value) -> String {
    let len = encoded_len(value);
    trace!(len, "serializing");
    let mut out = String::with_capacity(len);
    // writing into a String cannot fail
    let _ = write_value(&mut out, value);
    debug_assert_eq!(out.len(), len);
    out
}

/// Serialize a value to compact JSON bytes.
pub fn to_vec(value: &Value) -> Vec<u8> {
    to_string(value).into_bytes()
}

/// Serialize a value as compact JSON into an [`std::io::Write`].
pub fn to_writer_std<W: io::Write>(mut writer: W, value: &Value) -> io::Result<()> {
    let mut adapter = IoAdapter {
        inner: &mut writer,
        error: None,
    };
    match write_value(&mut adapter, value) {
        Ok(()) => Ok(()),
        Err(fmt::Error) => Err(adapter
            .error
            .take()
            .unwrap_or_else(|| io::Error::other("formatter error"))),
    }
}

fn write_value<W: fmt::Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(true) => out.write_str("true"),
        Value::Bool(false) => out.write_str("false"),
        Value::Integer(i) => out.write_str(itoa::Buffer::new().format(*i)),
        Value::Real(r) => write_real(out, *r),
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_value(out, item)?;
            }
            out.write_char(']')
        }
        Value::Object(object) => {
            out.write_char('{')?;
            for (i, (key, item)) in object.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_escaped(out, key)?;
                out.write_char(':')?;
                write_value(out, item)?;
            }
            out.write_char('}')
        }
    }
}

/// Writes a real in fixed-point notation, always with a fractional part so
/// it reads back as a real. Non-finite values have no JSON form and are
/// written as `null`.
fn write_real<W: fmt::Write>(out: &mut W, r: f64) -> fmt::Result {
    if !r.is_finite() {
        return out.write_str("null");
    }
    // `Display` for f64 is the shortest round-trip form and never uses exponents
    let text = r.to_string();
    out.write_str(&text)?;
    if !text.contains('.') {
        out.write_str(".0")?;
    }
    Ok(())
}

fn escape(c: char) -> Option<&'static str> {
    Some(match c {
        '"' => "\\\"",
        '\\' => "\\\\",
        '/' => "\\/",
        '\u{8}' => "\\b",
        '\u{c}' => "\\f",
        '\n' => "\\n",
        '\r' => "\\r",
        '\t' => "\\t",
        _ => return None,
    })
}

fn escaped_len(s: &str) -> usize {
    2 + s
        .chars()
        .map(|c| escape(c).map_or(c.len_utf8(), str::len))
        .sum::<usize>()
}

fn write_escaped<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut run_start = 0;
    for (i, c) in s.char_indices() {
        if let Some(escaped) = escape(c) {
            out.write_str(&s[run_start..i])?;
            out.write_str(escaped)?;
            run_start = i + c.len_utf8();
        }
    }
    out.write_str(&s[run_start..])?;
    out.write_char('"')
}

struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct IoAdapter<'a, W: io::Write> {
    inner: &'a mut W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}
