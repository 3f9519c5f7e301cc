//! Human-readable tree dump of a `Value`, one node per line.
//!
//! This is a debugging aid, not a serialization format: strings are printed
//! without escaping and reals use their shortest round-trip form.

use core::fmt::{self, Write};

use crate::Value;

/// Renders `value` as an indented outline.
///
/// ```
/// use knit_value::{Value, format_tree};
///
/// let v = Value::object([("n", Value::from(3))]);
/// assert_eq!(format_tree(&v), "object:\n  n:\n    number: 3\n");
/// ```
pub fn format_tree(value: &Value) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_tree(&mut out, value);
    out
}

/// Writes the outline of `value` into `out`, stopping at the first write
/// error.
pub fn write_tree<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    write_node(out, value, 0)
}

fn write_indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("  ")?;
    }
    Ok(())
}

fn write_node<W: Write>(out: &mut W, value: &Value, depth: usize) -> fmt::Result {
    write_indent(out, depth)?;
    match value {
        Value::Null => out.write_str("null\n"),
        Value::Bool(b) => writeln!(out, "bool: {b}"),
        Value::Integer(i) => writeln!(out, "number: {i}"),
        Value::Real(r) => writeln!(out, "number: {r:?}"),
        Value::String(s) => writeln!(out, "string: \"{s}\""),
        Value::Array(items) => {
            out.write_str("array:\n")?;
            for item in items {
                write_node(out, item, depth + 1)?;
            }
            Ok(())
        }
        Value::Object(object) => {
            out.write_str("object:\n")?;
            for (key, item) in object {
                write_indent(out, depth + 1)?;
                writeln!(out, "{key}:")?;
                write_node(out, item, depth + 2)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_outline() {
        let v = Value::object([
            ("list", Value::array([Value::from(1), Value::from(2.5)])),
            ("name", Value::from("knit")),
            ("ok", Value::from(true)),
            ("none", Value::Null),
        ]);
        let expected = "\
object:
  list:
    array:
      number: 1
      number: 2.5
  name:
    string: \"knit\"
  ok:
    bool: true
  none:
    null
";
        assert_eq!(format_tree(&v), expected);
    }

    /// Accepts a fixed number of bytes, then refuses.
    struct Limited(usize);

    impl Write for Limited {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0 = self.0.checked_sub(s.len()).ok_or(fmt::Error)?;
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        let v = Value::array([Value::from("abc"), Value::from(1)]);
        assert_eq!(write_tree(&mut Limited(12), &v), Err(fmt::Error));
        assert_eq!(write_tree(&mut Limited(64), &v), Ok(()));
    }
}
